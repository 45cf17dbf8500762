/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use bitflags::bitflags;

/// An empty, zeroed flag set. This is the default set, with
/// all other flags disabled.
pub const O_ZEROED: Flags = Flags::empty();
/// Sets the Lexer to swallow comment events rather than
/// surfacing them.
///
/// The characters are still consumed and line tracking
/// stays correct; the caller simply never sees the
/// [`Comment`](crate::token::LexEventKind::Comment) events.
pub const O_SKIP_COMMENTS: Flags = Flags::SKIP_COMMENTS;

bitflags! {
    /// Directives controlling various behaviors of the Lexer,
    /// see each O_ variant for an explanation of how each works
    #[derive(Default)]
    pub struct Flags: u32 {
        const SKIP_COMMENTS = 0b00000001;
    }
}
