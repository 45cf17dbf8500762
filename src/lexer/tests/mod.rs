/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Test cases for the lexer, fractionated into modules by
//! the area of the machine they exercise


mod anchor;
mod document;

use super::*;
use crate::source::ByteSource;

/// Construct a lexer over the given UTF8 test data
fn lexer(data: &str) -> Lexer
{
    Lexer::new(ByteSource::from_bytes(data.to_owned().into_bytes()), O_ZEROED)
}
