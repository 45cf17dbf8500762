/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This module contains the character class macros used by
//! lib/lexer.
//!
//! Each macro takes an `Option<Unit>` as returned by
//! [`ByteSource::peek`](crate::source::ByteSource) and
//! classifies the unit's low byte. The `Z` variants treat
//! the end of the stream as a positive match.

/// Check if the unit is a line break (CR or LF)
macro_rules! isBreak {
    ($unit:expr) => {
        matches!($unit, Some(u) if u.is_break())
    };
}

/// Check if the unit is a line break or the stream is
/// finished
macro_rules! isBreakZ {
    ($unit:expr) => {
        matches!($unit, None) || isBreak!($unit)
    };
}

/// Check if the unit is a space or tab
macro_rules! isBlank {
    ($unit:expr) => {
        matches!($unit, Some(u) if u.low == b' ' || u.low == b'\t')
    };
}

/// Check if the unit is a space, tab or line break
macro_rules! isWhiteSpace {
    ($unit:expr) => {
        isBlank!($unit) || isBreak!($unit)
    };
}

/// Check if the unit is a space, tab, line break or if the
/// stream is finished
macro_rules! isWhiteSpaceZ {
    ($unit:expr) => {
        matches!($unit, None) || isWhiteSpace!($unit)
    };
}

/// Check if the unit is a flow collection indicator
macro_rules! isFlowIndicator {
    ($unit:expr) => {
        matches!($unit, Some(u) if matches!(u.low, b',' | b'[' | b']' | b'{' | b'}'))
    };
}

/// Check if the unit is an ASCII digit
macro_rules! isDigit {
    ($unit:expr) => {
        matches!($unit, Some(u) if u.low.is_ascii_digit())
    };
}

/// Check if the unit belongs to the tag URI character class
macro_rules! isUriChar {
    ($unit:expr) => {
        matches!($unit, Some(u) if u.low.is_ascii_alphanumeric()
            || matches!(
                u.low,
                b'#' | b';'
                    | b'/'
                    | b'?'
                    | b':'
                    | b'@'
                    | b'&'
                    | b'='
                    | b'+'
                    | b'$'
                    | b','
                    | b'_'
                    | b'.'
                    | b'~'
                    | b'*'
                    | b'\''
                    | b'('
                    | b')'
            ))
    };
}

/// Check if the unit may appear in an anchor or alias name
macro_rules! isAnchorChar {
    ($unit:expr) => {
        matches!($unit, Some(u) if u.low.is_ascii_alphanumeric() || matches!(u.low, b'-' | b'_'))
    };
}
