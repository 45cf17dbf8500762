/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This module exports function(s) for handling double
//! quoted scalar escapes, as defined in [Section 5.7][Link]
//! of the YAML specification. YAML defines 18 'special'
//! escapes, and 3 methods of encoding 8, 16 and 32 bit
//! unicode points.
//!
//! [Link]: https://yaml.org/spec/1.2/spec.html#c-escape

/// Resolve a single character escape (the character
/// following the backslash), returning the bytes it
/// unescapes to, or None if the character instead
/// introduces a hex escape or is unknown.
pub(in crate::lexer) fn unescape_simple(c: u8) -> Option<&'static [u8]>
{
    let bytes: &[u8] = match c
    {
        b'0' => &[b'\0'],
        b'a' => &[b'\x07'],
        b'b' => &[b'\x08'],
        b't' | b'\t' => &[b'\x09'],
        b'n' => &[b'\x0A'],
        b'v' => &[b'\x0B'],
        b'f' => &[b'\x0C'],
        b'r' => &[b'\x0D'],
        b'e' => &[b'\x1B'],
        b' ' => &[b'\x20'],
        b'"' => &[b'"'],
        // Forward slashes are not supported in the 1.1 spec
        b'/' => &[b'/'],
        b'\\' => &[b'\\'],
        b'N' => &NEL,
        b'_' => &NBS,
        b'L' => &LS,
        b'P' => &PS,
        _ => return None,
    };

    Some(bytes)
}

/// Number of hex digits introduced by an 'x', 'u' or 'U'
/// escape
pub(in crate::lexer) fn escape_length(c: u8) -> Option<u8>
{
    match c
    {
        b'x' => Some(2),
        b'u' => Some(4),
        b'U' => Some(8),
        _ => None,
    }
}

/// Writes a unicode code point to the scratch space as
/// UTF8: a lead byte tagged for the point's width, then
/// one continuation byte per remaining 6 bit group
pub(in crate::lexer) fn write_unicode_point(value: u32, scratch: &mut Vec<u8>)
{
    if value <= 0x7F
    {
        scratch.push(value as u8);

        return;
    }

    let (continuations, lead_tag) = match value
    {
        v if v <= 0x7FF => (1, 0xC0),
        v if v <= 0xFFFF => (2, 0xE0),
        _ => (3, 0xF0),
    };

    scratch.push(lead_tag | (value >> (6 * continuations)) as u8);

    for group in (0..continuations).rev()
    {
        scratch.push(0x80 | ((value >> (6 * group)) & 0x3F) as u8);
    }
}

/// Value of an ASCII hex digit. Callers check the digit
/// class first
#[inline]
pub(in crate::lexer) fn as_hex(b: u8) -> u8
{
    match b
    {
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => b - b'0',
    }
}

/// <Next Line> (U+0085)
const NEL: [u8; 2] = [b'\xC2', b'\x85'];
/// <No-Break Space> (U+00A0)
const NBS: [u8; 2] = [b'\xC2', b'\xA0'];
/// <Line Separator> (U+2028)
const LS: [u8; 3] = [b'\xE2', b'\x80', b'\xA8'];
/// <Paragraph Separator> (U+2029)
const PS: [u8; 3] = [b'\xE2', b'\x80', b'\xA9'];
