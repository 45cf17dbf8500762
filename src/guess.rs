/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Core schema classification of untagged scalar content,
//! used when constructing floats and booleans and when
//! dispatching implicit variants.

/// The shape an untagged plain scalar's content resolves
/// to under the core schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeHint
{
    /// Decimal, hex (0x) or octal (0o) integer
    Integer,
    /// Decimal float, possibly with an exponent
    Float,
    /// Positive or negative infinity
    FloatInf,
    /// Not a number
    FloatNaN,
    BoolTrue,
    BoolFalse,
    Null,
    /// Anything else; treated as a string
    Unknown,
}

/// Classify .content against the core schema
pub fn guess_type(content: &str) -> TypeHint
{
    match content
    {
        "" | "~" | "null" | "Null" | "NULL" => TypeHint::Null,

        "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" =>
        {
            TypeHint::BoolTrue
        },
        "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" =>
        {
            TypeHint::BoolFalse
        },

        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" | "-.inf" | "-.Inf" | "-.INF" =>
        {
            TypeHint::FloatInf
        },
        ".nan" | ".NaN" | ".NAN" => TypeHint::FloatNaN,

        _ => guess_number(content.as_bytes()),
    }
}

fn guess_number(bytes: &[u8]) -> TypeHint
{
    let unsigned = match bytes
    {
        [b'-', rest @ ..] | [b'+', rest @ ..] => rest,
        rest => rest,
    };

    match unsigned
    {
        [b'0', b'x', digits @ ..] | [b'0', b'X', digits @ ..]
            if bytes[0] == b'0'
                && !digits.is_empty()
                && digits
                    .iter()
                    .all(|b| b.is_ascii_hexdigit() || *b == b'_') =>
        {
            TypeHint::Integer
        },
        [b'0', b'o', digits @ ..] | [b'0', b'O', digits @ ..]
            if bytes[0] == b'0'
                && !digits.is_empty()
                && digits.iter().all(|b| (b'0'..=b'7').contains(b) || *b == b'_') =>
        {
            TypeHint::Integer
        },
        digits if !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) =>
        {
            TypeHint::Integer
        },
        digits => guess_float(digits),
    }
}

/// Matches [0-9]* '.' [0-9]* ( [eE] [+-]? [0-9]+ )?, with
/// at least one digit in the mantissa
fn guess_float(bytes: &[u8]) -> TypeHint
{
    let mut digits = 0;
    let mut rest = bytes;

    while let [b, tail @ ..] = rest
    {
        if b.is_ascii_digit()
        {
            digits += 1;
            rest = tail;
            continue;
        }

        break;
    }

    rest = match rest
    {
        [b'.', tail @ ..] => tail,
        _ => return TypeHint::Unknown,
    };

    while let [b, tail @ ..] = rest
    {
        if b.is_ascii_digit()
        {
            digits += 1;
            rest = tail;
            continue;
        }

        break;
    }

    if digits == 0
    {
        return TypeHint::Unknown;
    }

    rest = match rest
    {
        [] => return TypeHint::Float,
        [b'e', tail @ ..] | [b'E', tail @ ..] => tail,
        _ => return TypeHint::Unknown,
    };

    rest = match rest
    {
        [b'+', tail @ ..] | [b'-', tail @ ..] => tail,
        tail => tail,
    };

    match rest
    {
        [] => TypeHint::Unknown,
        digits if digits.iter().all(u8::is_ascii_digit) => TypeHint::Float,
        _ => TypeHint::Unknown,
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn guesses()
    {
        let data: &[(&str, TypeHint)] = &[
            ("", TypeHint::Null),
            ("~", TypeHint::Null),
            ("null", TypeHint::Null),
            ("NULL", TypeHint::Null),
            ("y", TypeHint::BoolTrue),
            ("True", TypeHint::BoolTrue),
            ("on", TypeHint::BoolTrue),
            ("NO", TypeHint::BoolFalse),
            ("off", TypeHint::BoolFalse),
            ("0", TypeHint::Integer),
            ("42", TypeHint::Integer),
            ("-17", TypeHint::Integer),
            ("+3", TypeHint::Integer),
            ("0xFF", TypeHint::Integer),
            ("0x_f_f", TypeHint::Integer),
            ("0o17", TypeHint::Integer),
            ("3.14", TypeHint::Float),
            ("-0.5", TypeHint::Float),
            ("6.022e23", TypeHint::Float),
            ("1.0E-9", TypeHint::Float),
            (".5", TypeHint::Float),
            ("5.", TypeHint::Float),
            (".inf", TypeHint::FloatInf),
            ("-.INF", TypeHint::FloatInf),
            (".NaN", TypeHint::FloatNaN),
            ("word", TypeHint::Unknown),
            ("0x", TypeHint::Unknown),
            ("0o8", TypeHint::Unknown),
            ("1.0e", TypeHint::Unknown),
            ("1.2.3", TypeHint::Unknown),
            ("yessir", TypeHint::Unknown),
        ];

        for &(content, expected) in data
        {
            assert_eq!(guess_type(content), expected, "on {:?}", content);
        }
    }
}
