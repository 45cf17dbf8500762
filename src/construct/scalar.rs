/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! [`Construct`] implementations for the primitive scalar
//! types.
//!
//! Integers understand `0x`/`0X` hex and `0o`/`0O` octal
//! prefixes with `_` separators skipped; everything else
//! is decimal. Floats and booleans resolve their content
//! through [`guess_type`]. Overflowing a width is a
//! construction failure, not a wrap.

use std::convert::TryFrom;

use crate::{
    construct::{contextualize, expect_scalar, Construct},
    context::ConstructionContext,
    error::{internal::ConstructError, Result},
    event::{types::StructEvent, Events},
    guess::{guess_type, TypeHint},
    tags::{uris, TagId, TagRegistry},
};

/// Fold hex or octal .digits into an accumulator, skipping
/// '_' separators. Returns None on an invalid digit, an
/// empty run or overflow of the accumulator
fn fold_radix(digits: &[u8], radix: u128) -> Option<u128>
{
    let mut value: u128 = 0;
    let mut any = false;

    for &b in digits
    {
        if b == b'_'
        {
            continue;
        }

        let digit = match (radix, b)
        {
            (16, b'0'..=b'9') => b - b'0',
            (16, b'a'..=b'f') => b - b'a' + 10,
            (16, b'A'..=b'F') => b - b'A' + 10,
            (8, b'0'..=b'7') => b - b'0',
            _ => return None,
        };

        value = value.checked_mul(radix)?.checked_add(digit as u128)?;
        any = true;
    }

    if any
    {
        Some(value)
    }
    else
    {
        None
    }
}

macro_rules! construct_integer {
    ($( $t:ty => $uri:expr ),* $(,)?) => {$(
        impl Construct for $t
        {
            fn tag(registry: &mut TagRegistry) -> TagId
            {
                registry.register_uri($uri)
            }

            fn construct<I>(
                events: &mut Events<I>,
                _: &mut ConstructionContext,
                _: &mut TagRegistry,
            ) -> Result<Self>
            where
                I: Iterator<Item = Result<StructEvent>>,
            {
                let location = events.last_token_context().cloned();
                let (content, ..) = expect_scalar(events, "integer scalar")?;

                let parsed: Option<$t> = match content.as_bytes()
                {
                    [b'0', b'x', digits @ ..] | [b'0', b'X', digits @ ..] =>
                    {
                        fold_radix(digits, 16).and_then(|v| <$t>::try_from(v).ok())
                    },
                    [b'0', b'o', digits @ ..] | [b'0', b'O', digits @ ..] =>
                    {
                        fold_radix(digits, 8).and_then(|v| <$t>::try_from(v).ok())
                    },
                    // atoi parses the longest digit prefix and
                    // takes no leading '+', so validate the
                    // shape up front and strip the plus here
                    bytes if guess_type(&content) == TypeHint::Integer =>
                    {
                        let digits = match bytes
                        {
                            [b'+', rest @ ..] => rest,
                            rest => rest,
                        };

                        atoi::atoi::<$t>(digits)
                    },
                    _ => None,
                };

                parsed.ok_or_else(|| {
                    contextualize(
                        location,
                        ConstructError::MalformedScalar {
                            expected: "integer",
                            content,
                        },
                    )
                })
            }
        }
    )*};
}

construct_integer! {
    i8 => uris::I8,
    i16 => uris::I16,
    i32 => uris::I32,
    i64 => uris::I64,
    u8 => uris::U8,
    u16 => uris::U16,
    u32 => uris::U32,
    u64 => uris::U64,
    // Host sized integers travel at the 32-bit wire width
    isize => uris::I32,
    usize => uris::U32,
}

macro_rules! construct_float {
    ($( $t:ty => $uri:expr ),* $(,)?) => {$(
        impl Construct for $t
        {
            fn tag(registry: &mut TagRegistry) -> TagId
            {
                registry.register_uri($uri)
            }

            fn construct<I>(
                events: &mut Events<I>,
                _: &mut ConstructionContext,
                _: &mut TagRegistry,
            ) -> Result<Self>
            where
                I: Iterator<Item = Result<StructEvent>>,
            {
                let location = events.last_token_context().cloned();
                let (content, ..) = expect_scalar(events, "float scalar")?;

                let parsed: Option<$t> = match guess_type(&content)
                {
                    TypeHint::Float | TypeHint::Integer => content.parse::<$t>().ok(),
                    TypeHint::FloatInf if content.starts_with('-') =>
                    {
                        Some(<$t>::NEG_INFINITY)
                    },
                    TypeHint::FloatInf => Some(<$t>::INFINITY),
                    TypeHint::FloatNaN => Some(<$t>::NAN),
                    _ => None,
                };

                parsed.ok_or_else(|| {
                    contextualize(
                        location,
                        ConstructError::MalformedScalar {
                            expected: "float",
                            content,
                        },
                    )
                })
            }
        }
    )*};
}

construct_float! {
    f32 => uris::F32,
    f64 => uris::F64,
}

impl Construct for bool
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.boolean()
    }

    fn construct<I>(
        events: &mut Events<I>,
        _: &mut ConstructionContext,
        _: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        let location = events.last_token_context().cloned();
        let (content, ..) = expect_scalar(events, "boolean scalar")?;

        match guess_type(&content)
        {
            TypeHint::BoolTrue => Ok(true),
            TypeHint::BoolFalse => Ok(false),
            _ => Err(contextualize(
                location,
                ConstructError::MalformedScalar {
                    expected: "boolean",
                    content,
                },
            )),
        }
    }
}

impl Construct for char
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri(uris::CHAR)
    }

    fn construct<I>(
        events: &mut Events<I>,
        _: &mut ConstructionContext,
        _: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        let location = events.last_token_context().cloned();
        let (content, ..) = expect_scalar(events, "character scalar")?;

        let mut chars = content.chars();

        match (chars.next(), chars.next())
        {
            (Some(c), None) => Ok(c),
            _ => Err(contextualize(
                location,
                ConstructError::MalformedScalar {
                    expected: "single character",
                    content,
                },
            )),
        }
    }
}

impl Construct for String
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.string()
    }

    fn construct<I>(
        events: &mut Events<I>,
        _: &mut ConstructionContext,
        _: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        let (content, ..) = expect_scalar(events, "string scalar")?;

        Ok(content)
    }
}
