/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Helpers for record (struct and variant) constructors.
//!
//! Plain records travel as field-name keyed mappings and
//! are driven through a [`FieldSet`] bitset that enforces
//! the unknown/duplicate/missing field rules. Variant
//! records travel as a sequence of single pair mappings,
//! discriminator first, walked through the `variant_*`
//! helpers.

use crate::{
    construct::{contextualize, expect_map_end, expect_map_start, expect_scalar, expect_seq_start},
    error::{internal::ConstructError, Result},
    event::{types::StructEvent, Events},
};

/// Tracks which fields of a record have been constructed,
/// enforcing the record field rules
#[derive(Debug)]
pub struct FieldSet
{
    names:   &'static [&'static str],
    matched: Vec<bool>,
}

impl FieldSet
{
    pub fn new(names: &'static [&'static str]) -> Self
    {
        Self {
            names,
            matched: vec![false; names.len()],
        }
    }

    /// Claim .key, returning its field index.
    ///
    /// ## Errors
    ///
    /// `Unknown field` if the key names no field,
    /// `Duplicate field` if the key was already claimed
    pub fn claim(&mut self, key: &str) -> Result<usize>
    {
        let index = match self.names.iter().position(|name| *name == key)
        {
            Some(index) => index,
            None =>
            {
                return Err(contextualize(
                    None,
                    ConstructError::UnknownField(key.to_owned()),
                ))
            },
        };

        if self.matched[index]
        {
            return Err(contextualize(
                None,
                ConstructError::DuplicateField(key.to_owned()),
            ));
        }

        self.matched[index] = true;

        Ok(index)
    }

    /// Require every field to have been claimed.
    ///
    /// ## Errors
    ///
    /// `Missing field` naming the first unclaimed field
    pub fn finish(&self) -> Result<()>
    {
        match self.matched.iter().position(|matched| !matched)
        {
            Some(index) => Err(contextualize(
                None,
                ConstructError::MissingField(self.names[index].to_owned()),
            )),
            None => Ok(()),
        }
    }
}

/// Take the next field name of a record mapping, or None
/// at (and consuming) the mapping's end
pub fn next_key<I>(events: &mut Events<I>) -> Result<Option<String>>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    if matches!(events.peek()?, StructEvent::MapEnd)
    {
        events.next()?;

        return Ok(None);
    }

    let (key, ..) = expect_scalar(events, "field name scalar")?;

    Ok(Some(key))
}

/// Enter a variant record's outer sequence
pub fn variant_begin<I>(events: &mut Events<I>) -> Result<()>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    expect_seq_start(events)
}

/// Take the field name of the next single pair entry, or
/// None at (and consuming) the outer sequence's end.
///
/// On Some, the stream is positioned at the field's value;
/// finish the entry with [`variant_end_field`]
pub fn variant_next<I>(events: &mut Events<I>) -> Result<Option<String>>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    if matches!(events.peek()?, StructEvent::SeqEnd)
    {
        events.next()?;

        return Ok(None);
    }

    expect_map_start(events)?;

    let (key, ..) = expect_scalar(events, "field name scalar")?;

    Ok(Some(key))
}

/// Close the single pair entry opened by [`variant_next`]
pub fn variant_end_field<I>(events: &mut Events<I>) -> Result<()>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    expect_map_end(events)
}
