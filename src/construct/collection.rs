/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! [`Construct`] implementations for containers, nullable
//! values and references.
//!
//! Ordered mappings ([`Pairs`]) travel as a sequence of
//! single pair mappings, preserving entry order across tag
//! libraries that do not guarantee mapping order.
//! References are `Rc<RefCell<T>>`; their anchors bind
//! before the pointee is constructed, which is what makes
//! cycles resolvable.

use std::{
    any::Any,
    cell::RefCell,
    collections::{HashMap, HashSet},
    convert::TryInto,
    hash::Hash,
    rc::Rc,
};

use crate::{
    construct::{
        contextualize, expect_map_end, expect_map_start, expect_seq_start, Construct,
    },
    context::ConstructionContext,
    error::{
        internal::{ConstructError, Error as InternalError, ErrorCode},
        Result,
    },
    event::{types::StructEvent, Events},
    guess::{guess_type, TypeHint},
    tags::{TagId, TagRegistry},
};

impl<T> Construct for Vec<T>
where
    T: Construct,
{
    const ALLOW_NON_SPECIFIC: bool = false;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.seq()
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        expect_seq_start(events)?;

        let mut out = Vec::new();

        loop
        {
            if matches!(events.peek()?, StructEvent::SeqEnd)
            {
                events.next()?;

                return Ok(out);
            }

            out.push(T::construct_child(events, ctx, registry)?);
        }
    }
}

impl<T> Construct for HashSet<T>
where
    T: Construct + Eq + Hash,
{
    const ALLOW_NON_SPECIFIC: bool = false;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.seq()
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        expect_seq_start(events)?;

        let mut out = HashSet::new();

        loop
        {
            if matches!(events.peek()?, StructEvent::SeqEnd)
            {
                events.next()?;

                return Ok(out);
            }

            // Duplicate tolerance is container defined; sets
            // simply collapse repeats
            out.insert(T::construct_child(events, ctx, registry)?);
        }
    }
}

impl<T, const N: usize> Construct for [T; N]
where
    T: Construct,
{
    const ALLOW_NON_SPECIFIC: bool = false;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.seq()
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        let location = events.last_token_context().cloned();
        let elements: Vec<T> = Vec::construct(events, ctx, registry)?;

        if elements.len() != N
        {
            return Err(contextualize(
                location,
                ConstructError::LengthMismatch {
                    expected: N,
                    found:    elements.len(),
                },
            ));
        }

        match elements.try_into()
        {
            Ok(array) => Ok(array),
            Err(_) => Err(InternalError::new(ErrorCode::CorruptStream).into()),
        }
    }
}

impl<K, V> Construct for HashMap<K, V>
where
    K: Construct + Eq + Hash,
    V: Construct,
{
    const ALLOW_NON_SPECIFIC: bool = false;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.map()
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        expect_map_start(events)?;

        let mut out = HashMap::new();

        loop
        {
            if matches!(events.peek()?, StructEvent::MapEnd)
            {
                events.next()?;

                return Ok(out);
            }

            let location = events.last_token_context().cloned();
            let key = K::construct_child(events, ctx, registry)?;
            let value = V::construct_child(events, ctx, registry)?;

            if out.insert(key, value).is_some()
            {
                return Err(contextualize(location, ConstructError::DuplicateKey));
            }
        }
    }
}

/// An order preserving mapping.
///
/// On the wire this is a sequence of single pair mappings,
/// one per entry, so entry order survives tag libraries
/// that treat mappings as unordered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pairs<K, V>(pub Vec<(K, V)>);

impl<K, V> Pairs<K, V>
{
    pub fn new() -> Self
    {
        Pairs(Vec::new())
    }

    pub fn push(&mut self, key: K, value: V)
    {
        self.0.push((key, value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (K, V)>
    {
        self.0.iter()
    }

    pub fn len(&self) -> usize
    {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.0.is_empty()
    }
}

impl<K, V> Construct for Pairs<K, V>
where
    K: Construct,
    V: Construct,
{
    const ALLOW_NON_SPECIFIC: bool = false;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri("tag:yaml.org,2002:omap")
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        expect_seq_start(events)?;

        let mut out = Pairs::new();

        loop
        {
            if matches!(events.peek()?, StructEvent::SeqEnd)
            {
                events.next()?;

                return Ok(out);
            }

            expect_map_start(events)?;

            let key = K::construct_child(events, ctx, registry)?;
            let value = V::construct_child(events, ctx, registry)?;

            expect_map_end(events)?;

            out.push(key, value);
        }
    }
}

impl<T> Construct for Option<T>
where
    T: Construct,
{
    const IS_REF: bool = T::IS_REF;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        T::tag(registry)
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        Self::construct_child(events, ctx, registry)
    }

    fn construct_child<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        // Nulls arrive either as a guessed null scalar or as
        // one of the null container sentinels
        let is_null = match events.peek()?
        {
            StructEvent::Scalar { content, tag, .. } =>
            {
                *tag == registry.null()
                    || *tag == registry.null_string()
                    || *tag == registry.null_seq()
                    || (*tag == registry.question() && guess_type(content) == TypeHint::Null)
            },
            _ => false,
        };

        if is_null
        {
            events.next()?;

            return Ok(None);
        }

        T::construct_child(events, ctx, registry).map(Some)
    }
}

impl<T> Construct for Rc<RefCell<T>>
where
    T: Construct + Default + 'static,
{
    const IS_REF: bool = true;

    fn tag(registry: &mut TagRegistry) -> TagId
    {
        T::tag(registry)
    }

    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        Self::construct_child(events, ctx, registry)
    }

    fn construct_child<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        let location = events.last_token_context().cloned();

        if let StructEvent::Alias { target } = events.peek()?
        {
            let target = *target;
            let object = match ctx.resolve(target)
            {
                Some(object) => object,
                None => return Err(contextualize(location, ErrorCode::UnknownAlias)),
            };

            let typed = match object.downcast::<RefCell<T>>()
            {
                Ok(typed) => typed,
                Err(_) =>
                {
                    let expected = T::tag(registry);

                    return Err(contextualize(
                        location,
                        ConstructError::WrongTag {
                            expected: registry.uri(expected).to_owned(),
                            found:    "<aliased value of a different type>".to_owned(),
                        },
                    ));
                },
            };

            events.next()?;

            return Ok(typed);
        }

        let anchor = events.peek()?.anchor();
        let fresh: Rc<RefCell<T>> = Rc::new(RefCell::new(T::default()));

        if anchor.is_some()
        {
            // Bind before descending, so aliases inside the
            // node (cycles) resolve to this object
            ctx.bind(anchor, fresh.clone() as Rc<dyn Any>)?;
            events.peek_mut()?.clear_anchor();
        }

        let value = T::construct_child(events, ctx, registry)?;
        *fresh.borrow_mut() = value;

        Ok(fresh)
    }
}
