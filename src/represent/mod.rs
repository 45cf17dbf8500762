/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The representation engine: the inverse of
//! [`construct`](crate::construct), walking a typed value
//! and emitting the structural events of one document.
//!
//! The returned stream is materialised rather than lazy
//! because [`AnchorStyle::Tidy`] requires a post-pass over
//! the buffered document, patching anchors onto the first
//! occurrence of every object that turned out to be
//! referenced more than once.


use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    convert::TryFrom,
    hash::Hash,
    rc::Rc,
};

pub use crate::context::{AnchorStyle, SerializationContext, TagStyle};
use crate::{
    construct::Pairs,
    error::{
        internal::{Error as InternalError, ErrorCode},
        Result,
    },
    event::types::{AnchorId, ScalarStyle, StructEvent},
    tags::{uris, TagId, TagRegistry},
};

/// A type whose values can be represented as structural
/// events.
///
/// Implementations emit the events of exactly one node
/// into the context's buffer, asking the context to style
/// its tag and to resolve anchor policy for references.
pub trait Represent
{
    /// The canonical tag of this type, registered lazily
    fn tag(registry: &mut TagRegistry) -> TagId;

    /// Emit this value's node into .ctx
    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>;

    /// The tag emitted for a null value of this type.
    ///
    /// Strings and sequences override this with their
    /// null sentinels so nullability survives round trips
    fn null_tag(registry: &mut TagRegistry) -> TagId
    {
        registry.null()
    }
}

/// Produce the materialised event stream of one document
/// holding .value
pub fn represent<T>(
    value: &T,
    tag_style: TagStyle,
    anchor_style: AnchorStyle,
    registry: &mut TagRegistry,
) -> Result<Vec<StructEvent>>
where
    T: Represent,
{
    let mut ctx = SerializationContext::new(tag_style, anchor_style);

    ctx.emit(StructEvent::DocStart);
    value.represent(&mut ctx, registry)?;
    ctx.emit(StructEvent::DocEnd);

    Ok(ctx.into_events())
}

/// Produce a complete stream holding one document with
/// .value
pub fn dump<T>(
    value: &T,
    tag_style: TagStyle,
    anchor_style: AnchorStyle,
    registry: &mut TagRegistry,
) -> Result<Vec<StructEvent>>
where
    T: Represent,
{
    let mut events = vec![StructEvent::StreamStart];

    events.extend(represent(value, tag_style, anchor_style, registry)?);
    events.push(StructEvent::StreamEnd);

    Ok(events)
}

/// Produce a complete stream holding one document per
/// value
pub fn dump_multi<T>(
    values: &[T],
    tag_style: TagStyle,
    anchor_style: AnchorStyle,
    registry: &mut TagRegistry,
) -> Result<Vec<StructEvent>>
where
    T: Represent,
{
    let mut events = vec![StructEvent::StreamStart];

    for value in values
    {
        events.extend(represent(value, tag_style, anchor_style, registry)?);
    }

    events.push(StructEvent::StreamEnd);

    Ok(events)
}

/// Emit a scalar node carrying this node's styled tag
pub fn represent_scalar<S>(
    content: S,
    real: TagId,
    ctx: &mut SerializationContext,
    registry: &TagRegistry,
) where
    S: Into<String>,
{
    let tag = ctx.style_tag(real, registry.question());

    ctx.emit(StructEvent::Scalar {
        content: content.into(),
        tag,
        anchor: AnchorId::NONE,
        style: ScalarStyle::Plain,
    });
}

/// Emit a mapping key scalar, always carrying the '?' tag
pub fn represent_key<S>(name: S, ctx: &mut SerializationContext, registry: &TagRegistry)
where
    S: Into<String>,
{
    ctx.count_node();
    ctx.emit(StructEvent::scalar(name.into(), registry.question()));
}

/// Emit one single pair mapping entry of a variant record
pub fn represent_field<T>(
    name: &str,
    value: &T,
    ctx: &mut SerializationContext,
    registry: &mut TagRegistry,
) -> Result<()>
where
    T: Represent,
{
    ctx.count_node();
    ctx.emit(StructEvent::map(registry.question()));
    represent_key(name, ctx, registry);
    value.represent(ctx, registry)?;
    ctx.emit(StructEvent::MapEnd);

    Ok(())
}

/*
 * ==== Primitives ====
 */

macro_rules! represent_integer {
    ($( $t:ty => $uri:expr ),* $(,)?) => {$(
        impl Represent for $t
        {
            fn tag(registry: &mut TagRegistry) -> TagId
            {
                registry.register_uri($uri)
            }

            fn represent(
                &self,
                ctx: &mut SerializationContext,
                registry: &mut TagRegistry,
            ) -> Result<()>
            {
                let real = Self::tag(registry);
                represent_scalar(self.to_string(), real, ctx, registry);

                Ok(())
            }
        }
    )*};
}

represent_integer! {
    i8 => uris::I8,
    i16 => uris::I16,
    i32 => uris::I32,
    i64 => uris::I64,
    u8 => uris::U8,
    u16 => uris::U16,
    u32 => uris::U32,
    u64 => uris::U64,
}

// Host sized integers travel at the 32-bit wire width;
// values beyond it fail rather than wrap
impl Represent for isize
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri(uris::I32)
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let narrowed = i32::try_from(*self)
            .map_err(|_| crate::error::Error::from(InternalError::new(ErrorCode::IntOverflow)))?;

        narrowed.represent(ctx, registry)
    }
}

impl Represent for usize
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri(uris::U32)
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let narrowed = u32::try_from(*self)
            .map_err(|_| crate::error::Error::from(InternalError::new(ErrorCode::IntOverflow)))?;

        narrowed.represent(ctx, registry)
    }
}

macro_rules! represent_float {
    ($( $t:ty => $uri:expr ),* $(,)?) => {$(
        impl Represent for $t
        {
            fn tag(registry: &mut TagRegistry) -> TagId
            {
                registry.register_uri($uri)
            }

            fn represent(
                &self,
                ctx: &mut SerializationContext,
                registry: &mut TagRegistry,
            ) -> Result<()>
            {
                let content = if self.is_nan()
                {
                    ".nan".to_owned()
                }
                else if *self == <$t>::INFINITY
                {
                    ".inf".to_owned()
                }
                else if *self == <$t>::NEG_INFINITY
                {
                    "-.inf".to_owned()
                }
                else
                {
                    self.to_string()
                };

                let real = Self::tag(registry);
                represent_scalar(content, real, ctx, registry);

                Ok(())
            }
        }
    )*};
}

represent_float! {
    f32 => uris::F32,
    f64 => uris::F64,
}

impl Represent for bool
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.boolean()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let content = match self
        {
            true => "true",
            false => "false",
        };
        let real = Self::tag(registry);
        represent_scalar(content, real, ctx, registry);

        Ok(())
    }
}

impl Represent for char
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri(uris::CHAR)
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        represent_scalar(self.to_string(), real, ctx, registry);

        Ok(())
    }
}

impl Represent for String
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.string()
    }

    fn null_tag(registry: &mut TagRegistry) -> TagId
    {
        registry.null_string()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        represent_scalar(self.clone(), real, ctx, registry);

        Ok(())
    }
}

/*
 * ==== Containers ====
 */

impl<T> Represent for Vec<T>
where
    T: Represent,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.seq()
    }

    fn null_tag(registry: &mut TagRegistry) -> TagId
    {
        registry.null_seq()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        let tag = ctx.style_tag(real, registry.question());

        ctx.emit(StructEvent::SeqStart {
            tag,
            anchor: AnchorId::NONE,
        });

        for element in self
        {
            element.represent(ctx, registry)?;
        }

        ctx.emit(StructEvent::SeqEnd);

        Ok(())
    }
}

impl<T> Represent for HashSet<T>
where
    T: Represent + Eq + Hash,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.seq()
    }

    fn null_tag(registry: &mut TagRegistry) -> TagId
    {
        registry.null_seq()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        let tag = ctx.style_tag(real, registry.question());

        ctx.emit(StructEvent::SeqStart {
            tag,
            anchor: AnchorId::NONE,
        });

        for element in self
        {
            element.represent(ctx, registry)?;
        }

        ctx.emit(StructEvent::SeqEnd);

        Ok(())
    }
}

impl<K, V> Represent for HashMap<K, V>
where
    K: Represent + Eq + Hash,
    V: Represent,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.map()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        let tag = ctx.style_tag(real, registry.question());

        ctx.emit(StructEvent::MapStart {
            tag,
            anchor: AnchorId::NONE,
        });

        for (key, value) in self
        {
            key.represent(ctx, registry)?;
            value.represent(ctx, registry)?;
        }

        ctx.emit(StructEvent::MapEnd);

        Ok(())
    }
}

impl<K, V> Represent for Pairs<K, V>
where
    K: Represent,
    V: Represent,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.register_uri("tag:yaml.org,2002:omap")
    }

    fn null_tag(registry: &mut TagRegistry) -> TagId
    {
        registry.null_seq()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        let tag = ctx.style_tag(real, registry.question());

        ctx.emit(StructEvent::SeqStart {
            tag,
            anchor: AnchorId::NONE,
        });

        for (key, value) in self.iter()
        {
            ctx.count_node();
            ctx.emit(StructEvent::map(registry.question()));
            key.represent(ctx, registry)?;
            value.represent(ctx, registry)?;
            ctx.emit(StructEvent::MapEnd);
        }

        ctx.emit(StructEvent::SeqEnd);

        Ok(())
    }
}

impl<T, const N: usize> Represent for [T; N]
where
    T: Represent,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        registry.seq()
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let real = Self::tag(registry);
        let tag = ctx.style_tag(real, registry.question());

        ctx.emit(StructEvent::SeqStart {
            tag,
            anchor: AnchorId::NONE,
        });

        for element in self
        {
            element.represent(ctx, registry)?;
        }

        ctx.emit(StructEvent::SeqEnd);

        Ok(())
    }
}

impl<T> Represent for Option<T>
where
    T: Represent,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        T::tag(registry)
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        match self
        {
            Some(value) => value.represent(ctx, registry),
            None =>
            {
                // Null sentinels bypass tag styling so
                // nullability survives a round trip
                let tag = T::null_tag(registry);

                ctx.count_node();
                ctx.emit(StructEvent::scalar("", tag));

                Ok(())
            },
        }
    }
}

impl<T> Represent for Rc<RefCell<T>>
where
    T: Represent,
{
    fn tag(registry: &mut TagRegistry) -> TagId
    {
        T::tag(registry)
    }

    fn represent(&self, ctx: &mut SerializationContext, registry: &mut TagRegistry)
        -> Result<()>
    {
        let object = Rc::as_ptr(self) as usize;

        match ctx.anchor_style()
        {
            AnchorStyle::None => self.borrow().represent(ctx, registry),

            _ if ctx.seen(object) => match ctx.anchor_repeat(object)
            {
                Some(target) =>
                {
                    ctx.emit(StructEvent::Alias { target });

                    Ok(())
                },
                None => Err(InternalError::new(ErrorCode::CorruptStream).into()),
            },

            AnchorStyle::Always =>
            {
                ctx.anchor_first(object);

                self.borrow().represent(ctx, registry)
            },
            AnchorStyle::Tidy =>
            {
                ctx.record_first(object);

                self.borrow().represent(ctx, registry)
            },
        }
    }
}
