/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The type directed construction engine.
//!
//! Each constructible type implements [`Construct`]; the
//! engine glue ([`construct_child_default`]) resolves
//! aliases, validates tags against the target type,
//! rejects anchors on non reference targets and dispatches
//! implicit variants, before handing the node to the
//! type's own constructor.
//!
//! One document is consumed per [`load`] call, from its
//! DocStart through its matching DocEnd. Errors propagate
//! immediately; the stream position is undefined
//! afterwards.

pub(crate) mod collection;
pub(crate) mod record;
pub(crate) mod scalar;

#[cfg(test)]
mod tests;

pub use self::{
    collection::Pairs,
    record::{next_key, variant_begin, variant_end_field, variant_next, FieldSet},
};
pub use crate::context::ConstructionContext;
use crate::{
    error::{
        internal::{ConstructError, Error as InternalError, ErrorCode, ErrorKind},
        Error, Result,
    },
    event::{
        types::{ScalarStyle, StructEvent},
        Events, TokenContext,
    },
    guess::{guess_type, TypeHint},
    tags::{TagId, TagRegistry},
};

/// A type that can be constructed from a document's
/// structural events.
///
/// Implementations provide the type's canonical [`tag`]
/// and the object level [`construct`]; the engine supplies
/// tag validation, alias resolution and anchor rejection
/// through the default [`construct_child`]. Types with
/// special event-level behavior (references, nullables,
/// implicit variants) override the latter.
///
/// [`tag`]: Construct::tag
/// [`construct`]: Construct::construct
/// [`construct_child`]: Construct::construct_child
pub trait Construct: Sized
{
    /// The canonical tag of this type, registered lazily
    fn tag(registry: &mut TagRegistry) -> TagId;

    /// Wire form omits the variant wrapper and carries
    /// only the branch payload
    const IMPLICIT_VARIANT: bool = false;

    /// Reference-like: may carry anchors and resolve
    /// aliases
    const IS_REF: bool = false;

    /// Whether the '!' non-specific tag is accepted;
    /// mappings and sequences exclude it
    const ALLOW_NON_SPECIFIC: bool = true;

    /// Construct a value from the node at the stream head,
    /// after the engine validated its tag and anchor
    fn construct<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>;

    /// Construct a value through the engine glue. Override
    /// only for event-level special behavior
    fn construct_child<I>(
        events: &mut Events<I>,
        ctx: &mut ConstructionContext,
        registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        construct_child_default::<Self, I>(events, ctx, registry)
    }

    /// Pick and construct the implicit variant branch
    /// whose payload tag lies in .possible. Only called
    /// when [`IMPLICIT_VARIANT`](Self::IMPLICIT_VARIANT)
    /// is set
    fn construct_implicit<I>(
        _possible: &[TagId],
        _events: &mut Events<I>,
        _ctx: &mut ConstructionContext,
        _registry: &mut TagRegistry,
    ) -> Result<Self>
    where
        I: Iterator<Item = Result<StructEvent>>,
    {
        Err(InternalError::new(ErrorCode::CorruptStream).into())
    }
}

/// The engine's dispatch glue; see the module
/// documentation for the rules applied
pub fn construct_child_default<T, I>(
    events: &mut Events<I>,
    ctx: &mut ConstructionContext,
    registry: &mut TagRegistry,
) -> Result<T>
where
    T: Construct,
    I: Iterator<Item = Result<StructEvent>>,
{
    let location = events.last_token_context().cloned();

    // Aliases only ever resolve into reference types, and
    // those override construct_child entirely
    if matches!(events.peek()?, StructEvent::Alias { .. })
    {
        return Err(contextualize(location, ErrorCode::AnchorOnNonRef));
    }

    if T::IMPLICIT_VARIANT
    {
        let possible = possible_tags(events, registry)?;

        return T::construct_implicit(&possible, events, ctx, registry);
    }

    let (tag, anchor) = {
        let event = events.peek()?;

        (event.tag(), event.anchor())
    };

    if let Some(tag) = tag
    {
        let expected = T::tag(registry);
        let accepted = tag == registry.question()
            || tag == expected
            || (T::ALLOW_NON_SPECIFIC && tag == registry.exclamation());

        if !accepted
        {
            return Err(contextualize(
                location,
                ConstructError::WrongTag {
                    expected: registry.uri(expected).to_owned(),
                    found:    registry.uri(tag).to_owned(),
                },
            ));
        }

        if anchor.is_some() && !T::IS_REF
        {
            return Err(contextualize(location, ErrorCode::AnchorOnNonRef));
        }
    }

    T::construct(events, ctx, registry)
}

/// Consume one document from .events, constructing a T
/// from its content
pub fn load<T, I>(events: &mut Events<I>, registry: &mut TagRegistry) -> Result<T>
where
    T: Construct,
    I: Iterator<Item = Result<StructEvent>>,
{
    if matches!(events.peek()?, StructEvent::StreamStart)
    {
        events.next()?;
    }

    let mut ctx = ConstructionContext::new();

    load_document(events, &mut ctx, registry)
}

/// Consume every document in .events, constructing a T
/// from each
pub fn load_multi<T, I>(events: &mut Events<I>, registry: &mut TagRegistry) -> Result<Vec<T>>
where
    T: Construct,
    I: Iterator<Item = Result<StructEvent>>,
{
    let mut documents = Vec::new();

    // Anchors accumulate across the documents of one
    // stream, so a later document may alias an earlier one
    let mut ctx = ConstructionContext::new();

    if !events.finished() && matches!(events.peek()?, StructEvent::StreamStart)
    {
        events.next()?;
    }

    loop
    {
        if events.finished()
        {
            break;
        }

        if matches!(events.peek()?, StructEvent::StreamEnd)
        {
            events.next()?;
            break;
        }

        documents.push(load_document(events, &mut ctx, registry)?);
    }

    Ok(documents)
}

fn load_document<T, I>(
    events: &mut Events<I>,
    ctx: &mut ConstructionContext,
    registry: &mut TagRegistry,
) -> Result<T>
where
    T: Construct,
    I: Iterator<Item = Result<StructEvent>>,
{
    expect_doc_start(events)?;

    let value = T::construct_child(events, ctx, registry)?;

    expect_doc_end(events)?;

    Ok(value)
}

/// Compute the tags an implicit variant payload may carry,
/// from the event at the stream head
fn possible_tags<I>(events: &mut Events<I>, registry: &mut TagRegistry) -> Result<Vec<TagId>>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    let location = events.last_token_context().cloned();
    let question = registry.question();
    let exclamation = registry.exclamation();

    match events.peek()?
    {
        StructEvent::Scalar { content, tag, .. } if *tag == question => match guess_type(content)
        {
            TypeHint::Integer =>
            {
                let negative = content.starts_with('-');
                let mut set = registry.signed_integer_tags().to_vec();

                if !negative
                {
                    set.extend(registry.unsigned_integer_tags().iter());
                }

                Ok(set)
            },
            TypeHint::Float | TypeHint::FloatInf | TypeHint::FloatNaN =>
            {
                Ok(registry.float_tags().to_vec())
            },
            TypeHint::BoolTrue | TypeHint::BoolFalse => Ok(vec![registry.boolean()]),
            TypeHint::Null => Ok(vec![registry.null()]),
            TypeHint::Unknown => Ok(vec![registry.string()]),
        },
        StructEvent::Scalar { tag, .. } if *tag == exclamation => Ok(vec![registry.string()]),
        StructEvent::Scalar { tag, .. } => Ok(vec![*tag]),

        StructEvent::MapStart { tag, .. } =>
        {
            if *tag == question || *tag == exclamation
            {
                Err(contextualize(
                    location,
                    ConstructError::ComplexValueWithoutTag("mapping"),
                ))
            }
            else
            {
                Ok(vec![*tag])
            }
        },
        StructEvent::SeqStart { tag, .. } =>
        {
            if *tag == question || *tag == exclamation
            {
                Err(contextualize(
                    location,
                    ConstructError::ComplexValueWithoutTag("sequence"),
                ))
            }
            else
            {
                Ok(vec![*tag])
            }
        },

        _ => Err(contextualize(
            location,
            ConstructError::UnexpectedEvent { expected: "node" },
        )),
    }
}

/*
 * ==== Event expectation helpers ====
 */

/// Take the next event, requiring a scalar
pub fn expect_scalar<I>(
    events: &mut Events<I>,
    expected: &'static str,
) -> Result<(String, TagId, ScalarStyle)>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    let location = events.last_token_context().cloned();

    match events.next()?
    {
        StructEvent::Scalar {
            content, tag, style, ..
        } => Ok((content, tag, style)),
        _ => Err(contextualize(
            location,
            ConstructError::UnexpectedEvent { expected },
        )),
    }
}

macro_rules! expect_event {
    ($( $(#[$meta:meta])* $name:ident => $variant:pat, $expected:expr );* $(;)?) => {$(
        $(#[$meta])*
        pub fn $name<I>(events: &mut Events<I>) -> Result<()>
        where
            I: Iterator<Item = Result<StructEvent>>,
        {
            let location = events.last_token_context().cloned();

            match events.next()?
            {
                $variant => Ok(()),
                _ => Err(contextualize(
                    location,
                    ConstructError::UnexpectedEvent {
                        expected: $expected,
                    },
                )),
            }
        }
    )*};
}

expect_event! {
    /// Take the next event, requiring a mapping start
    expect_map_start => StructEvent::MapStart { .. }, "mapping start";
    /// Take the next event, requiring a mapping end
    expect_map_end => StructEvent::MapEnd, "mapping end";
    /// Take the next event, requiring a sequence start
    expect_seq_start => StructEvent::SeqStart { .. }, "sequence start";
    /// Take the next event, requiring a sequence end
    expect_seq_end => StructEvent::SeqEnd, "sequence end";
    /// Take the next event, requiring a document start
    expect_doc_start => StructEvent::DocStart, "document start";
    /// Take the next event, requiring a document end
    expect_doc_end => StructEvent::DocEnd, "document end";
}

/*
 * ==== Error constructors for Construct implementations ====
 */

/// Error: a required record field was absent
pub fn missing_field_error(field: &str) -> Error
{
    InternalError::new(ConstructError::MissingField(field.to_owned())).into()
}

/// Error: a key matching no record field appeared
pub fn unknown_field_error(field: &str) -> Error
{
    InternalError::new(ConstructError::UnknownField(field.to_owned())).into()
}

/// Error: a record field appeared twice
pub fn duplicate_field_error(field: &str) -> Error
{
    InternalError::new(ConstructError::DuplicateField(field.to_owned())).into()
}

/// Error: a variant field is not permitted by the current
/// discriminator value
pub fn field_not_allowed_error(field: &str, discriminator: &str, value: &str) -> Error
{
    InternalError::new(ConstructError::FieldNotAllowed {
        field:         field.to_owned(),
        discriminator: discriminator.to_owned(),
        value:         value.to_owned(),
    })
    .into()
}

/// Error: no implicit variant branch matched the value's
/// possible tags
pub fn no_variant_match_error(type_name: &'static str, uri: &str) -> Error
{
    InternalError::new(ConstructError::NoVariantMatch {
        type_name,
        uri: uri.to_owned(),
    })
    .into()
}

/// Error: a scalar's content did not parse as the target
/// primitive
pub fn malformed_scalar_error(expected: &'static str, content: String) -> Error
{
    InternalError::new(ConstructError::MalformedScalar { expected, content }).into()
}

/// Attach the event stream's best-effort source location
/// to .kind
pub(crate) fn contextualize<K>(location: Option<TokenContext>, kind: K) -> Error
where
    K: Into<ErrorKind>,
{
    let err = match location
    {
        Some(loc) => InternalError::with_context(kind, 0, loc.line, loc.column),
        None => InternalError::new(kind),
    };

    err.into()
}
