/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The event stream interface between the external parser
//! and the construction engine.
//!
//! [`Events`] wraps any fallible producer of
//! [`StructEvent`]s into the forward, peekable stream the
//! engine consumes: a single peek slot that may be
//! replaced in place (used to strip anchors before
//! recursing), and a best-effort source location for error
//! reporting.

pub mod types;

pub use self::types::{AnchorId, ScalarStyle, StructEvent};
use crate::error::{
    internal::{Error as InternalError, ErrorCode, SourceError},
    Error, Result,
};

/// Best-effort source location of the event most recently
/// produced, supplied by the producer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenContext
{
    /// 1-based line number
    pub line:    u64,
    /// 0-based column
    pub column:  u64,
    /// The text of the line, as far as it is known
    pub content: String,
}

/// A forward, peekable, finite stream of [`StructEvent`]s
#[derive(Debug)]
pub struct Events<I>
{
    iter:    I,
    peeked:  Option<StructEvent>,
    failure: Option<Error>,
    context: Option<TokenContext>,
}

impl<I> Events<I>
where
    I: Iterator<Item = Result<StructEvent>>,
{
    /// Wrap a fallible event producer
    pub fn new(iter: I) -> Self
    {
        Self {
            iter,
            peeked: None,
            failure: None,
            context: None,
        }
    }

    /// Take the next event, advancing the stream
    pub fn next(&mut self) -> Result<StructEvent>
    {
        self.fill();

        if let Some(failure) = self.failure.take()
        {
            return Err(failure);
        }

        self.peeked
            .take()
            .ok_or_else(|| InternalError::new(ErrorCode::UnexpectedEOF).into())
    }

    /// Look at the next event without advancing.
    /// Idempotent
    pub fn peek(&mut self) -> Result<&StructEvent>
    {
        self.fill();

        if let Some(failure) = self.failure.take()
        {
            return Err(failure);
        }

        self.peeked
            .as_ref()
            .ok_or_else(|| InternalError::new(ErrorCode::UnexpectedEOF).into())
    }

    /// Look at the next event mutably, typically to strip
    /// its anchor before recursing into it
    pub fn peek_mut(&mut self) -> Result<&mut StructEvent>
    {
        self.fill();

        if let Some(failure) = self.failure.take()
        {
            return Err(failure);
        }

        self.peeked
            .as_mut()
            .ok_or_else(|| InternalError::new(ErrorCode::UnexpectedEOF).into())
    }

    /// Replace the peeked event outright
    pub fn set_peek(&mut self, event: StructEvent)
    {
        self.peeked = Some(event);
    }

    /// Checks if the stream has no further events
    pub fn finished(&mut self) -> bool
    {
        self.fill();

        self.peeked.is_none() && self.failure.is_none()
    }

    /// Best-effort source location of the last produced
    /// event. Returns None if the producer supplied no
    /// location
    pub fn last_token_context(&self) -> Option<&TokenContext>
    {
        self.context.as_ref()
    }

    /// Record the source location of the events about to be
    /// produced. Intended for the producing parser
    pub fn set_context(&mut self, context: TokenContext)
    {
        self.context = Some(context);
    }

    fn fill(&mut self)
    {
        if self.peeked.is_some() || self.failure.is_some()
        {
            return;
        }

        match self.iter.next()
        {
            Some(Ok(event)) => self.peeked = Some(event),
            Some(Err(error)) => self.failure = Some(error),
            None =>
            {},
        }
    }
}

/// Wrap an already materialised event sequence, e.g. one
/// returned by [`represent`](crate::represent::represent)
pub fn from_events(
    events: Vec<StructEvent>,
) -> Events<impl Iterator<Item = Result<StructEvent>>>
{
    Events::new(events.into_iter().map(Ok))
}

/// Wrap an infallible producer whose failures are already
/// materialised as a terminal error
pub fn failing(
    error: std::io::Error,
) -> Events<impl Iterator<Item = Result<StructEvent>>>
{
    let wrapped: Error = InternalError::new(SourceError::from(error)).into();

    Events::new(std::iter::once(Err(wrapped)))
}
