/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Per-document state tracking the identity of anchored
//! objects, used to resolve aliases while loading and to
//! emit anchors while dumping.
//!
//! Neither context is shared between documents or threads;
//! a process may hold many of them in distinct flows of
//! control.

use std::{any::Any, collections::HashMap, rc::Rc};

use crate::{
    error::{
        internal::{Error as InternalError, ErrorCode},
        Result,
    },
    event::types::{AnchorId, StructEvent},
    tags::TagId,
};

/// Construction side identity state: which object each
/// anchor id is bound to.
///
/// An anchor binds to at most one object per document.
#[derive(Debug, Default)]
pub struct ConstructionContext
{
    refs: HashMap<AnchorId, Rc<dyn Any>>,
}

impl ConstructionContext
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Bind .anchor to .object. Binding an anchor twice in
    /// one document is an error
    pub fn bind(&mut self, anchor: AnchorId, object: Rc<dyn Any>) -> Result<()>
    {
        if self.refs.insert(anchor, object).is_some()
        {
            return Err(InternalError::new(ErrorCode::DuplicateAnchor).into());
        }

        Ok(())
    }

    /// Resolve .anchor to the object it was bound to, if
    /// any
    pub fn resolve(&self, anchor: AnchorId) -> Option<Rc<dyn Any>>
    {
        self.refs.get(&anchor).cloned()
    }
}

/// The anchor emission policies available while dumping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStyle
{
    /// Never emit anchors; references are dereferenced
    /// inline and aliasing is not detected
    None,
    /// Anchor only the objects that are actually referenced
    /// more than once, patching them in a post-pass over
    /// the buffered document
    Tidy,
    /// Anchor every referenced object on first sight
    Always,
}

/// How node tags are written while dumping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStyle
{
    /// Every node carries the non-specific '?' tag
    None,
    /// The root carries its real tag, everything beneath
    /// carries '?'
    RootOnly,
    /// Every node carries its real tag
    All,
}

#[derive(Debug)]
struct AnchorEntry
{
    anchor: AnchorId,
    /// Index of the object's first occurrence in the
    /// buffered events
    first:  usize,
}

/// Serialization side identity state: buffered output
/// events, object -> anchor bookkeeping and the id
/// generator.
#[derive(Debug)]
pub struct SerializationContext
{
    events: Vec<StructEvent>,

    anchor_style: AnchorStyle,
    tag_style:    TagStyle,

    anchors:        HashMap<usize, AnchorEntry>,
    next_anchor:    u32,
    pending_anchor: AnchorId,

    nodes: usize,
}

impl SerializationContext
{
    pub fn new(tag_style: TagStyle, anchor_style: AnchorStyle) -> Self
    {
        Self {
            events: Vec::new(),
            anchor_style,
            tag_style,
            anchors: HashMap::new(),
            next_anchor: 0,
            pending_anchor: AnchorId::NONE,
            nodes: 0,
        }
    }

    pub fn anchor_style(&self) -> AnchorStyle
    {
        self.anchor_style
    }

    /// Append .event to the buffered document, attaching
    /// any pending anchor to it
    pub fn emit(&mut self, mut event: StructEvent)
    {
        if self.pending_anchor.is_some()
        {
            event.set_anchor(self.pending_anchor);
            self.pending_anchor = AnchorId::NONE;
        }

        self.events.push(event);
    }

    /// The tag the next emitted node should carry, given
    /// its real tag .real and the '?' id .question
    pub fn style_tag(&mut self, real: TagId, question: TagId) -> TagId
    {
        let node = self.nodes;
        self.nodes += 1;

        match self.tag_style
        {
            TagStyle::All => real,
            TagStyle::RootOnly if node == 0 => real,
            _ => question,
        }
    }

    /// Count a node emitted outside of
    /// [`style_tag`](Self::style_tag), e.g. the null
    /// sentinels which bypass tag styling
    pub fn count_node(&mut self)
    {
        self.nodes += 1;
    }

    /// First sight of a reference under
    /// [`AnchorStyle::Tidy`]: remember the object with the
    /// NONE sentinel, to be patched if it is ever seen
    /// again
    pub fn record_first(&mut self, object: usize)
    {
        let first = self.events.len();

        self.anchors.entry(object).or_insert(AnchorEntry {
            anchor: AnchorId::NONE,
            first,
        });
    }

    /// First sight of a reference under
    /// [`AnchorStyle::Always`]: assign a fresh id and
    /// attach it to the next emitted node
    pub fn anchor_first(&mut self, object: usize)
    {
        let anchor = self.generate();
        let first = self.events.len();

        self.anchors
            .entry(object)
            .or_insert(AnchorEntry { anchor, first });
        self.pending_anchor = anchor;
    }

    /// A repeat sight of a reference: return the alias
    /// target, assigning the id now if the first sight
    /// recorded the NONE sentinel
    pub fn anchor_repeat(&mut self, object: usize) -> Option<AnchorId>
    {
        let next = AnchorId::new(self.next_anchor + 1);

        let entry = self.anchors.get_mut(&object)?;

        if entry.anchor.is_none()
        {
            entry.anchor = next;
            self.next_anchor += 1;
        }

        Some(entry.anchor)
    }

    /// Checks whether .object has been seen before
    pub fn seen(&self, object: usize) -> bool
    {
        self.anchors.contains_key(&object)
    }

    /// Replace the NONE sentinel on the first occurrence of
    /// every multiply referenced object, then return the
    /// buffered document
    pub fn into_events(mut self) -> Vec<StructEvent>
    {
        for entry in self.anchors.values()
        {
            if entry.anchor.is_some()
            {
                if let Some(event) = self.events.get_mut(entry.first)
                {
                    if event.anchor().is_none()
                    {
                        event.set_anchor(entry.anchor);
                    }
                }
            }
        }

        self.events
    }

    fn generate(&mut self) -> AnchorId
    {
        self.next_anchor += 1;

        AnchorId::new(self.next_anchor)
    }
}
