/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! A bidirectional mapping between tag URIs and the dense
//! [`TagId`] handles carried by structural events.
//!
//! Registration is lazy and idempotent; a handful of well
//! known URIs are registered eagerly so their ids can be
//! handed out without lookups. The registry is always
//! passed explicitly; there is no process wide instance.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Opaque dense handle for a registered tag URI
    pub struct TagId;
}

/// URIs of the eagerly registered tags
pub mod uris
{
    /// The '?' non-specific tag of untagged nodes
    pub const QUESTION: &str = "?";
    /// The '!' non-specific tag
    pub const EXCLAMATION: &str = "!";

    pub const STRING: &str = "tag:yaml.org,2002:str";
    pub const INTEGER: &str = "tag:yaml.org,2002:int";
    pub const FLOAT: &str = "tag:yaml.org,2002:float";
    pub const BOOLEAN: &str = "tag:yaml.org,2002:bool";
    pub const NULL: &str = "tag:yaml.org,2002:null";
    pub const MAP: &str = "tag:yaml.org,2002:map";
    pub const SEQ: &str = "tag:yaml.org,2002:seq";

    /// Sentinel for a null string, distinct from the empty
    /// scalar
    pub const NULL_STRING: &str = "tag:yatl.dev,2025:null:string";
    /// Sentinel for a null sequence
    pub const NULL_SEQ: &str = "tag:yatl.dev,2025:null:seq";

    pub const I8: &str = "tag:yatl.dev,2025:rust:i8";
    pub const I16: &str = "tag:yatl.dev,2025:rust:i16";
    pub const I32: &str = "tag:yatl.dev,2025:rust:i32";
    pub const I64: &str = "tag:yatl.dev,2025:rust:i64";
    pub const U8: &str = "tag:yatl.dev,2025:rust:u8";
    pub const U16: &str = "tag:yatl.dev,2025:rust:u16";
    pub const U32: &str = "tag:yatl.dev,2025:rust:u32";
    pub const U64: &str = "tag:yatl.dev,2025:rust:u64";
    pub const F32: &str = "tag:yatl.dev,2025:rust:f32";
    pub const F64: &str = "tag:yatl.dev,2025:rust:f64";
    pub const CHAR: &str = "tag:yatl.dev,2025:rust:char";
}

/// Bidirectional URI <-> [`TagId`] registry with lazy,
/// idempotent registration
#[derive(Debug)]
pub struct TagRegistry
{
    by_id:  SlotMap<TagId, String>,
    by_uri: HashMap<String, TagId>,

    question:    TagId,
    exclamation: TagId,
    string:      TagId,
    integer:     TagId,
    float:       TagId,
    boolean:     TagId,
    null:        TagId,
    map:         TagId,
    seq:         TagId,
    null_string: TagId,
    null_seq:    TagId,
}

impl TagRegistry
{
    pub fn new() -> Self
    {
        let mut this = Self {
            by_id:       SlotMap::with_key(),
            by_uri:      HashMap::new(),
            question:    TagId::default(),
            exclamation: TagId::default(),
            string:      TagId::default(),
            integer:     TagId::default(),
            float:       TagId::default(),
            boolean:     TagId::default(),
            null:        TagId::default(),
            map:         TagId::default(),
            seq:         TagId::default(),
            null_string: TagId::default(),
            null_seq:    TagId::default(),
        };

        this.question = this.register_uri(uris::QUESTION);
        this.exclamation = this.register_uri(uris::EXCLAMATION);
        this.string = this.register_uri(uris::STRING);
        this.integer = this.register_uri(uris::INTEGER);
        this.float = this.register_uri(uris::FLOAT);
        this.boolean = this.register_uri(uris::BOOLEAN);
        this.null = this.register_uri(uris::NULL);
        this.map = this.register_uri(uris::MAP);
        this.seq = this.register_uri(uris::SEQ);
        this.null_string = this.register_uri(uris::NULL_STRING);
        this.null_seq = this.register_uri(uris::NULL_SEQ);

        this
    }

    /// Register .uri, returning its id. Registering an
    /// already known URI returns the existing id
    pub fn register_uri(&mut self, uri: &str) -> TagId
    {
        if let Some(&id) = self.by_uri.get(uri)
        {
            return id;
        }

        let id = self.by_id.insert(uri.to_owned());
        self.by_uri.insert(uri.to_owned(), id);

        id
    }

    /// The URI registered for .id
    pub fn uri(&self, id: TagId) -> &str
    {
        self.by_id
            .get(id)
            .map(String::as_str)
            .unwrap_or("<unregistered tag>")
    }

    /// Look up a URI without registering it
    pub fn lookup(&self, uri: &str) -> Option<TagId>
    {
        self.by_uri.get(uri).copied()
    }

    /// The '?' tag of untagged nodes
    pub fn question(&self) -> TagId
    {
        self.question
    }

    /// The '!' non-specific tag
    pub fn exclamation(&self) -> TagId
    {
        self.exclamation
    }

    pub fn string(&self) -> TagId
    {
        self.string
    }

    pub fn integer(&self) -> TagId
    {
        self.integer
    }

    pub fn float(&self) -> TagId
    {
        self.float
    }

    pub fn boolean(&self) -> TagId
    {
        self.boolean
    }

    pub fn null(&self) -> TagId
    {
        self.null
    }

    pub fn map(&self) -> TagId
    {
        self.map
    }

    pub fn seq(&self) -> TagId
    {
        self.seq
    }

    /// Sentinel tag marking a null string
    pub fn null_string(&self) -> TagId
    {
        self.null_string
    }

    /// Sentinel tag marking a null sequence
    pub fn null_seq(&self) -> TagId
    {
        self.null_seq
    }

    /// Tags of every signed integer width, for implicit
    /// variant dispatch
    pub fn signed_integer_tags(&mut self) -> [TagId; 4]
    {
        [
            self.register_uri(uris::I8),
            self.register_uri(uris::I16),
            self.register_uri(uris::I32),
            self.register_uri(uris::I64),
        ]
    }

    /// Tags of every unsigned integer width, for implicit
    /// variant dispatch
    pub fn unsigned_integer_tags(&mut self) -> [TagId; 4]
    {
        [
            self.register_uri(uris::U8),
            self.register_uri(uris::U16),
            self.register_uri(uris::U32),
            self.register_uri(uris::U64),
        ]
    }

    /// Tags of every float width, for implicit variant
    /// dispatch
    pub fn float_tags(&mut self) -> [TagId; 2]
    {
        [
            self.register_uri(uris::F32),
            self.register_uri(uris::F64),
        ]
    }
}

impl Default for TagRegistry
{
    fn default() -> Self
    {
        Self::new()
    }
}
