/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This library exposes the core of a YAML 1.2 processing
//! stack: a streaming lexer over multi-encoding byte
//! streams, and a type-directed construction /
//! representation engine that drives structural event
//! streams into and out of statically typed values.
//!
//! The token→event parser and the presenter are external
//! collaborators; this crate defines the event stream they
//! speak ([`event`]) and everything below ([`source`],
//! [`lexer`]) and above ([`construct`], [`represent`]) it.

#![allow(clippy::suspicious_else_formatting)]

pub mod construct;
pub mod event;
pub mod lexer;
pub mod represent;
pub mod source;
pub mod tags;

mod context;
mod error;
mod guess;
mod token;

pub use crate::{
    construct::{load, load_multi, Construct},
    error::{Category, Error, Result},
    guess::{guess_type, TypeHint},
    represent::{dump, dump_multi, AnchorStyle, Represent, TagStyle},
    token::{LexEvent, LexEventKind},
};
