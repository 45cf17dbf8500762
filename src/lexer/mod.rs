/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! A streaming YAML lexer.
//!
//! The [`Lexer`] is a deterministic state machine over the
//! logical characters of a [`ByteSource`], producing a
//! finite sequence of [`LexEvent`]s which always terminates
//! with [`StreamEnd`](LexEventKind::StreamEnd). Lexical
//! problems never abort the stream; they are surfaced
//! inline as [`Error`](LexEventKind::Error) events and the
//! machine continues on a best effort basis.
//!
//! Payload text lives in a content scratch reused across
//! events; [`content()`](Lexer::content) borrows it until
//! the next event is requested, so callers wanting to
//! retain it must copy out.

// Note that this module must come before all others, as
// they depend on the macros which expand into this scope
#[macro_use]
mod macros;

pub(crate) mod flag;

mod escape;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

pub use self::flag::{Flags, O_SKIP_COMMENTS, O_ZEROED};
use crate::{
    lexer::escape::{as_hex, escape_length, unescape_simple, write_unicode_point},
    source::ByteSource,
    token::{LexEvent, LexEventKind},
};

/// Lexer states, grouped roughly as
/// initial/content/directive/scalar/indentation/comment/
/// tag/separator. Every state consumes one logical
/// character per step, except where a one character
/// lookahead decides a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State
{
    /// Before the first document content, where directives
    /// are legal
    Initial,
    /// Start of a physical line inside a document
    Indentation,
    /// Dispatch within a line's content
    Content,

    PlainScalar,
    SingleQuoted,
    DoubleQuoted,
    /// After a backslash in a double quoted scalar
    Escape,
    /// Accumulating the hex digits of a \x, \u or \U escape
    UnicodeEscape,

    /// A run of '-' that may become '---', a block entry or
    /// a plain scalar
    Dashes,
    /// A run of '.' that may become '...' or a plain scalar
    Dots,

    /// After a '!', deciding between verbatim, handle and
    /// suffix forms
    TagStart,
    VerbatimTag,
    TagSuffix,

    AnchorName,
    AliasName,

    DirectiveName,
    MajorVersion,
    MinorVersion,
    TagDirHandle,
    TagDirUri,
    DirectiveParams,

    Comment,
    DirectiveComment,

    BlockScalarHeader,
    BlockScalarLine,

    Done,
}

/// An event that must be emitted on the next step, after
/// the current one was finalised by lookahead
#[derive(Debug)]
enum Pending
{
    /// A control character that terminated a plain scalar
    Ctrl(u8, usize),
    /// A tag suffix captured while lexing its handle
    Suffix(Vec<u8>, usize),
    /// The stream terminator following a fatal error
    StreamEnd,
}

/// A streaming lexer over a [`ByteSource`]
#[derive(Debug)]
pub struct Lexer
{
    source: ByteSource,
    opts:   Flags,
    state:  State,

    /// Content slot, reused across events
    scratch:      Vec<u8>,
    /// Column of the current token's first character
    token_column: usize,

    /// Count of unclosed '[' and '{'
    flow_depth:      usize,
    /// Inside document content (controls LineStart
    /// emission and directive legality)
    in_document:     bool,
    /// Indentation width of the current line
    last_indent:     usize,
    /// Base indentation of an active block scalar
    block_scalar:    Option<usize>,
    /// A LineStart owed before the current token resolves
    need_line_start: bool,

    /// The state lexing resumes in once a comment's line
    /// is exhausted
    comment_resume: State,

    /// A special character whose interpretation depends on
    /// the character that follows it
    deferred: Option<(u8, usize)>,
    pending:  Option<Pending>,
    /// Whitespace held back inside a plain scalar, only
    /// committed if content follows on the same line
    trailing: Vec<u8>,

    // Unicode escape accumulator
    unicode_char:    u32,
    escape_expected: u8,
    escape_received: u8,

    /// Run length while in Dashes or Dots
    run: usize,
    /// Did whitespace (or a line start) precede the read
    /// head
    had_blank: bool,

    done: bool,
}

impl Lexer
{
    pub fn new(source: ByteSource, opts: Flags) -> Self
    {
        Self {
            source,
            opts,
            state: State::Initial,
            scratch: Vec::new(),
            token_column: 0,
            flow_depth: 0,
            in_document: false,
            last_indent: 0,
            block_scalar: None,
            need_line_start: false,
            comment_resume: State::Content,
            deferred: None,
            pending: None,
            trailing: Vec::new(),
            unicode_char: 0,
            escape_expected: 0,
            escape_received: 0,
            run: 0,
            had_blank: true,
            done: false,
        }
    }

    /// Borrow the current event's payload text, lossily,
    /// valid until the next event is requested
    pub fn content(&self) -> Cow<'_, str>
    {
        String::from_utf8_lossy(&self.scratch)
    }

    /// Borrow the current event's payload bytes, valid
    /// until the next event is requested
    pub fn content_raw(&self) -> &[u8]
    {
        &self.scratch
    }

    /// 1-based physical line of the read head
    pub fn line(&self) -> usize
    {
        self.source.line()
    }

    /// Produce the next event, or None if the stream has
    /// already terminated
    pub fn next_event(&mut self) -> Option<LexEvent>
    {
        if self.done
        {
            return None;
        }

        if let Some(pending) = self.pending.take()
        {
            return Some(self.emit_pending(pending));
        }

        loop
        {
            match self.step()
            {
                Ok(Some(event)) =>
                {
                    if event.kind == LexEventKind::Comment
                        && self.opts.contains(Flags::SKIP_COMMENTS)
                    {
                        continue;
                    }

                    return Some(event);
                },
                Ok(None) => continue,
                Err(e) =>
                {
                    let msg = format!("IO error: {}", e);

                    return Some(self.fatal(&msg));
                },
            }
        }
    }

    fn emit_pending(&mut self, pending: Pending) -> LexEvent
    {
        match pending
        {
            Pending::Ctrl(c, column) =>
            {
                self.scratch.clear();
                self.scratch.push(c);

                LexEvent::new(LexEventKind::ControlChar, column)
            },
            Pending::Suffix(bytes, column) =>
            {
                self.scratch = bytes;

                LexEvent::new(LexEventKind::TagSuffix, column)
            },
            Pending::StreamEnd =>
            {
                self.scratch.clear();
                self.done = true;

                LexEvent::new(LexEventKind::StreamEnd, self.source.column())
            },
        }
    }

    /// Run the machine until it produces an event (Some) or
    /// requests a redispatch after a state change (None)
    fn step(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        match self.state
        {
            State::Initial => self.initial(),
            State::Indentation => self.indentation(),
            State::Content => self.content_dispatch(),
            State::PlainScalar => self.plain_scalar(),
            State::SingleQuoted => self.single_quoted(),
            State::DoubleQuoted => self.double_quoted(),
            State::Escape => self.escape(),
            State::UnicodeEscape => self.unicode_escape(),
            State::Dashes => self.dashes(),
            State::Dots => self.dots(),
            State::TagStart => self.tag_start(),
            State::VerbatimTag => self.verbatim_tag(),
            State::TagSuffix => self.tag_suffix(),
            State::AnchorName => self.anchor_name(false),
            State::AliasName => self.anchor_name(true),
            State::DirectiveName => self.directive_name(),
            State::MajorVersion => self.major_version(),
            State::MinorVersion => self.minor_version(),
            State::TagDirHandle => self.tag_dir_handle(),
            State::TagDirUri => self.tag_dir_uri(),
            State::DirectiveParams => self.directive_params(),
            State::Comment | State::DirectiveComment => self.comment(),
            State::BlockScalarHeader => self.block_scalar_header(),
            State::BlockScalarLine => self.block_scalar_line(),
            State::Done => Ok(Some(self.stream_end())),
        }
    }

    /*
     * ==== Initial / indentation ====
     */

    fn initial(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        loop
        {
            let unit = match self.source.peek()?
            {
                None => return Ok(Some(self.stream_end())),
                Some(unit) => unit,
            };

            match unit.low
            {
                b' ' =>
                {
                    self.source.next()?;
                    self.scratch.push(b' ');
                },
                // Tabs never contribute to indentation
                b'\t' =>
                {
                    self.source.next()?;
                },
                _ if unit.is_break() =>
                {
                    self.source.next()?;
                    self.scratch.clear();
                },
                b'%' if self.scratch.is_empty() =>
                {
                    self.token_column = self.source.column();
                    self.source.next()?;
                    self.state = State::DirectiveName;

                    return Ok(None);
                },
                b'#' =>
                {
                    self.token_column = self.source.column();
                    self.source.next()?;
                    self.comment_resume = State::Initial;
                    self.state = State::DirectiveComment;

                    return Ok(None);
                },
                b'-' if self.scratch.is_empty() =>
                {
                    self.token_column = 0;
                    self.run = 0;
                    self.need_line_start = true;
                    self.state = State::Dashes;

                    return Ok(None);
                },
                b'.' if self.scratch.is_empty() =>
                {
                    self.token_column = 0;
                    self.run = 0;
                    self.need_line_start = true;
                    self.state = State::Dots;

                    return Ok(None);
                },
                _ =>
                {
                    self.last_indent = self.scratch.len();
                    self.in_document = true;
                    self.had_blank = true;
                    self.state = State::Content;

                    return Ok(Some(LexEvent::new(LexEventKind::LineStart, 0)));
                },
            }
        }
    }

    fn indentation(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        loop
        {
            let unit = self.source.peek()?;

            match unit
            {
                None => return Ok(Some(self.stream_end())),
                Some(u) if u.low == b' ' =>
                {
                    self.source.next()?;
                    self.scratch.push(b' ');
                },
                // Tabs never contribute to indentation
                Some(u) if u.low == b'\t' =>
                {
                    self.source.next()?;
                },
                _ => break,
            }
        }

        self.last_indent = self.scratch.len();
        self.had_blank = true;

        // An active block scalar swallows every deeper line;
        // anything else clears it
        self.state = match self.block_scalar
        {
            Some(base) if self.last_indent > base => State::BlockScalarLine,
            _ =>
            {
                self.block_scalar = None;

                State::Content
            },
        };

        Ok(Some(LexEvent::new(LexEventKind::LineStart, 0)))
    }

    /*
     * ==== Content dispatch ====
     */

    fn content_dispatch(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        let unit = loop
        {
            let unit = match self.source.peek()?
            {
                None => return Ok(Some(self.stream_end())),
                Some(unit) => unit,
            };

            if isBlank!(Some(unit))
            {
                self.source.next()?;
                self.had_blank = true;
                continue;
            }

            if unit.is_break()
            {
                self.source.next()?;
                self.state = self.line_start_state();

                return Ok(None);
            }

            break unit;
        };

        let column = self.source.column();
        self.token_column = column;

        match unit.low
        {
            b'#' =>
            {
                let missing_space = !self.had_blank;

                self.source.next()?;
                self.comment_resume = State::Content;
                self.state = State::Comment;

                if missing_space
                {
                    return Ok(Some(self.error("Missing space before comment start")));
                }

                Ok(None)
            },
            b'-' =>
            {
                self.had_blank = false;
                self.run = 0;
                self.state = State::Dashes;

                Ok(None)
            },
            b'.' if column == 0 =>
            {
                self.had_blank = false;
                self.run = 0;
                self.state = State::Dots;

                Ok(None)
            },
            b':' | b'?' =>
            {
                self.had_blank = false;
                self.source.next()?;

                let next = self.source.peek()?;

                if isWhiteSpaceZ!(next) || (self.flow_depth > 0 && isFlowIndicator!(next))
                {
                    Ok(Some(self.control(unit.low, column)))
                }
                else
                {
                    self.scratch.clear();
                    self.scratch.push(unit.low);
                    self.trailing.clear();
                    self.deferred = None;
                    self.state = State::PlainScalar;

                    Ok(None)
                }
            },
            b'[' | b'{' =>
            {
                self.had_blank = false;
                self.source.next()?;
                self.flow_depth += 1;

                Ok(Some(self.control(unit.low, column)))
            },
            b']' | b'}' =>
            {
                self.had_blank = false;
                self.source.next()?;

                if self.flow_depth == 0
                {
                    let msg = match unit.low
                    {
                        b']' => "Unexpected ']' outside flow context",
                        _ => "Unexpected '}' outside flow context",
                    };

                    return Ok(Some(self.error(msg)));
                }

                self.flow_depth -= 1;

                Ok(Some(self.control(unit.low, column)))
            },
            b',' if self.flow_depth > 0 =>
            {
                self.had_blank = false;
                self.source.next()?;

                Ok(Some(self.control(unit.low, column)))
            },
            b'&' | b'*' =>
            {
                self.had_blank = false;
                self.source.next()?;
                self.state = match unit.low
                {
                    b'&' => State::AnchorName,
                    _ => State::AliasName,
                };

                Ok(None)
            },
            b'!' =>
            {
                self.had_blank = false;
                self.source.next()?;
                self.state = State::TagStart;

                Ok(None)
            },
            b'\'' =>
            {
                self.had_blank = false;
                self.source.next()?;
                self.scratch.clear();
                self.state = State::SingleQuoted;

                Ok(None)
            },
            b'"' =>
            {
                self.had_blank = false;
                self.source.next()?;
                self.scratch.clear();
                self.state = State::DoubleQuoted;

                Ok(None)
            },
            b'|' | b'>' =>
            {
                self.had_blank = false;
                self.source.next()?;
                self.scratch.clear();
                self.scratch.push(unit.low);
                self.state = State::BlockScalarHeader;

                let kind = match unit.low
                {
                    b'|' => LexEventKind::LiteralScalar,
                    _ => LexEventKind::FoldedScalar,
                };

                Ok(Some(LexEvent::new(kind, column)))
            },
            _ =>
            {
                self.had_blank = false;
                self.scratch.clear();
                self.trailing.clear();
                self.deferred = None;
                self.state = State::PlainScalar;

                Ok(None)
            },
        }
    }

    /*
     * ==== Scalars ====
     */

    fn plain_scalar(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        loop
        {
            let unit = self.source.peek()?;

            // A deferred ':' ends the scalar when followed by
            // whitespace or EOL, and is content otherwise
            if let Some((c, at)) = self.deferred
            {
                if isWhiteSpaceZ!(unit)
                {
                    self.deferred = None;
                    self.pending = Some(Pending::Ctrl(c, at));
                    self.state = State::Content;

                    return Ok(Some(self.scalar_event()));
                }

                self.commit_trailing();
                self.scratch.push(c);
                self.deferred = None;
            }

            let unit = match unit
            {
                None =>
                {
                    self.state = self.line_start_state();

                    return Ok(Some(self.scalar_event()));
                },
                Some(unit) => unit,
            };

            if unit.is_break()
            {
                self.source.next()?;
                self.state = self.line_start_state();

                return Ok(Some(self.scalar_event()));
            }

            match unit.low
            {
                b' ' | b'\t' =>
                {
                    self.source.next()?;
                    self.trailing.push(unit.low);
                },
                b':' =>
                {
                    let at = self.source.column();
                    self.source.next()?;
                    self.deferred = Some((b':', at));
                },
                b'#' if !self.trailing.is_empty() =>
                {
                    let hash_column = self.source.column();

                    self.source.next()?;
                    self.had_blank = true;
                    self.comment_resume = State::Content;
                    self.state = State::Comment;

                    let event = self.scalar_event();
                    self.token_column = hash_column;

                    return Ok(Some(event));
                },
                _ if self.flow_depth > 0 && isFlowIndicator!(Some(unit)) =>
                {
                    self.state = State::Content;
                    self.had_blank = true;

                    return Ok(Some(self.scalar_event()));
                },
                _ =>
                {
                    self.source.next()?;
                    self.commit_trailing();
                    unit.append_to(&mut self.scratch);
                },
            }
        }
    }

    fn single_quoted(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        loop
        {
            let unit = match self.source.next()?
            {
                None => return Ok(Some(self.fatal("Unterminated single quoted string"))),
                Some(unit) => unit,
            };

            match unit.low
            {
                b'\'' =>
                {
                    // A doubled quote is a literal quote
                    if matches!(self.source.peek()?, Some(u) if u.low == b'\'')
                    {
                        self.source.next()?;
                        self.scratch.push(b'\'');
                        continue;
                    }

                    self.state = State::Content;

                    return Ok(Some(self.scalar_event()));
                },
                // EOL is passed through raw
                _ => unit.append_to(&mut self.scratch),
            }
        }
    }

    fn double_quoted(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        loop
        {
            let unit = match self.source.next()?
            {
                None => return Ok(Some(self.fatal("Unterminated double quoted string"))),
                Some(unit) => unit,
            };

            if unit.is_break()
            {
                // Breaks inside double quotes are literal LF
                self.scratch.push(b'\n');
                continue;
            }

            match unit.low
            {
                b'"' =>
                {
                    self.state = State::Content;

                    return Ok(Some(self.scalar_event()));
                },
                b'\\' =>
                {
                    self.state = State::Escape;

                    return Ok(None);
                },
                _ => unit.append_to(&mut self.scratch),
            }
        }
    }

    fn escape(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        let unit = match self.source.next()?
        {
            None => return Ok(Some(self.fatal("Unterminated double quoted string"))),
            Some(unit) => unit,
        };

        if let Some(bytes) = unescape_simple(unit.low)
        {
            self.scratch.extend_from_slice(bytes);
            self.state = State::DoubleQuoted;

            return Ok(None);
        }

        if let Some(expected) = escape_length(unit.low)
        {
            self.unicode_char = 0;
            self.escape_expected = expected;
            self.escape_received = 0;
            self.state = State::UnicodeEscape;

            return Ok(None);
        }

        self.state = State::DoubleQuoted;

        Ok(Some(self.error("Unknown escape sequence")))
    }

    fn unicode_escape(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        while self.escape_received < self.escape_expected
        {
            let unit = match self.source.peek()?
            {
                None => return Ok(Some(self.fatal("Unterminated double quoted string"))),
                Some(unit) => unit,
            };

            if !unit.low.is_ascii_hexdigit()
            {
                self.state = State::DoubleQuoted;

                return Ok(Some(self.error("Invalid character in unicode escape")));
            }

            self.source.next()?;

            // Digits are folded most significant first
            let shift = 4 * (self.escape_expected - self.escape_received - 1);
            self.unicode_char |= (as_hex(unit.low) as u32) << shift;
            self.escape_received += 1;
        }

        write_unicode_point(self.unicode_char, &mut self.scratch);
        self.state = State::DoubleQuoted;

        Ok(None)
    }

    /*
     * ==== Dash / dot runs ====
     */

    fn dashes(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        while matches!(self.source.peek()?, Some(u) if u.low == b'-')
        {
            self.source.next()?;
            self.run += 1;
        }

        // The run is judged at the first non-matching character
        let next = self.source.peek()?;
        let terminated = isWhiteSpaceZ!(next);

        if self.run == 3 && terminated && self.token_column == 0
        {
            self.run = 0;
            self.need_line_start = false;
            self.in_document = true;
            self.block_scalar = None;
            self.scratch.clear();
            self.scratch.extend_from_slice(b"---");
            self.state = State::Content;

            return Ok(Some(LexEvent::new(LexEventKind::DirectivesEnd, 0)));
        }

        if let Some(event) = self.owed_line_start()
        {
            return Ok(Some(event));
        }

        if self.run == 1 && terminated
        {
            self.run = 0;
            self.state = State::Content;

            return Ok(Some(self.control(b'-', self.token_column)));
        }

        // Any other run is a plain scalar prefix
        self.scratch.clear();
        self.scratch.extend(std::iter::repeat(b'-').take(self.run));
        self.run = 0;
        self.trailing.clear();
        self.deferred = None;
        self.state = State::PlainScalar;

        Ok(None)
    }

    fn dots(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        while matches!(self.source.peek()?, Some(u) if u.low == b'.')
        {
            self.source.next()?;
            self.run += 1;
        }

        let next = self.source.peek()?;
        let terminated = isWhiteSpaceZ!(next);

        if self.run == 3 && terminated && self.token_column == 0
        {
            self.run = 0;
            self.need_line_start = false;
            self.in_document = false;
            self.block_scalar = None;
            self.scratch.clear();
            self.scratch.extend_from_slice(b"...");
            self.state = State::Content;

            return Ok(Some(LexEvent::new(LexEventKind::DocumentEnd, 0)));
        }

        if let Some(event) = self.owed_line_start()
        {
            return Ok(Some(event));
        }

        self.scratch.clear();
        self.scratch.extend(std::iter::repeat(b'.').take(self.run));
        self.run = 0;
        self.trailing.clear();
        self.deferred = None;
        self.state = State::PlainScalar;

        Ok(None)
    }

    /*
     * ==== Tags ====
     */

    fn tag_start(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        if matches!(self.source.peek()?, Some(u) if u.low == b'<')
        {
            self.source.next()?;
            self.state = State::VerbatimTag;

            return Ok(None);
        }

        // Secondary handle: '!!'
        if matches!(self.source.peek()?, Some(u) if u.low == b'!')
        {
            let handle_column = self.token_column;

            self.source.next()?;
            self.scratch.extend_from_slice(b"!!");
            self.token_column = self.source.column();
            self.state = State::TagSuffix;

            return Ok(Some(LexEvent::new(LexEventKind::TagHandle, handle_column)));
        }

        // Accumulate until a second '!' (named handle) or a
        // terminator (primary handle with suffix)
        let mut acc = Vec::new();

        loop
        {
            let unit = self.source.peek()?;

            if isUriChar!(unit) && !matches!(unit, Some(u) if u.low == b'!')
            {
                let unit = self.source.next()?.expect("peeked unit");
                acc.push(unit.low);
                continue;
            }

            if matches!(unit, Some(u) if u.low == b'!')
            {
                let handle_column = self.token_column;

                self.source.next()?;
                self.scratch.push(b'!');
                self.scratch.extend_from_slice(&acc);
                self.scratch.push(b'!');
                self.token_column = self.source.column();
                self.state = State::TagSuffix;

                return Ok(Some(LexEvent::new(LexEventKind::TagHandle, handle_column)));
            }

            // Primary handle: '!' with the run as its suffix
            let suffix_at = self.token_column + 1;
            self.scratch.push(b'!');
            self.pending = Some(Pending::Suffix(acc, suffix_at));
            self.state = State::Content;

            return Ok(Some(LexEvent::new(
                LexEventKind::TagHandle,
                self.token_column,
            )));
        }
    }

    fn verbatim_tag(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        loop
        {
            let unit = self.source.peek()?;

            match unit
            {
                None => return Ok(Some(self.fatal("Unterminated verbatim tag"))),
                Some(u) if u.is_break() =>
                {
                    self.state = State::Content;

                    return Ok(Some(self.error("Unterminated verbatim tag")));
                },
                Some(u) if u.low == b'>' =>
                {
                    self.source.next()?;
                    self.state = State::Content;

                    return Ok(Some(LexEvent::new(
                        LexEventKind::VerbatimTag,
                        self.token_column,
                    )));
                },
                Some(u) =>
                {
                    self.source.next()?;
                    self.scratch.push(u.low);
                },
            }
        }
    }

    fn tag_suffix(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        while isUriChar!(self.source.peek()?)
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        self.state = State::Content;

        Ok(Some(LexEvent::new(
            LexEventKind::TagSuffix,
            self.token_column,
        )))
    }

    /*
     * ==== Anchors and aliases ====
     */

    fn anchor_name(&mut self, alias: bool) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        while isAnchorChar!(self.source.peek()?)
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        self.state = State::Content;

        if self.scratch.is_empty()
        {
            let msg = match alias
            {
                true => "Invalid alias name",
                false => "Invalid anchor name",
            };

            return Ok(Some(self.error(msg)));
        }

        let kind = match alias
        {
            true => LexEventKind::Alias,
            false => LexEventKind::Anchor,
        };

        Ok(Some(LexEvent::new(kind, self.token_column)))
    }

    /*
     * ==== Directives ====
     */

    fn directive_name(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        while matches!(self.source.peek()?, Some(u) if u.low.is_ascii_alphanumeric())
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        if self.scratch.is_empty()
        {
            self.state = State::DirectiveParams;

            return Ok(Some(self.error("Missing directive name")));
        }

        let (kind, state) = match self.scratch.as_slice()
        {
            b"YAML" => (LexEventKind::YamlDirective, State::MajorVersion),
            b"TAG" => (LexEventKind::TagDirective, State::TagDirHandle),
            _ => (LexEventKind::UnknownDirective, State::DirectiveParams),
        };
        self.state = state;

        Ok(Some(LexEvent::new(kind, self.token_column)))
    }

    fn major_version(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.skip_blanks()?;
        self.scratch.clear();
        self.token_column = self.source.column();

        while isDigit!(self.source.peek()?)
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        if self.scratch.is_empty()
        {
            self.state = State::DirectiveParams;

            return Ok(Some(self.error("Invalid YAML version directive")));
        }

        match self.source.peek()?
        {
            Some(u) if u.low == b'.' =>
            {
                self.source.next()?;
                self.state = State::MinorVersion;

                Ok(Some(LexEvent::new(
                    LexEventKind::MajorVersion,
                    self.token_column,
                )))
            },
            _ =>
            {
                self.state = State::DirectiveParams;

                Ok(Some(self.error("Invalid YAML version directive")))
            },
        }
    }

    fn minor_version(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();
        self.token_column = self.source.column();

        while isDigit!(self.source.peek()?)
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        if self.scratch.is_empty()
        {
            self.state = State::DirectiveParams;

            return Ok(Some(self.error("Invalid YAML version directive")));
        }

        self.state = State::Content;

        Ok(Some(LexEvent::new(
            LexEventKind::MinorVersion,
            self.token_column,
        )))
    }

    fn tag_dir_handle(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.skip_blanks()?;
        self.scratch.clear();
        self.token_column = self.source.column();

        if !matches!(self.source.peek()?, Some(u) if u.low == b'!')
        {
            self.state = State::DirectiveParams;

            return Ok(Some(self.error("Invalid tag handle in %TAG directive")));
        }

        self.source.next()?;
        self.scratch.push(b'!');

        while matches!(self.source.peek()?, Some(u) if u.low.is_ascii_alphanumeric())
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        if matches!(self.source.peek()?, Some(u) if u.low == b'!')
        {
            self.source.next()?;
            self.scratch.push(b'!');
        }

        self.state = State::TagDirUri;

        Ok(Some(LexEvent::new(
            LexEventKind::TagHandle,
            self.token_column,
        )))
    }

    fn tag_dir_uri(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.skip_blanks()?;
        self.scratch.clear();
        self.token_column = self.source.column();

        while isUriChar!(self.source.peek()?) || matches!(self.source.peek()?, Some(u) if u.low == b'!')
        {
            let unit = self.source.next()?.expect("peeked unit");
            self.scratch.push(unit.low);
        }

        if self.scratch.is_empty()
        {
            self.state = State::DirectiveParams;

            return Ok(Some(self.error("Missing tag URI in %TAG directive")));
        }

        self.state = State::Content;

        Ok(Some(LexEvent::new(LexEventKind::TagUri, self.token_column)))
    }

    fn directive_params(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.skip_blanks()?;

        let unit = match self.source.peek()?
        {
            None => return Ok(Some(self.stream_end())),
            Some(unit) => unit,
        };

        if unit.is_break()
        {
            self.source.next()?;
            self.state = self.line_start_state();

            return Ok(None);
        }

        if unit.low == b'#'
        {
            self.token_column = self.source.column();
            self.source.next()?;
            self.comment_resume = State::DirectiveParams;
            self.state = State::DirectiveComment;

            return Ok(None);
        }

        self.scratch.clear();
        self.token_column = self.source.column();

        while !isWhiteSpaceZ!(self.source.peek()?)
        {
            let unit = self.source.next()?.expect("peeked unit");
            unit.append_to(&mut self.scratch);
        }

        Ok(Some(LexEvent::new(
            LexEventKind::UnknownDirectiveParam,
            self.token_column,
        )))
    }

    /*
     * ==== Comments ====
     */

    fn comment(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();

        while !isBreakZ!(self.source.peek()?)
        {
            let unit = self.source.next()?.expect("peeked unit");
            unit.append_to(&mut self.scratch);
        }

        self.state = self.comment_resume;

        Ok(Some(LexEvent::new(LexEventKind::Comment, self.token_column)))
    }

    /*
     * ==== Block scalars ====
     */

    fn block_scalar_header(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        loop
        {
            let unit = match self.source.peek()?
            {
                None => return Ok(Some(self.stream_end())),
                Some(unit) => unit,
            };

            if unit.is_break()
            {
                self.source.next()?;
                // The body is every deeper line that follows
                self.block_scalar = Some(self.last_indent);
                self.state = State::Indentation;

                return Ok(None);
            }

            match unit.low
            {
                b' ' | b'\t' =>
                {
                    self.source.next()?;
                    self.had_blank = true;
                },
                b'0'..=b'9' =>
                {
                    let column = self.source.column();
                    self.source.next()?;
                    self.scratch.clear();
                    self.scratch.push(unit.low);

                    return Ok(Some(LexEvent::new(
                        LexEventKind::BlockIndentationIndicator,
                        column,
                    )));
                },
                b'+' | b'-' =>
                {
                    let column = self.source.column();
                    self.source.next()?;
                    self.scratch.clear();
                    self.scratch.push(unit.low);

                    return Ok(Some(LexEvent::new(
                        LexEventKind::BlockChompingIndicator,
                        column,
                    )));
                },
                b'#' =>
                {
                    let missing_space = !self.had_blank;

                    self.token_column = self.source.column();
                    self.source.next()?;
                    self.comment_resume = State::BlockScalarHeader;
                    self.state = State::Comment;

                    if missing_space
                    {
                        return Ok(Some(self.error("Missing space before comment start")));
                    }

                    return Ok(None);
                },
                _ =>
                {
                    self.source.next()?;

                    return Ok(Some(self.error("Invalid block scalar header")));
                },
            }
        }
    }

    fn block_scalar_line(&mut self) -> std::io::Result<Option<LexEvent>>
    {
        self.scratch.clear();
        self.token_column = self.last_indent;

        loop
        {
            let unit = self.source.peek()?;

            match unit
            {
                None =>
                {
                    self.state = State::Indentation;

                    return Ok(Some(LexEvent::new(
                        LexEventKind::BlockScalarLine,
                        self.token_column,
                    )));
                },
                Some(u) if u.is_break() =>
                {
                    self.source.next()?;
                    self.state = State::Indentation;

                    return Ok(Some(LexEvent::new(
                        LexEventKind::BlockScalarLine,
                        self.token_column,
                    )));
                },
                Some(u) =>
                {
                    self.source.next()?;
                    u.append_to(&mut self.scratch);
                },
            }
        }
    }

    /*
     * ==== Shared ====
     */

    /// The state a fresh line starts in, depending on
    /// whether we are inside document content
    fn line_start_state(&self) -> State
    {
        match self.in_document
        {
            true => State::Indentation,
            false => State::Initial,
        }
    }

    /// Emit the LineStart owed when a dash or dot run at
    /// the start of the stream turns out to be plain
    /// content
    fn owed_line_start(&mut self) -> Option<LexEvent>
    {
        if !self.need_line_start
        {
            return None;
        }

        self.need_line_start = false;
        self.in_document = true;
        self.last_indent = 0;
        self.scratch.clear();

        Some(LexEvent::new(LexEventKind::LineStart, 0))
    }

    /// Move held back whitespace into the scalar content
    fn commit_trailing(&mut self)
    {
        self.scratch.extend_from_slice(&self.trailing);
        self.trailing.clear();
    }

    fn scalar_event(&mut self) -> LexEvent
    {
        self.trailing.clear();

        LexEvent::new(LexEventKind::Scalar, self.token_column)
    }

    fn control(&mut self, c: u8, column: usize) -> LexEvent
    {
        self.scratch.clear();
        self.scratch.push(c);

        LexEvent::new(LexEventKind::ControlChar, column)
    }

    /// A recoverable lexical error; the machine continues
    /// in whatever state the caller selected
    fn error(&mut self, msg: &str) -> LexEvent
    {
        self.scratch.clear();
        self.scratch.extend_from_slice(msg.as_bytes());

        LexEvent::new(LexEventKind::Error, self.source.column())
    }

    /// An unrecoverable lexical error; the next event is
    /// the stream terminator
    fn fatal(&mut self, msg: &str) -> LexEvent
    {
        let event = self.error(msg);
        self.pending = Some(Pending::StreamEnd);
        self.state = State::Done;

        event
    }

    fn stream_end(&mut self) -> LexEvent
    {
        self.scratch.clear();
        self.state = State::Done;
        self.done = true;

        LexEvent::new(LexEventKind::StreamEnd, self.source.column())
    }

    fn skip_blanks(&mut self) -> std::io::Result<()>
    {
        while isBlank!(self.source.peek()?)
        {
            self.source.next()?;
            self.had_blank = true;
        }

        Ok(())
    }
}

impl Iterator for Lexer
{
    type Item = LexEvent;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.next_event()
    }
}
