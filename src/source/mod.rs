/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The module contains the adapter for converting plain
//! bytes into the logical characters consumed by the
//! [`Lexer`](crate::lexer::Lexer).
//!
//! A [`ByteSource`] owns its buffer and (if any) the
//! underlying stream handle. It detects the stream encoding
//! from the first four bytes, then steps through the stream
//! one code unit at a time, sized by the encoding's stride.
//! YAML's syntactic characters are all ASCII, so each unit
//! is identified by its low byte; the remaining bytes of
//! the unit are carried opaquely.

use std::io;

/// Stream encodings recognised by the four-byte detection
/// rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding
{
    UTF8,
    UTF16LE,
    UTF16BE,
    UTF32LE,
    UTF32BE,
    /// A byte pattern we cannot step through; the lexer
    /// reports it inline and ends the stream
    Unsupported,
}

impl Encoding
{
    /// Detect the encoding of a stream from its first four
    /// bytes, using the standard BOM and zero-pattern
    /// rules. Returns the encoding and the BOM length to
    /// skip.
    pub fn detect(prefix: &[u8]) -> (Self, usize)
    {
        match *prefix
        {
            [0x00, 0x00, 0xFE, 0xFF, ..] => (Self::UTF32BE, 4),
            [0xFF, 0xFE, 0x00, 0x00, ..] => (Self::UTF32LE, 4),
            [0xFE, 0xFF, ..] => (Self::UTF16BE, 2),
            [0xFF, 0xFE, ..] => (Self::UTF16LE, 2),
            [0xEF, 0xBB, 0xBF, ..] => (Self::UTF8, 3),

            [0x00, 0x00, 0x00, _, ..] => (Self::UTF32BE, 0),
            [_, 0x00, 0x00, 0x00, ..] => (Self::UTF32LE, 0),
            [0x00, _, ..] => (Self::UTF16BE, 0),
            [_, 0x00, ..] => (Self::UTF16LE, 0),

            [0x00] | [0x00, 0x00] | [0x00, 0x00, 0x00] => (Self::Unsupported, 0),

            _ => (Self::UTF8, 0),
        }
    }

    /// Bytes consumed per logical character
    pub fn stride(self) -> usize
    {
        match self
        {
            Self::UTF8 | Self::Unsupported => 1,
            Self::UTF16LE | Self::UTF16BE => 2,
            Self::UTF32LE | Self::UTF32BE => 4,
        }
    }

    /// Offset of the low (ASCII significant) byte inside a
    /// code unit
    pub fn low_offset(self) -> usize
    {
        match self
        {
            Self::UTF8 | Self::UTF16LE | Self::UTF32LE | Self::Unsupported => 0,
            Self::UTF16BE => 1,
            Self::UTF32BE => 3,
        }
    }
}

/// One logical character: a full code unit plus the low
/// byte that drives syntax decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unit
{
    /// The unit's ASCII significant byte
    pub low: u8,

    raw:   [u8; 4],
    width: u8,
}

impl Unit
{
    fn new(raw: &[u8], low_offset: usize) -> Self
    {
        let mut bytes = [0; 4];
        bytes[..raw.len()].copy_from_slice(raw);

        Self {
            low:   raw[low_offset.min(raw.len() - 1)],
            raw:   bytes,
            width: raw.len() as u8,
        }
    }

    /// Append this unit's content bytes to .scratch.
    ///
    /// Single byte units pass through verbatim; wider units
    /// contribute their non zero bytes in stream order,
    /// leaving full decoding to the parser.
    pub fn append_to(&self, scratch: &mut Vec<u8>)
    {
        if self.width == 1
        {
            scratch.push(self.low);
            return;
        }

        for &b in &self.raw[..self.width as usize]
        {
            if b != 0
            {
                scratch.push(b);
            }
        }
    }

    /// Checks if the unit is a line break (CR or LF)
    pub fn is_break(&self) -> bool
    {
        matches!(self.low, b'\r' | b'\n')
    }
}

enum Input
{
    /// The whole stream is already in memory
    Buffer,
    /// More bytes may be produced by the handle we own
    Stream(Box<dyn io::Read>),
}

impl std::fmt::Debug for Input
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::Buffer => f.write_str("Buffer"),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

const READ_CHUNK: usize = 8 * 1024;

/// Buffered stream reader with encoding detection, line
/// tracking and a one character lookahead.
///
/// Owns its buffer and, for stream inputs, the underlying
/// handle; dropping the source releases both.
#[derive(Debug)]
pub struct ByteSource
{
    input:  Input,
    buffer: Vec<u8>,
    head:   usize,
    eof:    bool,

    encoding:   Encoding,
    stride:     usize,
    low_offset: usize,

    line:   usize,
    column: usize,

    lookahead: Option<Unit>,
}

impl ByteSource
{
    /// Construct a source over an in-memory buffer,
    /// detecting its encoding immediately
    pub fn from_bytes<T>(bytes: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        let buffer = bytes.into();

        let mut this = Self {
            input: Input::Buffer,
            buffer,
            head: 0,
            eof: true,
            encoding: Encoding::UTF8,
            stride: 1,
            low_offset: 0,
            line: 1,
            column: 0,
            lookahead: None,
        };
        this.detect_encoding();

        this
    }

    /// Construct a source over a byte producer with
    /// [`read()`](std::io::Read::read) semantics. Encoding
    /// detection is deferred to the first read
    pub fn from_read<R>(src: R) -> Self
    where
        R: io::Read + 'static,
    {
        Self {
            input:      Input::Stream(Box::new(src)),
            buffer:     Vec::with_capacity(READ_CHUNK),
            head:       0,
            eof:        false,
            encoding:   Encoding::UTF8,
            stride:     1,
            low_offset: 0,
            line:       1,
            column:     0,
            lookahead:  None,
        }
    }

    /// The encoding detected from the stream prefix.
    ///
    /// For stream inputs this is only meaningful once the
    /// first unit has been read
    pub fn encoding(&self) -> Encoding
    {
        self.encoding
    }

    /// 1-based physical line of the read head
    pub fn line(&self) -> usize
    {
        self.line
    }

    /// 0-based logical character offset into the current
    /// line
    pub fn column(&self) -> usize
    {
        self.column
    }

    /// Bytes consumed so far
    pub fn index(&self) -> usize
    {
        self.head
    }

    /// Peek the next unit without consuming it. Idempotent
    pub(crate) fn peek(&mut self) -> io::Result<Option<Unit>>
    {
        if self.lookahead.is_none()
        {
            self.lookahead = self.read_unit()?;
        }

        Ok(self.lookahead)
    }

    /// Take the next unit, updating line and column
    /// tracking.
    ///
    /// Line tracking increments on LF and on a bare CR; the
    /// LF of a CRLF pair is consumed with the CR and never
    /// surfaced
    pub(crate) fn next(&mut self) -> io::Result<Option<Unit>>
    {
        let unit = match self.lookahead.take()
        {
            Some(unit) => Some(unit),
            None => self.read_unit()?,
        };

        if let Some(unit) = unit
        {
            match unit.low
            {
                b'\n' =>
                {
                    self.line += 1;
                    self.column = 0;
                },
                b'\r' =>
                {
                    self.line += 1;
                    self.column = 0;

                    // CRLF counts as one break
                    if let Some(lf) = self.peek()?
                    {
                        if lf.low == b'\n'
                        {
                            self.lookahead = None;
                        }
                    }
                },
                _ => self.column += 1,
            }
        }

        Ok(unit)
    }

    fn detect_encoding(&mut self)
    {
        let prefix = &self.buffer[self.head..(self.head + 4).min(self.buffer.len())];
        let (encoding, bom) = Encoding::detect(prefix);

        self.encoding = encoding;
        self.stride = encoding.stride();
        self.low_offset = encoding.low_offset();
        self.head += bom;
    }

    fn read_unit(&mut self) -> io::Result<Option<Unit>>
    {
        // First read of a stream input: pull enough bytes to
        // detect the encoding
        if !self.eof && self.head == 0 && self.buffer.is_empty()
        {
            while !self.eof && self.buffer.len() < 4
            {
                self.refill()?;
            }

            self.detect_encoding();
        }

        while !self.eof && self.buffer.len() - self.head < self.stride
        {
            self.refill()?;
        }

        let remaining = self.buffer.len() - self.head;

        if remaining == 0
        {
            return Ok(None);
        }

        // A trailing partial unit is taken as-is; the lexer is
        // permissive about malformed tails
        let take = self.stride.min(remaining);
        let unit = Unit::new(&self.buffer[self.head..self.head + take], self.low_offset);
        self.head += take;

        Ok(Some(unit))
    }

    fn refill(&mut self) -> io::Result<()>
    {
        let reader = match self.input
        {
            Input::Stream(ref mut reader) => reader,
            Input::Buffer =>
            {
                self.eof = true;
                return Ok(());
            },
        };

        let start = self.buffer.len();
        self.buffer.resize(start + READ_CHUNK, 0);

        let count = reader.read(&mut self.buffer[start..])?;
        self.buffer.truncate(start + count);

        if count == 0
        {
            self.eof = true;
        }

        Ok(())
    }
}
