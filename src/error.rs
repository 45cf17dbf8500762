/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{error::Error as StdError, fmt};

/// Result typedef used throughout this library's public API
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque type representing all possible errors which can
/// occur during library usage.
///
/// Note that lexical problems are not surfaced through this
/// type at all; the lexer reports them inline as
/// [`Error`](crate::token::LexEventKind::Error) events and
/// always terminates its stream normally.
pub struct Error
{
    inner: Box<internal::Error>,
}

impl Error
{
    /// The line at which the error occurred.
    pub fn line(&self) -> u64
    {
        self.inner.line
    }

    /// The column into the line where the error occurred.
    pub fn column(&self) -> u64
    {
        self.inner.column
    }

    /// The index into the byte stream at which the error
    /// occurred.
    pub fn at(&self) -> u64
    {
        self.inner.at
    }

    /// Categorize the error into one of the following:
    ///
    /// - [`Category::Syntax`] The event stream violated the
    ///   structural grammar the engine relies on
    /// - [`Category::Construction`] The event stream did not
    ///   map onto the requested type
    /// - [`Category::Data`] The stream contained data that
    ///   could not be converted (e.g: an integer overflowed)
    /// - [`Category::IO`] The underlying byte stream or
    ///   event producer surfaced an error
    /// - [`Category::EOF`] The event stream ended
    ///   unexpectedly
    pub fn classify(&self) -> Category
    {
        self.inner.classify()
    }

    /// Checks whether this error was contextualized.
    ///
    /// If this method returns false then the methods
    ///
    /// - [`at()`](#method.at)
    /// - [`column()`](#method.column)
    /// - [`line()`](#method.line)
    ///
    /// will return meaningless values.
    pub fn has_context(&self) -> bool
    {
        self.inner.has_context()
    }

    /// Boxes the internal error, returning new public error
    /// type
    pub(crate) fn new(err: internal::Error) -> Self
    {
        Self {
            inner: Box::new(err),
        }
    }
}

/// Rough category of an [`Error`].
///
/// Useful for making decisions upon encountering an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category
{
    /// The underlying byte stream or event producer
    /// returned an error
    IO,

    /// The event stream was not structurally valid
    Syntax,

    /// The event stream was structurally valid YAML, but
    /// did not map onto the requested type
    Construction,

    /// There was an issue with the data contained in the
    /// stream (e.g: an integer overflowed)
    Data,

    /// The event stream unexpectedly terminated before it
    /// was appropriate to do so
    EOF,
}

pub(crate) mod internal
{
    use std::{error::Error as StdError, fmt, io};

    use super::Category;

    /// Internal error representation used throughout the
    /// library.
    ///
    /// Contains enough metadata about the position of the
    /// error that we can contextualize it later
    pub(crate) struct Error
    {
        /// Error variant encountered
        pub kind:   ErrorKind,
        /// Position in the byte stream that the error
        /// occurred
        pub at:     u64,
        /// Line number of the error
        pub line:   u64,
        /// Offset into current line the error occurred at
        pub column: u64,
    }

    impl Error
    {
        /// Create a new, contextless [`Error`].
        ///
        /// Care should be taken to later apply context, if
        /// at all possible.
        pub fn new<T>(err: T) -> Self
        where
            T: Into<ErrorKind>,
        {
            Self::with_context(err, 0, 0, 0)
        }

        /// Create a new, contextualized [`Error`].
        pub fn with_context<T>(err: T, at: u64, line: u64, column: u64) -> Self
        where
            T: Into<ErrorKind>,
        {
            let kind = err.into();

            Self {
                kind,
                at,
                line,
                column,
            }
        }

        /// Checks whether this error is contextualized
        pub fn has_context(&self) -> bool
        {
            // Only errors created without context will have a line
            // number of 0
            self.line != 0
        }

        /// Categorize this error
        pub fn classify(&self) -> Category
        {
            Into::into(&self.kind)
        }
    }

    /// Unified wrapper around the actual error variants we
    /// can produce
    #[derive(Debug)]
    pub(crate) enum ErrorKind
    {
        Code(ErrorCode),
        Construct(ConstructError),
        Source(SourceError),
    }

    /// Lightweight errors, specific to this library.
    ///
    /// This enum should never be polluted with large
    /// variants, or wrap underlying errors. Use
    /// [`ConstructError`] for failures that must carry
    /// names, and [`SourceError`] for wrapped causes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) enum ErrorCode
    {
        /// Got end of the event stream while constructing a
        /// value
        UnexpectedEOF,

        /// An anchor or alias was applied to a target type
        /// that is not reference-like
        AnchorOnNonRef,

        /// An alias referred to an anchor that was never
        /// bound in this document
        UnknownAlias,

        /// An anchor was bound twice in one document
        DuplicateAnchor,

        /// An integer overflowed the target width, either
        /// while parsing or while converting for the wire
        IntOverflow,

        /// The event stream and the engine disagree about
        /// the stream's state.
        ///
        /// Typically, this only happens if an [`Events`]
        /// source is shared between independent loads.
        ///
        /// [`Events`]: crate::event::Events
        CorruptStream,
    }

    /// Semantic construction failures. These carry the
    /// names a caller needs to diagnose a mismatch between
    /// the document and the target type, and are therefore
    /// allowed to allocate.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum ConstructError
    {
        /// Node tag was not in the accepted set for the
        /// target type
        WrongTag
        {
            expected: String, found: String
        },

        /// A required record field was absent
        MissingField(String),

        /// A record field appeared twice
        DuplicateField(String),

        /// A key that maps to no record field appeared
        UnknownField(String),

        /// A mapping key appeared twice
        DuplicateKey,

        /// A variant record field is not permitted by the
        /// current discriminator value
        FieldNotAllowed
        {
            field:         String,
            discriminator: String,
            value:         String,
        },

        /// No implicit variant branch payload matched the
        /// value's possible tags
        NoVariantMatch
        {
            type_name: &'static str, uri: String
        },

        /// A mapping or sequence reached implicit variant
        /// dispatch without an explicit tag
        ComplexValueWithoutTag(&'static str),

        /// A scalar could not be parsed as the target
        /// primitive
        MalformedScalar
        {
            expected: &'static str, content: String
        },

        /// A fixed-size array had the wrong element count
        LengthMismatch
        {
            expected: usize, found: usize
        },

        /// The engine required a specific structural event
        /// and found something else
        UnexpectedEvent
        {
            expected: &'static str
        },
    }

    /// Heavy and/or external errors that can occur during
    /// library usage
    #[derive(Debug)]
    pub(crate) enum SourceError
    {
        /// Catch all wrapper for any underlying IO errors
        /// reported to us
        IO(io::Error),

        /// An unexpected failure in the event producer
        /// feeding the engine
        Stream(Box<dyn StdError + Send + Sync + 'static>),
    }

    impl fmt::Debug for Error
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            let mut this = f.debug_struct("Error");

            this.field("kind", &self.kind);

            if self.has_context()
            {
                this.field("line", &self.line)
                    .field("column", &self.column)
                    .field("index", &self.at);
            }

            this.finish()
        }
    }

    impl fmt::Display for Error
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            use fmt::Display;

            if self.has_context()
            {
                f.write_fmt(format_args!(
                    "{}, on line {}, column {}, at index {}",
                    self.kind, self.line, self.column, self.at
                ))
            }
            else
            {
                Display::fmt(&self.kind, f)
            }
        }
    }

    impl StdError for Error
    {
        fn source(&self) -> Option<&(dyn StdError + 'static)>
        {
            StdError::source(&self.kind)
        }
    }

    impl From<Error> for super::Error
    {
        fn from(err: Error) -> Self
        {
            Self::new(err)
        }
    }

    impl<T> From<T> for Error
    where
        T: Into<ErrorKind>,
    {
        fn from(t: T) -> Self
        {
            Error::new(t.into())
        }
    }

    impl From<&'_ ErrorKind> for Category
    {
        fn from(kind: &'_ ErrorKind) -> Self
        {
            match kind
            {
                ErrorKind::Code(e) => e.into(),
                ErrorKind::Construct(_) => Category::Construction,
                ErrorKind::Source(e) => e.into(),
            }
        }
    }

    impl fmt::Display for ErrorKind
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                ErrorKind::Code(ref e) => fmt::Display::fmt(e, f),
                ErrorKind::Construct(ref e) => fmt::Display::fmt(e, f),
                ErrorKind::Source(ref e) => fmt::Display::fmt(e, f),
            }
        }
    }

    impl StdError for ErrorKind {}

    impl From<ErrorCode> for ErrorKind
    {
        fn from(e: ErrorCode) -> Self
        {
            ErrorKind::Code(e)
        }
    }

    impl From<ConstructError> for ErrorKind
    {
        fn from(e: ConstructError) -> Self
        {
            ErrorKind::Construct(e)
        }
    }

    impl From<SourceError> for ErrorKind
    {
        fn from(e: SourceError) -> Self
        {
            ErrorKind::Source(e)
        }
    }

    impl From<ErrorCode> for Category
    {
        fn from(code: ErrorCode) -> Self
        {
            use ErrorCode::*;

            match code
            {
                AnchorOnNonRef | UnknownAlias | DuplicateAnchor => Category::Construction,

                IntOverflow => Category::Data,

                CorruptStream => Category::Syntax,

                UnexpectedEOF => Category::EOF,
            }
        }
    }

    impl From<&'_ ErrorCode> for Category
    {
        fn from(code: &'_ ErrorCode) -> Self
        {
            From::from(*code)
        }
    }

    impl fmt::Display for ErrorCode
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            use ErrorCode::*;

            match self
            {
                UnexpectedEOF => f.write_str("unexpected end of the event stream"),
                AnchorOnNonRef => f.write_str("anchor or alias on a non reference type"),
                UnknownAlias => f.write_str("alias refers to an anchor that was never bound"),
                DuplicateAnchor => f.write_str("anchor was bound twice in one document"),
                IntOverflow => f.write_str("integer overflow while converting"),
                CorruptStream => f.write_str("invalid or corrupt event stream"),
            }
        }
    }

    impl StdError for ErrorCode {}

    impl fmt::Display for ConstructError
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            use ConstructError::*;

            match self
            {
                WrongTag { expected, found } =>
                {
                    write!(f, "Wrong tag: expected {}, found {}", expected, found)
                },
                MissingField(field) => write!(f, "Missing field: {}", field),
                DuplicateField(field) => write!(f, "Duplicate field: {}", field),
                UnknownField(field) => write!(f, "Unknown field: {}", field),
                DuplicateKey => f.write_str("Duplicate table key"),
                FieldNotAllowed {
                    field,
                    discriminator,
                    value,
                } =>
                {
                    write!(
                        f,
                        "Field {} is not allowed for {} == {}",
                        field, discriminator, value
                    )
                },
                NoVariantMatch { type_name, uri } =>
                {
                    write!(
                        f,
                        "This value type does not map to any field in {}: {}",
                        type_name, uri
                    )
                },
                ComplexValueWithoutTag(what) =>
                {
                    write!(f, "Complex {} value must have a tag", what)
                },
                MalformedScalar { expected, content } =>
                {
                    write!(f, "Cannot parse {:?} as {}", content, expected)
                },
                LengthMismatch { expected, found } =>
                {
                    write!(
                        f,
                        "Expected a sequence of {} elements, found {}",
                        expected, found
                    )
                },
                UnexpectedEvent { expected } => write!(f, "Expected {}", expected),
            }
        }
    }

    impl StdError for ConstructError {}

    impl From<&'_ SourceError> for Category
    {
        fn from(err: &'_ SourceError) -> Self
        {
            match err
            {
                SourceError::IO(_) => Category::IO,
                SourceError::Stream(_) => Category::IO,
            }
        }
    }

    impl fmt::Display for SourceError
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                SourceError::IO(ref e) => fmt::Display::fmt(e, f),
                SourceError::Stream(ref e) => fmt::Display::fmt(e, f),
            }
        }
    }

    impl StdError for SourceError
    {
        fn source(&self) -> Option<&(dyn StdError + 'static)>
        {
            match self
            {
                SourceError::IO(e) => Some(e),
                SourceError::Stream(e) => Some(e.as_ref()),
            }
        }
    }

    impl From<io::Error> for SourceError
    {
        fn from(e: io::Error) -> Self
        {
            SourceError::IO(e)
        }
    }
}

impl fmt::Debug for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Error
{
    fn source(&self) -> Option<&(dyn StdError + 'static)>
    {
        StdError::source(&self.inner)
    }
}

impl From<Error> for std::io::Error
{
    fn from(err: Error) -> Self
    {
        use std::io;

        match err.classify()
        {
            Category::IO => io::Error::new(io::ErrorKind::Other, err),
            Category::Syntax => io::Error::new(io::ErrorKind::InvalidInput, err),
            Category::Construction | Category::Data =>
            {
                io::Error::new(io::ErrorKind::InvalidData, err)
            },
            Category::EOF => io::Error::new(io::ErrorKind::UnexpectedEof, err),
        }
    }
}
