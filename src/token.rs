/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

/// A single lexical event produced by the
/// [`Lexer`](crate::lexer::Lexer).
///
/// Payload text is not carried here; it lives in the
/// lexer's content scratch, borrowable via
/// [`content()`](crate::lexer::Lexer::content) until the
/// next event is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexEvent
{
    /// What was lexed
    pub kind:   LexEventKind,
    /// 0-based X coordinate of the event's first character,
    /// reset on every physical newline
    pub column: usize,
}

impl LexEvent
{
    pub(crate) fn new(kind: LexEventKind, column: usize) -> Self
    {
        Self { kind, column }
    }
}

/// Lexical events that may be emitted by a YAML lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexEventKind
{
    /// A '---', ending the directives section {separator}
    DirectivesEnd,
    /// A '...' {separator}
    DocumentEnd,
    /// The stream's end, always the final event {separator}
    StreamEnd,

    /// The %TAG directive {directive}
    TagDirective,
    /// The %YAML directive {directive}
    YamlDirective,
    /// A directive that is neither %YAML nor %TAG
    /// {directive}
    UnknownDirective,
    /// Major version digit(s) of a %YAML directive
    /// {directive}
    MajorVersion,
    /// Minor version digit(s) of a %YAML directive
    /// {directive}
    MinorVersion,
    /// The URI parameter of a %TAG directive {directive}
    TagUri,
    /// A parameter of an unknown directive {directive}
    UnknownDirectiveParam,

    /// A tag handle ('!', '!!' or '!named!'), content holds
    /// the handle {shared}
    TagHandle,
    /// A comment, content holds its text {shared}
    Comment,

    /// Start of a physical line's content, content holds
    /// the indentation run {content}
    LineStart,
    /// A single syntactic character ('-', ':', '[', …),
    /// content holds it {content}
    ControlChar,

    /// A '|' block scalar header {block scalar header}
    LiteralScalar,
    /// A '>' block scalar header {block scalar header}
    FoldedScalar,
    /// An explicit indentation digit in a block scalar
    /// header {block scalar header}
    BlockIndentationIndicator,
    /// A '+' or '-' chomping indicator in a block scalar
    /// header {block scalar header}
    BlockChompingIndicator,

    /// A (plain, single or double quoted) scalar, content
    /// holds the unescaped text {scalar}
    Scalar,
    /// One line of a block scalar's body {scalar}
    BlockScalarLine,

    /// A verbatim '!<…>' tag, content holds the URI {tag}
    VerbatimTag,
    /// The suffix following a tag handle, content holds it
    /// {tag}
    TagSuffix,

    /// An '&' anchor, content holds the name {anchoring}
    Anchor,
    /// A '*' alias, content holds the name {anchoring}
    Alias,

    /// A lexical error, content holds the message. The
    /// lexer continues on a best effort basis and always
    /// terminates with [`StreamEnd`](Self::StreamEnd)
    Error,
}
