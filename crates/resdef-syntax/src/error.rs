use std::fmt;

use crate::lexer::Position;

// ── Lexer errors ──────────────────────────────────────────────────────────

/// Why a lexer run stopped early.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A character that cannot start any token.
    InvalidToken,
    /// `0x` / `0b` prefix without any digits after it.
    MalformedBaseNumber,
    /// A second `e`/`E` inside one numeric literal.
    MultipleExponent,
    /// `e`/`E` (and optional sign) not followed by a digit.
    NoExponent,
    /// `\x` / `\X` escape without hex digits, or not a valid code point.
    MalformedUnicode,
    /// Input ended before the closing quote.
    UnterminatedString,
    /// Input ended before `*/`.
    UnterminatedComment,
}

impl LexErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidToken        => "invalid token",
            Self::MalformedBaseNumber => "malformed number literal: not a base-number",
            Self::MultipleExponent    => "malformed number literal: exponent already provided",
            Self::NoExponent          => "malformed number literal: exponent expected but not found",
            Self::MalformedUnicode    => "malformed unicode escape in string",
            Self::UnterminatedString  => "unterminated string",
            Self::UnterminatedComment => "unterminated block comment",
        }
    }
}

/// A lexical error with the position it was detected at.
///
/// Unterminated strings and comments report the position of their opening
/// delimiter, everything else reports the offending character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub pos:  Position,
}

impl LexError {
    pub(crate) fn new(kind: LexErrorKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lex error at {}: {}", self.pos, self.kind.message())
    }
}

impl std::error::Error for LexError {}

// ── Parse errors ──────────────────────────────────────────────────────────

/// Classification of a failed read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The token list was exhausted.
    EndOfTokens,
    /// The current token is not what the read asked for.
    NoMatch,
    /// Definition does not start with `mat`/`shader`.
    InvalidResdef,
    /// Expected a `mat` definition.
    NotMaterial,
    /// Expected a `shader` definition.
    NotShader,
    /// A `{` was never closed.
    UnmatchedBrace,
    /// Structurally wrong token inside a definition.
    UnexpectedToken,
}

/// A parse error carrying its own message and position.
///
/// `pos` is `None` when the error was raised at the end of the token list.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind:    ParseErrorKind,
    pub message: String,
    pub pos:     Option<Position>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, pos: Option<Position>) -> Self {
        Self { kind, message: message.into(), pos }
    }

    pub fn end_of_tokens() -> Self {
        Self::new(ParseErrorKind::EndOfTokens, "no more tokens to read from the token list", None)
    }

    /// Same error, reclassified. Used when a low-level mismatch has a more
    /// specific meaning for the caller.
    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        // Running out of tokens stays an end-of-tokens error.
        if self.kind != ParseErrorKind::EndOfTokens {
            self.kind = kind;
        }
        self
    }

    pub fn is_end_of_tokens(&self) -> bool {
        self.kind == ParseErrorKind::EndOfTokens
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "parse error at {}: {}", pos, self.message),
            None      => write!(f, "parse error at end of tokens: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
