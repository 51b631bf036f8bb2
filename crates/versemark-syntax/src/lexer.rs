//! # Lexer - Tokenizing USFM Source
//!
//! This module provides the first stage of parsing: breaking source text into
//! a flat sequence of tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Coverage Guarantee
//!
//! Every character of the input appears in exactly one token. Nothing is
//! trimmed or skipped here; deciding which whitespace matters is the marker
//! lexer's job. The only rewrite is newline normalisation: CR, LF and CRLF
//! inside a whitespace token all become `"\n"` in the token's `value`.
//!
//! ```
//! use versemark_syntax::lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("\\v 1 In the beginning");
//! assert_eq!(tokens[0].kind, TokenKind::Marker);
//! assert_eq!(tokens[0].value, "\\v");
//! assert_eq!(tokens.len(), 9);
//! ```
//!
//! ## Token Classes
//!
//! - `Whitespace` - a maximal run of ` `, `\t`, `\r`, `\n` (and `¶` when
//!   [`TokenizerOptions::pilcrow_whitespace`] is set)
//! - `VBar` - the literal `|` that introduces an attribute list
//! - `Marker` - `\` followed by everything up to whitespace, `|`, the next `\`,
//!   or a trailing `*` (which is included)
//! - `Word` - any other maximal run of characters
//!
//! ## Why Two Token Enums?
//!
//! Logos needs its own enum to derive on, and some of its raw tokens (the
//! pilcrow) only get a class once the runtime options are known. [`RawToken`]
//! is what Logos produces; [`TokenKind`] is what the rest of the crate sees.
//! Adjacent raw tokens that resolve to the same `Whitespace` or `Word` class
//! are merged so runs stay maximal.

use std::borrow::Cow;
use std::ops::Range;

use logos::Logos;
use serde::Serialize;

/// Token kinds produced by the Logos lexer before option-dependent resolution.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    /// Spaces, tabs and line endings
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Pilcrow, whitespace in some source editions
    #[regex(r"¶+")]
    Pilcrow,

    /// Attribute list separator
    #[token("|")]
    VBar,

    /// Backslash marker, including a trailing `*` when present
    #[regex(r"\\[^ \t\r\n|\\*¶]*\*?")]
    Marker,

    /// Anything else
    #[regex(r"[^ \t\r\n|\\¶]+")]
    Word,
}

/// Classification of a token as seen by the marker lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Whitespace,
    VBar,
    Word,
    Marker,
}

impl TokenKind {
    /// Whether consecutive tokens of this kind fold into one.
    fn is_run(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Word)
    }
}

/// Runtime switches for the tokenizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Treat `¶` as whitespace rather than as part of a word.
    pub pilcrow_whitespace: bool,
}

/// A token with its (newline-normalised) value and character offsets.
///
/// `min` and `max` are the offsets of the first and last character of the
/// token, counted in Unicode scalar values from the start of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub value: Cow<'a, str>,
    pub min: usize,
    pub max: usize,
}

/// Pull-based token stream over a source string.
///
/// Finite, and restartable only by constructing a new `Tokenizer` over the
/// same input.
pub struct Tokenizer<'a> {
    source: &'a str,
    raw: logos::Lexer<'a, RawToken>,
    options: TokenizerOptions,
    pending: Option<(TokenKind, Range<usize>)>,
    char_pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, TokenizerOptions::default())
    }

    pub fn with_options(source: &'a str, options: TokenizerOptions) -> Self {
        Self {
            source,
            raw: RawToken::lexer(source),
            options,
            pending: None,
            char_pos: 0,
        }
    }

    fn pull(&mut self) -> Option<(TokenKind, Range<usize>)> {
        let result = self.raw.next()?;
        let kind = match result {
            Ok(RawToken::Whitespace) => TokenKind::Whitespace,
            Ok(RawToken::Pilcrow) if self.options.pilcrow_whitespace => TokenKind::Whitespace,
            Ok(RawToken::Pilcrow) => TokenKind::Word,
            Ok(RawToken::VBar) => TokenKind::VBar,
            Ok(RawToken::Marker) => TokenKind::Marker,
            Ok(RawToken::Word) => TokenKind::Word,
            // Logos error means unrecognized character - treat as Word
            Err(()) => TokenKind::Word,
        };
        Some((kind, self.raw.span()))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let (kind, span) = match self.pending.take() {
            Some(pending) => pending,
            None => self.pull()?,
        };

        let mut end = span.end;
        if kind.is_run() {
            loop {
                match self.pull() {
                    Some((next_kind, next_span)) if next_kind == kind => end = next_span.end,
                    other => {
                        self.pending = other;
                        break;
                    }
                }
            }
        }

        let slice = &self.source[span.start..end];
        let count = slice.chars().count();
        let min = self.char_pos;
        self.char_pos += count;

        let value = if kind == TokenKind::Whitespace {
            normalize_newlines(slice)
        } else {
            Cow::Borrowed(slice)
        };

        Some(Token {
            kind,
            value,
            min,
            max: min + count.saturating_sub(1),
        })
    }
}

/// Rewrite CRLF and lone CR as LF, borrowing when nothing changes.
fn normalize_newlines(s: &str) -> Cow<'_, str> {
    if s.contains('\r') {
        Cow::Owned(s.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Tokenize the whole input with default options.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Tokenizer::new(source).collect()
}
