//! # Marker Lexer
//!
//! Groups the flat token stream into [`Marker`] records: one per backslash
//! marker, carrying its level, nesting and closing flags, inline data, the free
//! text up to the next marker, and any `|` attribute list.
//!
//! ```text
//! \v 1 In the \w beginning|lemma="reshit"\w* God
//!
//! → { kind: v,  data: 1, text: "In the " }
//!   { kind: w,  text: "beginning", attributes: { lemma: "reshit" } }
//!   { kind: w,  closing, text: " God" }
//! ```
//!
//! ## Whitespace
//!
//! Runs of whitespace inside text collapse to a single space. Whitespace right
//! before a marker is kept as one trailing space unless that marker is
//! *significant* (an opening `v` or paragraph style marker, see
//! [`MarkerCatalog::is_significant_before`]): prose reads "Text \nd LORD\nd*"
//! as "Text LORD", while the newline before `\p` only separates paragraphs.
//!
//! ## Errors
//!
//! The lexer is an iterator of `Result<Marker, LexError>`. After a non-fatal
//! error it skips to the next marker token and carries on. A fatal
//! [`LexError::Grammar`] ends the stream.

mod attributes;
mod data;

use std::collections::VecDeque;

use log::debug;

pub use attributes::default_attribute;

use crate::catalog::{MarkerCatalog, normalize_kind};
use crate::error::LexError;
use crate::lexer::{Token, TokenKind, Tokenizer, TokenizerOptions};
use crate::marker::{Attributes, Marker, NumberOrRange};

/// Pull-based marker stream over a token stream.
pub struct MarkerLexer<'a> {
    tokens: Tokenizer<'a>,
    lookahead: VecDeque<Token<'a>>,
    catalog: &'a MarkerCatalog,
    finished: bool,
}

impl<'a> MarkerLexer<'a> {
    pub fn new(source: &'a str, catalog: &'a MarkerCatalog) -> Self {
        Self::with_options(source, catalog, TokenizerOptions::default())
    }

    pub fn with_options(
        source: &'a str,
        catalog: &'a MarkerCatalog,
        options: TokenizerOptions,
    ) -> Self {
        Self {
            tokens: Tokenizer::with_options(source, options),
            lookahead: VecDeque::new(),
            catalog,
            finished: false,
        }
    }

    fn peek_nth(&mut self, n: usize) -> Option<&Token<'a>> {
        while self.lookahead.len() <= n {
            let token = self.tokens.next()?;
            self.lookahead.push_back(token);
        }
        self.lookahead.get(n)
    }

    fn peek_kind(&mut self, n: usize) -> Option<TokenKind> {
        self.peek_nth(n).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        self.lookahead
            .pop_front()
            .or_else(|| self.tokens.next())
    }

    fn skip_whitespace(&mut self) {
        while self.peek_kind(0) == Some(TokenKind::Whitespace) {
            self.bump();
        }
    }

    /// Drop tokens up to the next marker token.
    fn resync(&mut self) {
        let mut skipped = 0;
        while let Some(kind) = self.peek_kind(0)
            && kind != TokenKind::Marker
        {
            self.bump();
            skipped += 1;
        }
        if skipped > 0 {
            debug!("skipped {skipped} tokens to reach the next marker");
        }
    }

    /// Whether whitespace before the marker token at `n` must stay out of the
    /// preceding text.
    fn significant_marker_at(&mut self, n: usize) -> bool {
        let catalog = self.catalog;
        match self.peek_nth(n) {
            Some(token) if token.kind == TokenKind::Marker => {
                let closing = token.value.ends_with('*');
                catalog.is_significant_before(normalize_kind(&token.value), closing)
            }
            _ => false,
        }
    }

    fn lex_marker(&mut self) -> Option<Result<Marker, LexError>> {
        self.skip_whitespace();
        let token = self.bump()?;

        if token.kind != TokenKind::Marker {
            self.resync();
            return Some(Err(LexError::Syntax {
                position: token.min,
                message: format!("expected a marker, found '{}'", token.value),
            }));
        }

        let mut marker = match parse_head(&token.value, token.min) {
            Ok(marker) => marker,
            Err(err) => return Some(Err(err)),
        };
        let mut text = String::new();

        if marker.closing {
            let spaced = match self.peek_kind(1) {
                Some(TokenKind::Word) => true,
                Some(TokenKind::Marker) => !self.significant_marker_at(1),
                _ => false,
            };
            if spaced && self.peek_kind(0) == Some(TokenKind::Whitespace) {
                self.bump();
                text.push(' ');
            }
        } else {
            match self.peek_kind(0) {
                Some(TokenKind::Whitespace) => {
                    self.bump();
                }
                Some(TokenKind::Word | TokenKind::VBar) => {
                    let found = self.bump().map(|t| t.value.into_owned()).unwrap_or_default();
                    self.resync();
                    return Some(Err(LexError::Syntax {
                        position: token.max + 1,
                        message: format!("expected whitespace after '{marker}', found '{found}'"),
                    }));
                }
                Some(TokenKind::Marker) | None => {}
            }

            if let Some(pattern) = data::data_pattern(&marker.kind) {
                let word = match self.peek_nth(0) {
                    Some(t) if t.kind == TokenKind::Word => Some((t.value.clone(), t.min)),
                    _ => None,
                };
                let split = word
                    .as_ref()
                    .and_then(|(value, _)| data::split_data(pattern, value));
                match split {
                    Some((data, rest)) => {
                        marker.data = Some(data.to_string());
                        text.push_str(rest);
                        self.bump();
                        if rest.is_empty() && self.peek_kind(0) == Some(TokenKind::Whitespace) {
                            self.bump();
                        }
                    }
                    None => {
                        let (found, position) = match word {
                            Some((value, min)) => (value.into_owned(), min),
                            None => (String::new(), token.max + 1),
                        };
                        self.resync();
                        return Some(Err(LexError::DataFormat {
                            kind: marker.kind,
                            position,
                            found,
                        }));
                    }
                }
            }
        }

        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Word) => {
                    if let Some(word) = self.bump() {
                        text.push_str(&word.value);
                    }
                }
                Some(TokenKind::Whitespace) => {
                    let keep = match self.peek_kind(1) {
                        Some(TokenKind::Word) => true,
                        Some(TokenKind::Marker) => !self.significant_marker_at(1),
                        Some(TokenKind::VBar | TokenKind::Whitespace) | None => false,
                    };
                    self.bump();
                    if keep && !text.is_empty() {
                        text.push(' ');
                    }
                }
                Some(TokenKind::VBar) => {
                    let bar = self.bump()?;
                    match self.lex_attributes(&marker.kind, bar.min) {
                        Ok(attrs) => marker.attributes = Some(attrs),
                        Err(err) => return Some(Err(err)),
                    }
                    text.truncate(text.trim_end().len());
                    break;
                }
                Some(TokenKind::Marker) | None => break,
            }
        }

        if self.peek_kind(0).is_none() {
            text.truncate(text.trim_end().len());
        }
        if !text.is_empty() {
            marker.text = Some(text);
        }
        Some(Ok(marker))
    }

    /// Consume the attribute section following a `|` at `bar`.
    fn lex_attributes(&mut self, kind: &str, bar: usize) -> Result<Attributes, LexError> {
        let mut raw = String::new();
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Word) => {
                    if let Some(word) = self.bump() {
                        raw.push_str(&word.value);
                    }
                }
                Some(TokenKind::Whitespace) => {
                    self.bump();
                    raw.push(' ');
                }
                Some(TokenKind::VBar) => {
                    let position = self.bump().map_or(bar, |t| t.min);
                    self.resync();
                    return Err(LexError::Syntax {
                        position,
                        message: format!("second '|' in the attributes of '{kind}'"),
                    });
                }
                Some(TokenKind::Marker) | None => break,
            }
        }
        attributes::parse_attributes(kind, &raw).map_err(|message| LexError::Attribute {
            kind: kind.to_string(),
            message,
        })
    }
}

impl Iterator for MarkerLexer<'_> {
    type Item = Result<Marker, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.lex_marker();
        match &item {
            None => self.finished = true,
            Some(Err(err)) if err.is_fatal() => self.finished = true,
            _ => {}
        }
        item
    }
}

/// Lex a whole source with default tokenizer options.
pub fn lex_markers<'a>(source: &'a str, catalog: &'a MarkerCatalog) -> MarkerLexer<'a> {
    MarkerLexer::new(source, catalog)
}

/// Parse the characters of a marker token: `\`, optional `+`, kind letters,
/// optional level or range, optional `*`.
pub fn parse_head(token: &str, position: usize) -> Result<Marker, LexError> {
    let grammar = || LexError::Grammar {
        position,
        token: token.to_string(),
    };

    let rest = token.strip_prefix('\\').ok_or_else(grammar)?;
    let (nested, rest) = match rest.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    let kind_len = rest
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(rest.len());
    if kind_len == 0 {
        return Err(grammar());
    }
    let (kind, rest) = rest.split_at(kind_len);

    let (closing, rest) = match rest.strip_suffix('*') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    let level = if rest.is_empty() {
        None
    } else {
        Some(NumberOrRange::parse(rest).ok_or_else(grammar)?)
    };

    Ok(Marker {
        kind: kind.to_string(),
        level,
        nested,
        closing,
        ..Marker::default()
    })
}
