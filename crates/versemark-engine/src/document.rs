use serde::Serialize;
use versemark_syntax::{LexError, Marker};

use crate::style::StyleBlock;

/// Non-fatal diagnostic collected while compiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    pub message: String,
}

impl ParserError {
    pub fn new(marker: &Marker, message: impl Into<String>) -> Self {
        ParserError {
            marker: Some(marker.clone()),
            message: message.into(),
        }
    }

    /// Diagnostic for a recoverable lexer error, naming the marker kind when
    /// the lexer got that far.
    pub fn from_lex(err: &LexError) -> Self {
        let marker = match err {
            LexError::DataFormat { kind, .. } | LexError::Attribute { kind, .. } => {
                Some(Marker::new(kind.as_str()))
            }
            LexError::Syntax { .. } | LexError::Grammar { .. } => None,
        };
        ParserError {
            marker,
            message: err.to_string(),
        }
    }
}

/// Flat text plus the style blocks decorating it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub text: String,
    pub styling: Vec<StyleBlock>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParserError>,
}

impl Document {
    /// Length of the text in gap indices.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.styling.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Text covered by a block of this document.
    pub fn slice(&self, block: &StyleBlock) -> String {
        self.text
            .chars()
            .skip(block.min)
            .take(block.max.saturating_sub(block.min))
            .collect()
    }

    /// Blocks of the given kind, in document order.
    pub fn blocks<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a StyleBlock> + 'a {
        self.styling.iter().filter(move |b| b.kind == kind)
    }
}

/// Text accumulator that tracks its length in characters.
#[derive(Debug, Default)]
pub(crate) struct TextBuffer {
    text: String,
    len: usize,
}

impl TextBuffer {
    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.len += s.chars().count();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn ends_with_whitespace(&self) -> bool {
        self.text.ends_with(char::is_whitespace)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
