use thiserror::Error;

/// Failure while grouping tokens into markers.
///
/// Positions are character offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("marker '{kind}' at position {position} expects data, found '{found}'")]
    DataFormat {
        kind: String,
        position: usize,
        found: String,
    },

    #[error("invalid attributes on marker '{kind}': {message}")]
    Attribute { kind: String, message: String },

    #[error("malformed marker token '{token}' at position {position}")]
    Grammar { position: usize, token: String },
}

impl LexError {
    /// Fatal errors mean the token stream contradicts the marker grammar and
    /// lexing cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LexError::Grammar { .. })
    }

    /// Character offset the error refers to, when known.
    pub fn position(&self) -> Option<usize> {
        match self {
            LexError::Syntax { position, .. }
            | LexError::DataFormat { position, .. }
            | LexError::Grammar { position, .. } => Some(*position),
            LexError::Attribute { .. } => None,
        }
    }
}
