//! # versemark-syntax
//!
//! The front half of the USFM compiler: turning source text into a stream of
//! [`Marker`] records, using [Logos] for tokenization.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Tokenizer → Tokens → Marker Lexer → Markers
//!               (Logos)               (lookahead + catalog)
//! ```
//!
//! ### 1. Tokenizer ([`lexer`] module)
//!
//! Classifies every character into `Whitespace`, `VBar`, `Marker` or `Word`
//! runs, recording character offsets. Nothing is discarded.
//!
//! ```text
//! "\v 1 Hi" → [MARKER(\v), WHITESPACE, WORD(1), WHITESPACE, WORD(Hi)]
//! ```
//!
//! ### 2. Marker Lexer ([`markers`] module)
//!
//! Groups tokens into markers: kind, level, nesting and closing flags, inline
//! data (chapter numbers, verse numbers, note callers), trailing text, and
//! `|` attribute lists. Decides which whitespace belongs to the text.
//!
//! ### 3. Marker Catalog ([`catalog`] module)
//!
//! Per-kind metadata (style type, publishability) injected into the lexer and
//! the body compiler in `versemark-engine`.
//!
//! ## Quick Start
//!
//! ```
//! use versemark_syntax::{lex_markers, MarkerCatalog};
//!
//! let catalog = MarkerCatalog::builtin();
//! let markers: Vec<_> = lex_markers("\\c 1 \\p \\v 1 In the beginning", &catalog)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(markers.len(), 3);
//! assert_eq!(markers[0].kind, "c");
//! assert_eq!(markers[2].data.as_deref(), Some("1"));
//! assert_eq!(markers[2].text.as_deref(), Some("In the beginning"));
//! ```

pub mod catalog;
pub mod error;
pub mod lexer;
pub mod marker;
pub mod markers;

pub use catalog::{MarkerCatalog, MarkerMeta, StyleType, normalize_kind};
pub use error::LexError;
pub use lexer::{Token, TokenKind, Tokenizer, TokenizerOptions, tokenize};
pub use marker::{Attributes, Marker, NumberOrRange};
pub use markers::{MarkerLexer, default_attribute, lex_markers, parse_head};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    /// One line per marker, for snapshot testing.
    fn format_markers(source: &str) -> String {
        let catalog = MarkerCatalog::builtin();
        let mut out = String::new();
        for result in lex_markers(source, &catalog) {
            match result {
                Ok(marker) => {
                    out.push_str(&marker.to_string());
                    if let Some(data) = &marker.data {
                        out.push_str(&format!(" data={data:?}"));
                    }
                    if let Some(text) = &marker.text {
                        out.push_str(&format!(" text={text:?}"));
                    }
                    if let Some(attrs) = &marker.attributes {
                        out.push_str(&format!(" [{attrs}]"));
                    }
                }
                Err(err) => out.push_str(&format!("error: {err}")),
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn snapshot_verse_with_word_attributes() {
        let input = "\\p\n\\v 1 In \\w the|lemma=\"test\"\\w*beginning \\+nd God\\+nd*";
        assert_snapshot!(format_markers(input), @r#"
        \p
        \v data="1" text="In "
        \w text="the" [lemma="test"]
        \w* text="beginning "
        \+nd text="God"
        \+nd*
        "#);
    }

    #[test]
    fn snapshot_table() {
        let input = "\\tr \\th1 Tribe \\thr2 Leader\n\\tr \\tc1-2 Reuben";
        assert_snapshot!(format_markers(input), @r#"
        \tr
        \th1 text="Tribe "
        \thr2 text="Leader"
        \tr
        \tc1-2 text="Reuben"
        "#);
    }

    #[test]
    fn snapshot_messy_input_recovers() {
        let input = "loose text \\c one \\v 2 kept \\w a|b|c\\w* \\p end";
        assert_snapshot!(format_markers(input), @r#"
        error: syntax error at position 0: expected a marker, found 'loose'
        error: marker 'c' at position 14 expects data, found 'one'
        \v data="2" text="kept "
        error: syntax error at position 34: second '|' in the attributes of 'w'
        \w*
        \p text="end"
        "#);
    }

    #[test]
    fn tokens_cover_the_source() {
        let inputs = [
            "\\id GEN\n",
            "\\c 1\r\n\\p\r\n\\v 1 text",
            "\\w a|lemma=\"b\"\\w*",
            "no markers at all",
        ];

        for input in inputs {
            let rebuilt: usize = tokenize(input).iter().map(|t| t.max + 1 - t.min).sum();
            assert_eq!(rebuilt, input.chars().count(), "coverage failed for {input:?}");
        }
    }
}
