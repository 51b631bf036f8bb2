//! # Style Blocks
//!
//! Interval annotations over a document's text buffer.
//!
//! ## Gap Indices
//!
//! `min` and `max` are gap indices: gap 0 sits before the first character,
//! gap 1 after it. A block `[0, 1)` decorates exactly the first character and
//! a zero-width block `[n, n)` marks a position (note anchors, chapter starts).
//! Indices count Unicode scalar values.
//!
//! ## Ordering
//!
//! [`sort_style_blocks`] orders by `min` ascending, then `max` descending so
//! enclosing blocks come before the blocks they contain, then by `kind`. The
//! final key only makes output deterministic.

use std::cmp::Ordering;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use versemark_syntax::{Attributes, NumberOrRange};

use crate::reference::BibleRef;

/// A footnote or cross reference: a small document of its own anchored at
/// one position of the parent text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub caller: String,
    pub text: String,
    pub styling: Vec<StyleBlock>,
}

/// Kind-specific data carried by a style block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Plain,
    /// Level of `q2`, `li3`, `mt2` and similar.
    Indent(NumberOrRange),
    /// Column or column span of a table cell.
    Column(NumberOrRange),
    Verse(BibleRef),
    Chapter(u32),
    /// Origin reference of a note (`fr`, `xo`).
    Reference(BibleRef),
    Attributes(Attributes),
    Note(Note),
    /// Synthesized wrapper contributing no text.
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    pub min: usize,
    pub max: usize,
    pub kind: String,
    pub payload: Payload,
}

impl StyleBlock {
    pub fn new(kind: impl Into<String>, min: usize, max: usize) -> Self {
        StyleBlock {
            min,
            max,
            kind: kind.into(),
            payload: Payload::Plain,
        }
    }

    /// A block opened at `at`; `max` is provisional until it is closed.
    pub fn open(kind: impl Into<String>, at: usize, payload: Payload) -> Self {
        StyleBlock {
            min: at,
            max: at,
            kind: kind.into(),
            payload,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.payload, Payload::Virtual)
    }

    pub fn len(&self) -> usize {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    pub fn note(&self) -> Option<&Note> {
        match &self.payload {
            Payload::Note(note) => Some(note),
            _ => None,
        }
    }
}

/// Flattens the payload into the block's own fields.
impl Serialize for StyleBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", &self.kind)?;
        map.serialize_entry("min", &self.min)?;
        map.serialize_entry("max", &self.max)?;
        match &self.payload {
            Payload::Plain => {}
            Payload::Indent(level) => map.serialize_entry("indent", level)?,
            Payload::Column(column) => map.serialize_entry("column", column)?,
            Payload::Verse(r) | Payload::Reference(r) => map.serialize_entry("ref", r)?,
            Payload::Chapter(n) => map.serialize_entry("chapter", n)?,
            Payload::Attributes(attrs) => map.serialize_entry("attributes", attrs)?,
            Payload::Note(note) => {
                map.serialize_entry("caller", &note.caller)?;
                map.serialize_entry("text", &note.text)?;
                map.serialize_entry("styling", &note.styling)?;
            }
            Payload::Virtual => map.serialize_entry("is_virtual", &true)?,
        }
        map.end()
    }
}

pub fn compare_style_blocks(a: &StyleBlock, b: &StyleBlock) -> Ordering {
    a.min
        .cmp(&b.min)
        .then_with(|| b.max.cmp(&a.max))
        .then_with(|| a.kind.cmp(&b.kind))
}

pub fn sort_style_blocks(blocks: &mut [StyleBlock]) {
    blocks.sort_by(compare_style_blocks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(blocks: &[StyleBlock]) -> Vec<(&str, usize, usize)> {
        blocks
            .iter()
            .map(|b| (b.kind.as_str(), b.min, b.max))
            .collect()
    }

    #[test]
    fn wider_blocks_sort_first() {
        let mut blocks = vec![
            StyleBlock::new("v", 0, 31),
            StyleBlock::new("v", 59, 92),
            StyleBlock::new("p", 59, 92),
            StyleBlock::new("v", 31, 59),
            StyleBlock::new("p", 0, 59),
        ];
        sort_style_blocks(&mut blocks);
        assert_eq!(
            spans(&blocks),
            vec![
                ("p", 0, 59),
                ("v", 0, 31),
                ("v", 31, 59),
                ("p", 59, 92),
                ("v", 59, 92),
            ]
        );
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut blocks = vec![
            StyleBlock::new("f", 4, 4),
            StyleBlock::new("w", 2, 4),
            StyleBlock::new("p", 0, 9),
            StyleBlock::new("list", 0, 9).with_payload(Payload::Virtual),
        ];
        sort_style_blocks(&mut blocks);
        let once = blocks.clone();
        sort_style_blocks(&mut blocks);
        assert_eq!(blocks, once);
        assert_eq!(blocks[0].kind, "list");
        assert!(blocks[0].is_virtual());
    }
}
