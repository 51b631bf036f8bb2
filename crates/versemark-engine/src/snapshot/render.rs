use std::fmt::Write;

use crate::document::Document;
use crate::style::{Payload, StyleBlock};

/// Render a document as an indented listing.
///
/// The first line is the full text. Each block follows on its own line,
/// indented under the block that contains it, with its span, payload and the
/// text it covers. Notes list their own text and blocks beneath them. Errors
/// close the listing, one per line, prefixed with `!`.
///
/// ```text
/// "Hello World.Centered Text."
/// v 0..26 ref=GEN 1:1 "Hello World.Centered Text."
///   p 0..12 "Hello World."
///   pc 12..26 "Centered Text."
/// ```
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:?}", doc.text);
    render_blocks(&mut out, &doc.text, &doc.styling, 0);
    for err in &doc.errors {
        let _ = writeln!(out, "! {}", err.message);
    }
    out
}

fn contains(outer: &StyleBlock, inner: &StyleBlock) -> bool {
    outer.min <= inner.min
        && inner.max <= outer.max
        && (inner.min < outer.max || inner.is_empty())
}

fn render_blocks(out: &mut String, text: &str, blocks: &[StyleBlock], depth: usize) {
    let mut stack: Vec<&StyleBlock> = Vec::new();
    for block in blocks {
        while let Some(top) = stack.last()
            && !contains(top, block)
        {
            stack.pop();
        }
        let indent = "  ".repeat(depth + stack.len());
        let _ = write!(out, "{indent}{} {}..{}", block.kind, block.min, block.max);
        write_payload(out, &block.payload);
        if !block.is_empty() && !block.is_virtual() {
            let covered: String = text
                .chars()
                .skip(block.min)
                .take(block.len())
                .collect();
            let _ = write!(out, " {covered:?}");
        }
        out.push('\n');

        if let Some(note) = block.note() {
            let _ = writeln!(out, "{indent}  {:?}", note.text);
            render_blocks(out, &note.text, &note.styling, depth + stack.len() + 1);
        }
        stack.push(block);
    }
}

fn write_payload(out: &mut String, payload: &Payload) {
    let _ = match payload {
        Payload::Plain | Payload::Note(_) => Ok(()),
        Payload::Indent(level) => write!(out, " indent={level}"),
        Payload::Column(column) => write!(out, " column={column}"),
        Payload::Verse(r) | Payload::Reference(r) => write!(out, " ref={r}"),
        Payload::Chapter(n) => write!(out, " chapter={n}"),
        Payload::Attributes(attrs) => write!(out, " {attrs}"),
        Payload::Virtual => write!(out, " virtual"),
    };
    if let Payload::Note(note) = payload {
        let _ = write!(out, " caller={}", note.caller);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{BibleRef, VerseRef};
    use insta::assert_snapshot;

    #[test]
    fn nests_contained_blocks() {
        let doc = Document {
            text: "Hello World.Centered Text.".into(),
            styling: vec![
                StyleBlock::new("v", 0, 26).with_payload(Payload::Verse(BibleRef::Verse(
                    VerseRef::new("GEN", 1, 1),
                ))),
                StyleBlock::new("p", 0, 12),
                StyleBlock::new("pc", 12, 26),
            ],
            errors: vec![],
        };
        assert_snapshot!(render(&doc), @r#"
        "Hello World.Centered Text."
        v 0..26 ref=GEN 1:1 "Hello World.Centered Text."
          p 0..12 "Hello World."
          pc 12..26 "Centered Text."
        "#);
    }
}
