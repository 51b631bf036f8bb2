//! Footnote and cross reference sub-compilers.
//!
//! A note runs from its opening marker (`\f`, `\fe`, `\ef`, `\x`, `\ex`) to
//! the matching closing marker and compiles into a [`Note`]: its own text and
//! styling, anchored as one zero-width block in the parent document.
//!
//! Inside a note only the family's content markers and generic character
//! markers are accepted. Anything else is reported and skipped. A structural
//! marker (`\p`, `\v`, `\c`, ...) ends an unclosed note without being consumed,
//! so the parent compiler still sees it.

use log::debug;
use versemark_syntax::{Marker, MarkerCatalog};

use crate::document::{ParserError, TextBuffer};
use crate::reference::BibleRef;
use crate::style::{Note, Payload, StyleBlock, sort_style_blocks};

use super::category::{Category, Role, classify};
use super::open::OpenBlocks;
use super::{CompileContext, apply_character};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoteFamily {
    Footnote,
    CrossRef,
}

/// How a marker participates inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    /// Mutually exclusive content markers such as `ft`, `fq`, `xt`.
    Exclusive(Category),
    /// Paired markers, each kind in its own category.
    Paired(&'static str),
    Character,
}

impl NoteFamily {
    fn content(self, kind: &str, catalog: &MarkerCatalog) -> Option<Content> {
        let content = match (self, kind) {
            (
                NoteFamily::Footnote,
                "fr" | "fq" | "fqa" | "fk" | "fl" | "fw" | "fp" | "ft",
            ) => Content::Exclusive(Category::FootnoteContent),
            (NoteFamily::Footnote, "fv") => Content::Paired("fv"),
            (NoteFamily::Footnote, "fdc") => Content::Paired("fdc"),
            (NoteFamily::Footnote, "fm") => Content::Paired("fm"),

            (NoteFamily::CrossRef, "xo" | "xk" | "xq" | "xt" | "xta") => {
                Content::Exclusive(Category::CrossRefContent)
            }
            (NoteFamily::CrossRef, "xop") => Content::Paired("xop"),
            (NoteFamily::CrossRef, "xot") => Content::Paired("xot"),
            (NoteFamily::CrossRef, "xnt") => Content::Paired("xnt"),
            (NoteFamily::CrossRef, "xdc") => Content::Paired("xdc"),
            (NoteFamily::CrossRef, "rq") => Content::Paired("rq"),

            _ if classify(kind, catalog) == Role::Character => Content::Character,
            _ => return None,
        };
        Some(content)
    }
}

/// Result of compiling one note.
#[derive(Debug)]
pub(crate) struct NoteOutcome {
    /// Index of the first marker after the note.
    pub next: usize,
    pub note: Note,
    /// Text following the closing marker, which belongs to the parent.
    pub trailing: String,
}

struct NoteCompiler<'m, 'c> {
    family: NoteFamily,
    opener: &'m Marker,
    ctx: &'c CompileContext,
    catalog: &'c MarkerCatalog,
    text: TextBuffer,
    open: OpenBlocks,
}

/// Compile the note opened by `markers[start]`. Diagnostics go to `errors`.
pub(crate) fn compile_note(
    markers: &[Marker],
    start: usize,
    family: NoteFamily,
    ctx: &CompileContext,
    catalog: &MarkerCatalog,
    errors: &mut Vec<ParserError>,
) -> NoteOutcome {
    let opener = &markers[start];
    let caller = match &opener.data {
        Some(caller) => caller.clone(),
        None => {
            errors.push(ParserError::new(
                opener,
                "note opening marker must have data to specify its caller",
            ));
            String::new()
        }
    };

    let mut compiler = NoteCompiler {
        family,
        opener,
        ctx,
        catalog,
        text: TextBuffer::default(),
        open: OpenBlocks::default(),
    };
    if let Some(text) = &opener.text {
        compiler.text.push_str(text);
    }

    let mut idx = start + 1;
    let mut trailing = String::new();
    let mut terminated = false;

    while let Some(marker) = markers.get(idx) {
        let role = classify(&marker.kind, catalog);

        if matches!(role, Role::Footnote | Role::CrossRef) {
            terminated = true;
            if marker.closing {
                if marker.kind != opener.kind {
                    errors.push(ParserError::new(
                        marker,
                        format!("{marker} closes a note opened by {opener}"),
                    ));
                }
                trailing = marker.text.clone().unwrap_or_default();
                idx += 1;
            } else {
                errors.push(ParserError::new(
                    marker,
                    "cannot open a note inside another note",
                ));
            }
            break;
        }

        if role.ends_note() {
            debug!("{opener} ended early by {marker}");
            errors.push(ParserError::new(
                marker,
                format!("note {opener} not closed before {marker}"),
            ));
            terminated = true;
            break;
        }

        compiler.apply(marker, errors);
        idx += 1;
    }

    if !terminated {
        errors.push(ParserError::new(
            opener,
            format!("note {opener} not closed before end of input"),
        ));
    }

    NoteOutcome {
        next: idx,
        note: compiler.finish(caller),
        trailing,
    }
}

impl NoteCompiler<'_, '_> {
    fn apply(&mut self, marker: &Marker, errors: &mut Vec<ParserError>) {
        let at = self.text.len();
        match self.family.content(&marker.kind, self.catalog) {
            Some(Content::Exclusive(category)) => self.toggle(category, marker, at, errors),
            Some(Content::Paired(kind)) => self.toggle(Category::Paired(kind), marker, at, errors),
            Some(Content::Character) => apply_character(&mut self.open, marker, at, errors),
            None => {
                errors.push(ParserError::new(
                    marker,
                    format!(
                        "skipping unexpected marker {marker} inside note {}",
                        self.opener
                    ),
                ));
                return;
            }
        }
        if let Some(text) = &marker.text {
            self.text.push_str(text);
        }
    }

    /// Open a content block, or close it for a closing marker of the same kind.
    fn toggle(
        &mut self,
        category: Category,
        marker: &Marker,
        at: usize,
        errors: &mut Vec<ParserError>,
    ) {
        if marker.closing {
            let matches = self
                .open
                .get(category)
                .is_some_and(|b| b.kind == marker.kind);
            if matches {
                self.open.close(category, at);
            } else {
                errors.push(ParserError::new(
                    marker,
                    format!("{marker} closes a block that is not open"),
                ));
            }
            return;
        }
        let payload = self.payload(marker, errors);
        self.open
            .open(category, StyleBlock::open(marker.kind.clone(), at, payload));
    }

    fn payload(&self, marker: &Marker, errors: &mut Vec<ParserError>) -> Payload {
        let book = self.ctx.book.as_str();
        let reference = match marker.kind.as_str() {
            "fr" | "xo" => marker
                .data
                .as_deref()
                .and_then(|d| BibleRef::parse_chapter_verse(book, d))
                .map(Payload::Reference),
            "fv" => marker
                .data
                .as_deref()
                .and_then(|d| BibleRef::parse_verse(book, self.ctx.chapter, d))
                .map(Payload::Verse),
            _ => {
                return marker
                    .attributes
                    .clone()
                    .map_or(Payload::Plain, Payload::Attributes);
            }
        };
        reference.unwrap_or_else(|| {
            errors.push(ParserError::new(
                marker,
                format!("{marker} needs a verse reference"),
            ));
            Payload::Plain
        })
    }

    fn finish(self, caller: String) -> Note {
        let len = self.text.len();
        let mut styling = self.open.finish(len);
        sort_style_blocks(&mut styling);
        Note {
            caller,
            text: self.text.into_string(),
            styling,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{CompileContext, compile_source};
    use crate::document::Document;
    use crate::reference::{BibleRef, VerseRef};
    use crate::style::{Note, Payload};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use versemark_syntax::{MarkerCatalog, TokenizerOptions};

    fn compile_str(source: &str) -> Document {
        let catalog = MarkerCatalog::builtin();
        compile_source(
            source,
            &CompileContext::new("GEN", 1),
            &catalog,
            TokenizerOptions::default(),
        )
        .expect("no fatal lexer errors")
    }

    fn note<'d>(doc: &'d Document, kind: &'d str) -> &'d Note {
        doc.blocks(kind)
            .next()
            .and_then(|b| b.note())
            .unwrap_or_else(|| panic!("no {kind} note in {doc:#?}"))
    }

    fn messages(doc: &Document) -> Vec<&str> {
        doc.errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[rstest]
    #[case("\\p B", "p")]
    #[case("\\v 2 B", "v")]
    #[case("\\c 2 B", "c")]
    fn unclosed_note_is_ended_by_structure(#[case] ender: &str, #[case] kind: &str) {
        let doc = compile_str(&format!("\\p A\\f + \\ft note {ender}"));

        assert_eq!(doc.errors.len(), 1);
        assert!(doc.errors[0].message.contains("not closed before"));
        assert_eq!(doc.errors[0].marker.as_ref().map(|m| m.kind.as_str()), Some(kind));

        assert_eq!(doc.text, "AB");
        assert!(doc.blocks(kind).any(|b| b.min == 1));
        let note = note(&doc, "f");
        assert_eq!(note.text, "note");
        assert_eq!(note.styling.len(), 1);
        assert_eq!((note.styling[0].min, note.styling[0].max), (0, 4));
    }

    #[test]
    fn note_opened_inside_note_is_left_for_the_parent() {
        let doc = compile_str("\\p A\\f + \\ft a\\x - \\xt b\\x*\\f* C");

        assert_eq!(
            messages(&doc),
            vec![
                "cannot open a note inside another note",
                "\\f* closes a note opened by \\x",
            ]
        );
        assert_eq!(doc.text, "A C");
        assert_eq!(note(&doc, "f").text, "a");
        assert_eq!(note(&doc, "x").text, "b");
        let anchors: Vec<_> = doc.styling.iter().map(|b| (b.kind.as_str(), b.min)).collect();
        assert!(anchors.contains(&("f", 1)));
        assert!(anchors.contains(&("x", 1)));
    }

    #[test]
    fn wrong_closing_marker_still_ends_the_note() {
        let doc = compile_str("\\p A\\f + \\ft a\\x* b");

        assert_eq!(doc.errors.len(), 1);
        assert!(doc.errors[0].message.contains("closes a note opened by"));
        assert_eq!(doc.text, "A b");
        assert_eq!(note(&doc, "f").text, "a");
    }

    #[test]
    fn end_of_input_ends_the_note() {
        let doc = compile_str("\\p A\\f + \\ft a");

        assert_eq!(doc.errors.len(), 1);
        assert!(doc.errors[0].message.contains("not closed before end of input"));
        assert_eq!(doc.text, "A");
        let note = note(&doc, "f");
        assert_eq!(note.text, "a");
        assert_eq!((note.styling[0].min, note.styling[0].max), (0, 1));
    }

    #[test]
    fn verse_marker_inside_footnote_does_not_end_quotation() {
        let doc = compile_str("\\p \\v 3 x\\f + \\fqa a\\fv 3\\fv* b\\f*");
        assert!(doc.errors.is_empty(), "{:#?}", doc.errors);

        let note = note(&doc, "f");
        assert_eq!(note.text, "a b");
        let fqa = note.styling.iter().find(|b| b.kind == "fqa").expect("fqa");
        assert_eq!((fqa.min, fqa.max), (0, 3));
        let fv = note.styling.iter().find(|b| b.kind == "fv").expect("fv");
        assert_eq!((fv.min, fv.max), (1, 1));
        assert_eq!(
            fv.payload,
            Payload::Verse(BibleRef::Verse(VerseRef::new("GEN", 1, 3)))
        );
    }
}
