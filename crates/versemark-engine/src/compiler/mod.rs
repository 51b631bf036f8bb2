//! # Body Compiler
//!
//! Folds a marker sequence into a [`Document`]: one flat text buffer plus
//! style blocks over it.
//!
//! ## Model
//!
//! Every marker kind is classified into a role (see `category`). Roles that
//! open blocks name a *category*, and each category holds at most one open
//! block. Opening a block in a category first closes the block it held, which
//! is how `\m` ends a `\p` and `\q2` ends a `\q1`.
//!
//! The structural categories (paragraph, poetry, heading, list entry, table
//! row) also close each other. Verses and character spans run across them.
//!
//! ```text
//! \p \v 1 Hello World. \pc Centered Text.
//!
//! text:  "Hello World.Centered Text."
//! v  [0, 26)  GEN 1:1
//! p  [0, 12)
//! pc [12, 26)
//! ```
//!
//! ## Lists and Tables
//!
//! A run of list entries is wrapped in a virtual `list` block, with a nested
//! `list_items` block around the `\li` entries. A run of table rows is wrapped
//! in a virtual `table` block. Virtual blocks contribute no text.
//!
//! ## Notes
//!
//! Footnotes and cross references are compiled by [`notes`] into a sub
//! document, anchored here as a zero-width block carrying the note. Text that
//! follows the closing marker continues the parent text.
//!
//! ## Errors
//!
//! Problems with the input never stop compilation. Unknown markers, unmatched
//! closing markers and malformed notes are recorded in [`Document::errors`]
//! and compilation carries on.

mod category;
mod notes;
mod open;

pub(crate) use category::exclusive_category;

use log::{debug, trace};
use versemark_syntax::{LexError, Marker, MarkerCatalog, MarkerLexer, TokenizerOptions};

use crate::document::{Document, ParserError, TextBuffer};
use crate::reference::BibleRef;
use crate::style::{Payload, StyleBlock, sort_style_blocks};

use category::{Category, LIST, LIST_ITEMS, Role, TABLE, classify, is_list_item};
use notes::{NoteFamily, compile_note};
use open::OpenBlocks;

/// Book and chapter used to build verse references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileContext {
    pub book: String,
    pub chapter: u32,
}

impl CompileContext {
    pub fn new(book: impl Into<String>, chapter: u32) -> Self {
        CompileContext {
            book: book.into(),
            chapter,
        }
    }
}

/// Compile a marker sequence into a document.
pub fn compile(markers: &[Marker], ctx: &CompileContext, catalog: &MarkerCatalog) -> Document {
    BodyCompiler::new(ctx, catalog).run(markers)
}

/// Lex and compile source text.
///
/// Recoverable lexer errors are recorded in the document. Only a fatal lexer
/// error is returned as `Err`.
pub fn compile_source(
    source: &str,
    ctx: &CompileContext,
    catalog: &MarkerCatalog,
    options: TokenizerOptions,
) -> Result<Document, LexError> {
    let (markers, lex_errors) = collect_markers(source, catalog, options)?;
    let mut doc = compile(&markers, ctx, catalog);
    if !lex_errors.is_empty() {
        let compile_errors = std::mem::take(&mut doc.errors);
        doc.errors = lex_errors.iter().map(ParserError::from_lex).collect();
        doc.errors.extend(compile_errors);
    }
    Ok(doc)
}

/// Lex `source` completely, separating recoverable errors from markers.
pub fn collect_markers(
    source: &str,
    catalog: &MarkerCatalog,
    options: TokenizerOptions,
) -> Result<(Vec<Marker>, Vec<LexError>), LexError> {
    let mut markers = Vec::new();
    let mut errors = Vec::new();
    for result in MarkerLexer::with_options(source, catalog, options) {
        match result {
            Ok(marker) => markers.push(marker),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                debug!("recoverable lexer error: {err}");
                errors.push(err);
            }
        }
    }
    Ok((markers, errors))
}

/// Open or close a character span. Shared with the note compilers.
///
/// Nested (`\+nd`) and plain spans use separate categories, so a nested span
/// does not end the span around it.
pub(crate) fn apply_character(
    open: &mut OpenBlocks,
    marker: &Marker,
    at: usize,
    errors: &mut Vec<ParserError>,
) {
    let category = if marker.nested {
        Category::NestedCharacter
    } else {
        Category::Character
    };

    if marker.closing {
        let matches = open.get(category).is_some_and(|b| b.kind == marker.kind);
        if !matches {
            errors.push(ParserError::new(
                marker,
                format!("{marker} without a matching opening marker"),
            ));
            return;
        }
        open.close(category, at);
        if category == Category::Character {
            open.close(Category::NestedCharacter, at);
        }
        return;
    }

    if category == Category::Character {
        open.close(Category::NestedCharacter, at);
    }
    let payload = marker
        .attributes
        .clone()
        .map_or(Payload::Plain, Payload::Attributes);
    open.open(category, StyleBlock::open(marker.kind.clone(), at, payload));
}

struct BodyCompiler<'c> {
    catalog: &'c MarkerCatalog,
    ctx: CompileContext,
    text: TextBuffer,
    open: OpenBlocks,
    errors: Vec<ParserError>,
}

impl<'c> BodyCompiler<'c> {
    fn new(ctx: &CompileContext, catalog: &'c MarkerCatalog) -> Self {
        Self {
            catalog,
            ctx: ctx.clone(),
            text: TextBuffer::default(),
            open: OpenBlocks::default(),
            errors: Vec::new(),
        }
    }

    fn run(mut self, markers: &[Marker]) -> Document {
        let mut idx = 0;
        while let Some(marker) = markers.get(idx) {
            let role = classify(&marker.kind, self.catalog);
            trace!("{marker} as {role:?}");
            idx = match role {
                Role::Footnote if !marker.closing => self.note(markers, idx, NoteFamily::Footnote),
                Role::CrossRef if !marker.closing => self.note(markers, idx, NoteFamily::CrossRef),
                _ => {
                    self.apply(marker, role);
                    idx + 1
                }
            };
        }
        self.finish()
    }

    fn note(&mut self, markers: &[Marker], idx: usize, family: NoteFamily) -> usize {
        let outcome = compile_note(
            markers,
            idx,
            family,
            &self.ctx,
            self.catalog,
            &mut self.errors,
        );
        let at = self.text.len();
        self.open.push_finished(StyleBlock::open(
            markers[idx].kind.clone(),
            at,
            Payload::Note(outcome.note),
        ));
        let trailing = match outcome.trailing.strip_prefix(' ') {
            Some(rest) if self.text.ends_with_whitespace() => rest,
            _ => outcome.trailing.as_str(),
        };
        self.text.push_str(trailing);
        outcome.next
    }

    fn error(&mut self, marker: &Marker, message: impl Into<String>) {
        self.errors.push(ParserError::new(marker, message));
    }

    fn apply(&mut self, marker: &Marker, role: Role) {
        let at = self.text.len();
        match role {
            Role::Metadata => {
                debug!("skipping {marker} in body");
                return;
            }
            Role::Unknown => {
                self.error(marker, format!("unknown marker {marker}"));
                return;
            }
            Role::NoteContent => {
                self.error(
                    marker,
                    format!("{marker} is only valid inside a footnote or cross reference"),
                );
                return;
            }
            Role::Character => {
                apply_character(&mut self.open, marker, at, &mut self.errors);
            }
            Role::ListCell => self.list_cell(marker, at),
            _ if marker.closing => {
                self.error(marker, format!("{marker} has no opening marker to close"));
            }
            Role::Chapter => self.chapter(marker, at),
            Role::Verse => self.verse(marker, at),
            Role::Structure(category) => self.structure(category, marker, at),
            Role::TableCell => {
                let payload = marker.level.map_or(Payload::Plain, Payload::Column);
                self.open.open(
                    Category::TableCell,
                    StyleBlock::open(marker.kind.clone(), at, payload),
                );
            }
            Role::Footnote | Role::CrossRef => {}
        }
        if let Some(text) = &marker.text {
            self.text.push_str(text);
        }
    }

    fn chapter(&mut self, marker: &Marker, at: usize) {
        match marker.data.as_deref().and_then(|d| d.parse().ok()) {
            Some(number) => {
                self.ctx.chapter = number;
                self.open.close(Category::Verse, at);
                self.open
                    .push_finished(StyleBlock::open("c", at, Payload::Chapter(number)));
            }
            None => self.error(marker, "chapter marker without a chapter number"),
        }
    }

    fn verse(&mut self, marker: &Marker, at: usize) {
        self.open.close(Category::Verse, at);
        let reference = marker
            .data
            .as_deref()
            .and_then(|d| BibleRef::parse_verse(&self.ctx.book, self.ctx.chapter, d));
        match reference {
            Some(r) => self
                .open
                .open(Category::Verse, StyleBlock::open("v", at, Payload::Verse(r))),
            None => self.error(marker, "verse marker without a verse number"),
        }
    }

    fn structure(&mut self, category: Category, marker: &Marker, at: usize) {
        debug_assert!(category.is_structural());
        self.open.close_many(&Category::STRUCTURAL, at);
        self.open
            .close_many(&[Category::ListCell, Category::TableCell], at);
        if category != Category::ListEntry {
            self.open
                .close_many(&[Category::ListItems, Category::List], at);
        }
        if category != Category::TableRow {
            self.open.close(Category::Table, at);
        }

        match category {
            Category::ListEntry => {
                self.open
                    .ensure(Category::List, StyleBlock::open(LIST, at, Payload::Virtual));
                if is_list_item(&marker.kind) {
                    self.open.ensure(
                        Category::ListItems,
                        StyleBlock::open(LIST_ITEMS, at, Payload::Virtual),
                    );
                } else {
                    self.open.close(Category::ListItems, at);
                }
            }
            Category::TableRow => {
                self.open
                    .ensure(Category::Table, StyleBlock::open(TABLE, at, Payload::Virtual));
            }
            _ => {}
        }

        let payload = marker.level.map_or(Payload::Plain, Payload::Indent);
        self.open
            .open(category, StyleBlock::open(marker.kind.clone(), at, payload));
    }

    fn list_cell(&mut self, marker: &Marker, at: usize) {
        if marker.closing {
            let matches = self
                .open
                .get(Category::ListCell)
                .is_some_and(|b| b.kind == marker.kind);
            if matches {
                self.open.close(Category::ListCell, at);
            } else {
                self.error(marker, format!("{marker} without a matching opening marker"));
            }
            return;
        }
        self.open.open(
            Category::ListCell,
            StyleBlock::open(marker.kind.clone(), at, Payload::Plain),
        );
    }

    fn finish(self) -> Document {
        let len = self.text.len();
        let mut styling = self.open.finish(len);
        sort_style_blocks(&mut styling);
        Document {
            text: self.text.into_string(),
            styling,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::VerseRef;
    use crate::style::Note;
    use pretty_assertions::assert_eq;

    fn gen1() -> CompileContext {
        CompileContext::new("GEN", 1)
    }

    fn compile_str(source: &str) -> Document {
        let catalog = MarkerCatalog::builtin();
        compile_source(source, &gen1(), &catalog, TokenizerOptions::default())
            .expect("no fatal lexer errors")
    }

    fn spans(blocks: &[StyleBlock]) -> Vec<(&str, usize, usize)> {
        blocks
            .iter()
            .map(|b| (b.kind.as_str(), b.min, b.max))
            .collect()
    }

    #[test]
    fn empty_source() {
        assert_eq!(compile_str(""), Document::default());
    }

    #[test]
    fn paragraph_change_closes_previous_paragraph() {
        let doc = compile_str("\\p\\v 1 Hello World.\\pc Centered Text.");
        assert_eq!(doc.text, "Hello World.Centered Text.");
        assert_eq!(
            spans(&doc.styling),
            vec![("v", 0, 26), ("p", 0, 12), ("pc", 12, 26)]
        );
        assert_eq!(
            doc.styling[0].payload,
            Payload::Verse(BibleRef::Verse(VerseRef::new("GEN", 1, 1)))
        );
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn verses_close_each_other() {
        let doc = compile_str(
            "\\p
             \\v 1 Verse one text content is here.
             \\v 2 Followed closely by verse 2.
             \\p
             \\v 3 We can even start new paragraphs.",
        );
        assert_eq!(
            doc.text,
            "Verse one text content is here.Followed closely by verse 2.We can even start new paragraphs."
        );
        assert_eq!(
            spans(&doc.styling),
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
    fn footnote_only() {
        let doc = compile_str("\\f + \\ft Hello world\\f*");
        assert_eq!(doc.text, "");
        assert_eq!(
            doc.styling,
            vec![StyleBlock::open(
                "f",
                0,
                Payload::Note(Note {
                    caller: "+".into(),
                    text: "Hello world".into(),
                    styling: vec![StyleBlock::new("ft", 0, 11)],
                })
            )]
        );
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn unknown_marker_in_footnote_is_skipped() {
        let doc = compile_str("\\f + \\fk Key: \\zbad odd \\ft Rest\\f*");
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.errors[0].marker, Some(Marker::new("zbad").with_text("odd ")));
        let note = doc.styling[0].note().expect("note block");
        assert_eq!(note.text, "Key:Rest");
        assert_eq!(spans(&note.styling), vec![("fk", 0, 4), ("ft", 4, 8)]);
    }

    #[test]
    fn text_after_note_continues_parent() {
        let doc = compile_str("\\p \\v 1 God\\f + \\fr 1:1 \\ft Elohim\\f* created.");
        assert_eq!(doc.text, "God created.");
        let note_block = doc.blocks("f").next().expect("note");
        assert_eq!((note_block.min, note_block.max), (3, 3));
        let note = note_block.note().expect("note payload");
        let fr = note.styling.iter().find(|b| b.kind == "fr").expect("fr block");
        assert_eq!(
            fr.payload,
            Payload::Reference(BibleRef::Verse(VerseRef::new("GEN", 1, 1)))
        );
    }

    #[test]
    fn space_before_note_is_not_doubled() {
        let doc = compile_str("\\p \\v 1 Text \\f + \\ft note\\f* more");
        assert_eq!(doc.text, "Text more");
        let f = doc.blocks("f").next().expect("note");
        assert_eq!((f.min, f.max), (5, 5));

        let doc = compile_str("\\p \\v 1 In the \\x - \\xo 1:1 \\xt Jn 1:1\\x* beginning");
        assert_eq!(doc.text, "In the beginning");
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn space_between_character_spans_is_kept() {
        let doc = compile_str("\\p \\w a\\w* \\w b\\w*");
        assert_eq!(doc.text, "a b");
        assert_eq!(
            spans(&doc.styling),
            vec![("p", 0, 3), ("w", 0, 1), ("w", 2, 3)]
        );

        let doc = compile_str("\\p \\nd LORD\\nd* \\add God\\add* said");
        assert_eq!(doc.text, "LORD God said");
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn character_spans_carry_attributes() {
        let doc = compile_str("\\p In \\w the|lemma=\"ha\"\\w* beginning");
        assert_eq!(doc.text, "In the beginning");
        let w = doc.blocks("w").next().expect("w block");
        assert_eq!((w.min, w.max), (3, 6));
        let Payload::Attributes(attrs) = &w.payload else {
            panic!("expected attributes, got {:?}", w.payload);
        };
        assert_eq!(attrs.get("lemma"), Some("ha"));
    }

    #[test]
    fn nested_character_spans() {
        let doc = compile_str("\\p \\add the \\+nd Lord\\+nd* said\\add*");
        assert_eq!(doc.text, "the Lord said");
        assert_eq!(
            spans(&doc.styling),
            vec![("add", 0, 13), ("p", 0, 13), ("nd", 4, 8)]
        );
    }

    #[test]
    fn unmatched_closing_marker_reports_once_and_keeps_text() {
        let doc = compile_str("\\p Hello\\nd* world");
        assert_eq!(doc.text, "Hello world");
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(spans(&doc.styling), vec![("p", 0, 11)]);
    }

    #[test]
    fn unknown_marker_is_reported_and_skipped() {
        let doc = compile_str("\\p One \\zz junk \\p Two");
        assert_eq!(doc.text, "OneTwo");
        assert_eq!(doc.errors.len(), 1);
        assert!(doc.errors[0].message.contains("unknown marker"));
    }

    #[test]
    fn chapter_marker_updates_references() {
        let doc = compile_str("\\c 3 \\p \\v 16 For God");
        let c = doc.blocks("c").next().expect("chapter block");
        assert_eq!(c.payload, Payload::Chapter(3));
        let v = doc.blocks("v").next().expect("verse block");
        assert_eq!(
            v.payload,
            Payload::Verse(BibleRef::Verse(VerseRef::new("GEN", 3, 16)))
        );
    }

    #[test]
    fn poetry_levels_are_indents() {
        let doc = compile_str("\\q1 One \\q2 Two");
        assert_eq!(
            doc.styling
                .iter()
                .map(|b| b.payload.clone())
                .collect::<Vec<_>>(),
            vec![
                Payload::Indent(versemark_syntax::NumberOrRange::Single(1)),
                Payload::Indent(versemark_syntax::NumberOrRange::Single(2)),
            ]
        );
    }

    #[test]
    fn table_cell_spanning_columns() {
        let doc = compile_str("\\tr \\tc1-3 wide");
        let tc = doc.blocks("tc").next().expect("tc block");
        assert_eq!((tc.min, tc.max), (0, 4));
        assert_eq!(
            tc.payload,
            Payload::Column(versemark_syntax::NumberOrRange::Range { start: 1, end: 3 })
        );
    }

    #[test]
    fn headings_and_paragraphs_exclude_each_other() {
        let doc = compile_str("\\s Title \\p Body");
        assert_eq!(doc.text, "TitleBody");
        assert_eq!(spans(&doc.styling), vec![("s", 0, 5), ("p", 5, 9)]);
    }

    #[test]
    fn metadata_is_skipped_without_errors() {
        let doc = compile_str("\\rem note to self \\p Text");
        assert_eq!(doc.text, "Text");
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn note_content_outside_note_is_an_error() {
        let doc = compile_str("\\p Text \\ft stray");
        assert_eq!(doc.text, "Text ");
        assert_eq!(doc.errors.len(), 1);
    }
}
