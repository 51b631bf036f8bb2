//! Whole-book parsing: header fields, an optional introduction and one
//! compiled [`Document`] per chapter.
//!
//! ```text
//! \id GEN Test Bible        → book_id "GEN", id_text "Test Bible"
//! \mt1 Genesis              → major_title {1: "Genesis"}
//! \c 1                      → chapters[0].number = 1
//! \cp A                     → chapters[0].drop_cap = "A"
//! \p \v 1 In the beginning  → chapters[0].body
//! ```

use std::collections::BTreeMap;

use log::info;
use serde::Serialize;
use versemark_syntax::{LexError, Marker, MarkerCatalog, NumberOrRange, TokenizerOptions};

use crate::compiler::{CompileContext, collect_markers, compile};
use crate::document::{Document, ParserError};

/// Inputs that change how a book is read.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub catalog: MarkerCatalog,
    pub tokenizer: TokenizerOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            catalog: MarkerCatalog::builtin(),
            tokenizer: TokenizerOptions::default(),
        }
    }
}

/// Table of contents entries from `\toc1..3` or `\toca1..3`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TocEntries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

impl TocEntries {
    fn set(&mut self, level: u32, text: String) -> bool {
        let slot = match level {
            1 => &mut self.long_text,
            2 => &mut self.short_text,
            3 => &mut self.abbreviation,
            _ => return false,
        };
        *slot = Some(text);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub body: Document,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Book {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_header: Option<String>,
    pub toc: TocEntries,
    pub toca: TocEntries,
    /// Major titles by level.
    pub major_title: BTreeMap<u32, String>,
    /// Label used for every chapter, from a `\cl` before the first chapter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remarks: Vec<String>,
    /// Content before the first chapter that is not a header field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Document>,
    pub chapters: Vec<Chapter>,
    /// Lexer errors and problems with chapter markers. Each body keeps its own.
    pub errors: Vec<ParserError>,
}

impl Book {
    /// True when nothing anywhere in the book reported an error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
            && self.introduction.as_ref().is_none_or(|d| !d.has_errors())
            && self.chapters.iter().all(|c| !c.body.has_errors())
    }

    /// Total number of errors, book level and per document.
    pub fn error_count(&self) -> usize {
        self.errors.len()
            + self.introduction.as_ref().map_or(0, |d| d.errors.len())
            + self.chapters.iter().map(|c| c.body.errors.len()).sum::<usize>()
    }

    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// Record a header marker. False when the marker is not a header field.
    fn header(&mut self, marker: &Marker) -> bool {
        if marker.closing {
            return false;
        }
        let text = marker.text.as_deref().map(str::trim).map(str::to_string);
        let level = marker.level.map_or(1, NumberOrRange::start);
        match marker.kind.as_str() {
            "id" => {
                self.book_id = marker.data.clone();
                self.id_text = text;
            }
            "ide" => self.encoding = marker.data.clone(),
            "h" => self.running_header = text,
            "toc" => return self.toc.set(level, text.unwrap_or_default()),
            "toca" => return self.toca.set(level, text.unwrap_or_default()),
            "mt" => {
                let title = self.major_title.entry(level).or_default();
                if !title.is_empty() {
                    title.push(' ');
                }
                title.push_str(&text.unwrap_or_default());
            }
            "cl" => self.chapter_label = text,
            "rem" => self.remarks.extend(text),
            "sts" | "usfm" => {}
            _ => return false,
        }
        true
    }
}

impl Chapter {
    /// Record a chapter header marker. False when the marker belongs to the
    /// body.
    fn header(&mut self, marker: &Marker, errors: &mut Vec<ParserError>) -> bool {
        let text = || marker.text.as_deref().map(str::trim).map(str::to_string);
        match (marker.kind.as_str(), marker.closing) {
            ("ca", false) => self.chapter_alt = text(),
            ("ca", true) => {
                if marker.text.as_deref().is_some_and(|t| !t.trim().is_empty()) {
                    errors.push(ParserError::new(
                        marker,
                        "text directly after an alternate chapter number is dropped",
                    ));
                }
            }
            ("cp", false) => self.drop_cap = text(),
            ("cl", false) => self.label = text(),
            ("cd", false) => self.description = text(),
            _ => return false,
        }
        true
    }
}

/// Parse a complete USFM book.
///
/// Only a fatal lexer error fails the parse. Everything else is collected in
/// [`Book::errors`] and the documents' own error lists.
pub fn parse_book(source: &str, options: &ParseOptions) -> Result<Book, LexError> {
    let catalog = &options.catalog;
    let (markers, lex_errors) = collect_markers(source, catalog, options.tokenizer)?;

    let mut book = Book {
        errors: lex_errors.iter().map(ParserError::from_lex).collect(),
        ..Book::default()
    };

    let first_chapter = markers
        .iter()
        .position(|m| m.kind == "c" && !m.closing)
        .unwrap_or(markers.len());
    let (head, rest) = markers.split_at(first_chapter);

    let intro: Vec<Marker> = head
        .iter()
        .filter(|m| !book.header(m))
        .cloned()
        .collect();
    let book_id = book.book_id.clone().unwrap_or_default();
    if !intro.is_empty() {
        let ctx = CompileContext::new(book_id.as_str(), 0);
        book.introduction = Some(compile(&intro, &ctx, catalog));
    }

    for group in rest.chunk_by(|_, next| next.kind != "c" || next.closing) {
        let Some((opener, body)) = group.split_first() else {
            continue;
        };
        let number = match opener.data.as_deref().map(str::parse::<u32>) {
            Some(Ok(number)) => number,
            _ => {
                book.errors.push(ParserError::new(
                    opener,
                    "chapter marker without a valid chapter number",
                ));
                0
            }
        };
        if opener.text.is_some() {
            book.errors.push(ParserError::new(
                opener,
                "text directly after a chapter number is dropped",
            ));
        }

        let mut chapter = Chapter {
            number,
            ..Chapter::default()
        };
        let body: Vec<Marker> = body
            .iter()
            .filter(|m| !chapter.header(m, &mut book.errors))
            .cloned()
            .collect();
        let ctx = CompileContext::new(book_id.as_str(), number);
        chapter.body = compile(&body, &ctx, catalog);
        book.chapters.push(chapter);
    }

    info!(
        "parsed {} with {} chapters and {} errors",
        if book_id.is_empty() { "book" } else { book_id.as_str() },
        book.chapters.len(),
        book.error_count()
    );
    Ok(book)
}
