//! # versemark-engine
//!
//! Compiles USFM scripture markup into flat text plus style blocks.
//!
//! The syntax crate turns source into [`Marker`](versemark_syntax::Marker)
//! records. This crate folds them into a [`Document`]: one text buffer and a
//! sorted list of [`StyleBlock`]s, each spanning a range of gap indices and
//! carrying kind-specific data such as verse references or footnotes.
//!
//! ## Quick Start
//!
//! ```
//! use versemark_engine::{CompileContext, compile_source, snapshot};
//! use versemark_syntax::{MarkerCatalog, TokenizerOptions};
//!
//! let catalog = MarkerCatalog::builtin();
//! let ctx = CompileContext::new("GEN", 1);
//! let doc = compile_source(
//!     "\\p \\v 1 In the beginning",
//!     &ctx,
//!     &catalog,
//!     TokenizerOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(doc.text, "In the beginning");
//! snapshot::check_invariants(&doc);
//! ```
//!
//! For whole books, [`parse_book`] splits header fields and chapters and
//! compiles each chapter separately.
//!
//! ## Modules
//!
//! - **`compiler`**: the body compiler and its footnote and cross reference
//!   sub-compilers
//! - **`book`**: book headers, introduction and chapters
//! - **`style`**: style blocks, payloads and their ordering
//! - **`reference`**: verse references
//! - **`snapshot`**: rendering and invariant checks for tests

pub mod book;
pub mod compiler;
pub mod document;
pub mod reference;
pub mod snapshot;
pub mod style;

pub use book::{Book, Chapter, ParseOptions, TocEntries, parse_book};
pub use compiler::{CompileContext, collect_markers, compile, compile_source};
pub use document::{Document, ParserError};
pub use reference::{BibleRef, VerseRef};
pub use style::{Note, Payload, StyleBlock, compare_style_blocks, sort_style_blocks};
