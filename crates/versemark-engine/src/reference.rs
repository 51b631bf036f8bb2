use std::fmt;

use serde::Serialize;
use versemark_syntax::NumberOrRange;

/// A single verse: `GEN 1:1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        VerseRef {
            book: book.into(),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// A verse or an inclusive range of verses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum BibleRef {
    Verse(VerseRef),
    Range { start: VerseRef, end: VerseRef },
}

impl BibleRef {
    /// Reference for verse data such as `3` or `10-11` within one chapter.
    pub fn from_verses(book: &str, chapter: u32, verses: NumberOrRange) -> Self {
        match verses {
            NumberOrRange::Single(v) => BibleRef::Verse(VerseRef::new(book, chapter, v)),
            NumberOrRange::Range { start, end } => BibleRef::Range {
                start: VerseRef::new(book, chapter, start),
                end: VerseRef::new(book, chapter, end),
            },
        }
    }

    /// Parse verse data (`3`, `10-11`) in the given chapter.
    pub fn parse_verse(book: &str, chapter: u32, data: &str) -> Option<Self> {
        NumberOrRange::parse(data).map(|v| Self::from_verses(book, chapter, v))
    }

    /// Parse a note origin such as `9:44`, `12.3-4` or `3v5:`.
    ///
    /// The chapter comes from the data itself; the book from context.
    pub fn parse_chapter_verse(book: &str, data: &str) -> Option<Self> {
        let data = data.strip_suffix(':').unwrap_or(data);
        let split = data.find([':', '.', 'v'])?;
        let chapter = data[..split].parse().ok()?;
        let verses = NumberOrRange::parse(&data[split + 1..])?;
        Some(Self::from_verses(book, chapter, verses))
    }

    pub fn start(&self) -> &VerseRef {
        match self {
            BibleRef::Verse(v) => v,
            BibleRef::Range { start, .. } => start,
        }
    }
}

impl fmt::Display for BibleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BibleRef::Verse(v) => write!(f, "{v}"),
            BibleRef::Range { start, end } => write!(f, "{start}-{}", end.verse),
        }
    }
}
