//! Marker classification for the body compiler.
//!
//! Every marker kind maps to a [`Role`] saying what the compiler does with it,
//! and block-opening roles name the [`Category`] whose single open slot they
//! occupy.

use versemark_syntax::{MarkerCatalog, StyleType};

/// Group of mutually exclusive blocks. At most one block per category is open
/// at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Category {
    Paragraph,
    Poetry,
    Heading,
    ListEntry,
    ListCell,
    TableRow,
    TableCell,
    Character,
    NestedCharacter,
    Verse,
    List,
    ListItems,
    Table,
    FootnoteContent,
    CrossRefContent,
    /// Paired note markers (`fv`, `fdc`, `fm`, `xop`, `xot`, `xnt`, `xdc`, `rq`),
    /// one category per kind.
    Paired(&'static str),
}

impl Category {
    /// Categories that close one another when any of them opens.
    pub const STRUCTURAL: [Category; 5] = [
        Category::Paragraph,
        Category::Poetry,
        Category::Heading,
        Category::ListEntry,
        Category::TableRow,
    ];

    pub fn is_structural(self) -> bool {
        Self::STRUCTURAL.contains(&self)
    }
}

/// What the body compiler does with a marker kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Chapter,
    Verse,
    /// Paragraph, poetry, heading, list entry or table row.
    Structure(Category),
    TableCell,
    /// `lik`, `liv`, `litl`: paired spans inside a list entry.
    ListCell,
    Character,
    Footnote,
    CrossRef,
    /// Markers only meaningful inside a footnote or cross reference.
    NoteContent,
    /// Header and bookkeeping markers with no body content.
    Metadata,
    Unknown,
}

impl Role {
    /// Whether this marker ends a note that has not been closed.
    pub fn ends_note(self) -> bool {
        matches!(
            self,
            Role::Chapter | Role::Verse | Role::Structure(_) | Role::TableCell
        )
    }
}

pub(crate) fn classify(kind: &str, catalog: &MarkerCatalog) -> Role {
    match kind {
        "c" => Role::Chapter,
        "v" => Role::Verse,

        "p" | "m" | "po" | "pr" | "cls" | "pmo" | "pm" | "pmc" | "pmr" | "pi" | "mi" | "nb"
        | "pc" | "ph" | "b" | "cd" | "lit" | "ip" | "ipi" | "im" | "imi" | "ipq" | "imq"
        | "ipr" | "ib" | "io" | "iex" | "ie" => Role::Structure(Category::Paragraph),

        "q" | "qr" | "qc" | "qm" | "qd" | "qa" | "iq" => Role::Structure(Category::Poetry),

        "mt" | "mte" | "ms" | "mr" | "s" | "sr" | "r" | "d" | "sp" | "sd" | "cl" | "imt"
        | "imte" | "is" | "iot" => Role::Structure(Category::Heading),

        "lh" | "li" | "lf" | "lim" | "ili" => Role::Structure(Category::ListEntry),
        "lik" | "liv" | "litl" => Role::ListCell,

        "tr" => Role::Structure(Category::TableRow),
        "th" | "thr" | "thc" | "tc" | "tcr" | "tcc" => Role::TableCell,

        "f" | "fe" | "ef" => Role::Footnote,
        "x" | "ex" => Role::CrossRef,
        "fr" | "fq" | "fqa" | "fk" | "fl" | "fw" | "fp" | "fv" | "ft" | "fdc" | "fm" | "xo"
        | "xk" | "xq" | "xta" | "xop" | "xot" | "xnt" | "xdc" => Role::NoteContent,

        "id" | "ide" | "sts" | "rem" | "h" | "toc" | "toca" | "usfm" | "restore" | "ca" | "cp" => {
            Role::Metadata
        }

        _ => match catalog.get(kind) {
            Some(meta) if !meta.publishable => Role::Metadata,
            Some(meta) => match meta.style_type {
                StyleType::Paragraph => Role::Structure(Category::Paragraph),
                StyleType::Character => Role::Character,
                StyleType::Note => Role::Unknown,
            },
            None => Role::Unknown,
        },
    }
}

/// Items of a list, as opposed to its header (`lh`) and footer (`lf`).
pub(crate) fn is_list_item(kind: &str) -> bool {
    matches!(kind, "li" | "lim" | "ili")
}

/// Kinds of the virtual wrapper blocks.
pub(crate) const LIST: &str = "list";
pub(crate) const LIST_ITEMS: &str = "list_items";
pub(crate) const TABLE: &str = "table";

/// The exclusive category of a finished block's kind, for replaying open and
/// close events over a compiled document.
pub(crate) fn exclusive_category(kind: &str) -> Option<&'static str> {
    let category = match kind {
        "v" => "verse",
        LIST => "list",
        LIST_ITEMS => "list_items",
        TABLE => "table",
        "th" | "thr" | "thc" | "tc" | "tcr" | "tcc" => "table_cell",
        _ => match classify(kind, &MarkerCatalog::new()) {
            Role::Structure(_) => "structure",
            _ => return None,
        },
    };
    Some(category)
}
