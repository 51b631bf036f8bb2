//! # Marker Catalog
//!
//! Per-kind metadata normally generated from a `usfm.sty` style sheet: which
//! markers a kind may appear under, its style type, and whether its content
//! is meant for publication.
//!
//! The catalog is a plain value. Callers build one (from the built-in table or
//! a style sheet, see `versemark-config`) and hand it to the marker lexer and
//! the body compiler; nothing here is cached globally.
//!
//! Kinds are stored without level digits, so `mt1`, `mt2` and `mt` share one
//! entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Style type of a marker as declared by `\StyleType` in a style sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleType {
    /// Ends at the next paragraph marker; never closed with `*`.
    Paragraph,
    /// Paired span inside a paragraph, closed with `\kind*`.
    Character,
    /// Footnote, endnote or cross reference container.
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMeta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occurs_under: Vec<String>,
    pub style_type: StyleType,
    #[serde(default = "default_publishable")]
    pub publishable: bool,
}

fn default_publishable() -> bool {
    true
}

impl MarkerMeta {
    pub fn new(style_type: StyleType) -> Self {
        MarkerMeta {
            occurs_under: Vec::new(),
            style_type,
            publishable: true,
        }
    }
}

/// Strip a level suffix and closing star: `mt2` becomes `mt`, `f*` becomes `f`.
pub fn normalize_kind(kind: &str) -> &str {
    let kind = kind.strip_prefix('\\').unwrap_or(kind);
    let kind = kind.strip_prefix('+').unwrap_or(kind);
    let kind = kind.strip_suffix('*').unwrap_or(kind);
    let trimmed = kind.trim_end_matches(|c: char| c.is_ascii_digit() || c == '-');
    if trimmed.is_empty() { kind } else { trimmed }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerCatalog {
    entries: BTreeMap<String, MarkerMeta>,
}

const PARAGRAPH_KINDS: &[&str] = &[
    // identification and headers
    "id", "ide", "sts", "rem", "h", "toc", "toca", "usfm",
    // chapters
    "c", "cl", "cp", "cd",
    // titles and headings
    "mt", "mte", "ms", "mr", "s", "sr", "r", "d", "sp", "sd",
    // paragraphs
    "p", "m", "po", "pr", "cls", "pmo", "pm", "pmc", "pmr", "pi", "mi", "nb", "pc", "ph", "b",
    // poetry
    "q", "qr", "qc", "qm", "qd", "qa",
    // lists and tables
    "lh", "li", "lf", "lim", "tr",
    // introductions
    "imt", "imte", "is", "ip", "ipi", "im", "imi", "ipq", "imq", "ipr", "iq", "ib", "ili",
    "iot", "io", "iex", "ie",
    "lit",
];

const CHARACTER_KINDS: &[&str] = &[
    "v", "ca", "va", "vp",
    "qs", "qac",
    "add", "bk", "dc", "k", "nd", "ord", "pn", "png", "addpn", "qt", "sig", "sls", "tl", "wj",
    "em", "bd", "it", "bdit", "no", "sc", "sup",
    "w", "wg", "wh", "wa", "rb", "pro", "fig", "ndx", "jmp",
    "rq", "ior", "iqt", "ref",
    "lik", "liv", "litl",
    "th", "thr", "thc", "tc", "tcr", "tcc",
];

const FOOTNOTE_CONTENT_KINDS: &[&str] = &[
    "fr", "fq", "fqa", "fk", "fl", "fw", "fp", "fv", "ft", "fdc", "fm",
];

const CROSSREF_CONTENT_KINDS: &[&str] = &["xo", "xk", "xq", "xt", "xta", "xop", "xot", "xnt", "xdc"];

const NOTE_KINDS: &[&str] = &["f", "fe", "ef", "x", "ex"];

const NON_PUBLISHABLE_KINDS: &[&str] = &["id", "ide", "sts", "rem", "usfm"];

impl MarkerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for the standard USFM 3 marker set.
    pub fn builtin() -> Self {
        let mut catalog = MarkerCatalog::new();
        for kind in PARAGRAPH_KINDS {
            catalog.insert(*kind, MarkerMeta::new(StyleType::Paragraph));
        }
        for kind in CHARACTER_KINDS {
            catalog.insert(*kind, MarkerMeta::new(StyleType::Character));
        }
        for kind in NOTE_KINDS {
            catalog.insert(*kind, MarkerMeta::new(StyleType::Note));
        }
        for kind in FOOTNOTE_CONTENT_KINDS {
            catalog.insert(
                *kind,
                MarkerMeta {
                    occurs_under: vec!["f".into(), "fe".into(), "ef".into()],
                    ..MarkerMeta::new(StyleType::Character)
                },
            );
        }
        for kind in CROSSREF_CONTENT_KINDS {
            catalog.insert(
                *kind,
                MarkerMeta {
                    occurs_under: vec!["x".into(), "ex".into()],
                    ..MarkerMeta::new(StyleType::Character)
                },
            );
        }
        for kind in NON_PUBLISHABLE_KINDS {
            if let Some(meta) = catalog.entries.get_mut(*kind) {
                meta.publishable = false;
            }
        }
        catalog
    }

    /// Add or replace the entry for a kind. Level digits are stripped.
    pub fn insert(&mut self, kind: &str, meta: MarkerMeta) {
        self.entries.insert(normalize_kind(kind).to_string(), meta);
    }

    pub fn get(&self, kind: &str) -> Option<&MarkerMeta> {
        self.entries.get(normalize_kind(kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn style_type(&self, kind: &str) -> Option<StyleType> {
        self.get(kind).map(|m| m.style_type)
    }

    pub fn is_publishable(&self, kind: &str) -> bool {
        self.get(kind).is_none_or(|m| m.publishable)
    }

    /// Whether whitespace directly before this marker belongs to the document
    /// structure rather than to the preceding text.
    ///
    /// True for opening `v` markers and opening paragraph style markers.
    /// Kinds missing from the catalog count as paragraph style.
    pub fn is_significant_before(&self, kind: &str, closing: bool) -> bool {
        if closing {
            return false;
        }
        if normalize_kind(kind) == "v" {
            return true;
        }
        matches!(self.style_type(kind), None | Some(StyleType::Paragraph))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarkerMeta)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mt1", "mt")]
    #[case("mt", "mt")]
    #[case("\\+nd*", "nd")]
    #[case("tc1-3", "tc")]
    #[case("f*", "f")]
    fn normalizes_kinds(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_kind(input), expected);
    }

    #[test]
    fn builtin_classifies_common_markers() {
        let catalog = MarkerCatalog::builtin();
        assert_eq!(catalog.style_type("p"), Some(StyleType::Paragraph));
        assert_eq!(catalog.style_type("q2"), Some(StyleType::Paragraph));
        assert_eq!(catalog.style_type("w"), Some(StyleType::Character));
        assert_eq!(catalog.style_type("x"), Some(StyleType::Note));
        assert_eq!(catalog.style_type("zzz"), None);
        assert!(!catalog.is_publishable("rem"));
        assert!(catalog.is_publishable("p"));
        assert_eq!(
            catalog.get("ft").map(|m| m.occurs_under.clone()),
            Some(vec!["f".to_string(), "fe".to_string(), "ef".to_string()])
        );
    }

    #[rstest]
    #[case("v", false, true)]
    #[case("v", true, false)]
    #[case("p", false, true)]
    #[case("pc", false, true)]
    #[case("w", false, false)]
    #[case("f", false, false)]
    #[case("zunknown", false, true)]
    fn significance(#[case] kind: &str, #[case] closing: bool, #[case] expected: bool) {
        let catalog = MarkerCatalog::builtin();
        assert_eq!(catalog.is_significant_before(kind, closing), expected);
    }

    #[test]
    fn insert_strips_levels() {
        let mut catalog = MarkerCatalog::new();
        catalog.insert("k1", MarkerMeta::new(StyleType::Character));
        let kinds: Vec<_> = catalog.iter().map(|(k, m)| (k, m.style_type)).collect();
        assert_eq!(kinds, vec![("k", StyleType::Character)]);
        assert!(catalog.contains("k2"));
    }
}
