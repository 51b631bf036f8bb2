//! Reader for USFM style sheets (`usfm.sty`).
//!
//! A style sheet is a list of blank-line separated entries:
//!
//! ```text
//! \Marker nd
//! \Endmarker nd*
//! \Name nd - Special Text - Name of Deity
//! \OccursUnder NEST c cl cp d f ... pc pi pr q qc qr s sp sr tc th ...
//! \TextProperties publishable vernacular
//! \StyleType Character
//! ```
//!
//! Only `\Marker`, `\StyleType`, `\OccursUnder` and `\TextProperties` are
//! read. Other properties and `#` comments are skipped.

use log::{debug, warn};
use thiserror::Error;
use versemark_syntax::{MarkerCatalog, MarkerMeta, StyleType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyError {
    #[error("line {line}: expected a single marker name after \\Marker, found '{found}'")]
    MarkerName { line: usize, found: String },

    #[error("line {line}: unknown style type '{found}'")]
    StyleType { line: usize, found: String },

    #[error("line {line}: expected a property line starting with '\\', found '{found}'")]
    UnexpectedLine { line: usize, found: String },

    #[error("line {line}: expected an entry starting with \\Marker, found '{found}'")]
    MissingMarker { line: usize, found: String },
}

struct Entry {
    kind: String,
    meta: MarkerMeta,
}

/// Parse style sheet text into a catalog.
///
/// Levels share one entry (`\Marker mt1` and `\Marker mt2` are both `mt`).
/// When levels disagree the first entry wins and a warning is logged.
/// Entries without `publishable` in `\TextProperties` are not publishable.
pub fn parse_sty(text: &str) -> Result<MarkerCatalog, StyError> {
    let mut catalog = MarkerCatalog::new();
    let mut current: Option<Entry> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let l = raw.trim();

        if l.starts_with('#') {
            continue;
        }
        if l.is_empty() {
            if let Some(entry) = current.take() {
                add_entry(&mut catalog, entry);
            }
            continue;
        }

        if current.is_none() {
            let Some(name) = l.strip_prefix("\\Marker") else {
                return Err(StyError::MissingMarker {
                    line,
                    found: l.to_string(),
                });
            };
            current = Some(Entry {
                kind: marker_kind(line, name)?,
                meta: MarkerMeta {
                    publishable: false,
                    ..MarkerMeta::new(StyleType::Paragraph)
                },
            });
            continue;
        }
        let Some(entry) = current.as_mut() else {
            continue;
        };

        if !l.starts_with('\\') {
            return Err(StyError::UnexpectedLine {
                line,
                found: l.to_string(),
            });
        }
        let (property, value) = l.split_once(char::is_whitespace).unwrap_or((l, ""));
        let value = value.trim();
        match property {
            "\\StyleType" => {
                entry.meta.style_type = match value.to_ascii_lowercase().as_str() {
                    "paragraph" => StyleType::Paragraph,
                    "character" => StyleType::Character,
                    "note" => StyleType::Note,
                    _ => {
                        return Err(StyError::StyleType {
                            line,
                            found: value.to_string(),
                        });
                    }
                }
            }
            "\\OccursUnder" => {
                let mut under: Vec<String> = Vec::new();
                for name in value.split_whitespace() {
                    let kind = marker_kind(line, name)?;
                    if !under.contains(&kind) {
                        under.push(kind);
                    }
                }
                entry.meta.occurs_under = under;
            }
            "\\TextProperties" => {
                entry.meta.publishable = value.split_whitespace().any(|p| p == "publishable");
            }
            _ => {}
        }
    }

    if let Some(entry) = current.take() {
        add_entry(&mut catalog, entry);
    }
    debug!("read {} marker kinds from style sheet", catalog.len());
    Ok(catalog)
}

fn add_entry(catalog: &mut MarkerCatalog, entry: Entry) {
    if let Some(existing) = catalog.get(&entry.kind) {
        if *existing != entry.meta {
            warn!(
                "conflicting style sheet entries for '{}', keeping the first",
                entry.kind
            );
        }
        return;
    }
    catalog.insert(&entry.kind, entry.meta);
}

/// Marker name without its level: `mt2` is `mt`, `qt1-s` is `qt`. The
/// `NEST` pseudo marker is kept as is.
fn marker_kind(line: usize, name: &str) -> Result<String, StyError> {
    let name = name.trim();
    if name == "NEST" {
        return Ok(name.to_string());
    }
    let letters = name
        .find(|c: char| !c.is_ascii_lowercase())
        .map_or(name, |end| &name[..end]);
    if letters.is_empty() || name.contains(char::is_whitespace) {
        return Err(StyError::MarkerName {
            line,
            found: name.to_string(),
        });
    }
    Ok(letters.to_string())
}
