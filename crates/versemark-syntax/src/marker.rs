//! Marker records produced by the marker lexer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A level, column or verse number that may also be an inclusive range.
///
/// `\mt2` has level `Single(2)`, `\tc1-3` spans columns `Range { start: 1, end: 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NumberOrRange {
    Single(u32),
    Range { start: u32, end: u32 },
}

impl NumberOrRange {
    /// Parses `"12"` or `"12-14"`. Anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once('-') {
            None => parse_digits(s).map(NumberOrRange::Single),
            Some((start, end)) => Some(NumberOrRange::Range {
                start: parse_digits(start)?,
                end: parse_digits(end)?,
            }),
        }
    }

    pub fn start(self) -> u32 {
        match self {
            NumberOrRange::Single(n) => n,
            NumberOrRange::Range { start, .. } => start,
        }
    }

    pub fn end(self) -> u32 {
        match self {
            NumberOrRange::Single(n) => n,
            NumberOrRange::Range { end, .. } => end,
        }
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for NumberOrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrRange::Single(n) => write!(f, "{n}"),
            NumberOrRange::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Word-level attributes such as `lemma="grace" strong="H1234,G5485"`.
///
/// Values are stored exactly as written. Comma separated lists stay as one
/// string; use [`Attributes::values`] to split them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing any earlier value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The comma separated components of an attribute value.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|v| v.split(',').map(str::trim).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}=\"{v}\"")?;
        }
        Ok(())
    }
}

/// One marker occurrence with its modifiers and trailing content.
///
/// `kind` excludes the backslash, the `+` nesting prefix, level digits and the
/// closing `*`: `\+nd*` is kind `nd`, nested, closing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<NumberOrRange>,
    #[serde(skip_serializing_if = "is_false")]
    pub nested: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub closing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Marker {
    pub fn new(kind: impl Into<String>) -> Self {
        Marker {
            kind: kind.into(),
            ..Marker::default()
        }
    }

    pub fn with_level(mut self, level: NumberOrRange) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    pub fn closing(mut self) -> Self {
        self.closing = true;
        self
    }

    /// Trailing text, or the empty string.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Marker {
    /// Renders the marker as it would appear in source, without its content.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\\")?;
        if self.nested {
            f.write_str("+")?;
        }
        f.write_str(&self.kind)?;
        if let Some(level) = self.level {
            write!(f, "{level}")?;
        }
        if self.closing {
            f.write_str("*")?;
        }
        Ok(())
    }
}
