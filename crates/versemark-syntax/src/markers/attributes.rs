//! Attribute lists written after `|`, as in `\w grace|lemma="grace" strong="G5485"\w*`.

use crate::marker::Attributes;

/// Key used for an attribute written without one, e.g. `\w gracious|grace\w*`.
pub fn default_attribute(kind: &str) -> Option<&'static str> {
    match kind {
        "w" => Some("lemma"),
        "rb" => Some("gloss"),
        "xt" => Some("link-href"),
        "ref" => Some("loc"),
        _ => None,
    }
}

/// Parse the attribute section of a marker of `kind`.
///
/// Values are kept verbatim; a later duplicate key replaces an earlier one.
pub(crate) fn parse_attributes(kind: &str, source: &str) -> Result<Attributes, String> {
    let mut attrs = Attributes::new();
    let mut rest = source.trim();

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let (value, after) = read_quoted(quoted)?;
            attrs.insert(default_key(kind)?, value);
            rest = after.trim_start();
            continue;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..end];
        match word.split_once('=') {
            None => {
                attrs.insert(default_key(kind)?, word);
                rest = rest[end..].trim_start();
            }
            Some((key, _)) => {
                if key.is_empty() || !key.chars().all(is_key_char) {
                    return Err(format!("invalid attribute key '{key}'"));
                }
                let after_eq = &rest[key.len() + 1..];
                let quoted = after_eq
                    .strip_prefix('"')
                    .ok_or_else(|| format!("expected '\"' to open the value of '{key}'"))?;
                let (value, after) = read_quoted(quoted)?;
                attrs.insert(key, value);
                rest = after.trim_start();
            }
        }
    }

    Ok(attrs)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn default_key(kind: &str) -> Result<&'static str, String> {
    default_attribute(kind)
        .ok_or_else(|| format!("keyless attribute on '{kind}', which has no default attribute"))
}

/// Split after the closing quote. `s` starts just past the opening quote.
fn read_quoted(s: &str) -> Result<(&str, &str), String> {
    let close = s
        .find('"')
        .ok_or_else(|| "unterminated attribute value".to_string())?;
    Ok((&s[..close], &s[close + 1..]))
}
