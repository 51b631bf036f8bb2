//! Inline data that some markers require before their text, such as the
//! chapter number after `\c` or the caller after `\f`.

use std::sync::LazyLock;

use regex::Regex;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+").unwrap());

static VERSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+(-[0-9]+)?").unwrap());

/// `12:3`, `12.3`, `12v3`, `12:3-4`, optionally with a trailing `:`.
static CHAPTER_VERSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[:.v][0-9]+(-[0-9]+)?:?").unwrap());

static BOOK_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z1-9]{3}").unwrap());

static ENCODING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+").unwrap());

/// `+` (generated), `-` (no caller) or a literal caller character.
static CALLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+\-a-zA-Z0-9]").unwrap());

/// Pattern for the data following an opening marker of this kind, if any.
pub(crate) fn data_pattern(kind: &str) -> Option<&'static Regex> {
    let pattern = match kind {
        "c" | "sts" => &INTEGER,
        "v" | "fv" => &VERSE,
        "fr" | "xo" => &CHAPTER_VERSE,
        "id" => &BOOK_ID,
        "ide" => &ENCODING,
        "f" | "fe" | "ef" | "x" | "ex" => &CALLER,
        _ => return None,
    };
    Some(LazyLock::force(pattern))
}

/// Split `word` into the data prefix and the remainder.
pub(crate) fn split_data<'w>(pattern: &Regex, word: &'w str) -> Option<(&'w str, &'w str)> {
    let m = pattern.find(word)?;
    Some(word.split_at(m.end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("c", "12", Some(("12", "")))]
    #[case("c", "x", None)]
    #[case("v", "10-11", Some(("10-11", "")))]
    #[case("v", "3a", Some(("3", "a")))]
    #[case("fr", "9:44", Some(("9:44", "")))]
    #[case("fr", "1.2-3:", Some(("1.2-3:", "")))]
    #[case("xo", "2v7", Some(("2v7", "")))]
    #[case("id", "GEN", Some(("GEN", "")))]
    #[case("id", "1KI", Some(("1KI", "")))]
    #[case("ide", "UTF-8", Some(("UTF-8", "")))]
    #[case("f", "+", Some(("+", "")))]
    #[case("x", "a)", Some(("a", ")")))]
    fn splits_data(
        #[case] kind: &str,
        #[case] word: &str,
        #[case] expected: Option<(&str, &str)>,
    ) {
        let pattern = data_pattern(kind).unwrap();
        assert_eq!(split_data(pattern, word), expected);
    }

    #[test]
    fn text_markers_take_no_data() {
        assert!(data_pattern("p").is_none());
        assert!(data_pattern("ft").is_none());
    }
}
