use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::compiler::exclusive_category;
use crate::document::Document;
use crate::style::{StyleBlock, compare_style_blocks};

/// Panic if `doc` breaks an interval invariant. Notes are checked as well.
pub fn check(doc: &Document) {
    check_blocks(&doc.text, &doc.styling);
}

fn check_blocks(text: &str, blocks: &[StyleBlock]) {
    let n = text.chars().count();
    for b in blocks {
        assert!(
            b.min <= b.max && b.max <= n,
            "block out of bounds: {} [{}, {}) (text len: {n})",
            b.kind,
            b.min,
            b.max
        );
        if let Some(note) = b.note() {
            check_blocks(&note.text, &note.styling);
        }
    }

    for pair in blocks.windows(2) {
        assert!(
            compare_style_blocks(&pair[0], &pair[1]) != Ordering::Greater,
            "blocks out of order: {} [{}, {}) before {} [{}, {})",
            pair[0].kind,
            pair[0].min,
            pair[0].max,
            pair[1].kind,
            pair[1].min,
            pair[1].max
        );
    }

    let mut by_category: BTreeMap<&str, Vec<&StyleBlock>> = BTreeMap::new();
    for b in blocks {
        if let Some(category) = exclusive_category(&b.kind) {
            by_category.entry(category).or_default().push(b);
        }
    }
    for (category, mut group) in by_category {
        group.sort_by_key(|b| (b.min, b.max));
        for pair in group.windows(2) {
            assert!(
                pair[0].max <= pair[1].min,
                "two {category} blocks open at once: {} [{}, {}) and {} [{}, {})",
                pair[0].kind,
                pair[0].min,
                pair[0].max,
                pair[1].kind,
                pair[1].min,
                pair[1].max
            );
        }
    }
}
