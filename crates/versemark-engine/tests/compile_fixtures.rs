use insta::assert_snapshot;
use versemark_engine::{Document, ParseOptions, parse_book, snapshot};

fn compile_fixture(name: &str, chapter: u32) -> Document {
    let source = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.usfm",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();
    let book = parse_book(&source, &ParseOptions::default()).unwrap();
    assert!(book.errors.is_empty(), "lexer errors: {:#?}", book.errors);

    let body = book
        .chapter(chapter)
        .unwrap_or_else(|| panic!("{name} has no chapter {chapter}"))
        .body
        .clone();
    snapshot::check_invariants(&body);
    body
}

#[test]
fn fixture_psalm_poetry() {
    let doc = compile_fixture("psalm_poetry", 23);
    assert_snapshot!(snapshot::render(&doc), @r#"
    "The LORD is my shepherd;I shall not want."
    v 0..41 ref=PSA 23:1 "The LORD is my shepherd;I shall not want."
      q 0..24 indent=1 "The LORD is my shepherd;"
        nd 4..8 "LORD"
      q 24..41 indent=2 "I shall not want."
    "#);
}

#[test]
fn fixture_census_list() {
    let doc = compile_fixture("census_list", 1);
    assert_snapshot!(snapshot::render(&doc), @r#"
    "Census totals:Reuben 46,500Simeon 59,300Total: two tribes."
    list 0..58 virtual
      lh 0..14 "Census totals:"
      list_items 14..40 virtual
        li 14..27 indent=1 "Reuben 46,500"
          liv 21..27 "46,500"
        li 27..40 indent=1 "Simeon 59,300"
          liv 34..40 "59,300"
      lf 40..58 "Total: two tribes."
    "#);
}

#[test]
fn fixture_tribe_table() {
    let doc = compile_fixture("tribe_table", 1);
    assert_snapshot!(snapshot::render(&doc), @r#"
    "Tribe CountJudah 74,600After the table."
    table 0..23 virtual
      tr 0..11 "Tribe Count"
        th 0..6 column=1 "Tribe "
        th 6..11 column=2 "Count"
      tr 11..23 "Judah 74,600"
        tc 11..17 column=1 "Judah "
        tcr 17..23 column=2 "74,600"
    p 23..39 "After the table."
    "#);
}

#[test]
fn fixture_genealogy_notes() {
    let doc = compile_fixture("genealogy_notes", 1);
    assert!(!doc.has_errors());
    assert_snapshot!(snapshot::render(&doc), @r#"
    "This is the genealogy of Jesus.Abraham was the father of Isaac."
    p 0..63 "This is the genealogy of Jesus.Abraham was the father of Isaac."
      v 0..31 ref=MAT 1:1 "This is the genealogy of Jesus."
        f 21..21 caller=+
          "Or the book of the generations"
          ft 0..3 "Or "
            fr 0..0 ref=MAT 1:1
          fq 3..30 "the book of the generations"
      v 31..63 ref=MAT 1:2 "Abraham was the father of Isaac."
        x 38..38 caller=-
          "Gen 21:3"
          xt 0..8 "Gen 21:3"
            xo 0..0 ref=MAT 1:2
    "#);
}

#[test]
fn fixture_messy_input_recovers() {
    let doc = compile_fixture("messy_input", 1);
    assert_eq!(doc.errors.len(), 2);
    assert_snapshot!(snapshot::render(&doc), @r#"
    "Startclosing stray"
    p 0..18 "Startclosing stray"
      v 0..5 ref=GEN 1:1 "Start"
      v 5..18 ref=GEN 1:2 "closing stray"
    ! unknown marker \zz
    ! \nd* without a matching opening marker
    "#);
}

/// Every block of a chapter slices back to text that appears in the chapter.
#[test]
fn block_slices_are_substrings() {
    let doc = compile_fixture("genealogy_notes", 1);
    for block in &doc.styling {
        assert!(doc.text.contains(&doc.slice(block)));
    }
}

/// The outermost blocks that carry text tile the chapter text, so reading
/// their slices in order gives the text back.
#[test]
fn outermost_blocks_reconstruct_text() {
    let fixtures = [
        ("psalm_poetry", 23),
        ("census_list", 1),
        ("tribe_table", 1),
        ("genealogy_notes", 1),
        ("messy_input", 1),
    ];
    for (name, chapter) in fixtures {
        let doc = compile_fixture(name, chapter);
        let mut covered = 0;
        let mut rebuilt = String::new();
        for block in &doc.styling {
            if block.is_virtual() || block.is_empty() || block.min < covered {
                continue;
            }
            assert_eq!(block.min, covered, "{name}: gap before {}", block.kind);
            rebuilt.push_str(&doc.slice(block));
            covered = block.max;
        }
        assert_eq!(rebuilt, doc.text, "{name}");
    }
}
