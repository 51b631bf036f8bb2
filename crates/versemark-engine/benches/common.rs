// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_chapter(verses: usize) -> String {
    let mut content = String::from("\\c 1\n\\s The Generated Chapter\n");
    for verse in 1..=verses {
        if verse % 5 == 1 {
            content.push_str("\\p\n");
        }
        content.push_str(&format!(
            "\\v {verse} And the \\nd LORD\\nd* spoke \\w words|lemma=\"dabar\"\\w* again\\f + \\fr 1:{verse} \\ft Or \\fq said\\f* today.\n"
        ));
    }
    content
}

#[allow(dead_code)]
pub fn generate_book(chapters: usize, verses: usize) -> String {
    let mut content = String::from("\\id GEN Benchmark\n\\h Genesis\n\\toc1 Genesis\n\\mt1 Genesis\n");
    for chapter in 1..=chapters {
        content.push_str(&generate_chapter(verses).replacen("\\c 1", &format!("\\c {chapter}"), 1));
    }
    content
}
