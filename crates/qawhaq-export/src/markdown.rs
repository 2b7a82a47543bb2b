//! Printable E-K listing: one section per initial letter, English in
//! italics and Klingon in bold.

use std::collections::BTreeMap;

use crate::ek_index::{EkIndex, EkLine};

pub const MARKDOWN_TITLE: &str = "# English-Klingon Dictionary";

fn initial(key: &str) -> String {
    match key.chars().next() {
        Some(c) => c.to_uppercase().collect(),
        None => "?".to_string(),
    }
}

pub fn render_line(line: &EkLine) -> String {
    format!("_{}_ — **{}** ({})", line.display, line.klingon, line.pos_label())
}

pub fn render_markdown(index: &EkIndex) -> String {
    let mut by_letter: BTreeMap<String, Vec<&EkLine>> = BTreeMap::new();
    for (key, lines) in &index.entries {
        by_letter.entry(initial(key)).or_default().extend(lines);
    }

    let mut lines = vec![
        MARKDOWN_TITLE.to_string(),
        String::new(),
        "_Generated from boQwI' database_".to_string(),
        String::new(),
    ];
    for (letter, entries) in by_letter {
        lines.push(format!("## {letter}"));
        lines.push(String::new());
        lines.extend(entries.into_iter().map(render_line));
        lines.push(String::new());
    }
    lines.join("\n")
}
