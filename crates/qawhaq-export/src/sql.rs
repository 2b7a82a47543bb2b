//! Relational export: a SQLite dump of the `mem` table read by the apps.
//!
//! One row per exported entry, ordered by assigned id. Columns are the
//! English fields, then `definition/notes/examples/search_tags` per
//! language. `[[VERSION]]` placeholders in text are replaced with the
//! build version.

use qawhaq_lexicon::{BuiltEntry, LexiconBuild};

use crate::text::{part_of_speech_string, LocalizedText};
use crate::ExportOptions;

pub const MEM_TABLE: &str = "mem";
pub const VERSION_PLACEHOLDER: &str = "[[VERSION]]";

const BASE_COLUMNS: &[&str] = &[
    "_id",
    "entry_name",
    "part_of_speech",
    "definition",
    "synonyms",
    "antonyms",
    "see_also",
    "notes",
    "hidden_notes",
    "components",
    "examples",
    "search_tags",
    "source",
];

const LOCALIZED_COLUMNS: &[&str] = &["definition", "notes", "examples", "search_tags"];

pub fn column_names(languages: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for lang in languages {
        columns.extend(LOCALIZED_COLUMNS.iter().map(|c| format!("{c}_{lang}")));
    }
    columns
}

pub fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

fn header(languages: &[String]) -> String {
    let columns = column_names(languages)
        .iter()
        .map(|c| {
            if c == "_id" {
                format!("\"{c}\" INTEGER PRIMARY KEY")
            } else {
                format!("\"{c}\" TEXT")
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "PRAGMA foreign_keys=OFF;\n\
         BEGIN TRANSACTION;\n\
         CREATE TABLE IF NOT EXISTS \"android_metadata\" (\"locale\" TEXT DEFAULT 'en_US');\n\
         INSERT INTO android_metadata VALUES('en_US');\n\
         CREATE TABLE IF NOT EXISTS \"{MEM_TABLE}\" ({columns});\n"
    )
}

fn text_values(built: &BuiltEntry, build: &LexiconBuild, languages: &[String]) -> Vec<String> {
    let entry = &built.entry;
    let english = LocalizedText::english(built, build);
    let mut values = vec![
        entry.entry_name.clone(),
        part_of_speech_string(built),
        english.definition,
        entry.synonyms.as_text(),
        entry.antonyms.as_text(),
        entry.see_also.as_text(),
        english.notes,
        entry.hidden_notes.render(&build.notes, None),
        entry.components.as_text(),
        english.examples,
        english.search_tags,
        entry.sources_raw().to_string(),
    ];
    for lang in languages {
        let text = LocalizedText::translated(built, build, lang);
        values.extend([text.definition, text.notes, text.examples, text.search_tags]);
    }
    values
}

pub fn render_row(built: &BuiltEntry, build: &LexiconBuild, options: &ExportOptions) -> String {
    let mut values = Vec::with_capacity(BASE_COLUMNS.len() + 4 * options.languages.len());
    values.push(if built.id == 0 {
        "NULL".to_string()
    } else {
        built.id.to_string()
    });
    for value in text_values(built, build, &options.languages) {
        let value = value.replace(VERSION_PLACEHOLDER, &options.version);
        values.push(format!("'{}'", escape_sql(&value)));
    }
    format!("INSERT INTO \"{MEM_TABLE}\" VALUES({});\n", values.join(","))
}

pub fn render_sql(build: &LexiconBuild, options: &ExportOptions) -> String {
    let mut rows: Vec<&BuiltEntry> = build.entries.iter().collect();
    rows.sort_by_key(|b| b.id);

    let mut out = header(&options.languages);
    for built in rows {
        out.push_str(&render_row(built, build, options));
    }
    out.push_str("COMMIT;\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_follow_language_order() {
        let columns = column_names(&["de".to_string(), "sv".to_string()]);
        assert_eq!(columns.len(), 13 + 8);
        assert_eq!(columns[12], "source");
        assert_eq!(columns[13], "definition_de");
        assert_eq!(columns[20], "search_tags_sv");
    }

    #[test]
    fn header_declares_both_tables() {
        let head = header(&["de".to_string()]);
        assert!(head.starts_with("PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\n"));
        assert!(head.contains("INSERT INTO android_metadata VALUES('en_US');\n"));
        assert!(head.contains("CREATE TABLE IF NOT EXISTS \"mem\" (\"_id\" INTEGER PRIMARY KEY,\"entry_name\" TEXT,"));
        assert!(head.ends_with("\"search_tags_de\" TEXT);\n"));
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(escape_sql("Qapla'"), "Qapla''");
    }
}
