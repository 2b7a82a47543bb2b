//! JSON index keyed by search name (`entry_name:pos[:homophone]`).
//!
//! All text is NFKD-normalized. Localized fields are maps from language to
//! text, English first. Entries without a definition are left out, and when
//! two entries share a search name the later one replaces the earlier in
//! place.

use indexmap::IndexMap;
use qawhaq_lexicon::{BuiltEntry, LexiconBuild};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::locales::LOCALES;
use crate::text::{nfkd, part_of_speech_string, split_tags, LocalizedText};
use crate::ExportOptions;

pub const JSON_FORMAT_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonIndex {
    pub format_version: String,
    pub version: String,
    pub locales: IndexMap<String, String>,
    pub supported_locales: Vec<String>,
    #[serde(rename = "qawHaq")]
    pub qawhaq: IndexMap<String, JsonEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonEntry {
    pub entry_name: String,
    pub part_of_speech: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definition: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antonyms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub see_also: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub notes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub search_tags: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(nfkd(&text))
    }
}

fn put(map: &mut IndexMap<String, String>, lang: &str, text: &str) {
    if !text.is_empty() {
        map.insert(lang.to_string(), nfkd(text));
    }
}

pub fn json_entry(built: &BuiltEntry, build: &LexiconBuild, options: &ExportOptions) -> JsonEntry {
    let entry = &built.entry;
    let english = LocalizedText::english(built, build);
    let localized: Vec<(&str, LocalizedText)> = options
        .languages
        .iter()
        .map(|lang| (lang.as_str(), LocalizedText::translated(built, build, lang)))
        .collect();

    let mut out = JsonEntry {
        entry_name: nfkd(&entry.entry_name),
        part_of_speech: part_of_speech_string(built),
        synonyms: non_empty(entry.synonyms.as_text()),
        antonyms: non_empty(entry.antonyms.as_text()),
        see_also: non_empty(entry.see_also.as_text()),
        hidden_notes: non_empty(entry.hidden_notes.render(&build.notes, None)),
        components: non_empty(entry.components.as_text()),
        source: non_empty(entry.sources_raw().to_string()),
        ..JsonEntry::default()
    };

    put(&mut out.definition, "en", &english.definition);
    put(&mut out.notes, "en", &english.notes);
    put(&mut out.examples, "en", &english.examples);
    if !english.search_tags.is_empty() {
        out.search_tags.insert("en".to_string(), split_tags(&nfkd(&english.search_tags)));
    }
    for (lang, text) in &localized {
        put(&mut out.definition, lang, &text.definition);
        put(&mut out.notes, lang, &text.notes);
        put(&mut out.examples, lang, &text.examples);
        if !text.search_tags.is_empty() {
            out.search_tags.insert(lang.to_string(), split_tags(&nfkd(&text.search_tags)));
        }
    }
    out
}

pub fn build_json_index(build: &LexiconBuild, options: &ExportOptions) -> JsonIndex {
    let mut rows: Vec<&BuiltEntry> = build.entries.iter().collect();
    rows.sort_by_key(|b| b.id);

    let mut qawhaq = IndexMap::new();
    for built in rows {
        if built.definition.is_empty() {
            warn!(slug = built.slug(), "no definition; left out of the JSON index");
            continue;
        }
        qawhaq.insert(built.search_name(), json_entry(built, build, options));
    }

    let locales = LOCALES
        .iter()
        .filter(|(code, _)| *code == "en" || options.languages.iter().any(|l| l == code))
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();

    JsonIndex {
        format_version: JSON_FORMAT_VERSION.to_string(),
        version: options.version.clone(),
        locales,
        supported_locales: options.supported_locales.clone(),
        qawhaq,
    }
}
