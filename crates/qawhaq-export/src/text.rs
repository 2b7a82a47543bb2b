//! Per-language display strings of one built entry, shared by the SQL and
//! JSON exports.

use qawhaq_lexicon::{BuiltEntry, LexiconBuild};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LocalizedText {
    pub definition: String,
    pub notes: String,
    pub examples: String,
    pub search_tags: String,
}

impl LocalizedText {
    pub fn english(built: &BuiltEntry, build: &LexiconBuild) -> Self {
        let entry = &built.entry;
        Self {
            definition: built.definition.flatten(),
            notes: entry.notes.render(&build.notes, None),
            examples: entry.examples.render(&build.examples, None),
            search_tags: entry.search_tags.clone(),
        }
    }

    /// Empty strings where the entry has no translation into `lang`.
    pub fn translated(built: &BuiltEntry, build: &LexiconBuild, lang: &str) -> Self {
        let Some(translation) = built.entry.translations.get(lang) else {
            return Self::default();
        };
        Self {
            definition: built
                .translations
                .get(lang)
                .map(|d| d.flatten())
                .unwrap_or_default(),
            notes: translation.notes.render(&build.notes, Some(lang)),
            examples: translation.examples.render(&build.examples, Some(lang)),
            search_tags: translation.search_tags.clone(),
        }
    }
}

/// The stored part-of-speech string, rebuilt from structured fields when the
/// raw one is absent.
pub(crate) fn part_of_speech_string(built: &BuiltEntry) -> String {
    if built.entry.part_of_speech.trim().is_empty() {
        built.pos.reconstruct()
    } else {
        built.entry.part_of_speech.clone()
    }
}

pub(crate) fn nfkd(text: &str) -> String {
    text.nfkd().collect()
}

/// `"a, b,c"` → `["a", "b", "c"]`.
pub(crate) fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim_start_matches(' ').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_on_comma_and_following_spaces() {
        assert_eq!(split_tags("sleep, rest,nap"), vec!["sleep", "rest", "nap"]);
        assert_eq!(split_tags("one"), vec!["one"]);
    }

    #[test]
    fn nfkd_decomposes_precomposed_letters() {
        assert_eq!(nfkd("é"), "e\u{301}");
        assert_eq!(nfkd("plain"), "plain");
    }
}
