//! Reference validator.
//!
//! Every `{name:pos:flags}` token in an entry's text fields, relation lists
//! and components must resolve against the entry index built once per run.
//! Shared `{ref: id}` links must name a loaded Note or Example. Nothing
//! here is fatal: each miss is one finding and the run continues.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{Entry, Example, Note};
use crate::report::{Finding, FindingKind, UnresolvedReason};
use crate::store::LexiconStore;
use crate::xref::{relation_tokens, scan_tokens, RefToken};

// ============================================================================
// Entry index
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry<'a> {
    pub slug: &'a str,
    pub pos: String,
    pub homophone: Option<u32>,
}

/// entry_name → every entry carrying it. Deprecated entries are indexed:
/// a link to one is stale, not broken.
#[derive(Debug, Clone, Default)]
pub struct EntryIndex<'a> {
    by_name: HashMap<&'a str, Vec<IndexedEntry<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Slugs the token points at; more than one only for homophone `0`.
    Resolved(Vec<&'a str>),
    Unresolved(UnresolvedReason),
}

impl<'a> EntryIndex<'a> {
    pub fn build(entries: &'a [Entry]) -> Self {
        let mut by_name: HashMap<&'a str, Vec<IndexedEntry<'a>>> = HashMap::new();
        for entry in entries {
            if entry.entry_name.is_empty() {
                continue;
            }
            let pos = entry.part_of_speech();
            by_name.entry(entry.entry_name.as_str()).or_default().push(IndexedEntry {
                slug: entry.slug.as_str(),
                pos: pos.pos,
                homophone: pos.homophone,
            });
        }
        Self { by_name }
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn resolve(&self, token: &RefToken) -> Resolution<'a> {
        let Some(named) = self.by_name.get(token.name.as_str()) else {
            return Resolution::Unresolved(UnresolvedReason::Missing);
        };
        let candidates: Vec<&IndexedEntry<'a>> = match token.pos.as_deref() {
            Some(pos) => named.iter().filter(|e| e.pos == pos).collect(),
            None => named.iter().collect(),
        };
        if candidates.is_empty() {
            return Resolution::Unresolved(UnresolvedReason::Missing);
        }

        match token.homophone() {
            Some(0) => Resolution::Resolved(candidates.iter().map(|e| e.slug).collect()),
            Some(n) => {
                let matching: Vec<&str> = candidates
                    .iter()
                    .filter(|e| e.homophone == Some(n))
                    .map(|e| e.slug)
                    .collect();
                match matching.len() {
                    0 => Resolution::Unresolved(UnresolvedReason::Missing),
                    1 => Resolution::Resolved(matching),
                    _ => Resolution::Unresolved(UnresolvedReason::AmbiguousHomophone),
                }
            }
            None if candidates.len() == 1 => Resolution::Resolved(vec![candidates[0].slug]),
            None => {
                if token.pos.is_some() {
                    return Resolution::Unresolved(UnresolvedReason::AmbiguousHomophone);
                }
                // A bare name matches every homophone of a single part of speech.
                let distinct_pos: BTreeSet<&str> = candidates.iter().map(|e| e.pos.as_str()).collect();
                if distinct_pos.len() > 1 {
                    Resolution::Unresolved(UnresolvedReason::AmbiguousPos)
                } else {
                    Resolution::Resolved(candidates.iter().map(|e| e.slug).collect())
                }
            }
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// A `nolink` token: recorded, never required to resolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mention {
    pub owner: String,
    pub field: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub findings: Vec<Finding>,
    pub mentions: Vec<Mention>,
    /// Link tokens that resolved.
    pub resolved: usize,
}

pub struct ReferenceValidator<'a> {
    index: EntryIndex<'a>,
    notes: &'a BTreeMap<String, Note>,
    examples: &'a BTreeMap<String, Example>,
    outcome: ValidationOutcome,
}

impl<'a> ReferenceValidator<'a> {
    pub fn new(
        entries: &'a [Entry],
        notes: &'a BTreeMap<String, Note>,
        examples: &'a BTreeMap<String, Example>,
    ) -> Self {
        Self {
            index: EntryIndex::build(entries),
            notes,
            examples,
            outcome: ValidationOutcome::default(),
        }
    }

    pub fn index(&self) -> &EntryIndex<'a> {
        &self.index
    }

    fn check_token(&mut self, owner: &str, field: &str, token: &RefToken) {
        if !token.is_link() {
            return;
        }
        if token.is_nolink() {
            self.outcome.mentions.push(Mention {
                owner: owner.to_string(),
                field: field.to_string(),
                token: token.display(),
            });
        } else {
            match self.index.resolve(token) {
                Resolution::Resolved(_) => self.outcome.resolved += 1,
                Resolution::Unresolved(reason) => {
                    let message = match reason {
                        UnresolvedReason::Missing => {
                            format!("`{field}` references {}, which names no entry", token.display())
                        }
                        UnresolvedReason::AmbiguousHomophone => format!(
                            "`{field}` references {}, which matches several homophones; add a homophone number",
                            token.display()
                        ),
                        UnresolvedReason::AmbiguousPos => format!(
                            "`{field}` references {}, which matches several parts of speech; add a pos",
                            token.display()
                        ),
                    };
                    self.outcome.findings.push(
                        Finding::new(FindingKind::UnresolvedReference, owner, message)
                            .with_token(token.display())
                            .with_reason(reason),
                    );
                }
            }
        }
        for component in &token.components {
            self.check_token(owner, field, component);
        }
    }

    fn check_text(&mut self, owner: &str, field: &str, text: &str) {
        for token in scan_tokens(text) {
            self.check_token(owner, field, &token);
        }
    }

    fn check_relations<'i>(&mut self, owner: &str, field: &str, items: impl IntoIterator<Item = &'i str>) {
        for item in items {
            for token in relation_tokens(item) {
                self.check_token(owner, field, &token);
            }
        }
    }

    fn check_note_ref(&mut self, owner: &str, field: &str, id: &str) {
        if !self.notes.contains_key(id) {
            self.outcome.findings.push(
                Finding::new(
                    FindingKind::UnresolvedReference,
                    owner,
                    format!("`{field}` refers to note `{id}`, which is not loaded"),
                )
                .with_token(format!("note:{id}"))
                .with_reason(UnresolvedReason::Missing),
            );
        }
    }

    fn check_example_ref(&mut self, owner: &str, field: &str, id: &str) {
        if !self.examples.contains_key(id) {
            self.outcome.findings.push(
                Finding::new(
                    FindingKind::UnresolvedReference,
                    owner,
                    format!("`{field}` refers to example `{id}`, which is not loaded"),
                )
                .with_token(format!("example:{id}"))
                .with_reason(UnresolvedReason::Missing),
            );
        }
    }

    pub fn check_entry(&mut self, entry: &Entry) {
        let owner = entry.slug.as_str();

        self.check_text(owner, "definition", &entry.definition.text());
        self.check_relations(owner, "synonyms", entry.synonyms.items());
        self.check_relations(owner, "antonyms", entry.antonyms.items());
        self.check_relations(owner, "see_also", entry.see_also.items());
        self.check_relations(owner, "components", entry.components.items());

        for (field, notes) in [("notes", &entry.notes), ("hidden_notes", &entry.hidden_notes)] {
            for text in notes.inline_texts() {
                self.check_text(owner, field, text);
            }
            for id in notes.refs() {
                self.check_note_ref(owner, field, id);
            }
        }

        for text in entry.examples.inline_texts() {
            self.check_text(owner, "examples", text);
        }
        for id in entry.examples.refs() {
            self.check_example_ref(owner, "examples", id);
        }

        for (lang, translation) in &entry.translations {
            if let Some(definition) = &translation.definition {
                self.check_text(owner, &format!("definition_{lang}"), &definition.text());
            }
            let notes_field = format!("notes_{lang}");
            for text in translation.notes.inline_texts() {
                self.check_text(owner, &notes_field, text);
            }
            for id in translation.notes.refs() {
                self.check_note_ref(owner, &notes_field, id);
            }
            let examples_field = format!("examples_{lang}");
            for text in translation.examples.inline_texts() {
                self.check_text(owner, &examples_field, text);
            }
            for id in translation.examples.refs() {
                self.check_example_ref(owner, &examples_field, id);
            }
        }
    }

    pub fn check_note(&mut self, note: &Note) {
        let owner = format!("note:{}", note.id);
        self.check_text(&owner, "text", &note.text);
        for (lang, text) in &note.translations {
            self.check_text(&owner, &format!("text_{lang}"), text);
        }
    }

    pub fn check_example(&mut self, example: &Example) {
        let owner = format!("example:{}", example.id);
        for stanza in &example.stanzas {
            self.check_text(&owner, "stanzas", &stanza.text);
            for (lang, text) in &stanza.translations {
                self.check_text(&owner, &format!("stanzas_{lang}"), text);
            }
        }
    }

    pub fn finish(self) -> ValidationOutcome {
        self.outcome
    }
}

/// Validate every entry, note and example in `store`.
pub fn validate_references(store: &LexiconStore) -> ValidationOutcome {
    let mut validator = ReferenceValidator::new(&store.entries, &store.notes, &store.examples);
    for entry in &store.entries {
        validator.check_entry(entry);
    }
    for note in store.notes.values() {
        validator.check_note(note);
    }
    for example in store.examples.values() {
        validator.check_example(example);
    }
    validator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationField;

    fn entry(slug: &str, name: &str, pos: &str) -> Entry {
        Entry {
            slug: slug.to_string(),
            entry_name: name.to_string(),
            part_of_speech: pos.to_string(),
            definition: "x".into(),
            ..Entry::default()
        }
    }

    fn lexicon() -> Vec<Entry> {
        vec![
            entry("Qong_v", "Qong", "v"),
            entry("ghIt_n", "ghIt", "n"),
            entry("ghIt_v", "ghIt", "v"),
            entry("Qoy_v_1", "Qoy", "v:1"),
            entry("Qoy_v_2", "Qoy", "v:2"),
        ]
    }

    #[test]
    fn resolution_rules() {
        let entries = lexicon();
        let index = EntryIndex::build(&entries);
        let resolve = |raw: &str| index.resolve(&RefToken::parse(raw));

        assert_eq!(resolve("Qong:v"), Resolution::Resolved(vec!["Qong_v"]));
        assert_eq!(resolve("Qong"), Resolution::Resolved(vec!["Qong_v"]));
        assert_eq!(resolve("Qot:v"), Resolution::Unresolved(UnresolvedReason::Missing));
        assert_eq!(resolve("Qong:n"), Resolution::Unresolved(UnresolvedReason::Missing));
        assert_eq!(resolve("ghIt"), Resolution::Unresolved(UnresolvedReason::AmbiguousPos));
        assert_eq!(resolve("ghIt:n"), Resolution::Resolved(vec!["ghIt_n"]));
        assert_eq!(resolve("Qoy:v"), Resolution::Unresolved(UnresolvedReason::AmbiguousHomophone));
        assert_eq!(resolve("Qoy:v:2"), Resolution::Resolved(vec!["Qoy_v_2"]));
        assert_eq!(resolve("Qoy:v:3"), Resolution::Unresolved(UnresolvedReason::Missing));
        assert_eq!(resolve("Qoy:v:0"), Resolution::Resolved(vec!["Qoy_v_1", "Qoy_v_2"]));
        assert_eq!(resolve("Qoy"), Resolution::Resolved(vec!["Qoy_v_1", "Qoy_v_2"]));
    }

    #[test]
    fn nolink_and_source_tokens_do_not_need_targets() {
        let mut entries = lexicon();
        entries[0].notes = crate::model::NotesField::Text(
            "Cf. {bogus:v:nolink} and {TKD p.5:src} and {https://x.org:url}.".to_string(),
        );
        let store = LexiconStore::new(entries);
        let out = validate_references(&store);
        assert!(out.findings.is_empty(), "{:?}", out.findings);
        assert_eq!(out.mentions.len(), 1);
        assert_eq!(out.mentions[0].owner, "Qong_v");
    }

    #[test]
    fn sentence_components_are_checked() {
        let mut entries = lexicon();
        entries[0].examples =
            crate::model::ExamplesField::Text("{Qong qoH:sen:nolink@@Qong:v, qoH:n}".to_string());
        let store = LexiconStore::new(entries);
        let out = validate_references(&store);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].token.as_deref(), Some("{qoH:n}"));
    }

    #[test]
    fn missing_shared_refs_are_reported() {
        let mut entries = lexicon();
        entries[1].notes = serde_yaml::from_str("- ref: nowhere\n").expect("notes");
        entries[1].see_also = RelationField::List(vec!["{Qong:v}".to_string()]);
        let store = LexiconStore::new(entries);
        let out = validate_references(&store);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].slug, "ghIt_n");
        assert_eq!(out.findings[0].token.as_deref(), Some("note:nowhere"));
        assert_eq!(out.resolved, 1);
    }

    #[test]
    fn bare_relation_text_resolves_each_reference() {
        let mut entries = lexicon();
        entries[0].see_also = RelationField::Text("ghIt:v, ghIt:n".to_string());
        let store = LexiconStore::new(entries);
        let out = validate_references(&store);
        assert!(out.findings.is_empty(), "{:?}", out.findings);
        assert_eq!(out.resolved, 2);
    }

    #[test]
    fn shared_notes_are_owned_by_their_id() {
        let store = LexiconStore::new(lexicon()).with_note(Note {
            id: "sleep".to_string(),
            text: "See {Qot:v}.".to_string(),
            ..Note::default()
        });
        let out = validate_references(&store);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].slug, "note:sleep");
    }
}
