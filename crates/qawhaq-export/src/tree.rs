//! Structured export: definitions as parts with their citations and sort
//! keys, for consumers that want more than display strings.

use std::collections::BTreeMap;

use qawhaq_definition::{sort_key, Definition, EkRecord, PosContext};
use qawhaq_lexicon::{BuiltEntry, LexiconBuild, PartOfSpeech};
use qawhaq_sources::Citation;
use serde::{Deserialize, Serialize};

pub const TREE_FORMAT_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreePart {
    pub text: String,
    pub sort_key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeDefinition {
    pub display: String,
    pub parts: Vec<TreePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_parenthetical: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_permute: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dedup: bool,
}

impl TreeDefinition {
    pub fn new(definition: &Definition, pos: PosContext<'_>) -> Self {
        Self {
            display: definition.flatten(),
            parts: definition
                .parts
                .iter()
                .map(|part| TreePart {
                    text: part.text.clone(),
                    sort_key: sort_key(part, pos),
                    citations: part.citations.clone(),
                })
                .collect(),
            global_parenthetical: definition.global_parenthetical.clone(),
            no_permute: definition.no_permute,
            dedup: definition.dedup,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub id: u32,
    pub slug: String,
    pub search_name: String,
    pub entry_name: String,
    pub pos: PartOfSpeech,
    pub definition: TreeDefinition,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, TreeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ek: Vec<EkRecord>,
}

impl TreeEntry {
    pub fn new(built: &BuiltEntry) -> Self {
        let pos = built.pos_context();
        Self {
            id: built.id,
            slug: built.slug().to_string(),
            search_name: built.search_name(),
            entry_name: built.entry.entry_name.clone(),
            pos: built.pos.clone(),
            definition: TreeDefinition::new(&built.definition, pos),
            translations: built
                .translations
                .iter()
                .map(|(lang, d)| (lang.clone(), TreeDefinition::new(d, pos)))
                .collect(),
            citations: built.citations.clone(),
            ek: built.ek_records.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeExport {
    pub format_version: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_start_id: Option<u32>,
    pub entries: Vec<TreeEntry>,
}

pub fn build_tree(build: &LexiconBuild, version: &str) -> TreeExport {
    let mut entries: Vec<TreeEntry> = build.entries.iter().map(TreeEntry::new).collect();
    entries.sort_by_key(|e| e.id);
    TreeExport {
        format_version: TREE_FORMAT_VERSION.to_string(),
        version: version.to_string(),
        extra_start_id: build.ids.extra_start_id,
        entries,
    }
}
