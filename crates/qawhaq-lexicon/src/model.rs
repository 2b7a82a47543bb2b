//! Entry, Note and Example records as stored in the YAML tree.
//!
//! Several fields accept more than one authored shape (a bare string or a
//! list, an inline note or a `{ref: id}`); each such field has a small
//! untagged enum so the loader keeps whatever the curator wrote.

use std::collections::BTreeMap;

use qawhaq_definition::DefinitionSource;
use qawhaq_sources::{parse_source_field, Citation, CitationParseError, SourceRegistry};
use serde::{Deserialize, Serialize};

use crate::pos::PartOfSpeech;

// ============================================================================
// Status / section
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    #[serde(alias = "canonical", alias = "extended_canon")]
    Active,
    Deprecated,
    #[serde(alias = "hypothetical")]
    NonCanon,
    Nodict,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Main,
    Extra,
    Examples,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Main => "main",
            Section::Extra => "extra",
            Section::Examples => "examples",
        }
    }
}

// ============================================================================
// Multi-shape fields
// ============================================================================

/// A relation list: `"{a:v}, {b:n}"` or `["{a:v}", "{b:n}"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RelationField {
    Text(String),
    List(Vec<String>),
}

impl Default for RelationField {
    fn default() -> Self {
        RelationField::Text(String::new())
    }
}

impl RelationField {
    pub fn items(&self) -> Vec<&str> {
        match self {
            RelationField::Text(text) if text.trim().is_empty() => Vec::new(),
            RelationField::Text(text) => vec![text.as_str()],
            RelationField::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            RelationField::Text(text) => text.clone(),
            RelationField::List(items) => items.join(", "),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NoteItem {
    Ref {
        #[serde(rename = "ref")]
        id: String,
    },
    Inline {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        citations: Vec<Citation>,
    },
    Text(String),
}

/// `notes:` / `hidden_notes:`: a string or a list of inline notes and refs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NotesField {
    Text(String),
    List(Vec<NoteItem>),
}

impl Default for NotesField {
    fn default() -> Self {
        NotesField::Text(String::new())
    }
}

impl NotesField {
    pub fn items(&self) -> Vec<NoteItem> {
        match self {
            NotesField::Text(text) if text.trim().is_empty() => Vec::new(),
            NotesField::Text(text) => vec![NoteItem::Text(text.clone())],
            NotesField::List(items) => items.clone(),
        }
    }

    /// Ids of shared notes this field points at.
    pub fn refs(&self) -> Vec<&str> {
        match self {
            NotesField::Text(_) => Vec::new(),
            NotesField::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    NoteItem::Ref { id } => Some(id.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Inline texts (refs excluded).
    pub fn inline_texts(&self) -> Vec<&str> {
        match self {
            NotesField::Text(text) => vec![text.as_str()],
            NotesField::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    NoteItem::Inline { text, .. } | NoteItem::Text(text) => Some(text.as_str()),
                    NoteItem::Ref { .. } => None,
                })
                .collect(),
        }
    }

    pub fn citations(&self) -> Vec<&Citation> {
        match self {
            NotesField::Text(_) => Vec::new(),
            NotesField::List(items) => items
                .iter()
                .flat_map(|item| match item {
                    NoteItem::Inline { citations, .. } => citations.iter().collect::<Vec<_>>(),
                    _ => Vec::new(),
                })
                .collect(),
        }
    }

    /// Render to one string, resolving refs through `notes`.
    ///
    /// `lang` selects a shared note's translation when it has one.
    pub fn render(&self, notes: &BTreeMap<String, Note>, lang: Option<&str>) -> String {
        let mut pieces = Vec::new();
        for item in self.items() {
            match item {
                NoteItem::Text(text) | NoteItem::Inline { text, .. } => pieces.push(text),
                NoteItem::Ref { id } => {
                    if let Some(note) = notes.get(&id) {
                        pieces.push(note.text_in(lang).to_string());
                    }
                }
            }
        }
        pieces.retain(|p| !p.trim().is_empty());
        pieces.join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExampleItem {
    Ref {
        #[serde(rename = "ref")]
        id: String,
    },
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExamplesField {
    Text(String),
    List(Vec<ExampleItem>),
}

impl Default for ExamplesField {
    fn default() -> Self {
        ExamplesField::Text(String::new())
    }
}

impl ExamplesField {
    pub fn items(&self) -> Vec<ExampleItem> {
        match self {
            ExamplesField::Text(text) if text.trim().is_empty() => Vec::new(),
            ExamplesField::Text(text) => vec![ExampleItem::Text(text.clone())],
            ExamplesField::List(items) => items.clone(),
        }
    }

    pub fn refs(&self) -> Vec<&str> {
        match self {
            ExamplesField::Text(_) => Vec::new(),
            ExamplesField::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    ExampleItem::Ref { id } => Some(id.as_str()),
                    ExampleItem::Text(_) => None,
                })
                .collect(),
        }
    }

    pub fn inline_texts(&self) -> Vec<&str> {
        match self {
            ExamplesField::Text(text) => vec![text.as_str()],
            ExamplesField::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    ExampleItem::Text(text) => Some(text.as_str()),
                    ExampleItem::Ref { .. } => None,
                })
                .collect(),
        }
    }

    pub fn render(&self, examples: &BTreeMap<String, Example>, lang: Option<&str>) -> String {
        let mut pieces = Vec::new();
        for item in self.items() {
            match item {
                ExampleItem::Text(text) => pieces.push(text),
                ExampleItem::Ref { id } => {
                    if let Some(example) = examples.get(&id) {
                        pieces.push(example.render(lang));
                    }
                }
            }
        }
        pieces.retain(|p| !p.trim().is_empty());
        pieces.join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// A node of a sentence's component parse tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentNode {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.token.as_str());
        for child in &self.children {
            child.collect_tokens(out);
        }
    }
}

/// `components:` as a flat cross-reference list or a parse tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ComponentsField {
    Flat(RelationField),
    Tree(Vec<ComponentNode>),
}

impl Default for ComponentsField {
    fn default() -> Self {
        ComponentsField::Flat(RelationField::default())
    }
}

impl ComponentsField {
    /// Token texts in document order.
    pub fn items(&self) -> Vec<&str> {
        match self {
            ComponentsField::Flat(list) => list.items(),
            ComponentsField::Tree(nodes) => {
                let mut out = Vec::new();
                for node in nodes {
                    node.collect_tokens(&mut out);
                }
                out
            }
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            ComponentsField::Flat(list) => list.as_text(),
            ComponentsField::Tree(_) => self.items().join(", "),
        }
    }
}

/// `sources:` as the legacy `[1] {...:src}` string, or that string plus its
/// structured citations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourcesField {
    Raw(String),
    Structured {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        citations: Vec<Citation>,
    },
}

impl SourcesField {
    pub fn raw(&self) -> &str {
        match self {
            SourcesField::Raw(raw) | SourcesField::Structured { raw, .. } => raw,
        }
    }

    /// Structured citations when authored, else the raw field parsed.
    pub fn citations(&self, registry: &SourceRegistry) -> Result<Vec<Citation>, CitationParseError> {
        match self {
            SourcesField::Structured { citations, .. } if !citations.is_empty() => Ok(citations.clone()),
            other => parse_source_field(other.raw(), registry),
        }
    }
}

// ============================================================================
// Entry
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Translation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionSource>,
    #[serde(default)]
    pub notes: NotesField,
    #[serde(default)]
    pub examples: ExamplesField,
    #[serde(default)]
    pub search_tags: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub entry_name: String,
    /// Raw `pos:modifiers` string; wins over the structured fields below.
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub pos_subtype: Option<String>,
    #[serde(default)]
    pub homophone: Option<u32>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub metadata_tags: Vec<String>,

    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub nodict: bool,
    #[serde(default)]
    pub section: Section,

    #[serde(default)]
    pub definition: DefinitionSource,

    #[serde(default)]
    pub synonyms: RelationField,
    #[serde(default)]
    pub antonyms: RelationField,
    #[serde(default)]
    pub see_also: RelationField,
    #[serde(default)]
    pub notes: NotesField,
    #[serde(default)]
    pub hidden_notes: NotesField,
    #[serde(default)]
    pub components: ComponentsField,
    #[serde(default)]
    pub examples: ExamplesField,
    #[serde(default)]
    pub search_tags: String,
    #[serde(default, alias = "source")]
    pub sources: Option<SourcesField>,

    #[serde(default)]
    pub translations: BTreeMap<String, Translation>,

    #[serde(default, rename = "_original_id")]
    pub original_id: Option<u32>,
}

impl Entry {
    pub fn part_of_speech(&self) -> PartOfSpeech {
        if !self.part_of_speech.trim().is_empty() {
            return PartOfSpeech::parse(&self.part_of_speech);
        }
        PartOfSpeech {
            pos: self.pos.clone(),
            homophone: self.homophone,
            hidden_homophone: false,
            subtype: self.pos_subtype.clone(),
            categories: self.categories.clone(),
            metadata_tags: self.metadata_tags.clone(),
        }
    }

    pub fn search_name(&self) -> String {
        self.part_of_speech().search_name(&self.entry_name)
    }

    /// Deprecated entries stay loadable (and linkable) but are never exported.
    pub fn is_exported(&self) -> bool {
        self.status != EntryStatus::Deprecated
    }

    /// Kept out of the E-K index.
    pub fn is_nodict(&self) -> bool {
        self.nodict || self.status == EntryStatus::Nodict || self.part_of_speech().has_tag("nodict")
    }

    pub fn sources_raw(&self) -> &str {
        self.sources.as_ref().map(SourcesField::raw).unwrap_or("")
    }
}

// ============================================================================
// Shared Notes and Examples
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,
}

impl Note {
    pub fn text_in(&self, lang: Option<&str>) -> &str {
        lang.and_then(|l| self.translations.get(l))
            .map(String::as_str)
            .unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stanza {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Example {
    #[serde(default)]
    pub id: String,
    pub stanzas: Vec<Stanza>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
}

impl Example {
    /// Klingon text of every stanza, or its translation into `lang`.
    pub fn render(&self, lang: Option<&str>) -> String {
        self.stanzas
            .iter()
            .map(|s| {
                lang.and_then(|l| s.translations.get(l))
                    .map(String::as_str)
                    .unwrap_or(&s.text)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
