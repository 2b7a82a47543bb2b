//! Entry source store: the YAML tree under a data directory.
//!
//! ```text
//! <data_dir>/
//!   sources.yaml
//!   entries/**/*.yaml    entry: {...} | entries: [...]
//!   notes/**/*.yaml      note: {...}  | notes: [...] or {id: {...}}
//!   examples/**/*.yaml   example: {...} | examples: [...] or {id: {...}}
//! ```
//!
//! Files are read in sorted path order so a run is reproducible. A file that
//! does not parse becomes a `load_error` finding and loading continues.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::model::{Entry, Example, Note};
use crate::report::{Finding, FindingKind, Level};

pub const ENTRIES_DIR: &str = "entries";
pub const NOTES_DIR: &str = "notes";
pub const EXAMPLES_DIR: &str = "examples";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory `{0}` does not exist")]
    MissingDir(PathBuf),

    #[error("failed to walk `{path}`: {err}")]
    Walk {
        path: PathBuf,
        #[source]
        err: walkdir::Error,
    },
}

/// Everything loaded from one data directory. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct LexiconStore {
    pub entries: Vec<Entry>,
    pub notes: BTreeMap<String, Note>,
    pub examples: BTreeMap<String, Example>,
    /// Problems met while loading.
    pub findings: Vec<Finding>,
}

impl LexiconStore {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.insert(note.id.clone(), note);
        self
    }

    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.insert(example.id.clone(), example);
        self
    }
}

// ============================================================================
// File shapes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Many<T> {
    List(Vec<T>),
    Map(BTreeMap<String, T>),
}

impl<T> Many<T> {
    fn into_keyed(self) -> Vec<(Option<String>, T)> {
        match self {
            Many::List(items) => items.into_iter().map(|item| (None, item)).collect(),
            Many::Map(items) => items.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    #[serde(default)]
    entry: Option<Entry>,
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct NoteFile {
    #[serde(default)]
    note: Option<Note>,
    #[serde(default)]
    notes: Option<Many<Note>>,
}

#[derive(Debug, Deserialize)]
struct ExampleFile {
    #[serde(default)]
    example: Option<Example>,
    #[serde(default)]
    examples: Option<Many<Example>>,
}

// ============================================================================
// Loading
// ============================================================================

fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|err| LoadError::Walk {
            path: dir.to_path_buf(),
            err,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_yaml = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// Read and parse one file. `Ok(None)` for a blank file.
fn read_yaml<T: DeserializeOwned>(root: &Path, path: &Path, findings: &mut Vec<Finding>) -> Option<T> {
    let name = display_path(root, path);
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %name, "skipping unreadable file: {err}");
            findings.push(Finding::new(FindingKind::LoadError, name, format!("cannot read file: {err}")));
            return None;
        }
    };
    if text.trim().is_empty() || text.trim() == "~" {
        return None;
    }
    match serde_yaml::from_str(&text) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(file = %name, "skipping malformed file: {err}");
            findings.push(Finding::new(FindingKind::LoadError, name, format!("invalid YAML: {err}")));
            None
        }
    }
}

fn insert_keyed<T>(
    out: &mut BTreeMap<String, T>,
    owner_prefix: &str,
    file: &str,
    key: Option<String>,
    mut item: T,
    id_of: fn(&mut T) -> &mut String,
    findings: &mut Vec<Finding>,
) {
    let id = id_of(&mut item);
    if id.is_empty() {
        if let Some(key) = key {
            *id = key;
        }
    }
    if id.is_empty() {
        findings.push(Finding::new(
            FindingKind::MissingField,
            file.to_string(),
            format!("{owner_prefix} without an id"),
        ));
        return;
    }
    let id = id.clone();
    if out.contains_key(&id) {
        findings.push(
            Finding::new(
                FindingKind::DuplicateSlug,
                format!("{owner_prefix}:{id}"),
                format!("duplicate {owner_prefix} id `{id}` in {file}; first definition kept"),
            )
            .with_level(Level::Warning),
        );
        return;
    }
    out.insert(id, item);
}

/// Load the whole tree under `data_dir`.
pub fn load_store(data_dir: impl AsRef<Path>) -> Result<LexiconStore, LoadError> {
    let root = data_dir.as_ref();
    if !root.is_dir() {
        return Err(LoadError::MissingDir(root.to_path_buf()));
    }

    let mut store = LexiconStore::default();
    let mut findings = Vec::new();

    for path in yaml_files(&root.join(ENTRIES_DIR))? {
        if let Some(file) = read_yaml::<EntryFile>(root, &path, &mut findings) {
            store.entries.extend(file.entry);
            store.entries.extend(file.entries);
        }
    }

    for path in yaml_files(&root.join(NOTES_DIR))? {
        let name = display_path(root, &path);
        let Some(file) = read_yaml::<NoteFile>(root, &path, &mut findings) else {
            continue;
        };
        let mut items: Vec<(Option<String>, Note)> = file.note.map(|n| (None, n)).into_iter().collect();
        items.extend(file.notes.map(Many::into_keyed).unwrap_or_default());
        for (key, note) in items {
            insert_keyed(&mut store.notes, "note", &name, key, note, |n| &mut n.id, &mut findings);
        }
    }

    for path in yaml_files(&root.join(EXAMPLES_DIR))? {
        let name = display_path(root, &path);
        let Some(file) = read_yaml::<ExampleFile>(root, &path, &mut findings) else {
            continue;
        };
        let mut items: Vec<(Option<String>, Example)> =
            file.example.map(|e| (None, e)).into_iter().collect();
        items.extend(file.examples.map(Many::into_keyed).unwrap_or_default());
        for (key, example) in items {
            insert_keyed(&mut store.examples, "example", &name, key, example, |e| &mut e.id, &mut findings);
        }
    }

    info!(
        entries = store.entries.len(),
        notes = store.notes.len(),
        examples = store.examples.len(),
        "loaded lexicon store from {}",
        root.display()
    );
    store.findings = findings;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_accepts_list_and_map() {
        let list: Many<Note> = serde_yaml::from_str("- id: a\n  text: one\n").expect("list");
        assert_eq!(list.into_keyed()[0].0, None);

        let map: Many<Note> = serde_yaml::from_str("b:\n  text: two\n").expect("map");
        assert_eq!(map.into_keyed()[0].0.as_deref(), Some("b"));
    }

    #[test]
    fn keyed_items_take_their_map_key() {
        let mut out = BTreeMap::new();
        let mut findings = Vec::new();
        let note = Note {
            text: "x".to_string(),
            ..Note::default()
        };
        insert_keyed(&mut out, "note", "n.yaml", Some("k".to_string()), note.clone(), |n| &mut n.id, &mut findings);
        insert_keyed(&mut out, "note", "n.yaml", Some("k".to_string()), note, |n| &mut n.id, &mut findings);
        assert_eq!(out["k"].id, "k");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::DuplicateSlug);
        assert_eq!(findings[0].slug, "note:k");
    }
}
