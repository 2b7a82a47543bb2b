//! The source registry: every citation target, keyed by id.
//!
//! Loaded once from `sources.yaml` and read-only afterwards. Loading rejects
//! duplicate ids, reprints of unknown sources, and reprint cycles; those are
//! the only registry problems that stop a build.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::citation::Citation;
use crate::source::Source;

#[derive(Debug, thiserror::Error)]
pub enum SourceRegistryError {
    #[error("failed to read source registry `{path}`: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("malformed source registry: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate source id `{0}`")]
    DuplicateId(String),

    #[error("source `{id}` is reprinted in unknown source `{target}`")]
    UnknownReprintTarget { id: String, target: String },

    #[error("reprint chain starting at `{0}` loops back on itself")]
    ReprintCycle(String),
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: BTreeMap<String, Source>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, Source>,
    by_short_name: HashMap<String, String>,
}

impl SourceRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceRegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| SourceRegistryError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse a `sources:` map. Map keys become source ids.
    pub fn from_yaml_str(text: &str) -> Result<Self, SourceRegistryError> {
        let file: SourcesFile = serde_yaml::from_str(text)?;
        let sources = file.sources.into_iter().map(|(id, mut source)| {
            source.id = id;
            source
        });
        Self::from_sources(sources)
    }

    pub fn from_sources(
        sources: impl IntoIterator<Item = Source>,
    ) -> Result<Self, SourceRegistryError> {
        let mut map = BTreeMap::new();
        for source in sources {
            if map.contains_key(&source.id) {
                return Err(SourceRegistryError::DuplicateId(source.id));
            }
            map.insert(source.id.clone(), source);
        }

        let mut by_short_name = HashMap::new();
        for source in map.values() {
            if let Some(short) = &source.short_name {
                by_short_name
                    .entry(short.clone())
                    .or_insert_with(|| source.id.clone());
            }
        }

        let registry = Self {
            sources: map,
            by_short_name,
        };
        registry.check_reprints()?;
        Ok(registry)
    }

    fn check_reprints(&self) -> Result<(), SourceRegistryError> {
        for source in self.sources.values() {
            let Some(reprint) = &source.reprinted_in else {
                continue;
            };
            if !self.contains(&reprint.source_id) {
                return Err(SourceRegistryError::UnknownReprintTarget {
                    id: source.id.clone(),
                    target: reprint.source_id.clone(),
                });
            }
            let mut seen: HashSet<&str> = HashSet::new();
            seen.insert(source.id.as_str());
            let mut current = reprint.source_id.as_str();
            loop {
                if !seen.insert(current) {
                    return Err(SourceRegistryError::ReprintCycle(source.id.clone()));
                }
                match self.get(current).and_then(|s| s.reprinted_in.as_ref()) {
                    Some(next) => current = next.source_id.as_str(),
                    None => break,
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        self.sources.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Look a source up by the abbreviation used in source fields (`KGT`).
    pub fn resolve_short_name(&self, short_name: &str) -> Option<&Source> {
        self.by_short_name
            .get(short_name)
            .and_then(|id| self.sources.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The sources `id` was reprinted into, nearest first.
    pub fn reprint_chain(&self, id: &str) -> Vec<&Source> {
        let mut chain = Vec::new();
        let mut next = self.get(id).and_then(|s| s.reprinted_in.as_ref());
        while let Some(reprint) = next {
            let Some(source) = self.get(&reprint.source_id) else {
                break;
            };
            chain.push(source);
            next = source.reprinted_in.as_ref();
        }
        chain
    }

    /// Ids along a citation (and its reprints) that the registry does not know.
    pub fn unknown_ids<'c>(&self, citation: &'c Citation) -> Vec<&'c str> {
        citation
            .source_ids()
            .into_iter()
            .filter(|id| !self.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES: &str = r#"
sources:
  tkd:
    name: The Klingon Dictionary
    short_name: TKD
    type: book
    year: 1992
  skybox_s27:
    name: SkyBox card S27
    short_name: SkyBox S27
    type: media
    reprinted_in:
      source: holqed
      volume: 5
      issue: 3
      page_start: 15
  holqed:
    name: HolQeD
    short_name: HQ
    type: journal
"#;

    #[test]
    fn loads_sources_keyed_by_id() {
        let registry = SourceRegistry::from_yaml_str(SOURCES).expect("load");
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("tkd").map(|s| s.id.as_str()), Some("tkd"));
        assert_eq!(
            registry.resolve_short_name("HQ").map(|s| s.id.as_str()),
            Some("holqed")
        );
        let chain: Vec<_> = registry
            .reprint_chain("skybox_s27")
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(chain, vec!["holqed"]);
    }

    #[test]
    fn rejects_unknown_reprint_target() {
        let yaml = r#"
sources:
  a:
    name: A
    type: media
    reprinted_in: { source: nowhere }
"#;
        let err = SourceRegistry::from_yaml_str(yaml).expect_err("must fail");
        assert!(matches!(err, SourceRegistryError::UnknownReprintTarget { .. }));
    }

    #[test]
    fn rejects_reprint_cycle() {
        let yaml = r#"
sources:
  a:
    name: A
    type: media
    reprinted_in: { source: b }
  b:
    name: B
    type: media
    reprinted_in: { source: a }
"#;
        let err = SourceRegistry::from_yaml_str(yaml).expect_err("must fail");
        assert!(matches!(err, SourceRegistryError::ReprintCycle(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let sources = vec![
            Source::new("tkd", "A", crate::SourceKind::Book),
            Source::new("tkd", "B", crate::SourceKind::Book),
        ];
        let err = SourceRegistry::from_sources(sources).expect_err("must fail");
        assert!(matches!(err, SourceRegistryError::DuplicateId(id) if id == "tkd"));
    }

    #[test]
    fn reports_unknown_ids_along_reprints() {
        let registry = SourceRegistry::from_yaml_str(SOURCES).expect("load");
        let citation = Citation::new("tkd").reprinted_in(Citation::new("ghost"));
        assert_eq!(registry.unknown_ids(&citation), vec!["ghost"]);
    }
}
