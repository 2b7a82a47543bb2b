//! Downstream exports of a qawHaq lexicon build
//!
//! - `sql`: SQLite dump of the `mem` table read by the apps
//! - `json`: JSON index keyed by search name
//! - `ek_index`: E-K reverse-lookup index (JSON)
//! - `markdown`: printable E-K listing
//! - `tree`: structured definitions with parts, citations and sort keys
//!
//! Deprecated entries never reach a build; nodict entries carry no E-K
//! records, so they are absent from the E-K outputs only.

pub mod ek_index;
pub mod json;
pub mod locales;
pub mod markdown;
pub mod sql;
mod text;
pub mod tree;

use std::path::{Path, PathBuf};

use qawhaq_lexicon::LexiconBuild;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub use ek_index::{build_ek_index, fnv1a64_digest, EkIndex, EkLine};
pub use json::{build_json_index, JsonEntry, JsonIndex};
pub use markdown::render_markdown;
pub use sql::render_sql;
pub use tree::{build_tree, TreeExport};

pub const SQL_FILE: &str = "qawHaq.sql";
pub const JSON_FILE: &str = "qawHaq.json";
pub const EK_JSON_FILE: &str = "ek_index.json";
pub const EK_MARKDOWN_FILE: &str = "ek_index.md";
pub const TREE_FILE: &str = "tree.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub version: String,
    pub languages: Vec<String>,
    pub supported_locales: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            version: "0".to_string(),
            languages: locales::LANGUAGES.iter().map(|l| l.to_string()).collect(),
            supported_locales: locales::SUPPORTED_LOCALES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Sql,
    Json,
    EkJson,
    EkMarkdown,
    Tree,
}

impl ExportKind {
    pub const ALL: [ExportKind; 5] = [
        ExportKind::Sql,
        ExportKind::Json,
        ExportKind::EkJson,
        ExportKind::EkMarkdown,
        ExportKind::Tree,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Sql => SQL_FILE,
            ExportKind::Json => JSON_FILE,
            ExportKind::EkJson => EK_JSON_FILE,
            ExportKind::EkMarkdown => EK_MARKDOWN_FILE,
            ExportKind::Tree => TREE_FILE,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ExportError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Render one export to a string.
pub fn render(kind: ExportKind, build: &LexiconBuild, options: &ExportOptions) -> Result<String, ExportError> {
    match kind {
        ExportKind::Sql => Ok(render_sql(build, options)),
        ExportKind::Json => to_json(&build_json_index(build, options)),
        ExportKind::EkJson => to_json(&build_ek_index(build)),
        ExportKind::EkMarkdown => Ok(render_markdown(&build_ek_index(build))),
        ExportKind::Tree => to_json(&build_tree(build, &options.version)),
    }
}

pub fn write_file(path: &Path, text: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, text).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `kinds` into `out_dir`, replacing earlier output. Returns the paths
/// written.
pub fn write_exports(
    build: &LexiconBuild,
    options: &ExportOptions,
    out_dir: &Path,
    kinds: &[ExportKind],
) -> Result<Vec<PathBuf>, ExportError> {
    let mut written = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let path = out_dir.join(kind.file_name());
        write_file(&path, &render(*kind, build, options)?)?;
        written.push(path);
    }
    info!(files = written.len(), "wrote exports to {}", out_dir.display());
    Ok(written)
}
