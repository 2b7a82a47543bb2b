//! Citation sources for the qawHaq lexicon
//!
//! - `source`: typed source records (books, journals, events, media, ...)
//! - `registry`: the read-only id → source table, loaded once per run
//! - `citation`: pointers into a source plus the per-type shape check
//! - `field`: parser/formatter for the legacy `[1] {TKD p.56:src}` field

pub mod citation;
pub mod field;
pub mod registry;
pub mod source;

pub use citation::{check_citation, Citation, CitationIssue};
pub use field::{format_source_field, parse_source_field, slugify, CitationParseError};
pub use registry::{SourceRegistry, SourceRegistryError};
pub use source::{Source, SourceKind};
