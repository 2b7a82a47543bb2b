//! The qawHaq lexicon: entries, shared notes and examples, and the batch
//! build that turns them into export-ready records
//!
//! - `pos`: `v:is,1h,deriv` part-of-speech strings
//! - `model`: Entry / Note / Example as authored in YAML
//! - `store`: loading the YAML tree under a data directory
//! - `xref`: `{name:pos:flags}` cross-reference tokens
//! - `validate`: resolving every token against the entry index
//! - `report`: findings accumulated over a run
//! - `pipeline`: the per-entry stages, run in parallel
//! - `ids`: numeric ids, assigned once over the final collection

pub mod ids;
pub mod model;
pub mod pipeline;
pub mod pos;
pub mod report;
pub mod store;
pub mod validate;
pub mod xref;

pub use ids::{assign_ids, IdAssignment, FIRST_ENTRY_ID};
pub use model::{
    ComponentNode, ComponentsField, Entry, EntryStatus, Example, ExampleItem, ExamplesField, Note,
    NoteItem, NotesField, RelationField, Section, SourcesField, Stanza, Translation,
};
pub use pipeline::{build_lexicon, BuiltEntry, LexiconBuild};
pub use pos::PartOfSpeech;
pub use report::{BuildReport, Excluded, Finding, FindingKind, Level, ReportSummary, UnresolvedReason};
pub use store::{load_store, LexiconStore, LoadError};
pub use validate::{validate_references, EntryIndex, Mention, ReferenceValidator, Resolution, ValidationOutcome};
pub use xref::{relation_tokens, scan_tokens, RefToken, TokenKind};
