//! Definition decomposition and E-K permutation for qawHaq glosses
//!
//! - `parser`: gloss text → ordered parts, global parenthetical, guard/dedup flags
//! - `sort_key`: the keyword each part is alphabetized under
//! - `permute`: one E-K record per part, led by that part
//! - `authored`: bare-string or structured definitions as curators write them
//!
//! Everything here is pure: the same definition and part of speech always
//! produce the same parts, keys and records.

pub mod authored;
pub mod model;
pub mod parser;
pub mod permute;
mod scan;
pub mod sort_key;

pub use authored::{DefinitionSource, StructuredDefinition};
pub use model::{Definition, DefinitionPart, PosContext, STATIVE_SUBTYPE};
pub use parser::{is_guard_case, parse_definition, should_dedup, ParseOutcome, ReviewFlag, ReviewReason};
pub use permute::{generate_ek_records, Collision, EkOutcome, EkRecord};
pub use sort_key::{sort_key, strip_be};
