//! E-K index: generated reverse-lookup records grouped by lowercased sort
//! key.
//!
//! The index is a cache rebuilt wholesale on every run. `digest` identifies
//! its content so consumers can tell whether a rebuild changed anything:
//!
//! - algorithm: FNV-1a 64-bit
//! - input: for each key in order, the key then each record's fields,
//!   tab-separated, one line per record
//! - output: `"fnv1a64:<16 lowercase hex digits>"`

use std::collections::BTreeMap;

use qawhaq_lexicon::LexiconBuild;
use serde::{Deserialize, Serialize};

pub const EK_FORMAT_VERSION: &str = "1";
pub const DIGEST_PREFIX: &str = "fnv1a64:";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EkLine {
    pub display: String,
    pub klingon: String,
    pub pos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_subtype: Option<String>,
    pub slug: String,
}

impl EkLine {
    /// `v:is` style label.
    pub fn pos_label(&self) -> String {
        match &self.pos_subtype {
            Some(subtype) => format!("{}:{subtype}", self.pos),
            None => self.pos.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EkIndex {
    pub format_version: String,
    pub entry_count: usize,
    pub digest: String,
    pub entries: BTreeMap<String, Vec<EkLine>>,
}

struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x00000100000001b3;

    fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> String {
        format!("{DIGEST_PREFIX}{:016x}", self.0)
    }
}

pub fn fnv1a64_digest(bytes: &[u8]) -> String {
    let mut hash = Fnv1a64::new();
    hash.write(bytes);
    hash.finish()
}

fn digest_entries(entries: &BTreeMap<String, Vec<EkLine>>) -> String {
    let mut hash = Fnv1a64::new();
    for (key, lines) in entries {
        hash.write(key.as_bytes());
        hash.write(b"\n");
        for line in lines {
            for field in [&line.display, &line.klingon, &line.pos_label(), &line.slug] {
                hash.write(field.as_bytes());
                hash.write(b"\t");
            }
            hash.write(b"\n");
        }
    }
    hash.finish()
}

impl EkIndex {
    pub fn from_entries(entries: BTreeMap<String, Vec<EkLine>>) -> Self {
        Self {
            format_version: EK_FORMAT_VERSION.to_string(),
            entry_count: entries.values().map(Vec::len).sum(),
            digest: digest_entries(&entries),
            entries,
        }
    }

    /// Records the lookup `word` finds.
    pub fn lookup(&self, word: &str) -> &[EkLine] {
        self.entries
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub fn build_ek_index(build: &LexiconBuild) -> EkIndex {
    let mut entries: BTreeMap<String, Vec<EkLine>> = BTreeMap::new();
    for (built, record) in build.ek_records() {
        entries
            .entry(record.sort_key.to_lowercase())
            .or_default()
            .push(EkLine {
                display: record.display.clone(),
                klingon: built.entry.entry_name.clone(),
                pos: built.pos.pos.clone(),
                pos_subtype: built.pos.subtype.clone(),
                slug: record.slug.clone(),
            });
    }
    EkIndex::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(display: &str, slug: &str) -> EkLine {
        EkLine {
            display: display.to_string(),
            klingon: "x".to_string(),
            pos: "v".to_string(),
            pos_subtype: None,
            slug: slug.to_string(),
        }
    }

    #[test]
    fn fnv1a64_matches_reference_vectors() {
        assert_eq!(fnv1a64_digest(b""), "fnv1a64:cbf29ce484222325");
        assert_eq!(fnv1a64_digest(b"a"), "fnv1a64:af63dc4c8601ec8c");
    }

    #[test]
    fn digest_tracks_content() {
        let one = EkIndex::from_entries(BTreeMap::from([("sing".to_string(), vec![line("sing", "bom_v")])]));
        let same = EkIndex::from_entries(BTreeMap::from([("sing".to_string(), vec![line("sing", "bom_v")])]));
        let other = EkIndex::from_entries(BTreeMap::from([("sing".to_string(), vec![line("chant", "bom_v")])]));
        assert_eq!(one.digest, same.digest);
        assert_ne!(one.digest, other.digest);
        assert_eq!(one.entry_count, 1);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let index = EkIndex::from_entries(BTreeMap::from([("klingon".to_string(), vec![line("Klingon", "tlhIngan_n")])]));
        assert_eq!(index.lookup("Klingon").len(), 1);
        assert!(index.lookup("human").is_empty());
    }
}
