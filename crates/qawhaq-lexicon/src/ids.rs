//! Id assignment, computed once over the final entry collection.
//!
//! Entries are ordered by section (main, extra, examples), then by
//! `_original_id` (entries without one last), then by slug, and numbered
//! from [`FIRST_ENTRY_ID`]. The first id of the extra section is derived
//! from the result instead of being tracked while ids are handed out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Entry;

pub const FIRST_ENTRY_ID: u32 = 10000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdAssignment {
    pub ids: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_start_id: Option<u32>,
}

impl IdAssignment {
    pub fn get(&self, slug: &str) -> Option<u32> {
        self.ids.get(slug).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub fn assign_ids<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> IdAssignment {
    let mut ordered: Vec<&Entry> = entries.into_iter().collect();
    ordered.sort_by(|a, b| {
        (a.section, a.original_id.unwrap_or(u32::MAX), a.slug.as_str()).cmp(&(
            b.section,
            b.original_id.unwrap_or(u32::MAX),
            b.slug.as_str(),
        ))
    });

    let mut out = IdAssignment::default();
    for (id, entry) in (FIRST_ENTRY_ID..).zip(ordered) {
        out.ids.insert(entry.slug.clone(), id);
        if entry.section == crate::model::Section::Extra {
            out.extra_start_id = Some(out.extra_start_id.map_or(id, |start| start.min(id)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    fn entry(slug: &str, section: Section, original_id: Option<u32>) -> Entry {
        Entry {
            slug: slug.to_string(),
            section,
            original_id,
            ..Entry::default()
        }
    }

    #[test]
    fn orders_by_section_then_original_id() {
        let entries = vec![
            entry("c", Section::Extra, Some(1)),
            entry("b", Section::Main, None),
            entry("a", Section::Main, Some(7)),
            entry("d", Section::Examples, Some(0)),
            entry("e", Section::Extra, Some(2)),
        ];
        let ids = assign_ids(&entries);
        assert_eq!(ids.get("a"), Some(10000));
        assert_eq!(ids.get("b"), Some(10001));
        assert_eq!(ids.get("c"), Some(10002));
        assert_eq!(ids.get("e"), Some(10003));
        assert_eq!(ids.get("d"), Some(10004));
        assert_eq!(ids.extra_start_id, Some(10002));
    }

    #[test]
    fn no_extra_entries_means_no_marker() {
        let entries = vec![entry("a", Section::Main, None)];
        assert_eq!(assign_ids(&entries).extra_start_id, None);
    }
}
