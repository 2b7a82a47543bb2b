//! E-K permutation generator.
//!
//! One record per part, led by that part and followed by the others in
//! their original order. Records are a rebuildable cache: the output is a
//! pure function of (definition, pos, slug).

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Definition, DefinitionPart, PosContext};
use crate::sort_key::{sort_key, strip_be};

/// A reverse-lookup line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EkRecord {
    pub sort_key: String,
    pub display: String,
    pub slug: String,
}

/// A record dropped under `dedup` because an earlier one normalizes the same.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collision {
    pub sort_key: String,
    pub display: String,
    /// Display text of the record that was kept.
    pub kept: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EkOutcome {
    pub records: Vec<EkRecord>,
    pub collisions: Vec<Collision>,
}

fn is_stative_part(part: &DefinitionPart, pos: PosContext<'_>) -> bool {
    pos.is_stative() && part.text.starts_with("be ")
}

/// Items of the record led by `parts[lead]`, before joining.
fn record_items<'d>(parts: &'d [DefinitionPart], lead: usize, key: &'d str, pos: PosContext<'_>) -> Vec<&'d str> {
    let mut items = Vec::with_capacity(parts.len() + 1);
    let leader = &parts[lead];
    if is_stative_part(leader, pos) {
        items.push(key);
    }
    items.push(leader.text.as_str());
    items.extend(
        parts
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != lead)
            .map(|(_, p)| p.text.as_str()),
    );
    items
}

fn render(items: &[&str], global_parenthetical: Option<&str>) -> String {
    let mut display = items.join(", ");
    if let Some(paren) = global_parenthetical {
        display.push_str(" (");
        display.push_str(paren);
        display.push(')');
    }
    display
}

/// Order-insensitive form used to spot near-identical records.
fn normalized_form(items: &[&str]) -> Vec<String> {
    items
        .iter()
        .map(|item| strip_be(item).to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn generate_ek_records(definition: &Definition, pos: PosContext<'_>, slug: &str) -> EkOutcome {
    if definition.parts.is_empty() || definition.is_reference() {
        return EkOutcome::default();
    }

    let record = |sort_key: String, display: String| EkRecord {
        sort_key,
        display,
        slug: slug.to_string(),
    };

    if definition.no_permute {
        let key = sort_key(&definition.parts[0], pos);
        return EkOutcome {
            records: vec![record(key, definition.flatten())],
            collisions: Vec::new(),
        };
    }

    let paren = definition.global_parenthetical.as_deref();
    let mut outcome = EkOutcome::default();
    let mut kept: HashMap<Vec<String>, usize> = HashMap::new();

    for lead in 0..definition.parts.len() {
        let key = sort_key(&definition.parts[lead], pos);
        let (display, form) = {
            let items = record_items(&definition.parts, lead, &key, pos);
            let form = definition.dedup.then(|| normalized_form(&items));
            (render(&items, paren), form)
        };

        if let Some(form) = form {
            if let Some(&idx) = kept.get(&form) {
                debug!(slug, sort_key = %key, "dedup suppressed E-K record");
                outcome.collisions.push(Collision {
                    sort_key: key,
                    display,
                    kept: outcome.records[idx].display.clone(),
                });
                continue;
            }
            kept.insert(form, outcome.records.len());
        }
        outcome.records.push(record(key, display));
    }
    outcome
}
