//! Batch build over a loaded store.
//!
//! Stages, in order:
//! 1. duplicate slugs (first kept)
//! 2. per entry, in parallel: required fields, definition resolution,
//!    citations against the registry, E-K records
//! 3. duplicate search names
//! 4. shared notes and examples: citations against the registry
//! 5. reference validation over the whole store
//! 6. id assignment
//!
//! Each entry's work depends only on that entry and the read-only registry,
//! so stage 2 runs on rayon and keeps input order in its output.

use std::collections::{BTreeMap, HashMap, HashSet};

use qawhaq_definition::{generate_ek_records, Definition, EkRecord, PosContext};
use qawhaq_sources::{check_citation, Citation, SourceRegistry};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::ids::{assign_ids, IdAssignment};
use crate::model::{Entry, Example, Note};
use crate::pos::PartOfSpeech;
use crate::report::{BuildReport, Excluded, Finding, FindingKind};
use crate::store::LexiconStore;
use crate::validate::{validate_references, Mention};

/// An entry that made it into the output, with everything derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltEntry {
    pub id: u32,
    pub entry: Entry,
    pub pos: PartOfSpeech,
    pub definition: Definition,
    /// Resolved definitions of the other languages, by language code.
    pub translations: BTreeMap<String, Definition>,
    pub citations: Vec<Citation>,
    /// Empty for nodict entries.
    pub ek_records: Vec<EkRecord>,
}

impl BuiltEntry {
    pub fn slug(&self) -> &str {
        &self.entry.slug
    }

    pub fn search_name(&self) -> String {
        self.pos.search_name(&self.entry.entry_name)
    }

    pub fn pos_context(&self) -> PosContext<'_> {
        PosContext::new(&self.pos.pos, self.pos.subtype.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LexiconBuild {
    /// Exported entries, in store order.
    pub entries: Vec<BuiltEntry>,
    pub notes: BTreeMap<String, Note>,
    pub examples: BTreeMap<String, Example>,
    pub ids: IdAssignment,
    pub mentions: Vec<Mention>,
    pub report: BuildReport,
}

impl LexiconBuild {
    pub fn get(&self, slug: &str) -> Option<&BuiltEntry> {
        self.entries.iter().find(|e| e.slug() == slug)
    }

    /// Every E-K record of the build, in entry order.
    pub fn ek_records(&self) -> impl Iterator<Item = (&BuiltEntry, &EkRecord)> {
        self.entries
            .iter()
            .flat_map(|entry| entry.ek_records.iter().map(move |record| (entry, record)))
    }
}

struct EntryResult {
    built: Option<BuiltEntry>,
    findings: Vec<Finding>,
    excluded: Option<Excluded>,
}

fn owner_of(entry: &Entry) -> String {
    if !entry.slug.is_empty() {
        entry.slug.clone()
    } else if !entry.entry_name.is_empty() {
        entry.entry_name.clone()
    } else {
        "<unnamed>".to_string()
    }
}

fn missing(entry: &Entry, field: &str) -> EntryResult {
    let owner = owner_of(entry);
    EntryResult {
        built: None,
        findings: vec![Finding::new(
            FindingKind::MissingField,
            owner.clone(),
            format!("entry has no `{field}`"),
        )
        .with_level(crate::report::Level::Error)],
        excluded: Some(Excluded {
            slug: owner,
            kind: FindingKind::MissingField,
            reason: format!("no `{field}`"),
        }),
    }
}

/// Check `citation` (and what it was reprinted in) against the registry.
/// Returns the unknown source ids.
fn check_against_registry(
    slug: &str,
    citation: &Citation,
    registry: &SourceRegistry,
    findings: &mut Vec<Finding>,
) -> Vec<String> {
    let unknown: Vec<String> = registry
        .unknown_ids(citation)
        .into_iter()
        .map(str::to_string)
        .collect();
    for id in &unknown {
        findings.push(
            Finding::new(FindingKind::UnknownSource, slug, format!("cites unknown source `{id}`"))
                .with_source_id(id.clone()),
        );
    }

    let mut next = Some(citation);
    while let Some(current) = next {
        if let Some(source) = registry.get(&current.source_id) {
            for issue in check_citation(current, source) {
                findings.push(
                    Finding::new(FindingKind::MalformedCitation, slug, issue.to_string())
                        .with_source_id(current.source_id.clone()),
                );
            }
        }
        next = current.reprinted_in.as_deref();
    }
    unknown
}

fn unknown_source_reason(unknown: &[String]) -> String {
    format!(
        "cites unknown source{} {}",
        if unknown.len() > 1 { "s" } else { "" },
        unknown.iter().map(|id| format!("`{id}`")).collect::<Vec<_>>().join(", ")
    )
}

/// Shared records whose citations all resolve, keyed as in the store.
/// The rest are reported under owner `<kind>:<id>` and listed as excluded.
fn checked_shared<'a, T: Clone + 'a>(
    kind: &str,
    records: impl IntoIterator<Item = (&'a String, &'a T)>,
    citations_of: impl Fn(&T) -> Vec<&Citation>,
    registry: &SourceRegistry,
    findings: &mut Vec<Finding>,
    excluded: &mut Vec<Excluded>,
) -> BTreeMap<String, T> {
    let mut kept = BTreeMap::new();
    for (id, record) in records {
        let owner = format!("{kind}:{id}");
        let mut unknown = Vec::new();
        for citation in citations_of(record) {
            unknown.extend(check_against_registry(&owner, citation, registry, findings));
        }
        if unknown.is_empty() {
            kept.insert(id.clone(), record.clone());
        } else {
            unknown.dedup();
            excluded.push(Excluded {
                slug: owner,
                kind: FindingKind::UnknownSource,
                reason: unknown_source_reason(&unknown),
            });
        }
    }
    kept
}

fn process_entry(entry: &Entry, registry: &SourceRegistry) -> EntryResult {
    if entry.slug.trim().is_empty() {
        return missing(entry, "slug");
    }
    if entry.entry_name.trim().is_empty() {
        return missing(entry, "entry_name");
    }

    let slug = entry.slug.as_str();
    let mut findings = Vec::new();
    let pos = entry.part_of_speech();
    if pos.pos.is_empty() {
        findings.push(Finding::new(
            FindingKind::MissingField,
            slug,
            "entry has no `part_of_speech`",
        ));
    }
    if entry.definition.is_empty() {
        findings.push(Finding::new(FindingKind::MissingField, slug, "entry has no `definition`"));
    }

    let ctx = PosContext::new(&pos.pos, pos.subtype.as_deref());
    let outcome = entry.definition.resolve(ctx);
    for flag in &outcome.flags {
        findings.push(Finding::new(
            FindingKind::ParseAmbiguity,
            slug,
            format!("definition needs review ({}): {}", flag.reason.describe(), flag.text),
        ));
    }
    let definition = outcome.definition;

    let mut translations = BTreeMap::new();
    for (lang, translation) in &entry.translations {
        let Some(source) = &translation.definition else {
            continue;
        };
        let outcome = source.resolve(ctx);
        for flag in &outcome.flags {
            findings.push(Finding::new(
                FindingKind::ParseAmbiguity,
                slug,
                format!(
                    "`definition_{lang}` needs review ({}): {}",
                    flag.reason.describe(),
                    flag.text
                ),
            ));
        }
        translations.insert(lang.clone(), outcome.definition);
    }

    let mut citations: Vec<Citation> = match entry.sources.as_ref().map(|s| s.citations(registry)) {
        Some(Ok(citations)) => citations,
        Some(Err(err)) => {
            findings.push(Finding::new(
                FindingKind::MalformedCitation,
                slug,
                format!("unparseable `sources` field: {err}"),
            ));
            Vec::new()
        }
        None => Vec::new(),
    };
    citations.extend(definition.citations().cloned());
    citations.extend(translations.values().flat_map(|d| d.citations().cloned()));
    citations.extend(entry.notes.citations().into_iter().cloned());
    citations.extend(entry.hidden_notes.citations().into_iter().cloned());

    let mut unknown = Vec::new();
    for citation in &citations {
        unknown.extend(check_against_registry(slug, citation, registry, &mut findings));
    }
    if !unknown.is_empty() {
        unknown.dedup();
        return EntryResult {
            built: None,
            findings,
            excluded: Some(Excluded {
                slug: slug.to_string(),
                kind: FindingKind::UnknownSource,
                reason: unknown_source_reason(&unknown),
            }),
        };
    }

    let ek_records = if entry.is_exported() && !entry.is_nodict() {
        let ek = generate_ek_records(&definition, ctx, slug);
        for collision in &ek.collisions {
            findings.push(Finding::new(
                FindingKind::PermutationCollision,
                slug,
                format!(
                    "`{}` suppressed under dedup; same as `{}`",
                    collision.display, collision.kept
                ),
            ));
        }
        ek.records
    } else {
        debug!(slug, "no E-K records for nodict or deprecated entry");
        Vec::new()
    };

    EntryResult {
        built: Some(BuiltEntry {
            id: 0,
            entry: entry.clone(),
            pos,
            definition,
            translations,
            citations,
            ek_records,
        }),
        findings,
        excluded: None,
    }
}

/// Run every stage over `store`. Always completes; problems land in
/// `report`.
pub fn build_lexicon(store: &LexiconStore, registry: &SourceRegistry) -> LexiconBuild {
    let mut findings = store.findings.clone();
    let mut excluded = Vec::new();

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(store.entries.len());
    for entry in &store.entries {
        if !entry.slug.is_empty() && !seen.insert(entry.slug.as_str()) {
            findings.push(Finding::new(
                FindingKind::DuplicateSlug,
                entry.slug.clone(),
                format!("slug `{}` is used by more than one entry; first kept", entry.slug),
            ));
            excluded.push(Excluded {
                slug: entry.slug.clone(),
                kind: FindingKind::DuplicateSlug,
                reason: "later entry with an already used slug".to_string(),
            });
            continue;
        }
        unique.push(entry);
    }

    let results: Vec<EntryResult> = unique
        .par_iter()
        .map(|entry| process_entry(entry, registry))
        .collect();

    let mut entries = Vec::new();
    for result in results {
        findings.extend(result.findings);
        excluded.extend(result.excluded);
        if let Some(built) = result.built {
            if built.entry.is_exported() {
                entries.push(built);
            }
        }
    }

    let mut search_names: HashMap<String, &str> = HashMap::new();
    for built in &entries {
        let name = built.search_name();
        if let Some(first) = search_names.get(&name) {
            findings.push(Finding::new(
                FindingKind::DuplicateSearchName,
                built.slug(),
                format!("search name `{name}` is also used by `{first}`; the later entry wins in the JSON index"),
            ));
        } else {
            search_names.insert(name, built.slug());
        }
    }

    let notes = checked_shared(
        "note",
        &store.notes,
        |note: &Note| note.citations.iter().collect(),
        registry,
        &mut findings,
        &mut excluded,
    );
    let examples = checked_shared(
        "example",
        &store.examples,
        |example: &Example| example.citation.iter().collect(),
        registry,
        &mut findings,
        &mut excluded,
    );

    let validation = validate_references(store);
    findings.extend(validation.findings);

    let ids = assign_ids(entries.iter().map(|b| &b.entry));
    for built in &mut entries {
        built.id = ids.get(&built.entry.slug).unwrap_or_default();
    }

    let report = BuildReport::new(findings, excluded);
    info!(
        entries = entries.len(),
        ek_records = entries.iter().map(|e| e.ek_records.len()).sum::<usize>(),
        errors = report.summary.error_count,
        warnings = report.summary.warning_count,
        "lexicon build finished"
    );

    LexiconBuild {
        entries,
        notes,
        examples,
        ids,
        mentions: validation.mentions,
        report,
    }
}
