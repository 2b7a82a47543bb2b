use std::fs;
use std::path::Path;

use qawhaq_lexicon::{build_lexicon, load_store, FindingKind, Level, LoadError, UnresolvedReason};
use qawhaq_sources::SourceRegistry;

const SOURCES_YAML: &str = r#"
sources:
  tkd:
    name: The Klingon Dictionary
    short_name: TKD
    type: book
  kgt:
    name: Klingon for the Galactic Traveler
    short_name: KGT
    type: book
    page_prefix: "p."
"#;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, text).expect("write");
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "sources.yaml", SOURCES_YAML);
    write(
        root,
        "entries/b/bom.yaml",
        r#"
entry:
  slug: bom_v
  entry_name: bom
  part_of_speech: v
  definition: sing
  see_also: "{bom:n}, {Qoch:v}"
  sources: "[1] {TKD:src}"
"#,
    );
    write(
        root,
        "entries/b/bom_n.yaml",
        r#"
entry:
  slug: bom_n
  entry_name: bom
  part_of_speech: n
  definition: song
  notes:
    - ref: music
  sources: "[1] {KGT p.76:src}"
"#,
    );
    write(
        root,
        "entries/p/many.yaml",
        r#"
entries:
  - slug: pIch_n
    entry_name: pIch
    part_of_speech: n
    definition: fault, blame
  - slug: Qatlh_v
    entry_name: Qatlh
    part_of_speech: "v:is"
    definition: be difficult, be hard
"#,
    );
    write(root, "entries/z/broken.yaml", "entry: [unterminated\n");
    write(root, "entries/z/empty.yaml", "\n");
    write(
        root,
        "notes/music.yaml",
        "notes:\n  music:\n    text: \"Compare {bom:v}.\"\n",
    );
    dir
}

#[test]
fn loads_tree_and_reports_unresolved_reference_once() {
    let dir = fixture();
    let registry = SourceRegistry::load(dir.path().join("sources.yaml")).expect("registry");
    let store = load_store(dir.path()).expect("store");

    assert_eq!(store.entries.len(), 4);
    assert_eq!(store.notes["music"].id, "music");
    assert_eq!(store.findings.len(), 1);
    assert_eq!(store.findings[0].kind, FindingKind::LoadError);
    assert!(store.findings[0].slug.contains("broken.yaml"));

    let build = build_lexicon(&store, &registry);

    let unresolved: Vec<_> = build.report.of_kind(FindingKind::UnresolvedReference).collect();
    assert_eq!(unresolved.len(), 1, "{:?}", build.report.findings);
    assert_eq!(unresolved[0].slug, "bom_v");
    assert_eq!(unresolved[0].token.as_deref(), Some("{Qoch:v}"));
    assert_eq!(unresolved[0].reason, Some(UnresolvedReason::Missing));

    // The owning entry still makes it into the output.
    let bom = build.get("bom_v").expect("bom_v built");
    assert_eq!(bom.ek_records.len(), 1);
    assert_eq!(build.entries.len(), 4);
}

#[test]
fn stative_entries_and_ids() {
    let dir = fixture();
    let registry = SourceRegistry::load(dir.path().join("sources.yaml")).expect("registry");
    let build = build_lexicon(&load_store(dir.path()).expect("store"), &registry);

    let qatlh = build.get("Qatlh_v").expect("Qatlh_v");
    let keys: Vec<_> = qatlh.ek_records.iter().map(|r| r.sort_key.as_str()).collect();
    assert_eq!(keys, vec!["difficult", "hard"]);

    let mut ids: Vec<u32> = build.entries.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![10000, 10001, 10002, 10003]);
    assert_eq!(build.ids.extra_start_id, None);
}

#[test]
fn errors_and_warnings_are_counted_separately() {
    let dir = fixture();
    write(
        dir.path(),
        "entries/x/bad.yaml",
        "entry:\n  slug: bad_n\n  entry_name: bad\n  part_of_speech: n\n  definition: x\n  sources: \"[1] {Unknown Codex:src}\"\n",
    );
    let registry = SourceRegistry::load(dir.path().join("sources.yaml")).expect("registry");
    let build = build_lexicon(&load_store(dir.path()).expect("store"), &registry);

    assert!(build.report.has_errors());
    assert!(build.report.is_excluded("bad_n"));
    assert!(build.get("bad_n").is_none());
    let load_errors = build.report.of_kind(FindingKind::LoadError).count();
    let unknown = build.report.of_kind(FindingKind::UnknownSource).count();
    assert_eq!(build.report.summary.error_count, load_errors + unknown);
    assert!(build
        .report
        .of_kind(FindingKind::UnresolvedReference)
        .all(|f| f.level == Level::Warning));
}

#[test]
fn missing_data_dir_is_a_hard_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_store(dir.path().join("nope")).expect_err("must fail");
    assert!(matches!(err, LoadError::MissingDir(_)));
}
