use qawhaq_export::{
    build_ek_index, build_json_index, build_tree, render_markdown, render_sql, write_exports, ExportKind,
    ExportOptions,
};
use qawhaq_lexicon::{build_lexicon, Entry, LexiconBuild, LexiconStore};
use qawhaq_sources::SourceRegistry;

const ENTRIES: &str = r#"
- slug: joq_v
  entry_name: joq
  part_of_speech: v
  definition: flap, flutter, wave
  notes: "Recorded for version [[VERSION]]."
  search_tags: flap, flutter
  sources: "[1] {TKD:src}"
  _original_id: 5
  translations:
    de:
      definition: flattern, wehen
      search_tags: flattern,wehen
- slug: naS_v
  entry_name: naS
  part_of_speech: "v:is"
  definition: be hostile, be malicious
- slug: Qav_n
  entry_name: Qav
  part_of_speech: "n:nodict"
  definition: last one
- slug: jen_n
  entry_name: jen
  part_of_speech: n
  definition: café
- slug: old_v
  entry_name: old
  part_of_speech: v
  status: deprecated
  definition: obsolete
"#;

fn build() -> LexiconBuild {
    let registry = SourceRegistry::from_yaml_str(
        "sources:\n  tkd:\n    name: The Klingon Dictionary\n    short_name: TKD\n    type: book\n",
    )
    .expect("registry");
    let entries: Vec<Entry> = serde_yaml::from_str(ENTRIES).expect("entries");
    build_lexicon(&LexiconStore::new(entries), &registry)
}

fn options() -> ExportOptions {
    ExportOptions {
        version: "2026.10".to_string(),
        ..ExportOptions::default()
    }
}

#[test]
fn sql_dump_has_one_row_per_exported_entry() {
    let build = build();
    let sql = render_sql(&build, &options());

    assert!(sql.starts_with("PRAGMA foreign_keys=OFF;\n"));
    assert!(sql.ends_with("COMMIT;\n"));
    assert_eq!(sql.matches("INSERT INTO \"mem\"").count(), 4);
    assert!(sql.contains("INSERT INTO \"mem\" VALUES(10000,'joq','v','flap, flutter, wave','','','',"));
    assert!(sql.contains("'Recorded for version 2026.10.'"));
    assert!(sql.contains("'flattern, wehen'"));
    assert!(!sql.contains("'old'"));
}

#[test]
fn json_index_is_keyed_by_search_name() {
    let build = build();
    let index = build_json_index(&build, &options());

    assert_eq!(index.format_version, "1");
    assert_eq!(index.version, "2026.10");
    assert_eq!(index.supported_locales, vec!["de", "en", "sv"]);
    assert_eq!(index.locales.keys().next().map(String::as_str), Some("de"));
    assert_eq!(index.qawhaq.len(), 4);
    assert!(!index.qawhaq.contains_key("old:v"));

    let joq = &index.qawhaq["joq:v"];
    let langs: Vec<_> = joq.definition.keys().map(String::as_str).collect();
    assert_eq!(langs, vec!["en", "de"]);
    assert_eq!(joq.search_tags["en"], vec!["flap", "flutter"]);
    assert_eq!(joq.search_tags["de"], vec!["flattern", "wehen"]);
    assert_eq!(joq.source.as_deref(), Some("[1] {TKD:src}"));
    // The JSON index keeps placeholders as authored.
    assert_eq!(joq.notes["en"], "Recorded for version [[VERSION]].");

    assert_eq!(index.qawhaq["jen:n"].definition["en"], "cafe\u{301}");

    let text = serde_json::to_string(&index).expect("json");
    assert!(text.contains("\"qawHaq\""));
    assert!(!text.contains("\"hidden_notes\""));
}

#[test]
fn ek_index_skips_nodict_and_groups_by_key() {
    let build = build();
    let index = build_ek_index(&build);

    assert_eq!(index.entry_count, 3 + 2 + 1);
    assert!(index.lookup("last").is_empty());
    assert_eq!(index.lookup("flap")[0].display, "flap, flutter, wave");
    assert_eq!(index.lookup("Wave")[0].display, "wave, flap, flutter");

    let hostile = &index.lookup("hostile")[0];
    assert_eq!(hostile.display, "hostile, be hostile, be malicious");
    assert_eq!(hostile.pos_label(), "v:is");
    assert!(index.digest.starts_with("fnv1a64:"));
    assert_eq!(build_ek_index(&build).digest, index.digest);

    let md = render_markdown(&index);
    assert!(md.starts_with("# English-Klingon Dictionary\n"));
    assert!(md.contains("## F\n\n_flap, flutter, wave_ — **joq** (v)\n_flutter, flap, wave_ — **joq** (v)\n"));
    assert!(md.contains("_malicious, be malicious, be hostile_ — **naS** (v:is)"));
}

#[test]
fn tree_export_carries_parts_and_keys() {
    let build = build();
    let tree = build_tree(&build, "2026.10");
    let joq = tree.entries.iter().find(|e| e.slug == "joq_v").expect("joq_v");

    let keys: Vec<_> = joq.definition.parts.iter().map(|p| p.sort_key.as_str()).collect();
    assert_eq!(keys, vec!["flap", "flutter", "wave"]);
    assert_eq!(joq.definition.display, "flap, flutter, wave");
    assert_eq!(joq.citations.len(), 1);
    assert_eq!(joq.translations["de"].parts.len(), 2);
    assert_eq!(tree.entries[0].id, 10000);
}

#[test]
fn writes_every_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("build");
    let written = write_exports(&build(), &options(), &out, &ExportKind::ALL).expect("write");
    assert_eq!(written.len(), 5);
    for path in &written {
        assert!(path.is_file(), "{}", path.display());
    }
    let ek: qawhaq_export::EkIndex =
        serde_json::from_str(&std::fs::read_to_string(out.join("ek_index.json")).expect("read")).expect("parse");
    assert_eq!(ek.entry_count, 6);
}
