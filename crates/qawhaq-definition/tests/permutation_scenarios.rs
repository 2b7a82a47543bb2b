//! End-to-end gloss → E-K record scenarios.

use qawhaq_definition::{
    generate_ek_records, parse_definition, Definition, DefinitionSource, PosContext,
};

fn records(text: &str, pos: PosContext<'_>) -> Vec<(String, String)> {
    let parsed = parse_definition(text, pos);
    generate_ek_records(&parsed.definition, pos, "entry")
        .records
        .into_iter()
        .map(|r| (r.sort_key, r.display))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(k, d)| (k.to_string(), d.to_string()))
        .collect()
}

#[test]
fn simple_permutation() {
    assert_eq!(
        records("flap, flutter, wave", PosContext::new("v", None)),
        pairs(&[
            ("flap", "flap, flutter, wave"),
            ("flutter", "flutter, flap, wave"),
            ("wave", "wave, flap, flutter"),
        ])
    );
}

#[test]
fn stative_permutation() {
    assert_eq!(
        records(
            "be hostile, be malicious, be unfriendly, be antagonistic",
            PosContext::stative()
        ),
        pairs(&[
            (
                "hostile",
                "hostile, be hostile, be malicious, be unfriendly, be antagonistic"
            ),
            (
                "malicious",
                "malicious, be malicious, be hostile, be unfriendly, be antagonistic"
            ),
            (
                "unfriendly",
                "unfriendly, be unfriendly, be hostile, be malicious, be antagonistic"
            ),
            (
                "antagonistic",
                "antagonistic, be antagonistic, be hostile, be malicious, be unfriendly"
            ),
        ])
    );
}

#[test]
fn global_parenthetical_is_appended_once() {
    let out = records("fire, energize (e.g., thrusters)", PosContext::new("v", Some("t")));
    assert_eq!(
        out,
        pairs(&[
            ("fire", "fire, energize (e.g., thrusters)"),
            ("energize", "energize, fire (e.g., thrusters)"),
        ])
    );

    let def = Definition::from_parts(["fire", "energize"]).with_global_parenthetical("e.g., thrusters");
    for record in generate_ek_records(&def, PosContext::default(), "baH").records {
        assert_eq!(record.display.matches("(e.g., thrusters)").count(), 1);
    }
}

#[test]
fn guarded_text_is_one_record() {
    let text = "sink for cleaning hands, face, food, etc.";
    let source = DefinitionSource::Structured(qawhaq_definition::StructuredDefinition {
        text: text.to_string(),
        no_permute: true,
        ..Default::default()
    });
    let parsed = source.resolve(PosContext::new("n", None));
    let out = generate_ek_records(&parsed.definition, PosContext::new("n", None), "puH");
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].display, text);
    assert_eq!(out.records[0].sort_key, "sink");

    // The same text is guarded even without the explicit flag.
    assert_eq!(records(text, PosContext::new("n", None)).len(), 1);
}

#[test]
fn part_local_parentheticals_travel_with_their_part() {
    assert_eq!(
        records("field (of land), park (e.g., recreational)", PosContext::new("n", None)),
        pairs(&[
            ("field", "field (of land), park (e.g., recreational)"),
            ("park", "park (e.g., recreational), field (of land)"),
        ])
    );
}

#[test]
fn semicolon_groups_are_permuted_whole() {
    let out = records(
        "travel with a purpose, for a specific reason; travel on a mission",
        PosContext::new("v", None),
    );
    // Both groups start with "travel" and dedup merges them into one record.
    assert_eq!(out.len(), 1);
    assert_eq!(
        out[0].1,
        "travel with a purpose, for a specific reason, travel on a mission"
    );
}
