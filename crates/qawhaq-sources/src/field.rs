//! Parse and render the free-text `source` field of an entry.
//!
//! The field is a numbered list of `{...:src}` tokens:
//!
//! ```text
//! [1] {TKD 6.6:src}, [2] {KGT p.178-9:src}
//! [1] {HQ 13.1, p.8-10, Mar. 2004:src}
//! [1] {SkyBox S27:src} (reprinted in {HQ 5.3, p.15, Sep. 1996:src})
//! [1] {KLI mailing list 2009.07.27:src}
//! ```
//!
//! Each token becomes a [`Citation`]. The source name left over after the
//! locators are pulled out is resolved against the registry's short names,
//! then its ids, then a normalized slug.

use std::sync::OnceLock;

use regex::Regex;

use crate::citation::Citation;
use crate::registry::SourceRegistry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CitationParseError {
    #[error("no `[N] {{...:src}}` citation found in `{0}`")]
    Unrecognized(String),

    #[error("number out of range in citation `{0}`")]
    Number(String),

    #[error("citation `{0}` names no source")]
    MissingName(String),

    #[error("invalid citation pattern: {0}")]
    Pattern(String),
}

// ============================================================================
// Patterns
// ============================================================================

struct Patterns {
    field: Regex,
    page: Regex,
    dotted_date: Regex,
    month_date: Regex,
    number_pair: Regex,
    iso_date: Regex,
    qepa: Regex,
    qephom: Regex,
    skybox: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, CitationParseError> {
        Ok(Self {
            field: compile(r"\[(\d+)\]\s*\{([^}]+):src\}(?:\s*\(reprinted in \{([^}]+):src\}\))?")?,
            page: compile(r",?\s*\bp\.\s*(\d+)(?:\s*-\s*(\d+))?")?,
            dotted_date: compile(r"\s*\b(\d{4})\.(\d{2})\.(\d{2})\b")?,
            month_date: compile(
                r",?\s*((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\.?\s+\d{4})",
            )?,
            number_pair: compile(r"\s+(\d+)\.(\d+)\b")?,
            iso_date: compile(r"^(\d{4})-(\d{2})-(\d{2})$")?,
            qepa: compile(r"^qep'a'\s*(?:\d+\s*)?\((\d{4})\)$")?,
            qephom: compile(r"^(?:\S+\s+)?qepHom'a'\s*(\d{4})$")?,
            skybox: compile(r"^SkyBox\s*S(\d+)$")?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, CitationParseError> {
    Regex::new(pattern).map_err(|err| CitationParseError::Pattern(err.to_string()))
}

/// Compiled once per process; a failure is returned to every caller.
fn patterns() -> Result<&'static Patterns, CitationParseError> {
    static PATTERNS: OnceLock<Result<Patterns, CitationParseError>> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::compile).as_ref().map_err(Clone::clone)
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a full source field into ordered citations.
///
/// An empty field yields no citations. A non-empty field without a single
/// `[N] {...:src}` token is an error.
pub fn parse_source_field(
    text: &str,
    registry: &SourceRegistry,
) -> Result<Vec<Citation>, CitationParseError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let patterns = patterns()?;
    let mut citations = Vec::new();
    for caps in patterns.field.captures_iter(text) {
        let index = parse_number(&caps[1], text)?;
        let mut citation = parse_locator(&caps[2], patterns, registry)?;
        citation.index = Some(index);
        if let Some(reprint) = caps.get(3) {
            citation.reprinted_in =
                Some(Box::new(parse_locator(reprint.as_str(), patterns, registry)?));
        }
        citations.push(citation);
    }

    if citations.is_empty() {
        return Err(CitationParseError::Unrecognized(text.trim().to_string()));
    }
    Ok(citations)
}

fn parse_number(digits: &str, context: &str) -> Result<u32, CitationParseError> {
    digits
        .parse()
        .map_err(|_| CitationParseError::Number(context.to_string()))
}

/// `178-9` means pages 178 to 179.
fn expand_page_end(start: &str, end: &str) -> String {
    if end.len() < start.len() {
        format!("{}{}", &start[..start.len() - end.len()], end)
    } else {
        end.to_string()
    }
}

/// Parse the inside of one `{...:src}` token.
fn parse_locator(
    raw: &str,
    patterns: &Patterns,
    registry: &SourceRegistry,
) -> Result<Citation, CitationParseError> {
    let mut text = raw.trim().to_string();
    let mut citation = Citation::default();

    if let Some(caps) = patterns.page.captures(&text) {
        citation.page_start = Some(parse_number(&caps[1], raw)?);
        if let Some(end) = caps.get(2) {
            let end = expand_page_end(&caps[1], end.as_str());
            citation.page_end = Some(parse_number(&end, raw)?);
        }
        text = remove_match(&text, caps.get(0).map(|m| m.range()));
    }

    if let Some(caps) = patterns.dotted_date.captures(&text) {
        citation.date = Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]));
        text = remove_match(&text, caps.get(0).map(|m| m.range()));
    } else if let Some(caps) = patterns.month_date.captures(&text) {
        citation.date = Some(caps[1].to_string());
        text = remove_match(&text, caps.get(0).map(|m| m.range()));
    }

    let mut number_pair = None;
    if let Some(caps) = patterns.number_pair.captures(&text) {
        number_pair = Some((caps[1].to_string(), caps[2].to_string()));
        text = remove_match(&text, caps.get(0).map(|m| m.range()));
    }

    let name = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = name.trim_end_matches(',').trim();
    if name.is_empty() {
        return Err(CitationParseError::MissingName(raw.trim().to_string()));
    }
    citation.source_id = resolve_source_id(name, patterns, registry);

    if let Some((major, minor)) = number_pair {
        let has_issues = registry
            .get(&citation.source_id)
            .is_some_and(|s| s.kind.has_issues());
        if has_issues {
            citation.volume = Some(parse_number(&major, raw)?);
            citation.issue = Some(parse_number(&minor, raw)?);
        } else {
            citation.section = Some(format!("{major}.{minor}"));
        }
    }

    Ok(citation)
}

fn remove_match(text: &str, range: Option<std::ops::Range<usize>>) -> String {
    match range {
        Some(range) => format!("{} {}", &text[..range.start], &text[range.end..]),
        None => text.to_string(),
    }
}

fn resolve_source_id(name: &str, patterns: &Patterns, registry: &SourceRegistry) -> String {
    if let Some(caps) = patterns.qepa.captures(name) {
        return format!("qepa_{}", &caps[1]);
    }
    if let Some(caps) = patterns.qephom.captures(name) {
        return format!("qephom_{}", &caps[1]);
    }
    if let Some(caps) = patterns.skybox.captures(name) {
        return format!("skybox_s{}", &caps[1]);
    }
    if let Some(source) = registry.resolve_short_name(name) {
        return source.id.clone();
    }
    if registry.contains(name) {
        return name.to_string();
    }
    slugify(name)
}

/// Lowercase, with every run of non-word characters collapsed to `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() || ch == '_' {
            slug.push(ch);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

// ============================================================================
// Rendering
// ============================================================================

/// Render citations back to source-field text, renumbered from 1.
pub fn format_source_field(citations: &[Citation], registry: &SourceRegistry) -> String {
    citations
        .iter()
        .enumerate()
        .map(|(i, citation)| {
            let mut part = format!("[{}] {{{}:src}}", i + 1, format_locator(citation, registry));
            if let Some(reprint) = &citation.reprinted_in {
                part.push_str(&format!(
                    " (reprinted in {{{}:src}})",
                    format_locator(reprint, registry)
                ));
            }
            part
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_locator(citation: &Citation, registry: &SourceRegistry) -> String {
    let mut text = registry
        .get(&citation.source_id)
        .map(|s| s.citation_name().to_string())
        .unwrap_or_else(|| citation.source_id.clone());

    if let Some(section) = &citation.section {
        text.push(' ');
        text.push_str(section);
    }
    if let Some(volume) = citation.volume {
        text.push_str(&format!(" {volume}"));
        if let Some(issue) = citation.issue {
            text.push_str(&format!(".{issue}"));
        }
    }
    if let Some(start) = citation.page_start {
        let numbered = citation.section.is_some() || citation.volume.is_some();
        text.push_str(if numbered { ", p." } else { " p." });
        text.push_str(&start.to_string());
        if let Some(end) = citation.page_end {
            text.push_str(&format!("-{end}"));
        }
    }
    if let Some(date) = &citation.date {
        match patterns().ok().and_then(|p| p.iso_date.captures(date)) {
            Some(caps) => text.push_str(&format!(" {}.{}.{}", &caps[1], &caps[2], &caps[3])),
            None => text.push_str(&format!(", {date}")),
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SourceRegistry {
        SourceRegistry::from_yaml_str(
            r#"
sources:
  tkd: { name: The Klingon Dictionary, short_name: TKD, type: book }
  kgt: { name: Klingon for the Galactic Traveler, short_name: KGT, type: book, page_prefix: "p." }
  holqed: { name: HolQeD, short_name: HQ, type: journal }
  kli_mailing_list: { name: KLI mailing list, short_name: KLI mailing list, type: mailing_list }
  qepa_2018: { name: "qep'a' 25", short_name: "qep'a' 25 (2018)", type: event }
"#,
        )
        .expect("registry")
    }

    #[test]
    fn parses_sections_and_abbreviated_page_ranges() {
        let citations =
            parse_source_field("[1] {TKD 6.6:src}, [2] {KGT p.178-9:src}", &registry()).expect("parse");
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].source_id, "tkd");
        assert_eq!(citations[0].section.as_deref(), Some("6.6"));
        assert_eq!(citations[0].index, Some(1));
        assert_eq!(citations[1].source_id, "kgt");
        assert_eq!(citations[1].page_start, Some(178));
        assert_eq!(citations[1].page_end, Some(179));
    }

    #[test]
    fn journal_numbers_become_volume_and_issue() {
        let citations =
            parse_source_field("[1] {HQ 13.1, p.8-10, Mar. 2004:src}", &registry()).expect("parse");
        let c = &citations[0];
        assert_eq!(c.source_id, "holqed");
        assert_eq!((c.volume, c.issue), (Some(13), Some(1)));
        assert_eq!((c.page_start, c.page_end), (Some(8), Some(10)));
        assert_eq!(c.date.as_deref(), Some("Mar. 2004"));
        assert_eq!(c.section, None);
    }

    #[test]
    fn reprints_and_event_names() {
        let citations = parse_source_field(
            "[1] {SkyBox S27:src} (reprinted in {HQ 5.3, p.15, Sep. 1996:src})",
            &registry(),
        )
        .expect("parse");
        assert_eq!(citations[0].source_id, "skybox_s27");
        let reprint = citations[0].reprinted_in.as_deref().expect("reprint");
        assert_eq!(reprint.source_id, "holqed");
        assert_eq!(reprint.page_start, Some(15));

        let qepa = parse_source_field("[1] {qep'a' 25 (2018):src}", &registry()).expect("parse");
        assert_eq!(qepa[0].source_id, "qepa_2018");
        let qephom =
            parse_source_field("[1] {Saarbrücken qepHom'a' 2023:src}", &registry()).expect("parse");
        assert_eq!(qephom[0].source_id, "qephom_2023");
    }

    #[test]
    fn dotted_dates_become_iso() {
        let citations =
            parse_source_field("[1] {KLI mailing list 2009.07.27:src}", &registry()).expect("parse");
        assert_eq!(citations[0].source_id, "kli_mailing_list");
        assert_eq!(citations[0].date.as_deref(), Some("2009-07-27"));
    }

    #[test]
    fn bad_patterns_surface_as_errors() {
        assert!(patterns().is_ok());
        assert!(matches!(compile(r"\[(\d+"), Err(CitationParseError::Pattern(_))));
    }

    #[test]
    fn empty_and_unrecognized_fields() {
        assert!(parse_source_field("  ", &registry()).expect("empty").is_empty());
        assert!(matches!(
            parse_source_field("TKD p.5", &registry()),
            Err(CitationParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn unknown_names_fall_back_to_slug() {
        let citations =
            parse_source_field("[1] {Star Trek Online:src}", &registry()).expect("parse");
        assert_eq!(citations[0].source_id, "star_trek_online");
    }

    #[test]
    fn renders_back_to_field_text() {
        let registry = registry();
        for field in [
            "[1] {TKD 6.6:src}, [2] {KGT p.56:src}",
            "[1] {HQ 13.1, p.8-10, Mar. 2004:src}",
            "[1] {KLI mailing list 2009.07.27:src}",
            "[1] {qep'a' 25 (2018):src}",
        ] {
            let citations = parse_source_field(field, &registry).expect("parse");
            assert_eq!(format_source_field(&citations, &registry), field);
        }
    }
}
