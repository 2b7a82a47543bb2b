//! Build report: every problem found in one run, keyed by entry slug.
//!
//! Nothing in a build fails fast. Each stage appends findings here and the
//! run completes; records dropped from output are listed in `excluded`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const BUILD_REPORT_VERSION: &str = "build_report_v1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    ParseAmbiguity,
    UnknownSource,
    UnresolvedReference,
    MalformedCitation,
    PermutationCollision,
    LoadError,
    MissingField,
    DuplicateSlug,
    DuplicateSearchName,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::ParseAmbiguity => "parse_ambiguity",
            FindingKind::UnknownSource => "unknown_source",
            FindingKind::UnresolvedReference => "unresolved_reference",
            FindingKind::MalformedCitation => "malformed_citation",
            FindingKind::PermutationCollision => "permutation_collision",
            FindingKind::LoadError => "load_error",
            FindingKind::MissingField => "missing_field",
            FindingKind::DuplicateSlug => "duplicate_slug",
            FindingKind::DuplicateSearchName => "duplicate_search_name",
        }
    }

    pub fn default_level(self) -> Level {
        match self {
            FindingKind::UnknownSource | FindingKind::LoadError | FindingKind::DuplicateSlug => {
                Level::Error
            }
            FindingKind::PermutationCollision => Level::Info,
            _ => Level::Warning,
        }
    }
}

/// Why a cross-reference token did not resolve to exactly one entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    Missing,
    AmbiguousHomophone,
    AmbiguousPos,
}

impl UnresolvedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            UnresolvedReason::Missing => "missing",
            UnresolvedReason::AmbiguousHomophone => "ambiguous_homophone",
            UnresolvedReason::AmbiguousPos => "ambiguous_pos",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub level: Level,
    pub kind: FindingKind,
    /// Owning record: an entry slug, or `note:<id>` / `example:<id>`.
    pub slug: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnresolvedReason>,
}

impl Finding {
    pub fn new(kind: FindingKind, slug: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: kind.default_level(),
            kind,
            slug: slug.into(),
            message: message.into(),
            token: None,
            source_id: None,
            reason: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_reason(mut self, reason: UnresolvedReason) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// A record left out of every output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Excluded {
    pub slug: String,
    pub kind: FindingKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildReport {
    pub version: String,
    pub summary: ReportSummary,
    pub findings: Vec<Finding>,
    pub excluded: Vec<Excluded>,
}

impl Default for BuildReport {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl BuildReport {
    pub fn new(findings: Vec<Finding>, excluded: Vec<Excluded>) -> Self {
        let mut summary = ReportSummary::default();
        for f in &findings {
            match f.level {
                Level::Error => summary.error_count += 1,
                Level::Warning => summary.warning_count += 1,
                Level::Info => summary.info_count += 1,
            }
        }
        Self {
            version: BUILD_REPORT_VERSION.to_string(),
            summary,
            findings,
            excluded,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.error_count > 0
    }

    pub fn by_slug(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut out: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for f in &self.findings {
            out.entry(f.slug.as_str()).or_default().push(f);
        }
        out
    }

    pub fn by_kind(&self) -> BTreeMap<FindingKind, Vec<&Finding>> {
        let mut out: BTreeMap<FindingKind, Vec<&Finding>> = BTreeMap::new();
        for f in &self.findings {
            out.entry(f.kind).or_default().push(f);
        }
        out
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn is_excluded(&self, slug: &str) -> bool {
        self.excluded.iter().any(|e| e.slug == slug)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("build report\n");
        out.push_str(&format!(
            "  summary: errors={} warnings={} infos={}\n",
            self.summary.error_count, self.summary.warning_count, self.summary.info_count
        ));

        if self.findings.is_empty() && self.excluded.is_empty() {
            out.push_str("  (no findings)\n");
            return out;
        }

        let mut by_level: BTreeMap<Level, Vec<&Finding>> = BTreeMap::new();
        for f in &self.findings {
            by_level.entry(f.level).or_default().push(f);
        }
        for (level, items) in by_level {
            out.push_str(&format!("\n{}\n", level.as_str()));
            for f in items {
                let mut ctx = String::new();
                if let Some(token) = &f.token {
                    ctx.push_str(&format!(" token={token}"));
                }
                if let Some(source) = &f.source_id {
                    ctx.push_str(&format!(" source={source}"));
                }
                if let Some(reason) = f.reason {
                    ctx.push_str(&format!(" reason={}", reason.as_str()));
                }
                out.push_str(&format!(
                    "  - [{}] {}: {}{}\n",
                    f.slug,
                    f.kind.as_str(),
                    f.message,
                    ctx
                ));
            }
        }

        if !self.excluded.is_empty() {
            out.push_str("\nexcluded\n");
            for e in &self.excluded {
                out.push_str(&format!("  - {} ({}): {}\n", e.slug, e.kind.as_str(), e.reason));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BuildReport {
        BuildReport::new(
            vec![
                Finding::new(FindingKind::UnknownSource, "Qong_v", "unknown source `xyz`")
                    .with_source_id("xyz"),
                Finding::new(FindingKind::UnresolvedReference, "Qong_v", "no entry for {Qot:n}")
                    .with_token("{Qot:n}")
                    .with_reason(UnresolvedReason::Missing),
                Finding::new(FindingKind::PermutationCollision, "DIr_n", "suppressed"),
            ],
            vec![Excluded {
                slug: "Qong_v".to_string(),
                kind: FindingKind::UnknownSource,
                reason: "cites unknown source `xyz`".to_string(),
            }],
        )
    }

    #[test]
    fn summary_counts_levels() {
        let report = sample();
        assert_eq!(report.summary.error_count, 1);
        assert_eq!(report.summary.warning_count, 1);
        assert_eq!(report.summary.info_count, 1);
        assert!(report.has_errors());
        assert!(report.is_excluded("Qong_v"));
    }

    #[test]
    fn groups_by_slug_and_kind() {
        let report = sample();
        assert_eq!(report.by_slug()["Qong_v"].len(), 2);
        assert_eq!(report.by_kind()[&FindingKind::PermutationCollision].len(), 1);
    }

    #[test]
    fn json_uses_snake_case_kinds() {
        let json = sample().to_json().expect("json");
        assert!(json.contains("\"unresolved_reference\""));
        assert!(json.contains("\"level\": \"error\""));
        assert!(json.contains("\"reason\": \"missing\""));
    }

    #[test]
    fn text_lists_excluded_records() {
        let text = sample().render_text();
        assert!(text.contains("summary: errors=1 warnings=1 infos=1"));
        assert!(text.contains("[Qong_v] unknown_source"));
        assert!(text.contains("excluded\n  - Qong_v (unknown_source)"));
    }
}
