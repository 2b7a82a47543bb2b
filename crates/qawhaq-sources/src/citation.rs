//! Structured citations and their shape check.
//!
//! A citation names a source by id plus whatever locator the source kind
//! uses: a page range for books, volume/issue for journals, a posting date
//! for mailing lists. `reprinted_in` chains a citation to the place the
//! same text was later reprinted.

use serde::{Deserialize, Serialize};

use crate::source::Source;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    #[serde(rename = "source", alias = "source_id")]
    pub source_id: String,
    /// Position in the numbered `[N]` list of the source field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_end: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprinted_in: Option<Box<Citation>>,
}

impl Citation {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Self::default()
        }
    }

    pub fn with_pages(mut self, start: u32, end: Option<u32>) -> Self {
        self.page_start = Some(start);
        self.page_end = end;
        self
    }

    pub fn with_issue(mut self, volume: u32, issue: u32) -> Self {
        self.volume = Some(volume);
        self.issue = Some(issue);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn reprinted_in(mut self, reprint: Citation) -> Self {
        self.reprinted_in = Some(Box::new(reprint));
        self
    }

    /// This citation's source id followed by every id along its reprint chain.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.source_id.as_str()];
        let mut next = self.reprinted_in.as_deref();
        while let Some(reprint) = next {
            ids.push(reprint.source_id.as_str());
            next = reprint.reprinted_in.as_deref();
        }
        ids
    }
}

/// A way a citation's locator fails to match what its source kind expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CitationIssue {
    #[error("citation of `{source_id}` has no page")]
    MissingPage { source_id: String },

    #[error("citation of journal `{source_id}` has no volume")]
    MissingVolume { source_id: String },

    #[error("citation of journal `{source_id}` has no issue")]
    MissingIssue { source_id: String },

    #[error("citation of `{source_id}` has no date")]
    MissingDate { source_id: String },

    #[error("citation of `{source_id}` has page range {start}-{end} ending before it starts")]
    InvertedPageRange {
        source_id: String,
        start: u32,
        end: u32,
    },
}

/// Check one citation (not its reprint) against the source it names.
///
/// The citation is never altered; callers keep it and report the issues.
pub fn check_citation(citation: &Citation, source: &Source) -> Vec<CitationIssue> {
    let mut issues = Vec::new();
    let source_id = || citation.source_id.clone();

    if source.requires_page() && citation.page_start.is_none() {
        issues.push(CitationIssue::MissingPage {
            source_id: source_id(),
        });
    }
    if source.kind == crate::SourceKind::Journal {
        if citation.volume.is_none() {
            issues.push(CitationIssue::MissingVolume {
                source_id: source_id(),
            });
        }
        if citation.issue.is_none() {
            issues.push(CitationIssue::MissingIssue {
                source_id: source_id(),
            });
        }
    }
    if source.kind.is_dated_feed() && citation.date.is_none() {
        issues.push(CitationIssue::MissingDate {
            source_id: source_id(),
        });
    }
    if let (Some(start), Some(end)) = (citation.page_start, citation.page_end) {
        if end < start {
            issues.push(CitationIssue::InvertedPageRange {
                source_id: source_id(),
                start,
                end,
            });
        }
    }
    issues
}
