use serde::{Deserialize, Serialize};

use crate::citation::Citation;

/// What kind of publication or event a source is.
///
/// The kind decides which locator fields a citation into it must carry
/// (see [`crate::check_citation`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Book,
    Journal,
    Event,
    Media,
    MailingList,
    Newsgroup,
    Audio,
    Game,
    TvShow,
    Magazine,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Book => "book",
            SourceKind::Journal => "journal",
            SourceKind::Event => "event",
            SourceKind::Media => "media",
            SourceKind::MailingList => "mailing_list",
            SourceKind::Newsgroup => "newsgroup",
            SourceKind::Audio => "audio",
            SourceKind::Game => "game",
            SourceKind::TvShow => "tv_show",
            SourceKind::Magazine => "magazine",
        }
    }

    /// Volume/issue numbering (`HQ 13.1`) rather than a section (`TKD 6.6`).
    pub fn has_issues(self) -> bool {
        matches!(self, SourceKind::Journal | SourceKind::Magazine)
    }

    /// Citations are identified by posting date.
    pub fn is_dated_feed(self) -> bool {
        matches!(self, SourceKind::MailingList | SourceKind::Newsgroup)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citation target.
///
/// In `sources.yaml` the id is the map key; [`crate::SourceRegistry`] fills
/// `id` in from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "name")]
    pub display_name: String,
    /// Abbreviation used inside `{...:src}` tokens (`TKD`, `HQ`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: SourceKind,

    // Books
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set when citations into this book are by page (`p.`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_prefix: Option<String>,

    // Books and events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,

    // Events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Where this source was reprinted, with the reprint's own locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprinted_in: Option<Citation>,
}

impl Source {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            short_name: None,
            kind,
            author: None,
            page_prefix: None,
            year: None,
            location: None,
            reprinted_in: None,
        }
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn with_page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.page_prefix = Some(prefix.into());
        self
    }

    pub fn with_reprint(mut self, reprint: Citation) -> Self {
        self.reprinted_in = Some(reprint);
        self
    }

    /// Name used when rendering a citation back to text.
    pub fn citation_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.display_name)
    }

    pub fn requires_page(&self) -> bool {
        self.kind == SourceKind::Book && self.page_prefix.is_some()
    }
}
