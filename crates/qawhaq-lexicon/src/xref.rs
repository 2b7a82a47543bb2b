//! Inline cross-reference tokens.
//!
//! `{name:pos:flags}` links to an entry. The second field may instead name
//! a non-link type (`src` attributions, `url` links). Flags are
//! comma-separated: a homophone number (`2`, `2h`), `nolink` for an
//! intentional unlinked mention, and display flags the validator ignores.
//! Sentence tokens list their components after `@@`:
//! `{jIyajbe':sen@@jI-:v, yaj:v, -be':v}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Link,
    Source,
    Url,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefToken {
    /// Text between the braces.
    pub raw: String,
    pub name: String,
    pub pos: Option<String>,
    pub flags: Vec<String>,
    pub kind: TokenKind,
    pub components: Vec<RefToken>,
}

impl RefToken {
    /// Parse the inside of one `{...}`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (head, tail) = match raw.split_once("@@") {
            Some((head, tail)) => (head, Some(tail)),
            None => (raw, None),
        };

        let mut fields = head.split(':');
        let name = fields.next().unwrap_or_default().trim().to_string();
        let rest: Vec<&str> = fields.map(str::trim).collect();

        let kind = if rest.contains(&"src") {
            TokenKind::Source
        } else if rest.contains(&"url") {
            TokenKind::Url
        } else {
            TokenKind::Link
        };

        let pos = rest.first().filter(|p| !p.is_empty()).map(|p| p.to_string());
        let flags = rest
            .get(1)
            .map(|f| {
                f.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let components = tail
            .map(|tail| {
                tail.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(RefToken::parse)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            raw: raw.to_string(),
            name,
            pos,
            flags,
            kind,
            components,
        }
    }

    pub fn is_link(&self) -> bool {
        self.kind == TokenKind::Link
    }

    pub fn is_nolink(&self) -> bool {
        self.flags.iter().any(|f| f == "nolink")
    }

    /// Homophone number from the flags; `Some(0)` means all homophones.
    pub fn homophone(&self) -> Option<u32> {
        self.flags.iter().find_map(|flag| {
            let digits = flag.strip_suffix('h').unwrap_or(flag);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                digits.parse().ok()
            } else {
                None
            }
        })
    }

    pub fn display(&self) -> String {
        format!("{{{}}}", self.raw)
    }
}

/// Every `{...}` token in `text`, in order.
pub fn scan_tokens(text: &str) -> Vec<RefToken> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let inner = &after[..close];
        if !inner.trim().is_empty() {
            tokens.push(RefToken::parse(inner));
        }
        rest = &after[close + 1..];
    }
    tokens
}

/// Tokens of one relation-list item. An item without braces is a
/// comma-separated list of bare `name:pos` references.
pub fn relation_tokens(item: &str) -> Vec<RefToken> {
    if item.contains('{') {
        scan_tokens(item)
    } else if item.contains("@@") {
        vec![RefToken::parse(item)]
    } else {
        split_bare_references(item)
            .into_iter()
            .map(|s| RefToken::parse(&s))
            .collect()
    }
}

/// A piece without `:` right after a reference that already has a flags
/// field is one more flag (`Qong:v:2h,nolink`), not a new reference.
fn split_bare_references(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for piece in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match refs.last_mut() {
            Some(last) if !piece.contains(':') && last.matches(':').count() >= 2 => {
                last.push(',');
                last.push_str(piece);
            }
            _ => refs.push(piece.to_string()),
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_pos_and_flags() {
        let token = RefToken::parse("Qong:v:2h,nolink");
        assert_eq!(token.name, "Qong");
        assert_eq!(token.pos.as_deref(), Some("v"));
        assert_eq!(token.homophone(), Some(2));
        assert!(token.is_nolink());
        assert!(token.is_link());
    }

    #[test]
    fn source_and_url_tokens_are_not_links() {
        let tokens = scan_tokens("see {TKD p.56:src} and {http://example.org:url}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Source);
        assert_eq!(tokens[1].kind, TokenKind::Url);
    }

    #[test]
    fn sentence_components_follow_double_at() {
        let token = RefToken::parse("jIyajbe':sen@@jI-:v, yaj:v, -be':v");
        assert_eq!(token.pos.as_deref(), Some("sen"));
        let names: Vec<_> = token.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["jI-", "yaj", "-be'"]);
    }

    #[test]
    fn scans_in_order_and_skips_unterminated() {
        let tokens = scan_tokens("{a:n}, {b:v} and {broken");
        let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn bare_relation_items_are_tokens() {
        let tokens = relation_tokens("Qot:v");
        assert_eq!(tokens[0].name, "Qot");
        assert_eq!(tokens[0].pos.as_deref(), Some("v"));
        assert!(relation_tokens(" ").is_empty());
        assert!(RefToken::parse("ghIt").pos.is_none());
    }

    #[test]
    fn bare_relation_text_splits_on_commas() {
        let tokens = relation_tokens("Qot:v, ghIt:n");
        let refs: Vec<_> = tokens
            .iter()
            .map(|t| (t.name.as_str(), t.pos.as_deref()))
            .collect();
        assert_eq!(refs, vec![("Qot", Some("v")), ("ghIt", Some("n"))]);

        let flagged = relation_tokens("Qong:v:2h,nolink, vuS:v");
        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].homophone(), Some(2));
        assert!(flagged[0].is_nolink());
        assert_eq!(flagged[1].name, "vuS");
    }
}
