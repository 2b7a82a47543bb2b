use qawhaq_sources::Citation;
use serde::{Deserialize, Serialize};

use crate::scan;

/// Pos subtype of stative verbs, glossed in English as "be X".
pub const STATIVE_SUBTYPE: &str = "is";

/// The part-of-speech facts the parser and generator care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosContext<'a> {
    pub pos: &'a str,
    pub subtype: Option<&'a str>,
}

impl<'a> PosContext<'a> {
    pub fn new(pos: &'a str, subtype: Option<&'a str>) -> Self {
        Self { pos, subtype }
    }

    pub fn stative() -> Self {
        Self {
            pos: "v",
            subtype: Some(STATIVE_SUBTYPE),
        }
    }

    pub fn is_stative(&self) -> bool {
        self.subtype == Some(STATIVE_SUBTYPE)
    }
}

// ============================================================================
// Definition
// ============================================================================

/// One sense of a gloss.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    /// Explicit sort key, used verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_keyword: Option<String>,
}

impl DefinitionPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_sort_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.sort_keyword = Some(keyword.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Definition {
    pub parts: Vec<DefinitionPart>,
    /// Qualifier applying to every part, rendered once at the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_parenthetical: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_permute: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dedup: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub etc_suffix: bool,
}

impl Definition {
    pub fn from_parts(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            parts: parts.into_iter().map(|p| DefinitionPart::new(p)).collect(),
            ..Self::default()
        }
    }

    /// A definition that is one unsplit part.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            parts: vec![DefinitionPart::new(text)],
            ..Self::default()
        }
    }

    pub fn with_global_parenthetical(mut self, paren: impl Into<String>) -> Self {
        self.global_parenthetical = Some(paren.into());
        self
    }

    pub fn guarded(mut self) -> Self {
        self.no_permute = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part_texts(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }

    /// A gloss that only points at another entry (`{ghItlh:v}`).
    pub fn is_reference(&self) -> bool {
        match self.parts.as_slice() {
            [only] => {
                let text = only.text.trim();
                text.starts_with('{') && text.ends_with('}') && self.global_parenthetical.is_none()
            }
            _ => false,
        }
    }

    /// Separator that keeps the parts recoverable by the parser: `", "`,
    /// or `"; "` when some part has a comma of its own.
    pub fn join_separator(&self) -> &'static str {
        let inner_comma = self.parts.len() > 1
            && self.parts.iter().any(|p| scan::has_top_level(&p.text, ','));
        if inner_comma {
            "; "
        } else {
            ", "
        }
    }

    /// The single display string: parts joined in order, then the global
    /// parenthetical in parentheses.
    pub fn flatten(&self) -> String {
        let mut out = self.part_texts().join(self.join_separator());
        if let Some(paren) = &self.global_parenthetical {
            out.push_str(" (");
            out.push_str(paren);
            out.push(')');
        }
        out
    }

    /// Every citation attached to any part.
    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.parts.iter().flat_map(|p| p.citations.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_appends_global_parenthetical_once() {
        let def = Definition::from_parts(["fire", "energize"]).with_global_parenthetical("e.g., thrusters");
        assert_eq!(def.flatten(), "fire, energize (e.g., thrusters)");
    }

    #[test]
    fn flatten_uses_semicolons_when_a_part_has_its_own_comma() {
        let def = Definition::from_parts([
            "travel with a purpose, for a specific reason",
            "travel on a mission",
        ]);
        assert_eq!(
            def.flatten(),
            "travel with a purpose, for a specific reason; travel on a mission"
        );

        let bracketed = Definition::from_parts(["core (e.g., of apple)", "pit"]);
        assert_eq!(bracketed.flatten(), "core (e.g., of apple), pit");
    }

    #[test]
    fn reference_definitions() {
        assert!(Definition::single("{ghItlh:v}").is_reference());
        assert!(!Definition::single("write").is_reference());
        assert!(!Definition::from_parts(["{a:n}", "{b:n}"]).is_reference());
    }

    #[test]
    fn stative_context() {
        assert!(PosContext::stative().is_stative());
        assert!(!PosContext::new("v", Some("t")).is_stative());
        assert!(!PosContext::new("n", None).is_stative());
    }
}
