//! Definitions as curators write them.
//!
//! A definition is either a bare string, parsed on every build, or a
//! structured block whose `parts` (when present) are taken as authored.
//! Flags on the block always win over what the parser would infer.

use serde::{Deserialize, Serialize};

use crate::model::{Definition, DefinitionPart, PosContext};
use crate::parser::{parse_definition, ParseOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DefinitionSource {
    Text(String),
    Structured(StructuredDefinition),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredDefinition {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<DefinitionPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_parenthetical: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_permute: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dedup: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub etc_suffix: bool,
}

impl Default for DefinitionSource {
    fn default() -> Self {
        DefinitionSource::Text(String::new())
    }
}

impl From<&str> for DefinitionSource {
    fn from(text: &str) -> Self {
        DefinitionSource::Text(text.to_string())
    }
}

impl DefinitionSource {
    /// The gloss as a single string.
    pub fn text(&self) -> String {
        match self {
            DefinitionSource::Text(text) => text.clone(),
            DefinitionSource::Structured(block) if block.text.trim().is_empty() => {
                block.as_authored().map(|d| d.flatten()).unwrap_or_default()
            }
            DefinitionSource::Structured(block) => block.text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Resolve to a structured definition, parsing when no parts were authored.
    pub fn resolve(&self, pos: PosContext<'_>) -> ParseOutcome {
        match self {
            DefinitionSource::Text(text) => parse_definition(text, pos),
            DefinitionSource::Structured(block) => block.resolve(pos),
        }
    }
}

impl StructuredDefinition {
    fn as_authored(&self) -> Option<Definition> {
        if self.parts.is_empty() {
            return None;
        }
        Some(Definition {
            parts: self.parts.clone(),
            global_parenthetical: self.global_parenthetical.clone(),
            no_permute: self.no_permute,
            dedup: self.dedup,
            etc_suffix: self.etc_suffix,
        })
    }

    fn resolve(&self, pos: PosContext<'_>) -> ParseOutcome {
        if let Some(definition) = self.as_authored() {
            return ParseOutcome {
                definition,
                flags: Vec::new(),
            };
        }

        let text = self.text.trim();
        if self.no_permute {
            if text.is_empty() {
                return ParseOutcome::default();
            }
            let mut definition = Definition::single(text).guarded();
            definition.global_parenthetical = self.global_parenthetical.clone();
            definition.dedup = self.dedup;
            definition.etc_suffix = self.etc_suffix || text.ends_with("etc.");
            return ParseOutcome {
                definition,
                flags: Vec::new(),
            };
        }

        let mut outcome = parse_definition(text, pos);
        let definition = &mut outcome.definition;
        definition.dedup |= self.dedup;
        definition.etc_suffix |= self.etc_suffix;
        if definition.global_parenthetical.is_none() {
            definition.global_parenthetical = self.global_parenthetical.clone();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_is_parsed() {
        let source: DefinitionSource = serde_yaml::from_str("flap, flutter, wave").expect("yaml");
        let out = source.resolve(PosContext::default());
        assert_eq!(out.definition.part_texts(), vec!["flap", "flutter", "wave"]);
    }

    #[test]
    fn authored_parts_are_used_verbatim() {
        let yaml = r#"
text: travel with a purpose, for a specific reason; travel on a mission
parts:
  - text: travel with a purpose, for a specific reason
  - text: travel on a mission
    sort_keyword: mission
"#;
        let source: DefinitionSource = serde_yaml::from_str(yaml).expect("yaml");
        let out = source.resolve(PosContext::default());
        assert_eq!(out.definition.parts.len(), 2);
        assert_eq!(out.definition.parts[1].sort_keyword.as_deref(), Some("mission"));
        assert_eq!(
            source.text(),
            "travel with a purpose, for a specific reason; travel on a mission"
        );
    }

    #[test]
    fn no_permute_block_is_never_split() {
        let yaml = "text: flap, flutter, wave\nno_permute: true\n";
        let source: DefinitionSource = serde_yaml::from_str(yaml).expect("yaml");
        let out = source.resolve(PosContext::default());
        assert!(out.definition.no_permute);
        assert_eq!(out.definition.part_texts(), vec!["flap, flutter, wave"]);
    }

    #[test]
    fn block_flags_are_merged_into_parsed_text() {
        let yaml = "text: flap, flutter\ndedup: true\n";
        let source: DefinitionSource = serde_yaml::from_str(yaml).expect("yaml");
        let out = source.resolve(PosContext::default());
        assert!(out.definition.dedup);
        assert_eq!(out.definition.parts.len(), 2);
    }
}
