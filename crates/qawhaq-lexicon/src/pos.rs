//! Part-of-speech strings: `v:is,1h,deriv`.
//!
//! Base pos, then comma-separated modifiers. A modifier is a homophone
//! number (`2`, or `2h` for a number hidden from display), the first
//! subtype valid for the pos, a metadata tag, or else a category.

use serde::{Deserialize, Serialize};

pub const VERB_SUBTYPES: &[&str] = &["i", "t", "is", "ambi", "i_c", "t_c", "pref", "suff"];
pub const NOUN_SUBTYPES: &[&str] = &[
    "name", "num", "pro", "body", "being", "place", "inhpl", "inhps", "plural", "suff",
];
pub const SENTENCE_SUBTYPES: &[&str] = &[
    "eu", "idiom", "mv", "nt", "phr", "prov", "Ql", "rej", "rp", "sp", "toast", "lyr", "bc",
];
pub const EXCL_SUBTYPES: &[&str] = &["epithet"];

pub const METADATA_TAGS: &[&str] = &[
    "deriv", "alt", "fic", "hyp", "extcan", "klcp1", "terran", "noanki", "nodict", "nolink",
];

pub fn subtypes_for(pos: &str) -> &'static [&'static str] {
    match pos {
        "v" => VERB_SUBTYPES,
        "n" => NOUN_SUBTYPES,
        "sen" => SENTENCE_SUBTYPES,
        "excl" => EXCL_SUBTYPES,
        _ => &[],
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartOfSpeech {
    pub pos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homophone: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden_homophone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata_tags: Vec<String>,
}

fn parse_homophone(modifier: &str) -> Option<(u32, bool)> {
    let (digits, hidden) = match modifier.strip_suffix('h') {
        Some(rest) => (rest, true),
        None => (modifier, false),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|n| (n, hidden))
}

impl PartOfSpeech {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (pos, modifiers) = match raw.split_once(':') {
            Some((pos, modifiers)) => (pos.trim(), modifiers),
            None => (raw, ""),
        };
        let mut out = PartOfSpeech {
            pos: pos.to_string(),
            ..Self::default()
        };
        let subtypes = subtypes_for(pos);
        for modifier in modifiers.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            if let Some((number, hidden)) = parse_homophone(modifier) {
                out.homophone = Some(number);
                out.hidden_homophone = hidden;
            } else if out.subtype.is_none() && subtypes.contains(&modifier) {
                out.subtype = Some(modifier.to_string());
            } else if METADATA_TAGS.contains(&modifier) {
                out.metadata_tags.push(modifier.to_string());
            } else {
                out.categories.push(modifier.to_string());
            }
        }
        out
    }

    /// `pos:homophone,subtype,categories...,tags...`
    pub fn reconstruct(&self) -> String {
        let mut modifiers: Vec<String> = Vec::new();
        if let Some(h) = self.homophone {
            modifiers.push(if self.hidden_homophone {
                format!("{h}h")
            } else {
                h.to_string()
            });
        }
        modifiers.extend(self.subtype.iter().cloned());
        modifiers.extend(self.categories.iter().cloned());
        modifiers.extend(self.metadata_tags.iter().cloned());
        if modifiers.is_empty() {
            self.pos.clone()
        } else {
            format!("{}:{}", self.pos, modifiers.join(","))
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata_tags.iter().any(|t| t == tag)
    }

    /// `entry_name:pos[:homophone]`, the key of the JSON index.
    pub fn search_name(&self, entry_name: &str) -> String {
        match self.homophone {
            Some(h) => format!("{entry_name}:{}:{h}", self.pos),
            None => format!("{entry_name}:{}", self.pos),
        }
    }

    /// `v:is` style label used in the printed E-K listing.
    pub fn label(&self) -> String {
        match &self.subtype {
            Some(subtype) => format!("{}:{subtype}", self.pos),
            None => self.pos.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifiers_by_kind() {
        let pos = PartOfSpeech::parse("v:is,1h,deriv,slang");
        assert_eq!(pos.pos, "v");
        assert_eq!(pos.subtype.as_deref(), Some("is"));
        assert_eq!(pos.homophone, Some(1));
        assert!(pos.hidden_homophone);
        assert_eq!(pos.metadata_tags, vec!["deriv"]);
        assert_eq!(pos.categories, vec!["slang"]);
    }

    #[test]
    fn subtypes_depend_on_pos() {
        assert_eq!(PartOfSpeech::parse("n:body").subtype.as_deref(), Some("body"));
        // `body` is not a verb subtype.
        let verb = PartOfSpeech::parse("v:body");
        assert_eq!(verb.subtype, None);
        assert_eq!(verb.categories, vec!["body"]);
        // A second subtype is kept as a category.
        let twice = PartOfSpeech::parse("v:t,i");
        assert_eq!(twice.subtype.as_deref(), Some("t"));
        assert_eq!(twice.categories, vec!["i"]);
    }

    #[test]
    fn reconstructs_in_canonical_order() {
        assert_eq!(PartOfSpeech::parse("v:deriv,is,2").reconstruct(), "v:2,is,deriv");
        assert_eq!(PartOfSpeech::parse("adv").reconstruct(), "adv");
        assert_eq!(PartOfSpeech::parse("n:1h,body").reconstruct(), "n:1h,body");
    }

    #[test]
    fn search_names_carry_homophone() {
        assert_eq!(PartOfSpeech::parse("v:2").search_name("Qong"), "Qong:v:2");
        assert_eq!(PartOfSpeech::parse("n:body").search_name("DoS"), "DoS:n");
    }
}
