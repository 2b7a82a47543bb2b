//! Definition parser: gloss text → ordered parts.
//!
//! Splitting rules, in order:
//! - guard openers (creature descriptions, interjections, ...) are never split
//! - unbalanced brackets are never split and get a review flag
//! - a sentence without `,`/`;` and a pure `{...}` reference stay whole
//! - top-level `;` separates alternative glosses; when present, each group is
//!   one part with its commas kept
//! - otherwise top-level `,` separates parts, unless the pieces read as an
//!   enumeration (`sink for cleaning hands, face, food, etc.`)
//!
//! Anything the rules cannot split confidently becomes one part. The parser
//! under-decomposes; it never drops text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Definition, DefinitionPart, PosContext};
use crate::scan;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    UnbalancedBrackets,
    /// Commas that look like list items inside one sense.
    Enumeration,
    /// A trailing `(...)` that may qualify the last part or every part.
    TrailingParenthetical,
}

impl ReviewReason {
    pub fn describe(self) -> &'static str {
        match self {
            ReviewReason::UnbalancedBrackets => "unbalanced brackets, kept as one part",
            ReviewReason::Enumeration => "comma list read as an enumeration, kept as one part",
            ReviewReason::TrailingParenthetical => "trailing parenthetical may belong to the last part only",
        }
    }
}

/// A gloss the parser kept whole because it could not split it confidently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewFlag {
    pub reason: ReviewReason,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub definition: Definition,
    pub flags: Vec<ReviewFlag>,
}

impl ParseOutcome {
    fn clean(definition: Definition) -> Self {
        Self {
            definition,
            flags: Vec::new(),
        }
    }

    fn flagged(definition: Definition, reason: ReviewReason, text: &str) -> Self {
        Self {
            definition,
            flags: vec![ReviewFlag {
                reason,
                text: text.to_string(),
            }],
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.flags.is_empty()
    }
}

// ============================================================================
// Heuristic tables
// ============================================================================

const GUARD_OPENERS: &[&str] = &[
    // creature descriptions carry their own commas
    "bird ",
    "a bird ",
    "a creature ",
    "bird with ",
    "bird capable ",
    "a kind of bird",
    "sink for ",
    // interjections
    "good news,",
    "expletive,",
    "stop,",
    "uh,",
    "well,",
    // bracketed lists
    "end (of stick,",
    "end (of rope,",
    "end (of handle,",
    // would permute into redundant have/be pairs
    "have a tattoo",
    "be positively charged",
    "be negatively charged",
];

const LIST_PREPOSITIONS: &[&str] = &["for", "of", "with", "about", "including", "such as", "like"];

const GLOBAL_INDICATORS: &[&str] = &[
    "e.g.,",
    "i.e.,",
    "used in",
    "referring to",
    "for example",
    "in math",
    "in physics",
    "astronomy",
    "economics",
    "trigonometry",
    "general term",
    "verb type",
];

const DEDUP_PAIRS: &[(&str, &str)] = &[("be cooperative", "cooperate"), ("die", "dice")];

const DEDUP_SKIP_OPENERS: &[&str] = &["be ", "in ", "a ", "an ", "the ", "under", "area ", "dis"];

pub fn is_guard_case(text: &str) -> bool {
    let lower = text.to_lowercase();
    GUARD_OPENERS.iter().any(|opener| lower.starts_with(opener))
}

fn has_etc_suffix(text: &str) -> bool {
    text.ends_with(", etc.") || text.ends_with(" etc.")
}

fn mentions_etc(piece: &str) -> bool {
    piece
        .split_whitespace()
        .any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).eq_ignore_ascii_case("etc"))
}

/// Pieces of one comma group that read as items of a list rather than
/// alternative glosses.
fn looks_like_item_list(pieces: &[&str]) -> bool {
    if pieces.len() <= 1 {
        return false;
    }
    if pieces.iter().any(|p| mentions_etc(p)) {
        return true;
    }
    let short = pieces
        .iter()
        .filter(|p| p.split_whitespace().count() == 1 && p.len() < 10)
        .count();
    let first = pieces[0].to_lowercase();
    let opens_list = LIST_PREPOSITIONS
        .iter()
        .any(|prep| first.contains(&format!(" {prep} ")));
    opens_list && short + 1 >= pieces.len()
}

/// How the trailing `(...)` of the last part is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrailingReading {
    /// Qualifies every part: the only bracket, and it opens with a qualifier.
    Global,
    /// Taken as global on weaker evidence (a one-word last part).
    LikelyGlobal,
    /// Left on the last part.
    LikelyLocal,
}

/// `None` when the gloss has a single part, where the question never arises.
fn read_trailing_parenthetical(text: &str, parts: &[String], base: &str, paren: &str) -> Option<TrailingReading> {
    if parts.len() <= 1 {
        return None;
    }
    let sole_bracket = scan::count_paren_clauses(text) == 1
        && !base.contains('(')
        && !parts[..parts.len() - 1].iter().any(|p| p.contains('('));
    if !sole_bracket {
        return Some(TrailingReading::LikelyLocal);
    }
    let paren = paren.to_lowercase();
    if GLOBAL_INDICATORS.iter().any(|i| paren.contains(i)) {
        return Some(TrailingReading::Global);
    }
    if !base.is_empty() && !base.contains(' ') {
        return Some(TrailingReading::LikelyGlobal);
    }
    Some(TrailingReading::LikelyLocal)
}

/// Two-part glosses that would sort next to each other (`actor, actress`).
pub fn should_dedup(parts: &[&str], pos: PosContext<'_>) -> bool {
    let [first, second] = parts else {
        return false;
    };
    let p0 = first.trim().to_lowercase();
    let p1 = second.trim().to_lowercase();

    if DEDUP_PAIRS
        .iter()
        .any(|(a, b)| (p0 == *a && p1 == *b) || (p0 == *b && p1 == *a))
    {
        return true;
    }

    let shared_prefix = |n: usize| {
        p0.chars().count() >= n && p1.chars().count() >= n && p0.chars().take(n).eq(p1.chars().take(n))
    };
    if pos.is_stative() || p0.starts_with("be ") {
        return shared_prefix(7);
    }
    if DEDUP_SKIP_OPENERS.iter().any(|o| p0.starts_with(o)) {
        return false;
    }
    shared_prefix(3)
}

// ============================================================================
// Parser
// ============================================================================

pub fn parse_definition(text: &str, pos: PosContext<'_>) -> ParseOutcome {
    let text = text.trim();
    if text.is_empty() {
        return ParseOutcome::default();
    }
    let etc_suffix = has_etc_suffix(text);
    let whole = |no_permute: bool| Definition {
        parts: vec![DefinitionPart::new(text)],
        no_permute,
        etc_suffix,
        ..Definition::default()
    };

    if is_guard_case(text) {
        debug!(text, "guard opener, not splitting");
        return ParseOutcome::clean(whole(true));
    }
    if !scan::is_balanced(text) {
        return ParseOutcome::flagged(whole(false), ReviewReason::UnbalancedBrackets, text);
    }
    let is_sentence = text.ends_with(&['.', '!', '?'][..]) && !text.contains(&[',', ';'][..]);
    let is_reference = text.starts_with('{') && text.ends_with('}');
    if is_sentence || is_reference {
        return ParseOutcome::clean(whole(false));
    }

    let groups = scan::split_top_level(text, ';');
    let mut raw_parts: Vec<String> = Vec::new();
    let mut flags = Vec::new();
    for group in &groups {
        let pieces = scan::split_top_level(group, ',');
        if pieces.len() <= 1 || groups.len() > 1 {
            raw_parts.push((*group).to_string());
        } else if looks_like_item_list(&pieces) {
            flags.push(ReviewFlag {
                reason: ReviewReason::Enumeration,
                text: (*group).to_string(),
            });
            raw_parts.push((*group).to_string());
        } else {
            raw_parts.extend(pieces.iter().map(|p| p.to_string()));
        }
    }

    let mut global_parenthetical = None;
    let trailing = raw_parts.last().and_then(|last| {
        let (base, paren) = scan::trailing_parenthetical(last)?;
        let reading = read_trailing_parenthetical(text, &raw_parts, base, paren)?;
        Some((reading, base.to_string(), paren.to_string()))
    });
    if let Some((reading, base, paren)) = trailing {
        if reading != TrailingReading::Global {
            flags.push(ReviewFlag {
                reason: ReviewReason::TrailingParenthetical,
                text: text.to_string(),
            });
        }
        if reading != TrailingReading::LikelyLocal {
            debug!(text, paren = paren.as_str(), "global parenthetical");
            global_parenthetical = Some(paren);
            if let Some(slot) = raw_parts.last_mut() {
                *slot = base;
            }
        }
    }
    raw_parts.retain(|p| !p.is_empty());

    let dedup = {
        let texts: Vec<&str> = raw_parts.iter().map(String::as_str).collect();
        should_dedup(&texts, pos)
    };

    ParseOutcome {
        definition: Definition {
            parts: raw_parts.into_iter().map(DefinitionPart::new).collect(),
            global_parenthetical,
            no_permute: false,
            dedup,
            etc_suffix,
        },
        flags,
    }
}
