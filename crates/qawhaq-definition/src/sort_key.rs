use crate::model::{DefinitionPart, PosContext};
use crate::scan;

const ARTICLES: &[&str] = &["a", "an", "the"];

/// The word or phrase a part is alphabetized under in the E-K index.
///
/// 1. an explicit `sort_keyword`, verbatim
/// 2. for stative verbs, the text after a leading `be `
/// 3. the first word, skipping articles, with brackets and trailing
///    punctuation trimmed
///
/// Parenthetical clauses are ignored for 2 and 3. Case is preserved.
pub fn sort_key(part: &DefinitionPart, pos: PosContext<'_>) -> String {
    if let Some(keyword) = &part.sort_keyword {
        return keyword.clone();
    }
    let text = scan::strip_parentheticals(&part.text);

    if pos.is_stative() {
        if let Some(rest) = text.strip_prefix("be ") {
            let rest = rest.trim();
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }

    text.split_whitespace()
        .map(trim_token)
        .filter(|w| !w.is_empty())
        .find(|w| !ARTICLES.contains(&w.to_lowercase().as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| part.text.trim().to_string())
}

fn trim_token(word: &str) -> &str {
    word.trim_start_matches(|c: char| matches!(c, '{' | '[' | '(' | '"'))
        .trim_end_matches(|c: char| matches!(c, '}' | ']' | ')' | '"' | ',' | ';' | ':' | '.' | '!' | '?'))
}

/// `be hostile` → `hostile`; other text unchanged.
pub fn strip_be(text: &str) -> &str {
    text.strip_prefix("be ").map(str::trim).unwrap_or(text)
}
