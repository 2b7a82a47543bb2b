//! Bracket-aware scanning over gloss text.
//!
//! All helpers treat `(...)`, `{...}` and `[...]` as paired brackets; a
//! delimiter is *top-level* only when it sits outside every pair.

fn opens(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '{' => Some('}'),
        '[' => Some(']'),
        _ => None,
    }
}

fn is_close(ch: char) -> bool {
    matches!(ch, ')' | '}' | ']')
}

/// `true` when every bracket is closed by its own kind, in order.
pub(crate) fn is_balanced(text: &str) -> bool {
    let mut stack: Vec<char> = Vec::new();
    for ch in text.chars() {
        if let Some(close) = opens(ch) {
            stack.push(close);
        } else if is_close(ch) && stack.pop() != Some(ch) {
            return false;
        }
    }
    stack.is_empty()
}

/// Split on a top-level delimiter. Pieces are trimmed; empty pieces are dropped.
pub(crate) fn split_top_level(text: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut depth: i32 = 0;
    for (idx, ch) in text.char_indices() {
        if opens(ch).is_some() {
            depth += 1;
        } else if is_close(ch) {
            depth -= 1;
        } else if ch == delim && depth == 0 {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn has_top_level(text: &str, delim: char) -> bool {
    let mut depth: i32 = 0;
    for ch in text.chars() {
        if opens(ch).is_some() {
            depth += 1;
        } else if is_close(ch) {
            depth -= 1;
        } else if ch == delim && depth == 0 {
            return true;
        }
    }
    false
}

/// Number of top-level `( ... )` clauses.
pub(crate) fn count_paren_clauses(text: &str) -> usize {
    let mut depth: i32 = 0;
    let mut count = 0usize;
    for ch in text.chars() {
        match ch {
            '(' | '{' | '[' => {
                if ch == '(' && depth == 0 {
                    count += 1;
                }
                depth += 1;
            }
            ')' | '}' | ']' => depth -= 1,
            _ => {}
        }
    }
    count
}

/// Split `"energize (e.g., thrusters)"` into `("energize", "e.g., thrusters")`.
///
/// Returns `None` unless the text ends with a closing paren whose match is
/// found inside the text.
pub(crate) fn trailing_parenthetical(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_end();
    if !text.ends_with(')') {
        return None;
    }
    let mut depth: i32 = 0;
    for (idx, ch) in text.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    let before = text[..idx].trim();
                    let inside = text[idx + 1..text.len() - 1].trim();
                    return Some((before, inside));
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove every `( ... )` clause and collapse the surrounding whitespace.
pub(crate) fn strip_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth: usize = 0;
    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                out.push(' ');
            }
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
