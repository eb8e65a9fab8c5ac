//! Comment detection inside fenced code blocks.
//!
//! Only comment text is ever rewritten. Trailing comments are recognized for
//! a fixed set of language tags; any other tag leaves the code untouched
//! unless the whole line is a comment.

use super::rules::RuleSet;

/// Markers that make a whole line a comment.
const LINE_MARKERS: &[&str] = &["//", "#", "--", "*"];

const SLASH_LANGS: &[&str] = &[
    "silk", "slk", "c", "cpp", "cc", "c++", "js", "javascript", "ts", "typescript", "zig",
];

const HASH_LANGS: &[&str] = &["bash", "sh", "zsh", "fish", "toml", "yaml", "yml"];

/// Trailing-comment marker for a (lowercase) fence language tag.
pub fn trailing_marker(lang: &str) -> Option<&'static str> {
    if SLASH_LANGS.contains(&lang) {
        Some("//")
    } else if HASH_LANGS.contains(&lang) {
        Some("#")
    } else {
        None
    }
}

/// Whether the line, ignoring indentation, starts with a comment marker.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    LINE_MARKERS.iter().any(|marker| trimmed.starts_with(marker))
}

/// Byte offset of a trailing comment: the first `marker` occurrence, and only
/// when it opens the line or follows whitespace.
pub fn trailing_comment_start(line: &str, marker: &str) -> Option<usize> {
    let idx = line.find(marker)?;
    let opens = idx == 0 || line[..idx].chars().next_back().is_some_and(char::is_whitespace);
    opens.then_some(idx)
}

/// Rewrite the comment portion of one code line.
pub fn rewrite_code_line(rules: &RuleSet, line: &str, lang: Option<&str>) -> String {
    if is_comment_line(line) {
        return rewrite_to_fixpoint(rules, line);
    }

    let start = lang
        .and_then(trailing_marker)
        .and_then(|marker| trailing_comment_start(line, marker));

    match start {
        Some(idx) => {
            let (code, comment) = line.split_at(idx);
            format!("{code}{}", rewrite_to_fixpoint(rules, comment))
        }
        None => line.to_owned(),
    }
}

/// Comment rules can expose new matches once a phrase is removed
/// (`currently currently not`), so rerun until nothing changes.
fn rewrite_to_fixpoint(rules: &RuleSet, comment: &str) -> String {
    let mut current = rules.rewrite_comment(comment);
    for _ in 0..super::MAX_PASSES {
        let next = rules.rewrite_comment(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}
