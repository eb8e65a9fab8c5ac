//! Per-document metadata pulled from a markdown source.

use std::sync::LazyLock;

use regex::Regex;

/// A summary stops growing once it is longer than this.
const SUMMARY_LIMIT: usize = 220;

static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Status:|Implementation status:)\s*").expect("valid status regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[^\n]*\n").expect("valid fence regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link regex"));
static HEADING_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s*").expect("valid heading regex"));
static LIST_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\s>*-]+\s*").expect("valid list regex"));

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_owned()
}

/// Text of the first heading, unless prose comes before it.
pub fn first_heading(markdown: &str) -> Option<String> {
    for line in markdown.lines() {
        if line.starts_with('#') {
            let heading = collapse(line.trim_start_matches('#'));
            return (!heading.is_empty()).then_some(heading);
        }
        if !line.trim().is_empty() && !line.starts_with("<!--") {
            break;
        }
    }
    None
}

/// First prose paragraph, skipping code, headings, lists, tables and status
/// lines.
pub fn first_paragraph(markdown: &str) -> String {
    let mut in_code = false;
    let mut buf: Vec<&str> = Vec::new();
    let mut len = 0;

    for raw in markdown.lines() {
        let line = raw.trim_end();
        if line.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code
            || STATUS_LINE.is_match(line)
            || line.starts_with(['#', '-', '*', '|'])
        {
            continue;
        }
        if line.trim().is_empty() {
            if !buf.is_empty() {
                break;
            }
            continue;
        }

        let line = line.trim();
        len += line.len();
        buf.push(line);
        if len > SUMMARY_LIMIT {
            break;
        }
    }

    collapse(&buf.join(" "))
}

/// Markdown reduced to plain words for the search haystack.
pub fn strip_markdown(markdown: &str) -> String {
    let md = HTML_COMMENT.replace_all(markdown, " ");
    let md = FENCE_OPEN.replace_all(&md, "\n");
    let md = md.replace("```", "\n");
    let md = INLINE_CODE.replace_all(&md, "$1");
    let md = LINK.replace_all(&md, "$1");
    let md = HEADING_MARK.replace_all(&md, "");
    let md = LIST_MARK.replace_all(&md, "");
    let md = md
        .replace("**", "")
        .replace("__", "")
        .replace(['*', '_'], "")
        .replace('|', " ");
    collapse(&md)
}

/// `hello-world` → `Hello World`, for documents without a heading.
pub fn title_from_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut prev_cased = false;
    for ch in stem.chars() {
        let ch = if ch == '-' || ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(ch);
            prev_cased = false;
        }
    }
    out
}

/// Section of a collection-relative file: its first directory, or
/// `overview` for top-level files.
pub fn section_of(file: &str) -> &str {
    match file.split_once('/') {
        Some((section, _)) => section,
        None => crate::manifest::DEFAULT_SECTION,
    }
}
