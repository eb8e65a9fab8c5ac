//! Reader chrome around the document: navigation list, previous/next links
//! and search results.

use std::fmt::Write;

use crate::render::escape_html;

/// Display name of a manifest section.
pub fn humanize_section(name: &str) -> String {
    match name {
        "" => "Docs".to_owned(),
        "overview" => "Start".to_owned(),
        "ai" => "AI".to_owned(),
        "mcp" => "MCP".to_owned(),
        "api" | "apis" => "APIs".to_owned(),
        "std" => "Standard library".to_owned(),
        _ => capitalize_words(&name.replace(['-', '_'], " ")),
    }
}

/// Uppercase every ASCII word character that follows a non-word character.
fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_word = false;
    for ch in text.chars() {
        let word = ch.is_ascii_alphanumeric() || ch == '_';
        if word && !prev_word {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
        prev_word = word;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub id: String,
    pub title: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavGroup {
    pub title: String,
    pub links: Vec<NavLink>,
}

pub fn nav_html(groups: &[NavGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = write!(
            out,
            r#"<div class="docs-nav-section">{}</div><ul class="docs-nav-list">"#,
            escape_html(&group.title)
        );
        for link in &group.links {
            let _ = write!(
                out,
                r#"<li><a href="{}" data-doc-id="{}"{}>{}</a></li>"#,
                escape_html(&link.href),
                escape_html(&link.id),
                active_attr(link.active),
                escape_html(&link.title)
            );
        }
        out.push_str("</ul>");
    }
    out
}

/// Previous or next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub label: &'static str,
    pub title: String,
    pub href: String,
}

impl PageLink {
    pub fn to_html(&self) -> String {
        format!(
            r#"<a class="docs-prevnext-link" href="{}"><span class="docs-prevnext-label">{}</span><span class="docs-prevnext-title">{}</span></a>"#,
            escape_html(&self.href),
            self.label,
            escape_html(&self.title)
        )
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLink {
    pub id: String,
    pub title: String,
    /// Humanized section name.
    pub meta: String,
    pub summary: Option<String>,
    pub href: String,
    pub active: bool,
}

pub fn results_html(results: &[ResultLink]) -> String {
    if results.is_empty() {
        return r#"<div class="docs-search-empty">No results.</div>"#.to_owned();
    }

    let mut out = String::from(r#"<div class="docs-search-results">"#);
    for result in results {
        let _ = write!(
            out,
            r#"<a class="docs-search-result" href="{}" data-doc-id="{}"{}><div class="docs-search-result-title">{}</div><div class="docs-search-result-meta">{}</div>"#,
            escape_html(&result.href),
            escape_html(&result.id),
            active_attr(result.active),
            escape_html(&result.title),
            escape_html(&result.meta)
        );
        if let Some(summary) = result.summary.as_deref().filter(|s| !s.is_empty()) {
            let _ = write!(
                out,
                r#"<div class="docs-search-result-summary">{}</div>"#,
                escape_html(summary)
            );
        }
        out.push_str("</a>");
    }
    out.push_str("</div>");
    out
}

const fn active_attr(active: bool) -> &'static str {
    if active { r#" data-active="true""# } else { "" }
}
