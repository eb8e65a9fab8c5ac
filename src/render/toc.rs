use std::fmt::Write;

use super::escape_html;

/// Heading levels listed in the table of contents.
pub const TOC_LEVELS: [u8; 2] = [2, 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// "On this page" entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toc {
    entries: Vec<TocEntry>,
}

impl Toc {
    pub fn push(&mut self, entry: TocEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// An empty table is hidden.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose text contains `query`, case-insensitively. A blank
    /// query keeps everything.
    pub fn filter(&self, query: &str) -> Vec<&TocEntry> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| query.is_empty() || entry.text.to_lowercase().contains(&query))
            .collect()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<div class="docs-toc-title">On this page</div><ul class="docs-toc-list">"#);
        for entry in &self.entries {
            let _ = write!(
                out,
                r##"<li data-level="h{}"><a href="#{}">{}</a></li>"##,
                entry.level,
                escape_html(&entry.id),
                escape_html(&entry.text)
            );
        }
        out.push_str("</ul>");
        out
    }
}
