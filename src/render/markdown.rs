//! GitHub-flavoured Markdown with heading ids.
//!
//! Heading ids follow the slug rules readers already link to: lowercase,
//! punctuation dropped, whitespace turned into `-`, duplicates suffixed
//! `-1`, `-2`, ... in document order. Single newlines stay soft.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use rustc_hash::FxHashMap;

/// Markdown → HTML.
pub trait Renderer {
    fn render(&self, markdown: &str) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, self.options).collect();
        assign_heading_ids(&mut events);

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut headings: Vec<(usize, String)> = Vec::new();
    let mut open: Option<(usize, String)> = None;

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { .. }) => open = Some((idx, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = open.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => headings.extend(open.take()),
            _ => {}
        }
    }

    let mut slugger = Slugger::default();
    for (idx, text) in headings {
        let slug = slugger.slug(&text);
        if slug.is_empty() {
            continue;
        }
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[idx] {
            id.get_or_insert_with(|| slug.into());
        }
    }
}

/// Heading slug generator with per-document duplicate tracking.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: FxHashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, text: &str) -> String {
        let base: String = text
            .to_lowercase()
            .trim()
            .chars()
            .filter(|&ch| !is_slug_punctuation(ch))
            .map(|ch| if ch.is_whitespace() { '-' } else { ch })
            .collect();
        if base.is_empty() {
            return base;
        }
        self.next_unique(base)
    }

    fn next_unique(&mut self, base: String) -> String {
        let mut slug = base.clone();
        let mut count = 0;
        if let Some(&seen) = self.seen.get(&base) {
            count = seen;
            loop {
                count += 1;
                slug = format!("{base}-{count}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
        }
        self.seen.insert(base, count);
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

fn is_slug_punctuation(ch: char) -> bool {
    matches!(ch, '\u{2000}'..='\u{206F}' | '\u{2E00}'..='\u{2E7F}')
        || "\\'!\"#$%&()*+,./:;<=>?@[]^`{|}~".contains(ch)
}
