//! Search corpus compilation and ranking.
//!
//! Matching is a conjunctive substring filter over a precomputed haystack;
//! ranking is a fixed per-term score that favours title hits.
//!
//! | Per term                    | Score |
//! |-----------------------------|-------|
//! | title equals term           | 1000  |
//! | else title starts with term | 450   |
//! | else title contains term    | 220   |
//! | summary contains term       | +60   |
//! | haystack contains term      | +10   |

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Terms beyond this count are ignored.
pub const MAX_TERMS: usize = 8;

/// Default result count.
pub const DEFAULT_LIMIT: usize = 20;

const EXACT_TITLE: u32 = 1000;
const TITLE_PREFIX: u32 = 450;
const TITLE_CONTAINS: u32 = 220;
const SUMMARY_CONTAINS: u32 = 60;
const HAYSTACK_CONTAINS: u32 = 10;

pub type Terms = SmallVec<[String; MAX_TERMS]>;

/// One entry of the search manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A search item with its lowercase match fields.
#[derive(Debug, Clone)]
pub struct SearchEntry {
    pub item: SearchItem,
    haystack: String,
    title: String,
    summary: String,
}

impl SearchEntry {
    pub fn new(item: SearchItem) -> Self {
        let haystack = [
            item.title.as_str(),
            item.summary.as_deref().unwrap_or_default(),
            item.text.as_deref().unwrap_or_default(),
        ]
        .join(" ")
        .to_lowercase();

        Self {
            haystack: collapse_whitespace(&haystack),
            title: item.title.to_lowercase(),
            summary: item.summary.as_deref().unwrap_or_default().to_lowercase(),
            item,
        }
    }

    /// Lowercase, whitespace-collapsed `title summary text`.
    pub fn haystack(&self) -> &str {
        &self.haystack
    }

    fn matches(&self, terms: &[String]) -> bool {
        terms.iter().all(|term| self.haystack.contains(term.as_str()))
    }

    fn score(&self, terms: &[String]) -> u32 {
        terms.iter().map(|term| self.score_term(term)).sum()
    }

    fn score_term(&self, term: &str) -> u32 {
        let title = if self.title == term {
            EXACT_TITLE
        } else if self.title.starts_with(term) {
            TITLE_PREFIX
        } else if self.title.contains(term) {
            TITLE_CONTAINS
        } else {
            0
        };
        let summary = if self.summary.contains(term) { SUMMARY_CONTAINS } else { 0 };
        let haystack = if self.haystack.contains(term) { HAYSTACK_CONTAINS } else { 0 };
        title + summary + haystack
    }
}

/// The compiled, read-only corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<SearchEntry>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }
}

impl FromIterator<SearchItem> for Corpus {
    fn from_iter<I: IntoIterator<Item = SearchItem>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(SearchEntry::new).collect(),
        }
    }
}

/// Build the corpus from manifest items, keeping their order.
pub fn compile(items: impl IntoIterator<Item = SearchItem>) -> Corpus {
    items.into_iter().collect()
}

/// Lowercase whitespace-separated terms, at most [`MAX_TERMS`].
pub fn tokenize(query: &str) -> Terms {
    query
        .to_lowercase()
        .split_whitespace()
        .take(MAX_TERMS)
        .map(str::to_owned)
        .collect()
}

/// Entries containing every query term, best score first, ties in corpus
/// order, at most `limit`.
pub fn search<'c>(corpus: &'c Corpus, query: &str, limit: usize) -> Vec<&'c SearchItem> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &SearchEntry)> = corpus
        .entries
        .iter()
        .filter(|entry| entry.matches(&terms))
        .map(|entry| (entry.score(&terms), entry))
        .collect();

    // `sort_by` is stable, so equal scores keep corpus order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, entry)| &entry.item).collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str, summary: Option<&str>, text: Option<&str>) -> SearchItem {
        SearchItem {
            id: id.to_owned(),
            title: title.to_owned(),
            section: "overview".to_owned(),
            summary: summary.map(str::to_owned),
            text: text.map(str::to_owned),
        }
    }

    fn ids(results: &[&SearchItem]) -> Vec<String> {
        results.iter().map(|item| item.id.clone()).collect()
    }

    #[test]
    fn test_haystack() {
        let entry = SearchEntry::new(item("a", "Hello\tWorld", None, Some("Body\n\ntext")));
        assert_eq!(entry.haystack(), "hello world body text");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Foo   BAR ").as_slice(), ["foo", "bar"]);
        assert!(tokenize("   ").is_empty());
        let many = tokenize("a b c d e f g h i j");
        assert_eq!(many.len(), MAX_TERMS);
        assert_eq!(many.last().map(String::as_str), Some("h"));
    }

    #[test]
    fn test_conjunctive_filter() {
        let corpus = compile([
            item("both", "Foo and bar", None, None),
            item("foo", "Foo only", None, None),
            item("bar", "Bar only", None, Some("nothing else")),
            item("body", "Other", None, Some("the bar near foo")),
        ]);
        let results = search(&corpus, "foo bar", DEFAULT_LIMIT);
        assert_eq!(ids(&results), ["both", "body"]);
        for result in results {
            let entry = SearchEntry::new(result.clone());
            assert!(entry.haystack().contains("foo") && entry.haystack().contains("bar"));
        }
    }

    #[test]
    fn test_ranking() {
        let corpus = compile([
            item("body", "Guide", None, Some("mentions foo once")),
            item("prefix", "Foobar Guide", None, None),
            item("exact", "Foo", None, None),
            item("contains", "All about foo", None, None),
        ]);
        let results = search(&corpus, "foo", DEFAULT_LIMIT);
        assert_eq!(ids(&results), ["exact", "prefix", "contains", "body"]);
    }

    #[test]
    fn test_summary_bonus() {
        let corpus = compile([
            item("plain", "Guide", None, Some("loops")),
            item("summary", "Guide", Some("About loops"), None),
        ]);
        assert_eq!(ids(&search(&corpus, "loops", DEFAULT_LIMIT)), ["summary", "plain"]);
    }

    #[test]
    fn test_stable_ties_and_limit() {
        let corpus = compile((0..30).map(|i| item(&i.to_string(), "Same", None, Some("word"))));
        let results = search(&corpus, "word", DEFAULT_LIMIT);
        assert_eq!(results.len(), DEFAULT_LIMIT);
        let expected: Vec<String> = (0..DEFAULT_LIMIT).map(|i| i.to_string()).collect();
        assert_eq!(ids(&results), expected);
    }

    #[test]
    fn test_empty_query() {
        let corpus = compile([item("a", "Foo", None, None)]);
        assert!(search(&corpus, "  ", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn test_manifest_item_defaults() {
        let item: SearchItem = serde_json::from_str(r#"{"id":"x","title":"X"}"#).unwrap();
        assert_eq!(item.section, "");
        assert_eq!(item.summary, None);
    }
}
