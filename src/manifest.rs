//! Navigation and search manifests, and the lookup tables built from them.
//!
//! Manifests are parsed leniently: entries that are not objects or lack an
//! `id` or `file` are skipped, duplicate identifiers resolve to the last
//! entry. Nothing in a manifest is ever rejected as a whole except a missing
//! `sections` list.

use std::ops::Range;

use folio_core::{Collection, SearchItem};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Section name used when a manifest section has none.
pub const DEFAULT_SECTION: &str = "overview";

// ============================================================================
// Manifest Shapes
// ============================================================================

/// `index.json`: sections of navigable documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// `None` when the manifest has no usable section list.
    #[serde(default, deserialize_with = "lenient_sections")]
    pub sections: Option<Vec<NavSection>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// `search.json`: flat list of searchable documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<SearchItem>,
}

/// Keep the entries of an array that deserialize; anything else is empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_sections<'de, D>(deserializer: D) -> Result<Option<Vec<NavSection>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => Some(
            values
                .into_iter()
                .filter_map(|value| serde_json::from_value(value).ok())
                .collect(),
        ),
        _ => None,
    })
}

// ============================================================================
// Document Index
// ============================================================================

/// A navigable document, merged with its section name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub id: String,
    pub title: String,
    pub file: String,
    pub section: String,
}

#[derive(Debug, Clone)]
struct SectionSpan {
    name: String,
    range: Range<usize>,
}

/// Flattened, read-only view of a navigation manifest.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    entries: Vec<DocumentEntry>,
    sections: Vec<SectionSpan>,
    by_id: FxHashMap<String, usize>,
}

impl DocumentIndex {
    pub fn from_manifest(manifest: &NavManifest) -> Self {
        let mut index = Self::default();

        for section in manifest.sections.iter().flatten() {
            let name = section
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_SECTION);
            let start = index.entries.len();

            for item in &section.items {
                let (Some(id), Some(file)) = (&item.id, &item.file) else {
                    continue;
                };
                if id.is_empty() || file.is_empty() {
                    continue;
                }
                index.by_id.insert(id.clone(), index.entries.len());
                index.entries.push(DocumentEntry {
                    id: id.clone(),
                    title: item.title.clone().unwrap_or_else(|| id.clone()),
                    file: file.clone(),
                    section: name.to_owned(),
                });
            }

            index.sections.push(SectionSpan {
                name: name.to_owned(),
                range: start..index.entries.len(),
            });
        }

        index
    }

    /// Entry for an identifier; the last one wins for duplicates.
    pub fn get(&self, id: &str) -> Option<&DocumentEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// Every entry in manifest order, duplicates included.
    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sections in manifest order with their entries.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[DocumentEntry])> {
        self.sections
            .iter()
            .map(|span| (span.name.as_str(), &self.entries[span.range.clone()]))
    }

    /// Previous and next entries around the first occurrence of `id` in the
    /// flattened order.
    pub fn neighbours(&self, id: &str) -> (Option<&DocumentEntry>, Option<&DocumentEntry>) {
        let Some(idx) = self.entries.iter().position(|entry| entry.id == id) else {
            return (None, None);
        };
        let prev = idx.checked_sub(1).map(|prev| &self.entries[prev]);
        (prev, self.entries.get(idx + 1))
    }
}

// ============================================================================
// Cross References
// ============================================================================

/// `file → id` per collection plus a shared `id → title` table, used to turn
/// author-written paths into identifiers.
#[derive(Debug, Clone, Default)]
pub struct CrossRefs {
    primary: FxHashMap<String, String>,
    secondary: FxHashMap<String, String>,
    titles: FxHashMap<String, String>,
}

impl CrossRefs {
    /// Local entries populate the active collection's table and own their
    /// titles; the other collection's manifest, when available, fills its own
    /// table and only adds titles that are still missing.
    pub fn new(active: Collection, local: &DocumentIndex, other: Option<&NavManifest>) -> Self {
        let mut refs = Self::default();

        for entry in local.entries() {
            refs.files_mut(active).insert(entry.file.clone(), entry.id.clone());
            refs.titles.insert(entry.id.clone(), entry.title.clone());
        }

        if let Some(other) = other {
            let other = DocumentIndex::from_manifest(other);
            for entry in other.entries() {
                refs.files_mut(active.other())
                    .insert(entry.file.clone(), entry.id.clone());
                refs.titles
                    .entry(entry.id.clone())
                    .or_insert_with(|| entry.title.clone());
            }
        }

        refs
    }

    pub fn id_for(&self, collection: Collection, file: &str) -> Option<&str> {
        self.files(collection).get(file).map(String::as_str)
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.titles.get(id).map(String::as_str)
    }

    fn files(&self, collection: Collection) -> &FxHashMap<String, String> {
        match collection {
            Collection::Primary => &self.primary,
            Collection::Secondary => &self.secondary,
        }
    }

    fn files_mut(&mut self, collection: Collection) -> &mut FxHashMap<String, String> {
        match collection {
            Collection::Primary => &mut self.primary,
            Collection::Secondary => &mut self.secondary,
        }
    }
}

/// Parse a manifest body.
pub fn parse_manifest<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    serde_json::from_str(body)
}
