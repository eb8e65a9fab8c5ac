//! Manifest builder.
//!
//! Walks `<collection>/<source>` and writes the collection's `index.json`
//! (navigation sections) and `search.json` (flat searchable items).
//!
//! ```text
//! source/**/*.md|txt ──par──▶ extract ──▶ sort ──┬─▶ index.json
//!                                                └─▶ search.json
//! ```
//!
//! Manifests are only rewritten when something other than `generatedAt`
//! changed, so rebuilding an unchanged tree leaves the files alone.

mod extract;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use folio_core::{Collection, SearchItem, Sanitizer, path::file_to_id};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use walkdir::WalkDir;

use crate::{
    config::{FolioConfig, IndexConfig},
    log,
    manifest::{NavItem, NavManifest, NavSection, SearchManifest},
};
pub use extract::{first_heading, first_paragraph, section_of, strip_markdown, title_from_stem};

/// Rank of anything not listed in an ordering.
const UNRANKED: usize = 999;

/// One indexed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Relative to the source root, `/`-separated.
    pub file: String,
    pub section: String,
    pub summary: String,
    pub text: String,
}

impl Document {
    /// Extract metadata from a status-stripped source.
    pub fn extract(file: &str, markdown: &str) -> Self {
        let title = first_heading(markdown).unwrap_or_else(|| {
            let stem = Path::new(file)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(file);
            title_from_stem(stem)
        });

        Self {
            id: file_to_id(file).to_owned(),
            title,
            file: file.to_owned(),
            section: section_of(file).to_owned(),
            summary: first_paragraph(markdown),
            text: strip_markdown(markdown),
        }
    }
}

/// Both manifests of one collection.
#[derive(Debug, Clone)]
pub struct Manifests {
    pub nav: NavManifest,
    pub search: SearchManifest,
}

/// Indexable files under `source_root`, in a stable order.
pub fn collect_sources(source_root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !exclude.iter().any(|excluded| excluded == name)
        })
        .filter(|e| {
            matches!(
                e.path().extension().and_then(|ext| ext.to_str()),
                Some("md" | "txt")
            )
        })
        .map(|e| e.into_path())
        .collect()
}

/// Read and extract every source in parallel.
pub fn extract_documents(
    source_root: &Path,
    sources: &[PathBuf],
    sanitizer: &Sanitizer,
) -> Result<Vec<Document>> {
    sources
        .par_iter()
        .map(|path| {
            let file = path
                .strip_prefix(source_root)
                .unwrap_or(path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            Ok(Document::extract(&file, &sanitizer.sanitize(&raw)))
        })
        .collect()
}

/// Order documents by section order, pinned order, lowercase title, id.
pub fn sort_documents(documents: &mut [Document], options: &IndexConfig) {
    let rank = |list: &[String], key: &str| {
        list.iter()
            .position(|name| name == key)
            .unwrap_or(UNRANKED)
    };
    documents.sort_by_cached_key(|doc| {
        (
            rank(&options.sections, &doc.section),
            rank(&options.pinned, &doc.id),
            doc.title.to_lowercase(),
            doc.id.clone(),
        )
    });
}

/// Navigation sections: configured order first, the rest alphabetically.
fn group_sections(documents: &[Document], order: &[String]) -> Vec<NavSection> {
    let mut grouped: FxHashMap<&str, Vec<NavItem>> = FxHashMap::default();
    for doc in documents {
        grouped.entry(doc.section.as_str()).or_default().push(NavItem {
            id: Some(doc.id.clone()),
            title: Some(doc.title.clone()),
            file: Some(doc.file.clone()),
        });
    }

    let mut rest: Vec<&str> = grouped
        .keys()
        .copied()
        .filter(|name| !order.iter().any(|o| o == name))
        .collect();
    rest.sort_unstable();

    order
        .iter()
        .map(String::as_str)
        .chain(rest)
        .filter_map(|name| {
            let items = grouped.remove(name)?;
            Some(NavSection {
                name: Some(name.to_owned()),
                items,
            })
        })
        .collect()
}

/// Build both manifests from sorted documents.
pub fn build_manifests(
    documents: &[Document],
    kind: &str,
    options: &IndexConfig,
    generated_at: &str,
) -> Manifests {
    let items = documents
        .iter()
        .map(|doc| SearchItem {
            id: doc.id.clone(),
            title: doc.title.clone(),
            section: doc.section.clone(),
            summary: Some(doc.summary.clone()),
            text: Some(doc.text.clone()),
        })
        .collect();

    Manifests {
        nav: NavManifest {
            generated_at: Some(generated_at.to_owned()),
            kind: Some(kind.to_owned()),
            count: Some(documents.len()),
            sections: Some(group_sections(documents, &options.sections)),
        },
        search: SearchManifest {
            generated_at: Some(generated_at.to_owned()),
            kind: Some(kind.to_owned()),
            count: Some(documents.len()),
            items,
        },
    }
}

/// Write pretty JSON unless the file already holds the same payload apart
/// from `generatedAt`. Returns whether the file was written.
pub fn write_if_changed<T: Serialize>(path: &Path, payload: &T) -> Result<bool> {
    let fresh = serde_json::to_value(payload)?;
    let unchanged = fs::read_to_string(path)
        .ok()
        .and_then(|body| serde_json::from_str::<Value>(&body).ok())
        .is_some_and(|existing| without_timestamp(existing) == without_timestamp(fresh));
    if unchanged {
        return Ok(false);
    }

    let mut body = serde_json::to_string_pretty(payload)?;
    body.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body).with_context(|| format!("failed to write `{}`", path.display()))?;
    Ok(true)
}

fn without_timestamp(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.remove("generatedAt");
    }
    value
}

/// Rebuild the manifests of one collection.
pub fn build_collection(config: &FolioConfig, collection: Collection) -> Result<Manifests> {
    let collection_root = config.collection_root(collection);
    let source_root = collection_root.join(&config.index.source);
    let kind = config.collections().dir(collection).to_owned();

    let sources = collect_sources(&source_root, &config.index.exclude);
    let sanitizer = config.structural_sanitizer()?;
    let mut documents = extract_documents(&source_root, &sources, &sanitizer)?;
    sort_documents(&mut documents, &config.index);

    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
    let manifests = build_manifests(&documents, &kind, &config.index, &generated_at);

    for (name, written) in [
        (
            &config.viewer.index,
            write_if_changed(&collection_root.join(&config.viewer.index), &manifests.nav)?,
        ),
        (
            &config.viewer.search,
            write_if_changed(&collection_root.join(&config.viewer.search), &manifests.search)?,
        ),
    ] {
        let state = if written { "wrote" } else { "unchanged" };
        log!("index"; "{kind}/{name}: {state} ({} documents)", documents.len());
    }

    Ok(manifests)
}
