//! Path normalization and collection routing.
//!
//! Author-written references (`../lang/types.md`, `wiki/std/io.md`,
//! `docs%2Fstart.md`) are turned into canonical relative paths, classified
//! into one of the two collections and finally into a navigable address.
//!
//! # Address Scheme
//!
//! | Target            | Address                          |
//! |-------------------|----------------------------------|
//! | same collection   | `?p=<id><fragment>`              |
//! | other collection  | `../<dir>/?p=<id><fragment>`     |

use serde::{Deserialize, Serialize};

/// URL schemes that never point into a collection.
const EXTERNAL_SCHEMES: &[&str] = &[
    "http://",
    "https://",
    "mailto:",
    "tel:",
    "data:",
    "javascript:",
];

// ============================================================================
// Normalization
// ============================================================================

/// Canonicalize a relative path.
///
/// Percent-decodes once (keeping the raw text when decoding fails), converts
/// backslashes, strips a leading `./` and leading slashes, trims every
/// segment and resolves `.`/`..` against an empty stack.
///
/// Returns `None` when a `..` would climb above the root, when nothing is
/// left, or when the result contains a NUL byte.
///
/// ```
/// use folio_core::path::normalize;
///
/// assert_eq!(normalize("a/./b").as_deref(), Some("a/b"));
/// assert_eq!(normalize("a/b/../c").as_deref(), Some("a/c"));
/// assert_eq!(normalize("a/../../b"), None);
/// ```
pub fn normalize(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(input).map_or_else(|_| input.to_owned(), |s| s.into_owned());
    let slashed = decoded.replace('\\', "/");
    let path = slashed.strip_prefix("./").unwrap_or(&slashed);
    let path = path.trim_start_matches('/');

    let mut parts: Vec<&str> = Vec::new();
    for raw in path.split('/') {
        match raw.trim() {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }

    let normalized = parts.join("/");
    if normalized.is_empty() || normalized.contains('\0') {
        return None;
    }
    Some(normalized)
}

/// Directory part of a relative file path (`"a/b/c.md"` → `"a/b"`).
pub fn dirname(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Resolve `href` against the directory of `base_file`, then normalize.
pub fn resolve_relative(base_file: &str, href: &str) -> Option<String> {
    match dirname(base_file) {
        "" => normalize(href),
        base => normalize(&format!("{base}/{href}")),
    }
}

/// Derive a document identifier from a source file by dropping `.md`/`.txt`.
pub fn file_to_id(file: &str) -> &str {
    file.strip_suffix(".md")
        .or_else(|| file.strip_suffix(".txt"))
        .unwrap_or(file)
}

/// Whether an href leaves the reader entirely.
pub fn is_external_href(href: &str) -> bool {
    EXTERNAL_SCHEMES.iter().any(|scheme| href.starts_with(scheme))
}

// ============================================================================
// Collections
// ============================================================================

/// One of the two document trees served by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    #[default]
    Primary,
    Secondary,
}

impl Collection {
    /// The collection on the other side of a cross reference.
    pub const fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// Result of [`Collections::classify`]: the owning collection and the path
/// relative to that collection's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    pub collection: Collection,
    pub file: &'a str,
}

/// Directory names of both collections.
///
/// The primary name doubles as an optional shared top-level prefix, the
/// secondary name as the cross-collection prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub primary: String,
    pub secondary: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self::new("docs", "wiki")
    }
}

impl Collections {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Directory name of a collection.
    pub fn dir(&self, collection: Collection) -> &str {
        match collection {
            Collection::Primary => &self.primary,
            Collection::Secondary => &self.secondary,
        }
    }

    /// Pure prefix rewrite: `docs/x` → primary `x`, `docs/wiki/x` and
    /// `wiki/x` → secondary `x`, anything else → primary as-is.
    pub fn classify<'a>(&self, path: &'a str) -> Classified<'a> {
        let path = strip_dir(path, &self.primary).unwrap_or(path);
        match strip_dir(path, &self.secondary) {
            Some(file) => Classified {
                collection: Collection::Secondary,
                file,
            },
            None => Classified {
                collection: Collection::Primary,
                file: path,
            },
        }
    }

    /// Whether a path is explicitly prefixed with a collection directory.
    pub fn is_prefixed(&self, path: &str) -> bool {
        strip_dir(path, &self.primary).is_some() || strip_dir(path, &self.secondary).is_some()
    }

    /// Whether an href path points at a document source.
    pub fn looks_like_doc(&self, path: &str) -> bool {
        path.ends_with(".md") || path.ends_with(".txt") || self.is_prefixed(path)
    }
}

fn strip_dir<'a>(path: &'a str, dir: &str) -> Option<&'a str> {
    path.strip_prefix(dir)?.strip_prefix('/')
}

// ============================================================================
// Navigation References
// ============================================================================

/// Builds every link the reader emits, from the point of view of the
/// collection currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRouter {
    pub collections: Collections,
    pub active: Collection,
    pub param: String,
}

impl NavRouter {
    pub fn new(collections: Collections, active: Collection, param: impl Into<String>) -> Self {
        Self {
            collections,
            active,
            param: param.into(),
        }
    }

    /// Address of `id` in `target`, with `fragment` (`"#anchor"` or empty)
    /// carried through unchanged.
    pub fn nav_ref(&self, target: Collection, id: &str, fragment: &str) -> String {
        let encoded = urlencoding::encode(id);
        if target == self.active {
            format!("?{}={encoded}{fragment}", self.param)
        } else {
            format!(
                "../{}/?{}={encoded}{fragment}",
                self.collections.dir(target),
                self.param
            )
        }
    }

    /// Address of `id` inside the active collection.
    pub fn local_ref(&self, id: &str) -> String {
        self.nav_ref(self.active, id, "")
    }

    /// Whether an href already carries the reader's query parameter.
    pub fn is_nav_ref(&self, href: &str) -> bool {
        href.starts_with(&format!("?{}=", self.param)) || href.contains(&format!("&{}=", self.param))
    }
}
