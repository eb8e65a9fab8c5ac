//! The reader's only suspending operation: fetching text by URL.
//!
//! URLs are the ones a page would request: relative to the page's directory
//! (`index.json`, `source/guide/intro.md`, `../wiki/index.json`) or
//! root-absolute (`/docs/index.json`). [`SiteFetcher`] serves them from a
//! static site tree on disk and never leaves that tree.

use std::{
    fs,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use folio_core::path::{is_external_href, normalize};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::manifest::parse_manifest;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("`{0}` is outside the site root")]
    OutsideRoot(String),

    #[error("`{url}` responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read `{0}`")]
    Io(String, #[source] std::io::Error),

    #[error("`{0}` is not a valid manifest")]
    Json(String, #[source] serde_json::Error),
}

/// Text fetch. Non-success responses are errors, exactly like transport
/// failures.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Fetch and parse a JSON manifest.
pub async fn fetch_json<F, T>(fetcher: &F, url: &str) -> Result<T, FetchError>
where
    F: Fetch,
    T: DeserializeOwned,
{
    let body = fetcher.fetch(url).await?;
    parse_manifest(&body).map_err(|err| FetchError::Json(url.to_owned(), err))
}

/// Serves a static site tree for a page living in `page_dir`.
#[derive(Debug, Clone)]
pub struct SiteFetcher {
    root: PathBuf,
    page_dir: String,
}

impl SiteFetcher {
    pub fn new(root: impl Into<PathBuf>, page_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            page_dir: page_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a page-relative or root-absolute URL to a file under the root.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let outside = || FetchError::OutsideRoot(url.to_owned());
        if is_external_href(url) || url.starts_with("//") {
            return Err(outside());
        }

        let path = url.split(['?', '#']).next().unwrap_or_default();
        let joined = match path.strip_prefix('/') {
            Some(absolute) => absolute.to_owned(),
            None if self.page_dir.is_empty() => path.to_owned(),
            None => format!("{}/{path}", self.page_dir),
        };
        let relative = normalize(&joined).ok_or_else(outside)?;
        Ok(self.root.join(relative))
    }
}

impl Fetch for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let path = self.resolve(url)?;
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound | ErrorKind::IsADirectory => FetchError::Status {
                url: url.to_owned(),
                status: 404,
            },
            ErrorKind::PermissionDenied => FetchError::Status {
                url: url.to_owned(),
                status: 403,
            },
            _ => FetchError::Io(url.to_owned(), err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::NavManifest;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs/source/guide")).unwrap();
        fs::create_dir_all(dir.path().join("wiki")).unwrap();
        fs::write(dir.path().join("docs/source/guide/intro.md"), "# Intro").unwrap();
        fs::write(dir.path().join("wiki/index.json"), r#"{"sections": []}"#).unwrap();
        fs::write(dir.path().join("docs/index.json"), "{ not json").unwrap();
        dir
    }

    #[test]
    fn test_resolve() {
        let fetcher = SiteFetcher::new("/site", "docs");
        assert_eq!(
            fetcher.resolve("source/guide/intro.md?v=1").unwrap(),
            PathBuf::from("/site/docs/source/guide/intro.md")
        );
        assert_eq!(
            fetcher.resolve("../wiki/index.json").unwrap(),
            PathBuf::from("/site/wiki/index.json")
        );
        assert_eq!(
            fetcher.resolve("/docs/search.json").unwrap(),
            PathBuf::from("/site/docs/search.json")
        );
        assert!(matches!(
            fetcher.resolve("../../etc/passwd"),
            Err(FetchError::OutsideRoot(_))
        ));
        assert!(matches!(
            fetcher.resolve("https://example.com/x.md"),
            Err(FetchError::OutsideRoot(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let dir = site();
        let fetcher = SiteFetcher::new(dir.path(), "docs");
        assert_eq!(fetcher.fetch("source/guide/intro.md").await.unwrap(), "# Intro");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = site();
        let fetcher = SiteFetcher::new(dir.path(), "docs");
        let err = fetcher.fetch("source/missing.md").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let dir = site();
        let fetcher = SiteFetcher::new(dir.path(), "docs");

        let other: NavManifest = fetch_json(&fetcher, "../wiki/index.json").await.unwrap();
        assert_eq!(other.sections, Some(Vec::new()));

        let err = fetch_json::<_, NavManifest>(&fetcher, "index.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Json(..)));
    }
}
