//! Project configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section         | Purpose                                          |
//! |-----------------|--------------------------------------------------|
//! | `[site]`        | Static site root and site name                   |
//! | `[collections]` | Directory names of the two collections           |
//! | `[viewer]`      | Manifest URLs, source base, default document     |
//! | `[sanitize]`    | Sanitizer subject and status-line policy         |
//! | `[index]`       | Manifest builder: sources, ordering, exclusions  |
//! | `[serve]`       | Preview server (interface, port)                 |
//!
//! # Example
//!
//! ```toml
//! [site]
//! root = "public"
//!
//! [collections]
//! primary = "docs"
//! secondary = "wiki"
//!
//! [viewer]
//! default = "start"
//!
//! [sanitize]
//! status_lines = "trim"
//!
//! [serve]
//! port = 5277
//! ```
//!
//! A missing file is the same as an empty one.

pub mod defaults;
mod error;
mod index;
mod sanitize;
mod serve;
mod site;
mod viewer;

pub use error::ConfigError;
pub use index::IndexConfig;
use sanitize::SanitizeConfig;
use serve::ServeConfig;
use site::{CollectionsConfig, SiteConfig};
use viewer::ViewerConfig;

use crate::{
    cli::{Cli, Commands},
    nav::ViewerSettings,
};
use anyhow::{Context, Result, bail};
use educe::Educe;
use folio_core::{Collection, Collections, SanitizeOptions, Sanitizer};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub collections: CollectionsConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    #[serde(default)]
    pub sanitize: SanitizeConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl FolioConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: FolioConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content).with_context(|| format!("in `{}`", path.display()))
    }

    /// Load `<root>/<config>`, falling back to defaults when it does not
    /// exist, then apply the command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Static site root.
    pub fn root(&self) -> &Path {
        &self.site.root
    }

    pub fn collections(&self) -> Collections {
        self.collections.to_collections()
    }

    /// Directory of a collection under the site root.
    pub fn collection_root(&self, collection: Collection) -> PathBuf {
        self.root().join(self.collections().dir(collection))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let root = Self::normalize_path(root);

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.site.root = Self::normalize_path(&root.join(&self.site.root));

        Self::update_option(&mut self.viewer.collection, cli.collection().as_ref());

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    pub fn validate(&self) -> Result<()> {
        let CollectionsConfig { primary, secondary } = &self.collections;
        for (key, name) in [("primary", primary), ("secondary", secondary)] {
            if name.is_empty() {
                bail!(ConfigError::Validation(format!(
                    "[collections.{key}] must not be empty"
                )));
            }
            if name.contains('/') {
                bail!(ConfigError::Validation(format!(
                    "[collections.{key}] `{name}` must be a single directory name"
                )));
            }
        }
        if primary == secondary {
            bail!(ConfigError::Validation(format!(
                "[collections] primary and secondary are both `{primary}`"
            )));
        }
        if self.viewer.param.is_empty() {
            bail!(ConfigError::Validation(
                "[viewer.param] must not be empty".into()
            ));
        }
        if self.serve.ip().is_none() {
            bail!(ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.serve.interface
            )));
        }
        Ok(())
    }

    /// Reader settings for a page of `collection`.
    pub fn viewer_settings(&self, collection: Collection) -> ViewerSettings {
        let collections = self.collections();
        let viewer = &self.viewer;

        let other_index_url = viewer.other_index.clone().unwrap_or_else(|| {
            format!("../{}/{}", collections.dir(collection.other()), viewer.index)
        });
        let title_suffix = viewer.title_suffix.clone().unwrap_or_else(|| {
            let label = match collection {
                Collection::Primary => "Docs",
                Collection::Secondary => "Wiki",
            };
            format!("{} {label}", self.sanitize.subject)
        });

        ViewerSettings {
            collections,
            active: collection,
            index_url: viewer.index.clone(),
            search_url: viewer.search.clone(),
            other_index_url,
            base: viewer.base.clone(),
            default_id: viewer.default.clone(),
            param: viewer.param.clone(),
            title_suffix,
            site_name: self.site.name.clone(),
        }
    }

    fn sanitize_options(&self, rewrite: bool) -> SanitizeOptions {
        SanitizeOptions {
            subject: self.sanitize.subject.clone(),
            status_lines: self.sanitize.status_lines,
            skip_headings: self.sanitize.skip_headings.clone(),
            rewrite,
        }
    }

    /// Full sanitizer used before rendering.
    pub fn sanitizer(&self) -> Result<Sanitizer> {
        Sanitizer::new(self.sanitize_options(true)).context("invalid [sanitize] settings")
    }

    /// Removals only, for manifest extraction.
    pub fn structural_sanitizer(&self) -> Result<Sanitizer> {
        Sanitizer::new(self.sanitize_options(false)).context("invalid [sanitize] settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_equals_default() {
        let parsed = FolioConfig::from_str("").unwrap();
        let default = FolioConfig::default();

        assert_eq!(parsed.site.name, default.site.name);
        assert_eq!(parsed.viewer.index, default.viewer.index);
        assert_eq!(parsed.index.sections, default.index.sections);
        assert_eq!(parsed.serve.port, default.serve.port);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(FolioConfig::from_str("[build]\nminify = true").is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = FolioConfig::default();
        assert!(config.validate().is_ok());

        config.collections.secondary = "docs".into();
        assert!(config.validate().is_err());

        config.collections.secondary = "docs/wiki".into();
        assert!(config.validate().is_err());

        config.collections.secondary = String::new();
        assert!(config.validate().is_err());

        let mut config = FolioConfig::default();
        config.viewer.param = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("viewer.param"));
    }

    #[test]
    fn test_viewer_settings() {
        let config = FolioConfig::default();

        let docs = config.viewer_settings(Collection::Primary);
        assert_eq!(docs.other_index_url, "../wiki/index.json");
        assert_eq!(docs.title_suffix, "Silk Docs");
        assert_eq!(docs.site_name, "Oro Computer");
        assert_eq!(docs.default_id, "start");

        let wiki = config.viewer_settings(Collection::Secondary);
        assert_eq!(wiki.active, Collection::Secondary);
        assert_eq!(wiki.other_index_url, "../docs/index.json");
        assert_eq!(wiki.title_suffix, "Silk Wiki");
    }

    #[test]
    fn test_viewer_settings_overrides() {
        let config = FolioConfig::from_str(
            r#"
            [viewer]
            title_suffix = "Handbook"
            other_index = "/notes/index.json"
            "#,
        )
        .unwrap();
        let settings = config.viewer_settings(Collection::Secondary);
        assert_eq!(settings.title_suffix, "Handbook");
        assert_eq!(settings.other_index_url, "/notes/index.json");
    }

    #[test]
    fn test_load_applies_cli() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("folio.toml"),
            "[site]\nroot = \"public\"\n[serve]\nport = 4000\n",
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["folio", "--root", root, "serve", "-p", "4100"]).unwrap();
        let config = FolioConfig::load(&cli).unwrap();
        assert_eq!(config.serve.port, 4100);
        assert!(config.root().ends_with("public"));
        assert!(config.root().is_absolute());

        let cli = Cli::try_parse_from(["folio", "--root", root, "index", "-c", "secondary"]).unwrap();
        let config = FolioConfig::load(&cli).unwrap();
        assert_eq!(config.viewer.collection, Collection::Secondary);
        assert!(config.collection_root(Collection::Secondary).ends_with("public/wiki"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cli =
            Cli::try_parse_from(["folio", "--root", dir.path().to_str().unwrap(), "index"]).unwrap();
        let config = FolioConfig::load(&cli).unwrap();
        assert_eq!(config.viewer.collection, Collection::Primary);
        assert_eq!(config.site.name, "Oro Computer");
    }
}
