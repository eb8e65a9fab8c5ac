//! `[site]` and `[collections]` section configuration.

use super::defaults;
use educe::Educe;
use folio_core::Collections;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[site]` section in folio.toml.
///
/// # Example
/// ```toml
/// [site]
/// root = "public"          # static site tree holding both collections
/// name = "Oro Computer"    # last component of every page title
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Static site root, relative to the project root.
    #[serde(default = "defaults::site::root")]
    #[educe(Default = defaults::site::root())]
    pub root: PathBuf,

    #[serde(default = "defaults::site::name")]
    #[educe(Default = defaults::site::name())]
    pub name: String,
}

/// `[collections]` section in folio.toml: directory names of the two
/// document trees under the site root.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CollectionsConfig {
    /// Also accepted as a shared top-level prefix in author-written paths.
    #[serde(default = "defaults::collections::primary")]
    #[educe(Default = defaults::collections::primary())]
    pub primary: String,

    /// Also the prefix marking a cross-collection reference.
    #[serde(default = "defaults::collections::secondary")]
    #[educe(Default = defaults::collections::secondary())]
    pub secondary: String,
}

impl CollectionsConfig {
    pub fn to_collections(&self) -> Collections {
        Collections::new(&self.primary, &self.secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::super::FolioConfig;
    use std::path::Path;

    #[test]
    fn test_site_config() {
        let config = r#"
            [site]
            root = "public"
            name = "Example"

            [collections]
            primary = "manual"
            secondary = "notes"
        "#;
        let config: FolioConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.root, Path::new("public"));
        assert_eq!(config.site.name, "Example");
        let collections = config.collections.to_collections();
        assert_eq!(collections.primary, "manual");
        assert_eq!(collections.secondary, "notes");
    }

    #[test]
    fn test_site_config_defaults() {
        let config: FolioConfig = toml::from_str("[site]\n").unwrap();

        assert_eq!(config.site.root, Path::new("."));
        assert_eq!(config.site.name, "Oro Computer");
        assert_eq!(config.collections.primary, "docs");
        assert_eq!(config.collections.secondary, "wiki");
    }
}
