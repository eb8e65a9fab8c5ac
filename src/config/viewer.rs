//! `[viewer]` section configuration.

use super::defaults;
use educe::Educe;
use folio_core::Collection;
use serde::{Deserialize, Serialize};

/// `[viewer]` section in folio.toml - how a reader page finds its data.
///
/// URLs are relative to the collection directory.
///
/// # Example
/// ```toml
/// [viewer]
/// collection = "secondary"
/// base = "source/"
/// default = "start"
/// title_suffix = "Silk Wiki"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Collection shown when a command does not name one.
    #[serde(default = "defaults::viewer::collection")]
    #[educe(Default = defaults::viewer::collection())]
    pub collection: Collection,

    #[serde(default = "defaults::viewer::index")]
    #[educe(Default = defaults::viewer::index())]
    pub index: String,

    #[serde(default = "defaults::viewer::search")]
    #[educe(Default = defaults::viewer::search())]
    pub search: String,

    /// Prefix joined with a manifest entry's `file`.
    #[serde(default = "defaults::viewer::base")]
    #[educe(Default = defaults::viewer::base())]
    pub base: String,

    /// Identifier shown when the URL names none.
    #[serde(default = "defaults::viewer::default")]
    #[educe(Default = defaults::viewer::default())]
    pub default: String,

    /// Query parameter carrying the identifier.
    #[serde(default = "defaults::viewer::param")]
    #[educe(Default = defaults::viewer::param())]
    pub param: String,

    /// Middle component of page titles; derived from `[sanitize] subject`
    /// and the collection when unset.
    #[serde(default)]
    pub title_suffix: Option<String>,

    /// Navigation manifest of the other collection (default
    /// `../<other>/index.json`).
    #[serde(default)]
    pub other_index: Option<String>,
}
