//! `[index]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[index]` section in folio.toml - manifest builder settings.
///
/// # Example
/// ```toml
/// [index]
/// source = "source"
/// sections = ["overview", "language", "std", "tooling"]
/// pinned = []
/// exclude = ["README.md", "style-guide.md"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Source directory inside each collection.
    #[serde(default = "defaults::index::source")]
    #[educe(Default = defaults::index::source())]
    pub source: String,

    /// Section order; unlisted sections follow alphabetically.
    #[serde(default = "defaults::index::sections")]
    #[educe(Default = defaults::index::sections())]
    pub sections: Vec<String>,

    /// Identifiers listed first within their section, in this order.
    #[serde(default = "defaults::index::pinned")]
    #[educe(Default = defaults::index::pinned())]
    pub pinned: Vec<String>,

    /// File names never indexed.
    #[serde(default = "defaults::index::exclude")]
    #[educe(Default = defaults::index::exclude())]
    pub exclude: Vec<String>,
}
