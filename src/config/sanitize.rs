//! `[sanitize]` section configuration.

use super::defaults;
use educe::Educe;
use folio_core::StatusLines;
use serde::{Deserialize, Serialize};

/// `[sanitize]` section in folio.toml.
///
/// # Example
/// ```toml
/// [sanitize]
/// subject = "Silk"
/// status_lines = "trim"          # keep the text after "Status: Done. "
/// skip_headings = ["Roadmap"]    # removed like "## Status"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SanitizeConfig {
    /// Product name for "the current subset" rewrites.
    #[serde(default = "defaults::sanitize::subject")]
    #[educe(Default = defaults::sanitize::subject())]
    pub subject: String,

    #[serde(default = "defaults::sanitize::status_lines")]
    #[educe(Default = defaults::sanitize::status_lines())]
    pub status_lines: StatusLines,

    #[serde(default)]
    pub skip_headings: Vec<String>,
}
