//! Syntax highlighting seam.
//!
//! The reader asks once per `pre > code` block. A highlighter that returns
//! `Ok(None)` or an error leaves the block as rendered.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot highlight `{lang}`: {message}")]
pub struct HighlightError {
    pub lang: String,
    pub message: String,
}

pub trait Highlight {
    /// Highlighted inner HTML for `code` (already unescaped), or `None` to
    /// keep the block unchanged.
    fn highlight(&self, lang: Option<&str>, code: &str) -> Result<Option<String>, HighlightError>;
}

/// Leaves every block untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHighlight;

impl Highlight for NoHighlight {
    fn highlight(&self, _lang: Option<&str>, _code: &str) -> Result<Option<String>, HighlightError> {
        Ok(None)
    }
}
