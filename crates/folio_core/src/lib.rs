//! Core algorithms of the folio documentation reader.
//!
//! Everything in this crate is pure: no IO, no global state beyond compiled
//! regex tables. The reader application composes these pieces.
//!
//! | Module     | Purpose                                                   |
//! |------------|-----------------------------------------------------------|
//! | `path`     | Normalize author-written paths, classify collections       |
//! | `sanitize` | Fence-aware removal of authoring/status artifacts          |
//! | `search`   | Haystack compilation, tokenizing, scoring and ranking      |

pub mod path;
pub mod sanitize;
pub mod search;

pub use path::{Classified, Collection, Collections, NavRouter};
pub use sanitize::{SanitizeOptions, Sanitizer, StatusLines, sanitize};
pub use search::{Corpus, SearchEntry, SearchItem, compile, search, tokenize};
