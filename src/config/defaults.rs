//! Default values for `folio.toml`.
//!
//! One function per field so serde's `default = "..."` and educe's
//! `Default = ...` share the same source.

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    use std::path::PathBuf;

    pub fn root() -> PathBuf {
        ".".into()
    }

    pub fn name() -> String {
        "Oro Computer".into()
    }
}

// ============================================================================
// [collections] Section Defaults
// ============================================================================

pub mod collections {
    pub fn primary() -> String {
        "docs".into()
    }

    pub fn secondary() -> String {
        "wiki".into()
    }
}

// ============================================================================
// [viewer] Section Defaults
// ============================================================================

pub mod viewer {
    use folio_core::Collection;

    pub fn collection() -> Collection {
        Collection::Primary
    }

    pub fn index() -> String {
        "index.json".into()
    }

    pub fn search() -> String {
        "search.json".into()
    }

    pub fn base() -> String {
        "source/".into()
    }

    pub fn default() -> String {
        "start".into()
    }

    pub fn param() -> String {
        "p".into()
    }
}

// ============================================================================
// [sanitize] Section Defaults
// ============================================================================

pub mod sanitize {
    use folio_core::StatusLines;

    pub fn subject() -> String {
        "Silk".into()
    }

    pub fn status_lines() -> StatusLines {
        StatusLines::Drop
    }
}

// ============================================================================
// [index] Section Defaults
// ============================================================================

pub mod index {
    pub fn source() -> String {
        "source".into()
    }

    pub fn sections() -> Vec<String> {
        [
            "overview", "guides", "language", "std", "usage", "tooling", "compiler", "man",
        ]
        .map(String::from)
        .to_vec()
    }

    pub fn pinned() -> Vec<String> {
        [
            "guides/purpose",
            "guides/hello-world",
            "guides/language-tour",
            "guides/modules-and-packages",
            "guides/standard-library",
            "guides/cli",
            "guides/testing",
            "guides/formal-silk",
        ]
        .map(String::from)
        .to_vec()
    }

    pub fn exclude() -> Vec<String> {
        ["README.md", "PLAN.md", "STATUS.md", "llms.txt"]
            .map(String::from)
            .to_vec()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }
}
