//! Markdown → HTML rendering and the rendered-HTML post-processing pass.
//!
//! | Module        | Role                                                  |
//! |---------------|-------------------------------------------------------|
//! | `markdown`    | GFM renderer with heading ids                         |
//! | `highlight`   | Per-code-block highlighter seam                       |
//! | `links`       | Author-written hrefs and code spans → reader links    |
//! | `postprocess` | Streaming rewrite of rendered HTML, TOC and anchors   |
//! | `toc`         | "On this page" entries                                |

mod escape;
mod highlight;
mod links;
mod markdown;
mod postprocess;
mod toc;

pub use escape::escape_html;
pub use highlight::{Highlight, NoHighlight};
pub use links::Linker;
pub use markdown::{MarkdownRenderer, Renderer};
pub use postprocess::{PostProcess, Processed};
pub use toc::Toc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed html at byte {position}")]
    Html {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Wrap non-Markdown sources as an escaped plaintext block.
pub fn plaintext_block(text: &str) -> String {
    format!(
        r#"<pre><code class="language-plaintext">{}</code></pre>"#,
        escape_html(text)
    )
}
