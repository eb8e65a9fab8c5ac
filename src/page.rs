//! Headless reader pages.
//!
//! Runs the same controller a browser page would, against the site tree on
//! disk, and serializes the resulting view into a static HTML shell.

use anyhow::Result;
use folio_core::Collection;

use crate::{
    config::FolioConfig,
    fetch::SiteFetcher,
    log,
    nav::{Controller, Location, MemoryHistory, PageView, Pipeline},
    render::escape_html,
};

/// Reader page shell (embedded at compile time)
const PAGE_TEMPLATE: &str = include_str!("embed/page.html");

const HIDDEN: &str = " hidden";

/// Render the reader page of `collection` for a URL such as
/// `/docs/?p=guide%2Fintro#setup`.
pub async fn render_page(
    config: &FolioConfig,
    collection: Collection,
    location: Location,
) -> Result<String> {
    let settings = config.viewer_settings(collection);
    let fetcher = SiteFetcher::new(config.root(), settings.collections.dir(collection));
    let pipeline = Pipeline::new(config.sanitizer()?);
    let controller = Controller::new(
        settings,
        pipeline,
        fetcher,
        MemoryHistory::new(location),
        PageView::default(),
    );

    if let Err(err) = controller.start().await {
        log!("nav"; "{err}");
    }
    Ok(page_html(&controller.into_view()))
}

/// Page address for `id` inside `collection`, or the collection's default
/// page when `id` is `None`.
pub fn page_location(config: &FolioConfig, collection: Collection, id: Option<&str>) -> Location {
    let dir = config.collections().dir(collection).to_owned();
    let mut location = Location::parse(&format!("/{dir}/"));
    if let Some(id) = id {
        location.set_param(&config.viewer.param, id);
    }
    location
}

/// Fill the page shell. Placeholders are substituted in a single pass, so
/// braces inside document content are never expanded.
pub fn page_html(view: &PageView) -> String {
    let hidden = |hide: bool| if hide { HIDDEN } else { "" };
    let title = escape_html(&view.title);
    let breadcrumb = escape_html(&view.breadcrumb);

    fill(PAGE_TEMPLATE, |key| {
        Some(match key {
            "title" => title.as_ref(),
            "breadcrumb" => breadcrumb.as_ref(),
            "nav" => view.nav.as_str(),
            "nav_hidden" => hidden(view.nav_hidden),
            "results" => view.results.as_deref().unwrap_or_default(),
            "results_hidden" => hidden(view.results.is_none()),
            "content" => view.content.as_str(),
            "prev" => view.prev.as_str(),
            "next" => view.next.as_str(),
            "toc" => view.toc.as_deref().unwrap_or_default(),
            "toc_hidden" => hidden(view.toc.is_none()),
            _ => return None,
        })
    })
}

/// Replace `{key}` placeholders; unknown keys are kept verbatim.
fn fill<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| Some((lookup(&after[..close])?, close)));
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
