//! The surface the controller draws on.

use super::chrome::{NavGroup, PageLink, ResultLink, nav_html, results_html};
use crate::render::Toc;

/// Every visible effect of the reader goes through here.
pub trait View {
    fn show_nav(&mut self, groups: &[NavGroup]);
    fn set_breadcrumb(&mut self, text: &str);
    fn set_prev_next(&mut self, prev: Option<&PageLink>, next: Option<&PageLink>);
    fn set_content(&mut self, html: &str);
    /// `None` hides the table of contents.
    fn set_toc(&mut self, toc: Option<&Toc>);
    fn set_title(&mut self, title: &str);
    fn scroll_to(&mut self, id: &str);
    /// Show ranked results in place of the navigation list.
    fn show_results(&mut self, results: &[ResultLink]);
    /// Hide results and bring the navigation list back.
    fn hide_results(&mut self);
    fn clear_search(&mut self);
    fn focus_search(&mut self);
    fn blur_search(&mut self);
}

/// Snapshot of a rendered reader page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub nav: String,
    pub nav_hidden: bool,
    pub breadcrumb: String,
    pub prev: String,
    pub next: String,
    pub content: String,
    /// `None` while hidden.
    pub toc: Option<String>,
    pub title: String,
    pub scrolled_to: Option<String>,
    /// `None` while hidden.
    pub results: Option<String>,
    pub search_cleared: usize,
    pub search_focused: bool,
}

impl View for PageView {
    fn show_nav(&mut self, groups: &[NavGroup]) {
        self.nav = nav_html(groups);
    }

    fn set_breadcrumb(&mut self, text: &str) {
        self.breadcrumb = text.to_owned();
    }

    fn set_prev_next(&mut self, prev: Option<&PageLink>, next: Option<&PageLink>) {
        self.prev = prev.map(PageLink::to_html).unwrap_or_default();
        self.next = next.map(PageLink::to_html).unwrap_or_default();
    }

    fn set_content(&mut self, html: &str) {
        self.content = html.to_owned();
        self.scrolled_to = None;
    }

    fn set_toc(&mut self, toc: Option<&Toc>) {
        self.toc = toc.map(Toc::to_html);
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn scroll_to(&mut self, id: &str) {
        self.scrolled_to = Some(id.to_owned());
    }

    fn show_results(&mut self, results: &[ResultLink]) {
        self.nav_hidden = true;
        self.results = Some(results_html(results));
    }

    fn hide_results(&mut self) {
        self.nav_hidden = false;
        self.results = None;
    }

    fn clear_search(&mut self) {
        self.search_cleared += 1;
    }

    fn focus_search(&mut self) {
        self.search_focused = true;
    }

    fn blur_search(&mut self) {
        self.search_focused = false;
    }
}
