//! The reader's state machine.
//!
//! A [`Controller`] owns the navigation state of one reader page: the loaded
//! document index, cross-reference tables and search corpus. Every way of
//! changing documents ends in [`Controller::navigate`] or
//! [`Controller::pop_state`], which share one render path:
//!
//! ```text
//! resolve id → nav → URL → breadcrumb → prev/next
//!            → fetch → sanitize → render → post-process → title → scroll
//! ```
//!
//! Navigations are never cancelled. Each one writes the content area when
//! its fetch completes, so the last one to complete is what stays visible.

use std::cell::{Cell, OnceCell, Ref, RefCell};

use folio_core::{
    Collection, Collections, Corpus, NavRouter, Sanitizer, compile, path::normalize,
    search::{DEFAULT_LIMIT, search},
};
use thiserror::Error;

use super::{
    chrome::{NavGroup, NavLink, PageLink, ResultLink, humanize_section},
    location::{History, Location},
    view::View,
};
use crate::{
    fetch::{Fetch, FetchError, fetch_json},
    log,
    manifest::{CrossRefs, DocumentEntry, DocumentIndex, NavManifest, SearchManifest},
    render::{
        Highlight, Linker, MarkdownRenderer, NoHighlight, PostProcess, Processed, Renderer,
        plaintext_block,
    },
};

pub const UNAVAILABLE_HTML: &str = "<h1>Docs unavailable</h1><p>Unable to load the docs index.</p>";
pub const NOT_FOUND_HTML: &str = "<h1>Not found</h1><p>Unable to load this page.</p>";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("docs index unavailable")]
    IndexUnavailable(#[from] FetchError),

    #[error("docs index has no sections")]
    MissingSections,
}

/// Where a reader page finds its data and how it addresses documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSettings {
    pub collections: Collections,
    pub active: Collection,
    pub index_url: String,
    pub search_url: String,
    /// Navigation manifest of the other collection, loaded best-effort.
    pub other_index_url: String,
    /// Prefix joined with an entry's `file` to fetch its source.
    pub base: String,
    pub default_id: String,
    pub param: String,
    pub title_suffix: String,
    pub site_name: String,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            collections: Collections::default(),
            active: Collection::Primary,
            index_url: "index.json".to_owned(),
            search_url: "search.json".to_owned(),
            other_index_url: "../wiki/index.json".to_owned(),
            base: "source/".to_owned(),
            default_id: "start".to_owned(),
            param: "p".to_owned(),
            title_suffix: "Silk Docs".to_owned(),
            site_name: "Oro Computer".to_owned(),
        }
    }
}

/// Text → HTML stages applied to every fetched source.
pub struct Pipeline {
    pub sanitizer: Sanitizer,
    pub renderer: Box<dyn Renderer>,
    pub highlighter: Box<dyn Highlight>,
}

impl Pipeline {
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self {
            sanitizer,
            renderer: Box::new(MarkdownRenderer::default()),
            highlighter: Box::new(NoHighlight),
        }
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlight + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not started.
    #[default]
    Idle,
    /// A manifest or document fetch is in flight.
    Loading,
    /// A document is displayed.
    Ready,
    /// The last request failed; the controller stays usable.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

/// A key press delivered to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    /// Focus is inside an editable field.
    pub editable_focus: bool,
    /// Focus is the search field itself.
    pub in_search: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

/// Lookup tables built once the manifests are in.
struct Session {
    index: DocumentIndex,
    refs: CrossRefs,
    corpus: Corpus,
}

pub struct Controller<F, H, V> {
    settings: ViewerSettings,
    router: NavRouter,
    pipeline: Pipeline,
    fetcher: F,
    history: H,
    view: RefCell<V>,
    session: OnceCell<Session>,
    phase: Cell<Phase>,
}

impl<F: Fetch, H: History, V: View> Controller<F, H, V> {
    pub fn new(settings: ViewerSettings, pipeline: Pipeline, fetcher: F, history: H, view: V) -> Self {
        let router = NavRouter::new(settings.collections.clone(), settings.active, settings.param.clone());
        Self {
            settings,
            router,
            pipeline,
            fetcher,
            history,
            view: RefCell::new(view),
            session: OnceCell::new(),
            phase: Cell::new(Phase::Idle),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn view(&self) -> Ref<'_, V> {
        self.view.borrow()
    }

    pub fn into_view(self) -> V {
        self.view.into_inner()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Load both manifests, then show the document named by the URL.
    ///
    /// A missing or malformed navigation manifest is terminal: the view shows
    /// "Docs unavailable" and nothing else is initialized.
    pub async fn start(&self) -> Result<(), StartupError> {
        self.phase.set(Phase::Loading);

        let (index, search_manifest) = tokio::join!(
            fetch_json::<_, NavManifest>(&self.fetcher, &self.settings.index_url),
            fetch_json::<_, SearchManifest>(&self.fetcher, &self.settings.search_url),
        );

        let manifest = match index {
            Ok(manifest) if manifest.sections.is_some() => manifest,
            Ok(_) => return Err(self.unavailable(StartupError::MissingSections)),
            Err(err) => return Err(self.unavailable(err.into())),
        };

        let items = search_manifest.map(|manifest| manifest.items).unwrap_or_else(|err| {
            log!("nav"; "search disabled: {err}");
            Vec::new()
        });

        let other = fetch_json::<_, NavManifest>(&self.fetcher, &self.settings.other_index_url)
            .await
            .inspect_err(|err| log!("nav"; "cross-collection references unavailable: {err}"))
            .ok();

        let index = DocumentIndex::from_manifest(&manifest);
        let refs = CrossRefs::new(self.settings.active, &index, other.as_ref());
        // a second start keeps the first session
        let _ = self.session.set(Session {
            index,
            refs,
            corpus: compile(items),
        });

        let initial = self.current_identifier();
        self.render_document(&initial, HistoryMode::Replace).await;
        Ok(())
    }

    fn unavailable(&self, err: StartupError) -> StartupError {
        let mut view = self.view.borrow_mut();
        view.set_content(UNAVAILABLE_HTML);
        view.set_toc(None);
        self.phase.set(Phase::Error);
        err
    }

    /// Identifier named by the URL, or the default one.
    pub fn current_identifier(&self) -> String {
        self.history
            .location()
            .param(&self.settings.param)
            .and_then(normalize)
            .unwrap_or_else(|| self.settings.default_id.clone())
    }

    /// Put `id` in the URL, keeping every other parameter and the fragment.
    pub fn set_current_identifier(&self, id: &str, mode: HistoryMode) {
        let mut location = self.history.location();
        location.set_param(&self.settings.param, id);
        match mode {
            HistoryMode::Push => self.history.push(location),
            HistoryMode::Replace => self.history.replace(location),
        }
    }

    /// Show another document, adding a history entry.
    pub async fn navigate(&self, id: &str) {
        self.render_document(id, HistoryMode::Push).await;
    }

    /// The history moved (back/forward): show what the URL now names.
    pub async fn pop_state(&self) {
        let id = self.current_identifier();
        self.render_document(&id, HistoryMode::Replace).await;
    }

    /// A navigation entry was clicked.
    pub async fn select_nav(&self, id: &str) {
        self.close_search();
        self.navigate(id).await;
    }

    /// A search result was clicked.
    pub async fn select_result(&self, id: &str) {
        self.close_search();
        self.navigate(id).await;
    }

    /// A previous/next link was clicked. Returns `false` when the link is not
    /// a reader address for this page and should be followed normally.
    pub async fn follow_link(&self, href: &str) -> bool {
        let target = Location::parse(href);
        if !target.path.is_empty() {
            return false;
        }
        let Some(id) = target.param(&self.settings.param).filter(|id| !id.is_empty()) else {
            return false;
        };
        self.navigate(id).await;
        true
    }

    /// The search field changed.
    pub fn search_input(&self, query: &str) {
        let Some(session) = self.session.get() else {
            return;
        };
        let query = query.trim();
        if query.is_empty() {
            self.view.borrow_mut().hide_results();
            return;
        }

        let current = self.current_identifier();
        let results: Vec<ResultLink> = search(&session.corpus, query, DEFAULT_LIMIT)
            .into_iter()
            .map(|item| ResultLink {
                id: item.id.clone(),
                title: item.title.clone(),
                meta: humanize_section(&item.section),
                summary: item.summary.clone(),
                href: self.router.local_ref(&item.id),
                active: item.id == current,
            })
            .collect();
        self.view.borrow_mut().show_results(&results);
    }

    /// Escape inside the search field.
    pub fn search_escape(&self) {
        self.close_search();
        self.view.borrow_mut().blur_search();
    }

    /// Global key handling. Returns `true` when the key was consumed.
    pub fn key_down(&self, press: &KeyPress) -> bool {
        if (press.ctrl || press.meta) && press.key.eq_ignore_ascii_case("k") {
            self.view.borrow_mut().focus_search();
            return true;
        }
        if press.key == "/" && !press.ctrl && !press.meta && !press.alt {
            if press.editable_focus || press.in_search {
                return false;
            }
            self.view.borrow_mut().focus_search();
            return true;
        }
        if press.key == "Escape" && press.in_search {
            self.search_escape();
            return true;
        }
        false
    }

    fn close_search(&self) {
        let mut view = self.view.borrow_mut();
        view.clear_search();
        view.hide_results();
    }

    async fn render_document(&self, id: &str, mode: HistoryMode) {
        let Some(session) = self.session.get() else {
            return;
        };
        let Some(entry) = session
            .index
            .get(id)
            .or_else(|| session.index.get(&self.settings.default_id))
        else {
            return;
        };

        self.phase.set(Phase::Loading);
        {
            let mut view = self.view.borrow_mut();
            view.show_nav(&self.nav_groups(&session.index, &entry.id));
            self.set_current_identifier(&entry.id, mode);
            view.set_breadcrumb(&format!("{} / {}", humanize_section(&entry.section), entry.title));
            let (prev, next) = session.index.neighbours(&entry.id);
            let prev = prev.map(|prev| self.page_link("Previous", prev));
            let next = next.map(|next| self.page_link("Next", next));
            view.set_prev_next(prev.as_ref(), next.as_ref());
        }

        let url = format!("{}{}", self.settings.base, entry.file);
        let raw = match self.fetcher.fetch(&url).await {
            Ok(raw) => raw,
            Err(err) => {
                log!("nav"; "cannot load `{}`: {err}", entry.id);
                let mut view = self.view.borrow_mut();
                view.set_content(NOT_FOUND_HTML);
                view.set_toc(None);
                self.phase.set(Phase::Error);
                return;
            }
        };

        let page = self.render_source(session, entry, &raw);
        let mut view = self.view.borrow_mut();
        view.set_content(&page.html);
        view.set_toc(Some(&page.toc).filter(|toc| !toc.is_empty()));
        view.set_title(&format!(
            "{} · {} · {}",
            entry.title, self.settings.title_suffix, self.settings.site_name
        ));
        if let Some(fragment) = self.history.location().fragment_id() {
            if page.has_id(fragment) {
                view.scroll_to(fragment);
            }
        }
        self.phase.set(Phase::Ready);
    }

    fn render_source(&self, session: &Session, entry: &DocumentEntry, raw: &str) -> Processed {
        let text = self.pipeline.sanitizer.sanitize(raw);
        let html = if entry.file.ends_with(".md") {
            self.pipeline.renderer.render(&text)
        } else {
            plaintext_block(&text)
        };

        let post = PostProcess {
            current_file: &entry.file,
            linker: Linker::new(&self.router, &session.refs),
            highlighter: self.pipeline.highlighter.as_ref(),
        };
        post.run(&html).unwrap_or_else(|err| {
            log!("render"; "post-processing `{}` failed: {err}", entry.id);
            Processed {
                html,
                ..Processed::default()
            }
        })
    }

    fn nav_groups(&self, index: &DocumentIndex, current: &str) -> Vec<NavGroup> {
        index
            .sections()
            .map(|(name, entries)| NavGroup {
                title: humanize_section(name),
                links: entries
                    .iter()
                    .map(|entry| NavLink {
                        id: entry.id.clone(),
                        title: entry.title.clone(),
                        href: self.router.local_ref(&entry.id),
                        active: entry.id == current,
                    })
                    .collect(),
            })
            .collect()
    }

    fn page_link(&self, label: &'static str, entry: &DocumentEntry) -> PageLink {
        PageLink {
            label,
            title: entry.title.clone(),
            href: self.router.local_ref(&entry.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::oneshot;

    use super::*;
    use crate::nav::{MemoryHistory, PageView};

    const INDEX: &str = r#"{"sections": [
        {"name": "overview", "items": [
            {"id": "start", "title": "Start", "file": "start.md"}
        ]},
        {"name": "guide", "items": [
            {"id": "intro", "title": "Introduction", "file": "guide/intro.md"},
            {"id": "setup", "title": "Setup", "file": "guide/setup.md"},
            {"id": "notes", "title": "Notes", "file": "guide/notes.txt"},
            {"id": "gone", "title": "Gone", "file": "guide/gone.md"}
        ]}
    ]}"#;

    const SEARCH: &str = r#"{"items": [
        {"id": "start", "title": "Start", "section": "overview", "text": "welcome"},
        {"id": "setup", "title": "Setup", "section": "guide", "summary": "Install the toolchain."},
        {"id": "intro", "title": "Introduction", "section": "guide", "text": "setup comes next"}
    ]}"#;

    const WIKI: &str = r#"{"sections": [{"name": "lang", "items": [
        {"id": "lang/types", "title": "Types", "file": "lang/types.md"}
    ]}]}"#;

    /// Serves canned bodies; a gated URL waits for its sender.
    #[derive(Default)]
    struct Scripted {
        bodies: HashMap<String, String>,
        gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    }

    impl Scripted {
        fn site() -> Self {
            let mut scripted = Self::default();
            for (url, body) in [
                ("index.json", INDEX),
                ("search.json", SEARCH),
                ("../wiki/index.json", WIKI),
                ("source/start.md", "# Start\n\nWelcome. See `guide/intro.md`.\n"),
                (
                    "source/guide/intro.md",
                    "# Introduction\n\n## Status\n\ninternal\n\n## Usage\n\nRead [setup](setup.md#install) and [types](wiki/lang/types.md).\n",
                ),
                ("source/guide/setup.md", "# Setup\n\n## Install\n\nRun it.\n"),
                ("source/guide/notes.txt", "plain <text>"),
            ] {
                scripted.bodies.insert(url.to_owned(), body.to_owned());
            }
            scripted
        }

        fn without(mut self, url: &str) -> Self {
            self.bodies.remove(url);
            self
        }

        fn gate(&self, url: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().insert(url.to_owned(), rx);
            tx
        }
    }

    impl Fetch for Scripted {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            let gate = self.gates.borrow_mut().remove(url);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.bodies.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_owned(),
                status: 404,
            })
        }
    }

    type TestController = Controller<Scripted, MemoryHistory, PageView>;

    fn controller_at(fetcher: Scripted, url: &str) -> TestController {
        let pipeline = Pipeline::new(Sanitizer::new(Default::default()).unwrap());
        Controller::new(
            ViewerSettings::default(),
            pipeline,
            fetcher,
            MemoryHistory::new(Location::parse(url)),
            PageView::default(),
        )
    }

    async fn started(url: &str) -> TestController {
        let controller = controller_at(Scripted::site(), url);
        controller.start().await.unwrap();
        controller
    }

    #[tokio::test]
    async fn test_start_renders_default_document() {
        let controller = started("/docs/").await;
        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(controller.current_identifier(), "start");
        assert_eq!(controller.history().len(), 1);
        assert_eq!(controller.history().location().to_string(), "/docs/?p=start");

        let view = controller.view();
        assert_eq!(view.title, "Start · Silk Docs · Oro Computer");
        assert_eq!(view.breadcrumb, "Start / Start");
        assert!(view.prev.is_empty());
        assert!(view.next.contains(r#"href="?p=intro""#));
        assert!(view.nav.contains(r#"data-doc-id="start" data-active="true""#));
        assert!(view.content.contains(r#"<a class="docs-inline-ref" href="?p=intro">Introduction</a>"#));
        assert_eq!(view.toc, None);
    }

    #[tokio::test]
    async fn test_startup_failure_is_terminal() {
        let controller = controller_at(Scripted::site().without("index.json"), "/docs/");
        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, StartupError::IndexUnavailable(_)));
        assert_eq!(controller.phase(), Phase::Error);
        assert_eq!(controller.view().content, UNAVAILABLE_HTML);
        assert!(controller.view().nav.is_empty());

        // nothing is initialized afterwards
        controller.navigate("intro").await;
        controller.search_input("setup");
        assert_eq!(controller.view().content, UNAVAILABLE_HTML);
        assert_eq!(controller.view().results, None);
    }

    #[tokio::test]
    async fn test_manifest_without_sections() {
        let mut fetcher = Scripted::site();
        fetcher.bodies.insert("index.json".to_owned(), r#"{"kind": "docs"}"#.to_owned());
        let controller = controller_at(fetcher, "/docs/");
        assert!(matches!(controller.start().await, Err(StartupError::MissingSections)));
    }

    #[tokio::test]
    async fn test_optional_manifests_degrade() {
        let fetcher = Scripted::site().without("search.json").without("../wiki/index.json");
        let controller = controller_at(fetcher, "/docs/?p=intro");
        controller.start().await.unwrap();

        // cross-collection links still route, by path
        assert!(controller.view().content.contains(r#"href="../wiki/?p=lang%2Ftypes""#));
        controller.search_input("setup");
        assert_eq!(
            controller.view().results.as_deref(),
            Some(r#"<div class="docs-search-empty">No results.</div>"#)
        );
    }

    #[tokio::test]
    async fn test_navigate_round_trip() {
        let controller = started("/docs/").await;
        controller.navigate("setup").await;
        assert_eq!(controller.current_identifier(), "setup");
        assert_eq!(controller.history().len(), 2);

        controller.navigate("no-such-doc").await;
        assert_eq!(controller.current_identifier(), "start");
        assert_eq!(controller.view().title, "Start · Silk Docs · Oro Computer");
    }

    #[tokio::test]
    async fn test_document_render() {
        let controller = started("/docs/?p=intro").await;
        let view = controller.view();
        assert_eq!(view.breadcrumb, "Guide / Introduction");
        assert!(!view.content.contains("internal"));
        assert!(!view.content.contains("Status"));
        assert!(view.content.contains(r#"href="?p=setup#install""#));
        assert!(view.content.contains(r#"href="../wiki/?p=lang%2Ftypes""#));
        assert!(view.content.contains(
            r##"<h2 id="usage">Usage<a class="docs-heading-anchor" href="#usage" aria-label="Link to this section">#</a></h2>"##
        ));
        let toc = view.toc.as_deref().unwrap();
        assert!(toc.contains(r##"<a href="#usage">Usage</a>"##));
        assert!(view.prev.contains("Start"));
        assert!(view.next.contains("Setup"));
    }

    #[tokio::test]
    async fn test_plaintext_source() {
        let controller = started("/docs/?p=notes").await;
        assert_eq!(
            controller.view().content,
            r#"<pre><code class="language-plaintext">plain &lt;text&gt;</code></pre>"#
        );
    }

    #[tokio::test]
    async fn test_document_failure_is_local() {
        let controller = started("/docs/").await;
        controller.navigate("gone").await;
        assert_eq!(controller.phase(), Phase::Error);

        {
            let view = controller.view();
            assert_eq!(view.content, NOT_FOUND_HTML);
            assert_eq!(view.toc, None);
            assert_eq!(view.breadcrumb, "Guide / Gone");
            assert!(view.nav.contains(r#"data-doc-id="gone" data-active="true""#));
        }

        // and the reader keeps working
        controller.navigate("setup").await;
        assert_eq!(controller.phase(), Phase::Ready);
        assert!(controller.view().content.contains("Run it."));
    }

    #[tokio::test]
    async fn test_fragment_scroll() {
        let controller = started("/docs/?p=setup#install").await;
        assert_eq!(controller.view().scrolled_to.as_deref(), Some("install"));
        assert_eq!(controller.history().location().to_string(), "/docs/?p=setup#install");

        // the fragment is carried forward; a page without that id does not scroll
        controller.navigate("intro").await;
        assert_eq!(controller.history().location().fragment, "#install");
        assert_eq!(controller.view().scrolled_to, None);
    }

    #[tokio::test]
    async fn test_pop_state() {
        let controller = started("/docs/").await;
        controller.navigate("setup").await;
        controller.navigate("intro").await;

        controller.history().back();
        controller.pop_state().await;
        assert_eq!(controller.current_identifier(), "setup");
        assert!(controller.view().content.contains("Run it."));
        assert_eq!(controller.history().len(), 3);
    }

    #[tokio::test]
    async fn test_follow_link() {
        let controller = started("/docs/").await;
        assert!(controller.follow_link("?p=setup").await);
        assert_eq!(controller.current_identifier(), "setup");
        assert!(!controller.follow_link("../wiki/?p=lang%2Ftypes").await);
        assert!(!controller.follow_link("https://example.com").await);
    }

    #[tokio::test]
    async fn test_search_overlay() {
        let controller = started("/docs/?p=setup").await;
        controller.search_input("  setup ");
        {
            let view = controller.view();
            assert!(view.nav_hidden);
            let results = view.results.as_deref().unwrap();
            let setup = results.find(r#"data-doc-id="setup""#).unwrap();
            let intro = results.find(r#"data-doc-id="intro""#).unwrap();
            assert!(setup < intro);
            assert!(results.contains(r#"data-doc-id="setup" data-active="true""#));
            assert!(results.contains("Install the toolchain."));
        }

        controller.search_input("");
        assert!(!controller.view().nav_hidden);
        assert_eq!(controller.view().results, None);

        controller.search_input("setup");
        controller.select_result("intro").await;
        let view = controller.view();
        assert_eq!(view.results, None);
        assert!(!view.nav_hidden);
        assert_eq!(view.search_cleared, 1);
        assert_eq!(view.breadcrumb, "Guide / Introduction");
    }

    #[tokio::test]
    async fn test_keys() {
        let controller = started("/docs/").await;

        let slash = KeyPress::new("/");
        assert!(controller.key_down(&slash));
        assert!(controller.view().search_focused);

        let escape = KeyPress {
            in_search: true,
            editable_focus: true,
            ..KeyPress::new("Escape")
        };
        controller.search_input("setup");
        assert!(controller.key_down(&escape));
        assert!(!controller.view().search_focused);
        assert_eq!(controller.view().results, None);

        let typing = KeyPress {
            editable_focus: true,
            ..KeyPress::new("/")
        };
        assert!(!controller.key_down(&typing));
        assert!(!controller.view().search_focused);

        let chord = KeyPress {
            meta: true,
            editable_focus: true,
            ..KeyPress::new("K")
        };
        assert!(controller.key_down(&chord));
        assert!(controller.view().search_focused);

        assert!(!controller.key_down(&KeyPress::new("x")));
    }

    #[tokio::test]
    async fn test_last_completed_navigation_wins() {
        let controller = started("/docs/").await;
        let release_intro = controller.fetcher.gate("source/guide/intro.md");

        let slow = controller.navigate("intro");
        let fast = async {
            controller.navigate("setup").await;
            let _ = release_intro.send(());
        };
        tokio::join!(slow, fast);

        // the URL follows request order, the content follows completion order
        assert_eq!(controller.current_identifier(), "setup");
        assert!(controller.view().content.contains("Usage"));
        assert_eq!(controller.phase(), Phase::Ready);
    }
}
