//! Author-written references → reader addresses.
//!
//! Anything that does not resolve is left as written.

use folio_core::{
    Collection, NavRouter,
    path::{file_to_id, is_external_href, normalize, resolve_relative},
};

use crate::manifest::CrossRefs;

/// Internal process documents; code spans naming them are removed.
pub const META_REFS: [&str; 4] = ["STATUS.md", "PLAN.md", "llms.txt", "README.md"];

/// What to do with an inline `<code>` span outside code blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineRef {
    Keep,
    Drop,
    Link { href: String, title: String },
}

#[derive(Debug, Clone, Copy)]
pub struct Linker<'a> {
    router: &'a NavRouter,
    refs: &'a CrossRefs,
}

impl<'a> Linker<'a> {
    pub fn new(router: &'a NavRouter, refs: &'a CrossRefs) -> Self {
        Self { router, refs }
    }

    pub fn router(&self) -> &NavRouter {
        self.router
    }

    /// Reader address for a document link in `current_file`, or `None` to
    /// leave the href alone.
    pub fn rewrite_href(&self, current_file: &str, href: &str) -> Option<String> {
        if href.is_empty()
            || href.starts_with('#')
            || is_external_href(href)
            || self.router.is_nav_ref(href)
        {
            return None;
        }

        // only the text up to a second `#` is kept as the fragment
        let mut parts = href.split('#');
        let path = parts.next().unwrap_or_default();
        let fragment = match parts.next() {
            Some(fragment) if !fragment.is_empty() => format!("#{fragment}"),
            _ => String::new(),
        };

        let collections = &self.router.collections;
        if !collections.looks_like_doc(path) {
            return None;
        }

        let resolved = if collections.is_prefixed(path) {
            normalize(path)
        } else {
            resolve_relative(current_file, path).or_else(|| normalize(path))
        }?;

        let classified = collections.classify(&resolved);
        let file = normalize(classified.file)?;
        let id = self.id_for(classified.collection, &file)?;
        Some(self.router.nav_ref(classified.collection, &id, &fragment))
    }

    /// Classify the text of an inline code span.
    pub fn inline_ref(&self, current_file: &str, text: &str) -> InlineRef {
        let raw = text.trim();
        if raw.is_empty() {
            return InlineRef::Keep;
        }
        if META_REFS.contains(&raw) {
            return InlineRef::Drop;
        }

        let Some(normalized) = normalize(raw).or_else(|| resolve_relative(current_file, raw)) else {
            return InlineRef::Keep;
        };

        let collections = &self.router.collections;
        let classified = collections.classify(&normalized);
        let mut file = classified.file.to_owned();
        // bare filenames are siblings of the current document
        if !collections.is_prefixed(raw) && !raw.contains('/') {
            file = resolve_relative(current_file, &file).unwrap_or(file);
        }

        let Some(file) = normalize(&file) else {
            return InlineRef::Keep;
        };
        let Some(id) = self.id_for(classified.collection, &file) else {
            return InlineRef::Keep;
        };
        match self.refs.title(&id) {
            Some(title) => InlineRef::Link {
                href: self.router.nav_ref(classified.collection, &id, ""),
                title: title.to_owned(),
            },
            None => InlineRef::Keep,
        }
    }

    fn id_for(&self, collection: Collection, file: &str) -> Option<String> {
        let id = self
            .refs
            .id_for(collection, file)
            .unwrap_or_else(|| file_to_id(file));
        (!id.is_empty()).then(|| id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DocumentIndex, NavManifest, parse_manifest};
    use folio_core::Collections;

    fn refs_for(active: Collection) -> CrossRefs {
        let local: NavManifest = parse_manifest(
            r#"{"sections": [{"name": "guide", "items": [
                {"id": "intro", "title": "Introduction", "file": "guide/intro.md"},
                {"id": "setup", "title": "Setup", "file": "guide/setup.md"}
            ]}]}"#,
        )
        .unwrap();
        let other: NavManifest = parse_manifest(
            r#"{"sections": [{"name": "lang", "items": [
                {"id": "lang/types", "title": "Types", "file": "lang/types.md"}
            ]}]}"#,
        )
        .unwrap();
        CrossRefs::new(active, &DocumentIndex::from_manifest(&local), Some(&other))
    }

    fn router_for(active: Collection) -> NavRouter {
        NavRouter::new(Collections::default(), active, "p")
    }

    #[test]
    fn test_rewrite_same_collection() {
        let (router, refs) = (router_for(Collection::Primary), refs_for(Collection::Primary));
        let linker = Linker::new(&router, &refs);
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "setup.md#step-2").as_deref(),
            Some("?p=setup#step-2")
        );
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "docs/guide/intro.md").as_deref(),
            Some("?p=intro")
        );
        // unknown files fall back to the path without extension
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "../faq.md").as_deref(),
            Some("?p=faq")
        );
    }

    #[test]
    fn test_rewrite_cross_collection() {
        let (router, refs) = (router_for(Collection::Primary), refs_for(Collection::Primary));
        let linker = Linker::new(&router, &refs);
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "wiki/lang/types.md#generics").as_deref(),
            Some("../wiki/?p=lang%2Ftypes#generics")
        );

        let (router, refs) = (router_for(Collection::Secondary), refs_for(Collection::Secondary));
        let linker = Linker::new(&router, &refs);
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "docs/lang/types.md").as_deref(),
            Some("../docs/?p=lang%2Ftypes")
        );
    }

    #[test]
    fn test_rewrite_fragment_stops_at_second_hash() {
        let (router, refs) = (router_for(Collection::Primary), refs_for(Collection::Primary));
        let linker = Linker::new(&router, &refs);
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "setup.md#step-2#extra").as_deref(),
            Some("?p=setup#step-2")
        );
        assert_eq!(
            linker.rewrite_href("guide/intro.md", "setup.md##late").as_deref(),
            Some("?p=setup")
        );
    }

    #[test]
    fn test_rewrite_leaves_other_hrefs() {
        let (router, refs) = (router_for(Collection::Primary), refs_for(Collection::Primary));
        let linker = Linker::new(&router, &refs);
        for href in [
            "",
            "#anchor",
            "https://example.com/a.md",
            "mailto:someone@example.com",
            "?p=intro",
            "/assets/logo.png",
            "../../../escape.md",
        ] {
            assert_eq!(linker.rewrite_href("guide/intro.md", href), None, "{href}");
        }
    }

    #[test]
    fn test_inline_refs() {
        let (router, refs) = (router_for(Collection::Primary), refs_for(Collection::Primary));
        let linker = Linker::new(&router, &refs);
        assert_eq!(linker.inline_ref("guide/intro.md", " STATUS.md "), InlineRef::Drop);
        assert_eq!(
            linker.inline_ref("guide/intro.md", "setup.md"),
            InlineRef::Link {
                href: "?p=setup".to_owned(),
                title: "Setup".to_owned()
            }
        );
        assert_eq!(
            linker.inline_ref("start.md", "wiki/lang/types.md"),
            InlineRef::Link {
                href: "../wiki/?p=lang%2Ftypes".to_owned(),
                title: "Types".to_owned()
            }
        );
        assert_eq!(linker.inline_ref("guide/intro.md", "Vec<u8>"), InlineRef::Keep);
        assert_eq!(linker.inline_ref("guide/intro.md", "  "), InlineRef::Keep);
    }
}
