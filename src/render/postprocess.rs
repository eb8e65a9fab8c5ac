//! Streaming rewrite of rendered document HTML.
//!
//! One pass over the markup:
//! - `<a href>` pointing at documents become reader addresses
//! - inline `<code>` naming a document becomes a titled link, meta files vanish
//! - `h2`-`h4` with an id gain a trailing `#` anchor
//! - `h2`/`h3` with an id feed the table of contents
//! - `pre > code` blocks go through the highlighter
//! - every element id is collected for fragment scrolling

use std::io::Cursor;

use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use super::{
    Highlight, RenderError,
    links::{InlineRef, Linker},
    toc::{TOC_LEVELS, Toc, TocEntry},
};

type HtmlWriter = Writer<Cursor<Vec<u8>>>;

/// Heading levels that receive a `#` anchor.
const ANCHOR_LEVELS: [u8; 3] = [2, 3, 4];

const HEADING_ANCHOR_CLASS: &str = "docs-heading-anchor";
const INLINE_REF_CLASS: &str = "docs-inline-ref";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processed {
    pub html: String,
    pub toc: Toc,
    /// Element ids in document order.
    pub ids: Vec<String>,
}

impl Processed {
    pub fn has_id(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }
}

/// Post-processing context for one document.
pub struct PostProcess<'a> {
    pub current_file: &'a str,
    pub linker: Linker<'a>,
    pub highlighter: &'a dyn Highlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Pre,
    Code,
    Link,
    Heading(u8),
    Other,
}

impl Tag {
    fn of(name: &[u8]) -> Self {
        match name {
            b"pre" => Self::Pre,
            b"code" => Self::Code,
            b"a" => Self::Link,
            [b'h', level @ b'1'..=b'6'] => Self::Heading(level - b'0'),
            _ => Self::Other,
        }
    }
}

struct OpenHeading {
    level: u8,
    id: Option<String>,
    text: String,
    has_anchor: bool,
    in_anchor: bool,
}

struct CodeCapture {
    start: BytesStart<'static>,
    events: Vec<Event<'static>>,
    text: String,
    block: bool,
}

#[derive(Default)]
struct State {
    pre_depth: usize,
    link_depth: usize,
    heading: Option<OpenHeading>,
    code: Option<CodeCapture>,
    toc: Toc,
    ids: Vec<String>,
}

impl State {
    fn heading_text(&mut self, text: &str) {
        if let Some(heading) = self.heading.as_mut().filter(|h| !h.in_anchor) {
            heading.text.push_str(text);
        }
    }
}

impl PostProcess<'_> {
    pub fn run(&self, html: &str) -> Result<Processed, RenderError> {
        let mut reader = Reader::from_reader(html.as_bytes());
        reader.config_mut().trim_text(false);
        reader.config_mut().enable_all_checks(false);

        let mut writer = Writer::new(Cursor::new(Vec::with_capacity(html.len() + 256)));
        let mut state = State::default();

        loop {
            let event = reader.read_event().map_err(|source| RenderError::Html {
                position: reader.error_position() as u64,
                source,
            })?;
            if matches!(event, Event::Eof) {
                break;
            }
            self.handle(&mut writer, &mut state, event)?;
        }

        // unterminated code span at end of input
        if let Some(capture) = state.code.take() {
            write_capture(&mut writer, capture)?;
        }

        let bytes = writer.into_inner().into_inner();
        Ok(Processed {
            html: String::from_utf8_lossy(&bytes).into_owned(),
            toc: state.toc,
            ids: state.ids,
        })
    }

    fn handle(&self, writer: &mut HtmlWriter, state: &mut State, event: Event<'_>) -> Result<(), RenderError> {
        if let Some(mut capture) = state.code.take() {
            match event {
                Event::End(end) if Tag::of(end.name().as_ref()) == Tag::Code => {
                    return self.finish_code(writer, state, capture);
                }
                Event::Text(text) => {
                    capture.text.push_str(&decode_text(&text));
                    capture.events.push(Event::Text(text.into_owned()));
                }
                Event::GeneralRef(entity) => {
                    capture.text.push_str(&decode_entity(&entity));
                    capture.events.push(Event::GeneralRef(entity.into_owned()));
                }
                other => capture.events.push(other.into_owned()),
            }
            state.code = Some(capture);
            return Ok(());
        }

        match event {
            Event::Start(elem) => self.start(writer, state, elem)?,
            Event::Empty(elem) => {
                state.ids.extend(attr_value(&elem, b"id"));
                let elem = match Tag::of(elem.name().as_ref()) {
                    Tag::Link => self.rewrite_link(elem),
                    _ => elem,
                };
                writer.write_event(Event::Empty(elem))?;
            }
            Event::End(elem) => self.end(writer, state, elem)?,
            Event::Text(text) => {
                state.heading_text(&decode_text(&text));
                writer.write_event(Event::Text(text))?;
            }
            Event::GeneralRef(entity) => {
                state.heading_text(&decode_entity(&entity));
                writer.write_event(Event::GeneralRef(entity))?;
            }
            other => writer.write_event(other)?,
        }
        Ok(())
    }

    fn start(&self, writer: &mut HtmlWriter, state: &mut State, elem: BytesStart<'_>) -> Result<(), RenderError> {
        state.ids.extend(attr_value(&elem, b"id"));

        match Tag::of(elem.name().as_ref()) {
            Tag::Pre => {
                state.pre_depth += 1;
                writer.write_event(Event::Start(elem))?;
            }
            Tag::Code => {
                state.code = Some(CodeCapture {
                    start: elem.into_owned(),
                    events: Vec::new(),
                    text: String::new(),
                    block: state.pre_depth > 0,
                });
            }
            Tag::Link => {
                state.link_depth += 1;
                if has_class(&elem, HEADING_ANCHOR_CLASS) {
                    if let Some(heading) = state.heading.as_mut() {
                        heading.has_anchor = true;
                        heading.in_anchor = true;
                    }
                }
                writer.write_event(Event::Start(self.rewrite_link(elem)))?;
            }
            Tag::Heading(level) => {
                state.heading = Some(OpenHeading {
                    level,
                    id: attr_value(&elem, b"id").filter(|id| !id.is_empty()),
                    text: String::new(),
                    has_anchor: false,
                    in_anchor: false,
                });
                writer.write_event(Event::Start(elem))?;
            }
            Tag::Other => writer.write_event(Event::Start(elem))?,
        }
        Ok(())
    }

    fn end(&self, writer: &mut HtmlWriter, state: &mut State, elem: BytesEnd<'_>) -> Result<(), RenderError> {
        match Tag::of(elem.name().as_ref()) {
            Tag::Pre => state.pre_depth = state.pre_depth.saturating_sub(1),
            Tag::Link => {
                state.link_depth = state.link_depth.saturating_sub(1);
                if let Some(heading) = state.heading.as_mut() {
                    heading.in_anchor = false;
                }
            }
            Tag::Heading(level) if state.heading.as_ref().is_some_and(|h| h.level == level) => {
                if let Some(heading) = state.heading.take() {
                    close_heading(writer, &mut state.toc, heading)?;
                }
            }
            _ => {}
        }
        writer.write_event(Event::End(elem))?;
        Ok(())
    }

    fn finish_code(&self, writer: &mut HtmlWriter, state: &mut State, capture: CodeCapture) -> Result<(), RenderError> {
        if capture.block {
            let lang = attr_value(&capture.start, b"class").and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|name| name.strip_prefix("language-"))
                    .map(str::to_owned)
            });
            return match self.highlighter.highlight(lang.as_deref(), &capture.text) {
                Ok(Some(inner)) => {
                    writer.write_event(Event::Start(with_class(&capture.start, "hljs")))?;
                    writer.write_event(Event::Text(BytesText::from_escaped(inner)))?;
                    writer.write_event(Event::End(BytesEnd::new("code")))?;
                    Ok(())
                }
                // highlighting failures leave the block as rendered
                Ok(None) | Err(_) => write_capture(writer, capture),
            };
        }

        let inline = if state.link_depth > 0 {
            InlineRef::Keep
        } else {
            self.linker.inline_ref(self.current_file, &capture.text)
        };

        match inline {
            InlineRef::Drop => Ok(()),
            InlineRef::Link { href, title } => {
                state.heading_text(&title);
                let mut link = BytesStart::new("a");
                link.push_attribute(("class", INLINE_REF_CLASS));
                link.push_attribute(("href", href.as_str()));
                writer.write_event(Event::Start(link))?;
                writer.write_event(Event::Text(BytesText::new(&title)))?;
                writer.write_event(Event::End(BytesEnd::new("a")))?;
                Ok(())
            }
            InlineRef::Keep => {
                state.heading_text(&capture.text);
                write_capture(writer, capture)
            }
        }
    }

    /// Replace a document href with its reader address.
    fn rewrite_link<'e>(&self, elem: BytesStart<'e>) -> BytesStart<'e> {
        let Some(next) = attr_value(&elem, b"href")
            .and_then(|href| self.linker.rewrite_href(self.current_file, &href))
        else {
            return elem;
        };

        let mut rebuilt = BytesStart::new(String::from_utf8_lossy(elem.name().as_ref()).into_owned());
        for attr in elem.html_attributes().flatten() {
            if attr.key.as_ref() == b"href" {
                rebuilt.push_attribute(("href", next.as_str()));
            } else {
                rebuilt.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
            }
        }
        rebuilt
    }
}

fn close_heading(writer: &mut HtmlWriter, toc: &mut Toc, heading: OpenHeading) -> Result<(), RenderError> {
    let Some(id) = heading.id else {
        return Ok(());
    };

    if ANCHOR_LEVELS.contains(&heading.level) && !heading.has_anchor {
        let mut anchor = BytesStart::new("a");
        anchor.push_attribute(("class", HEADING_ANCHOR_CLASS));
        anchor.push_attribute(("href", format!("#{id}").as_str()));
        anchor.push_attribute(("aria-label", "Link to this section"));
        writer.write_event(Event::Start(anchor))?;
        writer.write_event(Event::Text(BytesText::new("#")))?;
        writer.write_event(Event::End(BytesEnd::new("a")))?;
    }

    if TOC_LEVELS.contains(&heading.level) {
        toc.push(TocEntry {
            level: heading.level,
            text: heading.text.trim().to_owned(),
            id,
        });
    }
    Ok(())
}

fn write_capture(writer: &mut HtmlWriter, capture: CodeCapture) -> Result<(), RenderError> {
    writer.write_event(Event::Start(capture.start))?;
    for event in capture.events {
        writer.write_event(event)?;
    }
    writer.write_event(Event::End(BytesEnd::new("code")))?;
    Ok(())
}

/// Copy of `elem` with `class` appended to its class list.
fn with_class(elem: &BytesStart<'_>, class: &str) -> BytesStart<'static> {
    let mut rebuilt = BytesStart::new(String::from_utf8_lossy(elem.name().as_ref()).into_owned());
    let mut found = false;
    for attr in elem.html_attributes().flatten() {
        if attr.key.as_ref() == b"class" {
            let merged = format!("{} {class}", decode_text(&attr.value));
            rebuilt.push_attribute(("class", merged.trim_start()));
            found = true;
        } else {
            rebuilt.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    if !found {
        rebuilt.push_attribute(("class", class));
    }
    rebuilt
}

fn attr_value(elem: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    elem.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| decode_text(&attr.value))
}

fn has_class(elem: &BytesStart<'_>, class: &str) -> bool {
    attr_value(elem, b"class").is_some_and(|value| value.split_whitespace().any(|name| name == class))
}

/// Unescape raw markup text; malformed escapes are kept verbatim.
fn decode_text(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    match unescape(&raw) {
        Ok(text) => text.into_owned(),
        Err(_) => raw.into_owned(),
    }
}

fn decode_entity(name: &[u8]) -> String {
    decode_text(format!("&{};", String::from_utf8_lossy(name)).as_bytes())
}
