//! Reader addresses and the history they live in.

use std::fmt;

use parking_lot::Mutex;

/// `path?query#fragment`, with the query kept as ordered pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    query: Vec<(String, String)>,
    /// `#anchor` or empty.
    pub fragment: String,
}

impl Location {
    pub fn parse(url: &str) -> Self {
        let (rest, fragment) = match url.find('#') {
            Some(idx) => (&url[..idx], url[idx..].to_owned()),
            None => (url, String::new()),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self {
            path: path.to_owned(),
            query,
            fragment: if fragment == "#" { String::new() } else { fragment },
        }
    }

    /// First value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Set a parameter in place, dropping any repeats of it.
    pub fn set_param(&mut self, key: &str, value: &str) {
        match self.query.iter().position(|(name, _)| name == key) {
            Some(idx) => {
                self.query[idx].1 = value.to_owned();
                let mut seen = 0;
                self.query.retain(|(name, _)| {
                    if name != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.query.push((key.to_owned(), value.to_owned())),
        }
    }

    /// Fragment without the leading `#`, if any.
    pub fn fragment_id(&self) -> Option<&str> {
        self.fragment.strip_prefix('#').filter(|id| !id.is_empty())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (idx, (key, value)) in self.query.iter().enumerate() {
            let sep = if idx == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", urlencoding::encode(key), urlencoding::encode(value))?;
        }
        f.write_str(&self.fragment)
    }
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

/// Session history of the reader.
pub trait History {
    fn location(&self) -> Location;
    fn push(&self, location: Location);
    fn replace(&self, location: Location);
}

#[derive(Debug)]
struct Entries {
    stack: Vec<Location>,
    cursor: usize,
}

/// In-memory history with back/forward traversal.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Entries>,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: Mutex::new(Entries {
                stack: vec![initial],
                cursor: 0,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().stack.is_empty()
    }

    /// Step back; the new current location, if there was one to go to.
    pub fn back(&self) -> Option<Location> {
        let mut entries = self.entries.lock();
        entries.cursor = entries.cursor.checked_sub(1)?;
        Some(entries.stack[entries.cursor].clone())
    }

    pub fn forward(&self) -> Option<Location> {
        let mut entries = self.entries.lock();
        if entries.cursor + 1 >= entries.stack.len() {
            return None;
        }
        entries.cursor += 1;
        Some(entries.stack[entries.cursor].clone())
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let entries = self.entries.lock();
        entries.stack[entries.cursor].clone()
    }

    fn push(&self, location: Location) {
        let mut entries = self.entries.lock();
        let next = entries.cursor + 1;
        entries.stack.truncate(next);
        entries.stack.push(location);
        entries.cursor = next;
    }

    fn replace(&self, location: Location) {
        let mut entries = self.entries.lock();
        let cursor = entries.cursor;
        entries.stack[cursor] = location;
    }
}
