//! Fence-aware markdown sanitizer.
//!
//! Removes authoring and status artifacts from documentation sources while
//! keeping code examples intact apart from their comment text.
//!
//! # Scanner
//!
//! A left-to-right fold over lines with an explicit [`ScanState`]:
//!
//! ```text
//! ```lang        toggles in_code, captures lang        (emitted unless skipping)
//! ## Status      enters skip mode at level 2            (dropped)
//! ...            dropped while skipping
//! ## Next        level <= 2 ends skip mode              (processed normally)
//! ```
//!
//! Outside code, surviving lines pass the status-line policy and the
//! meta-file denylist, then the ordered [`rules`] table. Inside code only
//! [`comment`] text is rewritten.

mod comment;
mod rules;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use rules::{RuleSet, Scope};

/// Upper bound on rewrite passes per line.
const MAX_PASSES: usize = 8;

/// Headings whose whole section is removed.
const STATUS_HEADINGS: &[&str] = &["Status", "Implementation status"];

/// Delimiters after which a trimmed status line keeps its text.
const STATUS_DELIMITERS: &[&str] = &[". ", ": ", "— ", "– "];

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("valid heading regex"));

static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*)(?:Status:|Implementation status:)\s*").expect("valid status regex")
});

/// References to internal process documents.
static META_FILES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(STATUS\.md|PLAN\.md|llms\.txt|docs/llms\.txt|docs/wiki/style-guide\.md|_template-[^`\s]+|style-guide\.md|README\.md)",
    )
    .expect("valid meta-file regex")
});

static DEFAULT: LazyLock<Sanitizer> = LazyLock::new(|| {
    Sanitizer::new(SanitizeOptions::default()).expect("default sanitizer rules compile")
});

/// Sanitize with the default options.
pub fn sanitize(markdown: &str) -> String {
    DEFAULT.sanitize(markdown)
}

/// What happens to a `Status:` / `Implementation status:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLines {
    /// Drop the line.
    #[default]
    Drop,
    /// Keep the text after the first `. `, `: `, `— ` or `– `; drop the line
    /// when there is none.
    Trim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Product name substituted for "the current subset" phrasing.
    pub subject: String,
    pub status_lines: StatusLines,
    /// Extra heading names removed together with their sections.
    pub skip_headings: Vec<String>,
    /// Apply the prose and comment rule table. Structural removals always run.
    pub rewrite: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            subject: "Silk".to_owned(),
            status_lines: StatusLines::Drop,
            skip_headings: Vec::new(),
            rewrite: true,
        }
    }
}

/// State carried from one line to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub in_code: bool,
    /// Lowercase language tag of the open fence.
    pub code_lang: Option<String>,
    /// Heading level of the section being removed.
    pub skip_level: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: RuleSet,
    status_heading: Regex,
    status_lines: StatusLines,
    rewrite: bool,
}

impl Sanitizer {
    pub fn new(options: SanitizeOptions) -> Result<Self, regex::Error> {
        let names = STATUS_HEADINGS
            .iter()
            .copied()
            .chain(options.skip_headings.iter().map(String::as_str))
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            rules: RuleSet::new(&options.subject)?,
            status_heading: Regex::new(&format!(r"(?i)^(#{{1,6}})\s+(?:{names})\b"))?,
            status_lines: options.status_lines,
            rewrite: options.rewrite,
        })
    }

    /// Removals only: status sections, status lines and meta-file lines.
    pub fn structural() -> Result<Self, regex::Error> {
        Self::new(SanitizeOptions {
            rewrite: false,
            ..SanitizeOptions::default()
        })
    }

    pub fn sanitize(&self, markdown: &str) -> String {
        markdown
            .split('\n')
            .scan(ScanState::default(), |state, line| {
                let (next, emitted) = self.step(std::mem::take(state), line);
                *state = next;
                Some(emitted)
            })
            .flatten()
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Process one line: the next state and the line to emit, if any.
    pub fn step(&self, state: ScanState, line: &str) -> (ScanState, Option<String>) {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            let entering = !state.in_code;
            let emitted = state.skip_level.is_none().then(|| line.to_owned());
            let next = ScanState {
                in_code: entering,
                code_lang: if entering { fence_lang(trimmed) } else { None },
                skip_level: state.skip_level,
            };
            return (next, emitted);
        }

        let mut state = state;
        if !state.in_code {
            if let (Some(skip), Some(level)) = (state.skip_level, heading_level(line)) {
                if level <= skip {
                    state.skip_level = None;
                }
            }
            if state.skip_level.is_none() {
                if let Some(level) = self.status_heading_level(line) {
                    state.skip_level = Some(level);
                    return (state, None);
                }
            }
        }

        if state.skip_level.is_some() {
            return (state, None);
        }

        if state.in_code {
            let emitted = if self.rewrite {
                comment::rewrite_code_line(&self.rules, line, state.code_lang.as_deref())
            } else {
                line.to_owned()
            };
            return (state, Some(emitted));
        }

        match self.process_prose(line) {
            None => (state, None),
            // A rewrite never opens a fence.
            Some(out) if is_fence(&out) => (state, Some(line.to_owned())),
            // Nor leaves a status heading behind for the next run to remove.
            Some(out) => match self.status_heading_level(&out) {
                Some(level) => {
                    state.skip_level = Some(level);
                    (state, None)
                }
                None => (state, Some(out)),
            },
        }
    }

    /// Filter and rewrite a prose line until it stops changing.
    fn process_prose(&self, line: &str) -> Option<String> {
        let mut current = self.filter_line(line)?;
        for _ in 0..MAX_PASSES {
            // trimming can surface another status label
            let next = if self.rewrite {
                self.filter_line(&self.rules.rewrite_line(&current))?
            } else {
                self.filter_line(&current)?
            };
            if next == current {
                break;
            }
            current = next;
        }
        Some(current)
    }

    /// Status-line policy and meta-file denylist.
    fn filter_line(&self, line: &str) -> Option<String> {
        let line = match STATUS_LINE.captures(line) {
            Some(caps) => match self.status_lines {
                // Only unindented labels count when dropping.
                StatusLines::Drop if caps[1].is_empty() => return None,
                StatusLines::Drop => line.to_owned(),
                StatusLines::Trim => {
                    let rest = &line[caps[0].len()..];
                    let trimmed = trim_status(&caps[1], rest)?;
                    if trimmed.trim().is_empty() {
                        return None;
                    }
                    trimmed
                }
            },
            None => line.to_owned(),
        };

        if META_FILES.is_match(&line) {
            return None;
        }
        Some(line)
    }

    fn status_heading_level(&self, line: &str) -> Option<usize> {
        self.status_heading.captures(line).map(|caps| caps[1].len())
    }
}

/// Text after the earliest status delimiter, re-indented.
fn trim_status(leading: &str, rest: &str) -> Option<String> {
    STATUS_DELIMITERS
        .iter()
        .filter_map(|delim| rest.find(delim).map(|idx| idx + delim.len()))
        .min_by_key(|&end| end)
        .map(|end| format!("{leading}{}", &rest[end..]))
}

fn fence_lang(trimmed: &str) -> Option<String> {
    trimmed[3..].split_whitespace().next().map(str::to_lowercase)
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn heading_level(line: &str) -> Option<usize> {
    HEADING.captures(line).map(|caps| caps[1].len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_section_removed() {
        let input = "## Status\nsecret\n### sub\nmore secret\n## Next\nkept";
        let out = sanitize(input);
        assert!(out.contains("## Next\nkept"));
        assert!(!out.contains("secret"));
        assert!(!out.contains("more secret"));
        assert!(!out.contains("Status"));
        assert!(!out.contains("sub"));
    }

    #[test]
    fn test_skip_ends_at_shallower_heading() {
        let input = "# Title\n### Implementation status\nx\n## Usage\ny";
        assert_eq!(sanitize(input), "# Title\n## Usage\ny");
    }

    #[test]
    fn test_status_prefix_needs_word_boundary() {
        let input = "## Statuses\nkept\n## Status of loops\ngone";
        assert_eq!(sanitize(input), "## Statuses\nkept");
    }

    #[test]
    fn test_skip_headings_option() {
        let sanitizer = Sanitizer::new(SanitizeOptions {
            skip_headings: vec!["Roadmap".to_owned()],
            ..SanitizeOptions::default()
        })
        .unwrap();
        let input = "## Roadmap\nlater\n## Usage\nnow";
        assert_eq!(sanitizer.sanitize(input), "## Usage\nnow");
    }

    #[test]
    fn test_status_and_meta_lines_dropped() {
        let input = "intro\nStatus: draft\nSee PLAN.md for details.\nImplementation status: partial\nend";
        assert_eq!(sanitize(input), "intro\nend");
    }

    #[test]
    fn test_status_lines_trim() {
        let sanitizer = Sanitizer::new(SanitizeOptions {
            status_lines: StatusLines::Trim,
            ..SanitizeOptions::default()
        })
        .unwrap();
        assert_eq!(
            sanitizer.sanitize("Status: stable. Loops are fast."),
            "Loops are fast."
        );
        assert_eq!(sanitizer.sanitize("  Status: draft — see below"), "  see below");
        assert_eq!(sanitizer.sanitize("a\nStatus: draft\nb"), "a\nb");
    }

    #[test]
    fn test_code_block_untouched() {
        let input = "```silk\nlet works_today = current_subset();\nStatus: ok\nREADME.md\n## Status\n```\nafter";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_code_comments_rewritten() {
        let input = "```silk\nlet x = 1; // works today\n// currently not ready\n```";
        assert_eq!(
            sanitize(input),
            "```silk\nlet x = 1; // Example\n// not ready\n```"
        );
    }

    #[test]
    fn test_fence_lang_tracking() {
        let input = "```TOML\nport = 1 # works today\n```\n```\nport = 1 # works today\n```";
        assert_eq!(
            sanitize(input),
            "```TOML\nport = 1 # Example\n```\n```\nport = 1 # works today\n```"
        );
    }

    #[test]
    fn test_fences_in_skipped_section_are_dropped() {
        let input = "## Status\n```\ncode\n```\n## Next\n```\nkept\n```";
        assert_eq!(sanitize(input), "## Next\n```\nkept\n```");
    }

    #[test]
    fn test_prose_rewrites() {
        let input = "## Syntax (Implemented Subset)\nLoops (works today) run in the current compiler subset.";
        assert_eq!(sanitize(input), "## Syntax\nLoops run in Silk.");
    }

    #[test]
    fn test_line_count_preserved() {
        let input = "a\n\nb (planned)\n\n";
        assert_eq!(sanitize(input), "a\n\nb \n\n");
    }

    #[test]
    fn test_structural_only() {
        let sanitizer = Sanitizer::structural().unwrap();
        let input = "Works today: yes\nStatus: draft\n## Status\ngone\n## Next\n// works today";
        assert_eq!(sanitizer.sanitize(input), "Works today: yes\n## Next\n// works today");
    }

    #[test]
    fn test_structural_trim_repeated_status() {
        let sanitizer = Sanitizer::new(SanitizeOptions {
            status_lines: StatusLines::Trim,
            rewrite: false,
            ..SanitizeOptions::default()
        })
        .unwrap();
        assert_eq!(sanitizer.sanitize("Status: a. Status: b
next"), "next");
        assert_eq!(sanitizer.sanitize("Status: a. Status: b. kept"), "kept");
        for input in ["Status: a. Status: b", "Status: a. Status: b. Status: c. d"] {
            let once = sanitizer.sanitize(input);
            assert_eq!(sanitizer.sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_rewrite_exposing_status_line() {
        assert_eq!(sanitize("Implemented: Status: draft\nnext"), "next");
    }

    #[test]
    fn test_rewrite_never_opens_fence() {
        let input = "Implemented: ```js\nWorks today: yes";
        assert_eq!(sanitize(input), "Implemented: ```js\nExample: yes");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "## Status\nsecret\n## Next\nkept",
            "currently currently not ready",
            "Implemented: Status: draft",
            "## Implemented: Status",
            "Works today:   ```",
            "Implemented: ```js\nbody",
            "- Implemented:   works today: x (current subset)",
            "```js\nf() // currently currently not  ok\n```\nIn the current implementation (planned) it runs.",
            "Use `a (planned)` and (Implemented `b`) now",
            "## Syntax (Selected)\n### Examples (Works today)x\n  Status: indented",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }
}
