//! Ordered rewrite rules.
//!
//! The table below is data: each row is `(scope, pattern, action)` and rows
//! apply top to bottom. Later rows assume earlier rows already fired, so the
//! order is part of the contract.
//!
//! | Scope     | Applied to                                                   |
//! |-----------|--------------------------------------------------------------|
//! | `Prose`   | each text segment outside inline code spans                  |
//! | `Heading` | a segment that still looks like a heading at that point      |
//! | `Tidy`    | the segment body after its leading whitespace                |
//! | `Line`    | the whole line, after segments are joined back               |
//! | `Comment` | comment text inside fenced code blocks                       |

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A segment counts as a heading for `Heading` rules.
static HEADING_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#{1,6}\s").expect("valid heading regex"));

/// Words marking a parenthetical as an implementation-status qualifier.
const STATUS_QUALIFIER: &str =
    r"(?i)(works today|implemented|planned|selected|current\s+(?:subset|compiler|backend|checker|implementation))";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Prose,
    Heading,
    Tidy,
    Line,
    Comment,
}

/// What a matching rule does with the match.
#[derive(Debug, Clone, Copy)]
enum Action {
    /// Replacement template; `${n}` refers to capture groups and
    /// `{subject}` to the configured product name.
    Text(&'static str),
    /// Pick a replacement by the case of the match's first letter.
    MatchCase {
        upper: &'static str,
        lower: &'static str,
    },
    /// `(head)(meta)`: keep only `head` when `meta` is a status qualifier.
    DropQualifier,
}

struct RuleSpec {
    scope: Scope,
    pattern: &'static str,
    action: Action,
}

const fn text(scope: Scope, pattern: &'static str, template: &'static str) -> RuleSpec {
    RuleSpec {
        scope,
        pattern,
        action: Action::Text(template),
    }
}

const fn prose(pattern: &'static str, template: &'static str) -> RuleSpec {
    text(Scope::Prose, pattern, template)
}

const fn comment(pattern: &'static str, template: &'static str) -> RuleSpec {
    text(Scope::Comment, pattern, template)
}

#[rustfmt::skip]
const RULES: &[RuleSpec] = &[
    // Neutral heading titles.
    prose(r"(?i)^(\s*#{1,6}\s+)Relevant Tests\b", "${1}Tests"),
    prose(r"(?i)^(\s*#{1,6}\s+)What works today\b", "${1}Supported behavior"),
    prose(r"(?i)\bwhat works today\b", "supported behavior"),
    prose(r"(?i)^(\s*#{1,6}\s+)Syntax\s*\(Selected\)\s*$", "${1}Syntax"),
    prose(r"(?i)\bCurrent limitations\b", "Limitations"),
    prose(r"\bImplemented in\b", "Defined in"),
    prose(r"(?i)\bExamples\s*\(Works today\)\b", "Examples"),
    prose(r"(?i)\bExample\s*\(Works today\)\s*:", "Example:"),
    prose(r"(?i)^(\s*#{1,6}\s+)Works today:\s*", "${1}Example: "),
    prose(r"(?i)^(\s*#{1,6}\s+)Works today\b", "${1}Example"),
    prose(r"(?i)^(\s*[-*+]\s+)Works today:\s*", "${1}Example: "),
    prose(r"(?i)^(\s*[-*+]\s+)Works today\b", "${1}Example"),
    prose(r"(?i)^\s*Works today:\s*", "Example: "),
    prose(r"(?i)^(\s*)Works today\b", "${1}Example"),
    prose(r"(?i)\(Works today\)", ""),
    // Present tense over "current implementation" framing.
    RuleSpec {
        scope: Scope::Prose,
        pattern: r"(?i)\bIn the current implementation\b",
        action: Action::MatchCase { upper: "Currently", lower: "currently" },
    },
    RuleSpec {
        scope: Scope::Prose,
        pattern: r"(?i)\bthe current implementation\b",
        action: Action::MatchCase { upper: "The implementation", lower: "the implementation" },
    },
    prose(r"(?i)\bcurrent implementation stage\b", "initial bring-up"),
    prose(
        r"(?i)^(\s*(?:[-*+]\s+)?)in the current (?:compiler/backend|compiler|backend|scalar-slot backend)?\s*subset\b",
        "${1}In {subject}",
    ),
    prose(
        r"(?i)\bin the current (?:compiler/backend|compiler|backend|scalar-slot backend)?\s*subset\b",
        "in {subject}",
    ),
    prose(r"(?i)\bthe current compiler/backend subset\b", "the compiler"),
    prose(r"(?i)\bthe current compiler subset\b", "the compiler"),
    prose(r"(?i)\bthe current scalar-slot backend subset\b", "the scalar-slot backend"),
    prose(r"(?i)\bthe current backend subset\b", "the backend"),
    prose(r"(?i)\bCurrent subset limitation\b", "Limitation"),
    prose(r"(?i)\bcurrent\s+(?:subset|support)\b", ""),
    prose(r"(?i)\s*\(\s*current\s+(?:subset|support)[^)]*\)", ""),
    // Status parentheticals on headings.
    text(
        Scope::Heading,
        r"(?i)\s*\([^)]*(works today|implemented|planned|selected|current\s+(?:subset|compiler|backend|checker|implementation))[^)]*\)",
        "",
    ),
    RuleSpec {
        scope: Scope::Prose,
        pattern: r"(?i)^(\s*#{1,6}\s+.+?)\s*\(([^)]+)\)\s*$",
        action: Action::DropQualifier,
    },
    // Status-only headings.
    prose(r"(?i)^(\s*#{1,6}\s+)(?:Current\s+|Initial\s+)?Implemented\s+Subset\s*$", "${1}Details"),
    prose(r"(?i)^(\s*#{1,6}\s+)Implemented\s*$", "${1}Details"),
    prose(r"(?i)^(\s*#{1,6}\s+)Implemented\s+API\b", "${1}API"),
    // "Implemented:" labels in prose and lists.
    prose(r"(?i)^(\s*[-*+]\s+)Implemented\s*:\s*", "${1}"),
    prose(r"(?i)^\s*Implemented\s*:\s*", ""),
    prose(r"(?i)^(\s*[-*+]\s+)?Implemented subset notes:\s*", "${1}Notes: "),
    prose(r"(?i)^(\s*[-*+]\s+)?Implemented initial subset:\s*", "${1}Notes: "),
    prose(r"(?i)^(\s*[-*+]\s+)?Implemented subset:\s*", "${1}Notes: "),
    prose(r"(?i)^(\s*[-*+]\s+)?Implemented runtime areas\b", "${1}Runtime areas"),
    prose(r"(?i)^(\s*[-*+]\s+)?Implemented as\b", "${1}Designed as"),
    prose(r"(?i)\s*\(\s*Implemented[^)]*\)", ""),
    prose(r"(?i)\bcurrently\s+not\b", "not"),
    prose(r"\(\s*\)", ""),
    // Whitespace left behind by the rewrites.
    text(Scope::Tidy, r" {2,}", " "),
    text(Scope::Tidy, r"\s+:", ":"),
    text(Scope::Tidy, r"\s+,", ","),
    text(Scope::Tidy, r"\(\s+", "("),
    text(Scope::Tidy, r"\s+\)", ")"),
    // Parentheticals that straddle inline code spans.
    text(Scope::Line, r"(?i)\(\s*Implemented[^)]*\)", ""),
    text(Scope::Line, r"(?i)\(\s*Works today[^)]*\)", ""),
    text(
        Scope::Line,
        r"(?i)\(\s*(?:Planned|Selected|current\s+(?:subset|compiler|backend|checker|implementation))[^)]*\)",
        "",
    ),
    // Comment text inside code fences.
    comment(r"(?i)\bwhat works today\b", "supported behavior"),
    comment(r"(?i)\bworks today\b", "Example"),
    comment(r"(?i)\bcurrent\s+(?:subset|support)\b", ""),
    comment(r"(?i)\bcurrently\s+not\b", "not"),
    comment(r" {2,}", " "),
    comment(r"\(\s*\)", ""),
];

/// A compiled row of the rule table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub scope: Scope,
    pattern: Regex,
    replacement: Replacement,
}

#[derive(Debug, Clone)]
enum Replacement {
    Text(String),
    MatchCase {
        upper: &'static str,
        lower: &'static str,
    },
    DropQualifier(Regex),
}

impl Rule {
    fn compile(spec: &RuleSpec, subject: &str) -> Result<Self, regex::Error> {
        let replacement = match spec.action {
            // `$` in the subject must stay literal inside a replacement template.
            Action::Text(template) => {
                Replacement::Text(template.replace("{subject}", &subject.replace('$', "$$")))
            }
            Action::MatchCase { upper, lower } => Replacement::MatchCase { upper, lower },
            Action::DropQualifier => Replacement::DropQualifier(Regex::new(STATUS_QUALIFIER)?),
        };
        Ok(Self {
            scope: spec.scope,
            pattern: Regex::new(spec.pattern)?,
            replacement,
        })
    }

    /// Apply the rule to every non-overlapping match in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.replacement {
            Replacement::Text(template) => self.pattern.replace_all(text, template.as_str()),
            Replacement::MatchCase { upper, lower } => {
                self.pattern.replace_all(text, |caps: &Captures| {
                    let first_upper = caps[0].chars().next().is_some_and(char::is_uppercase);
                    if first_upper { *upper } else { *lower }
                })
            }
            Replacement::DropQualifier(qualifier) => {
                self.pattern.replace_all(text, |caps: &Captures| {
                    if qualifier.is_match(&caps[2]) {
                        caps[1].to_owned()
                    } else {
                        caps[0].to_owned()
                    }
                })
            }
        }
    }
}

/// The rule table compiled for one product name, grouped by scope while
/// keeping table order within each group.
#[derive(Debug, Clone)]
pub struct RuleSet {
    segment: Vec<Rule>,
    tidy: Vec<Rule>,
    line: Vec<Rule>,
    comment: Vec<Rule>,
}

impl RuleSet {
    pub fn new(subject: &str) -> Result<Self, regex::Error> {
        let mut set = Self {
            segment: Vec::new(),
            tidy: Vec::new(),
            line: Vec::new(),
            comment: Vec::new(),
        };
        for spec in RULES {
            let rule = Rule::compile(spec, subject)?;
            match rule.scope {
                Scope::Prose | Scope::Heading => set.segment.push(rule),
                Scope::Tidy => set.tidy.push(rule),
                Scope::Line => set.line.push(rule),
                Scope::Comment => set.comment.push(rule),
            }
        }
        Ok(set)
    }

    /// Rewrite one text segment that lies outside inline code.
    pub fn rewrite_segment(&self, segment: &str) -> String {
        let mut out = segment.to_owned();
        for rule in &self.segment {
            if rule.scope == Scope::Heading && !HEADING_SEGMENT.is_match(&out) {
                continue;
            }
            out = rule.apply(&out).into_owned();
        }

        let body_start = out.len() - out.trim_start().len();
        let (leading, body) = out.split_at(body_start);
        let body = self
            .tidy
            .iter()
            .fold(body.to_owned(), |acc, rule| rule.apply(&acc).into_owned());
        format!("{leading}{body}")
    }

    /// Rewrite a prose line, leaving backtick-delimited spans untouched.
    pub fn rewrite_line(&self, line: &str) -> String {
        let joined = line
            .split('`')
            .enumerate()
            .map(|(i, part)| {
                if i % 2 == 0 {
                    Cow::Owned(self.rewrite_segment(part))
                } else {
                    Cow::Borrowed(part)
                }
            })
            .collect::<Vec<_>>()
            .join("`");

        self.line
            .iter()
            .fold(joined, |acc, rule| rule.apply(&acc).into_owned())
    }

    /// Rewrite comment text (marker included), keeping leading whitespace.
    pub fn rewrite_comment(&self, comment: &str) -> String {
        let body_start = comment.len() - comment.trim_start().len();
        let (leading, body) = comment.split_at(body_start);
        let body = self
            .comment
            .iter()
            .fold(body.to_owned(), |acc, rule| rule.apply(&acc).into_owned());
        format!("{leading}{}", body.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::new("Silk").unwrap()
    }

    #[test]
    fn test_table_compiles_in_scope_order() {
        let set = rules();
        assert_eq!(set.tidy.len(), 5);
        assert_eq!(set.line.len(), 3);
        assert_eq!(set.comment.len(), 6);
        assert!(set.segment.iter().any(|rule| rule.scope == Scope::Heading));
    }

    #[test]
    fn test_heading_retitles() {
        let set = rules();
        assert_eq!(set.rewrite_line("## Relevant Tests"), "## Tests");
        assert_eq!(set.rewrite_line("## What works today"), "## Supported behavior");
        assert_eq!(set.rewrite_line("### Syntax (Selected)"), "### Syntax");
        assert_eq!(set.rewrite_line("## Implemented Subset"), "## Details");
        assert_eq!(set.rewrite_line("## Current Implemented Subset"), "## Details");
        assert_eq!(set.rewrite_line("## Implemented API"), "## API");
        assert_eq!(set.rewrite_line("## Works today: loops"), "## Example: loops");
    }

    #[test]
    fn test_heading_qualifiers() {
        let set = rules();
        assert_eq!(set.rewrite_line("## Syntax (Implemented Subset)"), "## Syntax");
        assert_eq!(set.rewrite_line("## Arrays (planned)"), "## Arrays");
        assert_eq!(set.rewrite_line("## Arrays (fixed size)"), "## Arrays (fixed size)");
    }

    #[test]
    fn test_current_framing() {
        let set = rules();
        assert_eq!(
            set.rewrite_line("In the current implementation, slices copy."),
            "Currently, slices copy."
        );
        assert_eq!(
            set.rewrite_line("This is how the current implementation works."),
            "This is how the implementation works."
        );
        assert_eq!(
            set.rewrite_line("- in the current compiler subset, loops unroll"),
            "- In Silk, loops unroll"
        );
        assert_eq!(
            set.rewrite_line("Generics work in the current backend subset."),
            "Generics work in Silk."
        );
        assert_eq!(set.rewrite_line("It is currently not supported."), "It is not supported.");
    }

    #[test]
    fn test_subject_is_configurable() {
        let set = RuleSet::new("Ore$1").unwrap();
        assert_eq!(
            set.rewrite_line("Works in the current subset."),
            "Works in Ore$1."
        );
    }

    #[test]
    fn test_labels_and_parentheticals() {
        let set = rules();
        assert_eq!(set.rewrite_line("- Implemented: slices"), "- slices");
        assert_eq!(set.rewrite_line("Implemented subset notes: fast"), "Notes: fast");
        assert_eq!(set.rewrite_line("- Implemented as a table"), "- Designed as a table");
        assert_eq!(set.rewrite_line("Loops (works today) run."), "Loops run.");
        assert_eq!(set.rewrite_line("Maps (implemented in v2) are fast."), "Maps are fast.");
        assert_eq!(set.rewrite_line("Implemented in `core`."), "Defined in `core`.");
        assert_eq!(set.rewrite_line("Works today: yes"), "Example: yes");
    }

    #[test]
    fn test_inline_code_is_preserved() {
        let set = rules();
        assert_eq!(
            set.rewrite_line("Use `works today  now` here (works today), please."),
            "Use `works today  now` here, please."
        );
        // whole-line parenthetical rules still see inside code spans
        assert_eq!(
            set.rewrite_line("Call `f (planned)` once"),
            "Call `f ` once"
        );
    }

    #[test]
    fn test_straddling_parenthetical() {
        let set = rules();
        assert_eq!(
            set.rewrite_line("Fields (Implemented for `struct` only) exist"),
            "Fields  exist"
        );
    }

    #[test]
    fn test_comment_rewrite() {
        let set = rules();
        assert_eq!(set.rewrite_comment("    // works today"), "    // Example");
        assert_eq!(
            set.rewrite_comment("# currently not  parsed ()"),
            "# not parsed"
        );
        assert_eq!(set.rewrite_comment("// (current subset)"), "//");
    }
}
