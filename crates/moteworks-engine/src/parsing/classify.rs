use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::parsing::rope::{SourceLine, TextRange};

/// The grammar production a line belongs to.
///
/// Listed in the priority order used by [`LinePatterns::comfort`]: when a line
/// could match several productions the earliest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternKind {
    /// `// text`
    Comment,
    /// `Label: value` where the label is one of the configured global labels.
    Label,
    /// `Stage: name #id`
    Stage,
    /// `Speaker: utterance #id`, only meaningful inside a stage.
    Dialogue,
    /// `> text #id`, only meaningful inside a stage.
    Narration,
}

/// One named capture of a matched line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub value: String,
    /// Document-absolute range of `value`.
    pub range: TextRange,
}

/// A source line that matched some [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLine {
    pub kind: PatternKind,
    pub captures: BTreeMap<String, Capture>,
}

impl ParsedLine {
    pub fn get(&self, name: &str) -> Option<&Capture> {
        self.captures.get(name)
    }

    pub fn label(&self) -> Option<&Capture> {
        self.get("label")
    }

    pub fn text(&self) -> Option<&Capture> {
        self.get("text")
    }

    pub fn id(&self) -> Option<&Capture> {
        self.get("id")
    }

    pub fn speaker(&self) -> Option<&Capture> {
        self.get("speaker")
    }

    /// Lower-cased label, for case-insensitive field dispatch.
    pub fn label_lower(&self) -> Option<String> {
        self.label().map(|c| c.value.to_lowercase())
    }

    pub fn is_comment(&self) -> bool {
        self.kind == PatternKind::Comment
    }

    /// A stage marker either matched the dedicated stage pattern or is a
    /// configured `Stage` label line.
    pub fn is_stage(&self) -> bool {
        self.kind == PatternKind::Stage
            || (self.kind == PatternKind::Label
                && self.label_lower().as_deref() == Some(STAGE_LABEL))
    }

    pub fn is_stage_element(&self) -> bool {
        matches!(self.kind, PatternKind::Dialogue | PatternKind::Narration)
    }
}

pub(crate) const STAGE_LABEL: &str = "stage";

/// The set of field labels recognized by `Label: value` lines.
///
/// Stored lower-cased; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalLabels(BTreeSet<String>);

impl GlobalLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            labels
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(&label.trim().to_lowercase())
    }
}

impl Default for GlobalLabels {
    fn default() -> Self {
        Self::new(["Name", "Description", "Unlocked Description", "Stage"])
    }
}

/// A grammar rule: a kind tag, a matcher with named groups, and for label
/// lines the set of labels it is allowed to accept.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    regex: &'static Regex,
    allowed_labels: Option<GlobalLabels>,
}

impl Pattern {
    /// The stage header rule on its own, for re-reading a header that was
    /// classified as a plain label line.
    pub fn stage_header() -> Self {
        Self {
            kind: PatternKind::Stage,
            regex: stage_regex(),
            allowed_labels: None,
        }
    }

    /// Matches one line, translating capture offsets into document offsets.
    ///
    /// Optional groups that did not participate are left out of the captures.
    pub fn matches(&self, line: &SourceLine) -> Option<ParsedLine> {
        let caps = self.regex.captures(&line.text)?;

        if let Some(allowed) = &self.allowed_labels {
            let label = caps.name("label")?;
            if !allowed.contains(label.as_str()) {
                return None;
            }
        }

        let base = line.range.start;
        let captures = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name).map(|m| {
                    (
                        name.to_string(),
                        Capture {
                            value: m.as_str().to_string(),
                            range: TextRange::new(m.start(), m.end()).offset(base),
                        },
                    )
                })
            })
            .collect();

        Some(ParsedLine {
            kind: self.kind,
            captures,
        })
    }
}

/// Priority-ordered list of patterns. The first pattern that matches wins.
#[derive(Debug, Clone)]
pub struct LinePatterns(Vec<Pattern>);

impl LinePatterns {
    /// The comfort grammar: comment, label, stage marker, dialogue, narration.
    pub fn comfort(labels: &GlobalLabels) -> Self {
        Self(vec![
            Pattern {
                kind: PatternKind::Comment,
                regex: comment_regex(),
                allowed_labels: None,
            },
            Pattern {
                kind: PatternKind::Label,
                regex: label_regex(),
                allowed_labels: Some(labels.clone()),
            },
            Pattern::stage_header(),
            Pattern {
                kind: PatternKind::Dialogue,
                regex: dialogue_regex(),
                allowed_labels: None,
            },
            Pattern {
                kind: PatternKind::Narration,
                regex: narration_regex(),
                allowed_labels: None,
            },
        ])
    }

    /// Returns the first matching [`ParsedLine`], or `None` if no rule applies.
    pub fn classify(&self, line: &SourceLine) -> Option<ParsedLine> {
        self.0.iter().find_map(|p| p.matches(line))
    }
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*//\s?(?P<text>.*?)\s*$").expect("Invalid comment regex"))
}

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<label>[A-Za-z][A-Za-z ]*?)\s*:\s*(?P<text>.*?)\s*$")
            .expect("Invalid label regex")
    })
}

fn stage_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<label>(?i:stage))\s*:\s*(?P<text>.*?)(?:\s*#(?P<id>[a-z0-9_]+))?\s*$",
        )
        .expect("Invalid stage regex")
    })
}

fn dialogue_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<speaker>[A-Za-z][A-Za-z0-9_ ]*?)\s*:\s*(?P<text>.*?)(?:\s*#(?P<id>[a-z0-9_]+))?\s*$",
        )
        .expect("Invalid dialogue regex")
    })
}

fn narration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*>\s*(?P<text>.*?)(?:\s*#(?P<id>[a-z0-9_]+))?\s*$")
            .expect("Invalid narration regex")
    })
}
