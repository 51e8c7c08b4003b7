use serde::{Deserialize, Serialize};

use crate::parsing::rope::TextRange;

/// A reported problem anchored to a text range. Never fatal to the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
    pub content: String,
    pub range: TextRange,
}

/// Candidate replacements for the text at `range`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub range: TextRange,
    pub candidates: Vec<String>,
}

/// A token handed to the external spellchecker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub range: TextRange,
}

/// A suggested text edit, e.g. appending a generated `#id` to a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub range: TextRange,
    pub new_text: String,
}

/// Style of a stage element, mirrored into the committed mote data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementStyle {
    Dialogue,
    Text,
}

impl ElementStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementStyle::Dialogue => "Dialogue",
            ElementStyle::Text => "Text",
        }
    }
}

/// One dialogue moment inside a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageElement {
    pub style: ElementStyle,
    /// Explicit `#id` from the source, if any.
    pub id: Option<String>,
    /// Resolved speaker mote id, or the raw speaker text when it could not be
    /// resolved. Always `None` for narration.
    pub speaker: Option<String>,
    /// The speaker was checked and is not an allowed speaker, so `speaker`
    /// holds raw text rather than a mote id.
    #[serde(default)]
    pub speaker_unknown: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: Option<String>,
    pub name: String,
    pub elements: Vec<StageElement>,
}

/// The structured record accumulated while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedComfort {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unlocked_description: Option<String>,
    pub comments: Vec<String>,
    pub stages: Vec<Stage>,
}

/// Everything a parse produces: editor-assist streams plus the parsed record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComfortUpdateResult {
    pub diagnostics: Vec<Diagnostic>,
    pub hovers: Vec<Hover>,
    pub edits: Vec<Edit>,
    pub completions: Vec<Completion>,
    pub words: Vec<Word>,
    pub parsed: ParsedComfort,
}
