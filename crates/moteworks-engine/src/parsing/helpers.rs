use std::collections::BTreeSet;

use xi_rope::Rope;

use crate::ids::derive_id;
use crate::parsing::{
    classify::{Capture, GlobalLabels, LinePatterns, ParsedLine},
    error::ParseError,
    result::{ComfortUpdateResult, Completion, Diagnostic, Edit, Hover},
    rope::{SourceLine, TextRange, lines_with_ranges, preview},
    stage,
    words::extract_words,
};
use crate::schema::SchemaError;
use crate::speakers::{Speaker, get_allowed_speakers};
use crate::store::MoteStore;

pub const DEFAULT_QUEST_SCHEMA_ID: &str = "cl2_quest";

/// Longest line excerpt kept in a trace entry.
const TRACE_PREVIEW_LEN: usize = 60;

/// Knobs for a single parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Collect words for the external spellchecker.
    pub check_spelling: bool,
    /// Labels accepted by `Label: value` lines.
    pub global_labels: GlobalLabels,
    /// Schema whose dialogue speaker field defines the allowed speakers.
    pub quest_schema_id: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            check_spelling: true,
            global_labels: GlobalLabels::default(),
            quest_schema_id: DEFAULT_QUEST_SCHEMA_ID.to_string(),
        }
    }
}

/// Speaker universe, resolved on first use.
enum Speakers {
    Unresolved,
    /// The store has no quest schema; speakers are neither checked nor completed.
    Unavailable,
    Resolved(Vec<Speaker>),
}

/// Outcome of checking one dialogue speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerCheck {
    /// The speaker's mote id.
    Resolved(String),
    /// Not an allowed speaker; a diagnostic was reported.
    Unknown,
    /// No speaker universe to check against.
    Unchecked,
}

/// Cursor plus output sink for one parse call.
///
/// Owns the split lines, the byte cursor (`index`) and the accumulating
/// [`ComfortUpdateResult`]. Callers must [`advance`](Self::advance) past every
/// line they take; [`next_line`](Self::next_line) verifies the cursor still
/// sits at the start of the following line.
pub struct ParserHelpers<'a> {
    rope: Rope,
    lines: Vec<SourceLine>,
    /// Position of the next line to hand out.
    next: usize,
    /// Line most recently handed out by `next_line`.
    current: Option<usize>,
    /// Byte offset of the start of the current line.
    pub index: usize,
    doc_len: usize,
    patterns: LinePatterns,
    options: &'a ParseOptions,
    store: &'a dyn MoteStore,
    speakers: Speakers,
    seen_ids: BTreeSet<String>,
    trace: Vec<String>,
    pub result: ComfortUpdateResult,
}

impl<'a> ParserHelpers<'a> {
    pub fn new(text: &str, store: &'a dyn MoteStore, options: &'a ParseOptions) -> Self {
        let rope = Rope::from(text);
        Self {
            lines: lines_with_ranges(&rope).collect(),
            next: 0,
            current: None,
            index: 0,
            doc_len: rope.len(),
            rope,
            patterns: LinePatterns::comfort(&options.global_labels),
            options,
            store,
            speakers: Speakers::Unresolved,
            seen_ids: BTreeSet::new(),
            trace: vec![],
            result: ComfortUpdateResult::default(),
        }
    }

    /// Rewinds line iteration and the cursor to the top of the document.
    /// Output already accumulated is kept.
    pub fn restart(&mut self) {
        self.next = 0;
        self.current = None;
        self.index = 0;
    }

    /// Takes the next line, checking that the cursor is in sync with it.
    pub fn next_line(&mut self) -> Result<Option<SourceLine>, ParseError> {
        let Some(line) = self.lines.get(self.next) else {
            return Ok(None);
        };
        if line.range.start != self.index {
            return Err(ParseError::CursorDesync {
                line: line.index,
                expected: line.range.start,
                found: self.index,
            });
        }
        self.current = Some(self.next);
        self.next += 1;
        Ok(Some(line.clone()))
    }

    /// The line `next_line` would return, without taking it.
    pub fn peek_line(&self) -> Option<&SourceLine> {
        self.lines.get(self.next)
    }

    /// Moves the cursor past `line`, newline included.
    pub fn advance(&mut self, line: &SourceLine) {
        self.index += line.range.len();
    }

    /// Content range of the current line, derived from the cursor.
    pub fn current_line_range(&self) -> TextRange {
        let len = self
            .current
            .and_then(|i| self.lines.get(i))
            .map_or(0, |l| l.text.len());
        TextRange::new(self.index, self.index + len)
    }

    /// Errors unless every byte of the document was consumed.
    pub fn ensure_consumed(&self) -> Result<(), ParseError> {
        if self.index != self.doc_len {
            return Err(ParseError::CursorDesync {
                line: self.lines.len(),
                expected: self.doc_len,
                found: self.index,
            });
        }
        Ok(())
    }

    /// Classifies the current line against the configured patterns.
    pub fn parse_current_line(&self) -> Option<ParsedLine> {
        let line = self.lines.get(self.current?)?;
        self.patterns.classify(line)
    }

    /// Classifies an arbitrary line (used for lookahead).
    pub fn classify(&self, line: &SourceLine) -> Option<ParsedLine> {
        self.patterns.classify(line)
    }

    pub fn trace(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        log::debug!("{entry}");
        self.trace.push(entry);
    }

    /// Records that `line` is being handled, with a short excerpt of it.
    pub fn trace_line(&mut self, line: &SourceLine) {
        let excerpt = preview(&self.rope, line.content_range(), TRACE_PREVIEW_LEN);
        self.trace(format!("line {}: {excerpt}", line.index));
    }

    pub fn take_trace(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace)
    }

    pub fn diagnostic(&mut self, message: impl Into<String>, range: TextRange) {
        self.result.diagnostics.push(Diagnostic {
            message: message.into(),
            range,
        });
    }

    pub fn hover(&mut self, content: impl Into<String>, range: TextRange) {
        self.result.hovers.push(Hover {
            content: content.into(),
            range,
        });
    }

    pub fn add_comment(&mut self, parsed: &ParsedLine) {
        let text = parsed.text().map(|c| c.value.clone()).unwrap_or_default();
        self.result.parsed.comments.push(text);
    }

    /// Parses the stage starting at `header` and appends it to the record.
    ///
    /// Advances the cursor past the header and every body line it consumes.
    pub fn add_stage(
        &mut self,
        header_line: &SourceLine,
        header: &ParsedLine,
    ) -> Result<(), ParseError> {
        let stage = stage::parse_stage(self, header_line, header)?;
        self.result.parsed.stages.push(stage);
        Ok(())
    }

    /// Queues the words of `capture` for the external spellchecker.
    pub fn check_spelling(&mut self, capture: Option<&Capture>) {
        if !self.options.check_spelling {
            return;
        }
        if let Some(capture) = capture {
            self.result
                .words
                .extend(extract_words(capture.range.start, &capture.value));
        }
    }

    /// Registers the id of a stage or element line.
    ///
    /// An explicit id is kept as written (duplicates are diagnosed). A missing
    /// one is generated and an edit appending it to the line is proposed.
    pub fn claim_id(&mut self, line: &SourceLine, id: Option<&Capture>) -> String {
        if let Some(id) = id {
            if !self.seen_ids.insert(id.value.clone()) {
                self.diagnostic(format!("Duplicate id: {}", id.value), id.range);
            }
            return id.value.clone();
        }

        let seed = format!("{}:{}", line.index, line.text.trim());
        let mut generated = derive_id(&seed);
        let mut attempt = 0;
        while self.seen_ids.contains(&generated) {
            attempt += 1;
            generated = derive_id(&format!("{seed}:{attempt}"));
        }
        self.seen_ids.insert(generated.clone());

        let end = line.range.start + line.text.trim_end().len();
        self.result.edits.push(Edit {
            range: TextRange::new(end, end),
            new_text: format!(" #{generated}"),
        });
        generated
    }

    fn ensure_speakers(&mut self) -> Result<(), ParseError> {
        if !matches!(self.speakers, Speakers::Unresolved) {
            return Ok(());
        }
        self.speakers = match get_allowed_speakers(self.store, &self.options.quest_schema_id) {
            Ok(speakers) => Speakers::Resolved(speakers),
            Err(SchemaError::NotFound { schema_id }) => {
                log::debug!("{schema_id} schema missing, speaker checks disabled");
                Speakers::Unavailable
            }
            Err(e) => return Err(e.into()),
        };
        Ok(())
    }

    /// Validates and completes a speaker capture.
    ///
    /// Unknown speakers are diagnosed at the capture's range.
    pub fn resolve_speaker(&mut self, capture: &Capture) -> Result<SpeakerCheck, ParseError> {
        self.ensure_speakers()?;
        let Speakers::Resolved(speakers) = &self.speakers else {
            return Ok(SpeakerCheck::Unchecked);
        };

        let mut candidates: Vec<String> = speakers.iter().map(|s| s.label().to_string()).collect();
        candidates.sort();
        candidates.dedup();
        self.result.completions.push(Completion {
            range: capture.range,
            candidates,
        });

        match speakers.iter().find(|s| s.matches(&capture.value)) {
            Some(speaker) => {
                self.result.hovers.push(Hover {
                    content: format!("{} ({})", speaker.label(), speaker.id),
                    range: capture.range,
                });
                Ok(SpeakerCheck::Resolved(speaker.id.to_string()))
            }
            None => {
                self.result.diagnostics.push(Diagnostic {
                    message: format!("Unknown speaker: {}", capture.value),
                    range: capture.range,
                });
                Ok(SpeakerCheck::Unknown)
            }
        }
    }

    pub fn finish(self) -> ComfortUpdateResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn next_line_detects_cursor_desync() {
        let store = MemoryStore::new();
        let options = ParseOptions::default();
        let mut helpers = ParserHelpers::new("a\nb\n", &store, &options);

        let first = helpers.next_line().unwrap().unwrap();
        helpers.advance(&first);
        helpers.index += 1;

        let err = helpers.next_line().unwrap_err();
        assert!(matches!(
            err,
            ParseError::CursorDesync {
                line: 1,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn current_line_range_follows_cursor() {
        let store = MemoryStore::new();
        let options = ParseOptions::default();
        let mut helpers = ParserHelpers::new("Name: A\nDescription: B\n", &store, &options);

        let first = helpers.next_line().unwrap().unwrap();
        assert_eq!(helpers.current_line_range(), TextRange::new(0, 7));
        helpers.advance(&first);
        helpers.next_line().unwrap().unwrap();
        assert_eq!(helpers.current_line_range(), TextRange::new(8, 22));
    }

    #[test]
    fn restart_rewinds_iteration() {
        let store = MemoryStore::new();
        let options = ParseOptions::default();
        let mut helpers = ParserHelpers::new("x\ny", &store, &options);
        while let Some(line) = helpers.next_line().unwrap() {
            helpers.advance(&line);
        }
        helpers.ensure_consumed().unwrap();

        helpers.restart();
        assert_eq!(helpers.next_line().unwrap().unwrap().text, "x");
    }

    #[test]
    fn claim_id_flags_duplicates() {
        let store = MemoryStore::new();
        let options = ParseOptions::default();
        let mut helpers = ParserHelpers::new("", &store, &options);
        let line = SourceLine {
            index: 0,
            range: TextRange::new(0, 10),
            text: "Clue: hi #a1".into(),
        };
        let id = Capture {
            value: "a1".into(),
            range: TextRange::new(10, 12),
        };
        helpers.claim_id(&line, Some(&id));
        helpers.claim_id(&line, Some(&id));
        assert_eq!(helpers.result.diagnostics.len(), 1);
        assert_eq!(helpers.result.diagnostics[0].message, "Duplicate id: a1");
    }

    #[test]
    fn claim_id_generates_edit_for_missing_id() {
        let store = MemoryStore::new();
        let options = ParseOptions::default();
        let mut helpers = ParserHelpers::new("", &store, &options);
        let line = SourceLine {
            index: 2,
            range: TextRange::new(20, 30),
            text: "Clue: hi  ".into(),
        };
        let id = helpers.claim_id(&line, None);
        assert_eq!(helpers.result.edits.len(), 1);
        assert_eq!(helpers.result.edits[0].range, TextRange::new(28, 28));
        assert_eq!(helpers.result.edits[0].new_text, format!(" #{id}"));
    }

    #[test]
    fn spelling_can_be_disabled() {
        let store = MemoryStore::new();
        let options = ParseOptions {
            check_spelling: false,
            ..ParseOptions::default()
        };
        let mut helpers = ParserHelpers::new("", &store, &options);
        helpers.check_spelling(Some(&Capture {
            value: "wrods here".into(),
            range: TextRange::new(0, 10),
        }));
        assert!(helpers.result.words.is_empty());
    }
}
