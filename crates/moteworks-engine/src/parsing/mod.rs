//! # Comfort parsing
//!
//! Line-oriented parser for comfort documents. Each line is classified
//! against a priority-ordered set of patterns (`classify`), then dispatched by
//! the document parser (`comfort`) to a field setter or the stage sub-parser
//! (`stage`). All state lives in [`ParserHelpers`](helpers::ParserHelpers):
//! the byte cursor, the parsed record and the editor-assist streams.
//!
//! Ranges are byte offsets into the original text and stay valid because the
//! cursor advances by each line's raw length, newline included.

pub mod classify;
pub mod comfort;
pub mod cursor;
pub mod error;
pub mod helpers;
pub mod invariants;
pub mod result;
pub mod rope;
pub mod stage;
pub mod words;

pub use classify::{GlobalLabels, PatternKind};
pub use comfort::parse_stringified_comfort;
pub use error::{ParseError, ParseFailure};
pub use helpers::{DEFAULT_QUEST_SCHEMA_ID, ParseOptions};
pub use result::{
    ComfortUpdateResult, Completion, Diagnostic, Edit, ElementStyle, Hover, ParsedComfort, Stage,
    StageElement, Word,
};
pub use rope::TextRange;
