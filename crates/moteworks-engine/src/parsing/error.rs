use thiserror::Error;

use crate::schema::SchemaError;

/// Structural failures that abort a parse. Content problems never show up
/// here; they become diagnostics.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cursor desynchronized at line {line}: line starts at {expected}, cursor at {found}")]
    CursorDesync {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line} was dispatched as a stage but is not a stage header")]
    NotAStageHeader { line: usize },
    #[error("speaker schema is unusable: {0}")]
    Schema(#[from] SchemaError),
}

/// A fatal parse error with the trace accumulated up to the failure.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ParseFailure {
    pub source: ParseError,
    pub trace: Vec<String>,
}
