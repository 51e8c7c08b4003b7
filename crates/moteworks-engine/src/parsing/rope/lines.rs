use xi_rope::Rope;

use super::range::TextRange;

/// A single line of the source buffer.
///
/// Produced once when the buffer is split and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 0-based line index.
    pub index: usize,
    /// Byte range of this line in the rope (includes the newline if present).
    pub range: TextRange,
    /// The line text without its `\n` / `\r\n` terminator.
    pub text: String,
}

impl SourceLine {
    /// Range of the line content, excluding the line terminator.
    pub fn content_range(&self) -> TextRange {
        TextRange {
            start: self.range.start,
            end: self.range.start + self.text.len(),
        }
    }

    /// Whitespace-only lines carry no grammar and are skipped by parsers.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Returns an iterator over lines with their byte ranges.
///
/// Uses `lines_raw` to preserve newline characters so that consecutive ranges
/// are contiguous: each line starts exactly where the previous one ended.
pub fn lines_with_ranges(rope: &Rope) -> impl Iterator<Item = SourceLine> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).enumerate().map(move |(index, line)| {
        let start = offset;
        offset += line.len();
        SourceLine {
            index,
            range: TextRange { start, end: offset },
            text: line.trim_end_matches(['\r', '\n']).to_string(),
        }
    })
}
