//! Range sanity checks for a finished parse, shared by unit and integration
//! tests.

use xi_rope::Rope;

use crate::parsing::{
    result::ComfortUpdateResult,
    rope::{TextRange, lines_with_ranges},
};

/// Panics if any range in `result` falls outside `text` or crosses a line.
pub fn check(text: &str, result: &ComfortUpdateResult) {
    let rope = Rope::from(text);
    let lines: Vec<_> = lines_with_ranges(&rope).map(|l| l.content_range()).collect();

    let ranges = result
        .diagnostics
        .iter()
        .map(|d| ("diagnostic", d.range))
        .chain(result.hovers.iter().map(|h| ("hover", h.range)))
        .chain(result.completions.iter().map(|c| ("completion", c.range)))
        .chain(result.words.iter().map(|w| ("word", w.range)))
        .chain(result.edits.iter().map(|e| ("edit", e.range)));

    for (what, range) in ranges {
        assert!(
            range.start <= range.end && range.end <= rope.len(),
            "{what} range out of bounds: {range:?} (text len: {})",
            rope.len()
        );
        assert!(
            within_a_line(&lines, range),
            "{what} range {range:?} is not contained in a single line"
        );
    }

    for word in &result.words {
        assert_eq!(
            &text[word.range.start..word.range.end],
            word.text,
            "word text does not match its range"
        );
    }
}

fn within_a_line(lines: &[TextRange], range: TextRange) -> bool {
    lines.iter().any(|line| line.contains(range))
}
