use xi_rope::Rope;

use super::range::TextRange;

/// Extracts the text for a range from the rope as an owned String.
///
/// This allocates; prefer working with ranges where possible.
pub fn slice_to_string(rope: &Rope, range: TextRange) -> String {
    rope.slice_to_cow(range.start..range.end).into_owned()
}

/// Extracts text for a range, truncating to `max` bytes with "..." suffix if needed.
///
/// Used for human-readable CLI and log output. Truncation backs off to the
/// nearest char boundary.
pub fn preview(rope: &Rope, range: TextRange, max: usize) -> String {
    let mut s = slice_to_string(rope, range);
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}
