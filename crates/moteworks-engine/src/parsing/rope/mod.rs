pub mod lines;
pub mod range;
pub mod slice;

pub use lines::{SourceLine, lines_with_ranges};
pub use range::TextRange;
pub use slice::{preview, slice_to_string};
