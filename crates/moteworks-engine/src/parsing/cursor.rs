/// A cursor for char-by-char scanning with position tracking.
///
/// Operates over a string slice while tracking the absolute byte position
/// in the original document (via `base` offset).
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Base offset in the document (added to local index for absolute positions).
    pub base: usize,
    /// Current local byte index into `s`. Always on a char boundary.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `s` with the given base offset.
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Returns the current absolute byte position (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current char without advancing.
    pub fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    /// Peeks one char past the current one.
    pub fn peek_next(&self) -> Option<char> {
        let mut chars = self.s[self.i..].chars();
        chars.next();
        chars.next()
    }

    /// Advances by one char, returning the consumed char.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances while `pred` holds.
    pub fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }
}
