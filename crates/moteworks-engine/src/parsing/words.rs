use crate::parsing::{cursor::Cursor, result::Word, rope::TextRange};

/// Words shorter than this are never handed to the spellchecker.
pub const MIN_WORD_LEN: usize = 2;

/// Splits captured text into candidate words for spellchecking.
///
/// A word is a run of alphabetic chars, optionally joined by single
/// apostrophes (`don't`, `o'clock`). Digits, punctuation and whitespace
/// separate words. `base` is the document offset where `s` begins.
pub fn extract_words(base: usize, s: &str) -> Vec<Word> {
    let mut cur = Cursor::new(s, base);
    let mut out = vec![];

    while !cur.eof() {
        match cur.peek() {
            Some(c) if c.is_alphabetic() => {
                let start = cur.i;
                loop {
                    cur.bump_while(char::is_alphabetic);
                    let joined = matches!(cur.peek(), Some('\'' | '’'))
                        && cur.peek_next().is_some_and(char::is_alphabetic);
                    if !joined {
                        break;
                    }
                    cur.bump();
                }
                let text = &s[start..cur.i];
                if text.chars().count() >= MIN_WORD_LEN {
                    out.push(Word {
                        text: text.to_string(),
                        range: TextRange::new(start, cur.i).offset(base),
                    });
                }
            }
            _ => {
                cur.bump();
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn splits_on_punctuation_and_digits() {
        let words = extract_words(0, "Hello, wrld! 42 times");
        assert_eq!(texts(&words), vec!["Hello", "wrld", "times"]);
    }

    #[test]
    fn keeps_internal_apostrophes() {
        let words = extract_words(0, "don't 'quote' o'clock");
        assert_eq!(texts(&words), vec!["don't", "quote", "o'clock"]);
    }

    #[test]
    fn skips_single_letters() {
        let words = extract_words(0, "a I be");
        assert_eq!(texts(&words), vec!["be"]);
    }

    #[test]
    fn ranges_are_offset_by_base() {
        let words = extract_words(20, "big café");
        assert_eq!(words[0].range, TextRange::new(20, 23));
        assert_eq!(words[1].range, TextRange::new(24, 29));
    }
}
