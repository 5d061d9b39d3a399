//! Character scanner over source text.
use itertools::{multipeek, MultiPeek};
use std::str::CharIndices;

/// Stand-in character returned when the cursor is past the end of the source.
pub const EOF_CHAR: char = '\0';

pub struct Cursor<'a> {
    /// Iterator over UTF-8 encoded source code.
    ///
    /// Peeking advances the internal peek cursor of `MultiPeek`,
    /// so it's reset before every lookahead.
    chars: MultiPeek<CharIndices<'a>>,
    /// Byte position and value of the current character.
    current: (usize, char),
    len: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: multipeek(source.char_indices()),
            current: (0, EOF_CHAR),
            len: source.len(),
        }
    }

    /// Advance the cursor and return the new current character.
    pub fn next(&mut self) -> char {
        match self.chars.next() {
            Some(pair) => self.current = pair,
            None => self.current = (self.len, EOF_CHAR),
        }
        self.current.1
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current.1
    }

    /// Character following the current one.
    pub fn peek(&mut self) -> char {
        self.chars.reset_peek();
        let c = self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR);
        self.chars.reset_peek();
        c
    }

    /// Byte offset of the current character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.current.0 as u32
    }

    /// Byte offset just past the current character.
    #[inline]
    pub fn peek_offset(&self) -> u32 {
        if self.at_end() {
            self.len as u32
        } else {
            (self.current.0 + self.current.1.len_utf8()) as u32
        }
    }

    /// Source can contain '\0' characters without being at the end,
    /// so [`EOF_CHAR`] alone is not enough to tell.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cursor_walk() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.next(), 'a');
        assert_eq!(cursor.peek(), 'b');
        assert_eq!(cursor.peek(), 'b');
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.peek_offset(), 1);
        assert_eq!(cursor.next(), 'b');
        assert_eq!(cursor.peek(), EOF_CHAR);
        assert!(!cursor.at_end());
        assert_eq!(cursor.next(), EOF_CHAR);
        assert!(cursor.at_end());
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.peek_offset(), 2);
    }
}
