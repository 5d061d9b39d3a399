//! Lexical analysis
use crate::{
    constants::MAX_INT,
    error::{LexError, LexErrorKind},
};

use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{Keyword, Span, Symbol, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.next();

        let start_pos = cursor.offset();

        Self {
            cursor,
            original: source_code,
            start_pos,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Whitespace, line comments and block comments are erased
    /// before the token starts. Once the source is exhausted every
    /// further call returns a [`TokenKind::EOF`] token.
    ///
    /// ## Implementation
    ///
    /// Each iteration starts with the assumption that the internal cursor
    /// is pointing to the start of the remaining source to be consumed,
    /// and must leave the cursor at the start of the next token's text.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.erase_trivia()?;

        self.start_token();

        if self.cursor.at_end() {
            return Ok(self.make_token(TokenKind::EOF));
        }

        let c = self.cursor.current();
        if let Some(symbol) = Symbol::parse(c) {
            return Ok(self.make_token(TokenKind::Symbol(symbol)));
        }

        match c {
            '"' => self.consume_string(),
            '0'..='9' => self.consume_number(),
            '_' | 'a'..='z' | 'A'..='Z' => Ok(self.consume_ident()),
            _ => Err(self.error(LexErrorKind::UnknownCharacter(c))),
        }
    }

    fn make_span(&self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.peek_offset();

        debug_assert!(end >= start);
        let size = end - start;

        Span { index: start, size }
    }

    fn fragment(&self) -> &str {
        self.make_span().fragment(self.original)
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Build a token spanning from the position stored by
    /// [`start_token`](Lexer::start_token) up to and including the
    /// current character.
    ///
    /// Also moves the cursor to the first character of the next token.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            span: self.make_span(),
            kind,
        };

        self.cursor.next();

        token
    }

    #[inline(never)]
    #[cold]
    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            line: Span::new(self.start_pos, 0).line(self.original),
        }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Skip whitespace and comments until the next token character.
    fn erase_trivia(&mut self) -> Result<(), LexError> {
        loop {
            while !self.cursor.at_end() && self.cursor.current().is_whitespace() {
                self.cursor.next();
            }

            match (self.cursor.current(), self.cursor.peek()) {
                ('/', '/') => self.erase_line_comment(),
                ('/', '*') => self.erase_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        while !self.cursor.at_end() && !is_newline(self.cursor.current()) {
            self.cursor.next();
        }
    }

    /// Erase everything from `/*` up to and including the next `*/`.
    fn erase_block_comment(&mut self) -> Result<(), LexError> {
        self.start_token();

        // Step over the opening pair so `/*/` isn't taken as closed.
        self.cursor.next();
        self.cursor.next();

        loop {
            if self.cursor.at_end() {
                return Err(self.error(LexErrorKind::UnterminatedComment));
            }
            if self.cursor.current() == '*' && self.cursor.peek() == '/' {
                self.cursor.next();
                self.cursor.next();
                return Ok(());
            }
            self.cursor.next();
        }
    }

    /// Make a string literal token, quotes included.
    ///
    /// Every character ends up as an integer constant, so both the
    /// character values and the length must fit in the integer range.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        debug_assert_eq!(self.cursor.current(), '"');

        let mut len = 0_u32;
        loop {
            match self.cursor.next() {
                '"' => return Ok(self.make_token(TokenKind::Str)),
                EOF_CHAR if self.cursor.at_end() => {
                    return Err(self.error(LexErrorKind::UnterminatedString))
                }
                c if c as u32 > MAX_INT as u32 => {
                    return Err(self.error(LexErrorKind::UnsupportedCharacter(c)))
                }
                _ => {
                    len += 1;
                    if len > MAX_INT as u32 {
                        return Err(self.error(LexErrorKind::StringOverflow));
                    }
                }
            }
        }
    }

    /// Make an integer literal token.
    ///
    /// The whole alphanumeric run is consumed so `12ab` is rejected
    /// as one malformed lexeme instead of splitting into two tokens.
    fn consume_number(&mut self) -> Result<Token, LexError> {
        debug_assert!(is_digit(self.cursor.current()));

        while is_letter_or_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        let fragment = self.fragment();
        if !fragment.chars().all(is_digit) {
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        match fragment.parse::<u32>() {
            Ok(value) if value <= MAX_INT as u32 => Ok(self.make_token(TokenKind::Integer)),
            _ => Err(self.error(LexErrorKind::IntegerOverflow)),
        }
    }

    /// Make an identifier or keyword token.
    fn consume_ident(&mut self) -> Token {
        debug_assert!(is_letter(self.cursor.current()));

        while is_letter_or_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        let token_kind = match Keyword::parse(self.fragment()) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        self.make_token(token_kind)
    }
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Result<Token, LexError>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields the final EOF token once, or stops after the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        match &result {
            Ok(token) if token.kind != TokenKind::EOF => {}
            _ => self.done = true,
        }
        Some(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .into_iter()
            .map(|result| result.unwrap().kind)
            .collect()
    }

    fn fragments(source: &str) -> Vec<String> {
        let lexer = Lexer::new(source);
        let original = lexer.source_code();
        lexer
            .into_iter()
            .map(|result| result.unwrap())
            .filter(|token| token.kind != TokenKind::EOF)
            .map(|token| token.span.fragment(original).to_owned())
            .collect()
    }

    fn lex_error(source: &str) -> LexError {
        Lexer::new(source)
            .into_iter()
            .find_map(|result| result.err())
            .expect("expected a lexical error")
    }

    #[test]
    #[rustfmt::skip]
    fn test_classification() {
        use TokenKind as TK;

        assert_eq!(
            kinds("let x = 12; do Output.printString(\"hi\");"),
            vec![
                TK::Keyword(Keyword::Let), TK::Ident, TK::Symbol(Symbol::Eq), TK::Integer, TK::Symbol(Symbol::Semicolon),
                TK::Keyword(Keyword::Do), TK::Ident, TK::Symbol(Symbol::Dot), TK::Ident,
                TK::Symbol(Symbol::LeftParen), TK::Str, TK::Symbol(Symbol::RightParen), TK::Symbol(Symbol::Semicolon),
                TK::EOF,
            ]
        );
    }

    #[test]
    fn test_comments_are_erased() {
        let source = "// line comment\nclass /* block\n spanning */ Main /** doc */ {\n}// trailing";
        assert_eq!(fragments(source), vec!["class", "Main", "{", "}"]);
    }

    #[test]
    fn test_symbols_split_identifiers() {
        assert_eq!(
            fragments("a[i]=x.y(-1)&~b"),
            vec!["a", "[", "i", "]", "=", "x", ".", "y", "(", "-", "1", ")", "&", "~", "b"]
        );
    }

    #[test]
    fn test_slash_is_division() {
        assert_eq!(fragments("a / b"), vec!["a", "/", "b"]);
    }

    #[test]
    fn test_string_literal_keeps_spaces() {
        assert_eq!(fragments("\"hello,  world // not a comment\""), vec!["\"hello,  world // not a comment\""]);
    }

    #[test]
    fn test_keyword_prefix_is_ident() {
        assert_eq!(kinds("classy"), vec![TokenKind::Ident, TokenKind::EOF]);
        assert_eq!(kinds("_this1"), vec![TokenKind::Ident, TokenKind::EOF]);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::EOF]);
        assert_eq!(kinds("  \n\t// nothing here"), vec![TokenKind::EOF]);
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(lex_error("\"open").kind, LexErrorKind::UnterminatedString);
        assert_eq!(lex_error("a /* never closed").kind, LexErrorKind::UnterminatedComment);
        assert_eq!(lex_error("12ab").kind, LexErrorKind::MalformedNumber);
        assert_eq!(lex_error("32768").kind, LexErrorKind::IntegerOverflow);
        assert_eq!(lex_error("x # y").kind, LexErrorKind::UnknownCharacter('#'));
        assert_eq!(lex_error("\"\u{1F600}\"").kind, LexErrorKind::UnsupportedCharacter('\u{1F600}'));
        assert_eq!(lex_error("\"ok \u{FF71}\"").kind, LexErrorKind::UnsupportedCharacter('\u{FF71}'));
    }

    #[test]
    fn test_lex_error_line() {
        let err = lex_error("class Main {\n\n  let x = $;\n}");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_string_length_limit() {
        let longest = format!("\"{}\"", "a".repeat(MAX_INT as usize));
        assert_eq!(kinds(&longest), vec![TokenKind::Str, TokenKind::EOF]);

        let too_long = format!("\"{}\"", "a".repeat(MAX_INT as usize + 1));
        assert_eq!(lex_error(&too_long).kind, LexErrorKind::StringOverflow);
    }

    #[test]
    fn test_string_accepts_non_ascii() {
        assert_eq!(kinds("\"caf\u{e9} \u{3c0}\""), vec![TokenKind::Str, TokenKind::EOF]);
    }

    #[test]
    fn test_max_int() {
        assert_eq!(kinds("32767"), vec![TokenKind::Integer, TokenKind::EOF]);
    }
}
