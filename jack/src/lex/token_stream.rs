//! Pull-based token stream with a single current token.
use crate::error::{JackError, JackResult};

use super::{Keyword, Lexer, Span, Symbol, Token, TokenKind};

/// Scanner over a source unit.
///
/// Tokens are lazily lexed. Calling [`advance`](TokenStream::advance)
/// pulls exactly one token from the lexer and makes it current. There
/// is no lookahead beyond the current token.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// `None` before the first advance, and after the end of the source.
    current: Option<Token>,
    /// 1-based line of the current token.
    line: usize,
    /// Byte offset up to which newlines were counted into `line`.
    scanned: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            original: lexer.source_code(),
            lexer,
            current: None,
            line: 1,
            scanned: 0,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Pull the next token and make it current.
    ///
    /// Returns `false` when the source is exhausted.
    pub fn advance(&mut self) -> JackResult<bool> {
        let token = self.lexer.next_token()?;

        let start = (token.span.index as usize).min(self.original.len());
        self.line += self.original.as_bytes()[self.scanned..start]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.scanned = start;

        if token.kind == TokenKind::EOF {
            self.current = None;
            Ok(false)
        } else {
            self.current = Some(token);
            Ok(true)
        }
    }

    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    #[inline]
    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current.as_ref().map(|token| token.kind)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.current_kind() {
            Some(TokenKind::Keyword(keyword)) => Some(keyword),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self.current_kind() {
            Some(TokenKind::Symbol(symbol)) => Some(symbol),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&'a str> {
        match &self.current {
            Some(token) if token.kind == TokenKind::Ident => Some(self.span_fragment(&token.span)),
            _ => None,
        }
    }

    /// Value of the current integer constant.
    ///
    /// The lexer has already checked the range.
    pub fn integer(&self) -> Option<u16> {
        match &self.current {
            Some(token) if token.kind == TokenKind::Integer => {
                self.span_fragment(&token.span).parse().ok()
            }
            _ => None,
        }
    }

    /// Contents of the current string constant, without the quotes.
    pub fn string_literal(&self) -> Option<&'a str> {
        match &self.current {
            Some(token) if token.kind == TokenKind::Str => {
                let fragment = self.span_fragment(&token.span);
                Some(&fragment[1..fragment.len() - 1])
            }
            _ => None,
        }
    }

    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.original)
    }

    /// 1-based line of the current token, or the last line once the
    /// stream is exhausted.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Human readable text of the current token for error messages.
    pub fn describe_current(&self) -> String {
        match &self.current {
            Some(token) => self.span_fragment(&token.span).to_owned(),
            None => TokenKind::EOF.to_string(),
        }
    }
}

/// Matching and consuming.
impl<'a> TokenStream<'a> {
    #[inline]
    pub fn is_keyword(&self, keywords: &[Keyword]) -> bool {
        self.keyword().map_or(false, |keyword| keywords.contains(&keyword))
    }

    #[inline]
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.symbol() == Some(symbol)
    }

    /// Consumes the current token if it is the given symbol.
    ///
    /// Returns true when matched. The stream is left untouched otherwise.
    pub fn match_symbol(&mut self, symbol: Symbol) -> JackResult<bool> {
        if self.is_symbol(symbol) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token, which must be one of the given keywords.
    pub fn consume_keyword(&mut self, keywords: &[Keyword]) -> JackResult<Keyword> {
        match self.keyword() {
            Some(keyword) if keywords.contains(&keyword) => {
                self.advance()?;
                Ok(keyword)
            }
            _ => {
                let expected = keywords
                    .iter()
                    .map(|keyword| format!("'{}'", keyword))
                    .collect::<Vec<_>>()
                    .join(" or ");
                Err(self.error(expected))
            }
        }
    }

    /// Consume the current token, which must be the given symbol.
    pub fn consume_symbol(&mut self, symbol: Symbol) -> JackResult<()> {
        if self.match_symbol(symbol)? {
            Ok(())
        } else {
            Err(self.error(format!("'{}'", symbol)))
        }
    }

    /// Consume the current token, which must be an identifier.
    pub fn consume_ident(&mut self) -> JackResult<&'a str> {
        match self.identifier() {
            Some(name) => {
                self.advance()?;
                Ok(name)
            }
            None => Err(self.error("identifier")),
        }
    }

    /// Build an unexpected token error at the current token.
    #[inline(never)]
    #[cold]
    pub fn error(&self, expected: impl ToString) -> JackError {
        JackError::unexpected(expected, self.describe_current(), self.line())
    }
}
