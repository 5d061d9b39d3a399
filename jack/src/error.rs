//! Result and errors.
use std::fmt::{self, Display, Formatter};

pub type JackResult<T> = std::result::Result<T, JackError>;

/// Failure that aborts the compilation of a source unit.
///
/// None of these are recovered from. Whatever instructions were
/// emitted before the error must be thrown away by the caller.
#[derive(Debug)]
pub enum JackError {
    /// Malformed token shape.
    Lex(LexError),
    /// Grammar violation at the current token.
    UnexpectedToken {
        expected: String,
        encountered: String,
        line: usize,
    },
    /// Identifier not declared in either the subroutine or class scope.
    UnresolvedSymbol { name: String, line: usize },
    /// A count or constant outgrew the 16-bit operands of the stack machine.
    LimitExceeded { what: &'static str, line: usize },
    Io(std::io::Error),
    Fmt(fmt::Error),
}

impl JackError {
    #[inline(never)]
    #[cold]
    pub(crate) fn unexpected(
        expected: impl ToString,
        encountered: impl ToString,
        line: usize,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            encountered: encountered.to_string(),
            line,
        }
    }

    #[inline(never)]
    #[cold]
    pub(crate) fn unresolved(name: impl ToString, line: usize) -> Self {
        Self::UnresolvedSymbol {
            name: name.to_string(),
            line,
        }
    }

    #[inline(never)]
    #[cold]
    pub(crate) fn limit(what: &'static str, line: usize) -> Self {
        Self::LimitExceeded { what, line }
    }
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{}", err),
            Self::UnexpectedToken {
                expected,
                encountered,
                line,
            } => write!(
                f,
                "line {}: encountered unexpected token '{}', expected {}",
                line, encountered, expected
            ),
            Self::UnresolvedSymbol { name, line } => {
                write!(f, "line {}: unresolved symbol '{}'", line, name)
            }
            Self::LimitExceeded { what, line } => {
                write!(f, "line {}: limit exceeded: {}", line, what)
            }
            Self::Io(err) => write!(f, "{}", err),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for JackError {}

impl From<LexError> for JackError {
    fn from(err: LexError) -> Self {
        JackError::Lex(err)
    }
}

impl From<std::io::Error> for JackError {
    fn from(err: std::io::Error) -> Self {
        JackError::Io(err)
    }
}

impl From<fmt::Error> for JackError {
    fn from(err: fmt::Error) -> Self {
        JackError::Fmt(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// 1-based line where the offending token starts.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    /// Starts with a digit, but isn't made of digits only.
    MalformedNumber,
    /// Integer constant exceeds the 15-bit range.
    IntegerOverflow,
    /// Character in a string constant whose value doesn't fit an integer constant.
    UnsupportedCharacter(char),
    /// String constant with more characters than an integer constant can count.
    StringOverflow,
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use LexErrorKind as K;
        write!(f, "line {}: lexical error: ", self.line)?;
        match &self.kind {
            K::UnknownCharacter(c) => write!(f, "unknown character {:?}", c),
            K::UnterminatedString => write!(f, "unterminated string literal"),
            K::UnterminatedComment => write!(f, "unterminated block comment"),
            K::MalformedNumber => write!(f, "malformed number literal"),
            K::IntegerOverflow => write!(f, "integer constant out of range"),
            K::UnsupportedCharacter(c) => write!(f, "unsupported character {:?} in string literal", c),
            K::StringOverflow => write!(f, "string literal too long"),
        }
    }
}

impl std::error::Error for LexError {}
