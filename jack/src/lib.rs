//! Single pass compiler from Jack classes to stack machine code.
pub mod compiler;
pub mod constants;
mod error;
pub mod lex;
pub mod symbols;
pub mod vm;

pub use self::{
    compiler::{Compiler, Program, Runtime},
    error::{JackError, JackResult, LexError, LexErrorKind},
};

use self::lex::Lexer;

/// Compile the source of one class with the default runtime.
pub fn compile(source_code: impl AsRef<str>) -> JackResult<Program> {
    let lexer = Lexer::new(source_code.as_ref());
    Compiler::new(lexer).compile()
}

pub mod prelude {
    pub use super::{
        compile,
        compiler::{Compiler, Program, Runtime},
        error::{JackError, JackResult},
        lex::{Lexer, TokenStream},
        symbols::{Category, SymbolTable},
        vm::{ArithOp, Instr, Segment},
    };
}
