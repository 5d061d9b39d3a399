//! Syntax directed translation of a Jack class into stack machine code.
//!
//! Parsing and code generation happen in a single recursive descent
//! pass. No syntax tree is built; instructions are emitted as soon as
//! each construct is recognised, using one token of lookahead.
mod expr;
mod runtime;
mod stmts;

pub use self::runtime::Runtime;

use log::debug;
use smol_str::SmolStr;
use std::fmt::{self, Write as FmtWrite};

use crate::{
    constants::{RECEIVER, THIS_POINTER},
    error::{JackError, JackResult},
    lex::{Keyword, Lexer, Symbol, TokenStream},
    symbols::{Category, SymbolTable},
    vm::{write_program, Instr, Segment, VmWriter},
};

pub struct Compiler<'a> {
    input: TokenStream<'a>,
    writer: VmWriter,
    runtime: Runtime,
    /// Prefix of every generated function name.
    class_name: SmolStr,
    /// Label counters, reset at the start of every subroutine.
    if_counter: u16,
    while_counter: u16,
}

impl<'a> Compiler<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            input: TokenStream::new(lexer),
            writer: VmWriter::new(),
            runtime: Runtime::default(),
            class_name: SmolStr::default(),
            if_counter: 0,
            while_counter: 0,
        }
    }

    /// Replace the names of the external runtime functions.
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    /// Compile the whole source unit, which must contain exactly one class.
    ///
    /// On error nothing is returned; instructions emitted up to
    /// the failure are dropped along with the compiler.
    pub fn compile(mut self) -> JackResult<Program> {
        let mut symbols = SymbolTable::new();
        self.compile_class(&mut symbols)?;

        Ok(Program {
            class_name: self.class_name,
            code: self.writer.into_instructions(),
        })
    }
}

/// Declarations
impl<'a> Compiler<'a> {
    fn compile_class(&mut self, symbols: &mut SymbolTable) -> JackResult<()> {
        use Keyword as K;

        self.input.advance()?;
        self.input.consume_keyword(&[K::Class])?;
        self.class_name = SmolStr::from(self.input.consume_ident()?);
        debug!("compiling class {}", self.class_name);

        self.input.consume_symbol(Symbol::LeftBrace)?;

        while self.input.is_keyword(&[K::Static, K::Field]) {
            self.compile_class_var_dec(symbols)?;
        }

        while self.input.is_keyword(&[K::Constructor, K::Function, K::Method]) {
            self.compile_subroutine(symbols)?;
        }

        self.input.consume_symbol(Symbol::RightBrace)?;

        // One class per source unit.
        if self.input.current().is_some() {
            return Err(self.input.error("end-of-file"));
        }

        Ok(())
    }

    /// `(static | field) type name (, name)* ;`
    fn compile_class_var_dec(&mut self, symbols: &mut SymbolTable) -> JackResult<()> {
        let category = match self.input.consume_keyword(&[Keyword::Static, Keyword::Field])? {
            Keyword::Static => Category::Static,
            _ => Category::Field,
        };
        self.compile_var_names(symbols, category)
    }

    /// `var type name (, name)* ;`
    fn compile_var_dec(&mut self, symbols: &mut SymbolTable) -> JackResult<()> {
        self.input.consume_keyword(&[Keyword::Var])?;
        self.compile_var_names(symbols, Category::Local)
    }

    fn compile_var_names(&mut self, symbols: &mut SymbolTable, category: Category) -> JackResult<()> {
        let ty = self.compile_type()?;

        loop {
            let line = self.input.line();
            let name = self.input.consume_ident()?;
            declare(symbols, name, ty, category, line)?;

            if !self.input.match_symbol(Symbol::Comma)? {
                break;
            }
        }

        self.input.consume_symbol(Symbol::Semicolon)
    }

    /// Primitive type keyword or class name.
    fn compile_type(&mut self) -> JackResult<&'a str> {
        use Keyword as K;

        match self.input.keyword() {
            Some(keyword @ (K::Int | K::Char | K::Boolean)) => {
                self.input.advance()?;
                Ok(keyword.as_str())
            }
            _ => match self.input.identifier() {
                Some(class_name) => {
                    self.input.advance()?;
                    Ok(class_name)
                }
                None => Err(self.input.error("type")),
            },
        }
    }

    fn compile_subroutine(&mut self, symbols: &mut SymbolTable) -> JackResult<()> {
        use Keyword as K;

        let kind = self
            .input
            .consume_keyword(&[K::Constructor, K::Function, K::Method])?;

        symbols.start_subroutine();
        self.if_counter = 0;
        self.while_counter = 0;

        if kind == K::Method {
            let line = self.input.line();
            declare(symbols, RECEIVER, &self.class_name, Category::Argument, line)?;
        }

        // Return type is only checked for shape.
        if self.input.is_keyword(&[K::Void]) {
            self.input.advance()?;
        } else {
            self.compile_type()?;
        }

        let name = self.input.consume_ident()?;
        let function_name = format!("{}.{}", self.class_name, name);
        debug!("compiling {} {}", kind, function_name);

        self.input.consume_symbol(Symbol::LeftParen)?;
        self.compile_parameter_list(symbols)?;
        self.input.consume_symbol(Symbol::RightParen)?;

        // Body
        self.input.consume_symbol(Symbol::LeftBrace)?;

        while self.input.is_keyword(&[K::Var]) {
            self.compile_var_dec(symbols)?;
        }

        self.writer
            .emit_function(function_name, symbols.var_count(Category::Local));

        match kind {
            K::Constructor => {
                self.writer.emit_push(Segment::Constant, symbols.field_count());
                self.writer.emit_call(self.runtime.alloc.clone(), 1);
                self.writer.emit_pop(Segment::Pointer, THIS_POINTER);
            }
            K::Method => {
                self.writer.emit_push(Segment::Argument, 0);
                self.writer.emit_pop(Segment::Pointer, THIS_POINTER);
            }
            _ => {}
        }

        self.compile_statements(symbols)?;

        self.input.consume_symbol(Symbol::RightBrace)
    }

    /// `((type name) (, type name)*)?`
    fn compile_parameter_list(&mut self, symbols: &mut SymbolTable) -> JackResult<()> {
        if self.input.is_symbol(Symbol::RightParen) {
            return Ok(());
        }

        loop {
            let ty = self.compile_type()?;
            let line = self.input.line();
            let name = self.input.consume_ident()?;
            declare(symbols, name, ty, Category::Argument, line)?;

            if !self.input.match_symbol(Symbol::Comma)? {
                return Ok(());
            }
        }
    }
}

fn declare(
    symbols: &mut SymbolTable,
    name: &str,
    ty: &str,
    category: Category,
    line: usize,
) -> JackResult<()> {
    symbols
        .define(name, ty, category)
        .map(|_| ())
        .ok_or_else(|| JackError::limit("too many variables of one kind", line))
}

/// Take the current value of a label counter and advance it.
fn next_label(counter: &mut u16, line: usize) -> JackResult<u16> {
    let k = *counter;
    *counter = k
        .checked_add(1)
        .ok_or_else(|| JackError::limit("too many if or while statements in one subroutine", line))?;
    Ok(k)
}

/// Look up a variable's memory location.
fn resolve(symbols: &SymbolTable, name: &str, line: usize) -> JackResult<(Segment, u16)> {
    symbols
        .resolve(name)
        .map(|(category, index)| (Segment::from(category), index))
        .ok_or_else(|| JackError::unresolved(name, line))
}

/// Stack machine code of one compiled class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub class_name: SmolStr,
    pub code: Vec<Instr>,
}

impl Program {
    #[inline]
    pub fn instructions(&self) -> &[Instr] {
        &self.code
    }

    /// Write the program as text, one instruction per line.
    pub fn write_to<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        write_program(w, &self.code)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_to(f)
    }
}
