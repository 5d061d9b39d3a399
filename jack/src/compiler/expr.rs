//! Expressions and terms.
use super::{resolve, Compiler};
use crate::{
    constants::{MAX_INT, THAT_POINTER, THIS_POINTER},
    error::{JackError, JackResult},
    lex::{Keyword, Symbol, TokenKind},
    symbols::SymbolTable,
    vm::{ArithOp, Segment},
};

impl<'a> Compiler<'a> {
    /// `term (op term)*`
    ///
    /// All operators share one precedence level and associate to the left.
    pub(super) fn compile_expression(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        self.compile_term(symbols)?;

        loop {
            let op = match self.input.symbol() {
                Some(symbol) if symbol.is_binary_op() => symbol,
                _ => return Ok(()),
            };
            self.input.advance()?;

            self.compile_term(symbols)?;
            self.emit_binary_op(op);
        }
    }

    fn emit_binary_op(&mut self, op: Symbol) {
        // No native opcodes for these.
        match op {
            Symbol::Star => self.writer.emit_call(self.runtime.multiply.clone(), 2),
            Symbol::Slash => self.writer.emit_call(self.runtime.divide.clone(), 2),
            _ => {
                if let Some(arith) = native_op(op) {
                    self.writer.emit_arithmetic(arith);
                }
            }
        }
    }

    fn compile_term(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        let line = self.input.line();

        match self.input.current_kind() {
            Some(TokenKind::Integer) => {
                let value = self
                    .input
                    .integer()
                    .ok_or_else(|| self.input.error("integer constant"))?;
                self.input.advance()?;
                self.writer.emit_push(Segment::Constant, value);
                Ok(())
            }
            Some(TokenKind::Str) => {
                let text = self
                    .input
                    .string_literal()
                    .ok_or_else(|| self.input.error("string constant"))?;
                self.emit_string(text, line)?;
                self.input.advance()?;
                Ok(())
            }
            Some(TokenKind::Keyword(keyword)) => self.compile_keyword_constant(keyword),
            Some(TokenKind::Ident) => {
                let name = self.input.consume_ident()?;
                self.compile_name_term(symbols, name, line)
            }
            Some(TokenKind::Symbol(Symbol::LeftParen)) => {
                self.input.advance()?;
                self.compile_expression(symbols)?;
                self.input.consume_symbol(Symbol::RightParen)
            }
            Some(TokenKind::Symbol(symbol @ (Symbol::Minus | Symbol::Tilde))) => {
                self.input.advance()?;
                self.compile_term(symbols)?;
                self.writer.emit_arithmetic(match symbol {
                    Symbol::Minus => ArithOp::Neg,
                    _ => ArithOp::Not,
                });
                Ok(())
            }
            _ => Err(self.input.error("term")),
        }
    }

    fn compile_keyword_constant(&mut self, keyword: Keyword) -> JackResult<()> {
        use Keyword as K;

        match keyword {
            K::True => {
                self.writer.emit_push(Segment::Constant, 0);
                self.writer.emit_arithmetic(ArithOp::Not);
            }
            K::False | K::Null => self.writer.emit_push(Segment::Constant, 0),
            K::This => self.writer.emit_push(Segment::Pointer, THIS_POINTER),
            _ => return Err(self.input.error("term")),
        }

        self.input.advance()?;
        Ok(())
    }

    /// Term starting with an identifier, which was already consumed.
    ///
    /// Either a variable, an array access, or a subroutine call.
    fn compile_name_term(&mut self, symbols: &SymbolTable, name: &str, line: usize) -> JackResult<()> {
        match self.input.symbol() {
            Some(Symbol::LeftBracket) => {
                let (segment, index) = resolve(symbols, name, line)?;
                self.input.advance()?;

                self.writer.emit_push(segment, index);
                self.compile_expression(symbols)?;
                self.input.consume_symbol(Symbol::RightBracket)?;
                self.writer.emit_arithmetic(ArithOp::Add);

                self.writer.emit_pop(Segment::Pointer, THAT_POINTER);
                self.writer.emit_push(Segment::That, 0);
                Ok(())
            }
            Some(Symbol::LeftParen | Symbol::Dot) => self.compile_subroutine_call(symbols, name),
            _ => {
                let (segment, index) = resolve(symbols, name, line)?;
                self.writer.emit_push(segment, index);
                Ok(())
            }
        }
    }

    /// Call whose leading identifier was already consumed.
    ///
    /// - `name(args)` calls a method of this class on the current object.
    /// - `var.name(args)` calls a method on the object held by a variable,
    ///   dispatched through the variable's declared type.
    /// - `Class.name(args)` calls a function or constructor directly.
    ///
    /// Method calls push the receiver first and count it as an argument.
    pub(super) fn compile_subroutine_call(&mut self, symbols: &SymbolTable, name: &str) -> JackResult<()> {
        let (target, receiver_count) = if self.input.is_symbol(Symbol::LeftParen) {
            self.writer.emit_push(Segment::Pointer, THIS_POINTER);
            (format!("{}.{}", self.class_name, name), 1)
        } else if self.input.match_symbol(Symbol::Dot)? {
            let subroutine = self.input.consume_ident()?;

            match symbols.lookup(name) {
                Some(entry) => {
                    self.writer.emit_push(entry.category.into(), entry.index);
                    (format!("{}.{}", entry.ty, subroutine), 1)
                }
                None => (format!("{}.{}", name, subroutine), 0),
            }
        } else {
            return Err(self.input.error("'(' or '.'"));
        };

        self.input.consume_symbol(Symbol::LeftParen)?;
        let arg_count = self.compile_expression_list(symbols)?;
        self.input.consume_symbol(Symbol::RightParen)?;

        self.writer.emit_call(target, arg_count + receiver_count);

        Ok(())
    }

    /// `(expr (, expr)*)?`, returning the number of expressions.
    fn compile_expression_list(&mut self, symbols: &SymbolTable) -> JackResult<u16> {
        if self.input.is_symbol(Symbol::RightParen) {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            self.compile_expression(symbols)?;
            count += 1;

            if !self.input.match_symbol(Symbol::Comma)? {
                return Ok(count);
            }
        }
    }

    /// Build a string object at runtime, one character at a time.
    ///
    /// The lexer keeps string constants within the integer range,
    /// checked again here since the operands are emitted as is.
    fn emit_string(&mut self, text: &str, line: usize) -> JackResult<()> {
        let len = constant(text.chars().count(), line)?;
        self.writer.emit_push(Segment::Constant, len);
        self.writer.emit_call(self.runtime.string_new.clone(), 1);

        for c in text.chars() {
            self.writer.emit_push(Segment::Constant, constant(c as usize, line)?);
            self.writer
                .emit_call(self.runtime.string_append_char.clone(), 2);
        }

        Ok(())
    }
}

/// Value as an integer constant operand.
fn constant(value: usize, line: usize) -> JackResult<u16> {
    u16::try_from(value)
        .ok()
        .filter(|value| *value <= MAX_INT)
        .ok_or_else(|| JackError::limit("string constant out of integer range", line))
}

/// Operators with a native stack machine opcode.
#[rustfmt::skip]
fn native_op(symbol: Symbol) -> Option<ArithOp> {
    match symbol {
        Symbol::Plus    => Some(ArithOp::Add),
        Symbol::Minus   => Some(ArithOp::Sub),
        Symbol::Amp     => Some(ArithOp::And),
        Symbol::Pipe    => Some(ArithOp::Or),
        Symbol::Less    => Some(ArithOp::Lt),
        Symbol::Greater => Some(ArithOp::Gt),
        Symbol::Eq      => Some(ArithOp::Eq),
        _               => None,
    }
}
