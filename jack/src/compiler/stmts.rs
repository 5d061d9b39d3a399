//! Statements.
use super::{next_label, resolve, Compiler};
use crate::{
    constants::*,
    error::JackResult,
    lex::{Keyword, Symbol},
    symbols::SymbolTable,
    vm::{ArithOp, Segment},
};

impl<'a> Compiler<'a> {
    /// Zero or more statements, ending at the first token that
    /// doesn't start one.
    pub(super) fn compile_statements(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        use Keyword as K;

        loop {
            match self.input.keyword() {
                Some(K::Let) => self.compile_let(symbols)?,
                Some(K::If) => self.compile_if(symbols)?,
                Some(K::While) => self.compile_while(symbols)?,
                Some(K::Do) => self.compile_do(symbols)?,
                Some(K::Return) => self.compile_return(symbols)?,
                _ => return Ok(()),
            }
        }
    }

    /// `let name = expr;` or `let name[expr] = expr;`
    fn compile_let(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        self.input.consume_keyword(&[Keyword::Let])?;

        let line = self.input.line();
        let name = self.input.consume_ident()?;
        let (segment, index) = resolve(symbols, name, line)?;

        if self.input.match_symbol(Symbol::LeftBracket)? {
            // Target address goes on the stack first.
            self.writer.emit_push(segment, index);
            self.compile_expression(symbols)?;
            self.input.consume_symbol(Symbol::RightBracket)?;
            self.writer.emit_arithmetic(ArithOp::Add);

            self.input.consume_symbol(Symbol::Eq)?;
            self.compile_expression(symbols)?;

            // The right hand side may have used `that` itself, so the
            // address is only moved into the pointer after it's evaluated.
            self.writer.emit_pop(Segment::Temp, SCRATCH_TEMP);
            self.writer.emit_pop(Segment::Pointer, THAT_POINTER);
            self.writer.emit_push(Segment::Temp, SCRATCH_TEMP);
            self.writer.emit_pop(Segment::That, 0);
        } else {
            self.input.consume_symbol(Symbol::Eq)?;
            self.compile_expression(symbols)?;
            self.writer.emit_pop(segment, index);
        }

        self.input.consume_symbol(Symbol::Semicolon)
    }

    /// `if (expr) { statements } (else { statements })?`
    fn compile_if(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        let line = self.input.line();
        self.input.consume_keyword(&[Keyword::If])?;

        let k = next_label(&mut self.if_counter, line)?;
        let if_true = format!("{}{}", LABEL_IF_TRUE, k);
        let if_false = format!("{}{}", LABEL_IF_FALSE, k);

        self.compile_condition(symbols)?;
        self.writer.emit_if_goto(if_true.as_str());
        self.writer.emit_goto(if_false.as_str());
        self.writer.emit_label(if_true);

        self.compile_block(symbols)?;

        if self.input.is_keyword(&[Keyword::Else]) {
            self.input.advance()?;

            let if_end = format!("{}{}", LABEL_IF_END, k);
            self.writer.emit_goto(if_end.as_str());
            self.writer.emit_label(if_false);
            self.compile_block(symbols)?;
            self.writer.emit_label(if_end);
        } else {
            self.writer.emit_label(if_false);
        }

        Ok(())
    }

    /// `while (expr) { statements }`
    fn compile_while(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        let line = self.input.line();
        self.input.consume_keyword(&[Keyword::While])?;

        let k = next_label(&mut self.while_counter, line)?;
        let while_exp = format!("{}{}", LABEL_WHILE_EXP, k);
        let while_end = format!("{}{}", LABEL_WHILE_END, k);

        self.writer.emit_label(while_exp.as_str());
        self.compile_condition(symbols)?;
        self.writer.emit_arithmetic(ArithOp::Not);
        self.writer.emit_if_goto(while_end.as_str());

        self.compile_block(symbols)?;

        self.writer.emit_goto(while_exp);
        self.writer.emit_label(while_end);

        Ok(())
    }

    /// `do call;`
    ///
    /// Every call leaves a value on the stack, even void ones,
    /// which is thrown away.
    fn compile_do(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        self.input.consume_keyword(&[Keyword::Do])?;

        let name = self.input.consume_ident()?;
        self.compile_subroutine_call(symbols, name)?;
        self.input.consume_symbol(Symbol::Semicolon)?;

        self.writer.emit_pop(Segment::Temp, SCRATCH_TEMP);

        Ok(())
    }

    /// `return expr?;`
    fn compile_return(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        self.input.consume_keyword(&[Keyword::Return])?;

        if self.input.is_symbol(Symbol::Semicolon) {
            self.writer.emit_push(Segment::Constant, 0);
        } else {
            self.compile_expression(symbols)?;
        }
        self.input.consume_symbol(Symbol::Semicolon)?;

        self.writer.emit_return();

        Ok(())
    }

    /// `(expr)`
    fn compile_condition(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        self.input.consume_symbol(Symbol::LeftParen)?;
        self.compile_expression(symbols)?;
        self.input.consume_symbol(Symbol::RightParen)
    }

    /// `{ statements }`
    fn compile_block(&mut self, symbols: &SymbolTable) -> JackResult<()> {
        self.input.consume_symbol(Symbol::LeftBrace)?;
        self.compile_statements(symbols)?;
        self.input.consume_symbol(Symbol::RightBrace)
    }
}
