//! Instruction emitter.
use log::trace;
use smol_str::SmolStr;
use std::fmt::{self, Write as FmtWrite};

use super::{ArithOp, Instr, Segment};

/// Append-only buffer of emitted instructions.
///
/// Every emit call appends exactly one instruction. Operands are
/// not validated here.
#[derive(Debug, Default)]
pub struct VmWriter {
    code: Vec<Instr>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_push(&mut self, segment: Segment, index: u16) {
        self.emit(Instr::Push(segment, index));
    }

    pub fn emit_pop(&mut self, segment: Segment, index: u16) {
        self.emit(Instr::Pop(segment, index));
    }

    pub fn emit_arithmetic(&mut self, op: ArithOp) {
        self.emit(Instr::Arithmetic(op));
    }

    pub fn emit_label(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instr::Label(name.into()));
    }

    pub fn emit_goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instr::Goto(name.into()));
    }

    pub fn emit_if_goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instr::IfGoto(name.into()));
    }

    pub fn emit_call(&mut self, name: impl Into<SmolStr>, n_args: u16) {
        self.emit(Instr::Call(name.into(), n_args));
    }

    pub fn emit_function(&mut self, name: impl Into<SmolStr>, n_locals: u16) {
        self.emit(Instr::Function(name.into(), n_locals));
    }

    pub fn emit_return(&mut self) {
        self.emit(Instr::Return);
    }

    #[inline]
    pub fn instructions(&self) -> &[Instr] {
        &self.code
    }

    #[inline]
    pub fn into_instructions(self) -> Vec<Instr> {
        self.code
    }

    fn emit(&mut self, instr: Instr) {
        if cfg!(feature = "emit_trace") {
            trace!("{}", instr);
        }
        self.code.push(instr);
    }
}

/// Write instructions as text, one per line.
pub fn write_program<W: FmtWrite>(w: &mut W, code: &[Instr]) -> fmt::Result {
    for instr in code {
        writeln!(w, "{}", instr)?;
    }
    Ok(())
}
