//! Stack machine instructions.
use smol_str::SmolStr;
use std::fmt;

use crate::symbols::Category;

/// Addressable memory region of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    /// Fields of the object selected by `pointer 0`.
    This,
    /// Array cells selected by `pointer 1`.
    That,
    /// Two slot register holding the bases of `this` and `that`.
    Pointer,
    Temp,
}

impl Segment {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Argument => "argument",
            Self::Local    => "local",
            Self::Static   => "static",
            Self::This     => "this",
            Self::That     => "that",
            Self::Pointer  => "pointer",
            Self::Temp     => "temp",
        }
    }
}

/// Fields are accessed through `this`, the rest map one to one.
impl From<Category> for Segment {
    fn from(category: Category) -> Self {
        match category {
            Category::Static => Segment::Static,
            Category::Field => Segment::This,
            Category::Argument => Segment::Argument,
            Category::Local => Segment::Local,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native arithmetic and logic opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithOp {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq  => "eq",
            Self::Gt  => "gt",
            Self::Lt  => "lt",
            Self::And => "and",
            Self::Or  => "or",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the emitted program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(ArithOp),
    Label(SmolStr),
    Goto(SmolStr),
    IfGoto(SmolStr),
    /// Function name and number of arguments already on the stack.
    Call(SmolStr, u16),
    /// Function name and number of locals to allocate.
    Function(SmolStr, u16),
    Return,
}

/// Outputs instruction as stack machine text.
impl fmt::Display for Instr {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instr::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Instr::Pop(segment, index)  => write!(f, "pop {} {}", segment, index),
            Instr::Arithmetic(op)       => write!(f, "{}", op),
            Instr::Label(name)          => write!(f, "label {}", name),
            Instr::Goto(name)           => write!(f, "goto {}", name),
            Instr::IfGoto(name)         => write!(f, "if-goto {}", name),
            Instr::Call(name, n_args)   => write!(f, "call {} {}", name, n_args),
            Instr::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            Instr::Return               => write!(f, "return"),
        }
    }
}
