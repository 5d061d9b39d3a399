//! Stack machine instruction model and emitter.
mod instr;
mod writer;

pub use self::{
    instr::{ArithOp, Instr, Segment},
    writer::{write_program, VmWriter},
};
