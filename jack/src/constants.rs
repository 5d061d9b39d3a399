//! Constant values of the Jack language and its target stack machine.

/// Largest integer constant that can be written in source.
pub const MAX_INT: u16 = 0x7FFF; // 32767

/// Name of the implicit receiver argument of a method.
pub const RECEIVER: &str = "this";

/// Slot of the pointer segment that holds the base of `this`.
pub const THIS_POINTER: u16 = 0;
/// Slot of the pointer segment that holds the base of `that`.
pub const THAT_POINTER: u16 = 1;

/// Scratch temp slot for discarded call results and
/// values stashed during array stores.
pub const SCRATCH_TEMP: u16 = 0;

// Control flow label prefixes, suffixed with the construct's counter.
pub const LABEL_IF_TRUE: &str = "IF_TRUE";
pub const LABEL_IF_FALSE: &str = "IF_FALSE";
pub const LABEL_IF_END: &str = "IF_END";
pub const LABEL_WHILE_EXP: &str = "WHILE_EXP";
pub const LABEL_WHILE_END: &str = "WHILE_END";
