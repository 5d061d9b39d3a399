//! External runtime entry points the generated code calls by name.
use smol_str::SmolStr;

/// Names of the operating system functions that compiled code depends on.
///
/// Compiled programs must be linked against functions with these
/// names and arities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    /// Heap allocation, takes the size in words. Arity 1.
    pub alloc: SmolStr,
    /// String constructor, takes the capacity. Arity 1.
    pub string_new: SmolStr,
    /// Appends a character to a string and returns the string. Arity 2.
    pub string_append_char: SmolStr,
    /// Arity 2.
    pub multiply: SmolStr,
    /// Arity 2.
    pub divide: SmolStr,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            alloc: SmolStr::new("Memory.alloc"),
            string_new: SmolStr::new("String.new"),
            string_append_char: SmolStr::new("String.appendChar"),
            multiply: SmolStr::new("Math.multiply"),
            divide: SmolStr::new("Math.divide"),
        }
    }
}
