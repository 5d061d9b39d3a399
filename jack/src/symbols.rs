//! Two-tier symbol table.
//!
//! The class scope lives for the whole class and holds static and field
//! variables. The subroutine scope is rebuilt for every subroutine and
//! holds arguments and locals. Lookups try the subroutine scope first,
//! so subroutine names shadow class members.
use smol_str::SmolStr;
use std::{collections::HashMap, fmt};

/// Storage category of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Static,
    Field,
    Argument,
    Local,
}

impl Category {
    /// Static and field variables belong to the class scope.
    #[inline]
    pub fn is_class_level(&self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Field => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: SmolStr,
    /// Primitive type name or class name.
    pub ty: SmolStr,
    pub category: Category,
    /// 0-based ordinal among the entries of the same category in the same scope.
    pub index: u16,
}

/// One tier of the symbol table, with a counter for each of
/// the two categories it can hold.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<SmolStr, SymbolEntry>,
    counters: [u16; 2],
}

impl Scope {
    /// Insert the symbol under the next index of its counter.
    ///
    /// Redefining a name replaces the previous entry and still
    /// advances the counter. Returns `None` once the counter is spent.
    fn define(&mut self, slot: usize, name: &str, ty: &str, category: Category) -> Option<u16> {
        let index = self.counters[slot];
        self.counters[slot] = index.checked_add(1)?;

        self.symbols.insert(
            SmolStr::from(name),
            SymbolEntry {
                name: SmolStr::from(name),
                ty: SmolStr::from(ty),
                category,
                index,
            },
        );

        Some(index)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class: Scope,
    subroutine: Scope,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the subroutine scope and reset its counters.
    pub fn start_subroutine(&mut self) {
        self.subroutine = Scope::default();
    }

    /// Declare a variable, returning its assigned index.
    ///
    /// `None` when the category has run out of indices.
    pub fn define(&mut self, name: &str, ty: &str, category: Category) -> Option<u16> {
        let (scope, slot) = self.scope_slot_mut(category);
        scope.define(slot, name, ty, category)
    }

    /// Find a declared name, subroutine scope first.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }

    pub fn resolve(&self, name: &str) -> Option<(Category, u16)> {
        self.lookup(name).map(|entry| (entry.category, entry.index))
    }

    pub fn resolve_type(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|entry| entry.ty.as_str())
    }

    #[inline]
    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of declarations made so far under the given category.
    pub fn var_count(&self, category: Category) -> u16 {
        let slot = counter_slot(category);
        if category.is_class_level() {
            self.class.counters[slot]
        } else {
            self.subroutine.counters[slot]
        }
    }

    /// Number of fields, which is the size of an instance.
    #[inline]
    pub fn field_count(&self) -> u16 {
        self.var_count(Category::Field)
    }

    pub fn subroutine_scope(&self) -> &Scope {
        &self.subroutine
    }

    fn scope_slot_mut(&mut self, category: Category) -> (&mut Scope, usize) {
        let slot = counter_slot(category);
        if category.is_class_level() {
            (&mut self.class, slot)
        } else {
            (&mut self.subroutine, slot)
        }
    }
}

/// Position of the category's counter within its scope.
#[inline]
fn counter_slot(category: Category) -> usize {
    match category {
        Category::Static | Category::Argument => 0,
        Category::Field | Category::Local => 1,
    }
}
