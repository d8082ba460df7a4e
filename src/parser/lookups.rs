use std::collections::{HashMap, HashSet};

/// Characters that may never name a user-defined operator.
pub const RESERVED_OPERATOR_SYMBOLS: &str = "()[]{},/\\";

/// Precedence returned for anything that is not a usable binary operator.
pub const NO_PRECEDENCE: i32 = -1;

/// Built-in binary operators and their precedences.
pub const BUILTIN_PRECEDENCES: [(char, i32); 6] = [
    ('=', 2),
    ('<', 10),
    ('+', 20),
    ('-', 20),
    ('*', 40),
    ('/', 40),
];

/// Binary operator precedences plus the set of declared unary symbols.
///
/// The parser reads it on every binary operator position; entries are only
/// added once a backend has accepted the defining function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    binary: HashMap<char, i32>,
    unary: HashSet<char>,
}

impl OperatorTable {
    /// A table without any operators, not even the built-in ones.
    pub fn empty() -> Self {
        OperatorTable {
            binary: HashMap::new(),
            unary: HashSet::new(),
        }
    }

    /// Stored precedence of `op`, or `NO_PRECEDENCE` when it is absent or not positive.
    pub fn precedence_of(&self, op: char) -> i32 {
        match self.binary.get(&op) {
            Some(precedence) if *precedence > 0 => *precedence,
            _ => NO_PRECEDENCE,
        }
    }

    pub fn is_binary_operator(&self, op: char) -> bool {
        self.precedence_of(op) > 0
    }

    /// Inserts or overwrites the precedence of `op`.
    pub fn define(&mut self, op: char, precedence: i32) {
        self.binary.insert(op, precedence);
    }

    pub fn declare_unary(&mut self, op: char) {
        self.unary.insert(op);
    }

    pub fn is_unary_declared(&self, op: char) -> bool {
        self.unary.contains(&op)
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        let mut table = OperatorTable::empty();
        for (op, precedence) in BUILTIN_PRECEDENCES {
            table.define(op, precedence);
        }
        table
    }
}

/// Whether `c` may name a user-defined unary or binary operator: printable
/// ASCII strictly between space and DEL, not alphanumeric, not reserved.
pub fn is_legal_operator_symbol(c: u8) -> bool {
    c > 32 && c < 127 && !c.is_ascii_alphanumeric() && !RESERVED_OPERATOR_SYMBOLS.contains(c as char)
}
