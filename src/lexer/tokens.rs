use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Position;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("def", TokenKind::Def);
        map.insert("extern", TokenKind::Extern);
        map.insert("var", TokenKind::Var);
        map.insert("in", TokenKind::In);
        map.insert("if", TokenKind::If);
        map.insert("then", TokenKind::Then);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("unary", TokenKind::Unary);
        map.insert("binary", TokenKind::Binary);
        map
    };
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    EOF,
    Int(i64),
    Float(f64),
    Identifier(String),

    // Reserved
    Def,
    Extern,
    Var,
    In,
    If,
    Then,
    Else,
    For,
    Unary,
    Binary,

    /// Any other single character: punctuation, built-in and user-defined operators.
    Char(u8),
}

impl TokenKind {
    pub fn is_char(&self, c: u8) -> bool {
        matches!(self, TokenKind::Char(ch) if *ch == c)
    }
}

/// Canonical display name of a token, used in diagnostics.
impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::EOF => write!(f, "EOF"),
            TokenKind::Int(value) => write!(f, "{}", value),
            TokenKind::Float(value) => write!(f, "{:.6}", value),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Def => write!(f, "def"),
            TokenKind::Extern => write!(f, "extern"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::In => write!(f, "in"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Then => write!(f, "then"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::For => write!(f, "for"),
            TokenKind::Unary => write!(f, "unary"),
            TokenKind::Binary => write!(f, "binary"),
            TokenKind::Char(c) => write!(f, "{}", *c as char),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}
