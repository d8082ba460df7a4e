//! Parser state and token helpers.
//!
//! The parser pulls tokens from the lexer one at a time and keeps a single
//! token of lookahead. It owns the operator table consulted by the
//! precedence-climbing expression parser.

use std::io::BufRead;

use crate::{
    ast::statements::{Prototype, PrototypeKind, ANONYMOUS_PREFIX},
    config::{Config, DEFAULT_MAX_DEPTH},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::Lexer,
        tokens::{Token, TokenKind},
    },
    Position,
};

use super::lookups::{OperatorTable, NO_PRECEDENCE};

/// The main parser structure that maintains parsing state.
pub struct Parser<R> {
    /// Source of tokens
    lexer: Lexer<R>,
    /// The token under the cursor
    current: Token,
    /// Binary precedences and declared unary operators
    operators: OperatorTable,
    /// Deepest allowed expression nesting
    max_depth: usize,
    /// Current expression nesting
    depth: usize,
    /// Counter for anonymous function names
    current_id: usize,
}

impl<R: BufRead> Parser<R> {
    /// Creates a parser with the built-in operators and reads the first token.
    pub fn new(lexer: Lexer<R>) -> Self {
        Parser::with_operators(lexer, OperatorTable::default(), DEFAULT_MAX_DEPTH)
    }

    pub fn with_config(lexer: Lexer<R>, config: &Config) -> Self {
        Parser::with_operators(lexer, OperatorTable::default(), config.max_depth)
    }

    pub fn with_operators(mut lexer: Lexer<R>, operators: OperatorTable, max_depth: usize) -> Self {
        let current = lexer.next_token();

        Parser {
            lexer,
            current,
            operators,
            max_depth,
            depth: 0,
            current_id: 0,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    /// The current token's character, if it is a single-character token.
    pub fn current_char(&self) -> Option<char> {
        match self.current.kind {
            TokenKind::Char(c) => Some(c as char),
            _ => None,
        }
    }

    pub fn is_char(&self, c: u8) -> bool {
        self.current.kind.is_char(c)
    }

    /// Advances to the next token and returns the previous one.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Builds an `UnexpectedToken` error for the current token.
    pub fn unexpected(&self, expected: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: self.current.kind.to_string(),
                expected: String::from(expected),
            },
            self.current.position,
        )
    }

    /// Consumes the single-character token `c`.
    pub fn expect_char(&mut self, c: u8) -> Result<Token, Error> {
        if self.is_char(c) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("`{}`", c as char)))
        }
    }

    /// Consumes a keyword (or any payload-free token) of the given kind.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        if self.current.kind == expected_kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("`{}`", expected_kind)))
        }
    }

    /// Consumes an identifier and returns its name.
    pub fn expect_identifier(&mut self, context: &str) -> Result<String, Error> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected(&format!("an identifier {}", context)))
        }
    }

    /// Runs `parse` one nesting level deeper, failing once `max_depth` is reached.
    pub fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        if self.depth >= self.max_depth {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep {
                    limit: self.max_depth,
                },
                self.current.position,
            ));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Fails with `NestingTooDeep` when a tree of `height` levels would exceed
    /// `max_depth`.
    pub fn check_height(&self, height: usize, position: Position) -> Result<(), Error> {
        if height > self.max_depth {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep {
                    limit: self.max_depth,
                },
                position,
            ));
        }

        Ok(())
    }

    /// Precedence of the current token as a binary operator.
    pub fn current_precedence(&self) -> i32 {
        match self.current_char() {
            Some(op) => self.operators.precedence_of(op),
            None => NO_PRECEDENCE,
        }
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Makes an accepted operator definition visible to subsequently parsed text.
    ///
    /// Call this only after the backend has accepted the definition that
    /// `proto` belongs to. Plain function prototypes are ignored.
    pub fn commit_operator(&mut self, proto: &Prototype) {
        let Some(op) = proto.operator_symbol() else {
            return;
        };

        match proto.kind {
            PrototypeKind::BinaryOp { precedence } => {
                tracing::debug!(operator = %op, precedence, "binary operator committed");
                self.operators.define(op, precedence);
            }
            PrototypeKind::UnaryOp => {
                tracing::debug!(operator = %op, "unary operator committed");
                self.operators.declare_unary(op);
            }
            PrototypeKind::Function => {}
        }
    }

    /// Returns a fresh name for an anonymous top-level function.
    pub fn next_anonymous_name(&mut self) -> String {
        let id = self.current_id;
        self.current_id += 1;
        format!("{}{}", ANONYMOUS_PREFIX, id)
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current.position
    }

    /// Drains lexical diagnostics reported since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Error> {
        self.lexer.take_diagnostics()
    }
}
