use std::{collections::VecDeque, io::BufRead};

use crate::{
    backend::Backend,
    config::Config,
    errors::errors::Error,
    lexer::{lexer::Lexer, tokens::TokenKind},
    parser::{
        parser::Parser,
        stmt::{parse_definition, parse_extern, parse_toplevel},
    },
};

/// What became of one top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A `def` the backend accepted.
    Defined { name: String },
    /// An `extern` the backend accepted.
    Declared { name: String },
    /// A top-level expression and its value.
    Evaluated { value: f64 },
    /// A lexical, syntax, semantic or runtime failure. The session goes on.
    Failed(Error),
}

/// Reads items one at a time and hands them to a backend.
pub struct Driver<R, B> {
    parser: Parser<R>,
    backend: B,
    config: Config,
    /// Outcomes produced but not yet returned
    pending: VecDeque<Outcome>,
}

impl<R: BufRead, B: Backend> Driver<R, B> {
    pub fn new(reader: R, backend: B, config: Config) -> Self {
        Driver {
            parser: Parser::with_config(Lexer::new(reader), &config),
            backend,
            config,
            pending: VecDeque::new(),
        }
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn parser(&self) -> &Parser<R> {
        &self.parser
    }

    /// Processes input until one outcome is available. `None` once the
    /// input is exhausted.
    ///
    /// Lexical errors met while reading an item are returned before the
    /// item's own outcome.
    pub fn next_item(&mut self) -> Option<Outcome> {
        if self.pending.is_empty() {
            let outcome = self.parse_item();

            self.pending
                .extend(self.parser.take_diagnostics().into_iter().map(Outcome::Failed));
            self.pending.extend(outcome);
        }

        self.pending.pop_front()
    }

    /// Runs to the end of input and collects every outcome.
    pub fn run(&mut self) -> Vec<Outcome> {
        let mut outcomes = vec![];
        while let Some(outcome) = self.next_item() {
            outcomes.push(outcome);
        }
        outcomes
    }

    fn parse_item(&mut self) -> Option<Outcome> {
        loop {
            match self.parser.current_token_kind() {
                TokenKind::EOF => return None,
                TokenKind::Char(b';') => {
                    self.parser.advance();
                }
                TokenKind::Def => return Some(self.handle_definition()),
                TokenKind::Extern => return Some(self.handle_extern()),
                _ => return Some(self.handle_toplevel()),
            }
        }
    }

    fn handle_definition(&mut self) -> Outcome {
        let def = match parse_definition(&mut self.parser) {
            Ok(def) => def,
            Err(error) => return self.recover(error),
        };

        if self.config.dump_ast {
            tracing::info!("{}", def);
        }

        let proto = def.proto.clone();
        match self.backend.define(def) {
            Ok(()) => {
                self.parser.commit_operator(&proto);
                tracing::info!(name = %proto.name, "definition accepted");
                Outcome::Defined { name: proto.name }
            }
            Err(error) => self.reject(error),
        }
    }

    fn handle_extern(&mut self) -> Outcome {
        let proto = match parse_extern(&mut self.parser) {
            Ok(proto) => proto,
            Err(error) => return self.recover(error),
        };

        if self.config.dump_ast {
            tracing::info!("(extern {})", proto);
        }

        let name = proto.name.clone();
        match self.backend.declare(proto) {
            Ok(()) => {
                tracing::info!(name = %name, "extern accepted");
                Outcome::Declared { name }
            }
            Err(error) => self.reject(error),
        }
    }

    fn handle_toplevel(&mut self) -> Outcome {
        let def = match parse_toplevel(&mut self.parser) {
            Ok(def) => def,
            Err(error) => return self.recover(error),
        };

        if self.config.dump_ast {
            tracing::info!("{}", def.body);
        }

        match self.backend.evaluate(def) {
            Ok(value) => Outcome::Evaluated { value },
            Err(error) => self.reject(error),
        }
    }

    fn reject(&self, error: Error) -> Outcome {
        tracing::warn!(error = %error, "item rejected");
        Outcome::Failed(error)
    }

    /// Skips the rest of a failed item.
    ///
    /// At least one token is consumed. Skipping then stops at `;`, `def`,
    /// `extern`, end of input, or the first token on a later line than the
    /// one the failure was found on. A failure found on `;` stops right
    /// after it.
    fn recover(&mut self, error: Error) -> Outcome {
        tracing::warn!(error = %error, "syntax error, skipping to the next item");

        let line = self.parser.get_position().line;
        let failed_on_separator = self.parser.is_char(b';');

        self.parser.advance();
        if failed_on_separator {
            return Outcome::Failed(error);
        }

        while !self.at_item_boundary(line) {
            self.parser.advance();
        }

        Outcome::Failed(error)
    }

    fn at_item_boundary(&self, line: u32) -> bool {
        let token = self.parser.current_token();

        matches!(
            token.kind,
            TokenKind::Char(b';') | TokenKind::Def | TokenKind::Extern | TokenKind::EOF
        ) || token.position.line > line
    }
}
