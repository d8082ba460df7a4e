use std::io::BufRead;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// What a pattern handler made of the text it matched.
pub enum Lexeme {
    Token(TokenKind),
    Skip,
    Malformed(ErrorImpl),
}

pub type RegexHandler = fn(&str) -> Lexeme;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Order matters: the first pattern matching at the cursor wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^[ \t\r\n\x0B\x0C]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^#[^\n\r]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^[0-9.]+").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"^.").unwrap(), handler: char_handler },
    ];
}

/// Streaming lexer over any buffered reader.
///
/// Input is pulled one line at a time, so reading the next line is the only
/// point where lexing can block. No token spans a line break.
pub struct Lexer<R> {
    reader: R,
    buffer: String,
    pos: usize,
    location: Position,
    exhausted: bool,
    diagnostics: Vec<Error>,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Lexer<R> {
        Lexer {
            reader,
            buffer: String::new(),
            pos: 0,
            location: Position::start(),
            exhausted: false,
            diagnostics: vec![],
        }
    }

    /// Returns the next token. Malformed input is reported on the diagnostic
    /// channel and skipped; once the input is exhausted every call yields `EOF`.
    pub fn next_token(&mut self) -> Token {
        loop {
            if self.pos >= self.buffer.len() && !self.fill() {
                return MK_TOKEN!(TokenKind::EOF, self.location);
            }

            let start = self.location;
            let remaining = &self.buffer[self.pos..];
            let (len, lexeme) = PATTERNS
                .iter()
                .find_map(|pattern| {
                    pattern
                        .regex
                        .find(remaining)
                        .map(|found| (found.end(), (pattern.handler)(found.as_str())))
                })
                .unwrap_or_else(|| unrecognised(remaining));

            for c in self.buffer[self.pos..self.pos + len].chars() {
                self.location.advance(c);
            }
            self.pos += len;

            match lexeme {
                Lexeme::Token(kind) => {
                    tracing::trace!(token = %kind, position = %start, "lexed token");
                    return MK_TOKEN!(kind, start);
                }
                Lexeme::Skip => continue,
                Lexeme::Malformed(error) => {
                    tracing::warn!(position = %start, "{}", error);
                    self.diagnostics.push(Error::new(error, start));
                }
            }
        }
    }

    /// Drains the errors reported since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn at_eof(&self) -> bool {
        self.exhausted && self.pos >= self.buffer.len()
    }

    fn fill(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        self.buffer.clear();
        self.pos = 0;

        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => {
                self.exhausted = true;
                false
            }
            Ok(_) => true,
            Err(err) => {
                let error = ErrorImpl::Io {
                    message: err.to_string(),
                };
                tracing::warn!(position = %self.location, "{}", error);
                self.diagnostics.push(Error::new(error, self.location));
                self.exhausted = true;
                false
            }
        }
    }
}

fn unrecognised(remaining: &str) -> (usize, Lexeme) {
    let c = remaining.chars().next().unwrap_or('\0');
    (
        c.len_utf8(),
        Lexeme::Malformed(ErrorImpl::UnrecognisedCharacter { character: c }),
    )
}

fn skip_handler(_matched: &str) -> Lexeme {
    Lexeme::Skip
}

fn symbol_handler(matched: &str) -> Lexeme {
    match RESERVED_LOOKUP.get(matched) {
        Some(kind) => Lexeme::Token(kind.clone()),
        None => Lexeme::Token(TokenKind::Identifier(String::from(matched))),
    }
}

fn number_handler(matched: &str) -> Lexeme {
    let parsed = match matched.matches('.').count() {
        0 => matched.parse().ok().map(TokenKind::Int),
        1 => matched.parse().ok().map(TokenKind::Float),
        _ => None,
    };

    match parsed {
        Some(kind) => Lexeme::Token(kind),
        None => Lexeme::Malformed(ErrorImpl::MalformedNumber {
            literal: String::from(matched),
        }),
    }
}

fn char_handler(matched: &str) -> Lexeme {
    match matched.chars().next() {
        Some(c) if c.is_ascii() => Lexeme::Token(TokenKind::Char(c as u8)),
        Some(c) => Lexeme::Malformed(ErrorImpl::UnrecognisedCharacter { character: c }),
        None => Lexeme::Skip,
    }
}

/// Lexes all of `source`, returning the tokens (ending with `EOF`) and any
/// diagnostics reported along the way.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut lex = Lexer::new(source.as_bytes());
    let mut tokens = vec![];

    loop {
        let token = lex.next_token();
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);

        if done {
            break;
        }
    }

    (tokens, lex.take_diagnostics())
}
