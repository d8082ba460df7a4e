//! Lexical analysis module.
//!
//! This module contains the lexer (tokenizer) that converts a character
//! stream into tokens for parsing. It handles:
//!
//! - Tokenization using an ordered table of regex patterns
//! - Recognition of keywords, identifiers and numeric literals
//! - Single-character tokens for punctuation and operators
//! - Line comments and whitespace
//! - Token position tracking for error reporting

pub mod lexer;
pub mod tokens;
