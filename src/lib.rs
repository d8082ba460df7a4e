#![allow(clippy::module_inception)]

use std::{fmt::Display, fs, path::Path};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod backend;
pub mod config;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod logger;
pub mod macros;
pub mod parser;

extern crate regex;

/// A line/column pair in the input stream. Both are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Position { line, col }
    }

    pub fn start() -> Self {
        Position { line: 1, col: 1 }
    }

    /// Moves past `c`. Newlines and carriage returns both start a new line.
    pub fn advance(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Returns the text of the 1-based `line` of `file`, without its line terminator.
pub fn get_line(file: &Path, line: u32) -> Option<String> {
    let content = fs::read_to_string(file).ok()?;

    content
        .split_inclusive(|c: char| c == '\n' || c == '\r')
        .nth(line.checked_sub(1)? as usize)
        .map(|text| text.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{get_line, Position};

    #[test]
    fn test_get_line() {
        let file = PathBuf::from("tests/fixtures/operators.kal");

        assert_eq!(get_line(&file, 1).unwrap(), "# user-defined operators");
        assert_eq!(
            get_line(&file, 3).unwrap(),
            "def binary| 5 (lhs rhs) if lhs then 1 else if rhs then 1 else 0;"
        );
        assert!(get_line(&file, 0).is_none());
        assert!(get_line(&file, 1000).is_none());
    }

    #[test]
    fn test_position_advance() {
        let mut pos = Position::start();
        pos.advance('a');
        pos.advance('b');
        assert_eq!(pos, Position::new(1, 3));

        pos.advance('\n');
        assert_eq!(pos, Position::new(2, 1));

        pos.advance('\r');
        assert_eq!(pos, Position::new(3, 1));
    }
}

/// Renders an error the way a terminal user wants to see it:
///
/// ```text
/// Error: UnexpectedToken (expected `)`, found `;`)
/// -> prog.kal
///   |
/// 3 | def foo(x ;
///   | ----------^
/// ```
///
/// The source excerpt is only shown when `file` names a readable file.
pub fn display_error(error: &Error, file: Option<&Path>) {
    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }

    let position = error.get_position();
    let Some(file) = file else {
        eprintln!("-> <stdin>:{}", position);
        return;
    };

    eprintln!("-> {}:{}", file.as_os_str().to_string_lossy(), position);

    let Some(line_text) = get_line(file, position.line) else {
        return;
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = (position.col as usize).saturating_sub(removed_whitespace).max(1);

    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
