//! The session loop.
//!
//! One item at a time: `def`, `extern`, stray `;`, or a bare expression.
//! Parse failures skip to the next item; backend failures are reported and
//! the session continues. Operator precedences reach the parser only after
//! the backend has accepted the defining function.

pub mod driver;

#[cfg(test)]
mod tests;
