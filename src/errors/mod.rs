//! Error types and error handling for the front end.
//!
//! This module defines the error types shared by every phase:
//!
//! - Error structures with source position information
//! - Specific error variants for lexing, parsing and the backend
//! - Classification into lexical, syntax, semantic and runtime errors
//! - Helpful error messages and suggestions

pub mod errors;
