//! Utility macros for the front end.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_ERROR!` - Creates an Error from an `ErrorImpl` variant and a position

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$position` - Where the token starts
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Int(42), Position::start());
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $position:expr) => {
        Token {
            kind: $kind,
            position: $position,
        }
    };
}

/// Creates an Error, wrapping the given `ErrorImpl` variant.
///
/// # Example
///
/// ```ignore
/// return Err(MK_ERROR!(ErrorImpl::UnknownFunction { name }, proto.position));
/// ```
#[macro_export]
macro_rules! MK_ERROR {
    ($error:expr, $position:expr) => {
        $crate::errors::errors::Error::new($error, $position)
    };
}
