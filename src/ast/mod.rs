/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Expression nodes and their s-expression rendering
/// - statements: Prototypes and function definitions
pub mod ast;
pub mod statements;
