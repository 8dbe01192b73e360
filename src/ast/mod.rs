/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The arena that owns every node, and the typed ids that point into it
/// - expressions: Expression nodes
/// - statements: Statements, declarations, classes and programs
/// - types: Type references (`Typing`) and the helpers that compare and print them
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
