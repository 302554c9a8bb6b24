/// AST (Abstract Syntax Tree) module
/// Contains the resolved, typed tree produced by the parser and the semantic
/// engine. Nodes live in per-category arenas and refer to each other by index.
///
/// Submodules:
/// - ast: Arenas, node indices and tree-wide queries
/// - declarations: Declarations and the scope records of scoped declarations
/// - expressions: Typed expression nodes, including materialized conversions
/// - statements: Statement nodes of function bodies
pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod statements;
