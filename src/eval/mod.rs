/// Constant evaluation
/// Evaluates typed expressions at compile time against a static store.
///
/// Submodules:
/// - evaluator: Tree-walking evaluator and its strictness modes
/// - store: Objects and the values bound to static declarations
/// - value: Evaluation results
pub mod evaluator;
pub mod store;
pub mod value;

#[cfg(test)]
mod tests;
