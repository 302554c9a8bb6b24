/// Semantic analysis
/// Name resolution, type checking and implicit conversions.
///
/// Submodules:
/// - scope: Runtime scope stack used for unqualified lookup
/// - semantics: Actions the parser invokes to build the typed tree
pub mod scope;
pub mod semantics;

#[cfg(test)]
mod tests;
