//! Canonical types.
//!
//! Types are hash-consed by the [`types::TypeFactory`]: structurally equal
//! types share one [`types::TypeId`], so type equality anywhere in the front
//! end is a plain id comparison and ids can key maps directly.

pub mod types;

#[cfg(test)]
mod tests;
