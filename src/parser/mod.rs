//! Parser module driving semantic analysis.
//!
//! This module contains the parser that turns a stream of tokens into the
//! resolved, typed tree held by a [`Context`](crate::context::Context). It
//! uses a Pratt parser for expressions with proper operator precedence and
//! handles:
//!
//! - Deferred parsing of top-level declarations, so declarations may be used
//!   before the point where they are written
//! - Statement parsing (local declarations, control flow, blocks)
//! - Expression parsing (operators, calls, literals)
//! - Type parsing for type specifiers
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod deferred;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
