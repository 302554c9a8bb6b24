//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the front end. Every
//! failure is a single [`errors::Error`] carrying the position it was raised
//! at. There is no recovery: the first error ends the translation.
//!
//! - Lexical and syntactic errors from the scanner and parser
//! - Name resolution and type errors from the semantic engine
//! - Constant evaluation errors from the evaluator

pub mod errors;
