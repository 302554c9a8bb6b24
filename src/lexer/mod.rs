//! Lexical analysis module for the compiler.
//!
//! This module contains the scanner that converts source code into a stream
//! of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Interning of every token spelling
//! - Token position tracking for error reporting
//! - A replayable token stream with lookahead and injection

pub mod lexer;
pub mod stream;
pub mod tokens;
