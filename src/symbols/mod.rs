//! Identifier interning.
//!
//! Every identifier spelling is mapped to a [`symbols::Symbol`] handle once,
//! so the rest of the front end compares names by identity.

pub mod symbols;
