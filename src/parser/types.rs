//! Type parsing implementation.
//!
//! This module handles parsing of type specifiers. It supports:
//!
//! - Builtin types (`void`, `bool`, `auto`, integer and float ranks)
//! - Reference types (`&T`)
//! - Function types (`func(T, U) -> R`)
//! - Parenthesised types
//!
//! Every handler returns the canonical interned type.

use std::collections::HashMap;

use crate::{
    errors::errors::Error,
    lexer::tokens::TokenKind,
    types::types::{FloatRank, IntRank, TypeId},
};

use super::parser::Parser;

/// Type alias for type handler functions.
pub type TypeNUDHandler = fn(&mut Parser<'_>) -> Result<TypeId, Error>;

/// Type alias for type lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    for kind in [
        TokenKind::Void,
        TokenKind::Bool,
        TokenKind::Auto,
        TokenKind::Int,
        TokenKind::Int8,
        TokenKind::Int16,
        TokenKind::Int32,
        TokenKind::Int64,
        TokenKind::Float,
        TokenKind::Float32,
        TokenKind::Float64,
    ] {
        parser.type_nud(kind, parse_builtin_type);
    }

    parser.type_nud(TokenKind::Ampersand, parse_reference_type);
    parser.type_nud(TokenKind::Func, parse_function_type);
    parser.type_nud(TokenKind::OpenParen, parse_grouping_type);
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeId, Error> {
    let handler = match parser.get_type_nud_lookup().get(&parser.current_token_kind()) {
        Some(handler) => *handler,
        None => return Err(parser.unexpected_detailed("expected a type")),
    };

    handler(parser)
}

pub fn parse_builtin_type(parser: &mut Parser) -> Result<TypeId, Error> {
    let token = parser.advance();
    let types = &parser.sema.cx.types;

    let ty = match token.kind {
        TokenKind::Void => types.get_unit(),
        TokenKind::Bool => types.get_bool(),
        TokenKind::Auto => types.get_auto(),
        TokenKind::Int8 => types.get_int(IntRank::I8),
        TokenKind::Int16 => types.get_int(IntRank::I16),
        TokenKind::Int | TokenKind::Int32 => types.get_int(IntRank::I32),
        TokenKind::Int64 => types.get_int(IntRank::I64),
        TokenKind::Float32 => types.get_float(FloatRank::F32),
        _ => types.get_float(FloatRank::F64),
    };

    Ok(ty)
}

pub fn parse_reference_type(parser: &mut Parser) -> Result<TypeId, Error> {
    parser.expect(TokenKind::Ampersand)?;
    let pointee = parse_type(parser)?;

    Ok(parser.sema.cx.types.get_reference(pointee))
}

pub fn parse_function_type(parser: &mut Parser) -> Result<TypeId, Error> {
    parser.expect(TokenKind::Func)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            params.push(parse_type(parser)?);

            match parser.current_token_kind() {
                TokenKind::Comma => {
                    parser.advance();
                }
                TokenKind::CloseParen => break,
                _ => return Err(parser.unexpected_detailed("expected `,` or `)` after type")),
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect(TokenKind::Arrow)?;
    let ret = parse_type(parser)?;

    Ok(parser.sema.cx.types.get_function(params, ret))
}

pub fn parse_grouping_type(parser: &mut Parser) -> Result<TypeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let ty = parse_type(parser)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(ty)
}
