//! Parser implementation driving the semantic actions.
//!
//! This module contains the main Parser struct and the entry points.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//! It does not build a syntax tree of its own: every construct is handed to
//! [`Semantics`] as soon as it is recognised.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//! - Type parsing handlers

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::ast::{DeclId, ExprId},
    context::Context,
    errors::errors::{Error, ErrorImpl},
    eval::evaluator::EvalMode,
    lexer::{
        stream::TokenStream,
        tokens::{Token, TokenKind},
    },
    semantics::semantics::Semantics,
    Position,
};

use super::{
    deferred::{identify_translation_unit, run_deferred, DeferredAction, Scheduler},
    expr::parse_expr,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream, the semantic engine it reports to,
/// the queues of deferred declaration work and the lookup tables for
/// parsing statements, expressions, and types.
pub struct Parser<'a> {
    /// The token stream, including replayed spans
    tokens: TokenStream,
    /// Semantic actions and the scope stack
    pub sema: Semantics<'a>,
    /// Deferred signatures, initializers and bodies
    scheduler: Scheduler,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type handlers
    type_nud_lookup: TypeNUDLookup,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `tokens` reporting to `sema`, with all lookup
    /// tables registered.
    pub fn new(tokens: Vec<Token>, sema: Semantics<'a>) -> Self {
        let mut parser = Parser {
            tokens: TokenStream::new(tokens),
            sema,
            scheduler: Scheduler::default(),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);
        create_token_type_lookups(&mut parser);
        parser
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.tokens.current()
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.tokens.current().kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> Token {
        self.tokens.advance()
    }

    /// Spelling of `token` as written in the source.
    pub fn spelling(&self, token: &Token) -> String {
        self.sema.spelling(token.value).to_string()
    }

    /// An `UnexpectedToken` error at the current token.
    pub fn unexpected(&self) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: self.spelling(token),
            },
            token.span.start.clone(),
        )
    }

    /// An `UnexpectedTokenDetailed` error at the current token.
    pub fn unexpected_detailed(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.spelling(token),
                message: message.to_string(),
            },
            token.span.start.clone(),
        )
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(error.unwrap_or_else(|| self.unexpected()));
        }

        Ok(self.advance())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        !self.tokens.at_eof()
    }

    /// Pushes a captured span in front of the remaining input.
    pub fn inject(&mut self, tokens: Vec<Token>, end: Token) {
        self.tokens.inject(tokens, end);
    }

    /// Leaves the innermost injected span. Returns whether all of it was
    /// consumed.
    pub fn finish_injection(&mut self) -> bool {
        self.tokens.finish_injection()
    }

    pub fn enqueue(&mut self, action: DeferredAction) {
        self.scheduler.enqueue(action);
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Returns a reference to the type lookup table.
    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type handler for a token.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Returns the start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }
}

/// Parses a whole translation unit into `cx`.
///
/// Declarations are identified first, then their signatures, initializers
/// and bodies are parsed from the deferred queues, so a declaration may be
/// used before the point where it is written. Static data is constant folded
/// afterwards.
pub fn parse_translation_unit(cx: &mut Context, tokens: Vec<Token>) -> Result<DeclId, Error> {
    let unit = {
        let mut parser = Parser::new(tokens, Semantics::new(cx));
        let unit = identify_translation_unit(&mut parser)?;
        run_deferred(&mut parser)?;
        unit
    };

    fold_statics(cx, unit)?;
    Ok(unit)
}

/// Binds every function of `unit` and gives every foldable static data
/// declaration its value.
pub fn fold_statics(cx: &mut Context, unit: DeclId) -> Result<(), Error> {
    let statics: Vec<DeclId> = cx
        .members(unit)
        .iter()
        .copied()
        .filter(|decl| cx.ast.has_static_storage(*decl) || cx.ast.decl(*decl).is_function())
        .collect();

    let mut folded = 0;
    let mut evaluator = cx.evaluator(EvalMode::ConstantFold);
    for decl in &statics {
        if evaluator.fetch_value(*decl)?.is_some() {
            folded += 1;
        }
    }

    debug!(statics = statics.len(), folded, "folded static declarations");
    Ok(())
}

/// Parses one expression in the scope of `scope`. With `as_value`, a
/// reference result is loaded.
pub fn parse_expression_in(
    cx: &mut Context,
    scope: DeclId,
    tokens: Vec<Token>,
    as_value: bool,
) -> Result<ExprId, Error> {
    let mut parser = Parser::new(tokens, Semantics::new(cx));
    parser.sema.restore(scope);
    if parser.sema.cx.ast.decl(scope).is_scoped() {
        parser.sema.enter_declaration(scope);
    }

    let expr = parse_expr(&mut parser, BindingPower::Default)?;
    if parser.has_tokens() {
        return Err(parser.unexpected());
    }

    if as_value {
        Ok(parser.sema.require_value(expr))
    } else {
        Ok(expr)
    }
}
