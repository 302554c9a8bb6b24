//! Deferred parsing of top-level declarations.
//!
//! Top-level declarations are first only identified: their name is declared
//! and the tokens of their signature and of their initializer or body are
//! captured. The captured spans are replayed later from three queues, all
//! signatures before any initializer and all initializers before any body,
//! with the scope stack rebuilt for the declaration each time.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
    ast::ast::DeclId,
    errors::errors::Error,
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{
    expr::parse_expr,
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_block_stmt, parse_fn_signature, parse_type_annotation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredKind {
    /// `: type` of a data declaration.
    Type,
    /// Parameter list and return type of a function.
    Signature,
    /// `= expr` of a data declaration. Empty when there is none.
    Initializer,
    /// `{ ... }` of a function.
    Body,
}

/// A captured token span and the declaration it belongs to.
#[derive(Debug, Clone)]
pub struct DeferredAction {
    pub kind: DeferredKind,
    pub decl: DeclId,
    pub tokens: Vec<Token>,
    /// Token right after the span, used to place the end marker.
    pub end: Token,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    signatures: VecDeque<DeferredAction>,
    initializers: VecDeque<DeferredAction>,
    bodies: VecDeque<DeferredAction>,
}

impl Scheduler {
    pub fn enqueue(&mut self, action: DeferredAction) {
        match action.kind {
            DeferredKind::Type | DeferredKind::Signature => self.signatures.push_back(action),
            DeferredKind::Initializer => self.initializers.push_back(action),
            DeferredKind::Body => self.bodies.push_back(action),
        }
    }

    /// Next action in pass order. Each queue is drained completely before
    /// the next one is touched.
    pub fn next(&mut self) -> Option<DeferredAction> {
        self.signatures
            .pop_front()
            .or_else(|| self.initializers.pop_front())
            .or_else(|| self.bodies.pop_front())
    }

    /// Removes the queued initializer of `decl`, if it has not run yet.
    pub fn take_initializer(&mut self, decl: DeclId) -> Option<DeferredAction> {
        let index = self.initializers.iter().position(|action| action.decl == decl)?;
        self.initializers.remove(index)
    }

    pub fn len(&self) -> usize {
        self.signatures.len() + self.initializers.len() + self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects tokens up to, not including, the first of `terminators` found
/// outside of any bracket pair.
pub fn capture_until(parser: &mut Parser, terminators: &[TokenKind]) -> Result<Vec<Token>, Error> {
    let mut tokens = vec![];
    let mut open: Vec<TokenKind> = vec![];

    loop {
        let token = parser.current_token();
        if open.is_empty() && token.is_one_of_many(terminators) {
            return Ok(tokens);
        }

        match token.kind {
            TokenKind::EOF => return Err(parser.unexpected_detailed("unterminated declaration")),
            kind if kind.is_open_bracket() => open.extend(kind.closing_bracket()),
            kind if kind.is_close_bracket() => {
                if open.pop() != Some(kind) {
                    return Err(parser.unexpected());
                }
            }
            _ => {}
        }

        tokens.push(parser.advance());
    }
}

/// Collects a balanced bracket group, both brackets included.
pub fn capture_group(parser: &mut Parser) -> Result<Vec<Token>, Error> {
    let first = parser.current_token().kind;
    let mut open: Vec<TokenKind> = match first.closing_bracket() {
        Some(close) => vec![close],
        None => return Err(parser.unexpected()),
    };
    let mut tokens = vec![parser.advance()];

    while !open.is_empty() {
        match parser.current_token_kind() {
            TokenKind::EOF => return Err(parser.unexpected_detailed("unbalanced brackets")),
            kind if kind.is_open_bracket() => open.extend(kind.closing_bracket()),
            kind if kind.is_close_bracket() => {
                if open.pop() != Some(kind) {
                    return Err(parser.unexpected());
                }
            }
            _ => {}
        }

        tokens.push(parser.advance());
    }

    Ok(tokens)
}

/// First pass: declares every top-level declaration of the translation unit
/// and queues the rest of its work.
pub fn identify_translation_unit(parser: &mut Parser) -> Result<DeclId, Error> {
    let start = parser.get_position();
    let unit = parser.sema.on_translation_unit(Span {
        start: start.clone(),
        end: start,
    });

    parser.sema.enter_declaration(unit);
    while parser.has_tokens() {
        identify_declaration(parser)?;
    }
    parser.sema.scopes.leave_declaration(unit);

    let end = parser.get_position();
    parser.sema.cx.ast.decl_mut(unit).span.end = end;

    debug!(
        members = parser.sema.cx.ast.decl(unit).scope.as_ref().map_or(0, |s| s.members().len()),
        deferred = parser.scheduler().len(),
        "identified translation unit"
    );
    Ok(unit)
}

fn identify_declaration(parser: &mut Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::Var | TokenKind::Val => identify_data(parser),
        TokenKind::Func => identify_function(parser),
        _ => Err(parser.unexpected_detailed("expected `var`, `val` or `func`")),
    }
}

fn identify_data(parser: &mut Parser) -> Result<(), Error> {
    let keyword = parser.advance();
    let error = parser.unexpected_detailed("expected identifier during variable declaration");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let span = Span {
        start: keyword.span.start.clone(),
        end: name.span.end.clone(),
    };
    let decl = parser
        .sema
        .identify_data(name.value, keyword.kind == TokenKind::Var, span)?;

    let signature = capture_until(parser, &[TokenKind::Assignment, TokenKind::Semicolon])?;
    let end = parser.current_token().clone();
    parser.enqueue(DeferredAction {
        kind: DeferredKind::Type,
        decl,
        tokens: signature,
        end,
    });

    let initializer = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        if parser.current_token_kind() == TokenKind::Semicolon {
            return Err(parser.unexpected_detailed("expected initializer"));
        }
        capture_until(parser, &[TokenKind::Semicolon])?
    } else {
        vec![]
    };

    let end = parser.expect(TokenKind::Semicolon)?;
    parser.enqueue(DeferredAction {
        kind: DeferredKind::Initializer,
        decl,
        tokens: initializer,
        end,
    });

    Ok(())
}

fn identify_function(parser: &mut Parser) -> Result<(), Error> {
    let keyword = parser.advance();
    let error = parser.unexpected_detailed("expected function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let span = Span {
        start: keyword.span.start.clone(),
        end: name.span.end.clone(),
    };
    let decl = parser.sema.identify_function(name.value, span)?;

    let signature = capture_until(parser, &[TokenKind::OpenCurly])?;
    let end = parser.current_token().clone();
    parser.enqueue(DeferredAction {
        kind: DeferredKind::Signature,
        decl,
        tokens: signature,
        end,
    });

    let body = capture_group(parser)?;
    let end = match body.last() {
        Some(close) => close.clone(),
        None => return Err(parser.unexpected()),
    };
    parser.enqueue(DeferredAction {
        kind: DeferredKind::Body,
        decl,
        tokens: body,
        end,
    });

    Ok(())
}

/// Replays every queued action in pass order.
pub fn run_deferred(parser: &mut Parser) -> Result<(), Error> {
    let mut pass = None;

    while let Some(action) = parser.scheduler_mut().next() {
        if pass != Some(action.kind) {
            debug!(pass = ?action.kind, remaining = parser.scheduler().len() + 1, "starting pass");
            pass = Some(action.kind);
        }
        replay(parser, action)?;
    }

    Ok(())
}

/// Analyzes the initializer of `decl` ahead of its turn so that a use of an
/// `auto` declaration sees the refined type. The scope stack of the
/// interrupted replay is set aside and put back afterwards. A declaration
/// whose initializer is already being analyzed stays `auto`.
pub fn resolve_pending(parser: &mut Parser, decl: DeclId) -> Result<(), Error> {
    let Some(action) = parser.scheduler_mut().take_initializer(decl) else {
        return Ok(());
    };
    trace!(decl = ?decl, "resolving initializer on demand");

    let scopes = std::mem::take(&mut parser.sema.scopes);
    let result = replay(parser, action);
    parser.sema.scopes = scopes;
    result
}

/// Parses a captured span in the scope of its declaration. The span must be
/// consumed completely.
fn replay(parser: &mut Parser, action: DeferredAction) -> Result<(), Error> {
    trace!(kind = ?action.kind, decl = ?action.decl, tokens = action.tokens.len(), "replaying");

    let decl = action.decl;
    parser.sema.restore(decl);
    parser.inject(action.tokens, action.end);

    let mut result = match action.kind {
        DeferredKind::Type => replay_type(parser, decl),
        DeferredKind::Signature => replay_signature(parser, decl),
        DeferredKind::Initializer => replay_initializer(parser, decl),
        DeferredKind::Body => replay_body(parser, decl),
    };
    if result.is_ok() && parser.has_tokens() {
        result = Err(parser.unexpected());
    }

    parser.finish_injection();
    match result {
        Ok(()) => parser.sema.scopes.empty(),
        Err(_) => parser.sema.scopes.reset(),
    }

    result
}

fn replay_type(parser: &mut Parser, decl: DeclId) -> Result<(), Error> {
    let ty = parse_type_annotation(parser)?;
    parser.sema.on_data_type(decl, ty);
    Ok(())
}

fn replay_signature(parser: &mut Parser, decl: DeclId) -> Result<(), Error> {
    parser.sema.enter_declaration(decl);
    parse_fn_signature(parser, decl)?;
    parser.sema.scopes.leave_declaration(decl);
    Ok(())
}

fn replay_initializer(parser: &mut Parser, decl: DeclId) -> Result<(), Error> {
    let span = parser.sema.cx.ast.decl(decl).span.clone();
    let init = if parser.has_tokens() {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.sema.on_data_initializer(decl, init, span)
}

fn replay_body(parser: &mut Parser, decl: DeclId) -> Result<(), Error> {
    parser.sema.enter_declaration(decl);
    let body = parse_block_stmt(parser)?;
    parser.sema.scopes.leave_declaration(decl);
    parser.sema.on_function_body(decl, body);
    Ok(())
}
