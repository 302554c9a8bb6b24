use crate::{
    ast::ast::{DeclId, StmtId},
    errors::errors::Error,
    lexer::tokens::{Token, TokenKind},
    types::types::TypeId,
    Span,
};

use super::{expr::parse_expr, lookups::BindingPower, parser::Parser, types::parse_type};

fn span_from(start: &Token, end: &Token) -> Span {
    Span {
        start: start.span.start.clone(),
        end: end.span.end.clone(),
    }
}

pub fn parse_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();
    if let Some(handler) = handler {
        return handler(parser);
    }

    let start = parser.current_token().clone();
    let expr = parse_expr(parser, BindingPower::Default)?;
    let end = parser.expect(TokenKind::Semicolon)?;

    Ok(parser
        .sema
        .on_expression_statement(expr, span_from(&start, &end)))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?;
    parser.sema.scopes.enter_block();

    let mut body = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        body.push(parse_stmt(parser)?);
    }

    let end = parser.expect(TokenKind::CloseCurly)?;
    parser.sema.scopes.leave_block();

    Ok(parser.sema.on_block(body, span_from(&start, &end)))
}

/// `: type` after the name of a data declaration, if present.
pub fn parse_type_annotation(parser: &mut Parser) -> Result<Option<TypeId>, Error> {
    if parser.current_token_kind() != TokenKind::Colon {
        return Ok(None);
    }

    parser.advance();
    Ok(Some(parse_type(parser)?))
}

/// A local `var` or `val` declaration. Unlike top-level declarations these
/// are analyzed in place.
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start_token = parser.advance();
    let is_variable = start_token.kind == TokenKind::Var;

    let error = parser.unexpected_detailed("expected identifier during variable declaration");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let decl = parser
        .sema
        .identify_data(name.value, is_variable, span_from(&start_token, &name))?;

    let ty = parse_type_annotation(parser)?;
    parser.sema.on_data_type(decl, ty);

    let init = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let end = parser.expect(TokenKind::Semicolon)?;
    let span = span_from(&start_token, &end);
    parser.sema.on_data_initializer(decl, init, span.clone())?;

    Ok(parser.sema.on_declaration_statement(decl, span))
}

/// `(params) -> type` of a function. The function's scope must be the
/// innermost frame so parameters are declared into it.
pub fn parse_fn_signature(parser: &mut Parser, function: DeclId) -> Result<(), Error> {
    parser.expect(TokenKind::OpenParen)?;

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            parse_parameter(parser, function)?;

            match parser.current_token_kind() {
                TokenKind::Comma => {
                    parser.advance();
                }
                TokenKind::CloseParen => break,
                _ => {
                    return Err(parser.unexpected_detailed("expected `,` or `)` after parameter"))
                }
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let ret = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    parser.sema.on_function_signature(function, ret);
    Ok(())
}

fn parse_parameter(parser: &mut Parser, function: DeclId) -> Result<DeclId, Error> {
    let start = parser.current_token().clone();
    let is_variable = match start.kind {
        TokenKind::Var => {
            parser.advance();
            true
        }
        TokenKind::Val => {
            parser.advance();
            false
        }
        _ => false,
    };

    let error = parser.unexpected_detailed("expected parameter name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;
    parser.expect(TokenKind::Colon)?;
    let ty = parse_type(parser)?;

    parser
        .sema
        .on_parameter(function, name.value, is_variable, ty, span_from(&start, &name))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.advance();

    let value = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    let end = parser.expect(TokenKind::Semicolon)?;
    parser.sema.on_return(value, span_from(&start, &end))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.advance();
    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_stmt(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_stmt(parser)?)
    } else {
        None
    };

    let end_stmt = else_body.unwrap_or(then_body);
    let span = Span {
        start: start.span.start.clone(),
        end: parser.sema.cx.ast.stmt(end_stmt).span.end.clone(),
    };
    parser.sema.on_if(condition, then_body, else_body, span)
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.advance();
    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_stmt(parser)?;

    let span = Span {
        start: start.span.start.clone(),
        end: parser.sema.cx.ast.stmt(body).span.end.clone(),
    };
    parser.sema.on_while(condition, body, span)
}

pub fn parse_empty_stmt(parser: &mut Parser) -> Result<StmtId, Error> {
    let token = parser.expect(TokenKind::Semicolon)?;
    Ok(parser.sema.on_empty_statement(span_from(&token, &token)))
}
