use crate::{
    ast::{
        ast::ExprId,
        expressions::{BinaryOp, UnaryOp},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{deferred::resolve_pending, lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while *parser
        .get_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let (led, power) = match (
            parser.get_led_lookup().get(&token_kind),
            parser.get_bp_lookup().get(&token_kind),
        ) {
            (Some(led), Some(power)) => (*led, *power),
            _ => return Err(parser.unexpected()),
        };

        left = led(parser, left, power)?;
    }

    Ok(left)
}

fn span_between(parser: &Parser, start: ExprId, end: ExprId) -> Span {
    Span {
        start: parser.sema.span_of(start).start,
        end: parser.sema.span_of(end).end,
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let token = parser.advance();
    let spelling = parser.spelling(&token);

    match token.kind {
        TokenKind::Integer => parser.sema.on_integer_literal(&spelling, token.span),
        TokenKind::FloatLiteral => parser.sema.on_float_literal(&spelling, token.span),
        TokenKind::Identifier => {
            if let Some(decl) = parser.sema.lookup(token.value) {
                if parser.sema.awaits_refinement(decl) {
                    resolve_pending(parser, decl)?;
                }
            }
            parser.sema.on_id_expression(token.value, token.span)
        }
        TokenKind::True => Ok(parser.sema.on_bool_literal(true, token.span)),
        TokenKind::False => Ok(parser.sema.on_bool_literal(false, token.span)),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken { token: spelling },
            token.span.start,
        )),
    }
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let operator_token = parser.advance();
    let operand = parse_expr(parser, BindingPower::Unary)?;

    let span = Span {
        start: operator_token.span.start.clone(),
        end: parser.sema.span_of(operand).end,
    };

    match operator_token.kind {
        TokenKind::Dash => parser.sema.on_unary(UnaryOp::Negate, operand, span),
        TokenKind::Tilde => parser.sema.on_unary(UnaryOp::BitNot, operand, span),
        _ => parser.sema.on_not(operand, span),
    }
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprId,
    bp: BindingPower,
) -> Result<ExprId, Error> {
    let operator_token = parser.advance();
    let right = parse_expr(parser, bp)?;
    let span = span_between(parser, left, right);

    let op = match operator_token.kind {
        TokenKind::And => return parser.sema.on_and(left, right, span),
        TokenKind::Or => return parser.sema.on_or(left, right, span),
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Equals => BinaryOp::Eq,
        TokenKind::NotEquals => BinaryOp::Ne,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::LessEquals => BinaryOp::Le,
        TokenKind::Greater => BinaryOp::Gt,
        _ => BinaryOp::Ge,
    };

    parser.sema.on_binary(op, left, right, span)
}

/// `a = b` is right associative: the value extends over the rest of the
/// expression.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();
    let value = parse_expr(parser, BindingPower::Default)?;
    let span = span_between(parser, left, value);

    parser.sema.on_assignment(left, value, span)
}

pub fn parse_conditional_expr(
    parser: &mut Parser,
    cond: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();
    let then = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Colon)?;
    let otherwise = parse_expr(parser, BindingPower::Assignment)?;
    let span = span_between(parser, cond, otherwise);

    parser.sema.on_conditional(cond, then, otherwise, span)
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Each argument must be followed by `,` and another argument, or by the
/// closing parenthesis.
pub fn parse_call_expr(
    parser: &mut Parser,
    callee: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();

    let mut args = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser, BindingPower::Default)?);

            match parser.current_token_kind() {
                TokenKind::Comma => {
                    parser.advance();
                }
                TokenKind::CloseParen => break,
                _ => {
                    return Err(parser.unexpected_detailed("expected `,` or `)` after argument"))
                }
            }
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;
    let span = Span {
        start: parser.sema.span_of(callee).start,
        end: close.span.end,
    };

    parser.sema.on_call(callee, args, span)
}
