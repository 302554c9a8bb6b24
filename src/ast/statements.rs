use crate::Span;

use super::ast::{DeclId, ExprId, StmtId};

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Expression(ExprId),
    Declaration(DeclId),
    Return(Option<ExprId>),
    If {
        condition: ExprId,
        then_body: StmtId,
        else_body: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    Empty,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}
