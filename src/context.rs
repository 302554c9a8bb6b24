//! Compilation context and the crate's entry points.

use tracing::{debug, info};

use crate::{
    ast::ast::{Ast, DeclId, ExprId},
    errors::errors::Error,
    eval::{
        evaluator::{EvalMode, Evaluator},
        store::StaticStore,
    },
    lexer::lexer::tokenize,
    parser::parser::{parse_expression_in, parse_translation_unit},
    symbols::symbols::SymbolTable,
    types::types::TypeFactory,
};

/// Owns everything one compilation produces. All cross references are
/// indices into these tables.
#[derive(Debug, Default)]
pub struct Context {
    pub symbols: SymbolTable,
    pub types: TypeFactory,
    pub ast: Ast,
    pub store: StaticStore,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluator(&mut self, mode: EvalMode) -> Evaluator<'_> {
        Evaluator::new(
            &self.ast,
            &self.types,
            &self.symbols,
            &mut self.store,
            mode,
        )
    }

    pub fn name(&self, decl: DeclId) -> &str {
        self.symbols.get(self.ast.decl(decl).name)
    }

    /// Member of the scoped declaration `scope` spelled `name`.
    pub fn find_member(&self, scope: DeclId, name: &str) -> Option<DeclId> {
        let symbol = self.symbols.find(name)?;
        self.ast
            .decl(scope)
            .scope
            .as_ref()
            .and_then(|record| record.lookup(symbol).first().copied())
    }

    /// Members of the scoped declaration `scope`, in declaration order.
    pub fn members(&self, scope: DeclId) -> &[DeclId] {
        self.ast
            .decl(scope)
            .scope
            .as_ref()
            .map(|record| record.members())
            .unwrap_or(&[])
    }
}

/// Tokenizes and parses `source` as one translation unit.
pub fn compile(source: String, file: Option<String>) -> Result<(Context, DeclId), Error> {
    let mut cx = Context::new();

    let start = std::time::Instant::now();
    let tokens = tokenize(source, file, &mut cx.symbols)?;
    debug!(tokens = tokens.len(), "tokenized in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let unit = parse_translation_unit(&mut cx, tokens)?;
    info!(
        decls = cx.ast.decls.len(),
        exprs = cx.ast.exprs.len(),
        types = cx.types.len(),
        "parsed in {:?}",
        start.elapsed()
    );

    Ok((cx, unit))
}

/// Parses one expression in the scope of `scope`, after compilation.
pub fn parse_expression(cx: &mut Context, scope: DeclId, source: &str) -> Result<ExprId, Error> {
    let tokens = tokenize(
        source.to_string(),
        Some(String::from("<expression>")),
        &mut cx.symbols,
    )?;
    parse_expression_in(cx, scope, tokens, false)
}

/// Like [`parse_expression`], with references loaded to values.
pub fn parse_value_expression(
    cx: &mut Context,
    scope: DeclId,
    source: &str,
) -> Result<ExprId, Error> {
    let tokens = tokenize(
        source.to_string(),
        Some(String::from("<expression>")),
        &mut cx.symbols,
    )?;
    parse_expression_in(cx, scope, tokens, true)
}
