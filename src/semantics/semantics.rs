//! Semantic actions invoked by the parser.
//!
//! Every action receives already analyzed operands, checks them, inserts the
//! implicit conversions they need as explicit nodes and allocates the
//! resulting node in the [`Ast`](crate::ast::ast::Ast). Types are always
//! canonical ids from the context's [`TypeFactory`].

use tracing::trace;

use crate::{
    ast::{
        ast::{DeclId, ExprId, StmtId},
        declarations::{Decl, DeclKind, DeclState, DataDecl, FunctionDecl, ParameterDecl},
        expressions::{BinaryOp, Expr, ExprKind, UnaryOp},
        statements::{Stmt, StmtKind},
    },
    context::Context,
    errors::errors::{Error, ErrorImpl},
    symbols::symbols::Symbol,
    types::types::{FloatRank, IntRank, Type, TypeId},
    Span,
};

use super::scope::ScopeStack;

pub struct Semantics<'a> {
    pub cx: &'a mut Context,
    pub scopes: ScopeStack,
}

impl<'a> Semantics<'a> {
    pub fn new(cx: &'a mut Context) -> Self {
        Semantics {
            cx,
            scopes: ScopeStack::new(),
        }
    }

    pub fn spelling(&self, symbol: Symbol) -> &str {
        self.cx.symbols.get(symbol)
    }

    pub fn type_of(&self, expr: ExprId) -> TypeId {
        self.cx.ast.expr(expr).ty
    }

    pub fn span_of(&self, expr: ExprId) -> Span {
        self.cx.ast.expr(expr).span.clone()
    }

    fn display(&self, ty: TypeId) -> String {
        self.cx.types.display(ty)
    }

    fn alloc_expr(&mut self, kind: ExprKind, ty: TypeId, span: Span) -> ExprId {
        self.cx.ast.exprs.alloc(Expr { kind, ty, span })
    }

    fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.cx.ast.stmts.alloc(Stmt { kind, span })
    }

    /// Rebuilds the scope stack for resuming work on `decl`.
    pub fn restore(&mut self, decl: DeclId) {
        self.scopes.restore(&self.cx.ast, decl);
    }

    pub fn enter_declaration(&mut self, decl: DeclId) {
        self.scopes.enter_declaration(&self.cx.ast, decl);
    }

    /* Literals */

    pub fn on_integer_literal(&mut self, spelling: &str, span: Span) -> Result<ExprId, Error> {
        let value: i64 = spelling.parse().map_err(|_| {
            Error::new(
                ErrorImpl::NumberParseError {
                    token: spelling.to_string(),
                },
                span.start.clone(),
            )
        })?;

        let rank = if IntRank::I32.contains(value) {
            IntRank::I32
        } else {
            IntRank::I64
        };
        let ty = self.cx.types.get_int(rank);
        Ok(self.alloc_expr(ExprKind::Integer(value), ty, span))
    }

    pub fn on_float_literal(&mut self, spelling: &str, span: Span) -> Result<ExprId, Error> {
        let value: f64 = spelling.parse().map_err(|_| {
            Error::new(
                ErrorImpl::NumberParseError {
                    token: spelling.to_string(),
                },
                span.start.clone(),
            )
        })?;

        let ty = self.cx.types.get_float(FloatRank::F64);
        Ok(self.alloc_expr(ExprKind::Float(value), ty, span))
    }

    pub fn on_bool_literal(&mut self, value: bool, span: Span) -> ExprId {
        let ty = self.cx.types.get_bool();
        self.alloc_expr(ExprKind::Boolean(value), ty, span)
    }

    /* Names */

    pub fn lookup(&self, name: Symbol) -> Option<DeclId> {
        self.scopes
            .lookup(&self.cx.ast, name)
            .and_then(|found| found.first().copied())
    }

    /// Whether `decl` is static data whose `auto` type still waits for its
    /// initializer.
    pub fn awaits_refinement(&self, decl: DeclId) -> bool {
        let declaration = self.cx.ast.decl(decl);
        declaration.state != DeclState::Defined
            && declaration.ty.map_or(false, |ty| self.cx.types.is_auto(ty))
            && self.cx.ast.has_static_storage(decl)
    }

    pub fn on_id_expression(&mut self, name: Symbol, span: Span) -> Result<ExprId, Error> {
        let decl = self.lookup(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnresolvedIdentifier {
                    name: self.spelling(name).to_string(),
                },
                span.start.clone(),
            )
        })?;

        self.reference_to(decl, span)
    }

    /// An id-expression naming `decl`. Variables denote their object, so the
    /// expression has reference type.
    pub fn reference_to(&mut self, decl: DeclId, span: Span) -> Result<ExprId, Error> {
        let declaration = self.cx.ast.decl(decl);
        let ty = declaration.ty.ok_or_else(|| {
            Error::new(
                ErrorImpl::IncompleteDeclaration {
                    name: self.spelling(declaration.name).to_string(),
                },
                span.start.clone(),
            )
        })?;

        let denotes_object = match &declaration.kind {
            DeclKind::Variable(_) => true,
            DeclKind::Parameter(parameter) => self.cx.ast.decl(parameter.underlying).is_variable(),
            _ => false,
        };

        let ty = if denotes_object {
            self.cx.types.get_reference(ty)
        } else {
            ty
        };
        Ok(self.alloc_expr(ExprKind::Id(decl), ty, span))
    }

    /* Conversions */

    /// Loads through a reference. Non-reference expressions are returned as is.
    pub fn require_value(&mut self, expr: ExprId) -> ExprId {
        let ty = self.type_of(expr);
        if !self.cx.types.is_reference(ty) {
            return expr;
        }

        let pointee = self.cx.types.non_reference(ty);
        let span = self.span_of(expr);
        self.alloc_expr(ExprKind::ValueConversion(expr), pointee, span)
    }

    pub fn require_bool(&mut self, expr: ExprId) -> Result<ExprId, Error> {
        let value = self.require_value(expr);
        let ty = self.type_of(value);
        let types = &self.cx.types;

        if types.is_bool(ty) {
            return Ok(value);
        }

        let convertible = types.is_arithmetic(ty)
            || types.is_auto(ty)
            || matches!(types.get(ty), Type::Function { .. });
        if !convertible {
            return Err(Error::new(
                ErrorImpl::NotConvertibleToBool {
                    type_: self.display(ty),
                },
                self.span_of(expr).start,
            ));
        }

        let bool_ = self.cx.types.get_bool();
        let span = self.span_of(value);
        Ok(self.alloc_expr(ExprKind::BoolConversion(value), bool_, span))
    }

    pub fn require_reference(&self, expr: ExprId) -> Result<ExprId, Error> {
        let ty = self.type_of(expr);
        if self.cx.types.is_reference(ty) {
            Ok(expr)
        } else {
            Err(Error::new(
                ErrorImpl::ReferenceRequired {
                    type_: self.display(ty),
                },
                self.span_of(expr).start,
            ))
        }
    }

    /// Implicitly converts `expr` to `target`.
    pub fn convert_to(&mut self, expr: ExprId, target: TypeId) -> Result<ExprId, Error> {
        if self.type_of(expr) == target {
            return Ok(expr);
        }

        let value = self.require_value(expr);
        let ty = self.type_of(value);
        let types = &self.cx.types;

        if ty == target || types.is_auto(target) {
            return Ok(value);
        }

        // An `auto` operand is only known at evaluation time, so it is
        // converted like any arithmetic value.
        let source_arithmetic = types.is_arithmetic(ty) || types.is_auto(ty);
        if source_arithmetic && types.is_arithmetic(target) {
            let span = self.span_of(value);
            return Ok(self.alloc_expr(ExprKind::NumericConversion(value), target, span));
        }

        if types.is_bool(target) {
            return self.require_bool(value);
        }

        if types.is_auto(ty) {
            return Ok(value);
        }

        Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: self.display(target),
                received: self.display(ty),
            },
            self.span_of(expr).start,
        ))
    }

    /// The type both operands of a binary operation are converted to.
    pub fn common_type(&self, left: TypeId, right: TypeId, span: &Span) -> Result<TypeId, Error> {
        if left == right {
            return Ok(left);
        }

        let types = &self.cx.types;
        if types.is_auto(left) || types.is_auto(right) {
            return Ok(types.get_auto());
        }

        match (types.get(left), types.get(right)) {
            (Type::Int(a), Type::Int(b)) => Ok(types.get_int(*a.max(b))),
            (Type::Float(a), Type::Float(b)) => Ok(types.get_float(*a.max(b))),
            (Type::Int(_), Type::Float(_)) => Ok(right),
            (Type::Float(_), Type::Int(_)) => Ok(left),
            _ => Err(Error::new(
                ErrorImpl::NoCommonType {
                    left: self.display(left),
                    right: self.display(right),
                },
                span.start.clone(),
            )),
        }
    }

    /// Value-converts both operands and converts them to their common type.
    fn unify(
        &mut self,
        lhs: ExprId,
        rhs: ExprId,
        span: &Span,
    ) -> Result<(ExprId, ExprId, TypeId), Error> {
        let lhs = self.require_value(lhs);
        let rhs = self.require_value(rhs);
        let common = self.common_type(self.type_of(lhs), self.type_of(rhs), span)?;

        let lhs = self.convert_to(lhs, common)?;
        let rhs = self.convert_to(rhs, common)?;
        Ok((lhs, rhs, common))
    }

    fn expect_operand(
        &self,
        ty: TypeId,
        accepted: bool,
        expected: &str,
        span: &Span,
    ) -> Result<(), Error> {
        if accepted || self.cx.types.is_auto(ty) {
            return Ok(());
        }

        Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: expected.to_string(),
                received: self.display(ty),
            },
            span.start.clone(),
        ))
    }

    /* Operators */

    pub fn on_binary(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        span: Span,
    ) -> Result<ExprId, Error> {
        let (lhs, rhs, common) = self.unify(lhs, rhs, &span)?;
        let types = &self.cx.types;

        let ty = if op.is_arithmetic() {
            if op == BinaryOp::Rem {
                self.expect_operand(common, types.is_integer(common), "integer", &span)?;
            } else {
                self.expect_operand(common, types.is_arithmetic(common), "arithmetic", &span)?;
            }
            common
        } else if op.is_bitwise() {
            self.expect_operand(common, types.is_integer(common), "integer", &span)?;
            common
        } else if op.is_equality() {
            let accepted = types.is_arithmetic(common) || types.is_bool(common);
            self.expect_operand(common, accepted, "arithmetic or bool", &span)?;
            types.get_bool()
        } else {
            self.expect_operand(common, types.is_arithmetic(common), "arithmetic", &span)?;
            types.get_bool()
        };

        Ok(self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, ty, span))
    }

    pub fn on_unary(&mut self, op: UnaryOp, operand: ExprId, span: Span) -> Result<ExprId, Error> {
        let operand = self.require_value(operand);
        let ty = self.type_of(operand);
        let types = &self.cx.types;

        match op {
            UnaryOp::Negate => {
                self.expect_operand(ty, types.is_arithmetic(ty), "arithmetic", &span)?
            }
            UnaryOp::BitNot => self.expect_operand(ty, types.is_integer(ty), "integer", &span)?,
        }

        Ok(self.alloc_expr(ExprKind::Unary { op, operand }, ty, span))
    }

    pub fn on_not(&mut self, operand: ExprId, span: Span) -> Result<ExprId, Error> {
        let operand = self.require_bool(operand)?;
        let ty = self.cx.types.get_bool();
        Ok(self.alloc_expr(ExprKind::Not(operand), ty, span))
    }

    pub fn on_and(&mut self, lhs: ExprId, rhs: ExprId, span: Span) -> Result<ExprId, Error> {
        let lhs = self.require_bool(lhs)?;
        let rhs = self.require_bool(rhs)?;
        let ty = self.cx.types.get_bool();
        Ok(self.alloc_expr(ExprKind::And { lhs, rhs }, ty, span))
    }

    pub fn on_or(&mut self, lhs: ExprId, rhs: ExprId, span: Span) -> Result<ExprId, Error> {
        let lhs = self.require_bool(lhs)?;
        let rhs = self.require_bool(rhs)?;
        let ty = self.cx.types.get_bool();
        Ok(self.alloc_expr(ExprKind::Or { lhs, rhs }, ty, span))
    }

    pub fn on_conditional(
        &mut self,
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
        span: Span,
    ) -> Result<ExprId, Error> {
        let cond = self.require_bool(cond)?;

        let then_ty = self.type_of(then);
        if then_ty == self.type_of(otherwise) && self.cx.types.is_reference(then_ty) {
            let kind = ExprKind::Conditional {
                cond,
                then,
                otherwise,
            };
            return Ok(self.alloc_expr(kind, then_ty, span));
        }

        let (then, otherwise, ty) = self.unify(then, otherwise, &span)?;
        let kind = ExprKind::Conditional {
            cond,
            then,
            otherwise,
        };
        Ok(self.alloc_expr(kind, ty, span))
    }

    pub fn on_assignment(
        &mut self,
        target: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<ExprId, Error> {
        let target = self.require_reference(target)?;
        let ty = self.type_of(target);
        let pointee = self.cx.types.non_reference(ty);
        let value = self.convert_to(value, pointee)?;

        Ok(self.alloc_expr(ExprKind::Assign { target, value }, ty, span))
    }

    pub fn on_call(&mut self, callee: ExprId, args: Vec<ExprId>, span: Span) -> Result<ExprId, Error> {
        let callee = self.require_value(callee);
        let callee_ty = self.type_of(callee);

        let (params, ret) = match self.cx.types.get(callee_ty) {
            Type::Function { params, ret } => (params.clone(), *ret),
            _ => {
                return Err(Error::new(
                    ErrorImpl::NotCallable {
                        type_: self.display(callee_ty),
                    },
                    span.start,
                ))
            }
        };

        if params.len() != args.len() {
            return Err(Error::new(
                ErrorImpl::ArgumentCountMismatch {
                    expected: params.len(),
                    received: args.len(),
                },
                span.start,
            ));
        }

        let args = args
            .into_iter()
            .zip(params)
            .map(|(arg, param)| self.convert_to(arg, param))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(self.alloc_expr(ExprKind::Call { callee, args }, ret, span))
    }

    /* Declarations */

    pub fn on_translation_unit(&mut self, span: Span) -> DeclId {
        let name = self.cx.symbols.intern("<translation unit>");
        let mut decl = Decl::new(name, None, span, DeclKind::TranslationUnit);
        decl.state = DeclState::Defined;
        self.cx.ast.decls.alloc(decl)
    }

    fn identify(&mut self, name: Symbol, span: Span, kind: DeclKind) -> Result<DeclId, Error> {
        let cx = self.scopes.current_declaration();
        let decl = self.cx.ast.decls.alloc(Decl::new(name, cx, span.clone(), kind));

        if !self.scopes.declare(&mut self.cx.ast, name, decl) {
            return Err(Error::new(
                ErrorImpl::Redeclaration {
                    name: self.spelling(name).to_string(),
                },
                span.start,
            ));
        }

        trace!(name = %self.spelling(name), "identified {:?}", decl);
        Ok(decl)
    }

    /// Creates a `val` or `var` declaration and declares it in the innermost
    /// scope. Its type is unknown until [`Semantics::on_data_type`].
    pub fn identify_data(
        &mut self,
        name: Symbol,
        is_variable: bool,
        span: Span,
    ) -> Result<DeclId, Error> {
        let kind = if is_variable {
            DeclKind::Variable(DataDecl::default())
        } else {
            DeclKind::Value(DataDecl::default())
        };
        self.identify(name, span, kind)
    }

    pub fn identify_function(&mut self, name: Symbol, span: Span) -> Result<DeclId, Error> {
        self.identify(name, span, DeclKind::Function(FunctionDecl::default()))
    }

    /// Finalizes the type of a data declaration. A missing type specifier
    /// gives `auto`.
    pub fn on_data_type(&mut self, decl: DeclId, ty: Option<TypeId>) {
        let ty = ty.unwrap_or(self.cx.types.get_auto());
        let declaration = self.cx.ast.decl_mut(decl);
        declaration.ty = Some(ty);
        declaration.state = DeclState::Declared;
    }

    /// Attaches the analyzed initializer of a data declaration. An `auto`
    /// declaration takes the value type of its initializer. A variable's
    /// initializer is wrapped in a `ValueInit` of the variable's object.
    pub fn on_data_initializer(
        &mut self,
        decl: DeclId,
        init: Option<ExprId>,
        span: Span,
    ) -> Result<(), Error> {
        let declaration = self.cx.ast.decl(decl);
        let name = declaration.name;
        let is_variable = declaration.is_variable();
        let declared = declaration.ty.unwrap_or(self.cx.types.get_auto());

        let init = match init {
            Some(init) => init,
            None if is_variable => {
                self.cx.ast.decl_mut(decl).state = DeclState::Defined;
                return Ok(());
            }
            None => {
                return Err(Error::new(
                    ErrorImpl::MissingInitializer {
                        name: self.spelling(name).to_string(),
                    },
                    span.start,
                ))
            }
        };

        let value = if self.cx.types.is_auto(declared) {
            let value = self.require_value(init);
            let refined = self.type_of(value);
            self.cx.ast.decl_mut(decl).ty = Some(refined);
            value
        } else {
            self.convert_to(init, declared)?
        };

        let init = if is_variable {
            let target = self.reference_to(decl, span.clone())?;
            let unit = self.cx.types.get_unit();
            self.alloc_expr(ExprKind::ValueInit { target, value }, unit, span)
        } else {
            value
        };

        let declaration = self.cx.ast.decl_mut(decl);
        declaration.set_initializer(init);
        declaration.state = DeclState::Defined;
        Ok(())
    }

    /// Declares a parameter of `function` in the innermost scope, which must
    /// be the function's own.
    pub fn on_parameter(
        &mut self,
        function: DeclId,
        name: Symbol,
        is_variable: bool,
        ty: TypeId,
        span: Span,
    ) -> Result<DeclId, Error> {
        let depth = self
            .cx
            .ast
            .enclosing(function)
            .into_iter()
            .filter(|cx| self.cx.ast.decl(*cx).is_function())
            .count() as u32;
        let index = self
            .cx
            .ast
            .decl(function)
            .as_function()
            .map(|f| f.params.len())
            .unwrap_or(0) as u32;

        let kind = if is_variable {
            DeclKind::Variable(DataDecl::default())
        } else {
            DeclKind::Value(DataDecl::default())
        };
        let mut underlying = Decl::new(name, Some(function), span.clone(), kind);
        underlying.ty = Some(ty);
        underlying.state = DeclState::Defined;
        let underlying = self.cx.ast.decls.alloc(underlying);

        let kind = DeclKind::Parameter(ParameterDecl {
            depth,
            index,
            underlying,
        });
        let parameter = self.identify(name, span, kind)?;
        let declaration = self.cx.ast.decl_mut(parameter);
        declaration.ty = Some(ty);
        declaration.state = DeclState::Defined;

        if let Some(f) = self.cx.ast.decl_mut(function).as_function_mut() {
            f.params.push(parameter);
        }
        Ok(parameter)
    }

    /// Computes the function type once all parameters are declared. A missing
    /// return type gives `void`.
    pub fn on_function_signature(&mut self, function: DeclId, ret: Option<TypeId>) {
        let ret = ret.unwrap_or(self.cx.types.get_unit());
        let params: Vec<TypeId> = self
            .cx
            .ast
            .decl(function)
            .as_function()
            .map(|f| f.params.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|param| self.cx.ast.decl(param).ty.unwrap_or(self.cx.types.get_auto()))
            .collect();
        let ty = self.cx.types.get_function(params, ret);

        let declaration = self.cx.ast.decl_mut(function);
        declaration.ty = Some(ty);
        declaration.state = DeclState::Declared;
        if let Some(f) = declaration.as_function_mut() {
            f.return_type = Some(ret);
        }
    }

    pub fn on_function_body(&mut self, function: DeclId, body: StmtId) {
        let declaration = self.cx.ast.decl_mut(function);
        if let Some(f) = declaration.as_function_mut() {
            f.body = Some(body);
        }
        declaration.state = DeclState::Defined;
    }

    /* Statements */

    pub fn on_block(&mut self, stmts: Vec<StmtId>, span: Span) -> StmtId {
        self.alloc_stmt(StmtKind::Block(stmts), span)
    }

    pub fn on_expression_statement(&mut self, expr: ExprId, span: Span) -> StmtId {
        self.alloc_stmt(StmtKind::Expression(expr), span)
    }

    pub fn on_declaration_statement(&mut self, decl: DeclId, span: Span) -> StmtId {
        self.alloc_stmt(StmtKind::Declaration(decl), span)
    }

    pub fn on_empty_statement(&mut self, span: Span) -> StmtId {
        self.alloc_stmt(StmtKind::Empty, span)
    }

    /// Converts the returned value to the return type of the innermost
    /// function.
    pub fn on_return(&mut self, value: Option<ExprId>, span: Span) -> Result<StmtId, Error> {
        let ret = self
            .scopes
            .current_declaration()
            .and_then(|decl| self.cx.ast.decl(decl).as_function())
            .and_then(|f| f.return_type)
            .unwrap_or(self.cx.types.get_unit());
        let returns_unit = self.cx.types.is_unit(ret);

        let value = match value {
            Some(value) if returns_unit => {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: self.display(ret),
                        received: self.display(self.type_of(value)),
                    },
                    span.start,
                ))
            }
            None if !returns_unit => {
                return Err(Error::new(
                    ErrorImpl::TypeMatchError {
                        expected: self.display(ret),
                        received: self.display(self.cx.types.get_unit()),
                    },
                    span.start,
                ))
            }
            Some(value) => Some(self.convert_to(value, ret)?),
            None => None,
        };

        Ok(self.alloc_stmt(StmtKind::Return(value), span))
    }

    pub fn on_if(
        &mut self,
        condition: ExprId,
        then_body: StmtId,
        else_body: Option<StmtId>,
        span: Span,
    ) -> Result<StmtId, Error> {
        let condition = self.require_bool(condition)?;
        let kind = StmtKind::If {
            condition,
            then_body,
            else_body,
        };
        Ok(self.alloc_stmt(kind, span))
    }

    pub fn on_while(&mut self, condition: ExprId, body: StmtId, span: Span) -> Result<StmtId, Error> {
        let condition = self.require_bool(condition)?;
        Ok(self.alloc_stmt(StmtKind::While { condition, body }, span))
    }
}
