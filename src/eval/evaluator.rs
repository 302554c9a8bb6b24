use tracing::trace;

use crate::{
    ast::{
        ast::{Ast, DeclId, ExprId},
        declarations::DeclKind,
        expressions::{BinaryOp, ExprKind, UnaryOp},
    },
    errors::errors::{Error, ErrorImpl},
    symbols::symbols::SymbolTable,
    types::types::{FloatRank, Type, TypeFactory, TypeId},
    Position,
};

use super::{
    store::{Creator, ObjectId, StaticStore},
    value::Value,
};

/// How strictly the evaluator treats expressions that are not constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Best effort: any failure leaves the expression unevaluated.
    ConstantFold,
    /// Every failure is an error.
    ConstantEval,
    /// Like `ConstantEval`, except that non-constant operations only mean
    /// "not a constant".
    PotentialEval,
}

/// Tree-walking evaluator over a resolved [`Ast`]. Its only state is the
/// static store it borrows.
pub struct Evaluator<'a> {
    ast: &'a Ast,
    types: &'a TypeFactory,
    symbols: &'a SymbolTable,
    store: &'a mut StaticStore,
    mode: EvalMode,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        ast: &'a Ast,
        types: &'a TypeFactory,
        symbols: &'a SymbolTable,
        store: &'a mut StaticStore,
        mode: EvalMode,
    ) -> Self {
        Evaluator {
            ast,
            types,
            symbols,
            store,
            mode,
        }
    }

    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    /// Evaluates `expr`. `Ok(None)` means the expression is not a constant and
    /// the mode tolerates that.
    pub fn evaluate(&mut self, expr: ExprId) -> Result<Option<Value>, Error> {
        let result = self.eval(expr);
        self.filter(result)
    }

    /// Value bound to `decl`, elaborating it on first use.
    pub fn fetch_value(&mut self, decl: DeclId) -> Result<Option<Value>, Error> {
        let position = self.ast.decl(decl).span.start.clone();
        let result = self.fetch(decl, &position);
        self.filter(result)
    }

    /// Like [`Evaluator::fetch_value`], but reads through the object of a
    /// variable under the usual constant-read rules.
    pub fn read(&mut self, decl: DeclId) -> Result<Option<Value>, Error> {
        let position = self.ast.decl(decl).span.start.clone();
        let result = self.fetch(decl, &position).and_then(|value| match value {
            Value::Reference(object) => self.load(object, &position),
            value => Ok(value),
        });
        self.filter(result)
    }

    fn filter(&self, result: Result<Value, Error>) -> Result<Option<Value>, Error> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if self.tolerates(&error) => {
                trace!(mode = ?self.mode, "not a constant: {}", error);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn tolerates(&self, error: &Error) -> bool {
        match self.mode {
            EvalMode::ConstantFold => error.is_evaluation_error(),
            EvalMode::PotentialEval => error.is_non_constant(),
            EvalMode::ConstantEval => false,
        }
    }

    fn name(&self, decl: DeclId) -> String {
        self.symbols.get(self.ast.decl(decl).name).to_string()
    }

    fn fetch(&mut self, decl: DeclId, position: &Position) -> Result<Value, Error> {
        if let Some(value) = self.store.get_if(decl) {
            return Ok(value);
        }

        self.elaborate(decl, position)
    }

    fn elaborate(&mut self, decl: DeclId, position: &Position) -> Result<Value, Error> {
        let ast = self.ast;
        match &ast.decl(decl).kind {
            DeclKind::Function(_) => {
                let value = Value::Function(decl);
                self.store.bind(decl, value);
                Ok(value)
            }
            DeclKind::Value(_) | DeclKind::Variable(_) if ast.has_static_storage(decl) => {
                if !self.store.begin_elaboration(decl) {
                    return Err(Error::new(
                        ErrorImpl::CyclicInitialization {
                            name: self.name(decl),
                        },
                        position.clone(),
                    ));
                }

                let result = self.elaborate_static(decl);
                self.store.end_elaboration(decl);
                result
            }
            DeclKind::Value(_) | DeclKind::Variable(_) | DeclKind::Parameter(_) => Err(Error::new(
                ErrorImpl::AutomaticStorage {
                    name: self.name(decl),
                },
                position.clone(),
            )),
            DeclKind::TranslationUnit => Err(Error::new(
                ErrorImpl::NonConstantExpression {
                    reason: String::from("a translation unit has no value"),
                },
                position.clone(),
            )),
        }
    }

    fn elaborate_static(&mut self, decl: DeclId) -> Result<Value, Error> {
        let ast = self.ast;
        let declaration = ast.decl(decl);
        trace!(name = %self.name(decl), "elaborating");

        if declaration.is_variable() {
            let ty = declaration.ty.unwrap_or(self.types.get_auto());
            let object = self.store.create(decl, ty);
            // The initializer is a `ValueInit` targeting the new object. A
            // failed initialization leaves the variable unbound.
            if let Some(init) = declaration.initializer() {
                if let Err(error) = self.eval(init) {
                    self.store.unbind(decl);
                    return Err(error);
                }
            }
            return Ok(Value::Reference(object));
        }

        let init = declaration.initializer().ok_or_else(|| {
            Error::new(
                ErrorImpl::MissingInitializer {
                    name: self.name(decl),
                },
                declaration.span.start.clone(),
            )
        })?;
        let value = self.eval(init)?;
        self.store.bind(decl, value);
        Ok(value)
    }

    /// Loads the value of `object` for a constant read.
    fn load(&self, object: ObjectId, position: &Position) -> Result<Value, Error> {
        let cell = self.store.object(object);

        if cell.is_indeterminate() {
            return Err(Error::new(ErrorImpl::IndeterminateRead, position.clone()));
        }

        if let Creator::Decl(creator) = cell.creator {
            let is_static_variable =
                self.ast.decl(creator).is_variable() && self.ast.has_static_storage(creator);
            if is_static_variable && !cell.is_constant_written() {
                return Err(Error::new(
                    ErrorImpl::NonConstantGlobal {
                        name: self.name(creator),
                    },
                    position.clone(),
                ));
            }
        }

        Ok(cell.value())
    }

    fn mismatch(operation: &str, operands: String, position: &Position) -> Error {
        Error::new(
            ErrorImpl::OperandMismatch {
                operation: operation.to_string(),
                operands,
            },
            position.clone(),
        )
    }

    fn eval_reference(&mut self, expr: ExprId) -> Result<ObjectId, Error> {
        let position = self.ast.expr(expr).span.start.clone();
        match self.eval(expr)? {
            Value::Reference(object) => Ok(object),
            other => Err(Self::mismatch("object access", other.to_string(), &position)),
        }
    }

    fn eval_integer(&mut self, expr: ExprId) -> Result<i64, Error> {
        let position = self.ast.expr(expr).span.start.clone();
        match self.eval(expr)? {
            Value::Integer(value) => Ok(value),
            Value::Indeterminate => Err(Error::new(ErrorImpl::IndeterminateRead, position)),
            other => Err(Self::mismatch("condition", other.to_string(), &position)),
        }
    }

    fn eval(&mut self, expr: ExprId) -> Result<Value, Error> {
        let ast = self.ast;
        let node = ast.expr(expr);
        let position = &node.span.start;

        match &node.kind {
            ExprKind::Boolean(value) => Ok(Value::Integer(*value as i64)),
            ExprKind::Integer(value) => Ok(Value::Integer(*value)),
            ExprKind::Float(value) => Ok(Value::Float(*value)),
            ExprKind::Id(decl) => self.fetch(*decl, position),
            ExprKind::Call { .. } => Err(Error::new(
                ErrorImpl::NonConstantExpression {
                    reason: String::from("function calls are not evaluated at compile time"),
                },
                position.clone(),
            )),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(*operand)?;
                self.unary(*op, value, node.ty, position)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.eval(*lhs)?;
                let right = self.eval(*rhs)?;
                self.binary(*op, left, right, node.ty, position)
            }
            ExprKind::And { lhs, rhs } => {
                if self.eval_integer(*lhs)? == 0 {
                    return Ok(Value::Integer(0));
                }
                self.eval(*rhs)
            }
            ExprKind::Or { lhs, rhs } => {
                if self.eval_integer(*lhs)? != 0 {
                    return Ok(Value::Integer(1));
                }
                self.eval(*rhs)
            }
            ExprKind::Not(operand) => {
                let value = self.eval_integer(*operand)?;
                Ok(Value::Integer((value == 0) as i64))
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_integer(*cond)? != 0 {
                    self.eval(*then)
                } else {
                    self.eval(*otherwise)
                }
            }
            ExprKind::Assign { target, value } => {
                let object = self.eval_reference(*target)?;
                let value = self.eval(*value)?;
                let cell = self.store.object_mut(object);
                if cell.is_indeterminate() {
                    cell.initialize(value);
                } else {
                    cell.store(value);
                }
                cell.mark_constant_written();
                Ok(Value::Reference(object))
            }
            ExprKind::ValueConversion(operand) => {
                let object = self.eval_reference(*operand)?;
                self.load(object, position)
            }
            ExprKind::BoolConversion(operand) => match self.eval(*operand)? {
                Value::Integer(value) => Ok(Value::Integer((value != 0) as i64)),
                Value::Float(value) => Ok(Value::Integer((value != 0.0) as i64)),
                Value::Function(_) | Value::Reference(_) => Ok(Value::Integer(1)),
                Value::Indeterminate => {
                    Err(Error::new(ErrorImpl::IndeterminateRead, position.clone()))
                }
            },
            ExprKind::NumericConversion(operand) => {
                let value = self.eval(*operand)?;
                self.convert(value, node.ty, position)
            }
            ExprKind::ValueInit { target, value } => {
                let object = self.eval_reference(*target)?;
                let value = self.eval(*value)?;
                // The initializer assigned to its own object.
                let cell = self.store.object(object);
                if !cell.is_indeterminate() {
                    let name = match cell.creator {
                        Creator::Decl(creator) => self.name(creator),
                        Creator::Expr(_) => String::from("<temporary>"),
                    };
                    return Err(Error::new(
                        ErrorImpl::CyclicInitialization { name },
                        position.clone(),
                    ));
                }
                self.store.object_mut(object).initialize(value);
                Ok(Value::Indeterminate)
            }
        }
    }

    fn fit(&self, value: i64, ty: TypeId, position: &Position) -> Result<Value, Error> {
        match self.types.get(ty) {
            Type::Int(rank) if !rank.contains(value) => {
                Err(Error::new(ErrorImpl::IntegerOverflow, position.clone()))
            }
            _ => Ok(Value::Integer(value)),
        }
    }

    fn round(&self, value: f64, ty: TypeId) -> Value {
        match self.types.get(ty) {
            Type::Float(FloatRank::F32) => Value::Float(value as f32 as f64),
            _ => Value::Float(value),
        }
    }

    fn convert(&self, value: Value, target: TypeId, position: &Position) -> Result<Value, Error> {
        match (self.types.get(target), value) {
            (Type::Int(_), Value::Integer(value)) => self.fit(value, target, position),
            (Type::Int(_), Value::Float(value)) => {
                if !value.is_finite() || value.trunc() < i64::MIN as f64 || value.trunc() > i64::MAX as f64 {
                    return Err(Error::new(ErrorImpl::IntegerOverflow, position.clone()));
                }
                self.fit(value.trunc() as i64, target, position)
            }
            (Type::Float(_), Value::Integer(value)) => Ok(self.round(value as f64, target)),
            (Type::Float(_), Value::Float(value)) => Ok(self.round(value, target)),
            (_, Value::Indeterminate) => {
                Err(Error::new(ErrorImpl::IndeterminateRead, position.clone()))
            }
            (Type::Int(_) | Type::Float(_), value) => Err(Self::mismatch(
                "conversion",
                format!("{} to {}", value, self.types.display(target)),
                position,
            )),
            (_, value) => Ok(value),
        }
    }

    fn unary(
        &self,
        op: UnaryOp,
        value: Value,
        ty: TypeId,
        position: &Position,
    ) -> Result<Value, Error> {
        match (op, value) {
            (UnaryOp::Negate, Value::Integer(value)) => match value.checked_neg() {
                Some(result) => self.fit(result, ty, position),
                None => Err(Error::new(ErrorImpl::IntegerOverflow, position.clone())),
            },
            (UnaryOp::Negate, Value::Float(value)) => Ok(self.round(-value, ty)),
            (UnaryOp::BitNot, Value::Integer(value)) => self.fit(!value, ty, position),
            (_, Value::Indeterminate) => {
                Err(Error::new(ErrorImpl::IndeterminateRead, position.clone()))
            }
            (op, value) => Err(Self::mismatch(
                &format!("{:?}", op),
                value.to_string(),
                position,
            )),
        }
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: Value,
        right: Value,
        ty: TypeId,
        position: &Position,
    ) -> Result<Value, Error> {
        match (left, right) {
            (Value::Integer(left), Value::Integer(right)) => {
                self.integer_binary(op, left, right, ty, position)
            }
            (Value::Float(left), Value::Float(right)) => {
                self.float_binary(op, left, right, ty, position)
            }
            // Operands of `auto` type are only known here: mixed arithmetic
            // is carried out in floating point.
            (Value::Integer(left), Value::Float(right)) => {
                self.float_binary(op, left as f64, right, ty, position)
            }
            (Value::Float(left), Value::Integer(right)) => {
                self.float_binary(op, left, right as f64, ty, position)
            }
            (Value::Indeterminate, _) | (_, Value::Indeterminate) => {
                Err(Error::new(ErrorImpl::IndeterminateRead, position.clone()))
            }
            (left, right) => Err(Self::mismatch(
                &op.to_string(),
                format!("{} and {}", left, right),
                position,
            )),
        }
    }

    fn integer_binary(
        &self,
        op: BinaryOp,
        left: i64,
        right: i64,
        ty: TypeId,
        position: &Position,
    ) -> Result<Value, Error> {
        let overflow = || Error::new(ErrorImpl::IntegerOverflow, position.clone());
        let result = match op {
            BinaryOp::Add => left.checked_add(right).ok_or_else(overflow)?,
            BinaryOp::Sub => left.checked_sub(right).ok_or_else(overflow)?,
            BinaryOp::Mul => left.checked_mul(right).ok_or_else(overflow)?,
            BinaryOp::Div | BinaryOp::Rem if right == 0 => {
                return Err(Error::new(ErrorImpl::DivisionByZero, position.clone()))
            }
            BinaryOp::Div => left.checked_div(right).ok_or_else(overflow)?,
            BinaryOp::Rem => left.checked_rem(right).ok_or_else(overflow)?,
            BinaryOp::BitAnd => left & right,
            BinaryOp::BitOr => left | right,
            BinaryOp::BitXor => left ^ right,
            BinaryOp::Eq => return Ok(Value::Integer((left == right) as i64)),
            BinaryOp::Ne => return Ok(Value::Integer((left != right) as i64)),
            BinaryOp::Lt => return Ok(Value::Integer((left < right) as i64)),
            BinaryOp::Le => return Ok(Value::Integer((left <= right) as i64)),
            BinaryOp::Gt => return Ok(Value::Integer((left > right) as i64)),
            BinaryOp::Ge => return Ok(Value::Integer((left >= right) as i64)),
        };

        self.fit(result, ty, position)
    }

    fn float_binary(
        &self,
        op: BinaryOp,
        left: f64,
        right: f64,
        ty: TypeId,
        position: &Position,
    ) -> Result<Value, Error> {
        let value = match op {
            BinaryOp::Add => self.round(left + right, ty),
            BinaryOp::Sub => self.round(left - right, ty),
            BinaryOp::Mul => self.round(left * right, ty),
            BinaryOp::Div => self.round(left / right, ty),
            BinaryOp::Rem => self.round(left % right, ty),
            BinaryOp::Eq => Value::Integer((left == right) as i64),
            BinaryOp::Ne => Value::Integer((left != right) as i64),
            BinaryOp::Lt => Value::Integer((left < right) as i64),
            BinaryOp::Le => Value::Integer((left <= right) as i64),
            BinaryOp::Gt => Value::Integer((left > right) as i64),
            BinaryOp::Ge => Value::Integer((left >= right) as i64),
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                return Err(Self::mismatch(
                    &op.to_string(),
                    format!("{} and {}", left, right),
                    position,
                ))
            }
        };
        Ok(value)
    }
}
