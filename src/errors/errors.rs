use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnresolvedIdentifier { .. } => "UnresolvedIdentifier",
            ErrorImpl::Redeclaration { .. } => "Redeclaration",
            ErrorImpl::IncompleteDeclaration { .. } => "IncompleteDeclaration",
            ErrorImpl::ReferenceRequired { .. } => "ReferenceRequired",
            ErrorImpl::NotConvertibleToBool { .. } => "NotConvertibleToBool",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::NoCommonType { .. } => "NoCommonType",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::MissingInitializer { .. } => "MissingInitializer",
            ErrorImpl::IndeterminateRead => "IndeterminateRead",
            ErrorImpl::NonConstantGlobal { .. } => "NonConstantGlobal",
            ErrorImpl::NonConstantExpression { .. } => "NonConstantExpression",
            ErrorImpl::AutomaticStorage { .. } => "AutomaticStorage",
            ErrorImpl::CyclicInitialization { .. } => "CyclicInitialization",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::IntegerOverflow => "IntegerOverflow",
            ErrorImpl::OperandMismatch { .. } => "OperandMismatch",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnresolvedIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", name))
            }
            ErrorImpl::Redeclaration { name } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope",
                name
            )),
            ErrorImpl::IncompleteDeclaration { name } => ErrorTip::Suggestion(format!(
                "`{}` is used before its type is known",
                name
            )),
            ErrorImpl::ReferenceRequired { type_ } => ErrorTip::Suggestion(format!(
                "Expected a reference, received a value of type `{}`",
                type_
            )),
            ErrorImpl::NotConvertibleToBool { type_ } => ErrorTip::Suggestion(format!(
                "A value of type `{}` cannot be used as a condition",
                type_
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::NoCommonType { left, right } => ErrorTip::Suggestion(format!(
                "Operands of type `{}` and `{}` cannot be combined",
                left, right
            )),
            ErrorImpl::NotCallable { type_ } => {
                ErrorTip::Suggestion(format!("A value of type `{}` cannot be called", type_))
            }
            ErrorImpl::ArgumentCountMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected {} arguments, received {}",
                    expected, received
                ))
            }
            ErrorImpl::MissingInitializer { name } => ErrorTip::Suggestion(format!(
                "Constant `{}` must be given a value",
                name
            )),
            ErrorImpl::IndeterminateRead => ErrorTip::Suggestion(String::from(
                "The object is read before it was given a value",
            )),
            ErrorImpl::NonConstantGlobal { name } => ErrorTip::Suggestion(format!(
                "Variable `{}` may be modified and cannot be read in a constant expression",
                name
            )),
            ErrorImpl::NonConstantExpression { reason } => ErrorTip::Suggestion(format!(
                "Expression is not constant: {}",
                reason
            )),
            ErrorImpl::AutomaticStorage { name } => ErrorTip::Suggestion(format!(
                "`{}` has automatic storage and cannot be evaluated here",
                name
            )),
            ErrorImpl::CyclicInitialization { name } => ErrorTip::Suggestion(format!(
                "The initializer of `{}` depends on itself",
                name
            )),
            ErrorImpl::DivisionByZero => ErrorTip::Suggestion(String::from(
                "Division by zero in a constant expression",
            )),
            ErrorImpl::IntegerOverflow => ErrorTip::Suggestion(String::from(
                "The result does not fit in its integer type",
            )),
            ErrorImpl::OperandMismatch { operation, operands } => ErrorTip::Suggestion(format!(
                "`{}` cannot be evaluated for {}, is an operand of `auto` type?",
                operation, operands
            )),
        }
    }

    /// Whether the failure only means "this expression is not a constant".
    pub fn is_non_constant(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::NonConstantGlobal { .. }
                | ErrorImpl::NonConstantExpression { .. }
                | ErrorImpl::AutomaticStorage { .. }
        )
    }

    /// Whether the failure was raised by the constant evaluator.
    pub fn is_evaluation_error(&self) -> bool {
        self.is_non_constant()
            || matches!(
                self.internal_error,
                ErrorImpl::IndeterminateRead
                    | ErrorImpl::CyclicInitialization { .. }
                    | ErrorImpl::DivisionByZero
                    | ErrorImpl::IntegerOverflow
                    | ErrorImpl::OperandMismatch { .. }
            )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.internal_error, self.position)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{name:?} not declared")]
    UnresolvedIdentifier { name: String },
    #[error("{name:?} already declared in this scope")]
    Redeclaration { name: String },
    #[error("{name:?} used before its type is known")]
    IncompleteDeclaration { name: String },
    #[error("reference required, found {type_}")]
    ReferenceRequired { type_: String },
    #[error("{type_} is not convertible to bool")]
    NotConvertibleToBool { type_: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("no common type for {left} and {right}")]
    NoCommonType { left: String, right: String },
    #[error("{type_} is not callable")]
    NotCallable { type_: String },
    #[error("wrong number of arguments: expected {expected:?}, received {received:?}")]
    ArgumentCountMismatch { expected: usize, received: usize },
    #[error("{name:?} requires an initializer")]
    MissingInitializer { name: String },
    #[error("read of an indeterminate value")]
    IndeterminateRead,
    #[error("read of non-constant global {name:?}")]
    NonConstantGlobal { name: String },
    #[error("non-constant expression: {reason}")]
    NonConstantExpression { reason: String },
    #[error("{name:?} has automatic storage")]
    AutomaticStorage { name: String },
    #[error("cyclic initialization of {name:?}")]
    CyclicInitialization { name: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("cannot evaluate {operation} of {operands}")]
    OperandMismatch { operation: String, operands: String },
}
