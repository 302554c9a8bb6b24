use std::fmt::Display;

use crate::ast::ast::DeclId;

use super::store::ObjectId;

/// Result of evaluating an expression. Booleans are the integers 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Indeterminate,
    Integer(i64),
    Float(f64),
    Function(DeclId),
    Reference(ObjectId),
}

impl Value {
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Value::Indeterminate)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Value::Reference(object) => Some(*object),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<DeclId> {
        match self {
            Value::Function(function) => Some(*function),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Indeterminate => write!(f, "<indeterminate>"),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{:?}", value),
            Value::Function(function) => write!(f, "<function {}>", function.0),
            Value::Reference(object) => write!(f, "<object {}>", object.0),
        }
    }
}
