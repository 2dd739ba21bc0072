//! Evaluation errors and their constructors.
//!
//! Every runtime failure goes through a factory function here, so the
//! wording of each message lives in exactly one place.

use thiserror::Error;

use crate::value::Value;

/// Result of evaluating an expression or part of one.
pub type EvalResult = Result<Value, EvalError>;

/// Runtime evaluation error.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("operator {op:?} cannot combine {left} and {right}")]
    BinaryTypeMismatch {
        op: String,
        left: String,
        right: String,
    },
    #[error("operator {op:?} cannot be applied to {operand}")]
    UnaryTypeMismatch { op: String, operand: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },
    #[error("values of {left} and {right} have no ordering")]
    NotOrderable { left: String, right: String },
    #[error("no method {method:?} on {type_name} accepts these arguments")]
    NoSuchMethod { method: String, type_name: String },
    #[error("no constructor of {type_name} accepts these arguments")]
    NoSuchConstructor { type_name: String },
    #[error("no member {name:?} on {type_name}")]
    NoSuchMember { name: String, type_name: String },
    #[error("cannot cast {from} to {to}")]
    BadCast { from: String, to: String },
    #[error("variable {name:?} has no bound value")]
    UnboundVariable { name: String },
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("cannot index a value of {type_name}")]
    NotIndexable { type_name: String },
    #[error("index must be an integer, not {type_name}")]
    NonIntegerIndex { type_name: String },
    #[error("invalid match pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("null value where {context} is required")]
    NullValue { context: String },
    #[error("negative array dimension {size}")]
    NegativeArraySize { size: i64 },
    #[error("{message}")]
    Custom { message: String },
}

impl EvalError {
    /// An error with a free-form message. Prefer the factory functions
    /// when a structured variant exists.
    pub fn new(message: impl Into<String>) -> Self {
        EvalError::Custom {
            message: message.into(),
        }
    }
}

// Operator errors

#[cold]
pub fn binary_type_mismatch(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::BinaryTypeMismatch {
        op: op.to_owned(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

#[cold]
pub fn unary_type_mismatch(op: &str, operand: &Value) -> EvalError {
    EvalError::UnaryTypeMismatch {
        op: op.to_owned(),
        operand: operand.type_name(),
    }
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::DivisionByZero
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::IntegerOverflow {
        operation: operation.to_owned(),
    }
}

#[cold]
pub fn not_orderable(left: &Value, right: &Value) -> EvalError {
    EvalError::NotOrderable {
        left: left.type_name(),
        right: right.type_name(),
    }
}

// Member access errors

#[cold]
pub fn no_such_method(method: &str, type_name: &str) -> EvalError {
    EvalError::NoSuchMethod {
        method: method.to_owned(),
        type_name: type_name.to_owned(),
    }
}

#[cold]
pub fn no_such_constructor(type_name: &str) -> EvalError {
    EvalError::NoSuchConstructor {
        type_name: type_name.to_owned(),
    }
}

#[cold]
pub fn no_such_member(name: &str, type_name: &str) -> EvalError {
    EvalError::NoSuchMember {
        name: name.to_owned(),
        type_name: type_name.to_owned(),
    }
}

// Variable, cast, and index errors

#[cold]
pub fn unbound_variable(name: &str) -> EvalError {
    EvalError::UnboundVariable {
        name: name.to_owned(),
    }
}

#[cold]
pub fn bad_cast(from: &Value, to: &str) -> EvalError {
    EvalError::BadCast {
        from: from.type_name(),
        to: to.to_owned(),
    }
}

#[cold]
pub fn index_out_of_bounds(index: i64, length: usize) -> EvalError {
    EvalError::IndexOutOfBounds { index, length }
}

#[cold]
pub fn not_indexable(value: &Value) -> EvalError {
    EvalError::NotIndexable {
        type_name: value.type_name(),
    }
}

#[cold]
pub fn non_integer_index(value: &Value) -> EvalError {
    EvalError::NonIntegerIndex {
        type_name: value.type_name(),
    }
}

// Pattern and null errors

#[cold]
pub fn invalid_pattern(pattern: &str, message: impl Into<String>) -> EvalError {
    EvalError::InvalidPattern {
        pattern: pattern.to_owned(),
        message: message.into(),
    }
}

#[cold]
pub fn null_value(context: &str) -> EvalError {
    EvalError::NullValue {
        context: context.to_owned(),
    }
}

#[cold]
pub fn negative_array_size(size: i64) -> EvalError {
    EvalError::NegativeArraySize { size }
}
