//! Runtime value representation
//!
//! Tagged values for the tree-walking interpreter, plus the runtime error
//! type. Precision contract: integers are 32-bit (arithmetic wraps the way
//! machine integers do), decimals are double-precision. Lists are plain
//! values; indexed assignment mutates a list in place through its owning
//! binding, while passing a list copies it.

use crate::span::Span;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i32),
    Decimal(f64),
    Character(char),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Runtime type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Character(_) => "character",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Natural ordering for two values of the same runtime type.
    ///
    /// Booleans order `false < true`; numbers, characters, and strings use
    /// their usual orderings. `None` for nil, lists, and mixed-type pairs.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Character(a), Value::Character(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            // Decimals always render a fractional part: 2.0, not 2.
            Value::Decimal(d) => {
                if d.is_finite() && *d == d.trunc() {
                    write!(f, "{d:.1}")
                } else {
                    write!(f, "{d}")
                }
            }
            Value::Character(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Runtime error type with source span information
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// Undefined variable
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },
    /// Undefined function for a given name and arity
    #[error("Undefined function: {name}/{arity}")]
    UndefinedFunction {
        name: String,
        arity: usize,
        span: Span,
    },
    /// Name already defined in the same scope
    #[error("Duplicate definition: {name}")]
    DuplicateDefinition { name: String, span: Span },
    /// Assignment to an immutable binding
    #[error("Cannot assign to immutable variable '{name}'")]
    ImmutableAssignment { name: String, span: Span },
    /// Operand or operation type mismatch
    #[error("Type error: {msg}")]
    TypeError { msg: String, span: Span },
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero { span: Span },
    /// List index outside `[0, len)`
    #[error("Index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: i32, len: usize, span: Span },
    /// Integer literal outside the 32-bit range
    #[error("Integer literal out of range")]
    IntegerOutOfRange { span: Span },
    /// Non-finite decimal literal
    #[error("Decimal literal out of range")]
    DecimalOutOfRange { span: Span },
    /// Negative exponent on an integer base
    #[error("Negative exponent for integer base")]
    NegativeExponent { span: Span },
    /// Output sink failure from `print`
    #[error("I/O error: {message}")]
    Io { message: String, span: Span },
}

impl RuntimeError {
    /// Get the source span for this error
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UndefinedVariable { span, .. } => *span,
            RuntimeError::UndefinedFunction { span, .. } => *span,
            RuntimeError::DuplicateDefinition { span, .. } => *span,
            RuntimeError::ImmutableAssignment { span, .. } => *span,
            RuntimeError::TypeError { span, .. } => *span,
            RuntimeError::DivisionByZero { span } => *span,
            RuntimeError::IndexOutOfBounds { span, .. } => *span,
            RuntimeError::IntegerOutOfRange { span } => *span,
            RuntimeError::DecimalOutOfRange { span } => *span,
            RuntimeError::NegativeExponent { span } => *span,
            RuntimeError::Io { span, .. } => *span,
        }
    }
}
