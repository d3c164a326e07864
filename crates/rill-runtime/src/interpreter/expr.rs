//! Expression evaluation
//!
//! Operands are evaluated left to right, each exactly once. `&&` and `||`
//! short-circuit; `==`/`!=` compare evaluated values, not expression
//! structure. Integer arithmetic wraps at 32 bits; decimal division
//! rounds its quotient to one fractional digit, ties to even.

use crate::ast::*;
use crate::interpreter::stmt::list_slot;
use crate::interpreter::Interpreter;
use crate::span::Span;
use crate::value::{RuntimeError, Value};
use std::cmp::Ordering;

impl Interpreter {
    /// Evaluate an expression
    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => eval_literal(lit),
            Expr::Group(group) => self.eval_expr(&group.inner),
            Expr::Binary(binary) => self.eval_binary(binary),
            Expr::Access(access) => self.eval_access(access),
            Expr::Call(call) => self.eval_call(call),
            Expr::List(list) => {
                let mut items = Vec::with_capacity(list.elements.len());
                for element in &list.elements {
                    items.push(self.eval_expr(element)?);
                }
                Ok(Value::List(items))
            }
        }
    }

    fn eval_binary(&mut self, binary: &BinaryExpr) -> Result<Value, RuntimeError> {
        // Short-circuit evaluation for && and ||
        if binary.op == BinaryOp::And {
            if !self.eval_bool(&binary.left)? {
                return Ok(Value::Boolean(false));
            }
            return Ok(Value::Boolean(self.eval_bool(&binary.right)?));
        }
        if binary.op == BinaryOp::Or {
            if self.eval_bool(&binary.left)? {
                return Ok(Value::Boolean(true));
            }
            return Ok(Value::Boolean(self.eval_bool(&binary.right)?));
        }

        let left = self.eval_expr(&binary.left)?;
        let right = self.eval_expr(&binary.right)?;
        let span = binary.span;

        match binary.op {
            BinaryOp::Eq => Ok(Value::Boolean(left == right)),
            BinaryOp::Ne => Ok(Value::Boolean(left != right)),
            BinaryOp::Lt | BinaryOp::Gt => {
                let ordering = left.compare(&right).ok_or_else(|| RuntimeError::TypeError {
                    msg: format!(
                        "cannot order {} and {}",
                        left.type_name(),
                        right.type_name()
                    ),
                    span,
                })?;
                Ok(Value::Boolean(match binary.op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    _ => ordering == Ordering::Greater,
                }))
            }
            BinaryOp::Add => match (left, right) {
                (Value::String(a), b) => Ok(Value::String(format!("{a}{b}"))),
                (a, Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_add(b))),
                (Value::Decimal(a), Value::Decimal(b)) => Ok(Value::Decimal(a + b)),
                (a, b) => Err(operand_error(BinaryOp::Add, &a, &b, span)),
            },
            BinaryOp::Sub => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_sub(b))),
                (Value::Decimal(a), Value::Decimal(b)) => Ok(Value::Decimal(a - b)),
                (a, b) => Err(operand_error(BinaryOp::Sub, &a, &b, span)),
            },
            BinaryOp::Mul => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_mul(b))),
                (Value::Decimal(a), Value::Decimal(b)) => Ok(Value::Decimal(a * b)),
                (a, b) => Err(operand_error(BinaryOp::Mul, &a, &b, span)),
            },
            BinaryOp::Div => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero { span });
                    }
                    Ok(Value::Integer(a.wrapping_div(b)))
                }
                (Value::Decimal(a), Value::Decimal(b)) => {
                    if b == 0.0 {
                        return Err(RuntimeError::DivisionByZero { span });
                    }
                    Ok(Value::Decimal(round_scale_1(a / b)))
                }
                (a, b) => Err(operand_error(BinaryOp::Div, &a, &b, span)),
            },
            BinaryOp::Pow => {
                let exponent = match right {
                    Value::Integer(e) => e,
                    other => {
                        return Err(RuntimeError::TypeError {
                            msg: format!(
                                "exponent must be an integer, found {}",
                                other.type_name()
                            ),
                            span,
                        })
                    }
                };
                match left {
                    Value::Integer(base) => {
                        if exponent < 0 {
                            return Err(RuntimeError::NegativeExponent { span });
                        }
                        Ok(Value::Integer(base.wrapping_pow(exponent as u32)))
                    }
                    Value::Decimal(base) => Ok(Value::Decimal(base.powi(exponent))),
                    other => Err(RuntimeError::TypeError {
                        msg: format!("'^' needs a numeric base, found {}", other.type_name()),
                        span,
                    }),
                }
            }
            BinaryOp::And | BinaryOp::Or => {
                // Handled above
                unreachable!()
            }
        }
    }

    fn eval_access(&mut self, access: &AccessExpr) -> Result<Value, RuntimeError> {
        let binding = self.lookup_variable(&access.name, access.span)?;
        match &access.offset {
            Some(offset) => {
                let index = self.eval_index(offset)?;
                let cell = binding.value.borrow();
                match &*cell {
                    Value::List(items) => {
                        let slot = list_slot(index, items.len(), offset.span())?;
                        Ok(items[slot].clone())
                    }
                    other => Err(RuntimeError::TypeError {
                        msg: format!("only lists can be indexed, found {}", other.type_name()),
                        span: access.span,
                    }),
                }
            }
            None => Ok(binding.value.borrow().clone()),
        }
    }

    fn eval_call(&mut self, call: &CallExpr) -> Result<Value, RuntimeError> {
        let callable = self.lookup_function(&call.name, call.args.len(), call.span)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expr(arg)?);
        }
        self.call(&callable, args, call.span)
    }

    /// Evaluate an expression that must produce a boolean (conditions,
    /// logical operands).
    pub(crate) fn eval_bool(&mut self, expr: &Expr) -> Result<bool, RuntimeError> {
        match self.eval_expr(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::TypeError {
                msg: format!("expected a boolean, found {}", other.type_name()),
                span: expr.span(),
            }),
        }
    }

    /// Evaluate an expression that must produce an integer index.
    pub(crate) fn eval_index(&mut self, expr: &Expr) -> Result<i32, RuntimeError> {
        match self.eval_expr(expr)? {
            Value::Integer(index) => Ok(index),
            other => Err(RuntimeError::TypeError {
                msg: format!("list index must be an integer, found {}", other.type_name()),
                span: expr.span(),
            }),
        }
    }
}

fn eval_literal(lit: &LiteralExpr) -> Result<Value, RuntimeError> {
    match &lit.value {
        Literal::Nil => Ok(Value::Nil),
        Literal::Boolean(b) => Ok(Value::Boolean(*b)),
        Literal::Integer(value) => i32::try_from(*value)
            .map(Value::Integer)
            .map_err(|_| RuntimeError::IntegerOutOfRange { span: lit.span }),
        Literal::Decimal(value) => {
            if value.is_finite() {
                Ok(Value::Decimal(*value))
            } else {
                Err(RuntimeError::DecimalOutOfRange { span: lit.span })
            }
        }
        Literal::Character(c) => Ok(Value::Character(*c)),
        Literal::String(s) => Ok(Value::String(s.clone())),
    }
}

fn operand_error(op: BinaryOp, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::TypeError {
        msg: format!(
            "invalid operands for '{op}': {} and {}",
            left.type_name(),
            right.type_name()
        ),
        span,
    }
}

/// Round a decimal quotient to one fractional digit, ties to even.
fn round_scale_1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
