//! The VM's tagged value type and its numeric semantics.
//!
//! Mixed int/float arithmetic promotes to float; comparisons yield
//! int 0/1; `& | %` are integer-only. Logical `&& ||` are evaluated
//! without short-circuiting, combining both operands' truthiness.

use cog_types::ast::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A three-component float vector, written `'x y z'` in source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn map2(self, other: Vector, f: impl Fn(f32, f32) -> f32) -> Vector {
        Vector::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    fn scale(self, s: f32) -> Vector {
        Vector::new(self.x * s, self.y * s, self.z * s)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{} {} {}'", self.x, self.y, self.z)
    }
}

/// The kind of a [`Value`], used in verb signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Float,
    Vector,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

/// Error from a value operation; the VM surfaces these as runtime
/// faults on the executing instance.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    #[error("type mismatch: cannot apply operator to {0} and {1}")]
    BinaryTypeMismatch(ValueKind, ValueKind),
    #[error("type mismatch: cannot apply operator to {0}")]
    UnaryTypeMismatch(ValueKind),
    #[error("integer division by zero")]
    DivideByZero,
}

/// A tagged runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
    Vector(Vector),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Vector(_) => ValueKind::Vector,
        }
    }

    /// Truthiness for jumps and logical operators: nonzero is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::Vector(v) => *v != Vector::ZERO,
        }
    }

    /// Numeric coercion to float. `None` for vectors.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Int(v) => Some(*v as f32),
            Self::Float(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// Numeric coercion to int (floats truncate). `None` for vectors.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i32),
            Self::Vector(_) => None,
        }
    }

    /// Coerce to the given kind, where a numeric conversion exists.
    pub fn coerce(&self, kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::Int => self.as_int().map(Value::Int),
            ValueKind::Float => self.as_float().map(Value::Float),
            ValueKind::Vector => match self {
                Self::Vector(v) => Some(Value::Vector(*v)),
                _ => None,
            },
        }
    }

    /// Apply a unary operator.
    pub fn unary(op: UnaryOp, v: Value) -> Result<Value, ValueError> {
        match op {
            UnaryOp::Neg => match v {
                Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                Value::Float(n) => Ok(Value::Float(-n)),
                Value::Vector(n) => Ok(Value::Vector(n.scale(-1.0))),
            },
            UnaryOp::Not => Ok(Value::Int(!v.is_truthy() as i32)),
        }
    }

    /// Apply a binary operator with the promotion rules above.
    pub fn binary(op: BinaryOp, a: Value, b: Value) -> Result<Value, ValueError> {
        use BinaryOp::*;
        match op {
            Add | Sub | Mul | Div => Self::arithmetic(op, a, b),
            Mod | BitAnd | BitOr => Self::integer_op(op, a, b),
            Eq | NotEq | Less | LessEq | Greater | GreaterEq => Self::comparison(op, a, b),
            LogAnd => Ok(Value::Int((a.is_truthy() && b.is_truthy()) as i32)),
            LogOr => Ok(Value::Int((a.is_truthy() || b.is_truthy()) as i32)),
        }
    }

    fn arithmetic(op: BinaryOp, a: Value, b: Value) -> Result<Value, ValueError> {
        use BinaryOp::*;
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => match op {
                Add => Ok(Value::Int(x.wrapping_add(y))),
                Sub => Ok(Value::Int(x.wrapping_sub(y))),
                Mul => Ok(Value::Int(x.wrapping_mul(y))),
                Div => {
                    if y == 0 {
                        Err(ValueError::DivideByZero)
                    } else {
                        Ok(Value::Int(x.wrapping_div(y)))
                    }
                }
                _ => unreachable!(),
            },
            (Value::Vector(x), Value::Vector(y)) => match op {
                Add => Ok(Value::Vector(x.map2(y, |a, b| a + b))),
                Sub => Ok(Value::Vector(x.map2(y, |a, b| a - b))),
                _ => Err(ValueError::BinaryTypeMismatch(a.kind(), b.kind())),
            },
            // vector * scalar, scalar * vector, vector / scalar
            (Value::Vector(v), s) | (s, Value::Vector(v))
                if matches!(op, Mul) && s.as_float().is_some() =>
            {
                Ok(Value::Vector(v.scale(s.as_float().unwrap_or(0.0))))
            }
            (Value::Vector(v), s) if matches!(op, Div) && s.as_float().is_some() => {
                Ok(Value::Vector(v.scale(1.0 / s.as_float().unwrap_or(1.0))))
            }
            _ => match (a.as_float(), b.as_float()) {
                (Some(x), Some(y)) => match op {
                    Add => Ok(Value::Float(x + y)),
                    Sub => Ok(Value::Float(x - y)),
                    Mul => Ok(Value::Float(x * y)),
                    Div => Ok(Value::Float(x / y)),
                    _ => unreachable!(),
                },
                _ => Err(ValueError::BinaryTypeMismatch(a.kind(), b.kind())),
            },
        }
    }

    fn integer_op(op: BinaryOp, a: Value, b: Value) -> Result<Value, ValueError> {
        use BinaryOp::*;
        let (Some(x), Some(y)) = (a.as_int(), b.as_int()) else {
            return Err(ValueError::BinaryTypeMismatch(a.kind(), b.kind()));
        };
        match op {
            Mod => {
                if y == 0 {
                    Err(ValueError::DivideByZero)
                } else {
                    Ok(Value::Int(x.wrapping_rem(y)))
                }
            }
            BitAnd => Ok(Value::Int(x & y)),
            BitOr => Ok(Value::Int(x | y)),
            _ => unreachable!(),
        }
    }

    fn comparison(op: BinaryOp, a: Value, b: Value) -> Result<Value, ValueError> {
        use BinaryOp::*;
        if let (Value::Vector(x), Value::Vector(y)) = (a, b) {
            return match op {
                Eq => Ok(Value::Int((x == y) as i32)),
                NotEq => Ok(Value::Int((x != y) as i32)),
                _ => Err(ValueError::BinaryTypeMismatch(a.kind(), b.kind())),
            };
        }
        let (Some(x), Some(y)) = (a.as_float(), b.as_float()) else {
            return Err(ValueError::BinaryTypeMismatch(a.kind(), b.kind()));
        };
        let result = match op {
            Eq => x == y,
            NotEq => x != y,
            Less => x < y,
            LessEq => x <= y,
            Greater => x > y,
            GreaterEq => x >= y,
            _ => unreachable!(),
        };
        Ok(Value::Int(result as i32))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Vector(v) => write!(f, "{v}"),
        }
    }
}
