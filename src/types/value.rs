use std::fmt;

use super::expr::CompareOp;

/// Declared numeric kind of a value leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericKind {
    U32,
    I32,
    F32,
}

/// A 32-bit numeric operand stored in a value leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Two's-complement signed 32-bit integer.
    I32(i32),
    /// IEEE-754 single precision float.
    F32(f32),
}

impl Value {
    /// Reinterpret a raw 32-bit payload according to `kind`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_raw(kind: NumericKind, raw: u32) -> Self {
        match kind {
            NumericKind::U32 => Value::U32(raw),
            NumericKind::I32 => Value::I32(raw as i32),
            NumericKind::F32 => Value::F32(f32::from_bits(raw)),
        }
    }

    /// The raw 32-bit payload, the inverse of [`from_raw`](Self::from_raw).
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn to_raw(self) -> u32 {
        match self {
            Value::U32(v) => v,
            Value::I32(v) => v as u32,
            Value::F32(v) => v.to_bits(),
        }
    }

    #[must_use]
    pub fn kind(self) -> NumericKind {
        match self {
            Value::U32(_) => NumericKind::U32,
            Value::I32(_) => NumericKind::I32,
            Value::F32(_) => NumericKind::F32,
        }
    }

    /// Nonzero is true. Floats compare numerically, so `-0.0` is false and
    /// NaN is true.
    #[must_use]
    pub fn is_truthy(self) -> bool {
        match self {
            Value::U32(v) => v != 0,
            Value::I32(v) => v != 0,
            Value::F32(v) => v != 0.0,
        }
    }

    /// Compare this value to another of the same kind.
    ///
    /// Returns `None` when the kinds differ. Floats follow IEEE-754: any
    /// comparison involving NaN is `false`, except [`CompareOp::Neq`] which
    /// is `true`.
    #[must_use]
    pub fn compare(self, op: CompareOp, other: Value) -> Option<bool> {
        match (self, other) {
            (Value::U32(a), Value::U32(b)) => Some(apply(op, &a, &b)),
            (Value::I32(a), Value::I32(b)) => Some(apply(op, &a, &b)),
            (Value::F32(a), Value::F32(b)) => Some(apply(op, &a, &b)),
            _ => None,
        }
    }
}

// Uses the operators directly rather than `partial_cmp` so that NaN keeps
// `!=` true while every ordering comparison stays false.
fn apply<T: PartialOrd>(op: CompareOp, a: &T, b: &T) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Neq => a != b,
        CompareOp::Gt => a > b,
        CompareOp::Gte => a >= b,
        CompareOp::Lt => a < b,
        CompareOp::Lte => a <= b,
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericKind::U32 => write!(f, "u32"),
            NumericKind::I32 => write!(f, "i32"),
            NumericKind::F32 => write!(f, "f32"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U32(v) => write!(f, "{v}u32"),
            Value::I32(v) => write!(f, "{v}i32"),
            Value::F32(v) => write!(f, "{v}f32"),
        }
    }
}
