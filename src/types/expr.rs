use std::fmt;
use std::ops::Not;

use super::text_pool::TextOffset;
use super::value::Value;

/// Comparison operators. `Neq` is "different from".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Binary logical operators. Both operands are always evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicOp {
    And,
    Or,
}

/// Operator of a branch node, as passed to
/// [`NodePool::add_branch_node`](super::NodePool::add_branch_node).
///
/// `Not` takes its operand from the left slot; the right slot is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchOp {
    Compare(CompareOp),
    Logic(LogicOp),
    Not,
}

impl From<CompareOp> for BranchOp {
    fn from(op: CompareOp) -> Self {
        BranchOp::Compare(op)
    }
}

impl From<LogicOp> for BranchOp {
    fn from(op: LogicOp) -> Self {
        BranchOp::Logic(op)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOp::And => write!(f, "AND"),
            LogicOp::Or => write!(f, "OR"),
        }
    }
}

impl fmt::Display for BranchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchOp::Compare(op) => write!(f, "{op}"),
            BranchOp::Logic(op) => write!(f, "{op}"),
            BranchOp::Not => write!(f, "NOT"),
        }
    }
}

/// Boxed expression tree used to build rules without handling node indices.
///
/// Lowered into a [`NodePool`](super::NodePool) with
/// [`NodePool::push_expr`](super::NodePool::push_expr). Operand kinds are not
/// checked here; a comparison over anything but two value leaves is reported
/// when the rule is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Value(Value),
    Script(TextOffset),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value(v) => write!(f, "{v}"),
            Expr::Script(offset) => write!(f, "script@{offset}"),
            Expr::Compare { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::And(a, b) => write!(f, "({a} AND {b})"),
            Expr::Or(a, b) => write!(f, "({a} OR {b})"),
            Expr::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

impl Expr {
    fn compare(self, op: CompareOp, other: impl Into<Expr>) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Eq, other)
    }

    #[must_use]
    pub fn neq(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Neq, other)
    }

    #[must_use]
    pub fn gt(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gt, other)
    }

    #[must_use]
    pub fn gte(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gte, other)
    }

    #[must_use]
    pub fn lt(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lt, other)
    }

    #[must_use]
    pub fn lte(self, other: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lte, other)
    }

    #[must_use]
    pub fn and(self, other: impl Into<Expr>) -> Expr {
        Expr::And(Box::new(self), Box::new(other.into()))
    }

    #[must_use]
    pub fn or(self, other: impl Into<Expr>) -> Expr {
        Expr::Or(Box::new(self), Box::new(other.into()))
    }

    /// Number of nodes this expression lowers to.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(expr) = pending.pop() {
            count += 1;
            match expr {
                Expr::Value(_) | Expr::Script(_) => {}
                Expr::Compare { left, right, .. }
                | Expr::And(left, right)
                | Expr::Or(left, right) => {
                    pending.push(left);
                    pending.push(right);
                }
                Expr::Not(inner) => pending.push(inner),
            }
        }
        count
    }

    /// Move this node's children into `out`, leaving cheap leaves behind.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        let placeholder = || Expr::Value(Value::U32(0));
        match self {
            Expr::Value(_) | Expr::Script(_) => {}
            Expr::Compare { left, right, .. }
            | Expr::And(left, right)
            | Expr::Or(left, right) => {
                out.push(std::mem::replace(&mut **left, placeholder()));
                out.push(std::mem::replace(&mut **right, placeholder()));
            }
            Expr::Not(inner) => out.push(std::mem::replace(&mut **inner, placeholder())),
        }
    }
}

// Deep chains would overflow the stack under the default recursive drop.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Value(v)
    }
}

impl From<u32> for Expr {
    fn from(v: u32) -> Self {
        Expr::Value(Value::U32(v))
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr::Value(Value::I32(v))
    }
}

impl From<f32> for Expr {
    fn from(v: f32) -> Self {
        Expr::Value(Value::F32(v))
    }
}

impl From<TextOffset> for Expr {
    fn from(offset: TextOffset) -> Self {
        Expr::Script(offset)
    }
}

#[must_use]
pub fn value(v: impl Into<Value>) -> Expr {
    Expr::Value(v.into())
}

#[must_use]
pub fn script(offset: TextOffset) -> Expr {
    Expr::Script(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_gt_builds_comparison() {
        let expr = value(10_u32).gt(5_u32);
        assert_eq!(
            expr,
            Expr::Compare {
                op: CompareOp::Gt,
                left: Box::new(Expr::Value(Value::U32(10))),
                right: Box::new(Expr::Value(Value::U32(5))),
            }
        );
    }

    #[test]
    fn and_chaining_is_left_associative() {
        let expr = value(1_u32).and(value(2_u32)).and(value(3_u32));
        match &expr {
            Expr::And(left, right) => {
                assert_eq!(**right, Expr::Value(Value::U32(3)));
                assert!(matches!(left.as_ref(), Expr::And(_, _)));
            }
            other => panic!("expected outer And, got {other:?}"),
        }
    }

    #[test]
    fn or_and_not() {
        let expr = !value(0_i32).or(script(TextOffset::new(4)));
        match &expr {
            Expr::Not(inner) => assert!(matches!(inner.as_ref(), Expr::Or(_, _))),
            other => panic!("expected Not, got {other:?}"),
        }
    }

    #[test]
    fn all_compare_ops() {
        let ops = vec![
            (value(1_i32).eq(1_i32), CompareOp::Eq),
            (value(1_i32).neq(1_i32), CompareOp::Neq),
            (value(1_i32).gt(1_i32), CompareOp::Gt),
            (value(1_i32).gte(1_i32), CompareOp::Gte),
            (value(1_i32).lt(1_i32), CompareOp::Lt),
            (value(1_i32).lte(1_i32), CompareOp::Lte),
        ];
        for (expr, expected_op) in ops {
            match &expr {
                Expr::Compare { op, .. } => assert_eq!(*op, expected_op),
                other => panic!("expected Compare, got {other:?}"),
            }
        }
    }

    #[test]
    fn display() {
        let expr = value(3_u32).lt(4_u32).and(!script(TextOffset::new(0)));
        assert_eq!(expr.to_string(), "((3u32 < 4u32) AND (NOT script@0))");
        assert_eq!(BranchOp::from(CompareOp::Neq).to_string(), "!=");
        assert_eq!(BranchOp::from(LogicOp::Or).to_string(), "OR");
        assert_eq!(BranchOp::Not.to_string(), "NOT");
    }

    #[test]
    fn node_count() {
        assert_eq!(value(1_u32).node_count(), 1);
        assert_eq!(value(1_u32).gt(0_u32).node_count(), 3);
        assert_eq!((!value(1_u32).gt(0_u32).or(value(1_u32))).node_count(), 6);
    }

    #[test]
    fn deep_chain_counts_and_drops() {
        let mut expr = value(1_u32);
        for _ in 0..200_000 {
            expr = !expr;
        }
        assert_eq!(expr.node_count(), 200_001);
        drop(expr);
    }
}
