//! A priority-ordered boolean rule engine.
//!
//! Each rule is an expression tree stored in its own index-addressed
//! [`NodePool`]: numeric comparisons over value leaves, `AND`/`OR`/`NOT`, and
//! script leaves whose source lives in a shared [`TextPool`]. A [`RulePool`]
//! owns the rules, sorts them by priority, and evaluates them in bulk.
//!
//! Evaluation never aborts on bad data. A comparison over the wrong operand
//! kinds or a failing script degrades to `false` and records a sticky
//! [`EvalError`] on the rule, which callers inspect to tell a genuine `false`
//! from an untrusted one.

mod compile;
mod error;
mod evaluate;
pub mod script;
mod types;

pub use error::Error;
pub use types::{
    script, value, BatchError, BranchOp, CompareOp, EvalError, EvaluationReport, Expr, LogicOp,
    Node, NodeIndex, NodePool, NumericKind, PoolConfig, PoolError, Rule, RuleIndex, RulePool,
    TextOffset, TextPool, Value, Verdict, DEFAULT_CAPACITY,
};
