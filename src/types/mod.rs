mod arena;
mod config;
mod error;
mod evaluation_report;
mod expr;
mod node;
mod rule;
mod rule_pool;
mod text_pool;
mod value;
mod verdict;

pub use arena::DEFAULT_CAPACITY;
pub use config::PoolConfig;
pub use error::{BatchError, EvalError, PoolError};
pub use evaluation_report::EvaluationReport;
pub use expr::{script, value, BranchOp, CompareOp, Expr, LogicOp};
pub use node::{Node, NodeIndex, NodePool};
pub use rule::{Rule, RuleIndex};
pub use rule_pool::RulePool;
pub use text_pool::{TextOffset, TextPool};
pub use value::{NumericKind, Value};
pub use verdict::Verdict;
