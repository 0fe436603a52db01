use thiserror::Error;

use super::node::NodeIndex;
use crate::script::ScriptError;

/// Errors raised while building pools. Each aborts only the call that caused it.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("{pool} pool could not grow to {requested} slots")]
    AllocationFailure { pool: &'static str, requested: usize },

    #[error("{what} {index} out of range (pool holds {used})")]
    IndexOutOfRange {
        what: &'static str,
        index: u32,
        used: usize,
    },

    #[error("script fragment contains a NUL byte at position {position}")]
    InvalidFragment { position: usize },

    #[error("text offset {offset} does not start on a character boundary")]
    MisalignedOffset { offset: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors recorded in a node pool's sticky error slot during evaluation.
///
/// These never abort a walk; the failing subtree degrades to `false` and the
/// first error recorded is kept until the next top-level evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("type mismatch at node {node}: expected {expected}, found {found}")]
    TypeMismatch {
        node: NodeIndex,
        expected: &'static str,
        found: &'static str,
    },

    #[error("script at node {node} failed")]
    Script { node: NodeIndex, source: ScriptError },
}

/// Errors that reject a batch evaluation before any rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("result buffer holds {capacity} entries but {required} rules are registered")]
    BufferTooSmall { required: usize, capacity: usize },
}
