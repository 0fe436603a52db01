use thiserror::Error;

use crate::{BatchError, EvalError, PoolError};

/// Unified error type covering construction, evaluation, and batch failures.
///
/// Individual operations return the narrower error they can produce; this
/// type lets a host funnel all of them through one `?`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Batch(#[from] BatchError),
}
