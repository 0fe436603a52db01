//! The seam between the evaluator and an embedded script engine.
//!
//! The engine itself lives outside this crate. A host implements
//! [`ScriptRunner`] to compile and run a fragment and coerce its result to a
//! boolean; the evaluator only ever sees `Ok(bool)` or a [`ScriptError`].

use std::fmt;

use thiserror::Error;

use crate::types::{TextOffset, TextPool};

/// Opaque identifier of a script leaf.
///
/// Derived from the fragment text, so identical fragments share an id across
/// pools and runs. Runners may use it to cache compiled chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptId(u32);

impl ScriptId {
    /// First four bytes of the BLAKE3 digest of `source`, little endian.
    #[must_use]
    pub fn of(source: &str) -> Self {
        let digest = blake3::hash(source.as_bytes());
        let bytes = digest.as_bytes();
        Self(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Failure reported by a script runner. Never panics through the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script raised an error: {0}")]
    Failed(String),

    #[error("script result is not coercible to a boolean: {0}")]
    NotBoolean(String),

    #[error("no script engine is available")]
    Unavailable,

    #[error("no script fragment at text offset {offset}")]
    MissingFragment { offset: TextOffset },
}

/// Executes script fragments on behalf of the evaluator.
///
/// Bounding run time (instruction counts, wall-clock limits) is the
/// runner's job; the evaluator calls it synchronously and waits.
pub trait ScriptRunner {
    /// Run `source` and coerce its result to a boolean.
    ///
    /// # Errors
    ///
    /// Any compile or runtime failure, reported as a [`ScriptError`].
    fn execute(&self, id: ScriptId, source: &str) -> Result<bool, ScriptError>;
}

/// A runner backed by a closure over the fragment text.
#[derive(Clone)]
pub struct FnRunner<F> {
    f: F,
}

impl<F> fmt::Debug for FnRunner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRunner").finish_non_exhaustive()
    }
}

impl<F> ScriptRunner for FnRunner<F>
where
    F: Fn(&str) -> Result<bool, ScriptError>,
{
    fn execute(&self, _id: ScriptId, source: &str) -> Result<bool, ScriptError> {
        (self.f)(source)
    }
}

/// Wrap a closure as a [`ScriptRunner`].
///
/// ```
/// use prio_rules::script::{from_fn, ScriptError, ScriptId, ScriptRunner};
///
/// let runner = from_fn(|src| match src {
///     "return true" => Ok(true),
///     "return false" => Ok(false),
///     other => Err(ScriptError::Failed(format!("unknown chunk {other}"))),
/// });
/// assert_eq!(runner.execute(ScriptId::of("return true"), "return true"), Ok(true));
/// ```
pub fn from_fn<F>(f: F) -> FnRunner<F>
where
    F: Fn(&str) -> Result<bool, ScriptError>,
{
    FnRunner { f }
}

/// A runner for hosts without a script engine: every fragment fails with
/// [`ScriptError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripts;

impl ScriptRunner for NoScripts {
    fn execute(&self, _id: ScriptId, _source: &str) -> Result<bool, ScriptError> {
        Err(ScriptError::Unavailable)
    }
}

/// Everything a tree walk needs to resolve script leaves.
#[derive(Clone, Copy)]
pub struct ScriptContext<'a> {
    text: &'a TextPool,
    runner: &'a dyn ScriptRunner,
}

impl<'a> ScriptContext<'a> {
    #[must_use]
    pub fn new(text: &'a TextPool, runner: &'a dyn ScriptRunner) -> Self {
        Self { text, runner }
    }

    #[must_use]
    pub fn text(&self) -> &'a TextPool {
        self.text
    }

    pub(crate) fn run(&self, id: ScriptId, offset: TextOffset) -> Result<bool, ScriptError> {
        let source = self
            .text
            .fragment(offset)
            .ok_or(ScriptError::MissingFragment { offset })?;
        self.runner.execute(id, source)
    }
}

impl fmt::Debug for ScriptContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
