use std::fmt;

use super::error::EvalError;
use super::rule::RuleIndex;

/// Outcome of evaluating one rule.
///
/// `result` is only meaningful when [`is_trusted`](Self::is_trusted) holds; a
/// rule that hit an evaluation error reports `false` with the error attached.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Verdict {
    rule: RuleIndex,
    priority: u8,
    result: bool,
    error: Option<EvalError>,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} (priority {}) = {}", self.rule, self.priority, self.result)?;
        if let Some(err) = &self.error {
            write!(f, " [untrusted: {err}]")?;
        }
        Ok(())
    }
}

impl Verdict {
    pub fn new(rule: RuleIndex, priority: u8, result: bool, error: Option<EvalError>) -> Self {
        Self {
            rule,
            priority,
            result,
            error,
        }
    }

    /// Insertion slot of the rule this verdict belongs to.
    #[must_use]
    pub fn rule(&self) -> RuleIndex {
        self.rule
    }

    #[must_use]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    #[must_use]
    pub fn result(&self) -> bool {
        self.result
    }

    #[must_use]
    pub fn error(&self) -> Option<&EvalError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_trusted(&self) -> bool {
        self.error.is_none()
    }

    /// The boolean verdict, or the error that makes it untrustworthy.
    ///
    /// # Errors
    ///
    /// Returns the rule's [`EvalError`] if evaluation failed.
    pub fn into_result(self) -> Result<bool, EvalError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}
