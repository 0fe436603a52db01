use std::fmt;
use std::time::Duration;

use super::verdict::Verdict;

/// Detailed batch result returned by
/// [`RulePool::evaluate_detailed()`](super::RulePool::evaluate_detailed).
///
/// Holds one [`Verdict`] per rule in slot order and the wall-clock duration
/// of the batch.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    verdicts: Vec<Verdict>,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(verdicts: Vec<Verdict>, duration: Duration) -> Self {
        Self { verdicts, duration }
    }

    /// Every verdict, in the order the rules were evaluated.
    #[must_use]
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// Verdicts that evaluated to `true` without error.
    pub fn passed(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts
            .iter()
            .filter(|v| v.result() && v.is_trusted())
    }

    /// Verdicts whose evaluation recorded an error.
    pub fn failed(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.is_trusted())
    }

    /// The first trusted `true` verdict in evaluation order.
    #[must_use]
    pub fn first_match(&self) -> Option<&Verdict> {
        self.passed().next()
    }

    /// The boolean results alone, as
    /// [`RulePool::evaluate_all_rules`](super::RulePool::evaluate_all_rules) would write them.
    #[must_use]
    pub fn results(&self) -> Vec<bool> {
        self.verdicts.iter().map(Verdict::result).collect()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_match() {
            Some(v) => write!(f, "first match: rule {}", v.rule())?,
            None => write!(f, "first match: none")?,
        }
        write!(
            f,
            ", passed: {}, failed: {}, total: {}",
            self.passed().count(),
            self.failed().count(),
            self.verdicts.len()
        )?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EvalError, NodeIndex, RuleIndex};

    fn report() -> EvaluationReport {
        EvaluationReport::new(
            vec![
                Verdict::new(RuleIndex::new(3), 0, false, None),
                Verdict::new(
                    RuleIndex::new(1),
                    1,
                    false,
                    Some(EvalError::TypeMismatch {
                        node: NodeIndex::new(0),
                        expected: "populated node",
                        found: "undefined node",
                    }),
                ),
                Verdict::new(RuleIndex::new(0), 5, true, None),
                Verdict::new(RuleIndex::new(2), 5, true, None),
            ],
            Duration::from_nanos(500),
        )
    }

    #[test]
    fn report_accessors() {
        let report = report();
        assert_eq!(report.verdicts().len(), 4);
        assert_eq!(report.results(), vec![false, false, true, true]);
        assert_eq!(report.passed().count(), 2);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.first_match().map(Verdict::rule), Some(RuleIndex::new(0)));
        assert_eq!(report.duration(), Duration::from_nanos(500));
    }

    #[test]
    fn report_display() {
        let s = report().to_string();
        assert!(s.contains("first match: rule 0"));
        assert!(s.contains("passed: 2, failed: 1, total: 4"));
    }

    #[test]
    fn report_display_no_match() {
        let report = EvaluationReport::new(vec![], Duration::from_nanos(100));
        assert!(report.to_string().contains("first match: none"));
    }
}
