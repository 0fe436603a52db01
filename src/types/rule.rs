use std::fmt;

use super::error::EvalError;
use super::node::{NodeIndex, NodePool};

/// Slot index of a rule inside a [`RulePool`](super::RulePool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleIndex(u32);

impl RuleIndex {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered rule: one expression tree plus its priority.
///
/// Lower priority values run first (0 is the highest precedence). The rule
/// exclusively owns its [`NodePool`]. `origin` is the slot the rule was
/// inserted at and does not change when the pool is sorted.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) priority: u8,
    pub(crate) nodes: NodePool,
    pub(crate) root: NodeIndex,
    pub(crate) error: Option<EvalError>,
    pub(crate) origin: RuleIndex,
}

impl Rule {
    #[must_use]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    #[must_use]
    pub fn nodes(&self) -> &NodePool {
        &self.nodes
    }

    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Error from the rule's last evaluation, mirrored from its node pool.
    #[must_use]
    pub fn error(&self) -> Option<&EvalError> {
        self.error.as_ref()
    }

    /// The slot this rule was inserted at.
    #[must_use]
    pub fn origin(&self) -> RuleIndex {
        self.origin
    }
}
