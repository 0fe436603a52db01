use std::fmt;

use tracing::debug;

use super::arena::Arena;
use super::config::PoolConfig;
use super::error::{BatchError, PoolError};
use super::evaluation_report::EvaluationReport;
use super::expr::Expr;
use super::node::{NodeIndex, NodePool};
use super::rule::{Rule, RuleIndex};
use super::text_pool::TextPool;
use super::verdict::Verdict;
use crate::script::ScriptRunner;

/// Every rule of one evaluation session, plus the script text they share.
///
/// The pool owns each rule, each rule's [`NodePool`], and the [`TextPool`]
/// their script leaves point into.
///
/// # Example
///
/// ```
/// use prio_rules::{value, RulePool, script::NoScripts};
///
/// let mut pool = RulePool::new();
/// pool.add_expr_rule(5, &value(30_u32).gt(18_u32)).unwrap();
/// pool.add_expr_rule(0, &value(1_u32).eq(0_u32)).unwrap();
/// pool.sort_rules();
///
/// let mut out = [false; 2];
/// let results = pool.evaluate_all_rules(&NoScripts, &mut out).unwrap();
/// assert_eq!(results, &[false, true]);
/// ```
#[derive(Debug, Clone)]
pub struct RulePool {
    rules: Arena<Rule>,
    text: TextPool,
    config: PoolConfig,
}

impl Default for RulePool {
    fn default() -> Self {
        Self::new()
    }
}

impl RulePool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            rules: Arena::with_capacity("rule", config.rule_capacity),
            text: TextPool::with_capacity(config.text_capacity),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The shared script-text pool.
    #[must_use]
    pub fn text(&self) -> &TextPool {
        &self.text
    }

    /// Mutable access to the shared script-text pool, for adding fragments.
    /// Offsets already handed out stay valid.
    pub fn text_mut(&mut self) -> &mut TextPool {
        &mut self.text
    }

    /// A fresh node pool sized by this pool's configuration.
    #[must_use]
    pub fn node_pool(&self) -> NodePool {
        NodePool::with_capacity(self.config.node_capacity)
    }

    /// Take ownership of `nodes` and register it as a rule rooted at `root`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`] if `root` is not populated in `nodes`,
    /// or [`PoolError::AllocationFailure`] if the rule pool cannot grow.
    pub fn add_rule(
        &mut self,
        priority: u8,
        nodes: NodePool,
        root: NodeIndex,
    ) -> Result<RuleIndex, PoolError> {
        nodes.check_operand(root)?;
        let origin = RuleIndex::new(self.rules.reserve_for(1)?);
        let index = self.rules.push(Rule {
            priority,
            nodes,
            root,
            error: None,
            origin,
        })?;
        Ok(RuleIndex::new(index))
    }

    /// Lower `expr` into a new node pool and register it as a rule.
    ///
    /// Script leaves in `expr` must point into [`text()`](Self::text).
    ///
    /// # Errors
    ///
    /// Any construction error from lowering or from [`add_rule`](Self::add_rule).
    pub fn add_expr_rule(&mut self, priority: u8, expr: &Expr) -> Result<RuleIndex, PoolError> {
        let mut nodes = self.node_pool();
        let root = nodes.push_expr(expr, &self.text)?;
        self.add_rule(priority, nodes, root)
    }

    /// The rule currently stored at slot `index`.
    #[must_use]
    pub fn get(&self, index: RuleIndex) -> Option<&Rule> {
        self.rules.get(index.get())
    }

    /// Iterate over rules in their current slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.as_slice().iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rules.capacity()
    }

    /// Double the rule capacity.
    ///
    /// # Errors
    ///
    /// [`PoolError::AllocationFailure`] if the allocation fails.
    pub fn grow(&mut self) -> Result<(), PoolError> {
        self.rules.grow()
    }

    /// Evaluate the rule at slot `index` and record its error on the rule.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`] if no rule occupies `index`. Evaluation
    /// failures are not errors here; inspect [`Rule::error`] afterwards.
    pub fn evaluate_rule(
        &mut self,
        index: RuleIndex,
        runner: &dyn ScriptRunner,
    ) -> Result<bool, PoolError> {
        let used = self.rules.len();
        let rule = self
            .rules
            .get_mut(index.get())
            .ok_or(PoolError::IndexOutOfRange {
                what: "rule",
                index: index.get(),
                used,
            })?;
        Ok(crate::evaluate::evaluate_rule(rule, &self.text, runner))
    }

    /// Reorder slots by ascending priority. Rules of equal priority keep
    /// their relative order.
    pub fn sort_rules(&mut self) {
        self.rules.as_mut_slice().sort_by_key(Rule::priority);
        debug!(rules = self.rules.len(), "sorted rules by priority");
    }

    /// Evaluate every rule in current slot order, writing verdict `i` to
    /// `out[i]`. Returns the written prefix of `out`.
    ///
    /// A rule that fails evaluation still gets a slot (`false`) and the batch
    /// carries on; check [`Rule::error`] per rule.
    ///
    /// # Errors
    ///
    /// [`BatchError::BufferTooSmall`] if `out` is shorter than [`len()`](Self::len).
    /// No rule is evaluated and `out` is left untouched in that case.
    pub fn evaluate_all_rules<'b>(
        &mut self,
        runner: &dyn ScriptRunner,
        out: &'b mut [bool],
    ) -> Result<&'b [bool], BatchError> {
        let written =
            crate::evaluate::evaluate_all(self.rules.as_mut_slice(), &self.text, runner, out)?;
        Ok(&out[..written])
    }

    /// Allocating form of [`evaluate_all_rules`](Self::evaluate_all_rules).
    #[must_use]
    pub fn evaluate_all(&mut self, runner: &dyn ScriptRunner) -> Vec<bool> {
        let mut out = vec![false; self.rules.len()];
        for (slot, rule) in out.iter_mut().zip(self.rules.as_mut_slice()) {
            *slot = crate::evaluate::evaluate_rule(rule, &self.text, runner);
        }
        out
    }

    /// Evaluate every rule and return per-rule verdicts with timing.
    pub fn evaluate_detailed(&mut self, runner: &dyn ScriptRunner) -> EvaluationReport {
        crate::evaluate::evaluate_detailed(self.rules.as_mut_slice(), &self.text, runner)
    }

    /// Evaluate every rule and return the first trusted `true` verdict in
    /// slot order. After [`sort_rules`](Self::sort_rules) this is the
    /// highest-priority passing rule.
    pub fn first_match(&mut self, runner: &dyn ScriptRunner) -> Option<Verdict> {
        self.evaluate_detailed(runner).first_match().cloned()
    }

    /// Insertion slots of the rules in their current order.
    #[must_use]
    pub fn evaluation_order(&self) -> Vec<RuleIndex> {
        self.iter().map(Rule::origin).collect()
    }
}

impl fmt::Display for RulePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RulePool({} rules, {} script bytes)",
            self.rules.len(),
            self.text.used(),
        )
    }
}
