use std::fmt;

use super::arena::{Arena, DEFAULT_CAPACITY};
use super::error::{EvalError, PoolError};
use super::expr::{BranchOp, CompareOp, Expr, LogicOp};
use super::text_pool::{TextOffset, TextPool};
use super::value::Value;
use crate::script::{ScriptContext, ScriptId};

/// Slot index of a node inside a [`NodePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeIndex(u32);

impl NodeIndex {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One expression-tree node. The kind never changes once written.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Node {
    /// Unallocated slot. Never a legal operand.
    #[default]
    Undefined,
    Value(Value),
    Script {
        id: ScriptId,
        offset: TextOffset,
    },
    Compare {
        op: CompareOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Logic {
        op: LogicOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Not(NodeIndex),
}

static UNDEFINED: Node = Node::Undefined;

impl Node {
    /// Short human-readable kind, used in type mismatch reports.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Undefined => "undefined node",
            Node::Value(Value::U32(_)) => "u32 value",
            Node::Value(Value::I32(_)) => "i32 value",
            Node::Value(Value::F32(_)) => "f32 value",
            Node::Script { .. } => "script leaf",
            Node::Compare { .. } => "comparison",
            Node::Logic { .. } => "logical branch",
            Node::Not(_) => "negation",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Undefined => write!(f, "undefined"),
            Node::Value(v) => write!(f, "{v}"),
            Node::Script { id, offset } => write!(f, "script {id}@{offset}"),
            Node::Compare { op, left, right } => write!(f, "#{left} {op} #{right}"),
            Node::Logic { op, left, right } => write!(f, "#{left} {op} #{right}"),
            Node::Not(operand) => write!(f, "NOT #{operand}"),
        }
    }
}

/// Growable arena holding the nodes of one rule's expression tree.
///
/// Nodes refer to each other by [`NodeIndex`]. Branch operands must already be
/// populated when the branch is added, so a tree can only point backwards and
/// is always acyclic. Index 0 is an ordinary slot.
///
/// The pool also carries a sticky evaluation error: cleared at the start of
/// [`evaluate_tree`](Self::evaluate_tree), set by the first failing node.
#[derive(Debug, Clone)]
pub struct NodePool {
    nodes: Arena<Node>,
    pub(crate) error: Option<EvalError>,
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

impl NodePool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Arena::with_capacity("node", nodes),
            error: None,
        }
    }

    /// Append a value leaf.
    ///
    /// # Errors
    ///
    /// [`PoolError::AllocationFailure`] if the pool cannot grow.
    pub fn add_value_node(&mut self, value: impl Into<Value>) -> Result<NodeIndex, PoolError> {
        self.push(Node::Value(value.into()))
    }

    /// Append a script leaf referring to a fragment already stored in `text`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`] if `offset` is outside the used region
    /// of `text`, [`PoolError::MisalignedOffset`] if it falls inside a
    /// multi-byte character, or [`PoolError::AllocationFailure`].
    pub fn add_script_node(
        &mut self,
        text: &TextPool,
        offset: TextOffset,
    ) -> Result<NodeIndex, PoolError> {
        let source = match text.fragment(offset) {
            Some(source) => source,
            None if text.contains(offset) => {
                return Err(PoolError::MisalignedOffset {
                    offset: offset.get(),
                })
            }
            None => {
                return Err(PoolError::IndexOutOfRange {
                    what: "text offset",
                    index: offset.get(),
                    used: text.used(),
                })
            }
        };
        self.push(Node::Script {
            id: ScriptId::of(source),
            offset,
        })
    }

    /// Append a comparison, logical, or negation node over existing operands.
    ///
    /// For [`BranchOp::Not`] the operand is `left`; `right` is ignored.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`] if an operand is not populated yet, or
    /// [`PoolError::AllocationFailure`].
    pub fn add_branch_node(
        &mut self,
        op: BranchOp,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Result<NodeIndex, PoolError> {
        self.check_operand(left)?;
        let node = match op {
            BranchOp::Not => Node::Not(left),
            BranchOp::Compare(op) => {
                self.check_operand(right)?;
                Node::Compare { op, left, right }
            }
            BranchOp::Logic(op) => {
                self.check_operand(right)?;
                Node::Logic { op, left, right }
            }
        };
        self.push(node)
    }

    /// Join two existing nodes under a new branch and return the branch.
    ///
    /// ```
    /// use prio_rules::{CompareOp, LogicOp, NodePool};
    ///
    /// let mut pool = NodePool::new();
    /// let a = pool.add_value_node(3_u32).unwrap();
    /// let b = pool.add_value_node(2_u32).unwrap();
    /// let gt = pool.bind(CompareOp::Gt, a, b).unwrap();
    /// let both = pool.bind(LogicOp::And, gt, a).unwrap();
    /// assert_eq!(both.get(), 3);
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`add_branch_node`](Self::add_branch_node).
    pub fn bind(
        &mut self,
        op: impl Into<BranchOp>,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Result<NodeIndex, PoolError> {
        self.add_branch_node(op.into(), left, right)
    }

    /// Lower an [`Expr`] into this pool and return the index of its root.
    ///
    /// # Errors
    ///
    /// Any construction error from the individual `add_*` calls. Nodes added
    /// before the failure stay in the pool but are unreachable from any root.
    pub fn push_expr(&mut self, expr: &Expr, text: &TextPool) -> Result<NodeIndex, PoolError> {
        crate::compile::lower(self, expr, text)
    }

    /// Comparisons reachable from `root` that do not sit directly over two
    /// value leaves of the same kind. Each would record a type mismatch when
    /// evaluated.
    #[must_use]
    pub fn mismatched_comparisons(&self, root: NodeIndex) -> Vec<NodeIndex> {
        crate::compile::mismatched_comparisons(self, root)
    }

    /// The node at `index`, or `None` if the slot is unpopulated.
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    /// The node at `index`; unpopulated slots read as [`Node::Undefined`].
    #[inline]
    pub(crate) fn node(&self, index: NodeIndex) -> &Node {
        self.nodes.get(index.0).unwrap_or(&UNDEFINED)
    }

    /// Iterate over populated slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        (0_u32..)
            .zip(self.nodes.as_slice())
            .map(|(i, node)| (NodeIndex(i), node))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Double the pool capacity.
    ///
    /// # Errors
    ///
    /// [`PoolError::AllocationFailure`] if the allocation fails.
    pub fn grow(&mut self) -> Result<(), PoolError> {
        self.nodes.grow()
    }

    /// The sticky error left by the last evaluation, if any.
    #[must_use]
    pub fn error(&self) -> Option<&EvalError> {
        self.error.as_ref()
    }

    /// Resolve one node to a boolean without clearing the sticky error.
    pub fn evaluate_node(&mut self, index: NodeIndex, scripts: &ScriptContext<'_>) -> bool {
        crate::evaluate::evaluate_node(self, index, scripts)
    }

    /// Clear the sticky error and evaluate the tree rooted at `root`.
    ///
    /// A `false` result is only a genuine negative verdict when
    /// [`error`](Self::error) is `None` afterwards.
    pub fn evaluate_tree(&mut self, root: NodeIndex, scripts: &ScriptContext<'_>) -> bool {
        crate::evaluate::evaluate_tree(self, root, scripts)
    }

    pub(crate) fn check_operand(&self, index: NodeIndex) -> Result<(), PoolError> {
        if (index.0 as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(PoolError::IndexOutOfRange {
                what: "node",
                index: index.0,
                used: self.nodes.len(),
            })
        }
    }

    fn push(&mut self, node: Node) -> Result<NodeIndex, PoolError> {
        self.nodes.push(node).map(NodeIndex)
    }
}
