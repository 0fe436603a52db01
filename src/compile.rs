use crate::types::{BranchOp, Expr, LogicOp, Node, NodeIndex, NodePool, PoolError, TextPool};

/// Never populated, so a missing operand is rejected by the pool's range check.
const MISSING: NodeIndex = NodeIndex::new(u32::MAX);

enum Step<'e> {
    Enter(&'e Expr),
    Exit(BranchOp),
}

/// Lower `expr` into `pool` post-order, so every operand lands in a lower
/// slot than the branch that refers to it. Returns the root's index.
///
/// Walks with an explicit stack; expression depth is bounded only by memory.
pub(crate) fn lower(
    pool: &mut NodePool,
    expr: &Expr,
    text: &TextPool,
) -> Result<NodeIndex, PoolError> {
    let mut steps = vec![Step::Enter(expr)];
    let mut operands: Vec<NodeIndex> = Vec::new();

    while let Some(step) = steps.pop() {
        let index = match step {
            Step::Enter(Expr::Value(v)) => pool.add_value_node(*v)?,
            Step::Enter(Expr::Script(offset)) => pool.add_script_node(text, *offset)?,
            Step::Enter(Expr::Compare { op, left, right }) => {
                enter_binary(&mut steps, (*op).into(), left, right);
                continue;
            }
            Step::Enter(Expr::And(a, b)) => {
                enter_binary(&mut steps, LogicOp::And.into(), a, b);
                continue;
            }
            Step::Enter(Expr::Or(a, b)) => {
                enter_binary(&mut steps, LogicOp::Or.into(), a, b);
                continue;
            }
            Step::Enter(Expr::Not(inner)) => {
                steps.push(Step::Exit(BranchOp::Not));
                steps.push(Step::Enter(inner));
                continue;
            }
            Step::Exit(BranchOp::Not) => {
                let operand = operands.pop().unwrap_or(MISSING);
                pool.add_branch_node(BranchOp::Not, operand, operand)?
            }
            Step::Exit(op) => {
                let right = operands.pop().unwrap_or(MISSING);
                let left = operands.pop().unwrap_or(MISSING);
                pool.add_branch_node(op, left, right)?
            }
        };
        operands.push(index);
    }

    let root = operands.pop().unwrap_or(MISSING);
    pool.check_operand(root)?;
    Ok(root)
}

fn enter_binary<'e>(steps: &mut Vec<Step<'e>>, op: BranchOp, left: &'e Expr, right: &'e Expr) {
    steps.push(Step::Exit(op));
    steps.push(Step::Enter(right));
    steps.push(Step::Enter(left));
}

/// Whether a comparison sits directly over two value leaves of one kind.
fn is_well_typed_comparison(pool: &NodePool, left: NodeIndex, right: NodeIndex) -> bool {
    match (pool.get(left), pool.get(right)) {
        (Some(Node::Value(a)), Some(Node::Value(b))) => a.kind() == b.kind(),
        _ => false,
    }
}

/// Walk a tree and collect every comparison that would fail its operand
/// check at evaluation time, in index order.
pub(crate) fn mismatched_comparisons(pool: &NodePool, root: NodeIndex) -> Vec<NodeIndex> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(index) = stack.pop() {
        match pool.get(index) {
            Some(Node::Compare { left, right, .. }) => {
                if !is_well_typed_comparison(pool, *left, *right) {
                    out.push(index);
                }
            }
            Some(Node::Logic { left, right, .. }) => {
                stack.push(*right);
                stack.push(*left);
            }
            Some(Node::Not(operand)) => stack.push(*operand),
            _ => {}
        }
    }
    out.sort_unstable();
    out
}
