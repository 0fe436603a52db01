use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::script::{ScriptContext, ScriptRunner};
use crate::types::{
    BatchError, CompareOp, EvalError, EvaluationReport, LogicOp, Node, NodeIndex, NodePool, Rule,
    TextPool, Verdict,
};

pub(crate) fn evaluate_tree(
    pool: &mut NodePool,
    root: NodeIndex,
    scripts: &ScriptContext<'_>,
) -> bool {
    pool.error = None;
    evaluate_node(pool, root, scripts)
}

/// Pending work of a tree walk. Branches are expanded onto the step stack so
/// tree depth never grows the call stack.
enum Step {
    Visit(NodeIndex),
    Combine(LogicOp),
    Negate,
}

pub(crate) fn evaluate_node(
    pool: &mut NodePool,
    index: NodeIndex,
    scripts: &ScriptContext<'_>,
) -> bool {
    let mut steps = vec![Step::Visit(index)];
    let mut results: Vec<bool> = Vec::new();

    while let Some(step) = steps.pop() {
        let result = match step {
            Step::Visit(index) => match *pool.node(index) {
                Node::Value(v) => v.is_truthy(),
                Node::Script { id, offset } => match scripts.run(id, offset) {
                    Ok(result) => result,
                    Err(source) => {
                        record(pool, EvalError::Script { node: index, source });
                        false
                    }
                },
                Node::Compare { op, left, right } => eval_compare(pool, index, op, left, right),
                Node::Logic { op, left, right } => {
                    // No short-circuit: both subtrees run so either side's error is
                    // recorded. Left is pushed last so it runs first.
                    steps.push(Step::Combine(op));
                    steps.push(Step::Visit(right));
                    steps.push(Step::Visit(left));
                    continue;
                }
                Node::Not(operand) => {
                    steps.push(Step::Negate);
                    steps.push(Step::Visit(operand));
                    continue;
                }
                Node::Undefined => {
                    record(
                        pool,
                        EvalError::TypeMismatch {
                            node: index,
                            expected: "populated node",
                            found: Node::Undefined.kind_name(),
                        },
                    );
                    false
                }
            },
            Step::Combine(op) => {
                let right = results.pop().unwrap_or(false);
                let left = results.pop().unwrap_or(false);
                match op {
                    LogicOp::And => left && right,
                    LogicOp::Or => left || right,
                }
            }
            Step::Negate => !results.pop().unwrap_or(false),
        };
        results.push(result);
    }

    results.pop().unwrap_or(false)
}

/// Comparisons only look one level down: both operands must be value leaves.
fn eval_compare(
    pool: &mut NodePool,
    index: NodeIndex,
    op: CompareOp,
    left: NodeIndex,
    right: NodeIndex,
) -> bool {
    let (a, b) = match (*pool.node(left), *pool.node(right)) {
        (Node::Value(a), Node::Value(b)) => (a, b),
        (Node::Value(_), other) | (other, _) => {
            record(
                pool,
                EvalError::TypeMismatch {
                    node: index,
                    expected: "value leaf",
                    found: other.kind_name(),
                },
            );
            return false;
        }
    };

    match a.compare(op, b) {
        Some(result) => result,
        None => {
            record(
                pool,
                EvalError::TypeMismatch {
                    node: index,
                    expected: Node::Value(a).kind_name(),
                    found: Node::Value(b).kind_name(),
                },
            );
            false
        }
    }
}

/// Keep the first error of a walk; later ones are only traced.
fn record(pool: &mut NodePool, err: EvalError) {
    if pool.error.is_none() {
        pool.error = Some(err);
    } else {
        trace!(error = %err, "secondary evaluation error suppressed");
    }
}

pub(crate) fn evaluate_rule(rule: &mut Rule, text: &TextPool, runner: &dyn ScriptRunner) -> bool {
    let scripts = ScriptContext::new(text, runner);
    let result = evaluate_tree(&mut rule.nodes, rule.root, &scripts);
    rule.error = rule.nodes.error.clone();

    match &rule.error {
        Some(err) => warn!(
            rule = %rule.origin,
            priority = rule.priority,
            error = %err,
            "rule evaluation failed; verdict is untrusted"
        ),
        None => debug!(rule = %rule.origin, priority = rule.priority, result, "rule evaluated"),
    }
    result
}

/// Evaluate every rule in slot order into `out`. Nothing runs when `out` is
/// too short.
pub(crate) fn evaluate_all(
    rules: &mut [Rule],
    text: &TextPool,
    runner: &dyn ScriptRunner,
    out: &mut [bool],
) -> Result<usize, BatchError> {
    if out.len() < rules.len() {
        return Err(BatchError::BufferTooSmall {
            required: rules.len(),
            capacity: out.len(),
        });
    }
    for (slot, rule) in out.iter_mut().zip(rules.iter_mut()) {
        *slot = evaluate_rule(rule, text, runner);
    }
    Ok(rules.len())
}

pub(crate) fn evaluate_detailed(
    rules: &mut [Rule],
    text: &TextPool,
    runner: &dyn ScriptRunner,
) -> EvaluationReport {
    let start = Instant::now();
    let verdicts = rules
        .iter_mut()
        .map(|rule| {
            let result = evaluate_rule(rule, text, runner);
            Verdict::new(rule.origin, rule.priority, result, rule.error.clone())
        })
        .collect();
    EvaluationReport::new(verdicts, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{from_fn, NoScripts, ScriptError};
    use crate::types::{BranchOp, Value};

    fn eval(pool: &mut NodePool, root: NodeIndex) -> bool {
        let text = TextPool::new();
        let scripts = ScriptContext::new(&text, &NoScripts);
        pool.evaluate_tree(root, &scripts)
    }

    fn compare(
        a: impl Into<Value>,
        op: CompareOp,
        b: impl Into<Value>,
    ) -> (bool, Option<EvalError>) {
        let mut pool = NodePool::new();
        let l = pool.add_value_node(a).unwrap();
        let r = pool.add_value_node(b).unwrap();
        let root = pool.bind(op, l, r).unwrap();
        let result = eval(&mut pool, root);
        (result, pool.error().cloned())
    }

    #[test]
    fn value_leaf_is_truthy() {
        let mut pool = NodePool::new();
        let zero = pool.add_value_node(0_u32).unwrap();
        let seven = pool.add_value_node(7_i32).unwrap();
        assert!(!eval(&mut pool, zero));
        assert!(eval(&mut pool, seven));
        assert!(pool.error().is_none());
    }

    #[test]
    fn all_compare_ops_on_signed() {
        let cases = [
            (9_i32, CompareOp::Eq, 10_i32, false),
            (10, CompareOp::Eq, 10, true),
            (9, CompareOp::Neq, 10, true),
            (10, CompareOp::Gt, 5, true),
            (10, CompareOp::Gte, 10, true),
            (10, CompareOp::Gte, 11, false),
            (-10, CompareOp::Lt, 20, true),
            (10, CompareOp::Lte, 10, true),
            (10, CompareOp::Lte, -9, false),
        ];
        for (lhs, op, rhs, expected) in cases {
            assert_eq!(compare(lhs, op, rhs), (expected, None), "{lhs} {op} {rhs}");
        }
    }

    #[test]
    fn nan_comparisons() {
        let nan = f32::NAN;
        for op in [CompareOp::Eq, CompareOp::Gt, CompareOp::Gte, CompareOp::Lt, CompareOp::Lte] {
            assert_eq!(compare(nan, op, 1.0_f32), (false, None), "{op}");
        }
        assert_eq!(compare(nan, CompareOp::Neq, nan), (true, None));
    }

    #[test]
    fn kind_mismatch_is_type_error() {
        let (result, err) = compare(1_u32, CompareOp::Eq, 1_i32);
        assert!(!result);
        assert_eq!(
            err,
            Some(EvalError::TypeMismatch {
                node: NodeIndex::new(2),
                expected: "u32 value",
                found: "i32 value",
            })
        );
    }

    #[test]
    fn comparison_over_branch_is_type_error() {
        let mut pool = NodePool::new();
        let a = pool.add_value_node(3_u32).unwrap();
        let b = pool.add_value_node(2_u32).unwrap();
        let inner = pool.bind(CompareOp::Gt, a, b).unwrap();
        let root = pool.bind(CompareOp::Eq, inner, a).unwrap();

        assert!(!eval(&mut pool, root));
        assert_eq!(
            pool.error(),
            Some(&EvalError::TypeMismatch {
                node: root,
                expected: "value leaf",
                found: "comparison",
            })
        );
    }

    #[test]
    fn right_operand_kind_is_reported() {
        let mut pool = NodePool::new();
        let a = pool.add_value_node(3_u32).unwrap();
        let not = pool.add_branch_node(BranchOp::Not, a, a).unwrap();
        let root = pool.bind(CompareOp::Gt, a, not).unwrap();

        assert!(!eval(&mut pool, root));
        assert!(matches!(
            pool.error(),
            Some(EvalError::TypeMismatch { found: "negation", .. })
        ));
    }

    #[test]
    fn undefined_root_is_type_error() {
        let mut pool = NodePool::new();
        assert!(!eval(&mut pool, NodeIndex::new(0)));
        assert_eq!(
            pool.error(),
            Some(&EvalError::TypeMismatch {
                node: NodeIndex::new(0),
                expected: "populated node",
                found: "undefined node",
            })
        );
    }

    #[test]
    fn and_evaluates_both_sides() {
        let mut text = TextPool::new();
        let bad = text.add_fragment("error('boom')").unwrap();
        let calls = std::cell::Cell::new(0);
        let runner = from_fn(|src| {
            calls.set(calls.get() + 1);
            if src.starts_with("error") {
                Err(ScriptError::Failed("boom".into()))
            } else {
                Ok(true)
            }
        });
        let good = text.add_fragment("return true").unwrap();

        let mut pool = NodePool::new();
        let failing = pool.add_script_node(&text, bad).unwrap();
        let passing = pool.add_script_node(&text, good).unwrap();
        let root = pool.bind(LogicOp::And, failing, passing).unwrap();

        let scripts = ScriptContext::new(&text, &runner);
        assert!(!pool.evaluate_tree(root, &scripts));
        assert_eq!(calls.get(), 2);
        assert_eq!(
            pool.error(),
            Some(&EvalError::Script {
                node: failing,
                source: ScriptError::Failed("boom".into()),
            })
        );
    }

    #[test]
    fn or_true_still_records_error() {
        let mut pool = NodePool::new();
        let one = pool.add_value_node(1_u32).unwrap();
        let mixed_l = pool.add_value_node(1_i32).unwrap();
        let bad = pool.bind(CompareOp::Eq, one, mixed_l).unwrap();
        let root = pool.bind(LogicOp::Or, one, bad).unwrap();

        assert!(eval(&mut pool, root));
        assert!(matches!(pool.error(), Some(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn first_error_wins() {
        let mut pool = NodePool::new();
        let u = pool.add_value_node(1_u32).unwrap();
        let i = pool.add_value_node(1_i32).unwrap();
        let first = pool.bind(CompareOp::Eq, u, i).unwrap();
        let second = pool.bind(CompareOp::Eq, first, u).unwrap();
        let root = pool.bind(LogicOp::And, first, second).unwrap();

        eval(&mut pool, root);
        assert!(matches!(
            pool.error(),
            Some(EvalError::TypeMismatch { node, .. }) if *node == first
        ));
    }

    #[test]
    fn not_complements_operand() {
        let mut pool = NodePool::new();
        let zero = pool.add_value_node(0_u32).unwrap();
        let not = pool.add_branch_node(BranchOp::Not, zero, zero).unwrap();
        let not_not = pool.add_branch_node(BranchOp::Not, not, not).unwrap();
        assert!(eval(&mut pool, not));
        assert!(!eval(&mut pool, not_not));
    }

    #[test]
    fn tree_evaluation_resets_sticky_error() {
        let mut pool = NodePool::new();
        let one = pool.add_value_node(1_u32).unwrap();
        let same = pool.bind(CompareOp::Eq, one, one).unwrap();
        let other = pool.add_value_node(1.0_f32).unwrap();
        let mismatch = pool.bind(CompareOp::Eq, one, other).unwrap();

        assert!(eval(&mut pool, same));
        assert!(pool.error().is_none());
        assert!(!eval(&mut pool, mismatch));
        assert!(pool.error().is_some());
        assert!(eval(&mut pool, one));
        assert!(pool.error().is_none());
    }

    #[test]
    fn evaluate_node_keeps_sticky_error() {
        let mut pool = NodePool::new();
        let u = pool.add_value_node(1_u32).unwrap();
        let f = pool.add_value_node(1.0_f32).unwrap();
        let bad = pool.bind(CompareOp::Eq, u, f).unwrap();
        let text = TextPool::new();
        let scripts = ScriptContext::new(&text, &NoScripts);

        assert!(!pool.evaluate_node(bad, &scripts));
        assert!(pool.evaluate_node(u, &scripts));
        assert!(pool.error().is_some());
    }

    #[test]
    fn missing_fragment_is_script_error() {
        let mut source_text = TextPool::new();
        let offset = source_text.add_fragment("return true").unwrap();
        let mut pool = NodePool::new();
        let leaf = pool.add_script_node(&source_text, offset).unwrap();

        let empty = TextPool::new();
        let runner = from_fn(|_| Ok(true));
        let scripts = ScriptContext::new(&empty, &runner);
        assert!(!pool.evaluate_tree(leaf, &scripts));
        assert_eq!(
            pool.error(),
            Some(&EvalError::Script {
                node: leaf,
                source: ScriptError::MissingFragment { offset },
            })
        );
    }
}
