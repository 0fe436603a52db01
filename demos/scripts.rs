use prio_rules::script::{from_fn, ScriptError};
use prio_rules::{script, value, RulePool};

fn main() -> Result<(), prio_rules::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut pool = RulePool::new();
    let weekend = pool.text_mut().add_fragment("return is_weekend()")?;
    let broken = pool.text_mut().add_fragment("return undefined_fn()")?;

    pool.add_expr_rule(1, &script(weekend).and(value(3_u32).lt(5_u32)))?;
    pool.add_expr_rule(0, &script(broken).or(value(0_u32)))?;
    pool.sort_rules();

    // Stand-in for an embedded interpreter: knows one global function.
    let runner = from_fn(|src| match src {
        "return is_weekend()" => Ok(true),
        other => Err(ScriptError::Failed(format!("attempt to call a nil value in {other:?}"))),
    });

    let report = pool.evaluate_detailed(&runner);
    for verdict in report.verdicts() {
        println!("{verdict}");
    }
    match report.first_match() {
        Some(verdict) => println!("First match: rule {}", verdict.rule()),
        None => println!("First match: none"),
    }

    Ok(())
}
