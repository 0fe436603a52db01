use prio_rules::script::NoScripts;
use prio_rules::{value, RulePool};

fn main() -> Result<(), prio_rules::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // age >= 18 AND balance > 0.0
    let eligible = value(25_u32).gte(18_u32).and(value(12.5_f32).gt(0.0_f32));
    println!("rule: {eligible}");

    let mut pool = RulePool::new();
    let idx = pool.add_expr_rule(0, &eligible)?;
    println!("{pool}");

    let result = pool.evaluate_rule(idx, &NoScripts)?;
    match pool.get(idx).and_then(|rule| rule.error()) {
        Some(err) => println!("Result: untrusted ({err})"),
        None => println!("Result: {result}"),
    }

    // Mixing kinds is a type mismatch, not a panic.
    let mixed = pool.add_expr_rule(0, &value(1_u32).eq(1_i32))?;
    pool.evaluate_rule(mixed, &NoScripts)?;
    if let Some(err) = pool.get(mixed).and_then(|rule| rule.error()) {
        println!("Mixed kinds: {err}");
    }

    Ok(())
}
