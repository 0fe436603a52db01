use prio_rules::script::NoScripts;
use prio_rules::{value, RulePool};

fn main() -> Result<(), prio_rules::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Deny-before-allow: lower priority numbers are evaluated first.
    let users = [
        ("Banned user", 1_u32, 30_u32),
        ("Normal user", 0, 25),
        ("Underage user", 0, 15),
    ];
    for (label, banned, age) in users {
        let mut pool = RulePool::new();
        pool.add_expr_rule(10, &value(age).gte(18_u32))?; // allow
        pool.add_expr_rule(0, &value(banned).eq(1_u32))?; // deny
        pool.sort_rules();

        let mut out = [false; 2];
        let results = pool.evaluate_all_rules(&NoScripts, &mut out)?;
        println!("{label}: results in priority order {results:?}");

        match pool.first_match(&NoScripts) {
            Some(verdict) => println!("{label}: {verdict}"),
            None => println!("{label}: no match"),
        }
    }

    // Equal priorities keep insertion order.
    let mut pool = RulePool::new();
    for priority in [5_u8, 1, 5, 0] {
        pool.add_expr_rule(priority, &value(1_u32))?;
    }
    pool.sort_rules();
    let order: Vec<String> = pool
        .evaluation_order()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Evaluation order by insertion slot: {}", order.join(", "));

    println!("{}", pool.evaluate_detailed(&NoScripts));
    Ok(())
}
