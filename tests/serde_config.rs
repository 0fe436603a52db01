#![cfg(feature = "serde")]

use prio_rules::{value, CompareOp, NodeIndex, PoolConfig, RulePool, Value};

#[test]
fn config_from_json() {
    let config: PoolConfig =
        serde_json::from_str(r#"{"node_capacity": 16, "text_capacity": 4096}"#).unwrap();
    assert_eq!(config.node_capacity, 16);
    assert_eq!(config.text_capacity, 4096);
    assert_eq!(config.rule_capacity, 256);

    let pool = RulePool::with_config(config);
    assert_eq!(pool.node_pool().capacity(), 16);
    assert_eq!(pool.text().capacity(), 4096);
}

#[test]
fn empty_object_is_default_config() {
    let config: PoolConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, PoolConfig::default());
}

#[test]
fn config_round_trips() {
    let config = PoolConfig::new().with_rule_capacity(3);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(
        serde_json::from_str::<PoolConfig>(&json).unwrap(),
        config
    );
}

#[test]
fn values_and_operators_serialize_by_name() {
    assert_eq!(serde_json::to_string(&Value::I32(-4)).unwrap(), r#"{"I32":-4}"#);
    assert_eq!(serde_json::to_string(&CompareOp::Gte).unwrap(), r#""Gte""#);
    assert_eq!(serde_json::to_string(&NodeIndex::new(7)).unwrap(), "7");

    let v: Value = serde_json::from_str(r#"{"U32":9}"#).unwrap();
    assert_eq!(v, Value::U32(9));
    // Values stay usable in rules after the trip.
    let mut pool = RulePool::new();
    pool.add_expr_rule(0, &value(v).gt(8_u32)).unwrap();
    assert_eq!(pool.evaluate_all(&prio_rules::script::NoScripts), vec![true]);
}
