use super::arena::DEFAULT_CAPACITY;

/// Starting capacities for the pools a [`RulePool`](super::RulePool) creates.
///
/// Every pool doubles on demand, so these only size the first allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Nodes per rule's node pool.
    pub node_capacity: usize,
    /// Bytes in the shared script-text pool.
    pub text_capacity: usize,
    /// Rules in the rule pool.
    pub rule_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_CAPACITY,
            text_capacity: DEFAULT_CAPACITY,
            rule_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_node_capacity(mut self, nodes: usize) -> Self {
        self.node_capacity = nodes;
        self
    }

    #[must_use]
    pub fn with_text_capacity(mut self, bytes: usize) -> Self {
        self.text_capacity = bytes;
        self
    }

    #[must_use]
    pub fn with_rule_capacity(mut self, rules: usize) -> Self {
        self.rule_capacity = rules;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_256() {
        let config = PoolConfig::default();
        assert_eq!(config.node_capacity, 256);
        assert_eq!(config.text_capacity, 256);
        assert_eq!(config.rule_capacity, 256);
    }

    #[test]
    fn setters_chain() {
        let config = PoolConfig::new()
            .with_node_capacity(8)
            .with_text_capacity(1024)
            .with_rule_capacity(2);
        assert_eq!(
            config,
            PoolConfig {
                node_capacity: 8,
                text_capacity: 1024,
                rule_capacity: 2,
            }
        );
    }
}
