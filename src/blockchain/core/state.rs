use std::collections::HashSet;

use super::chain::Ledger;

/// The replicated state of one node: chain, pending pool and known peers.
///
/// Owned by a single `Node` and only touched while its lock is held.
#[derive(Debug, Clone, Default)]
pub struct NodeState {
    pub ledger: Ledger,
    nodes: HashSet<String>,
}

impl NodeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knows(&self, address: &str) -> bool {
        self.nodes.contains(address)
    }

    /// Add a peer; returns false if it was already known.
    pub fn add_node(&mut self, address: String) -> bool {
        self.nodes.insert(address)
    }

    pub fn replace_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.nodes = nodes.into_iter().collect();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Known peers in a stable (sorted) order.
    pub fn node_list(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.nodes.iter().cloned().collect();
        nodes.sort();
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_deduplicates() {
        let mut state = NodeState::new();
        assert!(state.add_node("127.0.0.1:5001".to_string()));
        assert!(!state.add_node("127.0.0.1:5001".to_string()));
        assert_eq!(state.node_count(), 1);
        assert!(state.knows("127.0.0.1:5001"));
    }

    #[test]
    fn test_replace_nodes_deduplicates_and_sorts() {
        let mut state = NodeState::new();
        state.add_node("old:1".to_string());
        state.replace_nodes(vec!["b:2".to_string(), "a:1".to_string(), "b:2".to_string()]);
        assert_eq!(state.node_list(), vec!["a:1".to_string(), "b:2".to_string()]);
        assert!(!state.knows("old:1"));
    }

    #[test]
    fn test_fresh_state_has_genesis_only() {
        let state = NodeState::new();
        assert_eq!(state.ledger.len(), 1);
        assert_eq!(state.node_count(), 0);
    }
}
