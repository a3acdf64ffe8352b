use crate::lattice::Node;
use crate::model::ModelData;

/// Trait for scoring lattice paths during search.
pub(crate) trait CostFunction: Send + Sync {
    fn word_cost(&self, node: &Node) -> i64;
    fn transition_cost(&self, prev: &Node, next: &Node) -> i64;
}

impl CostFunction for ModelData {
    fn word_cost(&self, node: &Node) -> i64 {
        i64::from(node.wcost)
    }

    fn transition_cost(&self, prev: &Node, next: &Node) -> i64 {
        // Attributes are validated before any node is linked.
        let cost = self.matrix().get(prev.right_attr.0, next.left_attr.0);
        debug_assert!(cost.is_some(), "unvalidated attribute pair");
        cost.map_or(0, i64::from)
    }
}
