//! Lazy N-best enumeration by A* search from EOS back to BOS.
//!
//! The forward Viterbi cost of each node is an exact heuristic for the
//! remaining distance to BOS, so paths pop off the queue in non-decreasing
//! total cost.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::debug;

use super::cost::CostFunction;
use crate::lattice::{Lattice, NodeId, NodeStatus};

// A partial path is a linked list through `paths`, from the node nearest
// BOS back towards EOS:
//
// QueueItem -> SearchPath (node: n) -> SearchPath (node: n+1) -> ... -> EOS
#[derive(Debug)]
struct SearchPath {
    node: NodeId,
    /// Entry for the following node (towards EOS).
    prev: Option<usize>,
    /// Cost from this node (exclusive of its own word cost) to EOS.
    backward_cost: i64,
}

#[derive(Debug, PartialEq, Eq)]
struct QueueItem {
    /// f(x) = g(x) + h(x): backward cost plus the node's forward cost.
    priority: i64,
    /// Insertion order; breaks priority ties deterministically.
    seq: u64,
    path: usize,
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.seq).cmp(&(other.priority, other.seq))
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Enumerator state kept on the lattice between `Lattice::next` calls.
#[derive(Debug)]
pub(crate) struct NBestEnumerator {
    paths: Vec<SearchPath>,
    queue: BinaryHeap<Reverse<QueueItem>>,
    seq: u64,
    emitted: usize,
}

impl NBestEnumerator {
    pub fn new(eos: NodeId, eos_cost: i64) -> Self {
        let mut enumerator = Self {
            paths: Vec::new(),
            queue: BinaryHeap::new(),
            seq: 0,
            emitted: 0,
        };
        enumerator.push(eos, None, 0, eos_cost);
        enumerator
    }

    fn push(&mut self, node: NodeId, prev: Option<usize>, backward_cost: i64, forward_cost: i64) {
        let path = self.paths.len();
        self.paths.push(SearchPath {
            node,
            prev,
            backward_cost,
        });
        self.queue.push(Reverse(QueueItem {
            priority: backward_cost + forward_cost,
            seq: self.seq,
            path,
        }));
        self.seq += 1;
    }

    /// The next complete path, BOS..=EOS, with its total cost.
    pub fn next_path(
        &mut self,
        lattice: &Lattice,
        cost_fn: &dyn CostFunction,
    ) -> Option<(Vec<NodeId>, i64)> {
        while let Some(Reverse(item)) = self.queue.pop() {
            let current = &self.paths[item.path];
            let node = &lattice.nodes[current.node.index()];

            if node.status == NodeStatus::Bos {
                let mut path = Vec::new();
                let mut p = Some(item.path);
                while let Some(idx) = p {
                    path.push(self.paths[idx].node);
                    p = self.paths[idx].prev;
                }
                self.emitted += 1;
                debug!(rank = self.emitted, cost = item.priority, "nbest path");
                return Some((path, item.priority));
            }

            let backward = current.backward_cost + cost_fn.word_cost(node);
            for &left_id in &lattice.end_nodes[node.begin] {
                let left = &lattice.nodes[left_id.index()];
                if !left.is_reachable() {
                    continue;
                }
                let g = backward + cost_fn.transition_cost(left, node);
                self.push(left_id, Some(item.path), g, left.cost);
            }
        }
        None
    }
}
