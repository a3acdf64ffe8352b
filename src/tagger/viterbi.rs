use tracing::{debug, debug_span};

use super::cost::CostFunction;
use crate::error::TaggerError;
use crate::lattice::{Lattice, NodeId, UNREACHABLE};

/// Forward pass: give every alive node the cost of its best path from BOS
/// and a back-pointer to the predecessor on that path.
///
/// Ties keep the first predecessor in `end_nodes` order.
pub(crate) fn forward(lattice: &mut Lattice, cost_fn: &dyn CostFunction) -> Result<(), TaggerError> {
    let len = lattice.len();
    let _span = debug_span!("viterbi_forward", len).entered();
    let bos = lattice
        .bos
        .ok_or_else(|| TaggerError::NotReady("lattice has no BOS node".to_string()))?;
    let eos = lattice
        .eos
        .ok_or_else(|| TaggerError::NotReady("lattice has no EOS node".to_string()))?;
    lattice.nodes[bos.index()].cost = 0;

    for pos in 0..=len {
        for &next_id in &lattice.begin_nodes[pos] {
            let next = &lattice.nodes[next_id.index()];
            if !next.alive {
                continue;
            }
            let word = cost_fn.word_cost(next);
            let mut best = UNREACHABLE;
            let mut best_prev = None;
            for &prev_id in &lattice.end_nodes[pos] {
                let prev = &lattice.nodes[prev_id.index()];
                if !prev.is_reachable() {
                    continue;
                }
                let total = prev.cost + cost_fn.transition_cost(prev, next) + word;
                if total < best {
                    best = total;
                    best_prev = Some(prev_id);
                }
            }
            let next = &mut lattice.nodes[next_id.index()];
            next.cost = best;
            next.prev = best_prev;
        }
    }

    let eos_cost = lattice.nodes[eos.index()].cost;
    if eos_cost == UNREACHABLE {
        debug!("EOS unreachable");
        return Err(TaggerError::Unsatisfiable);
    }
    debug!(eos_cost);
    Ok(())
}

/// Follow back-pointers from EOS. Returns the path BOS..=EOS and its cost.
pub(crate) fn best_path(lattice: &Lattice) -> Option<(Vec<NodeId>, i64)> {
    let eos = lattice.eos?;
    let cost = lattice.nodes[eos.index()].cost;
    if cost == UNREACHABLE {
        return None;
    }
    let mut path = vec![eos];
    let mut cur = lattice.nodes[eos.index()].prev;
    while let Some(id) = cur {
        path.push(id);
        cur = lattice.nodes[id.index()].prev;
    }
    path.reverse();
    Some((path, cost))
}
