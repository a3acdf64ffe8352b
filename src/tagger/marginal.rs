//! Forward-backward over the alive subgraph in log space.
//!
//! A path's weight is `exp(-theta * cost)`; `alpha` sums the weights of BOS
//! prefixes ending in a node (its own word cost included), `beta` the
//! weights of suffixes after it up to EOS.

use tracing::debug_span;

use super::cost::CostFunction;
use crate::lattice::Lattice;

/// `ln(exp(a) + exp(b))` without overflow.
fn log_add(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a > b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// Fill `alpha`, `beta` and `prob` of every alive node. Returns the log
/// partition value `ln Z`, or `None` if BOS/EOS are missing.
pub(crate) fn forward_backward(
    lattice: &mut Lattice,
    cost_fn: &dyn CostFunction,
    theta: f64,
) -> Option<f64> {
    let len = lattice.len();
    let _span = debug_span!("forward_backward", len, theta).entered();
    let (bos, eos) = (lattice.bos?, lattice.eos?);

    for n in &mut lattice.nodes {
        n.alpha = f64::NEG_INFINITY;
        n.beta = f64::NEG_INFINITY;
        n.prob = 0.0;
    }
    lattice.nodes[bos.index()].alpha = 0.0;
    lattice.nodes[eos.index()].beta = 0.0;

    for pos in 0..=len {
        for &next_id in &lattice.begin_nodes[pos] {
            let next = &lattice.nodes[next_id.index()];
            if !next.alive {
                continue;
            }
            let word = cost_fn.word_cost(next);
            let mut alpha = f64::NEG_INFINITY;
            for &prev_id in &lattice.end_nodes[pos] {
                let prev = &lattice.nodes[prev_id.index()];
                if !prev.alive {
                    continue;
                }
                let cost = cost_fn.transition_cost(prev, next) + word;
                alpha = log_add(alpha, prev.alpha - theta * cost as f64);
            }
            lattice.nodes[next_id.index()].alpha = alpha;
        }
    }

    for pos in (0..=len).rev() {
        for &prev_id in &lattice.end_nodes[pos] {
            let prev = &lattice.nodes[prev_id.index()];
            if !prev.alive {
                continue;
            }
            let mut beta = f64::NEG_INFINITY;
            for &next_id in &lattice.begin_nodes[pos] {
                let next = &lattice.nodes[next_id.index()];
                if !next.alive {
                    continue;
                }
                let cost = cost_fn.transition_cost(prev, next) + cost_fn.word_cost(next);
                beta = log_add(beta, next.beta - theta * cost as f64);
            }
            lattice.nodes[prev_id.index()].beta = beta;
        }
    }

    let z = lattice.nodes[eos.index()].alpha;
    for n in &mut lattice.nodes {
        if n.alive && n.linked {
            n.prob = (n.alpha + n.beta - z).exp();
        }
    }
    Some(z)
}
