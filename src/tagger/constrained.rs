//! Boundary and feature constraints applied to a built lattice.
//!
//! Constraints never change costs; they mark nodes dead so the search skips
//! them, force features onto surviving nodes, and synthesize a node where a
//! constrained span has no candidate at all.

use tracing::debug;

use crate::lattice::{
    effective_boundaries, span_allowed, BoundaryConstraint, Lattice, Node, NodeId, NodeOrigin,
    ANY_FEATURE,
};
use crate::model::ModelData;

pub(crate) fn apply_constraints(model: &ModelData, lattice: &mut Lattice) {
    for n in &mut lattice.nodes {
        n.forced_feature = None;
        n.alive = !matches!(n.origin, NodeOrigin::Constraint | NodeOrigin::Retired);
    }
    if lattice.features.is_empty()
        && lattice
            .boundaries
            .iter()
            .all(|c| *c == BoundaryConstraint::Any)
    {
        return;
    }

    let boundaries = effective_boundaries(&lattice.boundaries, &lattice.features);
    let mut killed = 0usize;
    for ids in &lattice.begin_nodes {
        for id in ids {
            let n = &mut lattice.nodes[id.index()];
            if n.is_sentinel() || !n.alive {
                continue;
            }
            if !span_allowed(&boundaries, n.begin, n.end) {
                n.alive = false;
                killed += 1;
            }
        }
    }

    let spans: Vec<(usize, usize, String)> = lattice
        .features
        .iter()
        .map(|(b, e, f)| (b, e, f.to_string()))
        .collect();
    for (begin, end, feature) in spans {
        let spanning: Vec<NodeId> = lattice.begin_nodes[begin]
            .iter()
            .copied()
            .filter(|id| {
                let n = &lattice.nodes[id.index()];
                n.end == end && n.alive
            })
            .collect();

        if spanning.is_empty() {
            let forced = (feature != ANY_FEATURE).then_some(feature);
            synthesize(model, lattice, &boundaries, begin, end, forced);
            continue;
        }
        if feature == ANY_FEATURE {
            continue;
        }

        let any_matching = spanning
            .iter()
            .any(|id| lattice.nodes[id.index()].feature == feature);
        for id in spanning {
            let n = &mut lattice.nodes[id.index()];
            if any_matching {
                if n.feature != feature {
                    n.alive = false;
                    killed += 1;
                }
            } else {
                n.forced_feature = Some(feature.clone());
            }
        }
    }
    debug!(killed, "constraints applied");
}

/// Revive the constraint node over `[begin, end)` from an earlier pass, or
/// allocate and link a new unknown-word node there.
fn synthesize(
    model: &ModelData,
    lattice: &mut Lattice,
    boundaries: &[BoundaryConstraint],
    begin: usize,
    end: usize,
    feature: Option<String>,
) {
    let feature = feature.unwrap_or_else(|| model.unknown().feature.clone());
    let existing = lattice.begin_nodes[begin].iter().copied().find(|id| {
        let n = &lattice.nodes[id.index()];
        n.origin == NodeOrigin::Constraint && n.end == end
    });
    let id = match existing {
        Some(id) => id,
        None => {
            let node: Node = model.unknown_node(begin, end, NodeOrigin::Constraint);
            let id = lattice.alloc(node);
            lattice.link(id);
            id
        }
    };
    let n = &mut lattice.nodes[id.index()];
    n.feature = feature;
    n.alive = span_allowed(boundaries, begin, end);
    debug!(begin, end, reused = existing.is_some(), "constraint node");
}
