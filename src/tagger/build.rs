use tracing::{debug, debug_span};

use crate::error::TaggerError;
use crate::lattice::{Lattice, Node, NodeId, NodeOrigin, NodeStatus};
use crate::model::ModelData;

/// Feature carried by the BOS and EOS sentinels.
pub(crate) const BOS_EOS_FEATURE: &str = "BOS/EOS";

/// Populate the begin/end lists: BOS, every dictionary match at every
/// character boundary (plus unknown-word fallbacks), then EOS.
pub(crate) fn build_graph(model: &ModelData, lattice: &mut Lattice) {
    let len = lattice.len();
    let _span = debug_span!("build_graph", len).entered();
    let attr = model.bos_eos_attr();

    let bos = lattice.alloc(Node::new(
        0,
        0,
        attr,
        attr,
        0,
        BOS_EOS_FEATURE.to_string(),
        NodeStatus::Bos,
        NodeOrigin::Sentinel,
    ));
    lattice.link(bos);
    lattice.bos = Some(bos);

    let offsets: Vec<usize> = lattice
        .sentence()
        .map(|s| s.char_indices().map(|(i, _)| i).collect())
        .unwrap_or_default();
    for begin in offsets {
        for id in model.lookup_into(lattice, begin, len, NodeOrigin::Dictionary) {
            lattice.link(id);
        }
    }

    let eos = lattice.alloc(Node::new(
        len,
        len,
        attr,
        attr,
        0,
        BOS_EOS_FEATURE.to_string(),
        NodeStatus::Eos,
        NodeOrigin::Sentinel,
    ));
    lattice.link(eos);
    lattice.eos = Some(eos);
    lattice.built = true;

    debug!(node_count = lattice.nodes.len());
}

/// Validate and link caller-injected nodes that are not in the graph yet.
pub(crate) fn link_external(model: &ModelData, lattice: &mut Lattice) -> Result<usize, TaggerError> {
    let pending: Vec<NodeId> = lattice
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.origin == NodeOrigin::External && !n.linked)
        .map(|(i, _)| NodeId(i))
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let sentence = lattice.sentence().unwrap_or("");
    for &id in &pending {
        let n = &lattice.nodes[id.index()];
        let reason = if n.begin >= n.end || n.end > sentence.len() {
            Some(format!(
                "span {}..{} is empty or outside a sentence of {} bytes",
                n.begin,
                n.end,
                sentence.len()
            ))
        } else if !sentence.is_char_boundary(n.begin) || !sentence.is_char_boundary(n.end) {
            Some(format!("span {}..{} splits a character", n.begin, n.end))
        } else if n.is_sentinel() {
            Some("BOS/EOS status is reserved".to_string())
        } else if !model.attrs_in_range(n.left_attr, n.right_attr) {
            Some(format!(
                "attributes ({}, {}) exceed matrix size {}",
                n.left_attr.0,
                n.right_attr.0,
                model.num_ids()
            ))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(TaggerError::InvalidNode {
                id: id.index(),
                reason,
            });
        }
    }

    for &id in &pending {
        lattice.link(id);
    }
    debug!(linked = pending.len(), "external nodes linked");
    Ok(pending.len())
}
