mod constraints;

use super::*;
use crate::lattice::{NodeId, NodeStatus};

/// Surfaces along the current path, sentinels excluded.
pub(super) fn surfaces(lattice: &Lattice) -> Vec<String> {
    lattice
        .iter_nodes()
        .filter(|n| !matches!(n.status(), NodeStatus::Bos | NodeStatus::Eos))
        .map(|n| n.surface().to_string())
        .collect()
}

pub(super) fn features(lattice: &Lattice) -> Vec<String> {
    lattice
        .iter_nodes()
        .filter(|n| !matches!(n.status(), NodeStatus::Bos | NodeStatus::Eos))
        .map(|n| n.feature().to_string())
        .collect()
}

pub(super) fn parsed(model: &Model, text: &str) -> Lattice {
    let tagger = model.create_tagger();
    let mut lattice = tagger.create_lattice();
    lattice.set_sentence(text);
    tagger.parse(&mut lattice).unwrap();
    lattice
}
