use super::*;
use crate::dict::connection::ConnectionMatrix;
use crate::dict::{DictEntry, TrieDictionary};
use crate::lattice::{BoundaryConstraint, ANY_FEATURE};
use crate::testutil::{ab_model, ja_model};

const MO_NOUN: &str = "名詞,一般,*,*,*,*,も,モ,モ";
const MO_PARTICLE: &str = "助詞,係助詞,*,*,*,*,も,モ,モ";

fn parse_with(model: &Model, text: &str, setup: impl FnOnce(&mut Lattice)) -> (Lattice, Result<(), TaggerError>) {
    let tagger = model.create_tagger();
    let mut lattice = tagger.create_lattice();
    lattice.set_sentence(text);
    setup(&mut lattice);
    let result = tagger.parse(&mut lattice);
    (lattice, result)
}

#[test]
fn test_token_boundary_forces_split() {
    let model = ab_model();
    let (lattice, result) = parse_with(&model, "ab", |l| {
        l.set_boundary_constraint(1, BoundaryConstraint::TokenBoundary)
            .unwrap();
    });
    result.unwrap();
    assert_eq!(surfaces(&lattice), vec!["a", "b"]);
    assert_eq!(lattice.path_cost(), Some(9));

    let ab = lattice.nodes().find(|n| n.surface() == "ab").unwrap();
    assert!(!ab.is_alive());
}

#[test]
fn test_inside_token_forbids_split() {
    let model = ab_model();
    let (lattice, result) = parse_with(&model, "ba", |l| {
        l.set_boundary_constraint(1, BoundaryConstraint::InsideToken)
            .unwrap();
    });
    // no "ba" entry: nothing may end or begin at 1
    assert_eq!(result, Err(TaggerError::Unsatisfiable));
    assert!(!lattice.is_available());
    assert_eq!(
        lattice.what(),
        Some(TaggerError::Unsatisfiable.to_string().as_str())
    );

    let (lattice, result) = parse_with(&model, "ab", |l| {
        l.set_boundary_constraint(1, BoundaryConstraint::InsideToken)
            .unwrap();
    });
    result.unwrap();
    assert_eq!(surfaces(&lattice), vec!["ab"]);
}

#[test]
fn test_constraint_setters_add_partial() {
    let model = ab_model();
    let mut lattice = model.create_lattice();
    lattice.set_sentence("ab");
    assert!(!lattice.has_request_type(RequestKind::Partial));

    lattice
        .set_boundary_constraint(2, BoundaryConstraint::TokenBoundary)
        .unwrap();
    assert!(lattice.has_request_type(RequestKind::Partial));
    assert_eq!(
        lattice.boundary_constraint(2),
        BoundaryConstraint::TokenBoundary
    );
    assert_eq!(lattice.boundary_constraint(1), BoundaryConstraint::Any);
    assert_eq!(lattice.boundary_constraint(99), BoundaryConstraint::Any);
}

#[test]
fn test_constraint_positions_are_validated() {
    let model = ab_model();
    let mut lattice = model.create_lattice();
    assert_eq!(
        lattice.set_boundary_constraint(0, BoundaryConstraint::TokenBoundary),
        Err(TaggerError::SentenceUnset)
    );

    lattice.set_sentence("aあ");
    assert_eq!(
        lattice.set_boundary_constraint(9, BoundaryConstraint::TokenBoundary),
        Err(TaggerError::PositionOutOfRange { pos: 9, len: 4 })
    );
    assert_eq!(
        lattice.set_boundary_constraint(2, BoundaryConstraint::TokenBoundary),
        Err(TaggerError::NotCharBoundary(2))
    );
    assert_eq!(
        lattice.set_feature_constraint(1, 1, "X"),
        Err(TaggerError::InvalidRange {
            begin: 1,
            end: 1,
            len: 4
        })
    );
    assert_eq!(
        lattice.set_feature_constraint(0, 3, "X"),
        Err(TaggerError::NotCharBoundary(3))
    );
    assert_eq!(
        lattice.set_feature_constraint(0, 5, "X"),
        Err(TaggerError::PositionOutOfRange { pos: 5, len: 4 })
    );
}

#[test]
fn test_conflicting_feature_constraints() {
    let model = ab_model();
    let mut lattice = model.create_lattice();
    lattice.set_sentence("abab");
    lattice.set_feature_constraint(0, 2, "X").unwrap();
    lattice.set_feature_constraint(0, 2, "X").unwrap();
    assert_eq!(lattice.feature_constraint(0, 2), Some("X"));

    assert_eq!(
        lattice.set_feature_constraint(0, 2, "Y"),
        Err(TaggerError::ConflictingConstraint { begin: 0, end: 2 })
    );
    assert_eq!(
        lattice.set_feature_constraint(1, 3, "X"),
        Err(TaggerError::ConflictingConstraint { begin: 1, end: 3 })
    );
    // adjacent spans do not overlap
    lattice.set_feature_constraint(2, 4, "Y").unwrap();
}

#[test]
fn test_feature_constraint_selects_matching_entry() {
    let model = ja_model();
    let (lattice, result) = parse_with(&model, "もも", |l| {
        l.set_feature_constraint(0, 3, MO_NOUN).unwrap();
    });
    result.unwrap();

    // unconstrained best is "もも"; the constraint fixes も(noun) first
    assert_eq!(surfaces(&lattice), vec!["も", "も"]);
    assert_eq!(features(&lattice), vec![MO_NOUN, MO_PARTICLE]);
    assert_eq!(lattice.path_cost(), Some(4950));

    let competing: Vec<_> = lattice
        .begin_nodes(0)
        .filter(|n| n.end() == 3)
        .map(|n| (n.feature().to_string(), n.is_alive()))
        .collect();
    assert_eq!(
        competing,
        vec![(MO_PARTICLE.to_string(), false), (MO_NOUN.to_string(), true)]
    );
}

#[test]
fn test_feature_constraint_forces_feature() {
    let model = ab_model();
    let (lattice, result) = parse_with(&model, "ab", |l| {
        l.set_feature_constraint(0, 2, "FORCED").unwrap();
    });
    result.unwrap();
    assert_eq!(lattice.to_string().unwrap(), "ab\tFORCED\nEOS\n");

    let node = lattice.iter_nodes().nth(1).unwrap();
    assert_eq!(node.feature_fields(), vec!["FORCED"]);
}

#[test]
fn test_feature_constraint_synthesizes_missing_node() {
    let model = ab_model();
    let (lattice, result) = parse_with(&model, "abb", |l| {
        l.set_feature_constraint(1, 3, "BB").unwrap();
    });
    result.unwrap();

    assert_eq!(surfaces(&lattice), vec!["a", "bb"]);
    assert_eq!(features(&lattice), vec!["A", "BB"]);
    let bb = lattice.iter_nodes().nth(2).unwrap();
    assert_eq!(bb.status(), NodeStatus::Unknown);
    assert_eq!(lattice.path_cost(), Some(5 + 10000));
}

#[test]
fn test_synthesized_node_is_reused_on_reparse() {
    let model = ab_model();
    let tagger = model.create_tagger();
    let mut lattice = tagger.create_lattice();
    lattice.set_sentence("abb");
    lattice.set_feature_constraint(1, 3, "BB").unwrap();
    tagger.parse(&mut lattice).unwrap();
    let count = lattice.nodes().count();

    tagger.parse(&mut lattice).unwrap();
    assert_eq!(lattice.nodes().count(), count);
    assert_eq!(surfaces(&lattice), vec!["a", "bb"]);
}

#[test]
fn test_any_feature_constrains_boundaries_only() {
    let model = ab_model();
    let (lattice, result) = parse_with(&model, "ab", |l| {
        l.set_feature_constraint(0, 1, ANY_FEATURE).unwrap();
    });
    result.unwrap();
    assert_eq!(surfaces(&lattice), vec!["a", "b"]);
    assert_eq!(features(&lattice), vec!["A", "B"]);
}

#[test]
fn test_any_feature_without_candidate_uses_unknown_feature() {
    let model = ab_model();
    let (lattice, result) = parse_with(&model, "abb", |l| {
        l.set_feature_constraint(1, 3, ANY_FEATURE).unwrap();
    });
    result.unwrap();
    assert_eq!(features(&lattice), vec!["A", "UNK"]);
}

#[test]
fn test_constraints_added_between_parses() {
    let model = ab_model();
    let tagger = model.create_tagger();
    let mut lattice = tagger.create_lattice();
    lattice.set_sentence("ab");
    tagger.parse(&mut lattice).unwrap();
    assert_eq!(surfaces(&lattice), vec!["ab"]);

    lattice
        .set_boundary_constraint(1, BoundaryConstraint::TokenBoundary)
        .unwrap();
    tagger.parse(&mut lattice).unwrap();
    assert_eq!(surfaces(&lattice), vec!["a", "b"]);

    // a new sentence drops the constraint
    lattice.set_sentence("ab");
    tagger.parse(&mut lattice).unwrap();
    assert_eq!(surfaces(&lattice), vec!["ab"]);
}

#[test]
fn test_matching_feature_wins_among_duplicates() {
    let dict = TrieDictionary::from_entries(vec![(
        "x".to_string(),
        vec![DictEntry::new("X1", 1, 0, 0), DictEntry::new("X2", 10, 0, 0)],
    )])
    .unwrap();
    let model = Model::new(dict, ConnectionMatrix::zeros(1)).unwrap();

    assert_eq!(features(&parsed(&model, "x")), vec!["X1"]);
    let (lattice, result) = parse_with(&model, "x", |l| {
        l.set_feature_constraint(0, 1, "X2").unwrap();
    });
    result.unwrap();
    assert_eq!(features(&lattice), vec!["X2"]);
    assert_eq!(lattice.path_cost(), Some(10));
}
