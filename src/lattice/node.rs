use std::ops::Deref;

use super::Lattice;
use crate::feature::parse_feature;

/// Cumulative cost of a node no alive path reaches.
pub const UNREACHABLE: i64 = i64::MAX;

/// Index of a node inside its lattice's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Connection attribute id (left or right context class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Attribute(pub u16);

impl From<u16> for Attribute {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Normal,
    Unknown,
    Bos,
    Eos,
}

impl NodeStatus {
    /// Numeric code used by `%s` in output templates.
    pub fn code(self) -> u8 {
        match self {
            NodeStatus::Normal => 0,
            NodeStatus::Unknown => 1,
            NodeStatus::Bos => 2,
            NodeStatus::Eos => 3,
        }
    }
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeOrigin {
    Sentinel,
    Dictionary,
    /// Allocated by `new_node` or `Model::lookup` on behalf of the caller.
    External,
    /// Synthesized to satisfy a feature constraint no dictionary node spans.
    Constraint,
    /// Built against model data that has since been replaced; never relinked.
    Retired,
}

/// One candidate morpheme over the byte range `[begin, end)` of the sentence.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) begin: usize,
    pub(crate) end: usize,
    pub(crate) left_attr: Attribute,
    pub(crate) right_attr: Attribute,
    pub(crate) wcost: i32,
    pub(crate) cost: i64,
    pub(crate) feature: String,
    pub(crate) forced_feature: Option<String>,
    pub(crate) status: NodeStatus,
    pub(crate) origin: NodeOrigin,
    pub(crate) alive: bool,
    pub(crate) linked: bool,
    pub(crate) is_best: bool,
    pub(crate) alpha: f64,
    pub(crate) beta: f64,
    pub(crate) prob: f64,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) enext: Option<NodeId>,
    pub(crate) bnext: Option<NodeId>,
}

impl Node {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        begin: usize,
        end: usize,
        left_attr: Attribute,
        right_attr: Attribute,
        wcost: i32,
        feature: String,
        status: NodeStatus,
        origin: NodeOrigin,
    ) -> Self {
        Self {
            begin,
            end,
            left_attr,
            right_attr,
            wcost,
            cost: UNREACHABLE,
            feature,
            forced_feature: None,
            status,
            origin,
            alive: true,
            linked: false,
            is_best: false,
            alpha: 0.0,
            beta: 0.0,
            prob: 0.0,
            prev: None,
            next: None,
            enext: None,
            bnext: None,
        }
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Surface length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn left_attr(&self) -> Attribute {
        self.left_attr
    }

    pub fn right_attr(&self) -> Attribute {
        self.right_attr
    }

    /// Emission (word) cost.
    pub fn wcost(&self) -> i32 {
        self.wcost
    }

    /// Cumulative cost of the best path from BOS through this node, or
    /// [`UNREACHABLE`].
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// The feature string, with any feature constraint applied.
    pub fn feature(&self) -> &str {
        self.forced_feature.as_deref().unwrap_or(&self.feature)
    }

    /// CSV fields of [`Node::feature`].
    pub fn feature_fields(&self) -> Vec<String> {
        parse_feature(self.feature())
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn is_best(&self) -> bool {
        self.is_best
    }

    /// Whether the node survived the last constraint pass.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the node is part of the lattice graph (false for freshly
    /// injected nodes until the next parse).
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Marginal probability; only meaningful after a parse with
    /// `RequestKind::MarginalProb`.
    pub fn prob(&self) -> f64 {
        self.prob
    }

    pub fn prev_id(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next_id(&self) -> Option<NodeId> {
        self.next
    }

    pub fn enext_id(&self) -> Option<NodeId> {
        self.enext
    }

    pub fn bnext_id(&self) -> Option<NodeId> {
        self.bnext
    }

    pub fn set_span(&mut self, begin: usize, end: usize) {
        self.begin = begin;
        self.end = end;
    }

    pub fn set_attributes(&mut self, left: impl Into<Attribute>, right: impl Into<Attribute>) {
        self.left_attr = left.into();
        self.right_attr = right.into();
    }

    pub fn set_wcost(&mut self, wcost: i32) {
        self.wcost = wcost;
    }

    pub fn set_feature(&mut self, feature: impl Into<String>) {
        self.feature = feature.into();
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }

    pub(crate) fn is_sentinel(&self) -> bool {
        matches!(self.status, NodeStatus::Bos | NodeStatus::Eos)
    }

    pub(crate) fn is_reachable(&self) -> bool {
        self.alive && self.cost != UNREACHABLE
    }

    /// Drop every per-decode field; structure (span, attrs, links) stays.
    pub(crate) fn reset_decode_state(&mut self) {
        self.cost = UNREACHABLE;
        self.is_best = false;
        self.alpha = 0.0;
        self.beta = 0.0;
        self.prob = 0.0;
        self.prev = None;
        self.next = None;
    }
}

/// A read handle to a node, scoped to the lattice that owns it.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    lattice: &'a Lattice,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(lattice: &'a Lattice, id: NodeId) -> Self {
        Self { lattice, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn lattice(&self) -> &'a Lattice {
        self.lattice
    }

    pub fn node(&self) -> &'a Node {
        &self.lattice.nodes[self.id.0]
    }

    /// The covered slice of the sentence (empty for BOS/EOS).
    pub fn surface(&self) -> &'a str {
        let node = self.node();
        self.lattice
            .sentence()
            .and_then(|s| s.get(node.begin..node.end))
            .unwrap_or("")
    }

    pub fn prev(&self) -> Option<NodeRef<'a>> {
        self.node().prev.map(|id| NodeRef::new(self.lattice, id))
    }

    pub fn next(&self) -> Option<NodeRef<'a>> {
        self.node().next.map(|id| NodeRef::new(self.lattice, id))
    }

    pub fn enext(&self) -> Option<NodeRef<'a>> {
        self.node().enext.map(|id| NodeRef::new(self.lattice, id))
    }

    pub fn bnext(&self) -> Option<NodeRef<'a>> {
        self.node().bnext.map(|id| NodeRef::new(self.lattice, id))
    }
}

impl Deref for NodeRef<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.node()
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("surface", &self.surface())
            .field("feature", &self.feature())
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("cost", &self.cost)
            .finish()
    }
}
