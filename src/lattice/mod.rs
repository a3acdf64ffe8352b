//! Per-request lattice: the sentence, its node arena, request flags,
//! constraints and decode results.
//!
//! Nodes live in a `Vec<Node>` addressed by [`NodeId`]. For every byte offset
//! `0..=len` the lattice keeps the ids of nodes beginning and ending there;
//! the same chains are also threaded through each node's `bnext`/`enext`.

mod constraint;
mod iter;
mod node;
mod request_type;
pub(crate) mod writer;

pub use constraint::{BoundaryConstraint, ANY_FEATURE};
pub use iter::{NodeIter, NodeRevIter};
pub use node::{Attribute, Node, NodeId, NodeRef, NodeStatus, UNREACHABLE};
pub use request_type::{RequestKind, RequestType};

pub(crate) use constraint::{effective_boundaries, span_allowed, FeatureConstraints};
pub(crate) use node::NodeOrigin;

use std::sync::Arc;

use tracing::debug;

use crate::error::TaggerError;
use crate::model::{Model, ModelData};
use crate::tagger::nbest::NBestEnumerator;

pub struct Lattice {
    model: Arc<ModelData>,
    sentence: Option<String>,
    pub(crate) nodes: Vec<Node>,
    /// begin_nodes[i] = ids of linked nodes that begin at byte offset i
    pub(crate) begin_nodes: Vec<Vec<NodeId>>,
    /// end_nodes[i] = ids of linked nodes that end at byte offset i
    pub(crate) end_nodes: Vec<Vec<NodeId>>,
    pub(crate) bos: Option<NodeId>,
    pub(crate) eos: Option<NodeId>,
    pub(crate) built: bool,
    request: RequestType,
    what: Option<String>,
    pub(crate) boundaries: Vec<BoundaryConstraint>,
    pub(crate) features: FeatureConstraints,
    theta: f64,
    z: Option<f64>,
    available: bool,
    result: Option<String>,
    pub(crate) nbest: Option<NBestEnumerator>,
    path: Vec<NodeId>,
    path_cost: Option<i64>,
}

impl Lattice {
    /// Create an empty lattice bound to the model's current data.
    pub fn new(model: &Model) -> Self {
        Self::with_data(model.snapshot())
    }

    pub(crate) fn with_data(model: Arc<ModelData>) -> Self {
        let request = model.default_request_type();
        let theta = model.default_theta();
        Self {
            model,
            sentence: None,
            nodes: Vec::new(),
            begin_nodes: Vec::new(),
            end_nodes: Vec::new(),
            bos: None,
            eos: None,
            built: false,
            request,
            what: None,
            boundaries: Vec::new(),
            features: FeatureConstraints::default(),
            theta,
            z: None,
            available: false,
            result: None,
            nbest: None,
            path: Vec::new(),
            path_cost: None,
        }
    }

    /// Reset the graph and constraints and record a new sentence.
    pub fn set_sentence(&mut self, sentence: impl Into<String>) {
        let sentence = sentence.into();
        self.reset();
        self.boundaries = vec![BoundaryConstraint::Any; sentence.len() + 1];
        self.sentence = Some(sentence);
    }

    /// Drop the sentence, graph and constraints. Request flags and theta persist.
    pub fn clear(&mut self) {
        self.reset();
        self.sentence = None;
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.begin_nodes.clear();
        self.end_nodes.clear();
        self.bos = None;
        self.eos = None;
        self.built = false;
        self.what = None;
        self.boundaries.clear();
        self.features.clear();
        self.z = None;
        self.available = false;
        self.result = None;
        self.nbest = None;
        self.path.clear();
        self.path_cost = None;
    }

    pub fn sentence(&self) -> Option<&str> {
        self.sentence.as_deref()
    }

    /// Sentence length in bytes (0 when unset).
    pub fn len(&self) -> usize {
        self.sentence.as_ref().map_or(0, String::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn request_type(&self) -> RequestType {
        self.request
    }

    pub fn set_request_type(&mut self, request: impl Into<RequestType>) {
        self.request = request.into();
    }

    pub fn add_request_type(&mut self, request: impl Into<RequestType>) {
        self.request.insert(request);
    }

    pub fn remove_request_type(&mut self, request: impl Into<RequestType>) {
        self.request.remove(request);
    }

    pub fn has_request_type(&self, kind: RequestKind) -> bool {
        self.request.contains(kind)
    }

    fn check_position(&self, pos: usize) -> Result<&str, TaggerError> {
        let sentence = self.sentence.as_deref().ok_or(TaggerError::SentenceUnset)?;
        if pos > sentence.len() {
            return Err(TaggerError::PositionOutOfRange {
                pos,
                len: sentence.len(),
            });
        }
        if !sentence.is_char_boundary(pos) {
            return Err(TaggerError::NotCharBoundary(pos));
        }
        Ok(sentence)
    }

    /// Constraint at `pos`; `Any` when no sentence is set or `pos` is out of range.
    pub fn boundary_constraint(&self, pos: usize) -> BoundaryConstraint {
        self.boundaries.get(pos).copied().unwrap_or_default()
    }

    pub fn set_boundary_constraint(
        &mut self,
        pos: usize,
        constraint: BoundaryConstraint,
    ) -> Result<(), TaggerError> {
        self.check_position(pos)?;
        self.boundaries[pos] = constraint;
        self.request.insert(RequestKind::Partial);
        Ok(())
    }

    pub fn feature_constraint(&self, begin: usize, end: usize) -> Option<&str> {
        self.features.get(begin, end)
    }

    /// Force `feature` on every node exactly spanning `[begin, end)`.
    ///
    /// [`ANY_FEATURE`] constrains boundaries only.
    pub fn set_feature_constraint(
        &mut self,
        begin: usize,
        end: usize,
        feature: impl Into<String>,
    ) -> Result<(), TaggerError> {
        let len = self.check_position(end)?.len();
        if begin >= end {
            return Err(TaggerError::InvalidRange { begin, end, len });
        }
        self.check_position(begin)?;
        self.features.insert(begin, end, feature.into())?;
        self.request.insert(RequestKind::Partial);
        Ok(())
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn set_theta(&mut self, theta: f64) {
        self.theta = theta;
    }

    /// Log partition value from the last marginal decode.
    pub fn z(&self) -> Option<f64> {
        self.z
    }

    pub fn set_z(&mut self, z: f64) {
        self.z = Some(z);
    }

    /// Whether the last parse succeeded.
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn what(&self) -> Option<&str> {
        self.what.as_deref()
    }

    pub fn set_what(&mut self, what: impl Into<String>) {
        self.what = Some(what.into());
    }

    /// Override what [`Lattice::to_string`] returns until the next sentence.
    pub fn set_result(&mut self, result: impl Into<String>) {
        self.result = Some(result.into());
    }

    /// Generation of the model data the lattice was last parsed with.
    pub fn model_generation(&self) -> u64 {
        self.model.generation()
    }

    /// Allocate an unlinked node for the caller to fill in through
    /// [`Lattice::node_mut`]. It joins the graph on the next parse.
    pub fn new_node(&mut self) -> NodeId {
        self.alloc(Node::new(
            0,
            0,
            Attribute::default(),
            Attribute::default(),
            0,
            String::new(),
            NodeStatus::Normal,
            NodeOrigin::External,
        ))
    }

    /// Mutable access to a node allocated by [`Lattice::new_node`] or
    /// `Model::lookup` that has not been linked yet.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .filter(|n| n.origin == NodeOrigin::External && !n.linked)
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then(|| NodeRef::new(self, id))
    }

    /// Every node in allocation order, linked or not.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |i| NodeRef::new(self, NodeId(i)))
    }

    pub fn bos_node(&self) -> Option<NodeRef<'_>> {
        self.bos.map(|id| NodeRef::new(self, id))
    }

    pub fn eos_node(&self) -> Option<NodeRef<'_>> {
        self.eos.map(|id| NodeRef::new(self, id))
    }

    /// Linked nodes beginning at `pos`, in insertion order.
    pub fn begin_nodes(&self, pos: usize) -> impl Iterator<Item = NodeRef<'_>> {
        self.begin_nodes
            .get(pos)
            .into_iter()
            .flatten()
            .map(move |&id| NodeRef::new(self, id))
    }

    /// Linked nodes ending at `pos`, in insertion order.
    pub fn end_nodes(&self, pos: usize) -> impl Iterator<Item = NodeRef<'_>> {
        self.end_nodes
            .get(pos)
            .into_iter()
            .flatten()
            .map(move |&id| NodeRef::new(self, id))
    }

    /// The current path from BOS to EOS.
    pub fn iter_nodes(&self) -> NodeIter<'_> {
        NodeIter::new(self, self.bos.filter(|_| self.available))
    }

    /// The current path from EOS back to BOS.
    pub fn iter_nodes_rev(&self) -> NodeRevIter<'_> {
        NodeRevIter::new(self, self.eos.filter(|_| self.available))
    }

    /// Total cost of the currently linked path.
    pub fn path_cost(&self) -> Option<i64> {
        self.path_cost
    }

    /// Probability of the currently linked path; requires a marginal decode.
    pub fn path_probability(&self) -> Option<f64> {
        let z = self.z?;
        let cost = self.path_cost?;
        Some((-self.theta * cost as f64 - z).exp())
    }

    /// Advance to the next-ranked path. The first call after a parse yields
    /// the best path again.
    ///
    /// Returns false once the paths are exhausted, when N-best was not
    /// requested, or when no parse has succeeded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if !self.available {
            self.what = Some("no successful parse to enumerate".to_string());
            return false;
        }
        if !self.has_request_type(RequestKind::NBest) {
            self.what = Some("N-best enumeration was not requested".to_string());
            return false;
        }
        let Some(mut enumerator) = self.nbest.take() else {
            return false;
        };
        let model = Arc::clone(&self.model);
        let found = enumerator.next_path(self, model.as_ref());
        self.nbest = Some(enumerator);
        match found {
            Some((path, cost)) => {
                self.link_path(path, cost);
                true
            }
            None => {
                debug!("nbest exhausted");
                false
            }
        }
    }

    /// Render up to `n` successive paths, then the end-of-N-best format.
    pub fn enum_nbest_as_string(&mut self, n: usize) -> Result<String, TaggerError> {
        if !self.available {
            return Err(TaggerError::NotReady("no successful parse".to_string()));
        }
        if !self.has_request_type(RequestKind::NBest) {
            return Err(TaggerError::NotReady(
                "N-best enumeration was not requested".to_string(),
            ));
        }
        let model = Arc::clone(&self.model);
        let mut out = String::new();
        for _ in 0..n {
            if !self.next() {
                break;
            }
            writer::write_path(self, &model, &mut out)?;
        }
        writer::write_eon(self, &model, &mut out);
        Ok(out)
    }

    /// Render the current path, or the override set by [`Lattice::set_result`].
    pub fn to_string(&self) -> Result<String, TaggerError> {
        if let Some(result) = &self.result {
            return Ok(result.clone());
        }
        if !self.available {
            return Err(TaggerError::NotReady("no successful parse".to_string()));
        }
        let mut out = String::new();
        writer::write_path(self, &self.model, &mut out)?;
        Ok(out)
    }

    // --- decode plumbing ---

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Append a node to the begin/end chains of its offsets.
    pub(crate) fn link(&mut self, id: NodeId) {
        let (begin, end, status) = {
            let n = &self.nodes[id.0];
            (n.begin, n.end, n.status)
        };
        // Lookup chains are dropped; the lists own the links from here on.
        self.nodes[id.0].bnext = None;
        self.nodes[id.0].enext = None;
        if status != NodeStatus::Bos {
            if let Some(&tail) = self.begin_nodes[begin].last() {
                self.nodes[tail.0].bnext = Some(id);
            }
            self.begin_nodes[begin].push(id);
        }
        if status != NodeStatus::Eos {
            if let Some(&tail) = self.end_nodes[end].last() {
                self.nodes[tail.0].enext = Some(id);
            }
            self.end_nodes[end].push(id);
        }
        self.nodes[id.0].linked = true;
    }

    /// Prepare for a parse with `model`: clear decode state, and rebuild from
    /// scratch when the model data changed since the graph was built. Nodes
    /// injected by the caller survive a rebuild.
    pub(crate) fn begin_parse(&mut self, model: Arc<ModelData>) {
        if !Arc::ptr_eq(&self.model, &model) {
            self.model = model;
            if self.built {
                // Ids stay stable: stale nodes are retired in place.
                for n in &mut self.nodes {
                    if n.origin != NodeOrigin::External {
                        n.origin = NodeOrigin::Retired;
                        n.alive = false;
                    }
                    n.linked = false;
                    n.bnext = None;
                    n.enext = None;
                }
                self.bos = None;
                self.eos = None;
                self.built = false;
            }
        }
        if !self.built {
            let slots = self.len() + 1;
            self.begin_nodes = vec![Vec::new(); slots];
            self.end_nodes = vec![Vec::new(); slots];
        }
        for n in &mut self.nodes {
            n.reset_decode_state();
        }
        self.available = false;
        self.what = None;
        self.z = None;
        self.nbest = None;
        self.path.clear();
        self.path_cost = None;
    }

    pub(crate) fn finish_parse(&mut self, result: &Result<(), TaggerError>) {
        match result {
            Ok(()) => self.available = true,
            Err(e) => {
                self.available = false;
                self.what = Some(e.to_string());
            }
        }
    }

    /// Make `path` (BOS..=EOS) the current path.
    pub(crate) fn link_path(&mut self, path: Vec<NodeId>, cost: i64) {
        for id in std::mem::take(&mut self.path) {
            let n = &mut self.nodes[id.0];
            n.is_best = false;
            n.next = None;
        }
        for pair in path.windows(2) {
            self.nodes[pair[0].0].next = Some(pair[1]);
            self.nodes[pair[1].0].prev = Some(pair[0]);
        }
        for id in &path {
            self.nodes[id.0].is_best = true;
        }
        self.path = path;
        self.path_cost = Some(cost);
    }
}

impl std::fmt::Debug for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lattice")
            .field("sentence", &self.sentence)
            .field("nodes", &self.nodes.len())
            .field("request", &self.request)
            .field("available", &self.available)
            .field("what", &self.what)
            .finish()
    }
}
