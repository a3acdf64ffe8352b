//! The shared model: dictionary layers, connection matrix and output options.
//!
//! A [`Model`] publishes its data as an `Arc<ModelData>` behind an `RwLock`.
//! Taggers and lattices clone the `Arc` they start with, so [`Model::swap`]
//! never disturbs a decode already in flight.

pub mod options;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::dict::connection::ConnectionMatrix;
use crate::dict::{CompositeDictionary, Dictionary, DictionaryInfo, DictionaryType};
use crate::error::{clear_global_error, record_global_error, TaggerError};
use crate::lattice::writer::OutputFormats;
use crate::lattice::{Attribute, Lattice, Node, NodeId, NodeOrigin, NodeStatus, RequestType};
use crate::settings::settings;
use crate::tagger::Tagger;

use options::ModelOptions;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Parameters of the one-character node added where no dictionary entry
/// covers a single character.
#[derive(Debug, Clone)]
pub(crate) struct UnknownWord {
    pub cost: i16,
    pub left: Attribute,
    pub right: Attribute,
    pub feature: String,
}

/// One immutable version of a model's backing data.
pub struct ModelData {
    dictionary: Arc<dyn Dictionary>,
    matrix: ConnectionMatrix,
    info: Vec<DictionaryInfo>,
    options: ModelOptions,
    formats: OutputFormats,
    unknown: UnknownWord,
    bos_eos_attr: Attribute,
    generation: u64,
}

impl ModelData {
    /// Process-unique id of this data version.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn num_ids(&self) -> u16 {
        self.matrix.num_ids()
    }

    pub fn dictionary_info(&self) -> &[DictionaryInfo] {
        &self.info
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub(crate) fn matrix(&self) -> &ConnectionMatrix {
        &self.matrix
    }

    pub(crate) fn formats(&self) -> &OutputFormats {
        &self.formats
    }

    pub(crate) fn unknown(&self) -> &UnknownWord {
        &self.unknown
    }

    pub(crate) fn bos_eos_attr(&self) -> Attribute {
        self.bos_eos_attr
    }

    pub(crate) fn default_request_type(&self) -> RequestType {
        self.options.request_type()
    }

    pub(crate) fn default_theta(&self) -> f64 {
        self.options.theta.unwrap_or(settings().decode.theta)
    }

    pub(crate) fn attrs_in_range(&self, left: Attribute, right: Attribute) -> bool {
        left.0 < self.num_ids() && right.0 < self.num_ids()
    }

    pub(crate) fn unknown_node(&self, begin: usize, end: usize, origin: NodeOrigin) -> Node {
        Node::new(
            begin,
            end,
            self.unknown.left,
            self.unknown.right,
            i32::from(self.unknown.cost),
            self.unknown.feature.clone(),
            NodeStatus::Unknown,
            origin,
        )
    }

    /// Allocate (without linking) one node per entry whose surface is a
    /// prefix of `sentence[begin..end]`, plus a one-character unknown node
    /// when no single-character entry matched. The nodes are chained through
    /// `bnext` in allocation order.
    pub(crate) fn lookup_into(
        &self,
        lattice: &mut Lattice,
        begin: usize,
        end: usize,
        origin: NodeOrigin,
    ) -> Vec<NodeId> {
        let nodes = {
            let Some(query) = lattice.sentence().and_then(|s| s.get(begin..end)) else {
                return Vec::new();
            };
            let first_char_len = query.chars().next().map_or(0, char::len_utf8);
            let mut nodes = Vec::new();
            let mut has_single_char_match = false;
            for result in self.dictionary.common_prefix_search(query) {
                if result.len == first_char_len {
                    has_single_char_match = true;
                }
                for entry in result.entries.iter() {
                    nodes.push(Node::new(
                        begin,
                        begin + result.len,
                        Attribute(entry.left_id),
                        Attribute(entry.right_id),
                        i32::from(entry.cost),
                        entry.feature.clone(),
                        NodeStatus::Normal,
                        origin,
                    ));
                }
            }
            if !has_single_char_match && first_char_len > 0 {
                nodes.push(self.unknown_node(begin, begin + first_char_len, origin));
            }
            nodes
        };

        let mut ids: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for node in nodes {
            let id = lattice.alloc(node);
            if let Some(&prev) = ids.last() {
                lattice.nodes[prev.index()].bnext = Some(id);
            }
            ids.push(id);
        }
        ids
    }
}

/// A shared, hot-swappable model.
pub struct Model {
    current: RwLock<Arc<ModelData>>,
}

impl Model {
    /// Model over a single system dictionary with default options.
    pub fn new(
        dictionary: impl Dictionary + 'static,
        matrix: ConnectionMatrix,
    ) -> Result<Self, TaggerError> {
        Self::builder(matrix).system("system", dictionary).build()
    }

    pub fn builder(matrix: ConnectionMatrix) -> ModelBuilder {
        ModelBuilder {
            matrix,
            layers: Vec::new(),
            options: ModelOptions::default(),
            pending: None,
        }
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub(crate) fn snapshot(&self) -> Arc<ModelData> {
        // The guarded value is a single Arc, never observed half-written.
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }

    pub fn dictionary_info(&self) -> Vec<DictionaryInfo> {
        self.snapshot().dictionary_info().to_vec()
    }

    pub fn transition_cost(&self, rattr: u16, lattr: u16) -> Result<i32, TaggerError> {
        self.snapshot().matrix().cost(rattr, lattr)
    }

    /// Allocate dictionary matches over `[begin, end)` into `lattice` as
    /// caller-owned nodes. Returns the head of their `bnext` chain; the nodes
    /// join the graph on the next parse like any dictionary match.
    pub fn lookup(
        &self,
        lattice: &mut Lattice,
        begin: usize,
        end: usize,
    ) -> Result<Option<NodeId>, TaggerError> {
        let sentence = lattice.sentence().ok_or(TaggerError::SentenceUnset)?;
        let len = sentence.len();
        if begin > end || end > len {
            return Err(TaggerError::InvalidRange { begin, end, len });
        }
        for pos in [begin, end] {
            if !sentence.is_char_boundary(pos) {
                return Err(TaggerError::NotCharBoundary(pos));
            }
        }
        if begin == end {
            return Ok(None);
        }
        let data = self.snapshot();
        let ids = data.lookup_into(lattice, begin, end, NodeOrigin::External);
        Ok(ids.first().copied())
    }

    /// Replace the backing data with `other`'s.
    ///
    /// Returns false, leaving the current data untouched, when the attribute
    /// id spaces differ.
    pub fn swap(&self, other: Model) -> bool {
        let incoming = other
            .current
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.num_ids() != incoming.num_ids() {
            warn!(
                current = current.num_ids(),
                incoming = incoming.num_ids(),
                "swap rejected: attribute id space differs"
            );
            return false;
        }
        debug!(
            from = current.generation(),
            to = incoming.generation(),
            "model swapped"
        );
        *current = incoming;
        true
    }

    /// A tagger pinned to the current data.
    pub fn create_tagger(&self) -> Tagger {
        Tagger::from_data(self.snapshot())
    }

    pub fn create_lattice(&self) -> Lattice {
        Lattice::new(self)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.snapshot();
        f.debug_struct("Model")
            .field("generation", &data.generation())
            .field("num_ids", &data.num_ids())
            .finish()
    }
}

/// Assembles a [`Model`] from dictionary layers, a matrix and options.
pub struct ModelBuilder {
    matrix: ConnectionMatrix,
    layers: Vec<(String, DictionaryType, Arc<dyn Dictionary>)>,
    options: ModelOptions,
    pending: Option<TaggerError>,
}

impl ModelBuilder {
    pub fn system(mut self, label: impl Into<String>, dictionary: impl Dictionary + 'static) -> Self {
        let dictionary: Arc<dyn Dictionary> = Arc::new(dictionary);
        self.layers
            .push((label.into(), DictionaryType::System, dictionary));
        self
    }

    /// Add a user dictionary layered over the system dictionary.
    pub fn user(mut self, label: impl Into<String>, dictionary: impl Dictionary + 'static) -> Self {
        let dictionary: Arc<dyn Dictionary> = Arc::new(dictionary);
        self.layers
            .push((label.into(), DictionaryType::User, dictionary));
        self
    }

    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse argv-style options; a parse failure surfaces from `build`.
    pub fn args(mut self, args: &str) -> Self {
        match ModelOptions::from_arg_str(args) {
            Ok(options) => self.options = options,
            Err(e) => self.pending = Some(e),
        }
        self
    }

    /// Validate and assemble the model. On failure the message is also left
    /// in the thread-local [`crate::global_error`] slot.
    pub fn build(self) -> Result<Model, TaggerError> {
        match self.try_build() {
            Ok(data) => {
                clear_global_error();
                debug!(generation = data.generation, "model built");
                Ok(Model {
                    current: RwLock::new(Arc::new(data)),
                })
            }
            Err(e) => {
                let err = match e {
                    TaggerError::ModelLoad(_) => e,
                    other => TaggerError::ModelLoad(other.to_string()),
                };
                record_global_error(&err);
                Err(err)
            }
        }
    }

    fn try_build(self) -> Result<ModelData, TaggerError> {
        if let Some(e) = self.pending {
            return Err(e);
        }
        let system_count = self
            .layers
            .iter()
            .filter(|(_, t, _)| *t == DictionaryType::System)
            .count();
        if system_count != 1 {
            return Err(TaggerError::ModelLoad(format!(
                "expected exactly one system dictionary, got {system_count}"
            )));
        }

        let num_ids = self.matrix.num_ids();
        let s = settings();
        let unknown = UnknownWord {
            cost: s.cost.unknown_word_cost,
            left: Attribute(s.cost.unknown_left_id),
            right: Attribute(s.cost.unknown_right_id),
            feature: self
                .options
                .unk_feature
                .clone()
                .unwrap_or_else(|| s.cost.unknown_feature.clone()),
        };
        let bos_eos_attr = Attribute(s.cost.bos_eos_id);
        for (what, left, right) in [
            ("unknown word", unknown.left.0, unknown.right.0),
            ("BOS/EOS", bos_eos_attr.0, bos_eos_attr.0),
        ] {
            if left >= num_ids || right >= num_ids {
                return Err(TaggerError::ModelLoad(format!(
                    "{what} attributes ({left}, {right}) exceed matrix size {num_ids}"
                )));
            }
        }

        // System layer first, users after in insertion order.
        let mut layers = self.layers;
        layers.sort_by_key(|(_, t, _)| *t != DictionaryType::System);

        let mut info = Vec::with_capacity(layers.len());
        for (label, dictionary_type, dict) in &layers {
            if let Some((surface, entry)) = dict
                .entries()
                .find(|(_, e)| e.left_id >= num_ids || e.right_id >= num_ids)
            {
                return Err(TaggerError::ModelLoad(format!(
                    "{label}: entry {surface:?} has attributes ({}, {}) outside matrix size {num_ids}",
                    entry.left_id, entry.right_id
                )));
            }
            info.push(DictionaryInfo::new(
                label.clone(),
                *dictionary_type,
                dict.len(),
                num_ids,
            ));
        }

        let dictionary: Arc<dyn Dictionary> = if layers.len() == 1 {
            Arc::clone(&layers[0].2)
        } else {
            Arc::new(CompositeDictionary::new(
                layers.iter().map(|(_, _, d)| Arc::clone(d)).collect(),
            ))
        };

        self.options.validate()?;
        let formats = OutputFormats::from_options(&self.options)?;

        Ok(ModelData {
            dictionary,
            matrix: self.matrix,
            info,
            options: self.options,
            formats,
            unknown,
            bos_eos_attr,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        })
    }
}
