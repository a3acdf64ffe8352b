//! Decoding: graph build, constraints, Viterbi, marginals and N-best.

mod build;
mod constrained;
pub(crate) mod cost;
mod marginal;
pub(crate) mod nbest;
mod viterbi;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::error::TaggerError;
use crate::lattice::{Lattice, RequestKind};
use crate::model::{Model, ModelData};

use build::{build_graph, link_external};
use constrained::apply_constraints;
use nbest::NBestEnumerator;

/// Decodes lattices against one pinned version of a model's data.
///
/// Swapping the model afterwards does not affect an existing tagger; create a
/// new one to pick up the new data.
#[derive(Clone)]
pub struct Tagger {
    model: Arc<ModelData>,
}

impl Tagger {
    pub fn new(model: &Model) -> Self {
        model.create_tagger()
    }

    pub(crate) fn from_data(model: Arc<ModelData>) -> Self {
        Self { model }
    }

    pub fn version() -> &'static str {
        Model::version()
    }

    pub fn model_generation(&self) -> u64 {
        self.model.generation()
    }

    /// A lattice bound to the same data as this tagger.
    pub fn create_lattice(&self) -> Lattice {
        Lattice::with_data(Arc::clone(&self.model))
    }

    /// Decode `lattice` according to its request flags.
    ///
    /// On failure the lattice is left unavailable with the message in
    /// [`Lattice::what`].
    pub fn parse(&self, lattice: &mut Lattice) -> Result<(), TaggerError> {
        let _span = debug_span!(
            "parse",
            len = lattice.len(),
            generation = self.model.generation()
        )
        .entered();
        let result = self.decode(lattice);
        if let Err(e) = &result {
            debug!(error = %e, "parse failed");
        }
        lattice.finish_parse(&result);
        result
    }

    fn decode(&self, lattice: &mut Lattice) -> Result<(), TaggerError> {
        lattice.request_type().validate()?;
        match lattice.sentence() {
            None => return Err(TaggerError::SentenceUnset),
            Some("") => return Err(TaggerError::EmptySentence),
            Some(_) => {}
        }
        let marginal = lattice.has_request_type(RequestKind::MarginalProb);
        let theta = lattice.theta();
        if marginal && !(theta.is_finite() && theta > 0.0) {
            return Err(TaggerError::InvalidOptions(format!(
                "theta must be a positive finite number, got {theta}"
            )));
        }

        lattice.begin_parse(Arc::clone(&self.model));
        let model = self.model.as_ref();
        if !lattice.built {
            build_graph(model, lattice);
        }
        link_external(model, lattice)?;
        apply_constraints(model, lattice);

        viterbi::forward(lattice, model)?;
        let (path, cost) = viterbi::best_path(lattice).ok_or(TaggerError::Unsatisfiable)?;
        lattice.link_path(path, cost);

        if marginal {
            if let Some(z) = marginal::forward_backward(lattice, model, theta) {
                lattice.set_z(z);
            }
        }
        if lattice.has_request_type(RequestKind::NBest) {
            lattice.nbest = lattice.eos.map(|eos| NBestEnumerator::new(eos, cost));
        }
        Ok(())
    }

    /// Decode `text` on a fresh lattice and render the best path, or the
    /// `n` best paths when the model was built with `-N n`.
    pub fn parse_to_string(&self, text: &str) -> Result<String, TaggerError> {
        let mut lattice = self.create_lattice();
        lattice.set_sentence(text);
        self.parse(&mut lattice)?;
        match self.model.options().nbest {
            Some(n) if lattice.has_request_type(RequestKind::NBest) => {
                lattice.enum_nbest_as_string(n)
            }
            _ => lattice.to_string(),
        }
    }

    /// Decode `text` on a fresh lattice and render its `n` best paths.
    pub fn parse_nbest(&self, n: usize, text: &str) -> Result<String, TaggerError> {
        let mut lattice = self.create_lattice();
        lattice.remove_request_type(RequestKind::OneBest);
        lattice.add_request_type(RequestKind::NBest);
        lattice.set_sentence(text);
        self.parse(&mut lattice)?;
        lattice.enum_nbest_as_string(n)
    }
}

impl std::fmt::Debug for Tagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tagger")
            .field("generation", &self.model.generation())
            .finish()
    }
}
