//! Lattice-based morphological analysis.
//!
//! A [`Model`] bundles dictionaries, a connection-cost matrix and output
//! options. A [`Tagger`] decodes a per-request [`Lattice`]: it enumerates
//! dictionary matches at every character boundary, applies boundary and
//! feature constraints, and finds the cheapest segmentation with Viterbi.
//! Marginal probabilities and N-best enumeration are available on request.
//!
//! ```no_run
//! use lattice_tagger::dict::connection::ConnectionMatrix;
//! use lattice_tagger::dict::TrieDictionary;
//! use lattice_tagger::Model;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dict = TrieDictionary::from_csv("東京,0,0,100,名詞,固有名詞\n")?;
//! let model = Model::new(dict, ConnectionMatrix::zeros(1))?;
//! print!("{}", model.create_tagger().parse_to_string("東京")?);
//! # Ok(())
//! # }
//! ```

pub mod dict;
pub mod error;
pub mod feature;
pub mod lattice;
pub mod model;
pub mod settings;
pub mod tagger;
pub mod trace_init;

mod testutil;

pub use error::{global_error, TaggerError};
pub use lattice::{
    Attribute, BoundaryConstraint, Lattice, Node, NodeId, NodeIter, NodeRef, NodeRevIter,
    NodeStatus, RequestKind, RequestType,
};
pub use model::options::{ModelOptions, OptionKey, OutputFormatType};
pub use model::{Model, ModelBuilder, ModelData};
pub use tagger::Tagger;
