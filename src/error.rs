//! Error type shared by the model, lattice and tagger APIs.
//!
//! Model construction additionally records its failure message in a
//! thread-local slot, readable through [`global_error`] after the fact.

use std::cell::RefCell;

use crate::dict::DictError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaggerError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("incompatible model: {0}")]
    IncompatibleModel(String),

    #[error("attribute id out of range: right={right}, left={left} (matrix has {num_ids} ids)")]
    AttributeOutOfRange { right: u16, left: u16, num_ids: u16 },

    #[error("sentence is not set")]
    SentenceUnset,

    #[error("sentence is empty")]
    EmptySentence,

    #[error("lattice is not ready: {0}")]
    NotReady(String),

    #[error("invalid request type: {0}")]
    InvalidRequestType(String),

    #[error("position {pos} is out of range (sentence length {len})")]
    PositionOutOfRange { pos: usize, len: usize },

    #[error("invalid range {begin}..{end} (sentence length {len})")]
    InvalidRange { begin: usize, end: usize, len: usize },

    #[error("position {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("feature constraint over {begin}..{end} conflicts with an existing one")]
    ConflictingConstraint { begin: usize, end: usize },

    #[error("no path satisfies the constraints")]
    Unsatisfiable,

    #[error("invalid node {id}: {reason}")]
    InvalidNode { id: usize, reason: String },

    #[error("invalid format template {template:?}: {reason}")]
    InvalidFormat { template: String, reason: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Dict(#[from] DictError),
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Message of the last failed model construction on this thread.
///
/// Cleared by the next successful construction.
pub fn global_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

pub(crate) fn record_global_error(err: &TaggerError) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.to_string()));
}

pub(crate) fn clear_global_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_error_roundtrip() {
        clear_global_error();
        assert_eq!(global_error(), None);

        record_global_error(&TaggerError::ModelLoad("broken matrix".to_string()));
        let msg = global_error().unwrap();
        assert!(msg.contains("broken matrix"), "got {msg}");

        clear_global_error();
        assert_eq!(global_error(), None);
    }

    #[test]
    fn test_global_error_is_per_thread() {
        record_global_error(&TaggerError::Unsatisfiable);
        let other = std::thread::spawn(global_error).join().unwrap();
        assert_eq!(other, None);
        clear_global_error();
    }
}
