//! Dictionary and connection-matrix storage.
//!
//! `TrieDictionary` maps surface forms to entries through a double-array trie.
//! `CompositeDictionary` layers user dictionaries over a system dictionary.
//! `ConnectionMatrix` stores attribute bigram transition costs for Viterbi scoring.

mod composite;
pub mod connection;
mod entry;
mod info;
#[cfg(test)]
mod tests;
mod trie_dict;

pub use composite::CompositeDictionary;
pub use entry::DictEntry;
pub use info::{DictionaryInfo, DictionaryType};
pub use trie_dict::TrieDictionary;

use std::borrow::Cow;

/// Errors raised while building dictionaries or parsing matrix text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DictError {
    #[error("dictionary entry has an empty surface")]
    EmptySurface,

    #[error("trie construction failed: {0}")]
    Trie(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// One common-prefix match: the matched byte length and its entries.
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub len: usize,
    pub entries: Cow<'a, [DictEntry]>,
}

pub trait Dictionary: Send + Sync {
    /// Entries whose surface equals `surface` exactly.
    fn lookup(&self, surface: &str) -> Vec<DictEntry>;

    /// Every entry whose surface is a prefix of `query`, shortest match first.
    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult<'_>>;

    /// All `(surface, entry)` pairs.
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DictEntry)> + '_>;

    fn len(&self) -> usize {
        self.entries().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
