use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{DictEntry, Dictionary, SearchResult};

/// A dictionary that merges results from multiple layers.
///
/// Layers are searched in order (system dictionary first, then user
/// dictionaries). Identical entries (same feature and attribute ids) are
/// deduplicated, keeping the lowest cost; otherwise layer order is preserved.
pub struct CompositeDictionary {
    layers: Vec<Arc<dyn Dictionary>>,
}

impl CompositeDictionary {
    pub fn new(layers: Vec<Arc<dyn Dictionary>>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Arc<dyn Dictionary>] {
        &self.layers
    }
}

fn dedup_entries(entries: Vec<DictEntry>) -> Vec<DictEntry> {
    let mut result: Vec<DictEntry> = Vec::with_capacity(entries.len());
    for e in entries {
        match result
            .iter_mut()
            .find(|x| x.feature == e.feature && x.left_id == e.left_id && x.right_id == e.right_id)
        {
            Some(existing) => existing.cost = existing.cost.min(e.cost),
            None => result.push(e),
        }
    }
    result
}

impl Dictionary for CompositeDictionary {
    fn lookup(&self, surface: &str) -> Vec<DictEntry> {
        let mut all = Vec::new();
        for layer in &self.layers {
            all.extend(layer.lookup(surface));
        }
        dedup_entries(all)
    }

    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult<'_>> {
        let mut by_len: BTreeMap<usize, Vec<DictEntry>> = BTreeMap::new();
        for layer in &self.layers {
            for sr in layer.common_prefix_search(query) {
                by_len
                    .entry(sr.len)
                    .or_default()
                    .extend(sr.entries.iter().cloned());
            }
        }
        by_len
            .into_iter()
            .map(|(len, entries)| SearchResult {
                len,
                entries: Cow::Owned(dedup_entries(entries)),
            })
            .collect()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DictEntry)> + '_> {
        Box::new(self.layers.iter().flat_map(|layer| layer.entries()))
    }
}
