use std::borrow::Cow;
use std::collections::BTreeMap;

use super::{DictEntry, DictError, Dictionary, SearchResult};
use crate::feature::{join_feature, parse_csv_row};

pub struct TrieDictionary {
    trie: Option<crawdad::Trie>,
    surfaces: Vec<String>,
    values: Vec<Vec<DictEntry>>,
}

impl TrieDictionary {
    /// Build from `(surface, entries)` pairs.
    ///
    /// Pairs sharing a surface are merged; entries keep their insertion order,
    /// which is also the order decode sees them in.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, Vec<DictEntry>)>,
    ) -> Result<Self, DictError> {
        let mut grouped: BTreeMap<String, Vec<DictEntry>> = BTreeMap::new();
        for (surface, list) in entries {
            if surface.is_empty() {
                return Err(DictError::EmptySurface);
            }
            grouped.entry(surface).or_default().extend(list);
        }
        let (surfaces, values): (Vec<String>, Vec<Vec<DictEntry>>) = grouped.into_iter().unzip();

        // crawdad rejects an empty record set
        let trie = if surfaces.is_empty() {
            None
        } else {
            let records = surfaces
                .iter()
                .enumerate()
                .map(|(i, s)| (s.as_str(), i as u32));
            Some(crawdad::Trie::from_records(records).map_err(|e| DictError::Trie(e.to_string()))?)
        };

        Ok(Self {
            trie,
            surfaces,
            values,
        })
    }

    /// Build from MeCab lexicon CSV rows: `surface,left_id,right_id,cost,feature...`.
    ///
    /// Everything after the cost column is rejoined with `,` as the feature;
    /// fields that need it are quoted again.
    pub fn from_csv(text: &str) -> Result<Self, DictError> {
        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = parse_csv_row(line)
                .map_err(|e| DictError::Parse(format!("line {}: {e}", lineno + 1)))?;
            if fields.len() < 5 {
                return Err(DictError::Parse(format!(
                    "line {}: expected at least 5 fields, got {}",
                    lineno + 1,
                    fields.len()
                )));
            }
            let left_id: u16 = fields[1]
                .parse()
                .map_err(|e| DictError::Parse(format!("line {}: left_id: {e}", lineno + 1)))?;
            let right_id: u16 = fields[2]
                .parse()
                .map_err(|e| DictError::Parse(format!("line {}: right_id: {e}", lineno + 1)))?;
            let cost: i16 = fields[3]
                .parse()
                .map_err(|e| DictError::Parse(format!("line {}: cost: {e}", lineno + 1)))?;
            let feature = join_feature(&fields[4..]);
            rows.push((
                fields[0].clone(),
                vec![DictEntry::new(feature, cost, left_id, right_id)],
            ));
        }
        Self::from_entries(rows)
    }

    /// Returns (surface_count, entry_count).
    pub fn stats(&self) -> (usize, usize) {
        let surfaces = self.values.len();
        let entries: usize = self.values.iter().map(|v| v.len()).sum();
        (surfaces, entries)
    }
}

impl std::fmt::Debug for TrieDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (surfaces, entries) = self.stats();
        f.debug_struct("TrieDictionary")
            .field("surfaces", &surfaces)
            .field("entries", &entries)
            .finish()
    }
}

impl Dictionary for TrieDictionary {
    fn lookup(&self, surface: &str) -> Vec<DictEntry> {
        self.trie
            .as_ref()
            .and_then(|trie| trie.exact_match(surface.chars()))
            .map(|id| self.values[id as usize].clone())
            .unwrap_or_default()
    }

    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult<'_>> {
        let Some(trie) = &self.trie else {
            return Vec::new();
        };
        // Matches arrive in increasing char length; walk char_indices once to
        // turn char counts into byte lengths.
        let mut chars = query.char_indices();
        let mut consumed = 0;
        let mut byte_len = 0;
        let mut results = Vec::new();
        for (value, end_char) in trie.common_prefix_search(query.chars()) {
            while consumed < end_char {
                if let Some((i, c)) = chars.next() {
                    byte_len = i + c.len_utf8();
                }
                consumed += 1;
            }
            results.push(SearchResult {
                len: byte_len,
                entries: Cow::Borrowed(self.values[value as usize].as_slice()),
            });
        }
        results
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DictEntry)> + '_> {
        Box::new(
            self.surfaces
                .iter()
                .zip(&self.values)
                .flat_map(|(s, list)| list.iter().map(move |e| (s.as_str(), e))),
        )
    }

    fn len(&self) -> usize {
        self.stats().1
    }
}
