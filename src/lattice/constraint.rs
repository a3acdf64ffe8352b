use std::collections::BTreeMap;

use crate::error::TaggerError;

/// Caller-imposed rule for one byte offset of the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryConstraint {
    #[default]
    Any,
    /// A morpheme boundary must fall here.
    TokenBoundary,
    /// This offset must lie strictly inside a morpheme.
    InsideToken,
}

/// Feature string that constrains boundaries only, keeping each node's own feature.
pub const ANY_FEATURE: &str = "*";

/// Forced features keyed by `(begin, end)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct FeatureConstraints {
    spans: BTreeMap<(usize, usize), String>,
}

impl FeatureConstraints {
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, begin: usize, end: usize) -> Option<&str> {
        self.spans.get(&(begin, end)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.spans.iter().map(|(&(b, e), f)| (b, e, f.as_str()))
    }

    /// Insert a span. Repeating an existing span with the same feature is a
    /// no-op; a different feature or any partial overlap is a conflict.
    pub fn insert(&mut self, begin: usize, end: usize, feature: String) -> Result<(), TaggerError> {
        let overlaps = self
            .spans
            .keys()
            .any(|&(b, e)| (b, e) != (begin, end) && b < end && begin < e);
        if overlaps {
            return Err(TaggerError::ConflictingConstraint { begin, end });
        }
        if let Some(existing) = self.spans.get(&(begin, end)) {
            if existing != &feature {
                return Err(TaggerError::ConflictingConstraint { begin, end });
            }
        }
        self.spans.insert((begin, end), feature);
        Ok(())
    }
}

/// Merge explicit boundary constraints with those implied by feature spans:
/// a boundary at each end of a span and none strictly inside it.
pub(crate) fn effective_boundaries(
    explicit: &[BoundaryConstraint],
    features: &FeatureConstraints,
) -> Vec<BoundaryConstraint> {
    let mut merged = explicit.to_vec();
    for (begin, end, _) in features.iter() {
        for slot in [begin, end] {
            if merged[slot] == BoundaryConstraint::Any {
                merged[slot] = BoundaryConstraint::TokenBoundary;
            }
        }
        for c in &mut merged[begin + 1..end] {
            if *c == BoundaryConstraint::Any {
                *c = BoundaryConstraint::InsideToken;
            }
        }
    }
    merged
}

/// Whether a node over `[begin, end)` may appear in any path.
pub(crate) fn span_allowed(boundaries: &[BoundaryConstraint], begin: usize, end: usize) -> bool {
    if boundaries[begin] == BoundaryConstraint::InsideToken
        || boundaries[end] == BoundaryConstraint::InsideToken
    {
        return false;
    }
    !boundaries
        .get(begin + 1..end)
        .unwrap_or(&[])
        .iter()
        .any(|c| *c == BoundaryConstraint::TokenBoundary)
}
