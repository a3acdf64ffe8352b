use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::TaggerError;

/// One decode/output request.
///
/// - `OneBest`: a single Viterbi path (default).
/// - `NBest`: prime the N-best enumerator; `Lattice::next` walks paths in
///   non-decreasing cost order.
/// - `Partial`: constraints are present. Set automatically by the constraint
///   setters; constraints are honoured whether or not it is set.
/// - `MarginalProb`: compute forward/backward scores, node marginals and Z.
/// - `Alternative`: output lists, under each path node, the competing nodes
///   beginning at the same offset.
/// - `AllMorphs`: output lists every alive node in offset order.
/// - `AllocSentence`: accepted for compatibility; the lattice always owns a
///   copy of its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    OneBest,
    NBest,
    Partial,
    MarginalProb,
    Alternative,
    AllMorphs,
    AllocSentence,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::OneBest,
        RequestKind::NBest,
        RequestKind::Partial,
        RequestKind::MarginalProb,
        RequestKind::Alternative,
        RequestKind::AllMorphs,
        RequestKind::AllocSentence,
    ];

    /// Bit value compatible with MeCab's `MECAB_*` request-type constants.
    pub const fn bit(self) -> u8 {
        match self {
            RequestKind::OneBest => 1,
            RequestKind::NBest => 2,
            RequestKind::Partial => 4,
            RequestKind::MarginalProb => 8,
            RequestKind::Alternative => 16,
            RequestKind::AllMorphs => 32,
            RequestKind::AllocSentence => 64,
        }
    }
}

/// A set of [`RequestKind`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestType(u8);

impl RequestType {
    const KNOWN_BITS: u8 = 0x7f;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn one_best() -> Self {
        Self(RequestKind::OneBest.bit())
    }

    /// Build from raw bits; unknown bits are rejected.
    pub fn from_bits(bits: u8) -> Result<Self, TaggerError> {
        if bits & !Self::KNOWN_BITS != 0 {
            return Err(TaggerError::InvalidRequestType(format!(
                "unknown flag bits {:#04x}",
                bits & !Self::KNOWN_BITS
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, kind: RequestKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, other: impl Into<RequestType>) {
        self.0 |= other.into().0;
    }

    pub fn remove(&mut self, other: impl Into<RequestType>) {
        self.0 &= !other.into().0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = RequestKind> {
        RequestKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }

    /// Check the set describes a well-defined decode.
    ///
    /// Exactly one of `OneBest`/`NBest` must be present, and `AllMorphs`
    /// excludes `Alternative` since both replace the per-node output.
    pub fn validate(self) -> Result<(), TaggerError> {
        match (
            self.contains(RequestKind::OneBest),
            self.contains(RequestKind::NBest),
        ) {
            (true, true) => {
                return Err(TaggerError::InvalidRequestType(
                    "OneBest and NBest are mutually exclusive".to_string(),
                ))
            }
            (false, false) => {
                return Err(TaggerError::InvalidRequestType(
                    "one of OneBest or NBest is required".to_string(),
                ))
            }
            _ => {}
        }
        if self.contains(RequestKind::AllMorphs) && self.contains(RequestKind::Alternative) {
            return Err(TaggerError::InvalidRequestType(
                "AllMorphs and Alternative are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<RequestKind> for RequestType {
    fn from(kind: RequestKind) -> Self {
        Self(kind.bit())
    }
}

impl FromIterator<RequestKind> for RequestType {
    fn from_iter<I: IntoIterator<Item = RequestKind>>(iter: I) -> Self {
        let mut t = RequestType::empty();
        for kind in iter {
            t.insert(kind);
        }
        t
    }
}

impl<T: Into<RequestType>> BitOr<T> for RequestType {
    type Output = RequestType;

    fn bitor(self, rhs: T) -> RequestType {
        RequestType(self.0 | rhs.into().0)
    }
}

impl<T: Into<RequestType>> BitOr<T> for RequestKind {
    type Output = RequestType;

    fn bitor(self, rhs: T) -> RequestType {
        RequestType::from(self) | rhs
    }
}

impl<T: Into<RequestType>> BitOrAssign<T> for RequestType {
    fn bitor_assign(&mut self, rhs: T) {
        self.insert(rhs);
    }
}

impl fmt::Debug for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_contains() {
        let mut t = RequestType::one_best();
        t.insert(RequestKind::MarginalProb);
        assert!(t.contains(RequestKind::OneBest));
        assert!(t.contains(RequestKind::MarginalProb));
        t.remove(RequestKind::OneBest);
        assert!(!t.contains(RequestKind::OneBest));
        assert_eq!(t.iter().collect::<Vec<_>>(), vec![RequestKind::MarginalProb]);
    }

    #[test]
    fn test_bit_values() {
        let t = RequestKind::NBest | RequestKind::Partial | RequestKind::AllocSentence;
        assert_eq!(t.bits(), 2 | 4 | 64);
        assert_eq!(RequestType::from_bits(t.bits()).unwrap(), t);
    }

    #[test]
    fn test_from_bits_rejects_unknown() {
        let err = RequestType::from_bits(0x80).unwrap_err();
        assert!(matches!(err, TaggerError::InvalidRequestType(_)));
    }

    #[test]
    fn test_validate() {
        assert!(RequestType::one_best().validate().is_ok());
        assert!(RequestType::from(RequestKind::NBest).validate().is_ok());
        assert!(RequestType::empty().validate().is_err());
        assert!((RequestKind::OneBest | RequestKind::NBest).validate().is_err());
        assert!(RequestType::from(RequestKind::Partial).validate().is_err());
        assert!((RequestKind::OneBest | RequestKind::AllMorphs | RequestKind::Alternative)
            .validate()
            .is_err());
        assert!((RequestKind::NBest | RequestKind::MarginalProb | RequestKind::Alternative)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_collect_and_debug() {
        let t: RequestType = [RequestKind::OneBest, RequestKind::AllMorphs]
            .into_iter()
            .collect();
        assert_eq!(format!("{t:?}"), "{OneBest, AllMorphs}");
    }
}
