use super::DictError;
use crate::error::TaggerError;

/// A square connection cost matrix mapping `(right_id, left_id) -> cost`.
///
/// `right_id` is the right attribute of the preceding morpheme and `left_id`
/// the left attribute of the following one. Used by the Viterbi algorithm to
/// score morpheme transitions.
#[derive(Debug, Clone)]
pub struct ConnectionMatrix {
    num_ids: u16,
    costs: Vec<i16>,
}

impl ConnectionMatrix {
    /// Create from row-major costs (`right_id * num_ids + left_id`).
    pub fn new(num_ids: u16, costs: Vec<i16>) -> Result<Self, DictError> {
        let expected = num_ids as usize * num_ids as usize;
        if costs.len() != expected {
            return Err(DictError::Parse(format!(
                "expected {expected} costs for {num_ids} ids, got {}",
                costs.len()
            )));
        }
        Ok(Self { num_ids, costs })
    }

    /// A matrix where every transition costs nothing.
    pub fn zeros(num_ids: u16) -> Self {
        Self {
            num_ids,
            costs: vec![0; num_ids as usize * num_ids as usize],
        }
    }

    /// Parse a text matrix.
    ///
    /// The header is either `N` or `N N` (MeCab `matrix.def`, left and right
    /// sizes must agree). The body is either `right_id left_id cost` triples
    /// (unlisted pairs cost 0) or exactly N*N costs, one per line, row-major.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut lines = text.lines().peekable();

        let header = lines
            .next()
            .ok_or_else(|| DictError::Parse("empty matrix".to_string()))?;
        let parts: Vec<&str> = header.split_whitespace().collect();
        let num_ids: u16 = match parts.len() {
            1 => parts[0]
                .parse()
                .map_err(|e| DictError::Parse(format!("invalid num_ids: {e}")))?,
            2 => {
                let nl: u16 = parts[0]
                    .parse()
                    .map_err(|e| DictError::Parse(format!("invalid num_left: {e}")))?;
                let nr: u16 = parts[1]
                    .parse()
                    .map_err(|e| DictError::Parse(format!("invalid num_right: {e}")))?;
                if nl != nr {
                    return Err(DictError::Parse(format!(
                        "num_left ({nl}) != num_right ({nr})"
                    )));
                }
                nl
            }
            _ => {
                return Err(DictError::Parse(format!(
                    "expected 1 or 2 values in header, got {}",
                    parts.len()
                )));
            }
        };

        let n = num_ids as usize;
        let expected = n * n;

        while lines.peek().is_some_and(|line| line.trim().is_empty()) {
            lines.next();
        }
        let is_triplet = lines
            .peek()
            .is_some_and(|line| line.split_whitespace().count() == 3);

        let costs = if is_triplet {
            let mut costs = vec![0i16; expected];
            for line in lines {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() != 3 {
                    return Err(DictError::Parse(format!(
                        "expected 3 fields, got {}",
                        fields.len()
                    )));
                }
                let right_id: usize = fields[0]
                    .parse()
                    .map_err(|e| DictError::Parse(format!("right_id: {e}")))?;
                let left_id: usize = fields[1]
                    .parse()
                    .map_err(|e| DictError::Parse(format!("left_id: {e}")))?;
                let cost: i16 = fields[2]
                    .parse()
                    .map_err(|e| DictError::Parse(format!("cost: {e}")))?;
                if right_id >= n || left_id >= n {
                    return Err(DictError::Parse(format!(
                        "index out of bounds: ({right_id}, {left_id})"
                    )));
                }
                costs[right_id * n + left_id] = cost;
            }
            costs
        } else {
            let mut costs = Vec::with_capacity(expected);
            for line in lines {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let cost: i16 = line
                    .parse()
                    .map_err(|e| DictError::Parse(format!("cost: {e}")))?;
                costs.push(cost);
            }
            costs
        };

        Self::new(num_ids, costs)
    }

    /// Number of attribute ids on each side.
    pub fn num_ids(&self) -> u16 {
        self.num_ids
    }

    /// Hot-path lookup; `None` when either id is out of range.
    #[inline]
    pub fn get(&self, right_id: u16, left_id: u16) -> Option<i16> {
        if right_id >= self.num_ids || left_id >= self.num_ids {
            return None;
        }
        let idx = right_id as usize * self.num_ids as usize + left_id as usize;
        self.costs.get(idx).copied()
    }

    /// Checked transition cost.
    pub fn cost(&self, right_id: u16, left_id: u16) -> Result<i32, TaggerError> {
        self.get(right_id, left_id)
            .map(i32::from)
            .ok_or(TaggerError::AttributeOutOfRange {
                right: right_id,
                left: left_id,
                num_ids: self.num_ids,
            })
    }
}
