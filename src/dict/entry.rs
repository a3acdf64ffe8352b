/// One dictionary entry for a surface form.
///
/// `feature` is the opaque tag payload (typically a CSV record of part of
/// speech, inflection, reading and so on).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub feature: String,
    pub cost: i16,
    pub left_id: u16,
    pub right_id: u16,
}

impl DictEntry {
    pub fn new(feature: impl Into<String>, cost: i16, left_id: u16, right_id: u16) -> Self {
        Self {
            feature: feature.into(),
            cost,
            left_id,
            right_id,
        }
    }
}
