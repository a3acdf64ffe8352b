#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DictionaryType {
    System,
    User,
    UnknownWord,
}

/// Descriptive metadata for one dictionary layer of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryInfo {
    pub label: String,
    pub charset: &'static str,
    pub dictionary_type: DictionaryType,
    /// Number of entries.
    pub size: usize,
    /// Left/right attribute-id space of the matrix the layer is used with.
    pub lsize: u16,
    pub rsize: u16,
    pub version: u16,
}

impl DictionaryInfo {
    pub(crate) fn new(
        label: impl Into<String>,
        dictionary_type: DictionaryType,
        size: usize,
        num_ids: u16,
    ) -> Self {
        Self {
            label: label.into(),
            charset: "utf-8",
            dictionary_type,
            size,
            lsize: num_ids,
            rsize: num_ids,
            version: DICTIONARY_VERSION,
        }
    }
}

pub(crate) const DICTIONARY_VERSION: u16 = 102;
