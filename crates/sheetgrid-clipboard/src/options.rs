//! Paste options

/// Options for tokenising pasted text
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PasteOptions {
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Strip surrounding whitespace from each field
    pub trim_fields: bool,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self {
            quote: b'"',
            trim_fields: false,
        }
    }
}
