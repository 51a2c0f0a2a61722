//! Error types for table lookups.

use thiserror::Error;

/// Errors from parsing or indexing the static tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    /// A name did not match any symbol of the given alphabet.
    #[error("unknown {kind} symbol: {value:?}")]
    UnknownSymbol { kind: &'static str, value: String },
    /// A raw index fell outside the alphabet.
    #[error("{kind} index {index} out of range (max {max})")]
    IndexOutOfRange {
        kind: &'static str,
        index: u8,
        max: u8,
    },
}

impl TableError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownSymbol {
            kind,
            value: value.to_string(),
        }
    }
}
