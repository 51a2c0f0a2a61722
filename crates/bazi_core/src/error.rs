//! Error types for chart computation.
//!
//! Only two conditions abort a chart: input that fails validation and a
//! broken internal invariant. Missing reference data and bad rules are
//! recovered where they occur and reported on the chart itself.

use bazi_tables::TableError;
use bazi_time::TimeError;
use thiserror::Error;

/// Errors from chart computation.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ChartError {
    /// Input rejected before any pillar work began.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Engine configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// A computed value broke an invariant; indicates a defect.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    /// Error from the time layer outside input validation.
    #[error("time error: {0}")]
    Time(#[from] TimeError),
}

impl ChartError {
    /// True for errors caused by the caller's input or configuration.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidConfig(_))
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

impl From<TableError> for ChartError {
    fn from(e: TableError) -> Self {
        Self::InvariantViolation(e.to_string())
    }
}
