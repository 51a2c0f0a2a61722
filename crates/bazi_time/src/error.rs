//! Error types for time correction and solar-term lookup.

use thiserror::Error;

/// Errors from solar-time correction, calendar conversion or term tables.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TimeError {
    /// Longitude is not finite or outside [-180, 180].
    #[error("invalid longitude {0}: must be within [-180, 180]")]
    InvalidLongitude(f64),
    /// Reference meridian is not finite or outside [-180, 180].
    #[error("invalid reference meridian {0}: must be within [-180, 180]")]
    InvalidReferenceMeridian(f64),
    /// Calendar fields do not form a real date or time.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// The requested instant is outside the representable range.
    #[error("instant out of range: {0}")]
    OutOfRange(&'static str),
    /// Iterative search did not bracket a root.
    #[error("no convergence: {0}")]
    NoConvergence(&'static str),
}
