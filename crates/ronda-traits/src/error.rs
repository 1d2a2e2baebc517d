//! Error types for the ronda valuation toolkit.
//!
//! Every failure a model can hit is local to a single `analyze` call, so the
//! taxonomy is organised by where the failure comes from rather than by which
//! model raised it.

use thiserror::Error;

/// The main error type for ronda operations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// A required statement series is empty or shorter than the model needs.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A ratio or formula would divide by zero or produce a non-finite value.
    ///
    /// Raised for zero revenue, zero EBITDA, non-positive share counts, and a
    /// discount rate at or below the terminal growth rate.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A statistic was requested over zero observations.
    ///
    /// Relative valuation filters implausible multiples before computing
    /// percentiles; if nothing survives the filter this is returned.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// A configuration value is outside its valid domain.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A model name did not resolve in the registry.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl RondaError {
    /// Returns true for failures caused by degenerate numbers rather than
    /// missing data or bad configuration.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateInput(_) | Self::EmptyDataset(_))
    }
}

impl From<String> for RondaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for RondaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for ronda operations.
pub type Result<T> = std::result::Result<T, RondaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RondaError::DegenerateInput("revenue is zero".to_string());
        assert_eq!(err.to_string(), "Degenerate input: revenue is zero");

        let err = RondaError::EmptyDataset("ev_ebitda".to_string());
        assert_eq!(err.to_string(), "Empty dataset: ev_ebitda");
    }

    #[test]
    fn test_error_from_str() {
        let err: RondaError = "boom".into();
        assert!(matches!(err, RondaError::Other(_)));
    }

    #[test]
    fn test_is_degenerate() {
        assert!(RondaError::DegenerateInput(String::new()).is_degenerate());
        assert!(RondaError::EmptyDataset(String::new()).is_degenerate());
        assert!(!RondaError::InsufficientData(String::new()).is_degenerate());
        assert!(!RondaError::InvalidData(String::new()).is_degenerate());
    }
}
