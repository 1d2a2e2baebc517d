#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core definitions for the ronda valuation toolkit.
//!
//! This crate provides the normalized company snapshot, the error taxonomy,
//! the statistics helpers and the model trait that every valuation model in
//! the workspace builds on.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod model;
pub mod sample;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use model::{ImpliedValuation, ValuationModel};
pub use types::{
    BalanceSheet, CashFlowStatement, CompanyData, CompanyProfile, Date, IncomeStatement,
    StockPrice, Symbol,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
