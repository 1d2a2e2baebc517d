//! Valuation model implementations for ronda.
//!
//! This crate provides the single-scenario calculators, grouped by family:
//! - Intrinsic: DCF, free cash flow analysis, sum-of-the-parts
//! - Relative: comparable companies, precedent transactions
//! - Transaction: LBO, merger accretion/dilution, IPO pricing
//! - Credit: debt capacity, covenants, pricing grid
//! - Operating: unit economics, three-statement projection
//!
//! Every model is built from a `*Config` with sensible defaults, holds no
//! mutable state, and maps a [`ronda_traits::CompanyData`] snapshot to a
//! structured, serializable result.
//!
//! # Example
//!
//! ```
//! use ronda_models::intrinsic::DcfModel;
//! use ronda_models::registry::available_models;
//! use ronda_traits::{ValuationModel, sample::reference_company};
//!
//! let result = DcfModel::default().analyze(&reference_company()).unwrap();
//! assert!(result.enterprise_value > 0.0);
//!
//! // Discover available models
//! let models = available_models();
//! assert!(models.iter().any(|m| m.name == "dcf"));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod credit;
pub mod intrinsic;
pub mod operating;
pub mod registry;
pub mod relative;
pub mod transaction;

// Re-export key types
pub use registry::{ModelCategory, ModelInfo, available_models, get_model_info};

/// `(implied - current) / current`, or `None` without a positive current price.
pub(crate) fn upside(implied: f64, current: f64) -> Option<f64> {
    if current > 0.0 {
        Some((implied - current) / current).filter(|u| u.is_finite())
    } else {
        None
    }
}
