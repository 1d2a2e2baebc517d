#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Crate Organization
//!
//! - [`traits`] - Company data model, statistics and the [`ValuationModel`] trait
//! - [`models`] - Intrinsic, relative, transaction, credit and operating models
//! - [`eval`] - Sensitivity sweeps, scenarios, break-evens and tornado ranking
//! - [`combine`] - Investment committee memo blending several methods
//!
//! ## Architecture
//!
//! 1. **Company data** is a validated snapshot of profile, price and statements
//! 2. **Models** turn a snapshot and a config into a typed result
//! 3. **Sensitivity** re-runs the DCF under perturbed configs
//! 4. **The memo** weights several models into one recommendation

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Company data model, statistics helpers and model traits.
pub mod traits {
    pub use ronda_traits::*;
}

pub use ronda_traits::{ImpliedValuation, ValuationModel};
pub use ronda_traits::{Result, RondaError};
pub use ronda_traits::{CompanyData, CompanyProfile, Symbol};

// ============================================================================
// Models
// ============================================================================

/// Valuation models grouped by category.
///
/// See [`models::registry`] for the catalog with names, aliases and data
/// requirements.
pub mod models {
    pub use ronda_models::*;
}

// ============================================================================
// Sensitivity
// ============================================================================

/// Sensitivity and scenario analysis around a base DCF.
///
/// ```
/// use ronda::eval::{SensitivityVariable, one_way};
/// use ronda::models::intrinsic::DcfModel;
///
/// let data = ronda::traits::sample::reference_company();
/// let sweep = one_way(&DcfModel::default(), &data, SensitivityVariable::Wacc, &[0.08, 0.10]).unwrap();
/// assert_eq!(sweep.prices.len(), 2);
/// ```
pub mod eval {
    pub use ronda_eval::*;
}

// ============================================================================
// IC Memo
// ============================================================================

/// Investment committee memo.
pub mod combine {
    pub use ronda_combine::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{CompanyData, ImpliedValuation, Result, RondaError, ValuationModel};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let _error: RondaError = RondaError::InvalidData("test".to_string());
    }

    #[test]
    fn test_registry_reachable() {
        assert!(models::get_model_info("dcf").is_ok());
    }
}
