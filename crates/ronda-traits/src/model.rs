//! Valuation model trait.
//!
//! This module defines [`ValuationModel`], the common shape of every
//! single-scenario calculator in ronda. A model is built from its
//! configuration, holds no mutable state, and maps a [`CompanyData`]
//! snapshot to a structured result.

use crate::{CompanyData, Result};

/// A stateless valuation calculator.
///
/// Implementations should be thread-safe (`Send + Sync`); `analyze` takes
/// `&self`, so the same model may be shared across threads.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{CompanyData, Result, ValuationModel};
///
/// struct BookValue;
///
/// impl ValuationModel for BookValue {
///     type Output = f64;
///
///     fn name(&self) -> &str {
///         "book_value"
///     }
///
///     fn analyze(&self, data: &CompanyData) -> Result<f64> {
///         Ok(data.latest_balance()?.total_equity)
///     }
/// }
/// ```
pub trait ValuationModel: Send + Sync {
    /// Structured result produced by [`ValuationModel::analyze`].
    type Output;

    /// Returns the unique name of this model.
    fn name(&self) -> &str;

    /// Runs the model against a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a required statement series is empty
    /// - a ratio the model depends on is degenerate
    /// - the configuration is out of domain
    fn analyze(&self, data: &CompanyData) -> Result<Self::Output>;

    /// Minimum number of historical periods the model needs.
    fn min_periods(&self) -> usize {
        1
    }
}

/// A result that carries a per-share value estimate.
///
/// Composition layers (IC memo, sensitivity sweeps) use this to pick up a
/// headline price and to detect results that are not usable.
pub trait ImpliedValuation {
    /// Implied value per share.
    fn implied_share_price(&self) -> f64;

    /// Whether the implied price is a usable finite number.
    fn is_finite(&self) -> bool {
        self.implied_share_price().is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::reference_company;

    struct LatestRevenue;

    impl ValuationModel for LatestRevenue {
        type Output = f64;

        fn name(&self) -> &str {
            "latest_revenue"
        }

        fn analyze(&self, data: &CompanyData) -> Result<f64> {
            Ok(data.latest_income()?.revenue)
        }
    }

    struct Price(f64);

    impl ImpliedValuation for Price {
        fn implied_share_price(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_default_min_periods() {
        assert_eq!(LatestRevenue.min_periods(), 1);
        assert_eq!(LatestRevenue.name(), "latest_revenue");
    }

    #[test]
    fn test_analyze_through_trait_object() {
        let model: Box<dyn ValuationModel<Output = f64>> = Box::new(LatestRevenue);
        let revenue = model.analyze(&reference_company()).unwrap();
        assert!(revenue > 0.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Price(10.0).is_finite());
        assert!(!Price(f64::NAN).is_finite());
        assert!(!Price(f64::INFINITY).is_finite());
    }
}
