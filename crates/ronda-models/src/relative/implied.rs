//! Shared building blocks for multiple-based valuation.

use derive_more::Display;
use ronda_traits::{Result, stats::{MultipleStats, filter_in_range}};
use serde::{Deserialize, Serialize};

/// Open interval of plausible values for a multiple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultipleBounds {
    /// Exclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound.
    pub upper: f64,
}

impl MultipleBounds {
    /// Create bounds for the open interval `(lower, upper)`.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Filter `values` to the bounds and summarise what is left.
    ///
    /// # Errors
    ///
    /// [`ronda_traits::RondaError::EmptyDataset`] when no value survives.
    pub fn stats(&self, values: &[f64]) -> Result<MultipleStats> {
        MultipleStats::from_values(&filter_in_range(values, self.lower, self.upper))
    }
}

/// Relative valuation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ValuationMethod {
    /// Enterprise value over revenue.
    #[display("EV/Revenue")]
    EvRevenue,
    /// Enterprise value over EBITDA.
    #[display("EV/EBITDA")]
    EvEbitda,
    /// Price over earnings.
    #[display("P/E")]
    PriceEarnings,
    /// Current price grossed up by the median control premium.
    #[display("Control premium")]
    ControlPremium,
}

/// Value implied by applying a peer statistic to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpliedValue {
    /// Method applied.
    pub method: ValuationMethod,
    /// Target metric the multiple was applied to.
    pub metric: f64,
    /// Median multiple (or premium) applied.
    pub multiple: f64,
    /// Implied enterprise value.
    pub implied_enterprise_value: f64,
    /// Implied equity value.
    pub implied_equity_value: f64,
    /// Implied price at the median.
    pub implied_share_price: f64,
    /// Implied price at the 25th percentile.
    pub low_share_price: f64,
    /// Implied price at the 75th percentile.
    pub high_share_price: f64,
}

impl ImpliedValue {
    /// Apply an enterprise value multiple to `metric`.
    #[must_use]
    pub fn from_ev_multiple(
        method: ValuationMethod,
        metric: f64,
        stats: &MultipleStats,
        net_debt: f64,
        shares: f64,
    ) -> Self {
        let price_at = |multiple: f64| (metric * multiple - net_debt) / shares;
        let implied_enterprise_value = metric * stats.median;
        Self {
            method,
            metric,
            multiple: stats.median,
            implied_enterprise_value,
            implied_equity_value: implied_enterprise_value - net_debt,
            implied_share_price: price_at(stats.median),
            low_share_price: price_at(stats.low),
            high_share_price: price_at(stats.high),
        }
    }

    /// Apply an equity multiple (P/E) to `metric`.
    #[must_use]
    pub fn from_equity_multiple(
        method: ValuationMethod,
        metric: f64,
        stats: &MultipleStats,
        net_debt: f64,
        shares: f64,
    ) -> Self {
        let implied_equity_value = metric * stats.median;
        Self {
            method,
            metric,
            multiple: stats.median,
            implied_enterprise_value: implied_equity_value + net_debt,
            implied_equity_value,
            implied_share_price: implied_equity_value / shares,
            low_share_price: metric * stats.low / shares,
            high_share_price: metric * stats.high / shares,
        }
    }
}

/// Mean of the usable implied prices.
pub(crate) fn blended_price(implied: &[ImpliedValue]) -> f64 {
    let prices: Vec<f64> = implied
        .iter()
        .map(|v| v.implied_share_price)
        .filter(|p| p.is_finite())
        .collect();
    if prices.is_empty() {
        f64::NAN
    } else {
        prices.iter().sum::<f64>() / prices.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats() -> MultipleStats {
        MultipleStats {
            count: 4,
            low: 8.0,
            median: 10.0,
            high: 12.0,
            mean: 10.0,
        }
    }

    #[test]
    fn test_bounds_filter_before_stats() {
        let bounds = MultipleBounds::new(0.0, 50.0);
        let stats = bounds.stats(&[10.0, 20.0, 1000.0, -5.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.median, 10.0);
        assert!(bounds.stats(&[1000.0]).is_err());
    }

    #[test]
    fn test_ev_multiple() {
        let value = ImpliedValue::from_ev_multiple(ValuationMethod::EvEbitda, 100.0, &stats(), 200.0, 10.0);
        assert_relative_eq!(value.implied_enterprise_value, 1000.0);
        assert_relative_eq!(value.implied_equity_value, 800.0);
        assert_relative_eq!(value.implied_share_price, 80.0);
        assert_relative_eq!(value.low_share_price, 60.0);
        assert_relative_eq!(value.high_share_price, 100.0);
    }

    #[test]
    fn test_equity_multiple() {
        let value = ImpliedValue::from_equity_multiple(ValuationMethod::PriceEarnings, 50.0, &stats(), 200.0, 10.0);
        assert_relative_eq!(value.implied_equity_value, 500.0);
        assert_relative_eq!(value.implied_enterprise_value, 700.0);
        assert_relative_eq!(value.implied_share_price, 50.0);
    }

    #[test]
    fn test_blended_price_skips_non_finite() {
        let mut a = ImpliedValue::from_ev_multiple(ValuationMethod::EvEbitda, 100.0, &stats(), 0.0, 10.0);
        let mut b = a.clone();
        a.implied_share_price = 10.0;
        b.implied_share_price = f64::NAN;
        assert_relative_eq!(blended_price(&[a, b]), 10.0);
        assert!(blended_price(&[]).is_nan());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(ValuationMethod::EvEbitda.to_string(), "EV/EBITDA");
        assert_eq!(ValuationMethod::PriceEarnings.to_string(), "P/E");
    }
}
