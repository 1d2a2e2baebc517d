//! Sum-of-the-parts valuation.

use derive_more::Display;
use ronda_traits::{
    CompanyData, ImpliedValuation, Result, RondaError, ValuationModel, stats::ratio,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::upside;

/// How a segment's EBITDA multiple is derived.
#[derive(Debug, Clone, Copy, PartialEq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMethod {
    /// Growth-driven multiple: `10 + growth * 50`.
    #[display("DCF")]
    Dcf,
    /// Margin-driven multiple: `8 + margin * 20`.
    #[display("Comps")]
    Comps,
    /// A flat EBITDA multiple.
    #[display("{_0:.1}x EBITDA")]
    Multiple(f64),
}

/// A business segment to be valued on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment name.
    pub name: String,
    /// Segment revenue.
    pub revenue: f64,
    /// Segment EBITDA.
    pub ebitda: f64,
    /// Expected growth rate.
    pub growth_rate: f64,
    /// Valuation methodology.
    pub method: SegmentMethod,
}

/// Configuration for the SOTP model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SotpConfig {
    /// Externally supplied segments (default: a three-way split of the latest year)
    pub segments: Option<Vec<Segment>>,

    /// Unallocated corporate cost as a share of segment EBITDA (default: 5%)
    pub overhead_pct: f64,

    /// Multiple applied to corporate overhead (default: 8.0x)
    pub overhead_multiple: f64,

    /// Gross value scaling for the conservative case (default: 0.85)
    pub conservative_factor: f64,

    /// Gross value scaling for the optimistic case (default: 1.20)
    pub optimistic_factor: f64,
}

impl Default for SotpConfig {
    fn default() -> Self {
        Self {
            segments: None,
            overhead_pct: 0.05,
            overhead_multiple: 8.0,
            conservative_factor: 0.85,
            optimistic_factor: 1.20,
        }
    }
}

/// Valuation of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentValuation {
    /// Segment name.
    pub name: String,
    /// Methodology used.
    pub method: SegmentMethod,
    /// Segment revenue.
    pub revenue: f64,
    /// Segment EBITDA.
    pub ebitda: f64,
    /// EBITDA margin, when revenue is non-zero.
    pub ebitda_margin: Option<f64>,
    /// EBITDA multiple applied.
    pub multiple: f64,
    /// `EBITDA * multiple`.
    pub value: f64,
    /// Share of gross segment value.
    pub share_of_total: f64,
}

/// Equity value per share under one scaling of gross segment value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SotpScenario {
    /// Scenario name.
    pub name: String,
    /// Scaling applied to gross segment value.
    pub factor: f64,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Equity value.
    pub equity_value: f64,
    /// Equity value per share.
    pub implied_share_price: f64,
}

/// Output of the SOTP model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SotpResult {
    /// Per-segment valuations.
    pub segments: Vec<SegmentValuation>,
    /// Sum of segment values.
    pub gross_value: f64,
    /// EBITDA consumed by unallocated corporate costs.
    pub overhead_ebitda: f64,
    /// Capitalised overhead (negative).
    pub overhead_value: f64,
    /// Gross value plus overhead value.
    pub enterprise_value: f64,
    /// Net debt.
    pub net_debt: f64,
    /// Equity value.
    pub equity_value: f64,
    /// Equity value per share.
    pub implied_share_price: f64,
    /// Current share price.
    pub current_price: f64,
    /// Upside to the implied price.
    pub upside: Option<f64>,
    /// Conservative, base and optimistic cases.
    pub scenarios: Vec<SotpScenario>,
}

impl ImpliedValuation for SotpResult {
    fn implied_share_price(&self) -> f64 {
        self.implied_share_price
    }
}

/// Default revenue split, EBITDA split, growth and method per segment.
const DEFAULT_SEGMENTS: [(&str, f64, f64, f64, SegmentMethod); 3] = [
    ("Core Platform", 0.50, 0.55, 0.06, SegmentMethod::Comps),
    ("Growth Ventures", 0.30, 0.25, 0.15, SegmentMethod::Dcf),
    ("Legacy Services", 0.20, 0.20, 0.02, SegmentMethod::Multiple(7.0)),
];

/// Sum-of-the-parts valuation.
///
/// Values each segment on its own EBITDA multiple, deducts capitalised
/// corporate overhead and net debt, and brackets the result with scaled
/// conservative and optimistic cases.
#[derive(Debug, Clone, Default)]
pub struct SotpModel {
    config: SotpConfig,
}

impl SotpModel {
    /// Create a new SOTP model with the given configuration.
    #[must_use]
    pub const fn new(config: SotpConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SotpConfig {
        &self.config
    }

    /// Segments to value: the supplied ones, or a split of the latest year.
    pub fn segments(&self, data: &CompanyData) -> Result<Vec<Segment>> {
        if let Some(segments) = &self.config.segments {
            return Ok(segments.clone());
        }
        let latest = data.latest_income()?;
        Ok(DEFAULT_SEGMENTS
            .iter()
            .map(|&(name, revenue_share, ebitda_share, growth_rate, method)| Segment {
                name: name.to_string(),
                revenue: latest.revenue * revenue_share,
                ebitda: latest.ebitda * ebitda_share,
                growth_rate,
                method,
            })
            .collect())
    }

    /// EBITDA multiple for a segment under its methodology.
    pub fn segment_multiple(segment: &Segment) -> Result<f64> {
        match segment.method {
            SegmentMethod::Dcf => Ok(10.0 + segment.growth_rate * 50.0),
            SegmentMethod::Comps => {
                let margin = ratio(segment.ebitda, segment.revenue, "segment EBITDA margin")?;
                Ok(8.0 + margin * 20.0)
            }
            SegmentMethod::Multiple(multiple) => Ok(multiple),
        }
    }
}

impl ValuationModel for SotpModel {
    type Output = SotpResult;

    fn name(&self) -> &str {
        "sotp"
    }

    fn analyze(&self, data: &CompanyData) -> Result<SotpResult> {
        let segments = self.segments(data)?;
        if segments.is_empty() {
            return Err(RondaError::InvalidData(
                "SOTP needs at least one segment".to_string(),
            ));
        }
        let shares = data.shares_outstanding()?;
        let net_debt = data.net_debt()?;

        let mut valued = Vec::with_capacity(segments.len());
        for segment in &segments {
            let multiple = Self::segment_multiple(segment)?;
            valued.push(SegmentValuation {
                name: segment.name.clone(),
                method: segment.method,
                revenue: segment.revenue,
                ebitda: segment.ebitda,
                ebitda_margin: ratio(segment.ebitda, segment.revenue, "segment margin").ok(),
                multiple,
                value: segment.ebitda * multiple,
                share_of_total: 0.0,
            });
        }

        let gross_value: f64 = valued.iter().map(|s| s.value).sum();
        for segment in &mut valued {
            segment.share_of_total = ratio(segment.value, gross_value, "segment share")?;
        }

        let total_ebitda: f64 = segments.iter().map(|s| s.ebitda).sum();
        let overhead_ebitda = total_ebitda * self.config.overhead_pct;
        let overhead_value = -overhead_ebitda * self.config.overhead_multiple;

        let scenario = |name: &str, factor: f64| {
            let enterprise_value = gross_value * factor + overhead_value;
            let equity_value = enterprise_value - net_debt;
            SotpScenario {
                name: name.to_string(),
                factor,
                enterprise_value,
                equity_value,
                implied_share_price: equity_value / shares,
            }
        };
        let scenarios = vec![
            scenario("Conservative", self.config.conservative_factor),
            scenario("Base", 1.0),
            scenario("Optimistic", self.config.optimistic_factor),
        ];

        let enterprise_value = gross_value + overhead_value;
        let equity_value = enterprise_value - net_debt;
        let implied_share_price = equity_value / shares;
        let current_price = data.current_price();

        debug!(
            symbol = data.symbol(),
            segments = valued.len(),
            gross_value,
            implied_share_price,
            "SOTP valuation complete"
        );

        Ok(SotpResult {
            segments: valued,
            gross_value,
            overhead_ebitda,
            overhead_value,
            enterprise_value,
            net_debt,
            equity_value,
            implied_share_price,
            current_price,
            upside: upside(implied_share_price, current_price),
            scenarios,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    fn segment(method: SegmentMethod, growth_rate: f64) -> Segment {
        Segment {
            name: "Test".to_string(),
            revenue: 100.0,
            ebitda: 25.0,
            growth_rate,
            method,
        }
    }

    #[test]
    fn test_segment_multiples() {
        assert_relative_eq!(
            SotpModel::segment_multiple(&segment(SegmentMethod::Dcf, 0.10)).unwrap(),
            15.0
        );
        assert_relative_eq!(
            SotpModel::segment_multiple(&segment(SegmentMethod::Comps, 0.10)).unwrap(),
            13.0
        );
        assert_relative_eq!(
            SotpModel::segment_multiple(&segment(SegmentMethod::Multiple(6.5), 0.10)).unwrap(),
            6.5
        );
    }

    #[test]
    fn test_method_display() {
        assert_eq!(SegmentMethod::Dcf.to_string(), "DCF");
        assert_eq!(SegmentMethod::Multiple(7.0).to_string(), "7.0x EBITDA");
    }

    #[test]
    fn test_default_segments_reconcile() {
        let data = reference_company();
        let model = SotpModel::default();
        let segments = model.segments(&data).unwrap();
        let latest = data.latest_income().unwrap();
        let revenue: f64 = segments.iter().map(|s| s.revenue).sum();
        let ebitda: f64 = segments.iter().map(|s| s.ebitda).sum();
        assert_relative_eq!(revenue, latest.revenue, max_relative = 1e-12);
        assert_relative_eq!(ebitda, latest.ebitda, max_relative = 1e-12);
    }

    #[test]
    fn test_bridge_to_equity() {
        let data = reference_company();
        let result = SotpModel::default().analyze(&data).unwrap();
        let shares: f64 = result.segments.iter().map(|s| s.share_of_total).sum();
        assert_relative_eq!(shares, 1.0, epsilon = 1e-12);
        assert!(result.overhead_value < 0.0);
        assert_relative_eq!(
            result.overhead_value,
            -(data.latest_income().unwrap().ebitda * 0.05 * 8.0),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            result.equity_value,
            result.gross_value + result.overhead_value - result.net_debt,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_scenarios_are_ordered() {
        let data = reference_company();
        let result = SotpModel::default().analyze(&data).unwrap();
        let prices: Vec<f64> = result
            .scenarios
            .iter()
            .map(|s| s.implied_share_price)
            .collect();
        assert!(prices[0] < prices[1]);
        assert!(prices[1] < prices[2]);
        assert_relative_eq!(prices[1], result.implied_share_price, max_relative = 1e-12);
    }

    #[test]
    fn test_supplied_segments() {
        let data = reference_company();
        let model = SotpModel::new(SotpConfig {
            segments: Some(vec![Segment {
                name: "Only".to_string(),
                revenue: 10.0e9,
                ebitda: 4.0e9,
                growth_rate: 0.0,
                method: SegmentMethod::Multiple(10.0),
            }]),
            overhead_pct: 0.0,
            ..Default::default()
        });
        let result = model.analyze(&data).unwrap();
        assert_relative_eq!(result.gross_value, 40.0e9, max_relative = 1e-12);
        assert_relative_eq!(result.implied_share_price, 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_comps_segment_without_revenue() {
        let data = reference_company();
        let model = SotpModel::new(SotpConfig {
            segments: Some(vec![Segment {
                name: "Shell".to_string(),
                revenue: 0.0,
                ebitda: 1.0,
                growth_rate: 0.0,
                method: SegmentMethod::Comps,
            }]),
            ..Default::default()
        });
        assert!(matches!(
            model.analyze(&data),
            Err(RondaError::DegenerateInput(_))
        ));
    }
}
