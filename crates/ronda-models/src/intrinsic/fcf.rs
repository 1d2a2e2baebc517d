//! Historical free cash flow analysis and margin-path projection.

use ronda_traits::{
    CompanyData, Date, Result, ValuationModel,
    stats::{self, ratio},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the FCF analysis model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FcfConfig {
    /// Annual revenue growth used in the projection (default: 8%)
    pub growth_rate: f64,

    /// FCF margin reached in the final projection year
    /// (default: historical average plus two percentage points)
    pub target_margin: Option<f64>,

    /// Number of projection years (default: 5)
    pub projection_years: usize,
}

impl Default for FcfConfig {
    fn default() -> Self {
        Self {
            growth_rate: 0.08,
            target_margin: None,
            projection_years: 5,
        }
    }
}

/// Free cash flow profile of one historical period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfPeriod {
    /// Fiscal period end date, when known.
    pub date: Option<Date>,
    /// Revenue.
    pub revenue: f64,
    /// Operating cash flow.
    pub operating_cash_flow: f64,
    /// Capital expenditure magnitude.
    pub capex: f64,
    /// `OCF - |CapEx|`.
    pub free_cash_flow: f64,
    /// FCF over revenue.
    pub fcf_margin: f64,
    /// FCF over net income; `None` when net income is zero.
    pub fcf_conversion: Option<f64>,
    /// FCF less stock-based compensation, when SBC is reported.
    pub sbc_adjusted_fcf: Option<f64>,
}

/// Aggregate statistics over the historical periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfMetrics {
    /// Mean FCF margin.
    pub average_margin: f64,
    /// Mean FCF conversion over periods where it is defined.
    pub average_conversion: Option<f64>,
    /// Compound growth of FCF from the earliest to the latest period.
    pub cagr: Option<f64>,
    /// Standard deviation over mean of the FCF series.
    pub volatility: Option<f64>,
    /// Most recent FCF.
    pub latest_fcf: f64,
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfProjectionYear {
    /// Projection year, starting at 1.
    pub year: usize,
    /// Projected revenue.
    pub revenue: f64,
    /// Interpolated FCF margin.
    pub fcf_margin: f64,
    /// Projected FCF.
    pub free_cash_flow: f64,
}

/// Output of the FCF analysis model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfAnalysis {
    /// Per-period history, oldest first.
    pub history: Vec<FcfPeriod>,
    /// Aggregate metrics.
    pub metrics: FcfMetrics,
    /// Margin the projection converges to.
    pub target_margin: f64,
    /// Forward projection.
    pub projections: Vec<FcfProjectionYear>,
}

/// Free cash flow analysis.
///
/// Recomputes FCF as operating cash flow less the capex magnitude for every
/// period, summarises margin, conversion, growth and stability, then projects
/// forward with the margin moving linearly toward a target.
#[derive(Debug, Clone, Default)]
pub struct FcfModel {
    config: FcfConfig,
}

impl FcfModel {
    /// Create a new FCF analysis model with the given configuration.
    #[must_use]
    pub const fn new(config: FcfConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FcfConfig {
        &self.config
    }

    fn history(data: &CompanyData) -> Result<Vec<FcfPeriod>> {
        let n = data.periods();
        let income = &data.income_statements[data.income_statements.len() - n..];
        let cash_flows = &data.cash_flows[data.cash_flows.len() - n..];

        income
            .iter()
            .zip(cash_flows)
            .map(|(is, cf)| {
                let free_cash_flow = cf.operating_cash_flow - cf.capex();
                Ok(FcfPeriod {
                    date: cf.date.or(is.date),
                    revenue: is.revenue,
                    operating_cash_flow: cf.operating_cash_flow,
                    capex: cf.capex(),
                    free_cash_flow,
                    fcf_margin: ratio(free_cash_flow, is.revenue, "FCF margin")?,
                    fcf_conversion: ratio(free_cash_flow, is.net_income, "FCF conversion").ok(),
                    sbc_adjusted_fcf: cf.stock_based_compensation.map(|sbc| free_cash_flow - sbc),
                })
            })
            .collect()
    }

    fn metrics(history: &[FcfPeriod]) -> Result<FcfMetrics> {
        let margins: Vec<f64> = history.iter().map(|p| p.fcf_margin).collect();
        let conversions: Vec<f64> = history.iter().filter_map(|p| p.fcf_conversion).collect();
        let fcfs: Vec<f64> = history.iter().map(|p| p.free_cash_flow).collect();

        let cagr = match (fcfs.first(), fcfs.last()) {
            (Some(&first), Some(&last)) if fcfs.len() >= 2 => {
                stats::cagr(first, last, fcfs.len() - 1).ok()
            }
            _ => None,
        };

        Ok(FcfMetrics {
            average_margin: stats::mean(&margins)?,
            average_conversion: stats::mean(&conversions).ok(),
            cagr,
            volatility: stats::volatility(&fcfs).ok(),
            latest_fcf: fcfs.last().copied().unwrap_or_default(),
        })
    }
}

impl ValuationModel for FcfModel {
    type Output = FcfAnalysis;

    fn name(&self) -> &str {
        "fcf"
    }

    fn analyze(&self, data: &CompanyData) -> Result<FcfAnalysis> {
        data.validate_history(self.min_periods())?;

        let history = Self::history(data)?;
        let metrics = Self::metrics(&history)?;
        let target_margin = self
            .config
            .target_margin
            .unwrap_or(metrics.average_margin + 0.02);

        let horizon = self.config.projection_years;
        let mut revenue = data.latest_income()?.revenue;
        let projections = (1..=horizon)
            .map(|year| {
                revenue *= 1.0 + self.config.growth_rate;
                let progress = year as f64 / horizon as f64;
                let fcf_margin =
                    metrics.average_margin + (target_margin - metrics.average_margin) * progress;
                FcfProjectionYear {
                    year,
                    revenue,
                    fcf_margin,
                    free_cash_flow: revenue * fcf_margin,
                }
            })
            .collect();

        debug!(
            symbol = data.symbol(),
            average_margin = metrics.average_margin,
            cagr = ?metrics.cagr,
            "FCF analysis complete"
        );

        Ok(FcfAnalysis {
            history,
            metrics,
            target_margin,
            projections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::{RondaError, sample::reference_company};

    #[test]
    fn test_default_config() {
        let config = FcfConfig::default();
        assert_relative_eq!(config.growth_rate, 0.08);
        assert!(config.target_margin.is_none());
        assert_eq!(config.projection_years, 5);
    }

    #[test]
    fn test_history_uses_capex_magnitude() {
        let data = reference_company();
        let analysis = FcfModel::default().analyze(&data).unwrap();
        assert_eq!(analysis.history.len(), 5);
        for period in &analysis.history {
            assert_relative_eq!(period.fcf_margin, 0.20, epsilon = 1e-12);
            assert_relative_eq!(period.fcf_conversion.unwrap(), 1.0, epsilon = 1e-12);
            assert!(period.sbc_adjusted_fcf.unwrap() < period.free_cash_flow);
        }
    }

    #[test]
    fn test_metrics() {
        let data = reference_company();
        let metrics = FcfModel::default().analyze(&data).unwrap().metrics;
        assert_relative_eq!(metrics.average_margin, 0.20, epsilon = 1e-12);
        let expected_cagr = (100.0_f64 / 70.0).powf(0.25) - 1.0;
        assert_relative_eq!(metrics.cagr.unwrap(), expected_cagr, epsilon = 1e-12);
        assert!(metrics.volatility.unwrap() > 0.0);
    }

    #[test]
    fn test_projection_reaches_target_margin() {
        let data = reference_company();
        let model = FcfModel::new(FcfConfig {
            target_margin: Some(0.30),
            ..Default::default()
        });
        let analysis = model.analyze(&data).unwrap();
        let first = &analysis.projections[0];
        let last = analysis.projections.last().unwrap();
        assert_relative_eq!(first.fcf_margin, 0.22, epsilon = 1e-12);
        assert_relative_eq!(last.fcf_margin, 0.30, epsilon = 1e-12);
        assert_relative_eq!(first.revenue, 108_000_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_net_income_leaves_conversion_undefined() {
        let mut data = reference_company();
        data.income_statements[0].net_income = 0.0;
        let analysis = FcfModel::default().analyze(&data).unwrap();
        assert!(analysis.history[0].fcf_conversion.is_none());
        assert!(analysis.metrics.average_conversion.is_some());
    }

    #[test]
    fn test_zero_revenue_is_degenerate() {
        let mut data = reference_company();
        data.income_statements[2].revenue = 0.0;
        assert!(matches!(
            FcfModel::default().analyze(&data),
            Err(RondaError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_single_period_has_no_cagr() {
        let mut data = reference_company();
        data.income_statements.drain(..4);
        data.cash_flows.drain(..4);
        data.balance_sheets.drain(..4);
        let analysis = FcfModel::default().analyze(&data).unwrap();
        assert!(analysis.metrics.cagr.is_none());
    }
}
