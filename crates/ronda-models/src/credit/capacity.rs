//! Debt capacity, covenant and credit profile analysis.

use derive_more::Display;
use ronda_traits::{CompanyData, Date, Result, RondaError, ValuationModel, stats::ratio};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Leverage breakpoints and spreads of the pricing grid.
const PRICING_GRID: [(f64, Option<f64>, u32); 6] = [
    (0.0, Some(1.0), 150),
    (1.0, Some(2.0), 200),
    (2.0, Some(3.0), 275),
    (3.0, Some(4.0), 350),
    (4.0, Some(5.0), 450),
    (5.0, None, 600),
];

/// Configuration for the credit model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditConfig {
    /// Maximum debt over EBITDA (default: 3.0x)
    pub target_leverage: f64,

    /// Minimum EBITDA over interest (default: 3.0x)
    pub min_interest_coverage: f64,

    /// Covenant headroom over the targets (default: 20%)
    pub covenant_cushion: f64,

    /// Cost of debt (default: 5%)
    pub interest_rate: f64,

    /// Annual EBITDA growth in the projection (default: 8%)
    pub ebitda_growth: f64,

    /// Number of projection years (default: 5)
    pub projection_years: usize,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            target_leverage: 3.0,
            min_interest_coverage: 3.0,
            covenant_cushion: 0.20,
            interest_rate: 0.05,
            ebitda_growth: 0.08,
            projection_years: 5,
        }
    }
}

/// Credit metrics for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditMetrics {
    /// Fiscal period end date, when known.
    pub date: Option<Date>,
    /// EBITDA.
    pub ebitda: f64,
    /// Total debt.
    pub debt: f64,
    /// Debt over EBITDA; `None` when EBITDA is not positive.
    pub leverage: Option<f64>,
    /// Debt net of cash over EBITDA.
    pub net_leverage: Option<f64>,
    /// Debt times the cost of debt.
    pub interest: f64,
    /// EBITDA over interest; `None` without debt.
    pub interest_coverage: Option<f64>,
}

/// Projected credit metrics with debt held flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProjection {
    /// Projection year, starting at 1.
    pub year: usize,
    /// Projected EBITDA.
    pub ebitda: f64,
    /// Debt over EBITDA.
    pub leverage: f64,
    /// EBITDA over interest; `None` without debt.
    pub interest_coverage: Option<f64>,
}

/// Covenant test outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovenantTest {
    /// Covenant name.
    pub name: String,
    /// Limit the metric is tested against.
    pub threshold: f64,
    /// Current value; `None` when the metric is undefined.
    pub actual: Option<f64>,
    /// Whether the covenant is met.
    pub pass: bool,
    /// Distance to the limit as a share of the limit.
    pub cushion: Option<f64>,
}

/// One row of the leverage-based pricing grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    /// Inclusive lower leverage bound.
    pub min_leverage: f64,
    /// Exclusive upper leverage bound; open-ended for the top tier.
    pub max_leverage: Option<f64>,
    /// Spread over the base rate in basis points.
    pub spread_bps: u32,
    /// Whether the company's current leverage falls in this tier.
    pub applicable: bool,
}

/// Leverage-based credit profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditRating {
    /// Leverage below 2.0x.
    #[display("Investment Grade")]
    InvestmentGrade,
    /// Leverage from 2.0x to 4.0x.
    #[display("Speculative")]
    Speculative,
    /// Leverage of 4.0x or more.
    #[display("High Yield")]
    HighYield,
}

impl CreditRating {
    /// Rating for a debt over EBITDA ratio.
    #[must_use]
    pub const fn from_leverage(leverage: f64) -> Self {
        if leverage < 2.0 {
            Self::InvestmentGrade
        } else if leverage < 4.0 {
            Self::Speculative
        } else {
            Self::HighYield
        }
    }
}

/// Output of the credit model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditResult {
    /// Per-period history, oldest first.
    pub history: Vec<CreditMetrics>,
    /// Latest-period metrics.
    pub current: CreditMetrics,
    /// Forward projection.
    pub projections: Vec<CreditProjection>,
    /// Debt supported at the target leverage.
    pub leverage_capacity: f64,
    /// Debt supported at the minimum coverage.
    pub coverage_capacity: f64,
    /// The lesser of the two capacities.
    pub debt_capacity: f64,
    /// Capacity less current debt.
    pub headroom: f64,
    /// Maximum leverage and minimum coverage tests.
    pub covenants: Vec<CovenantTest>,
    /// Pricing grid with the applicable tier flagged.
    pub pricing_grid: Vec<PricingTier>,
    /// Spread at current leverage.
    pub spread_bps: u32,
    /// Leverage-based profile.
    pub rating: CreditRating,
}

/// Credit capacity model.
#[derive(Debug, Clone, Default)]
pub struct CreditModel {
    config: CreditConfig,
}

impl CreditModel {
    /// Create a new credit model with the given configuration.
    #[must_use]
    pub const fn new(config: CreditConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CreditConfig {
        &self.config
    }

    fn coverage(&self, ebitda: f64, debt: f64) -> Option<f64> {
        let interest = debt * self.config.interest_rate;
        (interest > 0.0).then(|| ebitda / interest)
    }

    fn metrics(&self, data: &CompanyData) -> Vec<CreditMetrics> {
        let n = data.periods();
        let income = &data.income_statements[data.income_statements.len() - n..];
        let balances = &data.balance_sheets[data.balance_sheets.len() - n..];

        income
            .iter()
            .zip(balances)
            .map(|(is, bs)| {
                let positive = is.ebitda > 0.0;
                let debt = bs.total_debt;
                CreditMetrics {
                    date: bs.date.or(is.date),
                    ebitda: is.ebitda,
                    debt,
                    leverage: positive.then(|| debt / is.ebitda),
                    net_leverage: positive.then(|| bs.net_debt() / is.ebitda),
                    interest: debt * self.config.interest_rate,
                    interest_coverage: self.coverage(is.ebitda, debt),
                }
            })
            .collect()
    }

    /// Pricing grid with the tier containing `leverage` flagged.
    #[must_use]
    pub fn pricing_grid(leverage: f64) -> Vec<PricingTier> {
        PRICING_GRID
            .iter()
            .map(|&(min_leverage, max_leverage, spread_bps)| PricingTier {
                min_leverage,
                max_leverage,
                spread_bps,
                applicable: leverage >= min_leverage && max_leverage.is_none_or(|max| leverage < max),
            })
            .collect()
    }

    fn covenants(&self, current: &CreditMetrics) -> Vec<CovenantTest> {
        let cfg = &self.config;
        let max_leverage = cfg.target_leverage * (1.0 + cfg.covenant_cushion);
        let min_coverage = cfg.min_interest_coverage * (1.0 - cfg.covenant_cushion);

        vec![
            CovenantTest {
                name: "Maximum leverage".to_string(),
                threshold: max_leverage,
                actual: current.leverage,
                pass: current.leverage.is_some_and(|l| l <= max_leverage),
                cushion: current
                    .leverage
                    .and_then(|l| ratio(max_leverage - l, max_leverage, "leverage cushion").ok()),
            },
            CovenantTest {
                name: "Minimum interest coverage".to_string(),
                threshold: min_coverage,
                actual: current.interest_coverage,
                pass: current.interest_coverage.is_none_or(|c| c >= min_coverage),
                cushion: current
                    .interest_coverage
                    .and_then(|c| ratio(c - min_coverage, min_coverage, "coverage cushion").ok()),
            },
        ]
    }
}

impl ValuationModel for CreditModel {
    type Output = CreditResult;

    fn name(&self) -> &str {
        "credit"
    }

    fn analyze(&self, data: &CompanyData) -> Result<CreditResult> {
        data.validate_history(self.min_periods())?;
        let cfg = &self.config;

        let history = self.metrics(data);
        let current = history
            .last()
            .cloned()
            .ok_or_else(|| RondaError::InsufficientData("no credit history".to_string()))?;
        let leverage = current.leverage.ok_or_else(|| {
            RondaError::DegenerateInput(format!(
                "{}: credit analysis needs positive EBITDA",
                data.symbol()
            ))
        })?;

        let mut ebitda = current.ebitda;
        let projections = (1..=cfg.projection_years)
            .map(|year| {
                ebitda *= 1.0 + cfg.ebitda_growth;
                CreditProjection {
                    year,
                    ebitda,
                    leverage: current.debt / ebitda,
                    interest_coverage: self.coverage(ebitda, current.debt),
                }
            })
            .collect();

        let leverage_capacity = cfg.target_leverage * current.ebitda;
        let coverage_capacity = current.ebitda / (cfg.min_interest_coverage * cfg.interest_rate);
        let debt_capacity = leverage_capacity.min(coverage_capacity);
        let pricing_grid = Self::pricing_grid(leverage);
        let spread_bps = pricing_grid
            .iter()
            .find(|tier| tier.applicable)
            .map_or(0, |tier| tier.spread_bps);
        let rating = CreditRating::from_leverage(leverage);

        debug!(
            symbol = data.symbol(),
            leverage,
            debt_capacity,
            %rating,
            "credit analysis complete"
        );

        Ok(CreditResult {
            covenants: self.covenants(&current),
            headroom: debt_capacity - current.debt,
            history,
            current,
            projections,
            leverage_capacity,
            coverage_capacity,
            debt_capacity,
            pricing_grid,
            spread_bps,
            rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    const B: f64 = 1_000_000_000.0;

    #[test]
    fn test_default_config() {
        let config = CreditConfig::default();
        assert_relative_eq!(config.target_leverage, 3.0);
        assert_eq!(config.projection_years, 5);
    }

    #[test]
    fn test_current_metrics() {
        let result = CreditModel::default().analyze(&reference_company()).unwrap();
        let current = &result.current;
        assert_relative_eq!(current.leverage.unwrap(), 50.0 / 30.0, epsilon = 1e-12);
        assert_relative_eq!(current.net_leverage.unwrap(), 20.0 / 30.0, epsilon = 1e-12);
        assert_relative_eq!(current.interest, 2.5 * B, max_relative = 1e-12);
        assert_relative_eq!(current.interest_coverage.unwrap(), 12.0, epsilon = 1e-9);
        assert_eq!(result.history.len(), 5);
    }

    #[test]
    fn test_capacity_and_headroom() {
        let result = CreditModel::default().analyze(&reference_company()).unwrap();
        assert_relative_eq!(result.leverage_capacity, 90.0 * B, max_relative = 1e-12);
        assert_relative_eq!(result.coverage_capacity, 200.0 * B, max_relative = 1e-12);
        assert_relative_eq!(result.debt_capacity, 90.0 * B, max_relative = 1e-12);
        assert_relative_eq!(result.headroom, 40.0 * B, max_relative = 1e-12);
    }

    #[test]
    fn test_covenants_and_rating() {
        let result = CreditModel::default().analyze(&reference_company()).unwrap();
        assert!(result.covenants.iter().all(|c| c.pass));
        assert_relative_eq!(result.covenants[0].threshold, 3.6, epsilon = 1e-12);
        assert_relative_eq!(result.covenants[1].threshold, 2.4, epsilon = 1e-12);
        assert_eq!(result.rating, CreditRating::InvestmentGrade);
        assert_eq!(result.spread_bps, 200);
        assert_eq!(result.pricing_grid.iter().filter(|t| t.applicable).count(), 1);
    }

    #[test]
    fn test_projection_deleverages() {
        let result = CreditModel::default().analyze(&reference_company()).unwrap();
        assert_eq!(result.projections.len(), 5);
        assert_relative_eq!(result.projections[0].ebitda, 32.4 * B, max_relative = 1e-12);
        for pair in result.projections.windows(2) {
            assert!(pair[1].leverage < pair[0].leverage);
        }
    }

    #[test]
    fn test_rating_ladder() {
        assert_eq!(CreditRating::from_leverage(1.99), CreditRating::InvestmentGrade);
        assert_eq!(CreditRating::from_leverage(2.0), CreditRating::Speculative);
        assert_eq!(CreditRating::from_leverage(4.0), CreditRating::HighYield);
        assert_eq!(CreditRating::HighYield.to_string(), "High Yield");
    }

    #[test]
    fn test_top_tier_is_open_ended() {
        let grid = CreditModel::pricing_grid(9.0);
        let tier = grid.iter().find(|t| t.applicable).unwrap();
        assert_eq!(tier.spread_bps, 600);
        assert!(tier.max_leverage.is_none());
    }

    #[test]
    fn test_debt_free_company() {
        let mut data = reference_company();
        for bs in &mut data.balance_sheets {
            bs.total_debt = 0.0;
        }
        let result = CreditModel::default().analyze(&data).unwrap();
        assert!(result.current.interest_coverage.is_none());
        assert!(result.covenants[1].pass);
        assert_eq!(result.rating, CreditRating::InvestmentGrade);
    }

    #[test]
    fn test_negative_ebitda_is_degenerate() {
        let mut data = reference_company();
        if let Some(latest) = data.income_statements.last_mut() {
            latest.ebitda = -1.0;
        }
        assert!(matches!(
            CreditModel::default().analyze(&data),
            Err(RondaError::DegenerateInput(_))
        ));
    }
}
