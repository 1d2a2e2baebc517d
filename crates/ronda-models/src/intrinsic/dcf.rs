//! Discounted cash flow model.

use ronda_traits::{
    CompanyData, ImpliedValuation, Result, RondaError, ValuationModel, stats::ratio,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::upside;

/// Configuration for the DCF model.
///
/// Fields left at `None` are derived from the snapshot when the model runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfConfig {
    /// Number of explicit projection years (default: 5)
    pub projection_years: usize,

    /// Revenue growth per projection year (default: 15%, 12%, 10%, 8%, 6%).
    /// When shorter than the horizon, the last rate repeats.
    pub revenue_growth: Vec<f64>,

    /// Perpetual growth rate for the Gordon terminal value (default: 2.5%)
    pub terminal_growth: f64,

    /// Discount rate override (default: CAPM-derived WACC)
    pub wacc: Option<f64>,

    /// Cash tax rate applied to EBIT (default: 21%)
    pub tax_rate: f64,

    /// Risk-free rate for CAPM (default: 4.5%)
    pub risk_free_rate: f64,

    /// Equity market risk premium for CAPM (default: 6.5%)
    pub market_risk_premium: f64,

    /// Beta override (default: the profile beta)
    pub beta: Option<f64>,

    /// After-tax cost of debt used in the default WACC (default: 4%)
    pub cost_of_debt: f64,

    /// Equity weight in the default WACC; debt takes the remainder (default: 70%)
    pub equity_weight: f64,

    /// EBITDA as a share of revenue (default: 30%)
    pub ebitda_margin: f64,

    /// Depreciation and amortization as a share of revenue (default: 5%)
    pub da_pct: f64,

    /// Capital expenditure as a share of revenue (default: 8%)
    pub capex_pct: f64,

    /// Net working capital investment as a share of the revenue change (default: 3%)
    pub nwc_pct: f64,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            projection_years: 5,
            revenue_growth: vec![0.15, 0.12, 0.10, 0.08, 0.06],
            terminal_growth: 0.025,
            wacc: None,
            tax_rate: 0.21,
            risk_free_rate: 0.045,
            market_risk_premium: 0.065,
            beta: None,
            cost_of_debt: 0.04,
            equity_weight: 0.70,
            ebitda_margin: 0.30,
            da_pct: 0.05,
            capex_pct: 0.08,
            nwc_pct: 0.03,
        }
    }
}

/// One explicit projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfProjection {
    /// Projection year, starting at 1.
    pub year: usize,
    /// Revenue growth applied this year.
    pub growth: f64,
    /// Projected revenue.
    pub revenue: f64,
    /// Projected EBITDA.
    pub ebitda: f64,
    /// Depreciation and amortization.
    pub depreciation: f64,
    /// EBITDA less D&A.
    pub ebit: f64,
    /// EBIT after tax.
    pub nopat: f64,
    /// Capital expenditure.
    pub capex: f64,
    /// Investment in net working capital.
    pub change_in_nwc: f64,
    /// Unlevered free cash flow.
    pub free_cash_flow: f64,
    /// `(1 + WACC)^year`.
    pub discount_factor: f64,
    /// Free cash flow divided by the discount factor.
    pub present_value: f64,
}

/// Output of the DCF model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    /// Discount rate used.
    pub wacc: f64,
    /// CAPM cost of equity.
    pub cost_of_equity: f64,
    /// Terminal growth rate used.
    pub terminal_growth: f64,
    /// Year-by-year projection.
    pub projections: Vec<DcfProjection>,
    /// Sum of discounted explicit-period cash flows.
    pub sum_pv_fcf: f64,
    /// Undiscounted Gordon growth terminal value.
    pub terminal_value: f64,
    /// Terminal value discounted back from the final projection year.
    pub pv_terminal_value: f64,
    /// Share of enterprise value coming from the terminal value.
    pub terminal_value_share: f64,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Net debt from the latest balance sheet.
    pub net_debt: f64,
    /// Enterprise value less net debt.
    pub equity_value: f64,
    /// Shares outstanding.
    pub shares_outstanding: f64,
    /// Equity value per share.
    pub implied_share_price: f64,
    /// Current share price.
    pub current_price: f64,
    /// `(implied - current) / current`; `None` without a positive current price.
    pub upside: Option<f64>,
}

impl ImpliedValuation for DcfResult {
    fn implied_share_price(&self) -> f64 {
        self.implied_share_price
    }
}

/// Implied share prices over a WACC by terminal growth grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfSensitivity {
    /// Discount rates, one per row.
    pub waccs: Vec<f64>,
    /// Terminal growth rates, one per column.
    pub terminal_growths: Vec<f64>,
    /// `prices[row][col]`; `None` where the pair is degenerate.
    pub prices: Vec<Vec<Option<f64>>>,
}

/// Discounted cash flow valuation.
///
/// Projects revenue with a per-year growth schedule, derives unlevered free
/// cash flow from fixed margin assumptions, and capitalises the final year
/// with a Gordon growth terminal value.
///
/// # Example
///
/// ```
/// use ronda_models::intrinsic::{DcfConfig, DcfModel};
/// use ronda_traits::{ValuationModel, sample::reference_company};
///
/// let model = DcfModel::new(DcfConfig {
///     wacc: Some(0.10),
///     ..Default::default()
/// });
/// let result = model.analyze(&reference_company()).unwrap();
/// assert!(result.enterprise_value > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DcfModel {
    config: DcfConfig,
}

impl DcfModel {
    /// Create a new DCF model with the given configuration.
    #[must_use]
    pub const fn new(config: DcfConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &DcfConfig {
        &self.config
    }

    /// Beta used for the cost of equity.
    #[must_use]
    pub fn beta(&self, data: &CompanyData) -> f64 {
        self.config.beta.unwrap_or(data.profile.beta)
    }

    /// CAPM cost of equity: `rf + beta * MRP`.
    #[must_use]
    pub fn cost_of_equity(&self, data: &CompanyData) -> f64 {
        self.config.risk_free_rate + self.beta(data) * self.config.market_risk_premium
    }

    /// Effective discount rate: the override, or the CAPM-weighted default.
    #[must_use]
    pub fn resolve_wacc(&self, data: &CompanyData) -> f64 {
        self.config.wacc.unwrap_or_else(|| {
            let weight = self.config.equity_weight;
            weight * self.cost_of_equity(data) + (1.0 - weight) * self.config.cost_of_debt
        })
    }

    /// Growth rate for a 1-based projection year.
    fn growth_for_year(&self, year: usize) -> f64 {
        let rates = &self.config.revenue_growth;
        rates
            .get(year - 1)
            .or_else(|| rates.last())
            .copied()
            .unwrap_or(0.0)
    }

    fn validate(&self) -> Result<()> {
        if self.config.projection_years == 0 {
            return Err(RondaError::InvalidData(
                "DCF projection horizon must be at least one year".to_string(),
            ));
        }
        if self.config.revenue_growth.is_empty() {
            return Err(RondaError::InvalidData(
                "DCF revenue growth schedule is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Implied share price over a grid of discount and terminal growth rates.
    ///
    /// Each cell runs an independent model built from a copy of this model's
    /// configuration, so `self` is left untouched and repeated calls return
    /// the same table.
    pub fn sensitivity_analysis(
        &self,
        data: &CompanyData,
        wacc_range: &[f64],
        growth_range: &[f64],
    ) -> Result<DcfSensitivity> {
        self.validate()?;
        data.validate_history(self.min_periods())?;

        let mut prices = Vec::with_capacity(wacc_range.len());
        for &wacc in wacc_range {
            let mut row = Vec::with_capacity(growth_range.len());
            for &terminal_growth in growth_range {
                let cell = Self::new(DcfConfig {
                    wacc: Some(wacc),
                    terminal_growth,
                    ..self.config.clone()
                });
                row.push(match cell.analyze(data) {
                    Ok(result) if result.is_finite() => Some(result.implied_share_price),
                    Ok(_) => None,
                    Err(e) if e.is_degenerate() => None,
                    Err(e) => return Err(e),
                });
            }
            prices.push(row);
        }

        Ok(DcfSensitivity {
            waccs: wacc_range.to_vec(),
            terminal_growths: growth_range.to_vec(),
            prices,
        })
    }
}

impl ValuationModel for DcfModel {
    type Output = DcfResult;

    fn name(&self) -> &str {
        "dcf"
    }

    fn analyze(&self, data: &CompanyData) -> Result<DcfResult> {
        self.validate()?;
        let latest = data.latest_income()?;
        if latest.revenue <= 0.0 {
            return Err(RondaError::DegenerateInput(format!(
                "{}: DCF requires positive base revenue",
                data.symbol()
            )));
        }

        let cfg = &self.config;
        let wacc = self.resolve_wacc(data);
        let terminal_growth = cfg.terminal_growth;
        if wacc <= terminal_growth {
            return Err(RondaError::DegenerateInput(format!(
                "WACC ({wacc:.4}) must exceed terminal growth ({terminal_growth:.4})"
            )));
        }

        let shares = data.shares_outstanding()?;
        let net_debt = data.net_debt()?;

        let mut projections = Vec::with_capacity(cfg.projection_years);
        let mut prior_revenue = latest.revenue;

        for year in 1..=cfg.projection_years {
            let growth = self.growth_for_year(year);
            let revenue = prior_revenue * (1.0 + growth);
            let ebitda = revenue * cfg.ebitda_margin;
            let depreciation = revenue * cfg.da_pct;
            let ebit = ebitda - depreciation;
            let nopat = ebit * (1.0 - cfg.tax_rate);
            let capex = revenue * cfg.capex_pct;
            let change_in_nwc = (revenue - prior_revenue) * cfg.nwc_pct;
            let free_cash_flow = nopat + depreciation - capex - change_in_nwc;
            let discount_factor = (1.0 + wacc).powi(year as i32);

            projections.push(DcfProjection {
                year,
                growth,
                revenue,
                ebitda,
                depreciation,
                ebit,
                nopat,
                capex,
                change_in_nwc,
                free_cash_flow,
                discount_factor,
                present_value: free_cash_flow / discount_factor,
            });
            prior_revenue = revenue;
        }

        let sum_pv_fcf: f64 = projections.iter().map(|p| p.present_value).sum();
        let (last_fcf, last_factor) = projections
            .last()
            .map(|p| (p.free_cash_flow, p.discount_factor))
            .ok_or_else(|| RondaError::InvalidData("empty DCF projection".to_string()))?;

        let terminal_value = last_fcf * (1.0 + terminal_growth) / (wacc - terminal_growth);
        let pv_terminal_value = terminal_value / last_factor;
        let enterprise_value = sum_pv_fcf + pv_terminal_value;
        let terminal_value_share = ratio(pv_terminal_value, enterprise_value, "terminal value share")?;

        let equity_value = enterprise_value - net_debt;
        let implied_share_price = equity_value / shares;
        let current_price = data.current_price();

        debug!(
            symbol = data.symbol(),
            wacc,
            enterprise_value,
            implied_share_price,
            "DCF valuation complete"
        );

        Ok(DcfResult {
            wacc,
            cost_of_equity: self.cost_of_equity(data),
            terminal_growth,
            projections,
            sum_pv_fcf,
            terminal_value,
            pv_terminal_value,
            terminal_value_share,
            enterprise_value,
            net_debt,
            equity_value,
            shares_outstanding: shares,
            implied_share_price,
            current_price,
            upside: upside(implied_share_price, current_price),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    fn model_with_wacc(wacc: f64) -> DcfModel {
        DcfModel::new(DcfConfig {
            wacc: Some(wacc),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = DcfConfig::default();
        assert_eq!(config.projection_years, 5);
        assert_eq!(config.revenue_growth, vec![0.15, 0.12, 0.10, 0.08, 0.06]);
        assert_relative_eq!(config.terminal_growth, 0.025);
        assert!(config.wacc.is_none());
        assert_relative_eq!(config.ebitda_margin, 0.30);
    }

    #[test]
    fn test_default_wacc_from_capm() {
        let data = reference_company();
        let model = DcfModel::default();
        // 0.7 * (4.5% + 1.1 * 6.5%) + 0.3 * 4%
        assert_relative_eq!(model.resolve_wacc(&data), 0.09355, epsilon = 1e-12);
        assert_relative_eq!(model.cost_of_equity(&data), 0.1165, epsilon = 1e-12);
    }

    #[test]
    fn test_first_year_cash_flow() {
        let data = reference_company();
        let result = model_with_wacc(0.10).analyze(&data).unwrap();
        let first = &result.projections[0];
        let b = 1_000_000_000.0;
        assert_relative_eq!(first.revenue, 115.0 * b, max_relative = 1e-12);
        assert_relative_eq!(first.ebitda, 34.5 * b, max_relative = 1e-12);
        assert_relative_eq!(first.change_in_nwc, 0.45 * b, max_relative = 1e-9);
        assert_relative_eq!(first.free_cash_flow, 18.8125 * b, max_relative = 1e-9);
        assert_relative_eq!(first.present_value, 18.8125 * b / 1.1, max_relative = 1e-9);
    }

    #[test]
    fn test_reference_round_trip() {
        let data = reference_company();
        let result = DcfModel::new(DcfConfig {
            wacc: Some(0.10),
            terminal_growth: 0.025,
            ..Default::default()
        })
        .analyze(&data)
        .unwrap();

        assert!(result.enterprise_value > 0.0);
        assert_eq!(result.projections.len(), 5);
        let expected = (result.implied_share_price - data.current_price()) / data.current_price();
        let upside = result.upside.unwrap();
        assert_relative_eq!(upside, expected, epsilon = 1e-12);
        assert_eq!(
            upside > 0.0,
            result.implied_share_price > data.current_price()
        );
        assert_relative_eq!(
            result.equity_value,
            result.enterprise_value - 20_000_000_000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_price_decreases_with_wacc() {
        let data = reference_company();
        let prices: Vec<f64> = [0.08, 0.10, 0.12]
            .iter()
            .map(|&w| model_with_wacc(w).analyze(&data).unwrap().implied_share_price)
            .collect();
        assert!(prices[0] > prices[1]);
        assert!(prices[1] > prices[2]);
    }

    #[test]
    fn test_wacc_not_above_terminal_growth() {
        let data = reference_company();
        let model = DcfModel::new(DcfConfig {
            wacc: Some(0.025),
            terminal_growth: 0.025,
            ..Default::default()
        });
        assert!(matches!(
            model.analyze(&data),
            Err(RondaError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_short_growth_schedule_repeats_last_rate() {
        let data = reference_company();
        let model = DcfModel::new(DcfConfig {
            revenue_growth: vec![0.20, 0.05],
            wacc: Some(0.10),
            ..Default::default()
        });
        let result = model.analyze(&data).unwrap();
        let growths: Vec<f64> = result.projections.iter().map(|p| p.growth).collect();
        assert_eq!(growths, vec![0.20, 0.05, 0.05, 0.05, 0.05]);
    }

    #[test]
    fn test_invalid_configuration() {
        let data = reference_company();
        let zero_years = DcfModel::new(DcfConfig {
            projection_years: 0,
            ..Default::default()
        });
        assert!(matches!(
            zero_years.analyze(&data),
            Err(RondaError::InvalidData(_))
        ));

        let no_growth = DcfModel::new(DcfConfig {
            revenue_growth: Vec::new(),
            ..Default::default()
        });
        assert!(matches!(
            no_growth.analyze(&data),
            Err(RondaError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_history() {
        let mut data = reference_company();
        data.income_statements.clear();
        assert!(matches!(
            DcfModel::default().analyze(&data),
            Err(RondaError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_sensitivity_leaves_model_unchanged() {
        let data = reference_company();
        let model = DcfModel::default();

        let before = model.analyze(&data).unwrap();
        let table = model
            .sensitivity_analysis(&data, &[0.08, 0.09, 0.10], &[0.02, 0.025, 0.03])
            .unwrap();
        let after = model.analyze(&data).unwrap();

        assert_eq!(before, after);
        assert_eq!(table.prices.len(), 3);
        assert!(table.prices.iter().all(|row| row.len() == 3));

        let again = model
            .sensitivity_analysis(&data, &[0.08, 0.09, 0.10], &[0.02, 0.025, 0.03])
            .unwrap();
        assert_eq!(table, again);
    }

    #[test]
    fn test_sensitivity_marks_degenerate_cells() {
        let data = reference_company();
        let table = DcfModel::default()
            .sensitivity_analysis(&data, &[0.02, 0.10], &[0.03])
            .unwrap();
        assert!(table.prices[0][0].is_none());
        assert!(table.prices[1][0].is_some());
    }

    #[test]
    fn test_sensitivity_grid_matches_direct_runs() {
        let data = reference_company();
        let table = DcfModel::default()
            .sensitivity_analysis(&data, &[0.09], &[0.02])
            .unwrap();
        let direct = DcfModel::new(DcfConfig {
            wacc: Some(0.09),
            terminal_growth: 0.02,
            ..Default::default()
        })
        .analyze(&data)
        .unwrap();
        assert_relative_eq!(
            table.prices[0][0].unwrap(),
            direct.implied_share_price,
            max_relative = 1e-12
        );
    }
}
