//! Subscription unit economics and monthly operating projection.

use ronda_traits::{CompanyData, Result, RondaError, ValuationModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the operating model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingConfig {
    /// Customers at the start of the projection (default: 10,000)
    pub initial_customers: u64,

    /// Monthly revenue per customer (default: 100)
    pub monthly_arpu: f64,

    /// Acquisition cost per new customer (default: 500)
    pub cac: f64,

    /// Share of customers lost each month (default: 3%)
    pub monthly_churn: f64,

    /// New customers each month as a share of the base (default: 6%)
    pub monthly_growth: f64,

    /// Gross margin (default: latest actual)
    pub gross_margin: Option<f64>,

    /// Operating expense as a share of revenue, before acquisition spend (default: 35%)
    pub opex_pct: f64,

    /// Cap on customer lifetime in months (default: 60)
    pub ltv_months_cap: f64,

    /// Number of projected months (default: 36)
    pub projection_months: usize,
}

impl Default for OperatingConfig {
    fn default() -> Self {
        Self {
            initial_customers: 10_000,
            monthly_arpu: 100.0,
            cac: 500.0,
            monthly_churn: 0.03,
            monthly_growth: 0.06,
            gross_margin: None,
            opex_pct: 0.35,
            ltv_months_cap: 60.0,
            projection_months: 36,
        }
    }
}

/// Lifetime value and acquisition economics of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    /// Gross margin applied.
    pub gross_margin: f64,
    /// Monthly gross profit per customer.
    pub monthly_contribution: f64,
    /// Expected customer lifetime in months, capped.
    pub lifetime_months: f64,
    /// Customer lifetime value.
    pub ltv: f64,
    /// Acquisition cost.
    pub cac: f64,
    /// LTV over CAC.
    pub ltv_to_cac: f64,
    /// Months of contribution needed to recover CAC.
    pub payback_months: f64,
}

/// One projected month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    /// Month, starting at 1.
    pub month: usize,
    /// Customers at the start of the month.
    pub beginning_customers: u64,
    /// Customers acquired.
    pub new_customers: u64,
    /// Customers lost.
    pub churned_customers: u64,
    /// Customers at the end of the month.
    pub ending_customers: u64,
    /// Revenue on ending customers.
    pub revenue: f64,
    /// Cost of revenue.
    pub cogs: f64,
    /// Revenue less cost of revenue.
    pub gross_profit: f64,
    /// Operating expense including acquisition spend.
    pub opex: f64,
    /// Gross profit less operating expense.
    pub ebitda: f64,
    /// Running total of EBITDA.
    pub cumulative_ebitda: f64,
}

/// Several months rolled up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRollup {
    /// Period number, starting at 1.
    pub period: usize,
    /// Total revenue.
    pub revenue: f64,
    /// Total gross profit.
    pub gross_profit: f64,
    /// Total operating expense.
    pub opex: f64,
    /// Total EBITDA.
    pub ebitda: f64,
    /// Customers acquired.
    pub new_customers: u64,
    /// Customers lost.
    pub churned_customers: u64,
    /// Customers at period end.
    pub ending_customers: u64,
}

/// Summary of one growth/churn scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingScenario {
    /// Scenario name.
    pub name: String,
    /// Monthly growth used.
    pub monthly_growth: f64,
    /// Monthly churn used.
    pub monthly_churn: f64,
    /// Customers in the final month.
    pub ending_customers: u64,
    /// Revenue over the horizon.
    pub total_revenue: f64,
    /// EBITDA over the horizon.
    pub total_ebitda: f64,
    /// First month with positive EBITDA.
    pub breakeven_month: Option<usize>,
}

/// Output of the operating model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingResult {
    /// Customer-level economics.
    pub unit_economics: UnitEconomics,
    /// Month-by-month projection.
    pub monthly: Vec<MonthlyProjection>,
    /// Three-month rollups.
    pub quarterly: Vec<PeriodRollup>,
    /// Twelve-month rollups.
    pub annual: Vec<PeriodRollup>,
    /// First month with positive EBITDA.
    pub breakeven_month: Option<usize>,
    /// Conservative, base and optimistic runs.
    pub scenarios: Vec<OperatingScenario>,
}

/// Customer-driven operating model.
#[derive(Debug, Clone, Default)]
pub struct OperatingModel {
    config: OperatingConfig,
}

impl OperatingModel {
    /// Create a new operating model with the given configuration.
    #[must_use]
    pub const fn new(config: OperatingConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OperatingConfig {
        &self.config
    }

    /// LTV, LTV/CAC and payback for a gross margin.
    ///
    /// # Errors
    ///
    /// [`RondaError::DegenerateInput`] when CAC or per-customer contribution is
    /// not positive.
    pub fn unit_economics(&self, gross_margin: f64) -> Result<UnitEconomics> {
        let cfg = &self.config;
        if cfg.cac <= 0.0 {
            return Err(RondaError::DegenerateInput(
                "customer acquisition cost must be positive".to_string(),
            ));
        }
        let monthly_contribution = cfg.monthly_arpu * gross_margin;
        if monthly_contribution <= 0.0 {
            return Err(RondaError::DegenerateInput(
                "per-customer contribution must be positive".to_string(),
            ));
        }

        let lifetime_months = if cfg.monthly_churn > 0.0 {
            (1.0 / cfg.monthly_churn).min(cfg.ltv_months_cap)
        } else {
            cfg.ltv_months_cap
        };
        let ltv = monthly_contribution * lifetime_months;

        Ok(UnitEconomics {
            gross_margin,
            monthly_contribution,
            lifetime_months,
            ltv,
            cac: cfg.cac,
            ltv_to_cac: ltv / cfg.cac,
            payback_months: cfg.cac / monthly_contribution,
        })
    }

    /// Month-by-month projection for a growth and churn pair.
    ///
    /// # Errors
    ///
    /// [`RondaError::DegenerateInput`] when the customer count overflows.
    pub fn project(
        &self,
        gross_margin: f64,
        growth: f64,
        churn: f64,
    ) -> Result<Vec<MonthlyProjection>> {
        let cfg = &self.config;
        let mut customers = cfg.initial_customers;
        let mut cumulative_ebitda = 0.0;

        (1..=cfg.projection_months)
            .map(|month| {
                let base = customers as f64;
                let new_customers = (base * growth).floor().max(0.0) as u64;
                let churned_customers = ((base * churn).floor().max(0.0) as u64).min(customers);
                let ending_customers = customers
                    .checked_add(new_customers)
                    .map(|total| total - churned_customers)
                    .ok_or_else(|| {
                        RondaError::DegenerateInput(format!(
                            "customer count overflows in month {month} at {growth} monthly growth"
                        ))
                    })?;

                let revenue = ending_customers as f64 * cfg.monthly_arpu;
                let cogs = revenue * (1.0 - gross_margin);
                let gross_profit = revenue - cogs;
                let opex = revenue * cfg.opex_pct + new_customers as f64 * cfg.cac;
                let ebitda = gross_profit - opex;
                cumulative_ebitda += ebitda;

                let row = MonthlyProjection {
                    month,
                    beginning_customers: customers,
                    new_customers,
                    churned_customers,
                    ending_customers,
                    revenue,
                    cogs,
                    gross_profit,
                    opex,
                    ebitda,
                    cumulative_ebitda,
                };
                customers = ending_customers;
                Ok(row)
            })
            .collect()
    }

    fn scenario(
        &self,
        name: &str,
        gross_margin: f64,
        growth: f64,
        churn: f64,
    ) -> Result<OperatingScenario> {
        let monthly = self.project(gross_margin, growth, churn)?;
        Ok(OperatingScenario {
            name: name.to_string(),
            monthly_growth: growth,
            monthly_churn: churn,
            ending_customers: monthly
                .last()
                .map_or(self.config.initial_customers, |m| m.ending_customers),
            total_revenue: monthly.iter().map(|m| m.revenue).sum(),
            total_ebitda: monthly.iter().map(|m| m.ebitda).sum(),
            breakeven_month: breakeven(&monthly),
        })
    }

    fn validate(&self) -> Result<()> {
        let cfg = &self.config;
        if !cfg.monthly_growth.is_finite() || cfg.monthly_growth < 0.0 {
            return Err(RondaError::InvalidData(format!(
                "monthly growth must be a non-negative rate, got {}",
                cfg.monthly_growth
            )));
        }
        if !cfg.monthly_churn.is_finite() || !(0.0..=1.0).contains(&cfg.monthly_churn) {
            return Err(RondaError::InvalidData(format!(
                "monthly churn must lie in [0, 1], got {}",
                cfg.monthly_churn
            )));
        }
        Ok(())
    }
}

/// First month with positive EBITDA.
fn breakeven(monthly: &[MonthlyProjection]) -> Option<usize> {
    monthly.iter().find(|m| m.ebitda > 0.0).map(|m| m.month)
}

/// Roll months up into consecutive periods of `months` length.
#[must_use]
pub fn rollup(monthly: &[MonthlyProjection], months: usize) -> Vec<PeriodRollup> {
    monthly
        .chunks(months.max(1))
        .enumerate()
        .map(|(i, chunk)| PeriodRollup {
            period: i + 1,
            revenue: chunk.iter().map(|m| m.revenue).sum(),
            gross_profit: chunk.iter().map(|m| m.gross_profit).sum(),
            opex: chunk.iter().map(|m| m.opex).sum(),
            ebitda: chunk.iter().map(|m| m.ebitda).sum(),
            new_customers: chunk.iter().map(|m| m.new_customers).sum(),
            churned_customers: chunk.iter().map(|m| m.churned_customers).sum(),
            ending_customers: chunk.last().map_or(0, |m| m.ending_customers),
        })
        .collect()
}

impl ValuationModel for OperatingModel {
    type Output = OperatingResult;

    fn name(&self) -> &str {
        "operating"
    }

    fn analyze(&self, data: &CompanyData) -> Result<OperatingResult> {
        self.validate()?;
        let cfg = &self.config;
        let gross_margin = match cfg.gross_margin {
            Some(m) => m,
            None => data.latest_income()?.gross_margin()?,
        };
        let unit_economics = self.unit_economics(gross_margin)?;

        let (growth, churn) = (cfg.monthly_growth, cfg.monthly_churn);
        let monthly = self.project(gross_margin, growth, churn)?;
        let scenarios = vec![
            self.scenario("Conservative", gross_margin, growth * 0.7, churn * 1.3)?,
            self.scenario("Base", gross_margin, growth, churn)?,
            self.scenario("Optimistic", gross_margin, growth * 1.3, churn * 0.7)?,
        ];

        debug!(
            symbol = data.symbol(),
            ltv_to_cac = unit_economics.ltv_to_cac,
            payback_months = unit_economics.payback_months,
            "operating model complete"
        );

        Ok(OperatingResult {
            unit_economics,
            quarterly: rollup(&monthly, 3),
            annual: rollup(&monthly, 12),
            breakeven_month: breakeven(&monthly),
            monthly,
            scenarios,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    #[test]
    fn test_default_config() {
        let config = OperatingConfig::default();
        assert_eq!(config.initial_customers, 10_000);
        assert_eq!(config.projection_months, 36);
        assert!(config.gross_margin.is_none());
    }

    #[test]
    fn test_unit_economics_from_actual_margin() {
        let result = OperatingModel::default().analyze(&reference_company()).unwrap();
        let unit = &result.unit_economics;
        assert_relative_eq!(unit.gross_margin, 0.60, epsilon = 1e-12);
        assert_relative_eq!(unit.monthly_contribution, 60.0, epsilon = 1e-9);
        assert_relative_eq!(unit.lifetime_months, 1.0 / 0.03, epsilon = 1e-9);
        assert_relative_eq!(unit.ltv, 2000.0, epsilon = 1e-6);
        assert_relative_eq!(unit.ltv_to_cac, 4.0, epsilon = 1e-9);
        assert_relative_eq!(unit.payback_months, 500.0 / 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lifetime_cap() {
        let model = OperatingModel::new(OperatingConfig {
            monthly_churn: 0.0,
            ..Default::default()
        });
        let unit = model.unit_economics(0.5).unwrap();
        assert_relative_eq!(unit.lifetime_months, 60.0);
    }

    #[test]
    fn test_first_month() {
        let model = OperatingModel::default();
        let first = model.project(0.60, 0.06, 0.03).unwrap()[0].clone();
        assert_eq!(first.new_customers, 600);
        assert_eq!(first.churned_customers, 300);
        assert_eq!(first.ending_customers, 10_300);
        assert_relative_eq!(first.revenue, 1_030_000.0, epsilon = 1e-6);
        assert_relative_eq!(first.opex, 360_500.0 + 300_000.0, epsilon = 1e-6);
        assert_relative_eq!(first.ebitda, 618_000.0 - 660_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_customer_roll_forward() {
        let monthly = OperatingModel::default().project(0.60, 0.06, 0.03).unwrap();
        for pair in monthly.windows(2) {
            assert_eq!(pair[0].ending_customers, pair[1].beginning_customers);
        }
        let last = monthly.last().unwrap();
        let total: f64 = monthly.iter().map(|m| m.ebitda).sum();
        assert_relative_eq!(last.cumulative_ebitda, total, max_relative = 1e-9);
    }

    #[test]
    fn test_rollups() {
        let result = OperatingModel::default().analyze(&reference_company()).unwrap();
        assert_eq!(result.quarterly.len(), 12);
        assert_eq!(result.annual.len(), 3);
        let first_year: f64 = result.monthly[..12].iter().map(|m| m.revenue).sum();
        assert_relative_eq!(result.annual[0].revenue, first_year, max_relative = 1e-12);
        assert_eq!(result.annual[2].ending_customers, result.monthly[35].ending_customers);
    }

    #[test]
    fn test_breakeven() {
        // heavy acquisition spend keeps default growth below breakeven
        let result = OperatingModel::default().analyze(&reference_company()).unwrap();
        assert!(result.breakeven_month.is_none());

        let slow = OperatingModel::new(OperatingConfig {
            monthly_growth: 0.02,
            monthly_churn: 0.01,
            ..Default::default()
        });
        let result = slow.analyze(&reference_company()).unwrap();
        assert_eq!(result.breakeven_month, Some(1));
    }

    #[test]
    fn test_scenarios() {
        let result = OperatingModel::default().analyze(&reference_company()).unwrap();
        let names: Vec<&str> = result.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Conservative", "Base", "Optimistic"]);
        assert_relative_eq!(result.scenarios[0].monthly_growth, 0.042, epsilon = 1e-12);
        assert_relative_eq!(result.scenarios[0].monthly_churn, 0.039, epsilon = 1e-12);
        assert!(result.scenarios[2].ending_customers > result.scenarios[0].ending_customers);
    }

    #[test]
    fn test_zero_cac_is_degenerate() {
        let model = OperatingModel::new(OperatingConfig {
            cac: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            model.analyze(&reference_company()),
            Err(RondaError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_runaway_growth_is_degenerate() {
        let model = OperatingModel::new(OperatingConfig {
            monthly_growth: 5.0,
            ..Default::default()
        });
        assert!(matches!(
            model.analyze(&reference_company()),
            Err(RondaError::DegenerateInput(_))
        ));
        assert!(model.project(0.60, 5.0, 0.03).is_err());
    }

    #[test]
    fn test_rates_out_of_domain() {
        let data = reference_company();
        for (growth, churn) in [(-0.01, 0.03), (f64::NAN, 0.03), (0.06, 1.5), (0.06, -0.1)] {
            let model = OperatingModel::new(OperatingConfig {
                monthly_growth: growth,
                monthly_churn: churn,
                ..Default::default()
            });
            assert!(
                matches!(model.analyze(&data), Err(RondaError::InvalidData(_))),
                "growth {growth}, churn {churn}"
            );
        }
    }
}
