//! Linked income statement, balance sheet and cash flow projection.

use ronda_traits::{CompanyData, Result, RondaError, ValuationModel, stats::ratio};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.0;

/// Configuration for the three-statement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreeStatementConfig {
    /// Number of projection years (default: 5)
    pub projection_years: usize,

    /// Annual revenue growth (default: 8%)
    pub revenue_growth: f64,

    /// Gross margin (default: latest actual)
    pub gross_margin: Option<f64>,

    /// Operating expense excluding D&A as a share of revenue
    /// (default: latest gross profit less EBITDA over revenue)
    pub opex_pct: Option<f64>,

    /// D&A as a share of revenue (default: 4%)
    pub da_pct: f64,

    /// CapEx as a share of revenue (default: 5%)
    pub capex_pct: f64,

    /// Tax rate on positive pre-tax income (default: 21%)
    pub tax_rate: f64,

    /// Interest rate on prior-year debt (default: 5%)
    pub interest_rate: f64,

    /// Days sales outstanding (default: 45)
    pub days_receivable: f64,

    /// Days inventory outstanding (default: 30)
    pub days_inventory: f64,

    /// Days payable outstanding (default: 40)
    pub days_payable: f64,

    /// Scheduled debt repayment per year (default: 0)
    pub annual_debt_repayment: f64,

    /// Share of positive net income paid as dividends (default: 0%)
    pub dividend_payout: f64,
}

impl Default for ThreeStatementConfig {
    fn default() -> Self {
        Self {
            projection_years: 5,
            revenue_growth: 0.08,
            gross_margin: None,
            opex_pct: None,
            da_pct: 0.04,
            capex_pct: 0.05,
            tax_rate: 0.21,
            interest_rate: 0.05,
            days_receivable: 45.0,
            days_inventory: 30.0,
            days_payable: 40.0,
            annual_debt_repayment: 0.0,
            dividend_payout: 0.0,
        }
    }
}

/// Projected income statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeProjection {
    /// Revenue.
    pub revenue: f64,
    /// Cost of goods sold.
    pub cogs: f64,
    /// Gross profit.
    pub gross_profit: f64,
    /// Operating expense excluding D&A.
    pub opex: f64,
    /// EBITDA.
    pub ebitda: f64,
    /// Depreciation and amortization.
    pub depreciation: f64,
    /// EBIT.
    pub ebit: f64,
    /// Interest on prior-year debt.
    pub interest: f64,
    /// Pre-tax income.
    pub pre_tax_income: f64,
    /// Taxes on positive pre-tax income.
    pub taxes: f64,
    /// Net income.
    pub net_income: f64,
}

/// Projected year-end balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceProjection {
    /// Cash.
    pub cash: f64,
    /// Accounts receivable.
    pub receivables: f64,
    /// Inventory.
    pub inventory: f64,
    /// Net property, plant and equipment (plus other long-term assets).
    pub ppe: f64,
    /// Total assets.
    pub total_assets: f64,
    /// Accounts payable.
    pub payables: f64,
    /// Debt.
    pub debt: f64,
    /// Liabilities held flat from the opening balance sheet.
    pub other_liabilities: f64,
    /// Total liabilities.
    pub total_liabilities: f64,
    /// Shareholders' equity.
    pub equity: f64,
    /// Assets less liabilities less equity.
    pub imbalance: f64,
}

/// Projected cash flow statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    /// Cash at the start of the year.
    pub beginning_cash: f64,
    /// Net income.
    pub net_income: f64,
    /// D&A added back.
    pub depreciation: f64,
    /// Increase in receivables plus inventory less payables.
    pub change_in_working_capital: f64,
    /// Cash from operations.
    pub operating_cash_flow: f64,
    /// Capital expenditure.
    pub capex: f64,
    /// Cash from investing.
    pub investing_cash_flow: f64,
    /// Debt repaid.
    pub debt_repayment: f64,
    /// Dividends paid.
    pub dividends: f64,
    /// Cash from financing.
    pub financing_cash_flow: f64,
    /// Net change in cash.
    pub net_change_in_cash: f64,
    /// Cash at the end of the year.
    pub ending_cash: f64,
}

/// One projected year of all three statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    /// Projection year, starting at 1.
    pub year: usize,
    /// Income statement.
    pub income: IncomeProjection,
    /// Year-end balance sheet.
    pub balance: BalanceProjection,
    /// Cash flow statement.
    pub cash_flow: CashFlowProjection,
}

/// Balances carried from one year into the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carry {
    /// Revenue of the year just closed.
    pub revenue: f64,
    /// Cash.
    pub cash: f64,
    /// Debt.
    pub debt: f64,
    /// Accounts receivable.
    pub receivables: f64,
    /// Inventory.
    pub inventory: f64,
    /// Accounts payable.
    pub payables: f64,
    /// Net PP&E and other long-term assets.
    pub ppe: f64,
    /// Liabilities not otherwise modelled.
    pub other_liabilities: f64,
    /// Shareholders' equity.
    pub equity: f64,
}

impl Carry {
    const fn total_assets(&self) -> f64 {
        self.cash + self.receivables + self.inventory + self.ppe
    }

    const fn total_liabilities(&self) -> f64 {
        self.payables + self.debt + self.other_liabilities
    }

    /// Assets less liabilities less equity.
    #[must_use]
    pub const fn imbalance(&self) -> f64 {
        self.total_assets() - self.total_liabilities() - self.equity
    }
}

/// Resolved operating assumptions for a run.
#[derive(Debug, Clone, Copy)]
struct Drivers {
    gross_margin: f64,
    opex_pct: f64,
}

/// Output of the three-statement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeStatementResult {
    /// Gross margin applied.
    pub gross_margin: f64,
    /// Opex share applied.
    pub opex_pct: f64,
    /// Opening balances derived from the snapshot.
    pub opening: Carry,
    /// Imbalance of the snapshot's own balance sheet.
    pub opening_imbalance: f64,
    /// Projected years.
    pub years: Vec<ProjectedYear>,
}

/// Three-statement projection.
///
/// Seeds opening balances once from the latest snapshot, then steps one year
/// at a time through a pure function of the previous year's balances.
#[derive(Debug, Clone, Default)]
pub struct ThreeStatementModel {
    config: ThreeStatementConfig,
}

impl ThreeStatementModel {
    /// Create a new three-statement model with the given configuration.
    #[must_use]
    pub const fn new(config: ThreeStatementConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ThreeStatementConfig {
        &self.config
    }

    fn drivers(&self, data: &CompanyData) -> Result<Drivers> {
        let income = data.latest_income()?;
        let gross_margin = match self.config.gross_margin {
            Some(m) => m,
            None => income.gross_margin()?,
        };
        let opex_pct = match self.config.opex_pct {
            Some(p) => p,
            None => ratio(income.gross_profit - income.ebitda, income.revenue, "opex share")?,
        };
        Ok(Drivers {
            gross_margin,
            opex_pct,
        })
    }

    /// Opening balances from the latest snapshot.
    ///
    /// Working capital follows the days assumptions; PP&E absorbs the rest of
    /// total assets and other liabilities absorb the rest of total liabilities.
    fn opening(&self, data: &CompanyData, drivers: Drivers) -> Result<Carry> {
        let cfg = &self.config;
        let revenue = data.latest_income()?.revenue;
        if revenue <= 0.0 {
            return Err(RondaError::DegenerateInput(format!(
                "{}: three-statement projection needs positive revenue",
                data.symbol()
            )));
        }
        let balance = data.latest_balance()?;
        let cogs = revenue * (1.0 - drivers.gross_margin);

        let receivables = revenue * cfg.days_receivable / DAYS_PER_YEAR;
        let inventory = cogs * cfg.days_inventory / DAYS_PER_YEAR;
        let payables = cogs * cfg.days_payable / DAYS_PER_YEAR;
        let cash = balance.cash_and_equivalents;
        let debt = balance.total_debt;

        Ok(Carry {
            revenue,
            cash,
            debt,
            receivables,
            inventory,
            payables,
            ppe: balance.total_assets - cash - receivables - inventory,
            other_liabilities: balance.total_liabilities - payables - debt,
            equity: balance.total_equity,
        })
    }

    /// Advance one year.
    fn step(&self, drivers: Drivers, year: usize, prior: &Carry) -> (ProjectedYear, Carry) {
        let cfg = &self.config;

        let revenue = prior.revenue * (1.0 + cfg.revenue_growth);
        let cogs = revenue * (1.0 - drivers.gross_margin);
        let gross_profit = revenue - cogs;
        let opex = revenue * drivers.opex_pct;
        let ebitda = gross_profit - opex;
        let depreciation = revenue * cfg.da_pct;
        let ebit = ebitda - depreciation;
        let interest = prior.debt * cfg.interest_rate;
        let pre_tax_income = ebit - interest;
        let taxes = pre_tax_income.max(0.0) * cfg.tax_rate;
        let net_income = pre_tax_income - taxes;

        let receivables = revenue * cfg.days_receivable / DAYS_PER_YEAR;
        let inventory = cogs * cfg.days_inventory / DAYS_PER_YEAR;
        let payables = cogs * cfg.days_payable / DAYS_PER_YEAR;
        let change_in_working_capital = (receivables - prior.receivables)
            + (inventory - prior.inventory)
            - (payables - prior.payables);

        let operating_cash_flow = net_income + depreciation - change_in_working_capital;
        let capex = revenue * cfg.capex_pct;
        let investing_cash_flow = -capex;
        let debt_repayment = cfg.annual_debt_repayment.clamp(0.0, prior.debt.max(0.0));
        let dividends = net_income.max(0.0) * cfg.dividend_payout;
        let financing_cash_flow = -debt_repayment - dividends;
        let net_change_in_cash = operating_cash_flow + investing_cash_flow + financing_cash_flow;

        let next = Carry {
            revenue,
            cash: prior.cash + net_change_in_cash,
            debt: prior.debt - debt_repayment,
            receivables,
            inventory,
            payables,
            ppe: prior.ppe + capex - depreciation,
            other_liabilities: prior.other_liabilities,
            equity: prior.equity + net_income - dividends,
        };

        let projected = ProjectedYear {
            year,
            income: IncomeProjection {
                revenue,
                cogs,
                gross_profit,
                opex,
                ebitda,
                depreciation,
                ebit,
                interest,
                pre_tax_income,
                taxes,
                net_income,
            },
            balance: BalanceProjection {
                cash: next.cash,
                receivables,
                inventory,
                ppe: next.ppe,
                total_assets: next.total_assets(),
                payables,
                debt: next.debt,
                other_liabilities: next.other_liabilities,
                total_liabilities: next.total_liabilities(),
                equity: next.equity,
                imbalance: next.imbalance(),
            },
            cash_flow: CashFlowProjection {
                beginning_cash: prior.cash,
                net_income,
                depreciation,
                change_in_working_capital,
                operating_cash_flow,
                capex,
                investing_cash_flow,
                debt_repayment,
                dividends,
                financing_cash_flow,
                net_change_in_cash,
                ending_cash: next.cash,
            },
        };
        (projected, next)
    }
}

impl ValuationModel for ThreeStatementModel {
    type Output = ThreeStatementResult;

    fn name(&self) -> &str {
        "three_statement"
    }

    fn analyze(&self, data: &CompanyData) -> Result<ThreeStatementResult> {
        if self.config.projection_years == 0 {
            return Err(RondaError::InvalidData(
                "three-statement horizon must be at least one year".to_string(),
            ));
        }
        let drivers = self.drivers(data)?;
        let opening = self.opening(data, drivers)?;
        let balance = data.latest_balance()?;
        let opening_imbalance =
            balance.total_assets - balance.total_liabilities - balance.total_equity;

        let mut carry = opening.clone();
        let mut years = Vec::with_capacity(self.config.projection_years);
        for year in 1..=self.config.projection_years {
            let (projected, next) = self.step(drivers, year, &carry);
            years.push(projected);
            carry = next;
        }

        debug!(
            symbol = data.symbol(),
            years = years.len(),
            ending_cash = carry.cash,
            "three-statement projection complete"
        );

        Ok(ThreeStatementResult {
            gross_margin: drivers.gross_margin,
            opex_pct: drivers.opex_pct,
            opening,
            opening_imbalance,
            years,
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
        let config = ThreeStatementConfig::default();
        assert_eq!(config.projection_years, 5);
        assert_relative_eq!(config.days_receivable, 45.0);
        assert!(config.gross_margin.is_none());
    }

    #[test]
    fn test_drivers_from_snapshot() {
        let result = ThreeStatementModel::default().analyze(&reference_company()).unwrap();
        assert_relative_eq!(result.gross_margin, 0.60, epsilon = 1e-12);
        assert_relative_eq!(result.opex_pct, 0.30, epsilon = 1e-12);
        assert_relative_eq!(
            result.years[0].income.ebitda,
            108.0 * B * 0.30,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_cash_rolls_forward() {
        let result = ThreeStatementModel::default().analyze(&reference_company()).unwrap();
        assert_eq!(result.years.len(), 5);
        assert_relative_eq!(
            result.years[0].cash_flow.beginning_cash,
            30.0 * B,
            max_relative = 1e-12
        );
        for pair in result.years.windows(2) {
            assert_eq!(pair[0].cash_flow.ending_cash, pair[1].cash_flow.beginning_cash);
            assert_eq!(pair[0].balance.cash, pair[0].cash_flow.ending_cash);
        }
    }

    #[test]
    fn test_balance_sheet_stays_balanced() {
        let model = ThreeStatementModel::new(ThreeStatementConfig {
            annual_debt_repayment: 5.0 * B,
            dividend_payout: 0.25,
            ..Default::default()
        });
        let result = model.analyze(&reference_company()).unwrap();
        assert_relative_eq!(result.opening.imbalance(), result.opening_imbalance, epsilon = 1.0);
        for year in &result.years {
            assert_relative_eq!(
                year.balance.imbalance,
                result.opening_imbalance,
                epsilon = 1e-3 * B
            );
        }
    }

    #[test]
    fn test_interest_on_prior_debt() {
        let model = ThreeStatementModel::new(ThreeStatementConfig {
            annual_debt_repayment: 20.0 * B,
            ..Default::default()
        });
        let result = model.analyze(&reference_company()).unwrap();
        assert_relative_eq!(result.years[0].income.interest, 2.5 * B, max_relative = 1e-12);
        assert_relative_eq!(result.years[1].income.interest, 1.5 * B, max_relative = 1e-12);
        // 50B of debt: 20B, 20B, then the remaining 10B
        assert_relative_eq!(result.years[2].cash_flow.debt_repayment, 10.0 * B, max_relative = 1e-12);
        assert_eq!(result.years[3].balance.debt, 0.0);
    }

    #[test]
    fn test_step_is_pure() {
        let data = reference_company();
        let model = ThreeStatementModel::default();
        let drivers = model.drivers(&data).unwrap();
        let opening = model.opening(&data, drivers).unwrap();
        let (a, next_a) = model.step(drivers, 1, &opening);
        let (b, next_b) = model.step(drivers, 1, &opening);
        assert_eq!(a, b);
        assert_eq!(next_a, next_b);
    }

    #[test]
    fn test_zero_revenue_is_degenerate() {
        let mut data = reference_company();
        if let Some(latest) = data.income_statements.last_mut() {
            latest.revenue = 0.0;
        }
        assert!(ThreeStatementModel::default().analyze(&data).is_err());
    }
}
