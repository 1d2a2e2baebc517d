//! The normalized company snapshot consumed by every valuation model.
//!
//! A [`CompanyData`] holds one profile, one price snapshot and three parallel
//! statement series ordered oldest first. Models treat the last element of
//! each series as the most recent actual period.

use serde::{Deserialize, Serialize};

use crate::{Result, RondaError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. `"AAPL"`.
pub type Symbol = String;

const fn default_beta() -> f64 {
    1.0
}

/// Descriptive and capital-structure information about a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Display name.
    pub name: String,
    /// Industry classification.
    #[serde(default)]
    pub industry: String,
    /// Sector classification.
    #[serde(default)]
    pub sector: String,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: f64,
    /// Shares outstanding.
    pub shares_outstanding: f64,
    /// Equity beta (defaults to 1.0).
    #[serde(default = "default_beta")]
    pub beta: f64,
}

/// One fiscal period of income statement data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Fiscal period end date.
    #[serde(default)]
    pub date: Option<Date>,
    /// Total revenue.
    pub revenue: f64,
    /// Gross profit.
    #[serde(default)]
    pub gross_profit: f64,
    /// Operating income.
    #[serde(default)]
    pub operating_income: f64,
    /// Net income.
    #[serde(default)]
    pub net_income: f64,
    /// EBITDA.
    #[serde(default)]
    pub ebitda: f64,
    /// Depreciation and amortization, when reported.
    #[serde(default)]
    pub depreciation_amortization: Option<f64>,
}

impl IncomeStatement {
    /// Gross profit over revenue.
    pub fn gross_margin(&self) -> Result<f64> {
        crate::stats::ratio(self.gross_profit, self.revenue, "gross margin")
    }

    /// EBITDA over revenue.
    pub fn ebitda_margin(&self) -> Result<f64> {
        crate::stats::ratio(self.ebitda, self.revenue, "EBITDA margin")
    }

    /// Operating income over revenue.
    pub fn operating_margin(&self) -> Result<f64> {
        crate::stats::ratio(self.operating_income, self.revenue, "operating margin")
    }

    /// Net income over revenue.
    pub fn net_margin(&self) -> Result<f64> {
        crate::stats::ratio(self.net_income, self.revenue, "net margin")
    }
}

/// One fiscal period of cash flow statement data.
///
/// Capital expenditure may be stored negative (cash outflow); use
/// [`CashFlowStatement::capex`] whenever a magnitude is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    /// Fiscal period end date.
    #[serde(default)]
    pub date: Option<Date>,
    /// Operating cash flow.
    pub operating_cash_flow: f64,
    /// Capital expenditure, sign as reported.
    pub capital_expenditure: f64,
    /// Free cash flow as reported (OCF + CapEx under the stored sign).
    #[serde(default)]
    pub free_cash_flow: f64,
    /// Stock-based compensation, when reported.
    #[serde(default)]
    pub stock_based_compensation: Option<f64>,
    /// Change in working capital, when reported.
    #[serde(default)]
    pub change_in_working_capital: Option<f64>,
}

impl CashFlowStatement {
    /// Capital expenditure as a positive magnitude.
    #[must_use]
    pub const fn capex(&self) -> f64 {
        self.capital_expenditure.abs()
    }
}

/// One fiscal period of balance sheet data.
///
/// Assets are expected to equal liabilities plus equity but this is not
/// enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Fiscal period end date.
    #[serde(default)]
    pub date: Option<Date>,
    /// Total assets.
    #[serde(default)]
    pub total_assets: f64,
    /// Total liabilities.
    #[serde(default)]
    pub total_liabilities: f64,
    /// Total equity.
    #[serde(default)]
    pub total_equity: f64,
    /// Total debt.
    #[serde(default)]
    pub total_debt: f64,
    /// Cash and cash equivalents.
    #[serde(default)]
    pub cash_and_equivalents: f64,
    /// Net working capital, when reported.
    #[serde(default)]
    pub working_capital: Option<f64>,
}

impl BalanceSheet {
    /// Total debt less cash.
    #[must_use]
    pub fn net_debt(&self) -> f64 {
        self.total_debt - self.cash_and_equivalents
    }
}

/// Current quote information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrice {
    /// Current share price.
    pub current: f64,
    /// 52-week high.
    #[serde(default)]
    pub year_high: f64,
    /// 52-week low.
    #[serde(default)]
    pub year_low: f64,
    /// Average daily volume.
    #[serde(default)]
    pub average_volume: f64,
}

/// Normalized company snapshot.
///
/// The three statement series are parallel and ordered oldest first.
///
/// # Example
///
/// ```
/// use ronda_traits::sample::reference_company;
///
/// let data = reference_company();
/// let latest = data.latest_income().unwrap();
/// assert!(latest.revenue > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    /// Company profile.
    pub profile: CompanyProfile,
    /// Quote snapshot.
    pub price: StockPrice,
    /// Income statements, oldest first.
    #[serde(default)]
    pub income_statements: Vec<IncomeStatement>,
    /// Cash flow statements, oldest first.
    #[serde(default)]
    pub cash_flows: Vec<CashFlowStatement>,
    /// Balance sheets, oldest first.
    #[serde(default)]
    pub balance_sheets: Vec<BalanceSheet>,
}

impl CompanyData {
    /// Ticker symbol of the company.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.profile.symbol
    }

    /// Most recent income statement.
    pub fn latest_income(&self) -> Result<&IncomeStatement> {
        self.income_statements.last().ok_or_else(|| {
            RondaError::InsufficientData(format!("{}: no income statements", self.symbol()))
        })
    }

    /// Most recent cash flow statement.
    pub fn latest_cash_flow(&self) -> Result<&CashFlowStatement> {
        self.cash_flows.last().ok_or_else(|| {
            RondaError::InsufficientData(format!("{}: no cash flow statements", self.symbol()))
        })
    }

    /// Most recent balance sheet.
    pub fn latest_balance(&self) -> Result<&BalanceSheet> {
        self.balance_sheets.last().ok_or_else(|| {
            RondaError::InsufficientData(format!("{}: no balance sheets", self.symbol()))
        })
    }

    /// Net debt from the most recent balance sheet.
    pub fn net_debt(&self) -> Result<f64> {
        Ok(self.latest_balance()?.net_debt())
    }

    /// Current share price.
    #[must_use]
    pub const fn current_price(&self) -> f64 {
        self.price.current
    }

    /// Shares outstanding, rejecting non-positive counts.
    pub fn shares_outstanding(&self) -> Result<f64> {
        let shares = self.profile.shares_outstanding;
        if shares > 0.0 && shares.is_finite() {
            Ok(shares)
        } else {
            Err(RondaError::DegenerateInput(format!(
                "{}: shares outstanding must be positive, got {}",
                self.symbol(),
                shares
            )))
        }
    }

    /// Number of periods available in every series.
    #[must_use]
    pub fn periods(&self) -> usize {
        self.income_statements
            .len()
            .min(self.cash_flows.len())
            .min(self.balance_sheets.len())
    }

    /// Check that every series holds at least `min` periods.
    pub fn validate_history(&self, min: usize) -> Result<()> {
        let available = self.periods();
        if available < min.max(1) {
            return Err(RondaError::InsufficientData(format!(
                "{}: {} period(s) of history available, {} required",
                self.symbol(),
                available,
                min.max(1)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::reference_company;
    use approx::assert_relative_eq;

    #[test]
    fn test_latest_is_last_element() {
        let data = reference_company();
        let latest = data.latest_income().unwrap();
        assert_relative_eq!(latest.revenue, 100_000_000_000.0);
    }

    #[test]
    fn test_empty_series_is_insufficient_data() {
        let mut data = reference_company();
        data.income_statements.clear();
        assert!(matches!(
            data.latest_income(),
            Err(RondaError::InsufficientData(_))
        ));
        assert!(data.validate_history(1).is_err());
    }

    #[test]
    fn test_capex_magnitude() {
        let cf = CashFlowStatement {
            date: None,
            operating_cash_flow: 100.0,
            capital_expenditure: -30.0,
            free_cash_flow: 70.0,
            stock_based_compensation: None,
            change_in_working_capital: None,
        };
        assert_relative_eq!(cf.capex(), 30.0);
    }

    #[test]
    fn test_zero_revenue_margin_is_degenerate() {
        let mut data = reference_company();
        data.income_statements.last_mut().unwrap().revenue = 0.0;
        let latest = data.latest_income().unwrap();
        assert!(matches!(
            latest.ebitda_margin(),
            Err(RondaError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_shares_outstanding_guard() {
        let mut data = reference_company();
        data.profile.shares_outstanding = 0.0;
        assert!(data.shares_outstanding().is_err());
    }

    #[test]
    fn test_deserialize_defaults_beta() {
        let json = r#"{
            "profile": {"symbol": "XYZ", "name": "Xyz Corp", "sharesOutstanding": 10.0},
            "price": {"current": 5.0}
        }"#;
        let data: CompanyData = serde_json::from_str(json).unwrap();
        assert_relative_eq!(data.profile.beta, 1.0);
        assert_eq!(data.periods(), 0);
    }
}
