//! Built-in reference snapshot.
//!
//! A small, internally consistent company used by the CLI when no data file
//! is given and by tests across the workspace. Latest fiscal year: $100B
//! revenue, 30% EBITDA margin, $20B net debt, 10B shares.

use chrono::NaiveDate;

use crate::types::{
    BalanceSheet, CashFlowStatement, CompanyData, CompanyProfile, IncomeStatement, StockPrice,
};

const BILLION: f64 = 1_000_000_000.0;

/// Revenue by fiscal year, oldest first, in billions.
const REVENUE: [f64; 5] = [70.0, 78.0, 86.0, 93.0, 100.0];
/// Cash balance by fiscal year, oldest first, in billions.
const CASH: [f64; 5] = [22.0, 24.0, 26.0, 28.0, 30.0];
const FIRST_FISCAL_YEAR: i32 = 2020;

/// Reference company snapshot with five fiscal years of history.
#[must_use]
pub fn reference_company() -> CompanyData {
    let mut income_statements = Vec::with_capacity(REVENUE.len());
    let mut cash_flows = Vec::with_capacity(REVENUE.len());
    let mut balance_sheets = Vec::with_capacity(REVENUE.len());

    for (i, (&revenue, &cash)) in REVENUE.iter().zip(CASH.iter()).enumerate() {
        let revenue = revenue * BILLION;
        let cash = cash * BILLION;
        let date = NaiveDate::from_ymd_opt(FIRST_FISCAL_YEAR + i as i32, 12, 31);

        income_statements.push(IncomeStatement {
            date,
            revenue,
            gross_profit: revenue * 0.60,
            operating_income: revenue * 0.25,
            net_income: revenue * 0.20,
            ebitda: revenue * 0.30,
            depreciation_amortization: Some(revenue * 0.05),
        });

        let operating_cash_flow = revenue * 0.27;
        let capital_expenditure = -revenue * 0.07;
        cash_flows.push(CashFlowStatement {
            date,
            operating_cash_flow,
            capital_expenditure,
            free_cash_flow: operating_cash_flow + capital_expenditure,
            stock_based_compensation: Some(revenue * 0.02),
            change_in_working_capital: Some(-revenue * 0.01),
        });

        let total_assets = revenue * 1.5;
        let total_equity = revenue * 0.7;
        balance_sheets.push(BalanceSheet {
            date,
            total_assets,
            total_liabilities: total_assets - total_equity,
            total_equity,
            total_debt: 50.0 * BILLION,
            cash_and_equivalents: cash,
            working_capital: Some(revenue * 0.10),
        });
    }

    CompanyData {
        profile: CompanyProfile {
            symbol: "RNDA".to_string(),
            name: "Ronda Reference Corp".to_string(),
            industry: "Software".to_string(),
            sector: "Technology".to_string(),
            market_cap: 280.0 * BILLION,
            shares_outstanding: 10.0 * BILLION,
            beta: 1.1,
        },
        price: StockPrice {
            current: 28.0,
            year_high: 32.0,
            year_low: 22.0,
            average_volume: 25_000_000.0,
        },
        income_statements,
        cash_flows,
        balance_sheets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_company_shape() {
        let data = reference_company();
        assert_eq!(data.periods(), 5);
        assert_relative_eq!(data.net_debt().unwrap(), 20.0 * BILLION);
        assert_relative_eq!(
            data.latest_income().unwrap().ebitda_margin().unwrap(),
            0.30,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_reference_company_balances() {
        let data = reference_company();
        for bs in &data.balance_sheets {
            assert_relative_eq!(
                bs.total_assets,
                bs.total_liabilities + bs.total_equity,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_reference_company_oldest_first() {
        let data = reference_company();
        let first = data.income_statements.first().unwrap();
        let last = data.income_statements.last().unwrap();
        assert!(first.date < last.date);
        assert!(first.revenue < last.revenue);
    }
}
