//! Operating commands: SaaS unit economics and the three-statement model.

use super::{banner, emit, money, multiple, pct, price, row, section};
use crate::data::Inputs;
use anyhow::Result;
use ronda_models::operating::{
    OperatingConfig, OperatingModel, ThreeStatementConfig, ThreeStatementModel,
};
use ronda_traits::ValuationModel;

fn breakeven_label(month: Option<usize>) -> String {
    month.map_or_else(|| "not reached".to_string(), |m| format!("month {m}"))
}

/// Run the SaaS operating model.
pub(crate) fn operating(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = OperatingModel::new(inputs.config::<OperatingConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Operating Model: {}", data.symbol()));

        let ue = &r.unit_economics;
        section("UNIT ECONOMICS");
        row("Gross margin", pct(ue.gross_margin));
        row("Monthly contribution", price(ue.monthly_contribution));
        row("Customer lifetime", format!("{:.1} months", ue.lifetime_months));
        row("LTV", price(ue.ltv));
        row("CAC", price(ue.cac));
        row("LTV / CAC", multiple(ue.ltv_to_cac));
        row("Payback", format!("{:.1} months", ue.payback_months));
        println!();

        section("ANNUAL");
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>10} {:>10} {:>10}",
            "Year", "Revenue", "Opex", "EBITDA", "New", "Churned", "Ending"
        );
        println!("{}", "─".repeat(76));
        for y in &r.annual {
            println!(
                "{:>4} {:>12} {:>12} {:>12} {:>10} {:>10} {:>10}",
                y.period,
                money(y.revenue),
                money(y.opex),
                money(y.ebitda),
                y.new_customers,
                y.churned_customers,
                y.ending_customers
            );
        }
        println!();
        row("EBITDA breakeven", breakeven_label(r.breakeven_month));
        println!();

        section("SCENARIOS");
        for s in &r.scenarios {
            println!(
                "  {:<12} growth {:>6} churn {:>6}  customers {:>9}  EBITDA {:>12}  breakeven {}",
                s.name,
                pct(s.monthly_growth),
                pct(s.monthly_churn),
                s.ending_customers,
                money(s.total_ebitda),
                breakeven_label(s.breakeven_month)
            );
        }
        println!();
    })
}

/// Run the integrated three-statement projection.
pub(crate) fn three_statement(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = ThreeStatementModel::new(inputs.config::<ThreeStatementConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Three-Statement Model: {}", data.symbol()));

        row("Gross margin", pct(r.gross_margin));
        row("Opex / revenue", pct(r.opex_pct));
        row("Opening imbalance", money(r.opening_imbalance));
        println!();

        section("INCOME STATEMENT");
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>12}",
            "Year", "Revenue", "EBITDA", "Interest", "Net income"
        );
        for y in &r.years {
            let i = &y.income;
            println!(
                "{:>4} {:>12} {:>12} {:>12} {:>12}",
                y.year,
                money(i.revenue),
                money(i.ebitda),
                money(i.interest),
                money(i.net_income)
            );
        }
        println!();

        section("CASH FLOW");
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Year", "Begin cash", "Operating", "Investing", "Financing", "End cash"
        );
        for y in &r.years {
            let c = &y.cash_flow;
            println!(
                "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12}",
                y.year,
                money(c.beginning_cash),
                money(c.operating_cash_flow),
                money(c.investing_cash_flow),
                money(c.financing_cash_flow),
                money(c.ending_cash)
            );
        }
        println!();

        section("BALANCE SHEET");
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>12}",
            "Year", "Assets", "Liabilities", "Equity", "Imbalance"
        );
        for y in &r.years {
            let b = &y.balance;
            println!(
                "{:>4} {:>12} {:>12} {:>12} {:>12}",
                y.year,
                money(b.total_assets),
                money(b.total_liabilities),
                money(b.equity),
                money(b.imbalance)
            );
        }
        println!();
    })
}
