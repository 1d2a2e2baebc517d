//! Credit command implementation.

use super::{banner, emit, money, multiple, opt_multiple, row, section};
use crate::data::Inputs;
use anyhow::Result;
use ronda_models::credit::{CreditConfig, CreditModel};
use ronda_traits::ValuationModel;

/// Run credit metrics, debt capacity and covenant tests.
pub(crate) fn credit(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = CreditModel::new(inputs.config::<CreditConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Credit Analysis: {}", data.symbol()));

        section("HISTORY");
        println!(
            "{:>12} {:>12} {:>12} {:>9} {:>9} {:>9}",
            "Date", "EBITDA", "Debt", "Leverage", "Net lev", "Coverage"
        );
        println!("{}", "─".repeat(68));
        for m in &r.history {
            let date = m.date.map_or_else(|| "-".to_string(), |d| d.to_string());
            println!(
                "{:>12} {:>12} {:>12} {:>9} {:>9} {:>9}",
                date,
                money(m.ebitda),
                money(m.debt),
                opt_multiple(m.leverage),
                opt_multiple(m.net_leverage),
                opt_multiple(m.interest_coverage)
            );
        }
        println!();

        section("DEBT CAPACITY");
        row("Leverage-based capacity", money(r.leverage_capacity));
        row("Coverage-based capacity", money(r.coverage_capacity));
        row("Debt capacity", money(r.debt_capacity));
        row("Headroom", money(r.headroom));
        row("Spread", format!("{} bps", r.spread_bps));
        row("Rating", r.rating.to_string());
        println!();

        section("COVENANTS");
        for c in &r.covenants {
            println!(
                "  {:<24} threshold {:>7}  actual {:>7}  {}",
                c.name,
                multiple(c.threshold),
                opt_multiple(c.actual),
                if c.pass { "PASS" } else { "FAIL" }
            );
        }
        println!();

        section("PROJECTION");
        for p in &r.projections {
            println!(
                "  Year {:<3} EBITDA {:>12}  leverage {:>7}  coverage {:>7}",
                p.year,
                money(p.ebitda),
                multiple(p.leverage),
                opt_multiple(p.interest_coverage)
            );
        }
        println!();
    })
}
