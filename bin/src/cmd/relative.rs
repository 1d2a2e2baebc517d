//! Relative valuation commands: trading comps and precedent transactions.

use super::{banner, emit, money, multiple, opt_multiple, pct, price, price_summary, section};
use crate::data::Inputs;
use anyhow::Result;
use ronda_models::relative::{
    CompsConfig, CompsModel, ImpliedValue, PrecedentsConfig, PrecedentsModel,
};
use ronda_traits::{ValuationModel, stats::MultipleStats};

fn print_stats(label: &str, stats: &MultipleStats, fmt: fn(f64) -> String) {
    println!(
        "  {label:<12} n={:<3} low {:>8}  median {:>8}  high {:>8}  mean {:>8}",
        stats.count,
        fmt(stats.low),
        fmt(stats.median),
        fmt(stats.high),
        fmt(stats.mean)
    );
}

fn print_implied(implied: &[ImpliedValue]) {
    println!(
        "{:<16} {:>9} {:>14} {:>10} {:>10} {:>10}",
        "Method", "Multiple", "Implied EV", "Low", "Price", "High"
    );
    println!("{}", "─".repeat(74));
    for v in implied {
        println!(
            "{:<16} {:>9} {:>14} {:>10} {:>10} {:>10}",
            v.method.to_string(),
            multiple(v.multiple),
            money(v.implied_enterprise_value),
            price(v.low_share_price),
            price(v.implied_share_price),
            price(v.high_share_price)
        );
    }
    println!();
}

/// Run the trading comparables analysis.
pub(crate) fn comps(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = CompsModel::new(inputs.config::<CompsConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Trading Comparables: {}", data.symbol()));

        section("PEER SET");
        println!(
            "{:<8} {:<28} {:>12} {:>10} {:>10} {:>8}",
            "Symbol", "Name", "EV", "EV/Rev", "EV/EBITDA", "P/E"
        );
        println!("{}", "─".repeat(80));
        for p in std::iter::once(&r.target).chain(&r.peers) {
            println!(
                "{:<8} {:<28} {:>12} {:>10} {:>10} {:>8}",
                p.symbol,
                p.name,
                money(p.enterprise_value),
                opt_multiple(p.ev_revenue()),
                opt_multiple(p.ev_ebitda()),
                opt_multiple(p.pe())
            );
        }
        println!();

        section("MULTIPLES");
        print_stats("EV/Revenue", &r.ev_revenue, multiple);
        print_stats("EV/EBITDA", &r.ev_ebitda, multiple);
        print_stats("P/E", &r.pe, multiple);
        println!();

        section("IMPLIED VALUE");
        print_implied(&r.implied);
        price_summary(r.blended_share_price, r.current_price, r.upside);
    })
}

/// Run the precedent transactions analysis.
pub(crate) fn precedents(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = PrecedentsModel::new(inputs.config::<PrecedentsConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Precedent Transactions: {}", data.symbol()));

        section("TRANSACTIONS");
        println!(
            "{:<5} {:<22} {:<22} {:<10} {:>12} {:>10} {:>8}",
            "Year", "Acquirer", "Target", "Buyer", "EV", "EV/EBITDA", "Premium"
        );
        println!("{}", "─".repeat(95));
        for t in &r.transactions {
            println!(
                "{:<5} {:<22} {:<22} {:<10} {:>12} {:>10} {:>8}",
                t.year,
                t.acquirer,
                t.target,
                t.buyer_type.to_string(),
                money(t.enterprise_value),
                opt_multiple(t.ev_ebitda()),
                pct(t.premium)
            );
        }
        println!();

        section("MULTIPLES");
        print_stats("EV/Revenue", &r.ev_revenue, multiple);
        print_stats("EV/EBITDA", &r.ev_ebitda, multiple);
        print_stats("Premium", &r.premium, pct);
        println!(
            "  Strategic median EV/EBITDA {}  financial {}",
            opt_multiple(r.strategic_median_ev_ebitda),
            opt_multiple(r.financial_median_ev_ebitda)
        );
        println!();

        section("IMPLIED VALUE");
        print_implied(&r.implied);
        price_summary(r.blended_share_price, r.current_price, r.upside);
    })
}
