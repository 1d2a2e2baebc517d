//! Intrinsic valuation commands: DCF, FCF analysis and sum-of-the-parts.

use super::{banner, emit, money, multiple, opt_pct, pct, price, price_summary, row, section};
use crate::data::Inputs;
use anyhow::Result;
use ronda_models::intrinsic::{DcfConfig, DcfModel, FcfConfig, FcfModel, SotpConfig, SotpModel};
use ronda_traits::ValuationModel;

/// Run the discounted cash flow model.
pub(crate) fn dcf(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = DcfModel::new(inputs.config::<DcfConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("DCF Valuation: {}", data.symbol()));

        section("ASSUMPTIONS");
        row("WACC", pct(r.wacc));
        row("Cost of equity", pct(r.cost_of_equity));
        row("Terminal growth", pct(r.terminal_growth));
        println!();

        section("PROJECTION");
        println!(
            "{:>4} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Year", "Growth", "Revenue", "EBITDA", "NOPAT", "FCF", "PV"
        );
        println!("{}", "─".repeat(78));
        for p in &r.projections {
            println!(
                "{:>4} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
                p.year,
                pct(p.growth),
                money(p.revenue),
                money(p.ebitda),
                money(p.nopat),
                money(p.free_cash_flow),
                money(p.present_value)
            );
        }
        println!();

        section("VALUATION");
        row("Sum of PV(FCF)", money(r.sum_pv_fcf));
        row("Terminal value", money(r.terminal_value));
        row("PV of terminal value", money(r.pv_terminal_value));
        row("Terminal value share", pct(r.terminal_value_share));
        row("Enterprise value", money(r.enterprise_value));
        row("Less: net debt", money(r.net_debt));
        row("Equity value", money(r.equity_value));
        price_summary(r.implied_share_price, r.current_price, r.upside);
    })
}

/// Run the free cash flow analysis.
pub(crate) fn fcf(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = FcfModel::new(inputs.config::<FcfConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Free Cash Flow: {}", data.symbol()));

        section("HISTORY");
        println!(
            "{:>12} {:>12} {:>12} {:>12} {:>10} {:>11}",
            "Date", "Revenue", "OCF", "FCF", "Margin", "Conversion"
        );
        println!("{}", "─".repeat(74));
        for p in &r.history {
            let date = p.date.map_or_else(|| "-".to_string(), |d| d.to_string());
            println!(
                "{:>12} {:>12} {:>12} {:>12} {:>10} {:>11}",
                date,
                money(p.revenue),
                money(p.operating_cash_flow),
                money(p.free_cash_flow),
                pct(p.fcf_margin),
                opt_pct(p.fcf_conversion)
            );
        }
        println!();

        section("METRICS");
        row("Average FCF margin", pct(r.metrics.average_margin));
        row("Average conversion", opt_pct(r.metrics.average_conversion));
        row("FCF CAGR", opt_pct(r.metrics.cagr));
        row("FCF volatility", opt_pct(r.metrics.volatility));
        row("Latest FCF", money(r.metrics.latest_fcf));
        println!();

        section(&format!("PROJECTION (target margin {})", pct(r.target_margin)));
        for p in &r.projections {
            println!(
                "  Year {:<3} revenue {:>12}  margin {:>7}  FCF {:>12}",
                p.year,
                money(p.revenue),
                pct(p.fcf_margin),
                money(p.free_cash_flow)
            );
        }
        println!();
    })
}

/// Run the sum-of-the-parts valuation.
pub(crate) fn sotp(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = SotpModel::new(inputs.config::<SotpConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Sum of the Parts: {}", data.symbol()));

        section("SEGMENTS");
        println!(
            "{:<20} {:<14} {:>12} {:>12} {:>8} {:>12} {:>7}",
            "Segment", "Method", "Revenue", "EBITDA", "Multiple", "Value", "Share"
        );
        println!("{}", "─".repeat(90));
        for s in &r.segments {
            println!(
                "{:<20} {:<14} {:>12} {:>12} {:>8} {:>12} {:>7}",
                s.name,
                s.method.to_string(),
                money(s.revenue),
                money(s.ebitda),
                multiple(s.multiple),
                money(s.value),
                pct(s.share_of_total)
            );
        }
        println!();

        section("BRIDGE");
        row("Gross segment value", money(r.gross_value));
        row("Less: corporate overhead", money(r.overhead_value));
        row("Enterprise value", money(r.enterprise_value));
        row("Less: net debt", money(r.net_debt));
        row("Equity value", money(r.equity_value));
        price_summary(r.implied_share_price, r.current_price, r.upside);

        section("SCENARIOS");
        for s in &r.scenarios {
            println!(
                "  {:<14} x{:<5.2} EV {:>12}  price {:>10}",
                s.name,
                s.factor,
                money(s.enterprise_value),
                price(s.implied_share_price)
            );
        }
        println!();
    })
}
