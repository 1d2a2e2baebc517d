//! Composite commands: sensitivity analysis and the IC memo.

use super::{banner, emit, money, opt_pct, pct, price, price_summary, row, section};
use crate::data::Inputs;
use anyhow::Result;
use ronda_combine::{MemoConfig, MemoModel};
use ronda_eval::{SensitivityAnalyzer, SensitivityConfig};
use ronda_traits::ValuationModel;

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), price)
}

/// Every swept assumption is a rate.
fn rate(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Run DCF sensitivity sweeps, scenarios, break-evens and the tornado ranking.
pub(crate) fn sensitivity(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let analyzer = SensitivityAnalyzer::new(inputs.config::<SensitivityConfig>()?);
    let report = analyzer.analyze(&data)?;

    emit(inputs.format, &report, |r| {
        banner(&format!("Sensitivity Analysis: {}", data.symbol()));
        price_summary(r.base.implied_share_price, r.base.current_price, r.base.upside);

        section("WACC x TERMINAL GROWTH");
        print!("{:>10}", "WACC \\ g");
        for g in &r.two_way.terminal_growths {
            print!(" {:>10}", pct(*g));
        }
        println!();
        for (wacc, prices) in r.two_way.waccs.iter().zip(&r.two_way.prices) {
            print!("{:>10}", pct(*wacc));
            for p in prices {
                print!(" {:>10}", cell(*p));
            }
            println!();
        }
        println!();

        section("TORNADO");
        for bar in &r.tornado {
            println!(
                "  {:<16} {:>8} -> {:>10}   {:>8} -> {:>10}   swing {:>10} ({})",
                bar.variable.to_string(),
                rate(bar.low_value),
                price(bar.low_price),
                rate(bar.high_value),
                price(bar.high_price),
                price(bar.swing),
                opt_pct(bar.impact)
            );
        }
        println!();

        section("BREAK-EVEN VS MARKET PRICE");
        for b in &r.break_evens {
            println!(
                "  {:<16} {:>8}  implied {:>10}",
                b.variable.to_string(),
                b.value.map_or_else(|| "n/a".to_string(), rate),
                cell(b.implied_price)
            );
        }
        println!();

        section("SCENARIOS");
        for o in &r.scenarios.outcomes {
            println!(
                "  {:<6} p={:<5.2} WACC {:>7}  EV {:>12}  price {:>10}  upside {:>7}",
                o.kind.to_string(),
                o.probability,
                pct(o.assumptions.wacc),
                money(o.enterprise_value),
                price(o.implied_share_price),
                opt_pct(o.upside)
            );
        }
        row("Expected price", price(r.scenarios.expected_price));
        row("Expected upside", opt_pct(r.scenarios.expected_upside));
        println!();
    })
}

/// Produce the investment committee memo.
pub(crate) fn memo(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = MemoModel::new(inputs.config::<MemoConfig>()?);
    let memo = model.analyze(&data)?;

    emit(inputs.format, &memo, |m| {
        banner(&format!("Investment Committee Memo: {}", m.symbol));
        println!("  {} ({})\n", m.company_name, m.symbol);

        section(&format!("RECOMMENDATION: {} ({} conviction)", m.recommendation, m.conviction));
        row("Weighted value", price(m.weighted_price));
        row(
            "Value range",
            format!("{} - {}", price(m.price_low), price(m.price_high)),
        );
        price_summary(m.weighted_price, m.current_price, m.upside);

        section("VALUATION METHODS");
        for v in &m.methods {
            match (v.implied_share_price, &v.excluded_reason) {
                (Some(p), _) => println!(
                    "  {:<24} {:>10}  weight {:>6} (configured {})",
                    v.method.to_string(),
                    price(p),
                    pct(v.effective_weight),
                    pct(v.weight)
                ),
                (None, reason) => println!(
                    "  {:<24}   excluded  {}",
                    v.method.to_string(),
                    reason.as_deref().unwrap_or_default()
                ),
            }
        }
        if m.weights_renormalized {
            println!("\n  Weights renormalized over the remaining methods.");
        }
        println!();

        section("THESIS");
        for point in &m.thesis {
            println!("  - {point}");
        }
        println!();

        section("RISKS");
        for risk in &m.risks {
            println!("  - {risk}");
        }
        println!();
    })
}
