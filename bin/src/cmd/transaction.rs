//! Transaction commands: LBO, merger accretion/dilution and IPO pricing.

use super::{banner, emit, money, multiple, opt_multiple, pct, price, price_summary, row, section};
use crate::data::{Inputs, load_company};
use anyhow::Result;
use ronda_models::transaction::{
    IpoConfig, IpoModel, LboConfig, LboModel, MergerConfig, MergerModel,
};
use ronda_traits::ValuationModel;
use std::path::Path;

/// Run the leveraged buyout model.
pub(crate) fn lbo(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = LboModel::new(inputs.config::<LboConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Leveraged Buyout: {}", data.symbol()));

        section("ENTRY");
        row("Entry share price", price(r.entry_price));
        row("Entry enterprise value", money(r.entry_enterprise_value));
        row("Entry multiple", multiple(r.entry_multiple));
        row("Senior debt", money(r.sources.senior_debt));
        row("Mezzanine debt", money(r.sources.mezzanine_debt));
        row("Sponsor equity", money(r.sources.sponsor_equity));
        println!();

        section("DEBT SCHEDULE");
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>9}",
            "Year", "EBITDA", "Interest", "Levered FCF", "Senior", "Mezzanine", "Leverage"
        );
        println!("{}", "─".repeat(80));
        for y in &r.years {
            println!(
                "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>9}",
                y.year,
                money(y.ebitda),
                money(y.interest),
                money(y.levered_fcf),
                money(y.senior_debt),
                money(y.mezzanine_debt),
                opt_multiple(y.leverage)
            );
        }
        println!();

        section("RETURNS");
        row("Exit EBITDA", money(r.exit_ebitda));
        row("Exit multiple", multiple(r.exit_multiple));
        row("Exit enterprise value", money(r.exit_enterprise_value));
        row("Exit debt", money(r.exit_debt));
        row("Exit equity value", money(r.exit_equity_value));
        row("Debt paydown", money(r.total_debt_paydown));
        row("MOIC", multiple(r.moic));
        row("IRR", pct(r.irr));
        println!();
    })
}

/// Run merger accretion/dilution with `--data` as the acquirer.
pub(crate) fn merger(inputs: &Inputs, target: &Path) -> Result<()> {
    let acquirer = inputs.company()?;
    let target = load_company(Some(target))?;
    let model = MergerModel::new(inputs.config::<MergerConfig>()?);
    let result = model.analyze(&acquirer, &target)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("Merger: {} / {}", r.acquirer, r.target));

        section("OFFER");
        row("Offer price", price(r.offer_price));
        row("Purchase price", money(r.purchase_price));
        row("Offer P/E", opt_multiple(r.offer_pe));
        row("Acquirer P/E", opt_multiple(r.acquirer_pe));
        row("Cash", money(r.consideration.cash));
        row("Stock", money(r.consideration.stock));
        row("New debt", money(r.consideration.debt));
        row("Shares issued", format!("{:.1}M", r.consideration.shares_issued / 1e6));
        println!();

        section("PRO FORMA");
        row("Standalone EPS", price(r.standalone_eps));
        row("Pro forma EPS", price(r.pro_forma_eps));
        row("Accretion / (dilution)", format!("{:+.2}%", r.accretion_pct * 100.0));
        row("With synergies", format!("{:+.2}%", r.synergy_adjusted_accretion_pct * 100.0));
        row("Acquirer ownership", pct(r.acquirer_ownership));
        row("Pre-deal leverage", opt_multiple(r.pre_deal_leverage));
        row("Post-deal leverage", opt_multiple(r.post_deal_leverage));
        println!();

        section("BREAK-EVEN");
        row("Synergies", money(r.break_even_synergies));
        row(
            "Offer premium",
            r.break_even_premium.map_or_else(|| "n/a".to_string(), pct),
        );
        println!();
        println!(
            "  Deal is {}",
            if r.is_accretive { "ACCRETIVE" } else { "DILUTIVE" }
        );
        println!();
    })
}

/// Run IPO pricing.
pub(crate) fn ipo(inputs: &Inputs) -> Result<()> {
    let data = inputs.company()?;
    let model = IpoModel::new(inputs.config::<IpoConfig>()?);
    let result = model.analyze(&data)?;

    emit(inputs.format, &result, |r| {
        banner(&format!("IPO Pricing: {}", data.symbol()));

        section("VALUATION");
        row("Revenue-based EV", money(r.revenue_based_ev));
        row("EBITDA-based EV", money(r.ebitda_based_ev));
        row("Fair enterprise value", money(r.fair_enterprise_value));
        row("Fair equity value", money(r.fair_equity_value));
        row("Fair share price", price(r.fair_share_price));
        row("Implied EV/Revenue", multiple(r.implied_ev_revenue));
        println!();

        section("OFFERING");
        row("Offer price", price(r.offer_price));
        row(
            "Price range",
            format!("{} - {}", price(r.price_range_low), price(r.price_range_high)),
        );
        row("Primary shares", format!("{:.1}M", r.primary_shares / 1e6));
        row("Greenshoe shares", format!("{:.1}M", r.greenshoe_shares / 1e6));
        row("Gross proceeds", money(r.gross_proceeds));
        row("Underwriting fees", money(r.underwriting_fees));
        row("Net proceeds", money(r.net_proceeds));
        row("Pre-money equity", money(r.pre_money_equity));
        row("Post-money equity", money(r.post_money_equity));
        row("Dilution", pct(r.dilution));
        row("Expected first-day pop", pct(r.expected_first_day_pop));
        println!();

        price_summary(r.fair_share_price, r.current_price, r.upside);
    })
}
