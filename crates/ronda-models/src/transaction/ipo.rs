//! IPO pricing and offering structure.

use ronda_traits::{CompanyData, ImpliedValuation, Result, RondaError, ValuationModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::upside;

/// Configuration for the IPO model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpoConfig {
    /// Peer EV/Revenue multiple (default: 4.0x)
    pub ev_revenue_multiple: f64,

    /// Peer EV/EBITDA multiple (default: 14.0x)
    pub ev_ebitda_multiple: f64,

    /// Weight of the revenue method in fair value; EBITDA takes the rest (default: 0.5)
    pub revenue_weight: f64,

    /// Discount to fair value offered to IPO investors (default: 15%)
    pub ipo_discount: f64,

    /// Primary raise as a share of pre-money equity (default: 15%)
    pub primary_raise_pct: f64,

    /// Over-allotment option as a share of primary shares (default: 15%)
    pub greenshoe_pct: f64,

    /// Underwriting gross spread (default: 7%)
    pub gross_spread: f64,

    /// Full width of the marketing range around the offer price (default: 10%)
    pub price_range_width: f64,
}

impl Default for IpoConfig {
    fn default() -> Self {
        Self {
            ev_revenue_multiple: 4.0,
            ev_ebitda_multiple: 14.0,
            revenue_weight: 0.5,
            ipo_discount: 0.15,
            primary_raise_pct: 0.15,
            greenshoe_pct: 0.15,
            gross_spread: 0.07,
            price_range_width: 0.10,
        }
    }
}

/// Output of the IPO model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpoResult {
    /// Enterprise value from the revenue multiple.
    pub revenue_based_ev: f64,
    /// Enterprise value from the EBITDA multiple.
    pub ebitda_based_ev: f64,
    /// Weighted fair enterprise value.
    pub fair_enterprise_value: f64,
    /// Fair enterprise value less net debt.
    pub fair_equity_value: f64,
    /// Fair value per existing share.
    pub fair_share_price: f64,
    /// Price offered to investors.
    pub offer_price: f64,
    /// Bottom of the marketing range.
    pub price_range_low: f64,
    /// Top of the marketing range.
    pub price_range_high: f64,
    /// Existing shares times the offer price.
    pub pre_money_equity: f64,
    /// Primary shares sold.
    pub primary_shares: f64,
    /// Over-allotment shares.
    pub greenshoe_shares: f64,
    /// Proceeds including the over-allotment.
    pub gross_proceeds: f64,
    /// Underwriting fees.
    pub underwriting_fees: f64,
    /// Proceeds after fees.
    pub net_proceeds: f64,
    /// Pre-money equity plus gross proceeds.
    pub post_money_equity: f64,
    /// New shares over total shares after the offering.
    pub dilution: f64,
    /// Pre-money enterprise value at the offer over revenue.
    pub implied_ev_revenue: f64,
    /// First-day return if shares trade up to fair value.
    pub expected_first_day_pop: f64,
    /// Current share price, zero for a private company.
    pub current_price: f64,
    /// Upside of fair value over the current price, when one exists.
    pub upside: Option<f64>,
}

impl ImpliedValuation for IpoResult {
    fn implied_share_price(&self) -> f64 {
        self.fair_share_price
    }
}

/// IPO pricing model.
///
/// Blends peer revenue and EBITDA multiples into a fair value, applies the
/// customary IPO discount, and sizes a primary offering with an over-allotment.
#[derive(Debug, Clone, Default)]
pub struct IpoModel {
    config: IpoConfig,
}

impl IpoModel {
    /// Create a new IPO model with the given configuration.
    #[must_use]
    pub const fn new(config: IpoConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &IpoConfig {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        let cfg = &self.config;
        if !(0.0..=1.0).contains(&cfg.revenue_weight) {
            return Err(RondaError::InvalidData(format!(
                "revenue weight must be within [0, 1], got {}",
                cfg.revenue_weight
            )));
        }
        if !(0.0..1.0).contains(&cfg.ipo_discount) {
            return Err(RondaError::InvalidData(format!(
                "IPO discount must be within [0, 1), got {}",
                cfg.ipo_discount
            )));
        }
        Ok(())
    }
}

impl ValuationModel for IpoModel {
    type Output = IpoResult;

    fn name(&self) -> &str {
        "ipo"
    }

    fn analyze(&self, data: &CompanyData) -> Result<IpoResult> {
        self.validate()?;
        let cfg = &self.config;
        let income = data.latest_income()?;
        let shares = data.shares_outstanding()?;
        let net_debt = data.net_debt()?;

        let revenue_based_ev = income.revenue * cfg.ev_revenue_multiple;
        let ebitda_based_ev = income.ebitda * cfg.ev_ebitda_multiple;
        let fair_enterprise_value =
            cfg.revenue_weight * revenue_based_ev + (1.0 - cfg.revenue_weight) * ebitda_based_ev;
        let fair_equity_value = fair_enterprise_value - net_debt;
        if fair_equity_value <= 0.0 {
            return Err(RondaError::DegenerateInput(format!(
                "{}: fair equity value is not positive",
                data.symbol()
            )));
        }

        let fair_share_price = fair_equity_value / shares;
        let offer_price = fair_share_price * (1.0 - cfg.ipo_discount);
        let half_width = cfg.price_range_width / 2.0;
        let pre_money_equity = offer_price * shares;

        let primary_shares = pre_money_equity * cfg.primary_raise_pct / offer_price;
        let greenshoe_shares = primary_shares * cfg.greenshoe_pct;
        let new_shares = primary_shares + greenshoe_shares;
        let gross_proceeds = new_shares * offer_price;
        let underwriting_fees = gross_proceeds * cfg.gross_spread;
        let current_price = data.current_price();

        debug!(
            symbol = data.symbol(),
            fair_share_price,
            offer_price,
            gross_proceeds,
            "IPO pricing complete"
        );

        Ok(IpoResult {
            revenue_based_ev,
            ebitda_based_ev,
            fair_enterprise_value,
            fair_equity_value,
            fair_share_price,
            offer_price,
            price_range_low: offer_price * (1.0 - half_width),
            price_range_high: offer_price * (1.0 + half_width),
            pre_money_equity,
            primary_shares,
            greenshoe_shares,
            gross_proceeds,
            underwriting_fees,
            net_proceeds: gross_proceeds - underwriting_fees,
            post_money_equity: pre_money_equity + gross_proceeds,
            dilution: new_shares / (shares + new_shares),
            implied_ev_revenue: (pre_money_equity + net_debt) / income.revenue,
            expected_first_day_pop: cfg.ipo_discount / (1.0 - cfg.ipo_discount),
            current_price,
            upside: upside(fair_share_price, current_price),
        })
    }
}
