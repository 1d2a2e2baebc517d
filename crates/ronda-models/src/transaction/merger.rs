//! M&A accretion/dilution analysis.

use ronda_traits::{CompanyData, Result, RondaError, stats::ratio};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tolerance on the consideration mix summing to one.
const MIX_TOLERANCE: f64 = 1e-6;

/// Configuration for the merger model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergerConfig {
    /// Premium over the target's current price (default: 30%)
    pub offer_premium: f64,

    /// Share of the purchase paid from balance sheet cash (default: 0%)
    pub cash_pct: f64,

    /// Share paid in newly issued acquirer stock (default: 50%)
    pub stock_pct: f64,

    /// Share funded with new debt (default: 50%)
    pub debt_pct: f64,

    /// Interest rate on acquisition debt (default: 6%)
    pub debt_interest_rate: f64,

    /// Pre-tax yield forgone on cash used (default: 3%)
    pub cash_yield: f64,

    /// Tax rate applied to interest and synergies (default: 21%)
    pub tax_rate: f64,

    /// Expected annual pre-tax synergies (default: 0)
    pub synergies: f64,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            offer_premium: 0.30,
            cash_pct: 0.0,
            stock_pct: 0.5,
            debt_pct: 0.5,
            debt_interest_rate: 0.06,
            cash_yield: 0.03,
            tax_rate: 0.21,
            synergies: 0.0,
        }
    }
}

/// How the purchase price is paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consideration {
    /// Cash from the acquirer's balance sheet.
    pub cash: f64,
    /// Value of acquirer stock issued.
    pub stock: f64,
    /// New acquisition debt.
    pub debt: f64,
    /// Acquirer shares issued at its current price.
    pub shares_issued: f64,
}

/// Output of the merger model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergerResult {
    /// Acquirer ticker.
    pub acquirer: String,
    /// Target ticker.
    pub target: String,
    /// Price per target share offered.
    pub offer_price: f64,
    /// Total equity purchase price.
    pub purchase_price: f64,
    /// Offer price over target EPS.
    pub offer_pe: Option<f64>,
    /// Acquirer price over its EPS.
    pub acquirer_pe: Option<f64>,
    /// Payment split.
    pub consideration: Consideration,
    /// After-tax interest on new debt.
    pub after_tax_interest: f64,
    /// After-tax interest income given up on cash used.
    pub forgone_interest: f64,
    /// Acquirer standalone EPS.
    pub standalone_eps: f64,
    /// Combined net income before synergies.
    pub pro_forma_net_income: f64,
    /// Acquirer shares plus shares issued.
    pub pro_forma_shares: f64,
    /// Combined EPS before synergies.
    pub pro_forma_eps: f64,
    /// Pro-forma EPS less standalone EPS.
    pub accretion: f64,
    /// Accretion relative to standalone EPS.
    pub accretion_pct: f64,
    /// Pro-forma EPS including after-tax synergies.
    pub synergy_adjusted_eps: f64,
    /// Synergy-adjusted accretion relative to standalone EPS.
    pub synergy_adjusted_accretion_pct: f64,
    /// Share of the combined company held by acquirer shareholders.
    pub acquirer_ownership: f64,
    /// Share held by former target shareholders.
    pub target_ownership: f64,
    /// Acquirer debt over EBITDA before the deal.
    pub pre_deal_leverage: Option<f64>,
    /// Combined debt over combined EBITDA after the deal.
    pub post_deal_leverage: Option<f64>,
    /// Pre-tax synergies that make the deal EPS-neutral.
    pub break_even_synergies: f64,
    /// Offer premium at which the deal is EPS-neutral without synergies.
    pub break_even_premium: Option<f64>,
    /// Whether pro-forma EPS exceeds standalone EPS.
    pub is_accretive: bool,
}

/// Accretion/dilution model for an acquirer buying a target.
///
/// This is a two-company calculation, so it is driven through
/// [`MergerModel::analyze`] rather than the single-snapshot model trait.
#[derive(Debug, Clone, Default)]
pub struct MergerModel {
    config: MergerConfig,
}

impl MergerModel {
    /// Create a new merger model with the given configuration.
    #[must_use]
    pub const fn new(config: MergerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MergerConfig {
        &self.config
    }

    /// Returns the unique name of this model.
    #[must_use]
    pub const fn name(&self) -> &str {
        "merger"
    }

    fn validate(&self) -> Result<()> {
        let cfg = &self.config;
        let parts = [cfg.cash_pct, cfg.stock_pct, cfg.debt_pct];
        if parts.iter().any(|p| *p < 0.0) {
            return Err(RondaError::InvalidData(
                "consideration shares must be non-negative".to_string(),
            ));
        }
        let total: f64 = parts.iter().sum();
        if (total - 1.0).abs() > MIX_TOLERANCE {
            return Err(RondaError::InvalidData(format!(
                "consideration mix must sum to 1, got {total:.4}"
            )));
        }
        Ok(())
    }

    /// Pro-forma EPS impact of `acquirer` buying `target`.
    ///
    /// # Errors
    ///
    /// - [`RondaError::InvalidData`] when the consideration mix does not sum to 1
    /// - [`RondaError::DegenerateInput`] when either price or the acquirer's
    ///   standalone EPS is zero
    pub fn analyze(&self, acquirer: &CompanyData, target: &CompanyData) -> Result<MergerResult> {
        self.validate()?;
        let cfg = &self.config;

        let acquirer_price = positive_price(acquirer)?;
        let target_price = positive_price(target)?;
        let acquirer_shares = acquirer.shares_outstanding()?;
        let target_shares = target.shares_outstanding()?;
        let acquirer_income = acquirer.latest_income()?;
        let target_income = target.latest_income()?;

        let standalone_eps = ratio(acquirer_income.net_income, acquirer_shares, "acquirer EPS")?;
        if standalone_eps.abs() < f64::EPSILON {
            return Err(RondaError::DegenerateInput(format!(
                "{}: acquirer standalone EPS is zero",
                acquirer.symbol()
            )));
        }
        let target_eps = target_income.net_income / target_shares;

        let offer_price = target_price * (1.0 + cfg.offer_premium);
        let purchase_price = offer_price * target_shares;

        let stock = purchase_price * cfg.stock_pct;
        let consideration = Consideration {
            cash: purchase_price * cfg.cash_pct,
            stock,
            debt: purchase_price * cfg.debt_pct,
            shares_issued: stock / acquirer_price,
        };

        let after_tax = 1.0 - cfg.tax_rate;
        let after_tax_interest = consideration.debt * cfg.debt_interest_rate * after_tax;
        let forgone_interest = consideration.cash * cfg.cash_yield * after_tax;

        let pro_forma_net_income = acquirer_income.net_income + target_income.net_income
            - after_tax_interest
            - forgone_interest;
        let pro_forma_shares = acquirer_shares + consideration.shares_issued;
        let pro_forma_eps = pro_forma_net_income / pro_forma_shares;
        let accretion = pro_forma_eps - standalone_eps;

        let synergy_adjusted_eps =
            (pro_forma_net_income + cfg.synergies * after_tax) / pro_forma_shares;

        let break_even_synergies = if after_tax > 0.0 {
            ((standalone_eps * pro_forma_shares - pro_forma_net_income) / after_tax).max(0.0)
        } else {
            0.0
        };

        let acquirer_debt = acquirer.latest_balance()?.total_debt;
        let target_debt = target.latest_balance()?.total_debt;
        let pre_deal_leverage = ratio(acquirer_debt, acquirer_income.ebitda, "pre-deal leverage").ok();
        let post_deal_leverage = ratio(
            acquirer_debt + target_debt + consideration.debt,
            acquirer_income.ebitda + target_income.ebitda,
            "post-deal leverage",
        )
        .ok();

        let break_even_premium = self.break_even_premium(
            acquirer_income.net_income + target_income.net_income,
            standalone_eps,
            acquirer_shares,
            target_price * target_shares,
            acquirer_price,
        );

        let result = MergerResult {
            acquirer: acquirer.symbol().to_string(),
            target: target.symbol().to_string(),
            offer_price,
            purchase_price,
            offer_pe: ratio(offer_price, target_eps, "offer P/E").ok(),
            acquirer_pe: ratio(acquirer_price, standalone_eps, "acquirer P/E").ok(),
            after_tax_interest,
            forgone_interest,
            standalone_eps,
            pro_forma_net_income,
            pro_forma_shares,
            pro_forma_eps,
            accretion,
            accretion_pct: accretion / standalone_eps,
            synergy_adjusted_eps,
            synergy_adjusted_accretion_pct: (synergy_adjusted_eps - standalone_eps) / standalone_eps,
            acquirer_ownership: acquirer_shares / pro_forma_shares,
            target_ownership: consideration.shares_issued / pro_forma_shares,
            consideration,
            pre_deal_leverage,
            post_deal_leverage,
            break_even_synergies,
            break_even_premium,
            is_accretive: accretion > 0.0,
        };

        debug!(
            acquirer = %result.acquirer,
            target = %result.target,
            accretion_pct = result.accretion_pct,
            "merger analysis complete"
        );

        Ok(result)
    }

    /// Premium `p` solving `pro-forma EPS(p) = standalone EPS`.
    ///
    /// With `V = target market value`, `k` the after-tax funding cost per unit
    /// of purchase price and `s` the stock share:
    /// `1 + p = (NI_a + NI_t - e0 * S_a) / (V * (k + e0 * s / P_a))`.
    fn break_even_premium(
        &self,
        combined_net_income: f64,
        standalone_eps: f64,
        acquirer_shares: f64,
        target_value: f64,
        acquirer_price: f64,
    ) -> Option<f64> {
        let cfg = &self.config;
        let after_tax = 1.0 - cfg.tax_rate;
        let funding_cost =
            (cfg.debt_pct * cfg.debt_interest_rate + cfg.cash_pct * cfg.cash_yield) * after_tax;
        let denominator =
            target_value * (funding_cost + standalone_eps * cfg.stock_pct / acquirer_price);
        let numerator = combined_net_income - standalone_eps * acquirer_shares;

        let gross = ratio(numerator, denominator, "break-even premium").ok()?;
        (gross > 0.0).then_some(gross - 1.0)
    }
}

fn positive_price(data: &CompanyData) -> Result<f64> {
    let price = data.current_price();
    if price > 0.0 {
        Ok(price)
    } else {
        Err(RondaError::DegenerateInput(format!(
            "{}: merger analysis needs a positive share price",
            data.symbol()
        )))
    }
}
