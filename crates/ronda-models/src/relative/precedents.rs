//! Precedent transactions analysis.

use derive_more::Display;
use rand::{Rng, SeedableRng, rngs::StdRng};
use ronda_traits::{
    CompanyData, ImpliedValuation, Result, RondaError, ValuationModel,
    stats::{MultipleStats, ratio},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::implied::{ImpliedValue, MultipleBounds, ValuationMethod, blended_price};
use crate::upside;

const STRATEGIC_BUYERS: [&str; 6] = [
    "Meridian Holdings",
    "Northstar Group",
    "Orbital Industries",
    "Pinecrest Corp",
    "Quarry Point",
    "Redfield International",
];

const FINANCIAL_BUYERS: [&str; 5] = [
    "Summit Peak Partners",
    "Tidewater Capital",
    "Upland Equity",
    "Vantage Hill Capital",
    "Westbrook Partners",
];

const TARGETS: [&str; 8] = [
    "Ashby Software",
    "Bellmont Data",
    "Carraway Systems",
    "Driftwood Labs",
    "Elmstead Cloud",
    "Foxglove Analytics",
    "Greyhaven Tech",
    "Hollins Digital",
];

/// Share of synthetic deals won by strategic buyers.
const STRATEGIC_SHARE: f64 = 0.60;

/// Multiple uplift strategic buyers pay for synergies.
const STRATEGIC_UPLIFT: f64 = 1.15;

/// Kind of acquirer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerType {
    /// Operating company.
    Strategic,
    /// Financial sponsor.
    Financial,
}

/// A completed acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Acquiring company or sponsor.
    pub acquirer: String,
    /// Company acquired.
    pub target: String,
    /// Year the deal closed.
    pub year: i32,
    /// Kind of acquirer.
    pub buyer_type: BuyerType,
    /// Transaction enterprise value.
    pub enterprise_value: f64,
    /// Target trailing revenue.
    pub revenue: f64,
    /// Target trailing EBITDA.
    pub ebitda: f64,
    /// Premium paid over the unaffected price.
    pub premium: f64,
}

impl Transaction {
    /// EV/Revenue, when revenue is non-zero.
    #[must_use]
    pub fn ev_revenue(&self) -> Option<f64> {
        ratio(self.enterprise_value, self.revenue, "EV/Revenue").ok()
    }

    /// EV/EBITDA, when EBITDA is non-zero.
    #[must_use]
    pub fn ev_ebitda(&self) -> Option<f64> {
        ratio(self.enterprise_value, self.ebitda, "EV/EBITDA").ok()
    }
}

/// Source of precedent transactions for a target.
pub trait TransactionGenerator {
    /// Produce `count` transactions relevant to `target`.
    fn generate(&mut self, target: &CompanyData, count: usize) -> Result<Vec<Transaction>>;
}

/// Synthetic transactions sized off the target's revenue.
#[derive(Debug, Clone)]
pub struct SyntheticTransactions<R> {
    rng: R,
}

impl<R: Rng> SyntheticTransactions<R> {
    /// Wrap a random source.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl SyntheticTransactions<StdRng> {
    /// Deterministic transactions for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TransactionGenerator for SyntheticTransactions<R> {
    fn generate(&mut self, target: &CompanyData, count: usize) -> Result<Vec<Transaction>> {
        let anchor = target.latest_income()?.revenue;
        if anchor <= 0.0 {
            return Err(RondaError::DegenerateInput(format!(
                "{}: transaction generation needs positive revenue",
                target.symbol()
            )));
        }

        let deals = (0..count)
            .map(|_| {
                let rng = &mut self.rng;
                let buyer_type = if rng.gen_bool(STRATEGIC_SHARE) {
                    BuyerType::Strategic
                } else {
                    BuyerType::Financial
                };
                let (acquirer, multiple, premium) = match buyer_type {
                    BuyerType::Strategic => (
                        STRATEGIC_BUYERS[rng.gen_range(0..STRATEGIC_BUYERS.len())],
                        rng.gen_range(9.0..15.0) * STRATEGIC_UPLIFT,
                        rng.gen_range(0.25..0.50),
                    ),
                    BuyerType::Financial => (
                        FINANCIAL_BUYERS[rng.gen_range(0..FINANCIAL_BUYERS.len())],
                        rng.gen_range(9.0..15.0),
                        rng.gen_range(0.15..0.35),
                    ),
                };
                let revenue = anchor * rng.gen_range(0.1..0.8);
                let ebitda = revenue * rng.gen_range(0.15..0.35);

                Transaction {
                    acquirer: acquirer.to_string(),
                    target: TARGETS[rng.gen_range(0..TARGETS.len())].to_string(),
                    year: rng.gen_range(2018..=2024),
                    buyer_type,
                    enterprise_value: ebitda * multiple,
                    revenue,
                    ebitda,
                    premium,
                }
            })
            .collect();
        Ok(deals)
    }
}

/// Configuration for precedent transactions analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecedentsConfig {
    /// Number of synthetic transactions to draw (default: 15)
    pub transaction_count: usize,

    /// Seed for synthetic transactions; unseeded runs draw from OS entropy
    pub seed: Option<u64>,

    /// Externally supplied transactions; bypasses generation when present
    pub transactions: Option<Vec<Transaction>>,

    /// Plausible EV/Revenue range (default: 0 to 50)
    pub ev_revenue_bounds: MultipleBounds,

    /// Plausible EV/EBITDA range (default: 0 to 50)
    pub ev_ebitda_bounds: MultipleBounds,

    /// Plausible control premium range (default: 0 to 150%)
    pub premium_bounds: MultipleBounds,
}

impl Default for PrecedentsConfig {
    fn default() -> Self {
        Self {
            transaction_count: 15,
            seed: None,
            transactions: None,
            ev_revenue_bounds: MultipleBounds::new(0.0, 50.0),
            ev_ebitda_bounds: MultipleBounds::new(0.0, 50.0),
            premium_bounds: MultipleBounds::new(0.0, 1.5),
        }
    }
}

/// Output of precedent transactions analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentsResult {
    /// Transactions as generated or supplied, before filtering.
    pub transactions: Vec<Transaction>,
    /// EV/Revenue statistics.
    pub ev_revenue: MultipleStats,
    /// EV/EBITDA statistics.
    pub ev_ebitda: MultipleStats,
    /// Control premium statistics.
    pub premium: MultipleStats,
    /// Median EV/EBITDA paid by strategic buyers.
    pub strategic_median_ev_ebitda: Option<f64>,
    /// Median EV/EBITDA paid by financial sponsors.
    pub financial_median_ev_ebitda: Option<f64>,
    /// Value implied by each method.
    pub implied: Vec<ImpliedValue>,
    /// Mean of the implied prices.
    pub blended_share_price: f64,
    /// Current share price.
    pub current_price: f64,
    /// Upside of the blended price; `None` without a positive current price.
    pub upside: Option<f64>,
}

impl ImpliedValuation for PrecedentsResult {
    fn implied_share_price(&self) -> f64 {
        self.blended_share_price
    }
}

/// Precedent transactions valuation.
#[derive(Debug, Clone, Default)]
pub struct PrecedentsModel {
    config: PrecedentsConfig,
}

impl PrecedentsModel {
    /// Create a new precedents model with the given configuration.
    #[must_use]
    pub const fn new(config: PrecedentsConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PrecedentsConfig {
        &self.config
    }

    /// Run against transactions drawn from `generator`.
    pub fn analyze_with<G: TransactionGenerator>(
        &self,
        data: &CompanyData,
        generator: &mut G,
    ) -> Result<PrecedentsResult> {
        let transactions = generator.generate(data, self.config.transaction_count)?;
        self.value_against(data, transactions)
    }

    fn buyer_median(&self, transactions: &[Transaction], buyer_type: BuyerType) -> Option<f64> {
        let multiples: Vec<f64> = transactions
            .iter()
            .filter(|t| t.buyer_type == buyer_type)
            .filter_map(Transaction::ev_ebitda)
            .collect();
        self.config
            .ev_ebitda_bounds
            .stats(&multiples)
            .ok()
            .map(|s| s.median)
    }

    /// Run against a fixed transaction set.
    pub fn value_against(
        &self,
        data: &CompanyData,
        transactions: Vec<Transaction>,
    ) -> Result<PrecedentsResult> {
        let income = data.latest_income()?;
        let shares = data.shares_outstanding()?;
        let net_debt = data.net_debt()?;
        let cfg = &self.config;

        let ev_revenue = cfg.ev_revenue_bounds.stats(
            &transactions.iter().filter_map(Transaction::ev_revenue).collect::<Vec<_>>(),
        )?;
        let ev_ebitda = cfg.ev_ebitda_bounds.stats(
            &transactions.iter().filter_map(Transaction::ev_ebitda).collect::<Vec<_>>(),
        )?;
        let premium = cfg
            .premium_bounds
            .stats(&transactions.iter().map(|t| t.premium).collect::<Vec<_>>())?;

        let mut implied = vec![
            ImpliedValue::from_ev_multiple(
                ValuationMethod::EvEbitda,
                income.ebitda,
                &ev_ebitda,
                net_debt,
                shares,
            ),
            ImpliedValue::from_ev_multiple(
                ValuationMethod::EvRevenue,
                income.revenue,
                &ev_revenue,
                net_debt,
                shares,
            ),
        ];

        let current_price = data.current_price();
        if current_price > 0.0 {
            let price_at = |p: f64| current_price * (1.0 + p);
            let implied_share_price = price_at(premium.median);
            let implied_equity_value = implied_share_price * shares;
            implied.push(ImpliedValue {
                method: ValuationMethod::ControlPremium,
                metric: current_price,
                multiple: premium.median,
                implied_enterprise_value: implied_equity_value + net_debt,
                implied_equity_value,
                implied_share_price,
                low_share_price: price_at(premium.low),
                high_share_price: price_at(premium.high),
            });
        }

        let blended_share_price = blended_price(&implied);

        debug!(
            symbol = data.symbol(),
            transactions = transactions.len(),
            median_ev_ebitda = ev_ebitda.median,
            median_premium = premium.median,
            blended_share_price,
            "precedents valuation complete"
        );

        Ok(PrecedentsResult {
            strategic_median_ev_ebitda: self.buyer_median(&transactions, BuyerType::Strategic),
            financial_median_ev_ebitda: self.buyer_median(&transactions, BuyerType::Financial),
            transactions,
            ev_revenue,
            ev_ebitda,
            premium,
            implied,
            blended_share_price,
            current_price,
            upside: upside(blended_share_price, current_price),
        })
    }
}

impl ValuationModel for PrecedentsModel {
    type Output = PrecedentsResult;

    fn name(&self) -> &str {
        "precedents"
    }

    fn analyze(&self, data: &CompanyData) -> Result<PrecedentsResult> {
        match (&self.config.transactions, self.config.seed) {
            (Some(transactions), _) => self.value_against(data, transactions.clone()),
            (None, Some(seed)) => self.analyze_with(data, &mut SyntheticTransactions::seeded(seed)),
            (None, None) => {
                self.analyze_with(data, &mut SyntheticTransactions::new(StdRng::from_entropy()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    const B: f64 = 1_000_000_000.0;

    fn deal(buyer_type: BuyerType, ev_ebitda: f64, premium: f64) -> Transaction {
        Transaction {
            acquirer: "Buyer".to_string(),
            target: "Target".to_string(),
            year: 2023,
            buyer_type,
            enterprise_value: ev_ebitda * 5.0 * B,
            revenue: 20.0 * B,
            ebitda: 5.0 * B,
            premium,
        }
    }

    #[test]
    fn test_default_config() {
        let config = PrecedentsConfig::default();
        assert_eq!(config.transaction_count, 15);
        assert_relative_eq!(config.premium_bounds.upper, 1.5);
    }

    #[test]
    fn test_fixed_transactions() {
        let data = reference_company();
        let deals = vec![
            deal(BuyerType::Strategic, 14.0, 0.40),
            deal(BuyerType::Strategic, 16.0, 0.35),
            deal(BuyerType::Financial, 11.0, 0.25),
            deal(BuyerType::Financial, 12.0, 0.20),
        ];
        let result = PrecedentsModel::default().value_against(&data, deals).unwrap();

        // nearest rank over [11, 12, 14, 16]
        assert_relative_eq!(result.ev_ebitda.median, 12.0, epsilon = 1e-12);
        assert_relative_eq!(result.premium.median, 0.25, epsilon = 1e-12);
        assert_relative_eq!(result.strategic_median_ev_ebitda.unwrap(), 14.0, epsilon = 1e-12);
        assert_relative_eq!(result.financial_median_ev_ebitda.unwrap(), 11.0, epsilon = 1e-12);

        let premium = result
            .implied
            .iter()
            .find(|v| v.method == ValuationMethod::ControlPremium)
            .unwrap();
        assert_relative_eq!(premium.implied_share_price, 35.0, epsilon = 1e-9);
        assert_eq!(result.implied.len(), 3);
        assert!(result.upside.is_some());
    }

    #[test]
    fn test_premium_outliers_filtered() {
        let data = reference_company();
        let deals = vec![
            deal(BuyerType::Financial, 10.0, 0.30),
            deal(BuyerType::Financial, 10.0, 3.0),
        ];
        let result = PrecedentsModel::default().value_against(&data, deals).unwrap();
        assert_eq!(result.premium.count, 1);
        assert_eq!(result.transactions.len(), 2);
        assert!(result.strategic_median_ev_ebitda.is_none());
    }

    #[test]
    fn test_no_current_price_drops_premium_method() {
        let mut data = reference_company();
        data.price.current = 0.0;
        let result = PrecedentsModel::default()
            .value_against(&data, vec![deal(BuyerType::Strategic, 12.0, 0.3)])
            .unwrap();
        assert_eq!(result.implied.len(), 2);
        assert!(result.upside.is_none());
    }

    #[test]
    fn test_synthetic_buyer_mix() {
        let data = reference_company();
        let deals = SyntheticTransactions::seeded(11).generate(&data, 200).unwrap();
        let strategic = deals
            .iter()
            .filter(|t| t.buyer_type == BuyerType::Strategic)
            .count();
        assert!((90..=150).contains(&strategic));
        for t in &deals {
            assert!((2018..=2024).contains(&t.year));
            let bounds = match t.buyer_type {
                BuyerType::Strategic => (9.0 * STRATEGIC_UPLIFT, 15.0 * STRATEGIC_UPLIFT),
                BuyerType::Financial => (9.0, 15.0),
            };
            let multiple = t.ev_ebitda().unwrap();
            assert!(multiple > bounds.0 - 1e-9 && multiple < bounds.1 + 1e-9);
        }
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let data = reference_company();
        let model = PrecedentsModel::new(PrecedentsConfig {
            seed: Some(3),
            ..Default::default()
        });
        assert_eq!(model.analyze(&data).unwrap(), model.analyze(&data).unwrap());
    }
}
