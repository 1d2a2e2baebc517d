//! Comparable companies analysis.

use rand::{Rng, SeedableRng, rngs::StdRng};
use ronda_traits::{
    CompanyData, ImpliedValuation, Result, RondaError, ValuationModel,
    stats::{MultipleStats, ratio},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::implied::{ImpliedValue, MultipleBounds, ValuationMethod, blended_price};
use crate::upside;

const PEER_NAMES: [&str; 10] = [
    "Alder Systems",
    "Brightwater Labs",
    "Corvid Networks",
    "Dunmore Analytics",
    "Eastgate Software",
    "Fenwick Digital",
    "Glasswing Data",
    "Harrow Cloud",
    "Isleworth Tech",
    "Juniper Ridge",
];

/// A publicly traded peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerCompany {
    /// Ticker.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Equity market value.
    pub market_cap: f64,
    /// Market cap plus net debt.
    pub enterprise_value: f64,
    /// Trailing revenue.
    pub revenue: f64,
    /// Trailing EBITDA.
    pub ebitda: f64,
    /// Trailing net income.
    pub net_income: f64,
}

impl PeerCompany {
    /// Express the valuation target itself as a peer.
    pub fn from_target(data: &CompanyData) -> Result<Self> {
        let income = data.latest_income()?;
        let market_cap = if data.profile.market_cap > 0.0 {
            data.profile.market_cap
        } else {
            data.current_price() * data.shares_outstanding()?
        };
        Ok(Self {
            symbol: data.profile.symbol.clone(),
            name: data.profile.name.clone(),
            market_cap,
            enterprise_value: market_cap + data.net_debt()?,
            revenue: income.revenue,
            ebitda: income.ebitda,
            net_income: income.net_income,
        })
    }

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

    /// Price over earnings, when net income is non-zero.
    #[must_use]
    pub fn pe(&self) -> Option<f64> {
        ratio(self.market_cap, self.net_income, "P/E").ok()
    }
}

/// Source of peer companies for a target.
pub trait PeerGenerator {
    /// Produce `count` peers for `target`.
    fn generate(&mut self, target: &CompanyData, count: usize) -> Result<Vec<PeerCompany>>;
}

/// Revenue-anchored synthetic peers drawn from a random source.
#[derive(Debug, Clone)]
pub struct SyntheticPeers<R> {
    rng: R,
}

impl<R: Rng> SyntheticPeers<R> {
    /// Wrap a random source.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl SyntheticPeers<StdRng> {
    /// Deterministic peers for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PeerGenerator for SyntheticPeers<R> {
    fn generate(&mut self, target: &CompanyData, count: usize) -> Result<Vec<PeerCompany>> {
        let anchor = target.latest_income()?.revenue;
        if anchor <= 0.0 {
            return Err(RondaError::DegenerateInput(format!(
                "{}: peer generation needs positive revenue",
                target.symbol()
            )));
        }

        let peers = (0..count)
            .map(|i| {
                let base = PEER_NAMES[i % PEER_NAMES.len()];
                let stem = base
                    .chars()
                    .filter(char::is_ascii_alphabetic)
                    .take(4)
                    .collect::<String>()
                    .to_uppercase();
                let (name, symbol) = match i / PEER_NAMES.len() {
                    0 => (base.to_string(), stem),
                    round => (format!("{base} {}", round + 1), format!("{stem}{}", round + 1)),
                };

                let revenue = anchor * self.rng.gen_range(0.5..2.0);
                let ebitda_margin = self.rng.gen_range(0.15..0.40);
                let ebitda = revenue * ebitda_margin;
                let net_income = ebitda * self.rng.gen_range(0.40..0.70);
                let enterprise_value = ebitda * self.rng.gen_range(8.0..20.0);
                let net_debt = enterprise_value * self.rng.gen_range(0.0..0.15);

                PeerCompany {
                    symbol,
                    name,
                    market_cap: enterprise_value - net_debt,
                    enterprise_value,
                    revenue,
                    ebitda,
                    net_income,
                }
            })
            .collect();
        Ok(peers)
    }
}

/// Configuration for comparable companies analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompsConfig {
    /// Number of synthetic peers to draw (default: 8)
    pub peer_count: usize,

    /// Seed for synthetic peers; unseeded runs draw from OS entropy
    pub seed: Option<u64>,

    /// Externally supplied peer set; bypasses generation when present
    pub peers: Option<Vec<PeerCompany>>,

    /// Plausible EV/Revenue range (default: 0 to 50)
    pub ev_revenue_bounds: MultipleBounds,

    /// Plausible EV/EBITDA range (default: 0 to 50)
    pub ev_ebitda_bounds: MultipleBounds,

    /// Plausible P/E range (default: 0 to 100)
    pub pe_bounds: MultipleBounds,
}

impl Default for CompsConfig {
    fn default() -> Self {
        Self {
            peer_count: 8,
            seed: None,
            peers: None,
            ev_revenue_bounds: MultipleBounds::new(0.0, 50.0),
            ev_ebitda_bounds: MultipleBounds::new(0.0, 50.0),
            pe_bounds: MultipleBounds::new(0.0, 100.0),
        }
    }
}

/// Output of comparable companies analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompsResult {
    /// Peer set as generated or supplied, before filtering.
    pub peers: Vec<PeerCompany>,
    /// The target expressed as a peer.
    pub target: PeerCompany,
    /// EV/Revenue over peers and target.
    pub ev_revenue: MultipleStats,
    /// EV/EBITDA over peers and target.
    pub ev_ebitda: MultipleStats,
    /// P/E over peers and target.
    pub pe: MultipleStats,
    /// Value implied by each method.
    pub implied: Vec<ImpliedValue>,
    /// Mean of the implied prices.
    pub blended_share_price: f64,
    /// Current share price.
    pub current_price: f64,
    /// Upside of the blended price; `None` without a positive current price.
    pub upside: Option<f64>,
}

impl ImpliedValuation for CompsResult {
    fn implied_share_price(&self) -> f64 {
        self.blended_share_price
    }
}

/// Comparable companies valuation.
///
/// Computes trading multiples over a peer set that includes the target,
/// drops implausible values, and applies the median (with a p25/p75 band)
/// to the target's own metrics.
#[derive(Debug, Clone, Default)]
pub struct CompsModel {
    config: CompsConfig,
}

impl CompsModel {
    /// Create a new comps model with the given configuration.
    #[must_use]
    pub const fn new(config: CompsConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CompsConfig {
        &self.config
    }

    /// Run against peers drawn from `generator`.
    pub fn analyze_with<G: PeerGenerator>(
        &self,
        data: &CompanyData,
        generator: &mut G,
    ) -> Result<CompsResult> {
        let peers = generator.generate(data, self.config.peer_count)?;
        self.value_against(data, peers)
    }

    /// Run against a fixed peer set.
    pub fn value_against(&self, data: &CompanyData, peers: Vec<PeerCompany>) -> Result<CompsResult> {
        let target = PeerCompany::from_target(data)?;
        let shares = data.shares_outstanding()?;
        let net_debt = data.net_debt()?;

        let universe = || peers.iter().chain(std::iter::once(&target));
        let collect = |f: fn(&PeerCompany) -> Option<f64>| universe().filter_map(f).collect::<Vec<_>>();

        let cfg = &self.config;
        let ev_revenue = cfg.ev_revenue_bounds.stats(&collect(PeerCompany::ev_revenue))?;
        let ev_ebitda = cfg.ev_ebitda_bounds.stats(&collect(PeerCompany::ev_ebitda))?;
        let pe = cfg.pe_bounds.stats(&collect(PeerCompany::pe))?;

        let implied = vec![
            ImpliedValue::from_ev_multiple(
                ValuationMethod::EvRevenue,
                target.revenue,
                &ev_revenue,
                net_debt,
                shares,
            ),
            ImpliedValue::from_ev_multiple(
                ValuationMethod::EvEbitda,
                target.ebitda,
                &ev_ebitda,
                net_debt,
                shares,
            ),
            ImpliedValue::from_equity_multiple(
                ValuationMethod::PriceEarnings,
                target.net_income,
                &pe,
                net_debt,
                shares,
            ),
        ];
        let blended_share_price = blended_price(&implied);
        let current_price = data.current_price();

        debug!(
            symbol = data.symbol(),
            peers = peers.len(),
            median_ev_ebitda = ev_ebitda.median,
            blended_share_price,
            "comps valuation complete"
        );

        Ok(CompsResult {
            peers,
            target,
            ev_revenue,
            ev_ebitda,
            pe,
            implied,
            blended_share_price,
            current_price,
            upside: upside(blended_share_price, current_price),
        })
    }
}

impl ValuationModel for CompsModel {
    type Output = CompsResult;

    fn name(&self) -> &str {
        "comps"
    }

    fn analyze(&self, data: &CompanyData) -> Result<CompsResult> {
        match (&self.config.peers, self.config.seed) {
            (Some(peers), _) => self.value_against(data, peers.clone()),
            (None, Some(seed)) => self.analyze_with(data, &mut SyntheticPeers::seeded(seed)),
            (None, None) => {
                self.analyze_with(data, &mut SyntheticPeers::new(StdRng::from_entropy()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    const B: f64 = 1_000_000_000.0;

    fn peer(symbol: &str, ev_ebitda: f64) -> PeerCompany {
        PeerCompany {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            market_cap: 10.0 * ev_ebitda * B * 0.9,
            enterprise_value: 10.0 * ev_ebitda * B,
            revenue: 40.0 * B,
            ebitda: 10.0 * B,
            net_income: 6.0 * B,
        }
    }

    #[test]
    fn test_default_config() {
        let config = CompsConfig::default();
        assert_eq!(config.peer_count, 8);
        assert!(config.seed.is_none());
        assert_relative_eq!(config.pe_bounds.upper, 100.0);
    }

    #[test]
    fn test_target_multiples() {
        let target = PeerCompany::from_target(&reference_company()).unwrap();
        assert_relative_eq!(target.enterprise_value, 300.0 * B, max_relative = 1e-12);
        assert_relative_eq!(target.ev_ebitda().unwrap(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(target.ev_revenue().unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(target.pe().unwrap(), 14.0, epsilon = 1e-12);
    }

    #[test]
    fn test_outlier_excluded_from_stats_but_kept_in_list() {
        let data = reference_company();
        let peers = vec![
            peer("AAA", 8.0),
            peer("BBB", 12.0),
            peer("CCC", 14.0),
            peer("OUT", 1000.0),
        ];
        let result = CompsModel::default().value_against(&data, peers).unwrap();

        assert_eq!(result.peers.len(), 4);
        assert!(result.peers.iter().any(|p| p.symbol == "OUT"));
        // three peers plus the target
        assert_eq!(result.ev_ebitda.count, 4);
        assert!(result.ev_ebitda.high < 50.0);
        // nearest rank over [8, 10, 12, 14]
        assert_relative_eq!(result.ev_ebitda.median, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_implied_prices() {
        let data = reference_company();
        let peers = vec![peer("AAA", 10.0), peer("BBB", 10.0)];
        let result = CompsModel::default().value_against(&data, peers).unwrap();
        let ebitda = result
            .implied
            .iter()
            .find(|v| v.method == ValuationMethod::EvEbitda)
            .unwrap();
        // (30B * 10 - 20B) / 10B shares
        assert_relative_eq!(ebitda.implied_share_price, 28.0, epsilon = 1e-9);
        assert_eq!(result.implied.len(), 3);
        assert!(result.is_finite());
        let mean = result.implied.iter().map(|v| v.implied_share_price).sum::<f64>() / 3.0;
        assert_relative_eq!(result.blended_share_price, mean, epsilon = 1e-9);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let data = reference_company();
        let model = CompsModel::new(CompsConfig {
            seed: Some(42),
            ..Default::default()
        });
        let first = model.analyze(&data).unwrap();
        let second = model.analyze(&data).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.peers.len(), 8);
    }

    #[test]
    fn test_synthetic_peers_are_anchored() {
        let data = reference_company();
        let peers = SyntheticPeers::seeded(7).generate(&data, 12).unwrap();
        assert_eq!(peers.len(), 12);
        for p in &peers {
            assert!(p.revenue >= 50.0 * B && p.revenue < 200.0 * B);
            let multiple = p.ev_ebitda().unwrap();
            assert!((8.0..20.0).contains(&multiple));
            assert!(p.market_cap <= p.enterprise_value);
        }
        assert_eq!(peers[10].name, "Alder Systems 2");
    }

    #[test]
    fn test_synthetic_peer_symbols_are_unique() {
        let data = reference_company();
        let peers = SyntheticPeers::seeded(3).generate(&data, 25).unwrap();
        let symbols: HashSet<&str> = peers.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols.len(), 25);
        assert_eq!(peers[0].symbol, "ALDE");
        assert_eq!(peers[10].symbol, "ALDE2");
        assert_eq!(peers[24].symbol, "EAST3");
    }

    #[test]
    fn test_everything_filtered_is_empty_dataset() {
        let data = reference_company();
        let model = CompsModel::new(CompsConfig {
            ev_ebitda_bounds: MultipleBounds::new(100.0, 200.0),
            ..Default::default()
        });
        assert!(matches!(
            model.value_against(&data, vec![peer("AAA", 10.0)]),
            Err(RondaError::EmptyDataset(_))
        ));
    }
}
