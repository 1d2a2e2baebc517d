//! Investment committee memo.

use derive_more::Display;
use ronda_models::{
    intrinsic::{DcfConfig, DcfModel},
    relative::{CompsConfig, CompsModel, PrecedentsConfig, PrecedentsModel},
};
use ronda_traits::{
    CompanyData, ImpliedValuation, Result, RondaError, ValuationModel, stats::cagr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Valuation method blended into the memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoMethod {
    /// Discounted cash flow.
    #[display("DCF")]
    Dcf,
    /// Comparable companies.
    #[display("Trading comps")]
    Comps,
    /// Precedent transactions.
    #[display("Precedent transactions")]
    Precedents,
}

/// Investment recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    /// Upside above the buy threshold.
    #[display("BUY")]
    Buy,
    /// Between the thresholds, or no market price.
    #[display("HOLD")]
    Hold,
    /// Upside below the sell threshold.
    #[display("SELL")]
    Sell,
}

/// Confidence in the recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conviction {
    /// Methods agree and the move is large.
    High,
    /// Neither high nor low.
    Medium,
    /// Methods disagree or only one is usable.
    Low,
}

/// Configuration for the IC memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoConfig {
    /// DCF assumptions.
    pub dcf: DcfConfig,

    /// Comparable companies assumptions.
    pub comps: CompsConfig,

    /// Precedent transactions assumptions.
    pub precedents: PrecedentsConfig,

    /// DCF weight (default: 40%)
    pub dcf_weight: f64,

    /// Comps weight (default: 35%)
    pub comps_weight: f64,

    /// Precedents weight (default: 25%)
    pub precedents_weight: f64,

    /// Half-width of the price range around the weighted price (default: 10%)
    pub range_width: f64,

    /// Upside above which the memo recommends buying (default: 15%)
    pub buy_threshold: f64,

    /// Upside below which the memo recommends selling (default: -10%)
    pub sell_threshold: f64,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            dcf: DcfConfig::default(),
            comps: CompsConfig::default(),
            precedents: PrecedentsConfig::default(),
            dcf_weight: 0.40,
            comps_weight: 0.35,
            precedents_weight: 0.25,
            range_width: 0.10,
            buy_threshold: 0.15,
            sell_threshold: -0.10,
        }
    }
}

/// Contribution of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodValuation {
    /// Method.
    pub method: MemoMethod,
    /// Configured weight.
    pub weight: f64,
    /// Weight after excluded methods are dropped and the rest renormalized.
    pub effective_weight: f64,
    /// Implied price, when the method produced a usable one.
    pub implied_share_price: Option<f64>,
    /// Why the method was excluded.
    pub excluded_reason: Option<String>,
}

impl MethodValuation {
    /// Whether the method contributes to the weighted price.
    #[must_use]
    pub const fn is_included(&self) -> bool {
        self.implied_share_price.is_some()
    }
}

/// Investment committee memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcMemo {
    /// Ticker.
    pub symbol: String,
    /// Company name.
    pub company_name: String,
    /// Current share price.
    pub current_price: f64,
    /// Per-method contributions.
    pub methods: Vec<MethodValuation>,
    /// Whether any method was excluded.
    pub weights_renormalized: bool,
    /// Weighted implied price.
    pub weighted_price: f64,
    /// Bottom of the value range.
    pub price_low: f64,
    /// Top of the value range.
    pub price_high: f64,
    /// Upside of the weighted price.
    pub upside: Option<f64>,
    /// Spread of included prices over the weighted price.
    pub dispersion: f64,
    /// Recommendation.
    pub recommendation: Recommendation,
    /// Confidence.
    pub conviction: Conviction,
    /// Investment thesis points.
    pub thesis: Vec<String>,
    /// Key risks.
    pub risks: Vec<String>,
}

/// Per-method facts gathered while running the underlying models.
#[derive(Debug, Default)]
struct Evidence {
    terminal_value_share: Option<f64>,
    synthetic_peers: bool,
}

/// Blends DCF, comps and precedents into a recommendation.
///
/// # Example
///
/// ```
/// use ronda_combine::{MemoConfig, MemoModel};
/// use ronda_models::relative::{CompsConfig, PrecedentsConfig};
/// use ronda_traits::{ValuationModel, sample::reference_company};
///
/// let model = MemoModel::new(MemoConfig {
///     comps: CompsConfig { seed: Some(7), ..Default::default() },
///     precedents: PrecedentsConfig { seed: Some(7), ..Default::default() },
///     ..Default::default()
/// });
/// let memo = model.analyze(&reference_company()).unwrap();
/// assert_eq!(memo.methods.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoModel {
    config: MemoConfig,
}

impl MemoModel {
    /// Create a new memo model with the given configuration.
    #[must_use]
    pub const fn new(config: MemoConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MemoConfig {
        &self.config
    }

    fn run_methods(&self, data: &CompanyData) -> (Vec<MethodValuation>, Evidence) {
        let cfg = &self.config;
        let mut evidence = Evidence {
            synthetic_peers: cfg.comps.peers.is_none() || cfg.precedents.transactions.is_none(),
            ..Default::default()
        };

        let dcf = DcfModel::new(cfg.dcf.clone()).analyze(data);
        if let Ok(result) = &dcf {
            evidence.terminal_value_share = Some(result.terminal_value_share);
        }

        let runs = [
            (MemoMethod::Dcf, cfg.dcf_weight, price_of(dcf)),
            (
                MemoMethod::Comps,
                cfg.comps_weight,
                price_of(CompsModel::new(cfg.comps.clone()).analyze(data)),
            ),
            (
                MemoMethod::Precedents,
                cfg.precedents_weight,
                price_of(PrecedentsModel::new(cfg.precedents.clone()).analyze(data)),
            ),
        ];

        let methods = runs
            .into_iter()
            .map(|(method, weight, outcome)| match outcome {
                Ok(price) => MethodValuation {
                    method,
                    weight,
                    effective_weight: 0.0,
                    implied_share_price: Some(price),
                    excluded_reason: None,
                },
                Err(reason) => {
                    warn!(%method, %reason, "valuation method excluded from memo");
                    MethodValuation {
                        method,
                        weight,
                        effective_weight: 0.0,
                        implied_share_price: None,
                        excluded_reason: Some(reason),
                    }
                }
            })
            .collect();
        (methods, evidence)
    }

    const fn recommend(&self, upside: Option<f64>) -> Recommendation {
        match upside {
            Some(u) if u > self.config.buy_threshold => Recommendation::Buy,
            Some(u) if u < self.config.sell_threshold => Recommendation::Sell,
            _ => Recommendation::Hold,
        }
    }

    fn thesis(
        &self,
        data: &CompanyData,
        memo_methods: &[MethodValuation],
        weighted_price: f64,
        recommendation: Recommendation,
    ) -> Vec<String> {
        let current = data.current_price();
        let mut points: Vec<String> = memo_methods
            .iter()
            .filter_map(|m| {
                let price = m.implied_share_price?;
                Some(if current > 0.0 {
                    format!(
                        "{} implies ${price:.2} per share ({:+.1}% vs current)",
                        m.method,
                        (price - current) / current * 100.0
                    )
                } else {
                    format!("{} implies ${price:.2} per share", m.method)
                })
            })
            .collect();

        let history: Vec<f64> = data.income_statements.iter().map(|s| s.revenue).collect();
        if let (Some(&first), Some(&last)) = (history.first(), history.last())
            && history.len() >= 2
            && let Ok(growth) = cagr(first, last, history.len() - 1)
        {
            points.push(format!(
                "Revenue has compounded at {:.1}% a year over {} periods",
                growth * 100.0,
                history.len() - 1
            ));
        }
        if let Ok(margin) = data.latest_income().and_then(|s| s.ebitda_margin()) {
            points.push(format!("Latest EBITDA margin of {:.1}%", margin * 100.0));
        }
        points.push(format!(
            "Weighted value of ${weighted_price:.2} against ${current:.2} supports a {recommendation} rating"
        ));
        points
    }

    fn risks(
        data: &CompanyData,
        memo_methods: &[MethodValuation],
        evidence: &Evidence,
        dispersion: f64,
    ) -> Vec<String> {
        let mut risks = Vec::new();

        if let Some(share) = evidence.terminal_value_share
            && share > 0.75
        {
            risks.push(format!(
                "Terminal value is {:.0}% of DCF enterprise value; long-run assumptions dominate",
                share * 100.0
            ));
        }
        if dispersion > 0.30 {
            risks.push(format!(
                "Methods disagree by {:.0}% of the weighted value",
                dispersion * 100.0
            ));
        }
        if let (Ok(income), Ok(balance)) = (data.latest_income(), data.latest_balance())
            && income.ebitda > 0.0
            && balance.total_debt / income.ebitda > 3.0
        {
            risks.push(format!(
                "Leverage of {:.1}x EBITDA limits financial flexibility",
                balance.total_debt / income.ebitda
            ));
        }
        for m in memo_methods {
            if let Some(reason) = &m.excluded_reason {
                risks.push(format!("{} excluded: {reason}", m.method));
            }
        }
        if evidence.synthetic_peers {
            risks.push("Relative value rests on synthetic peer and transaction sets".to_string());
        }
        if risks.is_empty() {
            risks.push("Execution against the projected growth schedule".to_string());
        }
        risks
    }
}

/// Usable implied price of a model run, or why there is none.
fn price_of<T: ImpliedValuation>(outcome: Result<T>) -> std::result::Result<f64, String> {
    match outcome {
        Ok(result) if result.is_finite() => Ok(result.implied_share_price()),
        Ok(_) => Err("non-finite implied price".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn conviction(included: usize, dispersion: f64, upside: Option<f64>) -> Conviction {
    if included < 2 || dispersion > 0.50 {
        Conviction::Low
    } else if dispersion < 0.30 && upside.is_some_and(|u| u.abs() > 0.25) {
        Conviction::High
    } else {
        Conviction::Medium
    }
}

impl ValuationModel for MemoModel {
    type Output = IcMemo;

    fn name(&self) -> &str {
        "memo"
    }

    fn analyze(&self, data: &CompanyData) -> Result<IcMemo> {
        let (mut methods, evidence) = self.run_methods(data);

        let total_weight: f64 = methods
            .iter()
            .filter(|m| m.is_included())
            .map(|m| m.weight)
            .sum();
        if total_weight <= 0.0 {
            return Err(RondaError::EmptyDataset(format!(
                "{}: no valuation method produced a usable price",
                data.symbol()
            )));
        }

        let mut weighted_price = 0.0;
        for m in &mut methods {
            if let Some(price) = m.implied_share_price {
                m.effective_weight = m.weight / total_weight;
                weighted_price += m.effective_weight * price;
            }
        }

        let prices: Vec<f64> = methods.iter().filter_map(|m| m.implied_share_price).collect();
        let (low, high) = prices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let dispersion = if weighted_price.abs() > 0.0 {
            (high - low) / weighted_price.abs()
        } else {
            0.0
        };

        let current_price = data.current_price();
        let upside = (current_price > 0.0).then(|| (weighted_price - current_price) / current_price);
        let recommendation = self.recommend(upside);
        let conviction = conviction(prices.len(), dispersion, upside);
        let weights_renormalized = methods.iter().any(|m| !m.is_included());

        debug!(
            symbol = data.symbol(),
            weighted_price,
            %recommendation,
            %conviction,
            "IC memo complete"
        );

        Ok(IcMemo {
            symbol: data.symbol().to_string(),
            company_name: data.profile.name.clone(),
            current_price,
            thesis: self.thesis(data, &methods, weighted_price, recommendation),
            risks: Self::risks(data, &methods, &evidence, dispersion),
            weights_renormalized,
            weighted_price,
            price_low: weighted_price * (1.0 - self.config.range_width),
            price_high: weighted_price * (1.0 + self.config.range_width),
            upside,
            dispersion,
            recommendation,
            conviction,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    fn seeded() -> MemoConfig {
        MemoConfig {
            comps: CompsConfig {
                seed: Some(1),
                ..Default::default()
            },
            precedents: PrecedentsConfig {
                seed: Some(1),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_weights() {
        let config = MemoConfig::default();
        assert_relative_eq!(
            config.dcf_weight + config.comps_weight + config.precedents_weight,
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_weighted_price() {
        let memo = MemoModel::new(seeded()).analyze(&reference_company()).unwrap();
        assert!(!memo.weights_renormalized);
        let expected: f64 = memo
            .methods
            .iter()
            .map(|m| m.weight * m.implied_share_price.unwrap())
            .sum();
        assert_relative_eq!(memo.weighted_price, expected, max_relative = 1e-12);
        assert_relative_eq!(memo.price_low, memo.weighted_price * 0.9, max_relative = 1e-12);
        assert_relative_eq!(memo.price_high, memo.weighted_price * 1.1, max_relative = 1e-12);
        assert!(!memo.thesis.is_empty());
        assert!(!memo.risks.is_empty());
    }

    #[test]
    fn test_failed_method_is_excluded_and_weights_renormalized() {
        let config = MemoConfig {
            dcf: DcfConfig {
                wacc: Some(0.02),
                ..Default::default()
            },
            ..seeded()
        };
        let memo = MemoModel::new(config).analyze(&reference_company()).unwrap();
        assert!(memo.weights_renormalized);

        let dcf = &memo.methods[0];
        assert!(!dcf.is_included());
        assert!(dcf.excluded_reason.is_some());
        assert_relative_eq!(dcf.effective_weight, 0.0);

        let total: f64 = memo.methods.iter().map(|m| m.effective_weight).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        assert_relative_eq!(memo.methods[1].effective_weight, 0.35 / 0.60, epsilon = 1e-12);
        assert!(memo.risks.iter().any(|r| r.starts_with("DCF excluded")));
    }

    #[test]
    fn test_recommendation_thresholds() {
        let model = MemoModel::default();
        assert_eq!(model.recommend(Some(0.16)), Recommendation::Buy);
        assert_eq!(model.recommend(Some(0.15)), Recommendation::Hold);
        assert_eq!(model.recommend(Some(-0.05)), Recommendation::Hold);
        assert_eq!(model.recommend(Some(-0.11)), Recommendation::Sell);
        assert_eq!(model.recommend(None), Recommendation::Hold);
    }

    #[test]
    fn test_conviction() {
        assert_eq!(conviction(1, 0.0, Some(0.5)), Conviction::Low);
        assert_eq!(conviction(3, 0.6, Some(0.5)), Conviction::Low);
        assert_eq!(conviction(3, 0.1, Some(0.3)), Conviction::High);
        assert_eq!(conviction(3, 0.1, Some(0.1)), Conviction::Medium);
    }

    #[test]
    fn test_no_usable_method() {
        let mut data = reference_company();
        data.income_statements.clear();
        assert!(matches!(
            MemoModel::new(seeded()).analyze(&data),
            Err(RondaError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_no_market_price_holds() {
        let mut data = reference_company();
        data.price.current = 0.0;
        let memo = MemoModel::new(seeded()).analyze(&data).unwrap();
        assert!(memo.upside.is_none());
        assert_eq!(memo.recommendation, Recommendation::Hold);
    }
}
