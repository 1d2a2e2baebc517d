//! Best/base/worst DCF scenarios and a probability-weighted price.

use derive_more::Display;
use ronda_models::intrinsic::{DcfConfig, DcfModel};
use ronda_traits::{CompanyData, Result, RondaError, ValuationModel};
use serde::{Deserialize, Serialize};

/// Named scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Faster growth, lower discount rate, wider margin.
    Best,
    /// The base configuration unchanged.
    Base,
    /// Slower growth, higher discount rate, thinner margin.
    Worst,
}

/// Assumption bundle for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    /// Revenue growth schedule.
    pub revenue_growth: Vec<f64>,
    /// Discount rate.
    pub wacc: f64,
    /// Terminal growth rate.
    pub terminal_growth: f64,
    /// EBITDA margin.
    pub ebitda_margin: f64,
}

impl ScenarioAssumptions {
    /// Copy of `config` carrying these assumptions.
    #[must_use]
    pub fn apply(&self, config: &DcfConfig) -> DcfConfig {
        DcfConfig {
            revenue_growth: self.revenue_growth.clone(),
            wacc: Some(self.wacc),
            terminal_growth: self.terminal_growth,
            ebitda_margin: self.ebitda_margin,
            ..config.clone()
        }
    }
}

/// Scenario definitions and their probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Best-case growth schedule (default: 20% stepping down to 8%)
    pub best_growth: Vec<f64>,

    /// Best-case WACC shift from base (default: -1pt)
    pub best_wacc_shift: f64,

    /// Best-case terminal growth (default: 3%)
    pub best_terminal_growth: f64,

    /// Best-case EBITDA margin (default: 34%)
    pub best_ebitda_margin: f64,

    /// Worst-case growth schedule (default: 5% stepping down to 2%)
    pub worst_growth: Vec<f64>,

    /// Worst-case WACC shift from base (default: +1.5pt)
    pub worst_wacc_shift: f64,

    /// Worst-case terminal growth (default: 1.5%)
    pub worst_terminal_growth: f64,

    /// Worst-case EBITDA margin (default: 25%)
    pub worst_ebitda_margin: f64,

    /// Probabilities of best, base and worst (default: 25/50/25)
    pub probabilities: [f64; 3],
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            best_growth: vec![0.20, 0.17, 0.14, 0.11, 0.08],
            best_wacc_shift: -0.01,
            best_terminal_growth: 0.03,
            best_ebitda_margin: 0.34,
            worst_growth: vec![0.05, 0.04, 0.03, 0.02, 0.02],
            worst_wacc_shift: 0.015,
            worst_terminal_growth: 0.015,
            worst_ebitda_margin: 0.25,
            probabilities: [0.25, 0.50, 0.25],
        }
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario.
    pub kind: ScenarioKind,
    /// Probability weight.
    pub probability: f64,
    /// Assumptions used.
    pub assumptions: ScenarioAssumptions,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Implied price per share.
    pub implied_share_price: f64,
    /// Upside against the current price.
    pub upside: Option<f64>,
}

/// All scenarios and the probability-weighted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    /// Best, base and worst outcomes.
    pub outcomes: Vec<ScenarioOutcome>,
    /// Probability-weighted implied price.
    pub expected_price: f64,
    /// Upside of the expected price.
    pub expected_upside: Option<f64>,
}

impl ScenarioConfig {
    /// Assumption bundles for best, base and worst around `model`.
    #[must_use]
    pub fn bundles(&self, model: &DcfModel, data: &CompanyData) -> [(ScenarioKind, ScenarioAssumptions); 3] {
        let base = model.config();
        let wacc = model.resolve_wacc(data);
        [
            (
                ScenarioKind::Best,
                ScenarioAssumptions {
                    revenue_growth: self.best_growth.clone(),
                    wacc: wacc + self.best_wacc_shift,
                    terminal_growth: self.best_terminal_growth,
                    ebitda_margin: self.best_ebitda_margin,
                },
            ),
            (
                ScenarioKind::Base,
                ScenarioAssumptions {
                    revenue_growth: base.revenue_growth.clone(),
                    wacc,
                    terminal_growth: base.terminal_growth,
                    ebitda_margin: base.ebitda_margin,
                },
            ),
            (
                ScenarioKind::Worst,
                ScenarioAssumptions {
                    revenue_growth: self.worst_growth.clone(),
                    wacc: wacc + self.worst_wacc_shift,
                    terminal_growth: self.worst_terminal_growth,
                    ebitda_margin: self.worst_ebitda_margin,
                },
            ),
        ]
    }
}

/// Run best, base and worst cases around `model`.
///
/// # Errors
///
/// - [`RondaError::InvalidData`] when the probabilities do not sum to 1
/// - any error from a scenario's DCF run
pub fn run_scenarios(
    model: &DcfModel,
    data: &CompanyData,
    config: &ScenarioConfig,
) -> Result<ScenarioAnalysis> {
    let total: f64 = config.probabilities.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(RondaError::InvalidData(format!(
            "scenario probabilities must sum to 1, got {total:.4}"
        )));
    }

    let outcomes = config
        .bundles(model, data)
        .into_iter()
        .zip(config.probabilities)
        .map(|((kind, assumptions), probability)| {
            let result = DcfModel::new(assumptions.apply(model.config())).analyze(data)?;
            Ok(ScenarioOutcome {
                kind,
                probability,
                assumptions,
                enterprise_value: result.enterprise_value,
                implied_share_price: result.implied_share_price,
                upside: result.upside,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let expected_price: f64 = outcomes
        .iter()
        .map(|o| o.probability * o.implied_share_price)
        .sum();
    let current = data.current_price();
    let expected_upside = (current > 0.0).then(|| (expected_price - current) / current);

    Ok(ScenarioAnalysis {
        outcomes,
        expected_price,
        expected_upside,
    })
}
