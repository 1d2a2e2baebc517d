//! Full sensitivity and scenario report around a base DCF.

use ronda_models::intrinsic::{DcfConfig, DcfModel, DcfResult, DcfSensitivity};
use ronda_traits::{CompanyData, Result, ValuationModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scenario::{ScenarioAnalysis, ScenarioConfig, run_scenarios};
use crate::sensitivity::{
    BreakEven, OneWaySensitivity, SensitivityRanges, SensitivityVariable, TornadoBar, break_even,
    one_way, tornado, two_way,
};

/// Configuration for the sensitivity analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Base DCF assumptions.
    pub dcf: DcfConfig,
    /// Values swept per variable.
    pub ranges: SensitivityRanges,
    /// Scenario bundles and probabilities.
    pub scenarios: ScenarioConfig,
}

/// Everything the analyzer produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    /// Base-case valuation.
    pub base: DcfResult,
    /// One sweep per variable.
    pub one_way: Vec<OneWaySensitivity>,
    /// WACC by terminal growth matrix.
    pub two_way: DcfSensitivity,
    /// Best, base and worst cases.
    pub scenarios: ScenarioAnalysis,
    /// Range value nearest the market price, per variable.
    pub break_evens: Vec<BreakEven>,
    /// Variables ranked by price swing.
    pub tornado: Vec<TornadoBar>,
}

/// Sensitivity and scenario analysis over DCF.
///
/// # Example
///
/// ```
/// use ronda_eval::SensitivityAnalyzer;
/// use ronda_traits::{ValuationModel, sample::reference_company};
///
/// let report = SensitivityAnalyzer::default()
///     .analyze(&reference_company())
///     .unwrap();
/// assert_eq!(report.two_way.prices.len(), 5);
/// assert_eq!(report.scenarios.outcomes.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SensitivityAnalyzer {
    config: SensitivityConfig,
}

impl SensitivityAnalyzer {
    /// Create a new analyzer with the given configuration.
    #[must_use]
    pub const fn new(config: SensitivityConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SensitivityConfig {
        &self.config
    }

    /// Base DCF model built from the configuration.
    #[must_use]
    pub fn base_model(&self) -> DcfModel {
        DcfModel::new(self.config.dcf.clone())
    }

    /// Sweep every variable over its configured range.
    pub fn one_way_all(&self, data: &CompanyData) -> Result<Vec<OneWaySensitivity>> {
        let model = self.base_model();
        SensitivityVariable::ALL
            .iter()
            .map(|&variable| one_way(&model, data, variable, self.config.ranges.values(variable)))
            .collect()
    }
}

impl ValuationModel for SensitivityAnalyzer {
    type Output = SensitivityReport;

    fn name(&self) -> &str {
        "sensitivity"
    }

    fn analyze(&self, data: &CompanyData) -> Result<SensitivityReport> {
        let model = self.base_model();
        let base = model.analyze(data)?;
        let ranges = &self.config.ranges;

        let one_way = self.one_way_all(data)?;
        let two_way = two_way(&model, data, &ranges.wacc, &ranges.terminal_growth)?;
        let scenarios = run_scenarios(&model, data, &self.config.scenarios)?;
        let break_evens = one_way
            .iter()
            .map(|sweep| break_even(sweep, data.current_price()))
            .collect();
        let tornado = tornado(&one_way, base.implied_share_price);

        debug!(
            symbol = data.symbol(),
            base_price = base.implied_share_price,
            expected_price = scenarios.expected_price,
            top_driver = ?tornado.first().map(|bar| bar.variable),
            "sensitivity analysis complete"
        );

        Ok(SensitivityReport {
            base,
            one_way,
            two_way,
            scenarios,
            break_evens,
            tornado,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_traits::sample::reference_company;

    #[test]
    fn test_report_is_complete() {
        let data = reference_company();
        let report = SensitivityAnalyzer::default().analyze(&data).unwrap();
        assert_eq!(report.one_way.len(), 5);
        assert_eq!(report.break_evens.len(), 5);
        assert_eq!(report.tornado.len(), 5);
        assert!(report.break_evens.iter().all(|b| b.value.is_some()));
    }

    #[test]
    fn test_repeated_runs_agree() {
        let data = reference_company();
        let analyzer = SensitivityAnalyzer::default();
        let first = analyzer.analyze(&data).unwrap();
        let second = analyzer.analyze(&data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_base_follows_config() {
        let data = reference_company();
        let analyzer = SensitivityAnalyzer::new(SensitivityConfig {
            dcf: DcfConfig {
                wacc: Some(0.11),
                ..Default::default()
            },
            ..Default::default()
        });
        let report = analyzer.analyze(&data).unwrap();
        assert_eq!(report.base.wacc, 0.11);
        let wacc_sweep = &report.one_way[0];
        assert_eq!(wacc_sweep.variable, SensitivityVariable::Wacc);
        assert_eq!(wacc_sweep.base_value, 0.11);
    }
}
