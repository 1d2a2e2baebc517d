//! Sensitivity and scenario analysis for ronda.
//!
//! This crate re-runs the DCF model under perturbed assumptions:
//! - One-way sweeps over WACC, terminal growth, revenue growth, margin and tax
//! - A WACC by terminal growth price matrix
//! - Best/base/worst scenarios with a probability-weighted price
//! - Break-even values against the market price and a tornado ranking
//!
//! Each perturbed run gets its own copy of the configuration, so sweeps never
//! alter the model they start from.
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_eval::{SensitivityAnalyzer, SensitivityVariable, one_way};
//! use ronda_models::intrinsic::DcfModel;
//!
//! let sweep = one_way(&DcfModel::default(), &data, SensitivityVariable::Wacc, &[0.08, 0.10, 0.12])?;
//! let report = SensitivityAnalyzer::default().analyze(&data)?;
//! ```

pub mod analyzer;
pub mod scenario;
pub mod sensitivity;

// Re-export main types
pub use analyzer::{SensitivityAnalyzer, SensitivityConfig, SensitivityReport};
pub use scenario::{
    ScenarioAnalysis, ScenarioAssumptions, ScenarioConfig, ScenarioKind, ScenarioOutcome,
    run_scenarios,
};
pub use sensitivity::{
    BreakEven, OneWaySensitivity, SensitivityRanges, SensitivityVariable, TornadoBar, break_even,
    one_way, tornado, two_way,
};
