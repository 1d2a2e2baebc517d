//! One-way and two-way DCF sensitivity, break-even search and tornado ranking.
//!
//! Every cell runs a fresh [`DcfModel`] built from a copy of the base
//! configuration with one field overridden. The base model is never touched,
//! so a sweep can run against a shared model and leave later valuations
//! unchanged.

use derive_more::Display;
use ronda_models::intrinsic::{DcfConfig, DcfModel, DcfSensitivity};
use ronda_traits::{CompanyData, ImpliedValuation, Result, ValuationModel};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A DCF assumption that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    /// Discount rate.
    #[display("WACC")]
    Wacc,
    /// Perpetual growth rate.
    #[display("Terminal growth")]
    TerminalGrowth,
    /// Flat revenue growth over the horizon.
    #[display("Revenue growth")]
    RevenueGrowth,
    /// EBITDA margin.
    #[display("EBITDA margin")]
    EbitdaMargin,
    /// Cash tax rate.
    #[display("Tax rate")]
    TaxRate,
}

impl SensitivityVariable {
    /// Every sweepable variable.
    pub const ALL: [Self; 5] = [
        Self::Wacc,
        Self::TerminalGrowth,
        Self::RevenueGrowth,
        Self::EbitdaMargin,
        Self::TaxRate,
    ];

    /// Copy of `config` with this variable set to `value`.
    #[must_use]
    pub fn apply(&self, config: &DcfConfig, value: f64) -> DcfConfig {
        let mut config = config.clone();
        match self {
            Self::Wacc => config.wacc = Some(value),
            Self::TerminalGrowth => config.terminal_growth = value,
            Self::RevenueGrowth => config.revenue_growth = vec![value; config.projection_years],
            Self::EbitdaMargin => config.ebitda_margin = value,
            Self::TaxRate => config.tax_rate = value,
        }
        config
    }

    /// Value of this variable in the base case.
    ///
    /// Revenue growth reports the first-year rate.
    #[must_use]
    pub fn base_value(&self, model: &DcfModel, data: &CompanyData) -> f64 {
        let config = model.config();
        match self {
            Self::Wacc => model.resolve_wacc(data),
            Self::TerminalGrowth => config.terminal_growth,
            Self::RevenueGrowth => config.revenue_growth.first().copied().unwrap_or_default(),
            Self::EbitdaMargin => config.ebitda_margin,
            Self::TaxRate => config.tax_rate,
        }
    }
}

/// Values swept for each variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityRanges {
    /// Discount rates (default: 8% to 12%)
    pub wacc: Vec<f64>,

    /// Terminal growth rates (default: 1.5% to 3.5%)
    pub terminal_growth: Vec<f64>,

    /// Flat revenue growth rates (default: 4% to 16%)
    pub revenue_growth: Vec<f64>,

    /// EBITDA margins (default: 22% to 38%)
    pub ebitda_margin: Vec<f64>,

    /// Tax rates (default: 15% to 28%)
    pub tax_rate: Vec<f64>,
}

impl Default for SensitivityRanges {
    fn default() -> Self {
        Self {
            wacc: vec![0.08, 0.09, 0.10, 0.11, 0.12],
            terminal_growth: vec![0.015, 0.020, 0.025, 0.030, 0.035],
            revenue_growth: vec![0.04, 0.07, 0.10, 0.13, 0.16],
            ebitda_margin: vec![0.22, 0.26, 0.30, 0.34, 0.38],
            tax_rate: vec![0.15, 0.18, 0.21, 0.25, 0.28],
        }
    }
}

impl SensitivityRanges {
    /// Values swept for `variable`.
    #[must_use]
    pub fn values(&self, variable: SensitivityVariable) -> &[f64] {
        match variable {
            SensitivityVariable::Wacc => &self.wacc,
            SensitivityVariable::TerminalGrowth => &self.terminal_growth,
            SensitivityVariable::RevenueGrowth => &self.revenue_growth,
            SensitivityVariable::EbitdaMargin => &self.ebitda_margin,
            SensitivityVariable::TaxRate => &self.tax_rate,
        }
    }
}

/// Implied prices over one variable's range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneWaySensitivity {
    /// Variable swept.
    pub variable: SensitivityVariable,
    /// Base-case value of the variable.
    pub base_value: f64,
    /// Values swept.
    pub values: Vec<f64>,
    /// Implied price per value; `None` where the run is degenerate.
    pub prices: Vec<Option<f64>>,
}

/// Range value whose implied price lands closest to the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    /// Variable searched.
    pub variable: SensitivityVariable,
    /// Value in the range; `None` without a positive current price or any usable cell.
    pub value: Option<f64>,
    /// Implied price at that value.
    pub implied_price: Option<f64>,
    /// Absolute distance between that price and the current price.
    pub gap: Option<f64>,
}

/// One bar of a tornado chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoBar {
    /// Variable.
    pub variable: SensitivityVariable,
    /// Swept value giving the lowest price.
    pub low_value: f64,
    /// Swept value giving the highest price.
    pub high_value: f64,
    /// Lowest implied price over the sweep.
    pub low_price: f64,
    /// Highest implied price over the sweep.
    pub high_price: f64,
    /// `high_price - low_price`.
    pub swing: f64,
    /// `swing / |base_price|`, `None` when the base price is zero or not finite.
    pub impact: Option<f64>,
}

/// Implied price of a DCF run, or `None` for degenerate inputs.
///
/// Non-degenerate errors still propagate.
fn price_or_skip(
    config: DcfConfig,
    data: &CompanyData,
    label: &str,
) -> Result<Option<f64>> {
    match DcfModel::new(config).analyze(data) {
        Ok(result) if result.is_finite() => Ok(Some(result.implied_share_price)),
        Ok(_) => {
            warn!(cell = label, "non-finite implied price, cell skipped");
            Ok(None)
        }
        Err(e) if e.is_degenerate() => {
            warn!(cell = label, error = %e, "degenerate sensitivity cell skipped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Run `variable` over `values` against `model`'s configuration.
pub fn one_way(
    model: &DcfModel,
    data: &CompanyData,
    variable: SensitivityVariable,
    values: &[f64],
) -> Result<OneWaySensitivity> {
    let prices = values
        .iter()
        .map(|&value| {
            let label = format!("{variable}={value}");
            price_or_skip(variable.apply(model.config(), value), data, &label)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OneWaySensitivity {
        variable,
        base_value: variable.base_value(model, data),
        values: values.to_vec(),
        prices,
    })
}

/// WACC by terminal growth price matrix.
pub fn two_way(
    model: &DcfModel,
    data: &CompanyData,
    waccs: &[f64],
    terminal_growths: &[f64],
) -> Result<DcfSensitivity> {
    model.sensitivity_analysis(data, waccs, terminal_growths)
}

/// Value in a one-way sweep whose price is nearest `current_price`.
#[must_use]
pub fn break_even(sweep: &OneWaySensitivity, current_price: f64) -> BreakEven {
    let nearest = (current_price > 0.0)
        .then(|| {
            sweep
                .values
                .iter()
                .zip(&sweep.prices)
                .filter_map(|(&value, price)| price.map(|p| (value, p, (p - current_price).abs())))
                .min_by(|a, b| a.2.total_cmp(&b.2))
        })
        .flatten();

    BreakEven {
        variable: sweep.variable,
        value: nearest.map(|(v, _, _)| v),
        implied_price: nearest.map(|(_, p, _)| p),
        gap: nearest.map(|(_, _, g)| g),
    }
}

/// Base prices closer to zero than this give no relative impact.
const MIN_BASE_PRICE: f64 = 1e-9;

/// Rank variables by the price swing across their sweeps, largest first.
///
/// Sweeps with fewer than two priced points are left out.
#[must_use]
pub fn tornado(sweeps: &[OneWaySensitivity], base_price: f64) -> Vec<TornadoBar> {
    let scale = (base_price.is_finite() && base_price.abs() > MIN_BASE_PRICE)
        .then(|| base_price.abs());
    if scale.is_none() {
        warn!(base_price, "base price is zero or not finite, tornado ranked by raw swing");
    }

    let mut bars: Vec<TornadoBar> = sweeps
        .iter()
        .filter_map(|sweep| {
            let priced: Vec<(f64, f64)> = sweep
                .values
                .iter()
                .zip(&sweep.prices)
                .filter_map(|(&value, price)| price.map(|p| (value, p)))
                .collect();
            if priced.len() < 2 {
                warn!(variable = %sweep.variable, "fewer than two priced points, bar skipped");
                return None;
            }
            let &(low_value, low_price) = priced.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
            let &(high_value, high_price) = priced.iter().max_by(|a, b| a.1.total_cmp(&b.1))?;
            let swing = high_price - low_price;
            Some(TornadoBar {
                variable: sweep.variable,
                low_value,
                high_value,
                low_price,
                high_price,
                swing,
                impact: scale.map(|base| swing / base),
            })
        })
        .collect();
    bars.sort_by(|a, b| b.swing.total_cmp(&a.swing));
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::sample::reference_company;

    #[test]
    fn test_apply_overrides_one_field() {
        let base = DcfConfig::default();
        let growth = SensitivityVariable::RevenueGrowth.apply(&base, 0.10);
        assert_eq!(growth.revenue_growth, vec![0.10; 5]);
        assert_eq!(growth.terminal_growth, base.terminal_growth);

        let wacc = SensitivityVariable::Wacc.apply(&base, 0.09);
        assert_eq!(wacc.wacc, Some(0.09));
        assert!(base.wacc.is_none());
    }

    #[test]
    fn test_one_way_wacc_is_decreasing() {
        let data = reference_company();
        let model = DcfModel::default();
        let ranges = SensitivityRanges::default();
        let sweep = one_way(&model, &data, SensitivityVariable::Wacc, &ranges.wacc).unwrap();
        let prices: Vec<f64> = sweep.prices.iter().map(|p| p.unwrap()).collect();
        for pair in prices.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        assert_relative_eq!(sweep.base_value, 0.09355, epsilon = 1e-12);
    }

    #[test]
    fn test_one_way_margin_is_increasing() {
        let data = reference_company();
        let model = DcfModel::default();
        let sweep = one_way(
            &model,
            &data,
            SensitivityVariable::EbitdaMargin,
            &SensitivityRanges::default().ebitda_margin,
        )
        .unwrap();
        let prices: Vec<f64> = sweep.prices.iter().map(|p| p.unwrap()).collect();
        assert!(prices.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn test_degenerate_cell_is_none() {
        let data = reference_company();
        let model = DcfModel::default();
        let sweep = one_way(&model, &data, SensitivityVariable::Wacc, &[0.02, 0.10]).unwrap();
        assert!(sweep.prices[0].is_none());
        assert!(sweep.prices[1].is_some());
    }

    #[test]
    fn test_sweep_leaves_model_unchanged() {
        let data = reference_company();
        let model = DcfModel::default();
        let before = model.analyze(&data).unwrap();
        for variable in SensitivityVariable::ALL {
            let ranges = SensitivityRanges::default();
            one_way(&model, &data, variable, ranges.values(variable)).unwrap();
        }
        assert_eq!(model.analyze(&data).unwrap(), before);
    }

    #[test]
    fn test_break_even_picks_nearest_price() {
        let sweep = OneWaySensitivity {
            variable: SensitivityVariable::Wacc,
            base_value: 0.10,
            values: vec![0.08, 0.10, 0.12],
            prices: vec![Some(40.0), Some(31.0), None],
        };
        let result = break_even(&sweep, 29.0);
        assert_eq!(result.value, Some(0.10));
        assert_relative_eq!(result.gap.unwrap(), 2.0);

        assert!(break_even(&sweep, 0.0).value.is_none());
    }

    #[test]
    fn test_break_even_against_brute_force() {
        let data = reference_company();
        let model = DcfModel::default();
        let sweep = one_way(
            &model,
            &data,
            SensitivityVariable::TerminalGrowth,
            &SensitivityRanges::default().terminal_growth,
        )
        .unwrap();
        let current = data.current_price();
        let result = break_even(&sweep, current);
        let best = sweep
            .prices
            .iter()
            .map(|p| (p.unwrap() - current).abs())
            .fold(f64::INFINITY, f64::min);
        assert_relative_eq!(result.gap.unwrap(), best);
    }

    #[test]
    fn test_tornado_is_sorted() {
        let data = reference_company();
        let model = DcfModel::default();
        let ranges = SensitivityRanges::default();
        let sweeps: Vec<_> = SensitivityVariable::ALL
            .iter()
            .map(|&v| one_way(&model, &data, v, ranges.values(v)).unwrap())
            .collect();
        let base = model.analyze(&data).unwrap().implied_share_price;
        let bars = tornado(&sweeps, base);

        assert_eq!(bars.len(), 5);
        assert!(bars.windows(2).all(|pair| pair[0].swing >= pair[1].swing));
        assert!(bars.windows(2).all(|pair| pair[0].impact >= pair[1].impact));
        let wacc = bars
            .iter()
            .find(|b| b.variable == SensitivityVariable::Wacc)
            .unwrap();
        // Price falls as WACC rises.
        assert_eq!(wacc.low_value, 0.12);
        assert_eq!(wacc.high_value, 0.08);
        assert_relative_eq!(
            wacc.impact.unwrap(),
            (wacc.high_price - wacc.low_price) / base,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_tornado_with_negative_base_price() {
        let mut data = reference_company();
        data.balance_sheets.last_mut().unwrap().total_debt = 1e12;
        let model = DcfModel::default();
        let base = model.analyze(&data).unwrap().implied_share_price;
        assert!(base < 0.0);

        let ranges = SensitivityRanges::default();
        let sweeps: Vec<_> = SensitivityVariable::ALL
            .iter()
            .map(|&v| one_way(&model, &data, v, ranges.values(v)).unwrap())
            .collect();
        let bars = tornado(&sweeps, base);

        assert!(!bars.is_empty());
        assert!(bars.iter().all(|b| b.swing >= 0.0 && b.impact.unwrap() >= 0.0));
        assert!(bars.windows(2).all(|pair| pair[0].swing >= pair[1].swing));
        assert!(bars.windows(2).all(|pair| pair[0].impact >= pair[1].impact));
    }

    #[test]
    fn test_tornado_with_zero_base_price() {
        let sweeps = [
            OneWaySensitivity {
                variable: SensitivityVariable::Wacc,
                base_value: 0.10,
                values: vec![0.08, 0.10, 0.12],
                prices: vec![Some(12.0), Some(0.0), Some(-8.0)],
            },
            OneWaySensitivity {
                variable: SensitivityVariable::TaxRate,
                base_value: 0.21,
                values: vec![0.15, 0.21, 0.30],
                prices: vec![Some(3.0), Some(0.0), Some(-4.0)],
            },
        ];
        let bars = tornado(&sweeps, 0.0);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].variable, SensitivityVariable::Wacc);
        assert_relative_eq!(bars[0].swing, 20.0);
        assert!(bars.iter().all(|b| b.impact.is_none()));
    }

    #[test]
    fn test_tornado_uses_price_extremes_over_the_sweep() {
        let sweep = OneWaySensitivity {
            variable: SensitivityVariable::EbitdaMargin,
            base_value: 0.30,
            values: vec![0.20, 0.30, 0.40],
            prices: vec![Some(20.0), Some(35.0), Some(25.0)],
        };
        let bars = tornado(&[sweep], 25.0);
        assert_eq!(bars[0].low_value, 0.20);
        assert_eq!(bars[0].high_value, 0.30);
        assert_relative_eq!(bars[0].swing, 15.0);
        assert_relative_eq!(bars[0].impact.unwrap(), 0.6);
    }

    #[test]
    fn test_tornado_needs_two_priced_points() {
        let sweep = OneWaySensitivity {
            variable: SensitivityVariable::Wacc,
            base_value: 0.10,
            values: vec![0.02, 0.12],
            prices: vec![None, Some(20.0)],
        };
        assert!(tornado(&[sweep], 25.0).is_empty());
    }

    #[test]
    fn test_two_way_shape() {
        let data = reference_company();
        let ranges = SensitivityRanges::default();
        let matrix = two_way(&DcfModel::default(), &data, &ranges.wacc, &ranges.terminal_growth)
            .unwrap();
        assert_eq!(matrix.prices.len(), 5);
        assert!(matrix.prices.iter().all(|row| row.len() == 5 && row.iter().all(Option::is_some)));
    }
}
