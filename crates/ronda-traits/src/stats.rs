//! Statistical helpers shared by the valuation models.
//!
//! Relative valuation (comparable companies, precedent transactions) reduces
//! a cross-section of multiples to a handful of order statistics. Those
//! statistics use a nearest-rank percentile: the result is always an
//! observed data point, never an interpolation between two of them.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::{Result, RondaError};

/// Denominators with an absolute value below this are treated as zero.
pub const MIN_DENOMINATOR: f64 = 1e-12;

/// Nearest-rank percentile of `values`.
///
/// Sorts ascending and returns `sorted[floor(p / 100 * (n - 1))]`.
///
/// # Errors
///
/// - [`RondaError::EmptyDataset`] when `values` is empty
/// - [`RondaError::InvalidData`] when `p` is outside `[0, 100]`
/// - [`RondaError::DegenerateInput`] when any value is non-finite
///
/// # Examples
///
/// ```
/// use ronda_traits::stats::percentile;
///
/// let values = [40.0, 10.0, 30.0, 20.0];
/// assert_eq!(percentile(&values, 25.0).unwrap(), 10.0);
/// assert_eq!(percentile(&values, 50.0).unwrap(), 20.0);
/// ```
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(RondaError::EmptyDataset(format!(
            "cannot take percentile {p} of an empty set"
        )));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(RondaError::InvalidData(format!(
            "percentile must be within [0, 100], got {p}"
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RondaError::DegenerateInput(
            "percentile input contains non-finite values".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let index = ((p / 100.0) * (sorted.len() - 1) as f64).floor() as usize;
    Ok(sorted[index])
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    ArrayView1::from(values)
        .mean()
        .ok_or_else(|| RondaError::EmptyDataset("cannot take mean of an empty set".to_string()))
}

/// Population variance (N denominator).
pub fn variance(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(RondaError::EmptyDataset(
            "cannot take variance of an empty set".to_string(),
        ));
    }
    Ok(ArrayView1::from(values).var(0.0))
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

/// Coefficient of variation: standard deviation over the absolute mean.
///
/// # Errors
///
/// [`RondaError::DegenerateInput`] when the mean is zero.
pub fn volatility(values: &[f64]) -> Result<f64> {
    let mu = mean(values)?;
    let sigma = std_dev(values)?;
    ratio(sigma, mu.abs(), "volatility")
}

/// Guarded division.
///
/// `what` names the ratio in the error message.
///
/// # Errors
///
/// [`RondaError::DegenerateInput`] when the denominator is (near) zero or the
/// result is not finite.
pub fn ratio(numerator: f64, denominator: f64, what: &str) -> Result<f64> {
    if denominator.abs() < MIN_DENOMINATOR {
        return Err(RondaError::DegenerateInput(format!(
            "{what}: denominator is zero"
        )));
    }
    let value = numerator / denominator;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RondaError::DegenerateInput(format!(
            "{what}: result is not finite ({numerator} / {denominator})"
        )))
    }
}

/// Compound annual growth rate between two positive values.
pub fn cagr(start: f64, end: f64, periods: usize) -> Result<f64> {
    if periods == 0 {
        return Err(RondaError::DegenerateInput(
            "CAGR needs at least one period".to_string(),
        ));
    }
    if start <= 0.0 || end <= 0.0 {
        return Err(RondaError::DegenerateInput(format!(
            "CAGR undefined for non-positive endpoints ({start} -> {end})"
        )));
    }
    Ok((end / start).powf(1.0 / periods as f64) - 1.0)
}

/// Keep the finite values lying strictly inside `(lower, upper)`.
#[must_use]
pub fn filter_in_range(values: &[f64], lower: f64, upper: f64) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > lower && *v < upper)
        .collect()
}

/// Summary statistics for one valuation multiple across a peer set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultipleStats {
    /// Number of observations after filtering.
    pub count: usize,
    /// 25th percentile.
    pub low: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// 75th percentile.
    pub high: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl MultipleStats {
    /// Compute quartiles and mean of `values`.
    ///
    /// # Errors
    ///
    /// [`RondaError::EmptyDataset`] when `values` is empty.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        Ok(Self {
            count: values.len(),
            low: percentile(values, 25.0)?,
            median: percentile(values, 50.0)?,
            high: percentile(values, 75.0)?,
            mean: mean(values)?,
        })
    }
}
