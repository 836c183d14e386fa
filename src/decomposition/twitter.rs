//! Twitter-style robust decomposition with a median-based piecewise trend.

use super::classical::{
    extrapolate_edges, moving_average, seasonal_component, validate_series, Decomposition,
    DecompositionModel,
};
use crate::error::{AnomalyError, Result};
use crate::utils::median;

/// Robust decomposition: seasonal component extracted as in the classical
/// variant, trend replaced by per-subsequence medians of the seasonally
/// adjusted series.
///
/// Index `i` belongs to the interleaved subsequence `i % median_span`; every
/// point takes its subsequence's median as the trend value. Medians ignore a
/// minority of extreme points, so the trend stays put even when the
/// adjustment still carries the outliers detection is about to find.
pub fn decompose_twitter(
    values: &[f64],
    period: usize,
    median_span: usize,
    model: DecompositionModel,
) -> Result<Decomposition> {
    validate_series(values, period, model)?;
    if median_span == 0 {
        return Err(AnomalyError::Configuration(
            "median span must be positive".to_string(),
        ));
    }

    let ma_trend = extrapolate_edges(moving_average(values, period), period);
    let seasonal = seasonal_component(values, &ma_trend, period, model)?;

    let n = values.len();
    let seasadj: Vec<f64> = values
        .iter()
        .zip(seasonal.iter())
        .map(|(x, s)| x - s)
        .collect();

    let mut trend = vec![0.0; n];
    let mut subsequence = Vec::with_capacity(n / median_span + 1);
    for start in 0..median_span.min(n) {
        subsequence.clear();
        let mut i = start;
        while i < n {
            subsequence.push(seasadj[i]);
            i += median_span;
        }
        let level = median(&subsequence);
        let mut i = start;
        while i < n {
            trend[i] = level;
            i += median_span;
        }
    }

    Ok(Decomposition::from_components(values, seasonal, trend))
}
