//! Classical seasonal decomposition with a centered moving-average trend.

use std::str::FromStr;

use crate::error::{AnomalyError, Result};

/// Which decomposition variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionMethod {
    /// Median-based piecewise trend, resistant to outliers.
    Twitter,
    /// Classical moving-average decomposition.
    StandardDecompose,
}

impl FromStr for DecompositionMethod {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "twitter" => Ok(DecompositionMethod::Twitter),
            "standard-decompose" => Ok(DecompositionMethod::StandardDecompose),
            other => Err(AnomalyError::Configuration(format!(
                "unknown method: {other:?} (expected \"twitter\" or \"standard-decompose\")"
            ))),
        }
    }
}

/// How seasonal and trend components combine with the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionModel {
    /// Seasonal component estimated as mean-centered offsets.
    Additive,
    /// Seasonal component estimated as mean-normalized ratios.
    Multiplicative,
}

impl FromStr for DecompositionModel {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "additive" => Ok(DecompositionModel::Additive),
            "multiplicative" => Ok(DecompositionModel::Multiplicative),
            other => Err(AnomalyError::Configuration(format!(
                "unknown decomposition model: {other:?} (expected \"additive\" or \"multiplicative\")"
            ))),
        }
    }
}

/// Result of a seasonal decomposition, aligned row-for-row with the input.
///
/// The identity `observed == seasonal + trend + remainder` holds by
/// construction: `seasadj = observed - seasonal` and
/// `remainder = seasadj - trend` for both models.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Original values.
    pub observed: Vec<f64>,
    /// Periodic component.
    pub seasonal: Vec<f64>,
    /// Seasonally adjusted series: observed - seasonal.
    pub seasadj: Vec<f64>,
    /// Smoothed underlying level.
    pub trend: Vec<f64>,
    /// Residual after removing seasonal and trend.
    pub remainder: Vec<f64>,
}

impl Decomposition {
    pub(crate) fn from_components(observed: &[f64], seasonal: Vec<f64>, trend: Vec<f64>) -> Self {
        let seasadj: Vec<f64> = observed
            .iter()
            .zip(seasonal.iter())
            .map(|(x, s)| x - s)
            .collect();
        let remainder: Vec<f64> = seasadj.iter().zip(trend.iter()).map(|(a, t)| a - t).collect();

        Self {
            observed: observed.to_vec(),
            seasonal,
            seasadj,
            trend,
            remainder,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Whether the decomposition is empty.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}

/// Classical decomposition: centered moving-average trend (extrapolated to the
/// edges), period-averaged seasonal component, residual remainder.
pub fn decompose_standard(
    values: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition> {
    validate_series(values, period, model)?;

    let trend = extrapolate_edges(moving_average(values, period), period);
    let seasonal = seasonal_component(values, &trend, period, model)?;

    Ok(Decomposition::from_components(values, seasonal, trend))
}

/// Shared preconditions for both decomposition variants.
pub(crate) fn validate_series(
    values: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnomalyError::Validation(
            "series contains non-finite values".to_string(),
        ));
    }
    if period < 2 {
        return Err(AnomalyError::Configuration(format!(
            "period must be at least 2, got {period}"
        )));
    }
    if values.len() < 2 * period {
        return Err(AnomalyError::Configuration(format!(
            "period {} requires at least {} observations, series has {}",
            period,
            2 * period,
            values.len()
        )));
    }
    if model == DecompositionModel::Multiplicative && values.iter().any(|&v| v <= 0.0) {
        return Err(AnomalyError::Computation(
            "multiplicative decomposition requires strictly positive values".to_string(),
        ));
    }
    Ok(())
}

/// Centered moving average over one seasonal cycle.
///
/// Even periods use a window of `period + 1` points with half-weighted ends so
/// the window stays centered; odd periods use a plain `period` window. Edge
/// positions the window cannot reach are left as NaN for extrapolation.
pub(crate) fn moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    if period % 2 == 0 {
        for i in half..n - half {
            let mut sum = 0.5 * values[i - half] + 0.5 * values[i + half];
            for &v in &values[i - half + 1..i + half] {
                sum += v;
            }
            trend[i] = sum / period as f64;
        }
    } else {
        for i in half..n - half {
            let sum: f64 = values[i - half..=i + half].iter().sum();
            trend[i] = sum / period as f64;
        }
    }

    trend
}

/// Fill the NaN edges of a moving-average trend by extending least-squares
/// lines fitted over the nearest `period` valid points on each side.
pub(crate) fn extrapolate_edges(mut trend: Vec<f64>, period: usize) -> Vec<f64> {
    let n = trend.len();
    let front = trend.iter().position(|v| !v.is_nan());
    let back = trend.iter().rposition(|v| !v.is_nan());
    let (front, back) = match (front, back) {
        (Some(front), Some(back)) => (front, back),
        _ => return trend,
    };

    if front > 0 {
        let fit_end = (front + period).min(back);
        let (slope, intercept) = fit_line(&trend, front, fit_end);
        for (i, value) in trend[..front].iter_mut().enumerate() {
            *value = slope * i as f64 + intercept;
        }
    }

    if back + 1 < n {
        let fit_start = back.saturating_sub(period).max(front);
        let (slope, intercept) = fit_line(&trend, fit_start, back);
        for (i, value) in trend.iter_mut().enumerate().skip(back + 1) {
            *value = slope * i as f64 + intercept;
        }
    }

    trend
}

/// Ordinary least-squares line over `trend[start..end]` against the index.
fn fit_line(trend: &[f64], start: usize, end: usize) -> (f64, f64) {
    let m = end.saturating_sub(start);
    if m == 0 {
        return (0.0, 0.0);
    }
    if m == 1 {
        return (0.0, trend[start]);
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for (i, &y) in trend[start..end].iter().enumerate() {
        let x = (start + i) as f64;
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_xy += x * y;
    }

    let m = m as f64;
    let denominator = m * sum_xx - sum_x * sum_x;
    if denominator.abs() < 1e-12 {
        return (0.0, sum_y / m);
    }

    let slope = (m * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / m;
    (slope, intercept)
}

/// Seasonal component: per-position averages of the detrended series
/// (position = index mod period), mean-centered for the additive model or
/// mean-normalized for the multiplicative model, tiled over the series.
pub(crate) fn seasonal_component(
    values: &[f64],
    trend: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<Vec<f64>> {
    let n = values.len();
    let detrended: Vec<f64> = match model {
        DecompositionModel::Additive => {
            values.iter().zip(trend.iter()).map(|(x, t)| x - t).collect()
        }
        DecompositionModel::Multiplicative => {
            values.iter().zip(trend.iter()).map(|(x, t)| x / t).collect()
        }
    };

    let mut averages = vec![0.0; period];
    for (position, average) in averages.iter_mut().enumerate() {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut i = position;
        while i < n {
            sum += detrended[i];
            count += 1;
            i += period;
        }
        *average = sum / count as f64;
    }

    let grand_mean = averages.iter().sum::<f64>() / period as f64;
    match model {
        DecompositionModel::Additive => {
            for average in &mut averages {
                *average -= grand_mean;
            }
        }
        DecompositionModel::Multiplicative => {
            if !grand_mean.is_finite() || grand_mean.abs() < f64::EPSILON {
                return Err(AnomalyError::Computation(
                    "seasonal means are degenerate under the multiplicative model".to_string(),
                ));
            }
            for average in &mut averages {
                *average /= grand_mean;
            }
        }
    }

    Ok((0..n).map(|i| averages[i % period]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seasonal_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let trend = 10.0 + 0.5 * i as f64;
                let seasonal =
                    2.0 * ((2.0 * std::f64::consts::PI * i as f64 / period as f64).sin());
                trend + seasonal
            })
            .collect()
    }

    #[test]
    fn additive_identity_holds() {
        let series = seasonal_series(48, 12);
        let result = decompose_standard(&series, 12, DecompositionModel::Additive).unwrap();

        assert_eq!(result.len(), series.len());
        for i in 0..series.len() {
            let reconstructed = result.seasonal[i] + result.trend[i] + result.remainder[i];
            assert_relative_eq!(series[i], reconstructed, epsilon = 1e-10);
            assert_relative_eq!(result.seasadj[i], series[i] - result.seasonal[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn recovers_linear_trend_and_sinusoid_odd_period() {
        // A centered moving average over one full cycle removes a pure
        // sinusoid exactly and reproduces a linear trend exactly, so the
        // decomposition should recover both to near machine precision.
        let period = 7;
        let series = seasonal_series(35, period);
        let result = decompose_standard(&series, period, DecompositionModel::Additive).unwrap();

        for i in 0..series.len() {
            let expected_trend = 10.0 + 0.5 * i as f64;
            let expected_seasonal =
                2.0 * ((2.0 * std::f64::consts::PI * i as f64 / period as f64).sin());
            assert_relative_eq!(result.trend[i], expected_trend, epsilon = 1e-8);
            assert_relative_eq!(result.seasonal[i], expected_seasonal, epsilon = 1e-8);
            assert!(result.remainder[i].abs() < 1e-8);
        }
    }

    #[test]
    fn recovers_linear_trend_even_period() {
        let period = 12;
        let series = seasonal_series(48, period);
        let result = decompose_standard(&series, period, DecompositionModel::Additive).unwrap();

        // Half-weighted window stays centered, so the linear trend survives.
        for i in 0..series.len() {
            assert_relative_eq!(result.trend[i], 10.0 + 0.5 * i as f64, epsilon = 1e-8);
        }
    }

    #[test]
    fn seasonal_component_repeats_exactly() {
        let period = 6;
        let series = seasonal_series(36, period);
        let result = decompose_standard(&series, period, DecompositionModel::Additive).unwrap();

        for i in 0..series.len() - period {
            assert_eq!(result.seasonal[i], result.seasonal[i + period]);
        }
    }

    #[test]
    fn constant_series_has_flat_components() {
        let series = vec![5.0; 40];
        let result = decompose_standard(&series, 10, DecompositionModel::Additive).unwrap();

        for i in 0..series.len() {
            assert!(result.seasonal[i].abs() < 1e-10);
            assert_relative_eq!(result.trend[i], 5.0, epsilon = 1e-10);
            assert!(result.remainder[i].abs() < 1e-10);
        }
    }

    #[test]
    fn multiplicative_model_on_positive_series() {
        let pattern = [1.2, 0.8, 1.1, 0.9];
        let series: Vec<f64> = (0..40).map(|i| (20.0 + 0.2 * i as f64) * pattern[i % 4]).collect();
        let result = decompose_standard(&series, 4, DecompositionModel::Multiplicative).unwrap();

        // Ratio seasonal component oscillates around 1.
        let mean_seasonal: f64 = result.seasonal.iter().sum::<f64>() / result.seasonal.len() as f64;
        assert_relative_eq!(mean_seasonal, 1.0, epsilon = 0.05);

        // Recombination stays subtractive regardless of the model.
        for i in 0..series.len() {
            let reconstructed = result.seasonal[i] + result.trend[i] + result.remainder[i];
            assert_relative_eq!(series[i], reconstructed, epsilon = 1e-10);
        }
    }

    #[test]
    fn multiplicative_model_rejects_nonpositive_values() {
        let mut series = seasonal_series(24, 4);
        series[5] = 0.0;
        let err = decompose_standard(&series, 4, DecompositionModel::Multiplicative).unwrap_err();
        assert!(matches!(err, AnomalyError::Computation(_)));
    }

    #[test]
    fn short_series_is_rejected() {
        let series = vec![1.0; 10];
        assert!(matches!(
            decompose_standard(&series, 12, DecompositionModel::Additive),
            Err(AnomalyError::Configuration(_))
        ));
        // One observed cycle is not enough either.
        assert!(matches!(
            decompose_standard(&series, 6, DecompositionModel::Additive),
            Err(AnomalyError::Configuration(_))
        ));
    }

    #[test]
    fn tiny_period_is_rejected() {
        let series = vec![1.0; 10];
        assert!(matches!(
            decompose_standard(&series, 1, DecompositionModel::Additive),
            Err(AnomalyError::Configuration(_))
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut series = seasonal_series(24, 4);
        series[3] = f64::NAN;
        assert!(matches!(
            decompose_standard(&series, 4, DecompositionModel::Additive),
            Err(AnomalyError::Validation(_))
        ));
    }

    #[test]
    fn method_tags_parse() {
        assert_eq!(
            "twitter".parse::<DecompositionMethod>().unwrap(),
            DecompositionMethod::Twitter
        );
        assert_eq!(
            "standard-decompose".parse::<DecompositionMethod>().unwrap(),
            DecompositionMethod::StandardDecompose
        );
        assert!(matches!(
            "stl".parse::<DecompositionMethod>(),
            Err(AnomalyError::Configuration(_))
        ));
    }

    #[test]
    fn model_tags_parse() {
        assert_eq!(
            "additive".parse::<DecompositionModel>().unwrap(),
            DecompositionModel::Additive
        );
        assert_eq!(
            "multiplicative".parse::<DecompositionModel>().unwrap(),
            DecompositionModel::Multiplicative
        );
        assert!(matches!(
            "logarithmic".parse::<DecompositionModel>(),
            Err(AnomalyError::Configuration(_))
        ));
    }

    #[test]
    fn moving_average_leaves_unreachable_edges_nan() {
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let trend = moving_average(&series, 4);
        assert!(trend[0].is_nan());
        assert!(trend[1].is_nan());
        assert!(trend[8].is_nan());
        assert!(trend[9].is_nan());
        // Interior of a linear series is reproduced exactly.
        for (i, value) in trend.iter().enumerate().take(8).skip(2) {
            assert_relative_eq!(*value, i as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn extrapolation_extends_a_line() {
        let mut trend = vec![f64::NAN; 10];
        for (i, value) in trend.iter_mut().enumerate().take(8).skip(2) {
            *value = 3.0 + 2.0 * i as f64;
        }
        let filled = extrapolate_edges(trend, 4);
        for (i, value) in filled.iter().enumerate() {
            assert_relative_eq!(*value, 3.0 + 2.0 * i as f64, epsilon = 1e-9);
        }
    }
}
