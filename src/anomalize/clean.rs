//! Cleaning policies for flagged anomalies.

use std::str::FromStr;

use crate::error::{AnomalyError, Result};

/// How flagged anomalies are replaced in the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMethod {
    /// Mask anomalies to missing and interpolate linearly across the gaps.
    Linear,
    /// Pull each anomaly to a fraction of the recomposed bound on its side.
    MinMax,
}

impl FromStr for CleanMethod {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(CleanMethod::Linear),
            "min_max" => Ok(CleanMethod::MinMax),
            other => Err(AnomalyError::Configuration(format!(
                "unknown clean method: {other:?} (expected \"linear\" or \"min_max\")"
            ))),
        }
    }
}

/// Produce a cleaned copy of the observed series.
///
/// Points with direction 0 are returned untouched under both policies.
pub fn clean_series(
    observed: &[f64],
    directions: &[i64],
    recomposed_l1: &[f64],
    recomposed_l2: &[f64],
    method: CleanMethod,
    clean_alpha: f64,
) -> Vec<f64> {
    match method {
        CleanMethod::Linear => {
            let masked: Vec<f64> = observed
                .iter()
                .zip(directions.iter())
                .map(|(&x, &d)| if d == 0 { x } else { f64::NAN })
                .collect();
            interpolate_masked(&masked)
        }
        CleanMethod::MinMax => observed
            .iter()
            .enumerate()
            .map(|(i, &x)| match directions[i] {
                -1 => clean_alpha * recomposed_l1[i],
                1 => clean_alpha * recomposed_l2[i],
                _ => x,
            })
            .collect(),
    }
}

/// Linear interpolation across NaN runs. Leading and trailing runs take the
/// nearest valid value; a series with no valid values comes back unchanged.
fn interpolate_masked(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut result = values.to_vec();

    let mut i = 0;
    while i < n {
        if !result[i].is_nan() {
            i += 1;
            continue;
        }

        let start = i;
        while i < n && result[i].is_nan() {
            i += 1;
        }
        let end = i;

        let left = if start > 0 { Some(result[start - 1]) } else { None };
        let right = if end < n { Some(result[end]) } else { None };

        match (left, right) {
            (Some(l), Some(r)) => {
                // end - start points across a gap of end - start + 1 segments.
                let segments = (end - start + 1) as f64;
                for (j, idx) in (start..end).enumerate() {
                    let t = (j + 1) as f64 / segments;
                    result[idx] = l + t * (r - l);
                }
            }
            (Some(l), None) => result[start..end].fill(l),
            (None, Some(r)) => result[start..end].fill(r),
            (None, None) => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NO_BOUNDS: [f64; 5] = [0.0; 5];

    #[test]
    fn linear_interpolates_an_interior_gap() {
        let observed = [1.0, 2.0, 100.0, 4.0, 5.0];
        let directions = [0, 0, 1, 0, 0];
        let cleaned = clean_series(
            &observed,
            &directions,
            &NO_BOUNDS,
            &NO_BOUNDS,
            CleanMethod::Linear,
            0.75,
        );
        assert_relative_eq!(cleaned[2], 3.0, epsilon = 1e-12);
        assert_eq!(cleaned[0], 1.0);
        assert_eq!(cleaned[4], 5.0);
    }

    #[test]
    fn linear_spreads_across_a_wide_gap() {
        let observed = [10.0, 90.0, 95.0, 90.0, 20.0];
        let directions = [0, 1, 1, 1, 0];
        let cleaned = clean_series(
            &observed,
            &directions,
            &NO_BOUNDS,
            &NO_BOUNDS,
            CleanMethod::Linear,
            0.75,
        );
        assert_relative_eq!(cleaned[1], 12.5, epsilon = 1e-12);
        assert_relative_eq!(cleaned[2], 15.0, epsilon = 1e-12);
        assert_relative_eq!(cleaned[3], 17.5, epsilon = 1e-12);
    }

    #[test]
    fn linear_fills_leading_and_trailing_runs() {
        let observed = [50.0, 60.0, 3.0, 4.0, 80.0];
        let directions = [1, 1, 0, 0, -1];
        let cleaned = clean_series(
            &observed,
            &directions,
            &NO_BOUNDS,
            &NO_BOUNDS,
            CleanMethod::Linear,
            0.75,
        );
        assert_eq!(cleaned, vec![3.0, 3.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn linear_with_no_valid_points_returns_nan() {
        let observed = [1.0, 2.0];
        let directions = [1, 1];
        let cleaned = clean_series(
            &observed,
            &directions,
            &[0.0; 2],
            &[0.0; 2],
            CleanMethod::Linear,
            0.75,
        );
        assert!(cleaned.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn min_max_pulls_toward_the_violated_bound() {
        let observed = [1.0, -40.0, 3.0, 60.0, 5.0];
        let directions = [0, -1, 0, 1, 0];
        let l1 = [-10.0; 5];
        let l2 = [20.0; 5];
        let cleaned = clean_series(&observed, &directions, &l1, &l2, CleanMethod::MinMax, 0.75);

        assert_relative_eq!(cleaned[1], 0.75 * -10.0, epsilon = 1e-12);
        assert_relative_eq!(cleaned[3], 0.75 * 20.0, epsilon = 1e-12);
        assert_eq!(cleaned[0], 1.0);
        assert_eq!(cleaned[2], 3.0);
        assert_eq!(cleaned[4], 5.0);
    }

    #[test]
    fn min_max_with_zero_alpha_zeroes_anomalies() {
        let observed = [1.0, -40.0, 3.0, 60.0, 5.0];
        let directions = [0, -1, 0, 1, 0];
        let l1 = [-10.0; 5];
        let l2 = [20.0; 5];
        let cleaned = clean_series(&observed, &directions, &l1, &l2, CleanMethod::MinMax, 0.0);

        assert_eq!(cleaned[1], 0.0);
        assert_eq!(cleaned[3], 0.0);
        assert_eq!(cleaned[0], 1.0);
    }

    #[test]
    fn unflagged_points_are_untouched_by_both_policies() {
        let observed = [4.0, 8.0, 15.0, 16.0, 23.0];
        let directions = [0, 0, 0, 0, 0];
        for method in [CleanMethod::Linear, CleanMethod::MinMax] {
            let cleaned = clean_series(
                &observed,
                &directions,
                &NO_BOUNDS,
                &NO_BOUNDS,
                method,
                0.75,
            );
            assert_eq!(cleaned, observed.to_vec());
        }
    }

    #[test]
    fn clean_tags_parse() {
        assert_eq!("linear".parse::<CleanMethod>().unwrap(), CleanMethod::Linear);
        assert_eq!("min_max".parse::<CleanMethod>().unwrap(), CleanMethod::MinMax);
        assert!(matches!(
            "spline".parse::<CleanMethod>(),
            Err(AnomalyError::Configuration(_))
        ));
    }
}
