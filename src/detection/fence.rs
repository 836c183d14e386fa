//! Interquartile-range fence classification for remainder series.

use crate::error::{AnomalyError, Result};
use crate::utils::quantile;

/// Configuration for the remainder fence.
#[derive(Debug, Clone)]
pub struct FenceConfig {
    /// Significance level controlling fence width; a smaller alpha widens the
    /// fence and flags fewer points.
    pub alpha: f64,
    /// Advisory bound on the tolerated share of flagged points. Reported to
    /// callers via [`RemainderAssessment::flagged_share`], never enforced.
    pub max_share: f64,
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_share: 0.2,
        }
    }
}

impl FenceConfig {
    /// Fence at the given significance level, keeping the default share bound.
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}

/// Robust interval computed once from a whole remainder distribution.
#[derive(Debug, Clone, Copy)]
pub struct IqrFence {
    /// Lower fence (`remainder_l1`).
    pub lower: f64,
    /// Upper fence (`remainder_l2`).
    pub upper: f64,
}

impl IqrFence {
    /// Midpoint of the fence; anomaly scores measure distance from here.
    pub fn centerline(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Per-point classification of a remainder series against its fence.
#[derive(Debug, Clone)]
pub struct RemainderAssessment {
    /// Whether each point falls outside the fence.
    pub flagged: Vec<bool>,
    /// Absolute distance of each point from the fence centerline.
    pub scores: Vec<f64>,
    /// Side violated per point: +1 above, -1 below, 0 within bounds.
    pub directions: Vec<i64>,
    /// The fence shared by all points of the series.
    pub fence: IqrFence,
}

impl RemainderAssessment {
    /// Number of classified points.
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    /// Whether the assessment is empty.
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    /// Number of flagged points.
    pub fn flagged_count(&self) -> usize {
        self.flagged.iter().filter(|&&f| f).count()
    }

    /// Share of flagged points in [0, 1].
    pub fn flagged_share(&self) -> f64 {
        if self.flagged.is_empty() {
            0.0
        } else {
            self.flagged_count() as f64 / self.flagged.len() as f64
        }
    }
}

/// Compute the fence for a remainder distribution.
///
/// `lower = -(Q1 + (0.15 / alpha) * IQR)` and
/// `upper = Q3 + (0.15 / alpha) * IQR`, quartiles by linear interpolation.
/// The lower fence negates the whole bracketed sum rather than offsetting
/// downward from Q1; downstream scores depend on this exact form.
pub fn iqr_fence(remainder: &[f64], alpha: f64) -> Result<IqrFence> {
    if remainder.is_empty() {
        return Err(AnomalyError::Validation(
            "cannot compute a fence over an empty series".to_string(),
        ));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AnomalyError::Configuration(format!(
            "iqr alpha must be in (0, 1), got {alpha}"
        )));
    }
    if remainder.iter().any(|v| !v.is_finite()) {
        return Err(AnomalyError::Computation(
            "remainder contains non-finite values".to_string(),
        ));
    }

    let q1 = quantile(remainder, 0.25);
    let q3 = quantile(remainder, 0.75);
    let iq_range = q3 - q1;
    let multiplier = 0.15 / alpha;

    Ok(IqrFence {
        lower: -(q1 + multiplier * iq_range),
        upper: q3 + multiplier * iq_range,
    })
}

/// Classify every remainder point against the fence.
pub fn classify_remainder(remainder: &[f64], config: &FenceConfig) -> Result<RemainderAssessment> {
    let fence = iqr_fence(remainder, config.alpha)?;
    let centerline = fence.centerline();

    let n = remainder.len();
    let mut flagged = Vec::with_capacity(n);
    let mut scores = Vec::with_capacity(n);
    let mut directions = Vec::with_capacity(n);

    for &value in remainder {
        let direction = if value > fence.upper {
            1
        } else if value < fence.lower {
            -1
        } else {
            0
        };
        flagged.push(direction != 0);
        scores.push((value - centerline).abs());
        directions.push(direction);
    }

    Ok(RemainderAssessment {
        flagged,
        scores,
        directions,
        fence,
    })
}
