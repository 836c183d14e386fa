//! Seasonal period and trend window inference from a timestamp axis.
//!
//! The dominant spacing between consecutive timestamps picks a calendar
//! granularity, which maps to a default seasonal cycle and trend span
//! expressed in observation counts. Daily data gets a weekly cycle and a
//! quarterly trend, hourly data a daily cycle and a monthly trend, and so
//! on up to yearly data.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::{AnomalyError, Result};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const QUARTER: i64 = 91 * DAY;
const YEAR: i64 = 365 * DAY;

/// Share of spacings the modal spacing must reach to count as dominant.
const MODAL_TOLERANCE: f64 = 0.5;

/// Dominant spacing between consecutive timestamps.
///
/// Timestamps are assumed to be in ascending order. Fails when fewer than
/// two timestamps are given, when no spacing reaches `tolerance` as a share
/// of all spacings, or when the dominant spacing is not positive.
pub fn modal_spacing(timestamps: &[DateTime<Utc>], tolerance: f64) -> Result<Duration> {
    if timestamps.len() < 2 {
        return Err(AnomalyError::Validation(format!(
            "at least 2 timestamps are required to infer a frequency, got {}",
            timestamps.len()
        )));
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for pair in timestamps.windows(2) {
        let diff = (pair[1] - pair[0]).num_seconds();
        *counts.entry(diff).or_insert(0) += 1;
    }

    let (modal_diff, modal_count) = counts
        .iter()
        .max_by_key(|(_, &count)| count)
        .map(|(&diff, &count)| (diff, count))
        .ok_or_else(|| AnomalyError::Computation("empty spacing data".to_string()))?;

    let total_count: usize = counts.values().sum();
    let modal_ratio = modal_count as f64 / total_count as f64;
    if modal_ratio < tolerance {
        return Err(AnomalyError::Computation(
            "no dominant timestamp spacing found".to_string(),
        ));
    }

    if modal_diff <= 0 {
        return Err(AnomalyError::Computation(
            "modal timestamp spacing is not positive".to_string(),
        ));
    }

    Ok(Duration::seconds(modal_diff))
}

/// Default seasonal cycle length, in observations, for a timestamp axis.
pub fn infer_seasonal_period(timestamps: &[DateTime<Utc>]) -> Result<usize> {
    let spacing = modal_spacing(timestamps, MODAL_TOLERANCE)?.num_seconds();
    let (seasonal_span, _) = spans_for_spacing(spacing);
    Ok(observations_in(seasonal_span, spacing).max(2))
}

/// Default trend span, in observations, for a timestamp axis.
pub fn infer_trend_window(timestamps: &[DateTime<Utc>]) -> Result<usize> {
    let spacing = modal_spacing(timestamps, MODAL_TOLERANCE)?.num_seconds();
    let (_, trend_span) = spans_for_spacing(spacing);
    Ok(observations_in(trend_span, spacing).max(1))
}

/// Calendar spans (seasonal, trend) in seconds for a given observation
/// spacing.
fn spans_for_spacing(spacing: i64) -> (i64, i64) {
    if spacing < MINUTE {
        (HOUR, DAY)
    } else if spacing < HOUR {
        (DAY, WEEK)
    } else if spacing < DAY {
        (DAY, MONTH)
    } else if spacing < WEEK {
        (WEEK, QUARTER)
    } else if spacing < 28 * DAY {
        (QUARTER, YEAR)
    } else if spacing < YEAR {
        (YEAR, 5 * YEAR)
    } else {
        (5 * YEAR, 10 * YEAR)
    }
}

fn observations_in(span: i64, spacing: i64) -> usize {
    (span as f64 / spacing as f64).round() as usize
}
