//! Expanding-window statistics over a date-ordered series.
//!
//! Each statistic is computed over the growing prefix of the series in
//! timestamp order, then written back against the caller's original row
//! order. Missing (NaN) observations are skipped and do not count toward
//! the `min_periods` threshold.

use std::str::FromStr;

use crate::core::{Column, Frame, GroupedFrame};
use crate::error::{AnomalyError, Result};
use crate::execution::Executor;
use crate::features::align::{scatter_group_columns, sort_order};
use crate::utils::{mean, median, std_dev};

/// Statistic computed over the expanding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandingStat {
    Mean,
    Sum,
    Min,
    Max,
    /// Sample standard deviation; needs at least two observations.
    Std,
    Median,
}

impl ExpandingStat {
    /// Suffix used in generated column names.
    pub fn name(&self) -> &'static str {
        match self {
            ExpandingStat::Mean => "mean",
            ExpandingStat::Sum => "sum",
            ExpandingStat::Min => "min",
            ExpandingStat::Max => "max",
            ExpandingStat::Std => "std",
            ExpandingStat::Median => "median",
        }
    }
}

impl FromStr for ExpandingStat {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(ExpandingStat::Mean),
            "sum" => Ok(ExpandingStat::Sum),
            "min" => Ok(ExpandingStat::Min),
            "max" => Ok(ExpandingStat::Max),
            "std" => Ok(ExpandingStat::Std),
            "median" => Ok(ExpandingStat::Median),
            other => Err(AnomalyError::Configuration(format!(
                "unknown expanding statistic: {other:?} (expected \"mean\", \"sum\", \
                 \"min\", \"max\", \"std\" or \"median\")"
            ))),
        }
    }
}

/// Add expanding-window statistic columns to a frame.
///
/// Rows are ordered by `date_column` for the computation and the results
/// are written back in the caller's row order, so the output frame keeps
/// the input rows untouched and appends one `{column}_expanding_{stat}`
/// column per value column and statistic. `min_periods` is the number of
/// present observations required before a value is emitted; positions
/// below the threshold hold NaN. Pass 1 to emit from the first row.
pub fn augment_expanding(
    frame: &Frame,
    date_column: &str,
    value_columns: &[&str],
    stats: &[ExpandingStat],
    min_periods: usize,
) -> Result<Frame> {
    validate_request(value_columns, stats, min_periods)?;

    let mut result = frame.clone();
    for (name, values) in expanding_columns(frame, date_column, value_columns, stats, min_periods)?
    {
        result.push_column(name, Column::Float(values))?;
    }
    Ok(result)
}

/// Add expanding-window statistic columns independently per group.
///
/// Statistics never cross group boundaries. The output is the grouped
/// frame's source with the new columns appended, original row order
/// preserved even when groups interleave.
pub fn augment_expanding_grouped(
    grouped: &GroupedFrame,
    date_column: &str,
    value_columns: &[&str],
    stats: &[ExpandingStat],
    min_periods: usize,
) -> Result<Frame> {
    validate_request(value_columns, stats, min_periods)?;

    let groups: Vec<_> = grouped.groups().iter().collect();
    let pieces = Executor::default().run(groups, |group| {
        expanding_columns(group.frame(), date_column, value_columns, stats, min_periods)
            .map(|columns| (group.rows().to_vec(), columns))
            .map_err(|e| e.for_group(&group.label()))
    })?;

    let mut result = grouped.source().clone();
    for (name, values) in scatter_group_columns(grouped.source().n_rows(), pieces) {
        result.push_column(name, Column::Float(values))?;
    }
    Ok(result)
}

fn validate_request(
    value_columns: &[&str],
    stats: &[ExpandingStat],
    min_periods: usize,
) -> Result<()> {
    if value_columns.is_empty() {
        return Err(AnomalyError::Validation(
            "at least one value column is required".to_string(),
        ));
    }
    if stats.is_empty() {
        return Err(AnomalyError::Validation(
            "at least one expanding statistic is required".to_string(),
        ));
    }
    if min_periods == 0 {
        return Err(AnomalyError::Configuration(
            "min_periods must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Compute every requested column for one frame, in the caller's row order.
fn expanding_columns(
    frame: &Frame,
    date_column: &str,
    value_columns: &[&str],
    stats: &[ExpandingStat],
    min_periods: usize,
) -> Result<Vec<(String, Vec<f64>)>> {
    let timestamps = frame.timestamp_column(date_column)?;
    let order = sort_order(timestamps);

    let mut out = Vec::with_capacity(value_columns.len() * stats.len());
    for &col in value_columns {
        let values = frame.numeric_column(col)?;
        let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        for &stat in stats {
            let prefix = expanding_stat(&sorted, stat, min_periods);
            let mut scattered = vec![f64::NAN; values.len()];
            for (rank, &i) in order.iter().enumerate() {
                scattered[i] = prefix[rank];
            }
            out.push((format!("{col}_expanding_{}", stat.name()), scattered));
        }
    }
    Ok(out)
}

/// One statistic over the growing prefix of a date-ordered series.
fn expanding_stat(values: &[f64], stat: ExpandingStat, min_periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let mut window: Vec<f64> = Vec::with_capacity(values.len());

    for (i, &x) in values.iter().enumerate() {
        if !x.is_nan() {
            window.push(x);
        }
        if window.len() < min_periods {
            continue;
        }
        result[i] = match stat {
            ExpandingStat::Mean => mean(&window),
            ExpandingStat::Sum => window.iter().sum(),
            ExpandingStat::Min => window.iter().copied().fold(f64::INFINITY, f64::min),
            ExpandingStat::Max => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ExpandingStat::Std => std_dev(&window),
            ExpandingStat::Median => median(&window),
        };
    }
    result
}
