//! The anomaly detection pipeline and its per-group orchestration.

use chrono::{DateTime, Utc};

use crate::anomalize::clean::{clean_series, CleanMethod};
use crate::core::{Column, Frame, Group, GroupedFrame};
use crate::decomposition::{
    decompose_standard, decompose_twitter, DecompositionMethod, DecompositionModel,
};
use crate::detection::{classify_remainder, FenceConfig};
use crate::error::{AnomalyError, Result};
use crate::execution::{Executor, Parallelism};
use crate::frequency;

/// Configuration for [`anomalize`] and [`anomalize_grouped`].
#[derive(Debug, Clone)]
pub struct AnomalizeConfig {
    /// Seasonal cycle length in observations; inferred from the timestamp
    /// axis when unset.
    pub period: Option<usize>,
    /// Trend span in observations; inferred from the timestamp axis when
    /// unset. Only the twitter method consumes it, as the subsequence count
    /// for the median trend.
    pub trend: Option<usize>,
    /// Decomposition variant.
    pub method: DecompositionMethod,
    /// Decomposition model.
    pub decomp: DecompositionModel,
    /// Cleaning policy for flagged anomalies.
    pub clean: CleanMethod,
    /// Significance level controlling the remainder fence width.
    pub iqr_alpha: f64,
    /// Inward pull applied by the min-max cleaning policy.
    pub clean_alpha: f64,
    /// Advisory bound on the flagged share; reported, never enforced.
    pub max_anomalies: f64,
    /// Append the original input columns to the result.
    pub bind_data: bool,
    /// Worker-count request for grouped input.
    pub parallelism: Parallelism,
    /// Progress feedback while groups are processed.
    pub show_progress: bool,
}

impl Default for AnomalizeConfig {
    fn default() -> Self {
        Self {
            period: None,
            trend: None,
            method: DecompositionMethod::Twitter,
            decomp: DecompositionModel::Additive,
            clean: CleanMethod::MinMax,
            iqr_alpha: 0.05,
            clean_alpha: 0.75,
            max_anomalies: 0.2,
            bind_data: false,
            parallelism: Parallelism::Sequential,
            show_progress: true,
        }
    }
}

impl AnomalizeConfig {
    /// Configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seasonal cycle length.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    /// Set the trend span.
    pub fn with_trend(mut self, trend: usize) -> Self {
        self.trend = Some(trend);
        self
    }

    /// Set the decomposition variant.
    pub fn with_method(mut self, method: DecompositionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the decomposition model.
    pub fn with_decomp(mut self, decomp: DecompositionModel) -> Self {
        self.decomp = decomp;
        self
    }

    /// Set the cleaning policy.
    pub fn with_clean(mut self, clean: CleanMethod) -> Self {
        self.clean = clean;
        self
    }

    /// Set the fence significance level.
    pub fn with_iqr_alpha(mut self, alpha: f64) -> Self {
        self.iqr_alpha = alpha;
        self
    }

    /// Set the inward pull for min-max cleaning.
    pub fn with_clean_alpha(mut self, alpha: f64) -> Self {
        self.clean_alpha = alpha;
        self
    }

    /// Set the advisory bound on the flagged share.
    pub fn with_max_anomalies(mut self, share: f64) -> Self {
        self.max_anomalies = share;
        self
    }

    /// Keep the original input columns in the result.
    pub fn with_bind_data(mut self, bind: bool) -> Self {
        self.bind_data = bind;
        self
    }

    /// Set the worker-count request.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Enable or disable progress feedback.
    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// Detect anomalies in a single series.
///
/// The frame must carry a timestamp column sorted in ascending order and a
/// numeric value column. The result holds the timestamp column followed by
/// `observed`, `seasonal`, `seasadj`, `trend`, `remainder`, `anomaly`,
/// `anomaly_score`, `anomaly_direction`, `recomposed_l1`, `recomposed_l2`,
/// and `observed_clean`, then the remaining input columns when
/// `bind_data` is set.
pub fn anomalize(
    frame: &Frame,
    date_column: &str,
    value_column: &str,
    config: &AnomalizeConfig,
) -> Result<Frame> {
    anomalize_one(frame, date_column, value_column, &[], config)
}

/// Detect anomalies independently in every group.
///
/// Groups fan out across the configured worker count; result blocks come
/// back in group encounter order with the key columns leading, and the
/// first failing group aborts the whole call.
pub fn anomalize_grouped(
    grouped: &GroupedFrame,
    date_column: &str,
    value_column: &str,
    config: &AnomalizeConfig,
) -> Result<Frame> {
    let executor = Executor::new(config.parallelism, config.show_progress);
    let groups: Vec<&Group> = grouped.groups().iter().collect();

    let blocks = executor.run(groups, |group| {
        anomalize_one(
            group.frame(),
            date_column,
            value_column,
            grouped.key_columns(),
            config,
        )
        .and_then(|result| attach_keys(grouped.key_columns(), group, result))
        .map_err(|e| e.for_group(&group.label()))
    })?;

    let mut combined = Frame::new();
    for block in blocks {
        combined.vstack(&block)?;
    }
    Ok(combined)
}

/// Run the full pipeline for one series and assemble its result frame.
fn anomalize_one(
    frame: &Frame,
    date_column: &str,
    value_column: &str,
    bind_skip: &[String],
    config: &AnomalizeConfig,
) -> Result<Frame> {
    let timestamps = frame.timestamp_column(date_column)?;
    let values = frame.numeric_column(value_column)?;

    if timestamps.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(AnomalyError::Validation(format!(
            "column {date_column:?} must be sorted in ascending order"
        )));
    }

    // Resolve the seasonal cycle before anything runs. The trend span is
    // only needed by the twitter method and is resolved there.
    let period = match config.period {
        Some(period) => period,
        None => frequency::infer_seasonal_period(timestamps)?,
    };

    let decomposition = match config.method {
        DecompositionMethod::Twitter => {
            let median_span = resolve_median_span(timestamps, values.len(), config.trend)?;
            decompose_twitter(&values, period, median_span, config.decomp)?
        }
        DecompositionMethod::StandardDecompose => {
            decompose_standard(&values, period, config.decomp)?
        }
    };

    let fence_config = FenceConfig {
        alpha: config.iqr_alpha,
        max_share: config.max_anomalies,
    };
    let assessment = classify_remainder(&decomposition.remainder, &fence_config)?;

    // Project the fence back onto the observed scale.
    let n = values.len();
    let mut recomposed_l1 = Vec::with_capacity(n);
    let mut recomposed_l2 = Vec::with_capacity(n);
    for i in 0..n {
        let base = decomposition.seasonal[i] + decomposition.trend[i];
        recomposed_l1.push(base + assessment.fence.lower);
        recomposed_l2.push(base + assessment.fence.upper);
    }

    let observed_clean = clean_series(
        &decomposition.observed,
        &assessment.directions,
        &recomposed_l1,
        &recomposed_l2,
        config.clean,
        config.clean_alpha,
    );

    let anomaly: Vec<String> = assessment
        .flagged
        .iter()
        .map(|&flagged| if flagged { "Yes" } else { "No" }.to_string())
        .collect();

    let mut result = Frame::new();
    result.push_column(date_column, Column::Timestamp(timestamps.to_vec()))?;
    result.push_column("observed", Column::Float(decomposition.observed))?;
    result.push_column("seasonal", Column::Float(decomposition.seasonal))?;
    result.push_column("seasadj", Column::Float(decomposition.seasadj))?;
    result.push_column("trend", Column::Float(decomposition.trend))?;
    result.push_column("remainder", Column::Float(decomposition.remainder))?;
    result.push_column("anomaly", Column::Str(anomaly))?;
    result.push_column("anomaly_score", Column::Float(assessment.scores))?;
    result.push_column("anomaly_direction", Column::Int(assessment.directions))?;
    result.push_column("recomposed_l1", Column::Float(recomposed_l1))?;
    result.push_column("recomposed_l2", Column::Float(recomposed_l2))?;
    result.push_column("observed_clean", Column::Float(observed_clean))?;

    if config.bind_data {
        for name in frame.column_names() {
            if result.has_column(name) || bind_skip.contains(name) {
                continue;
            }
            result.push_column(name, frame.column(name)?.clone())?;
        }
    }

    Ok(result)
}

/// Subsequences used when neither the caller nor the axis provides a trend
/// span to derive one from.
const FALLBACK_MEDIAN_SPAN: usize = 4;

/// Resolve the subsequence count for the twitter median trend.
///
/// An explicit trend span must be positive; an absent one is inferred from
/// the axis, falling back to [`FALLBACK_MEDIAN_SPAN`] subsequences when the
/// axis has no dominant spacing to infer from.
fn resolve_median_span(
    timestamps: &[DateTime<Utc>],
    len: usize,
    trend: Option<usize>,
) -> Result<usize> {
    let trend = match trend {
        Some(0) => {
            return Err(AnomalyError::Configuration(
                "trend span must be positive".to_string(),
            ))
        }
        Some(trend) => trend,
        None => match frequency::infer_trend_window(timestamps) {
            Ok(trend) => trend,
            Err(_) => return Ok(FALLBACK_MEDIAN_SPAN),
        },
    };
    Ok(median_span_for(len, trend))
}

/// Number of interleaved subsequences for the twitter median trend.
fn median_span_for(len: usize, trend: usize) -> usize {
    ((len as f64 / trend as f64).round_ties_even() as usize).max(1)
}

/// Prepend the group's key columns to its result block.
fn attach_keys(key_columns: &[String], group: &Group, result: Frame) -> Result<Frame> {
    let mut keyed = Frame::new();
    for (name, value) in key_columns.iter().zip(group.key()) {
        keyed.push_column(name, value.broadcast(group.len()))?;
    }
    keyed.hstack(result)?;
    Ok(keyed)
}
