//! Analytic-signal features via the Hilbert transform.
//!
//! For each value column the real series becomes an analytic signal whose
//! real part is the input and whose imaginary part is its Hilbert
//! transform; magnitude and phase of the pair give the amplitude envelope
//! and instantaneous phase of the series.

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::core::{Column, Frame, GroupedFrame};
use crate::error::{AnomalyError, Result};
use crate::execution::Executor;
use crate::features::align::{scatter_group_columns, sort_order};

/// Add `{column}_hilbert_real` and `{column}_hilbert_imag` columns.
///
/// Rows are ordered by `date_column` for the transform and results are
/// written back in the caller's row order; the input columns pass through
/// untouched.
pub fn augment_hilbert(
    frame: &Frame,
    date_column: &str,
    value_columns: &[&str],
) -> Result<Frame> {
    validate_request(value_columns)?;

    let mut result = frame.clone();
    for (name, values) in hilbert_columns(frame, date_column, value_columns)? {
        result.push_column(name, Column::Float(values))?;
    }
    Ok(result)
}

/// Add analytic-signal columns independently per group.
///
/// Each group is transformed on its own time axis; the output is the
/// grouped frame's source with the new columns appended, original row
/// order preserved even when groups interleave.
pub fn augment_hilbert_grouped(
    grouped: &GroupedFrame,
    date_column: &str,
    value_columns: &[&str],
) -> Result<Frame> {
    validate_request(value_columns)?;

    let groups: Vec<_> = grouped.groups().iter().collect();
    let pieces = Executor::default().run(groups, |group| {
        hilbert_columns(group.frame(), date_column, value_columns)
            .map(|columns| (group.rows().to_vec(), columns))
            .map_err(|e| e.for_group(&group.label()))
    })?;

    let mut result = grouped.source().clone();
    for (name, values) in scatter_group_columns(grouped.source().n_rows(), pieces) {
        result.push_column(name, Column::Float(values))?;
    }
    Ok(result)
}

fn validate_request(value_columns: &[&str]) -> Result<()> {
    if value_columns.is_empty() {
        return Err(AnomalyError::Validation(
            "at least one value column is required".to_string(),
        ));
    }
    Ok(())
}

/// Real and imaginary analytic-signal columns for one frame, in the
/// caller's row order.
fn hilbert_columns(
    frame: &Frame,
    date_column: &str,
    value_columns: &[&str],
) -> Result<Vec<(String, Vec<f64>)>> {
    let timestamps = frame.timestamp_column(date_column)?;
    let order = sort_order(timestamps);

    let mut out = Vec::with_capacity(value_columns.len() * 2);
    for &col in value_columns {
        let values = frame.numeric_column(col)?;
        let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        let analytic = analytic_signal(&sorted);

        let mut real = vec![f64::NAN; values.len()];
        let mut imag = vec![f64::NAN; values.len()];
        for (rank, &i) in order.iter().enumerate() {
            real[i] = analytic[rank].re;
            imag[i] = analytic[rank].im;
        }
        out.push((format!("{col}_hilbert_real"), real));
        out.push((format!("{col}_hilbert_imag"), imag));
    }
    Ok(out)
}

/// Analytic signal of a real series.
///
/// FFT, then a gain that keeps the DC bin (and the Nyquist bin for even
/// lengths), doubles the positive frequencies and zeroes the negative
/// ones, then the inverse FFT scaled by 1/N.
fn analytic_signal(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let positive_end = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };
    for value in &mut buffer[1..positive_end] {
        *value *= 2.0;
    }
    let negative_start = if n % 2 == 0 { n / 2 + 1 } else { positive_end };
    for value in &mut buffer[negative_start..] {
        *value = Complex64::new(0.0, 0.0);
    }

    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut buffer);

    // rustfft leaves the inverse transform unnormalized.
    let scale = 1.0 / n as f64;
    for value in &mut buffer {
        *value *= scale;
    }
    buffer
}
