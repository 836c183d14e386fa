//! Row alignment shared by the feature augmenters.

use chrono::{DateTime, Utc};

/// Stable order of row indices by ascending timestamp.
pub(crate) fn sort_order(timestamps: &[DateTime<Utc>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..timestamps.len()).collect();
    order.sort_by_key(|&i| timestamps[i]);
    order
}

/// Merge per-group column pieces into full-length columns aligned with the
/// source frame's rows.
///
/// Every group contributes the same columns in the same order; each piece
/// carries the source row indices its values belong to.
pub(crate) fn scatter_group_columns(
    n_rows: usize,
    pieces: Vec<(Vec<usize>, Vec<(String, Vec<f64>)>)>,
) -> Vec<(String, Vec<f64>)> {
    let mut merged: Vec<(String, Vec<f64>)> = Vec::new();
    for (rows, columns) in pieces {
        for (slot, (name, values)) in columns.into_iter().enumerate() {
            if merged.len() <= slot {
                merged.push((name, vec![f64::NAN; n_rows]));
            }
            let full = &mut merged[slot].1;
            for (local, &row) in rows.iter().enumerate() {
                full[row] = values[local];
            }
        }
    }
    merged
}
