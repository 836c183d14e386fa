//! Seasonal decomposition of observed series.
//!
//! Two interchangeable variants split a series into seasonal, trend, and
//! remainder components:
//! - Standard: classical moving-average decomposition with the trend
//!   extrapolated across the edges a centered window cannot reach
//! - Twitter: the same seasonal extraction, with the moving-average trend
//!   replaced by per-subsequence medians of the seasonally adjusted series

mod classical;
mod twitter;

pub use classical::{
    decompose_standard, Decomposition, DecompositionMethod, DecompositionModel,
};
pub use twitter::decompose_twitter;
