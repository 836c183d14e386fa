//! # anofox-anomaly
//!
//! Decomposition-based anomaly detection for time series.
//!
//! Series are split into seasonal, trend and remainder components
//! (classical moving-average decomposition or a robust median-trend
//! variant), remainders are fenced with an interquartile-range rule, and
//! flagged points are scored, bounded on the observed scale and cleaned.
//! Input tables can be partitioned into independent groups and processed
//! sequentially or across a worker pool. Expanding-window statistics and
//! Hilbert-transform analytic-signal features ship as sibling augmenters.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod anomalize;
pub mod core;
pub mod decomposition;
pub mod detection;
pub mod error;
pub mod execution;
pub mod features;
pub mod frequency;
pub mod utils;

pub use error::{AnomalyError, Result};

pub mod prelude {
    pub use crate::anomalize::{anomalize, anomalize_grouped, AnomalizeConfig, CleanMethod};
    pub use crate::core::{Column, Frame, GroupedFrame};
    pub use crate::decomposition::{DecompositionMethod, DecompositionModel};
    pub use crate::error::{AnomalyError, Result};
    pub use crate::execution::Parallelism;
    pub use crate::features::{
        augment_expanding, augment_expanding_grouped, augment_hilbert, augment_hilbert_grouped,
        ExpandingStat,
    };
}
