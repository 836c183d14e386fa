//! Outlier classification for remainder series.
//!
//! Computes a robust interquartile-range fence over a remainder
//! distribution and classifies every point against it, with a deviation
//! score and the side violated.

mod fence;

pub use fence::{classify_remainder, iqr_fence, FenceConfig, IqrFence, RemainderAssessment};
