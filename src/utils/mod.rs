//! Utility functions shared across the anomaly pipeline.

pub mod stats;

pub use stats::{mean, median, quantile, std_dev, variance};
