//! Anomaly detection for time series frames.

mod clean;
mod pipeline;

pub use clean::{clean_series, CleanMethod};
pub use pipeline::{anomalize, anomalize_grouped, AnomalizeConfig};
