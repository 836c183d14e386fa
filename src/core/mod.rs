//! Core data structures for anomaly detection.

mod frame;
mod group;

pub use frame::{Column, Frame};
pub use group::{Group, GroupedFrame, KeyValue};
