//! Windowed feature augmenters for time series frames.

mod align;
mod expanding;
mod hilbert;

pub use expanding::{augment_expanding, augment_expanding_grouped, ExpandingStat};
pub use hilbert::{augment_hilbert, augment_hilbert_grouped};
