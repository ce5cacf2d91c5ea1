//! Utility functions for QC rendering

pub mod mask;
pub mod stats;

pub use mask::{binary_mask, extract_masked_values};
pub use stats::{format_general, median, percentile, percentiles, GaussianKde, Histogram};
