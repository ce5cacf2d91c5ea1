//! QC-Core: quality-control figures for volumetric MRI
//!
//! This crate builds the per-subject visual QC pages of an MRI pipeline as
//! in-memory figures; saving them to PDF/PNG is left to the caller.
//!
//! # Modules
//! - `layout`: Rows/columns search for slice mosaics
//! - `mosaic`: Every slice of a volume tiled on one page, optional mask overlay
//! - `distribution`: Sample histogram against a population density
//! - `population`: Per-subject medians for reference distributions
//! - `utils`: Masked value extraction and summary statistics
//! - `figure`: The figure description handed to a plotting backend
//! - `nifti_io`: NIfTI loading

// Core types
pub mod error;
pub mod layout;
pub mod volume;

// Figure building
pub mod colormap;
pub mod figure;
pub mod mosaic;
pub mod distribution;
pub mod population;
pub mod utils;

// I/O and setup
pub mod nifti_io;
pub mod source;
pub mod config;
pub mod logging;

pub use error::{QcError, QcResult};
pub use layout::{grid_layout, grid_layout_lenient, Grid};
pub use volume::Volume;
pub use figure::Figure;
pub use mosaic::{render_mosaic, render_mosaic_with, MosaicConfig};
pub use distribution::{render_distribution, render_distribution_with, DistributionConfig};
pub use population::{median_distribution_from_files, median_per_subject};
pub use source::VolumeInput;
pub use utils::extract_masked_values;
