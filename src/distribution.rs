//! Value distribution plots
//!
//! Two stacked panels: a histogram of one scan's in-mask values on top and
//! the density of a population reference below it, marked at the scan's
//! own median so the subject can be placed within the population.

use tracing::info;

use crate::error::{QcError, QcResult};
use crate::figure::{Figure, SubplotSpacing, VLine, A4_LANDSCAPE};
use crate::layout::Grid;
use crate::source::{NiftiLoader, VolumeInput, VolumeLoader};
use crate::utils::mask::extract_masked_values;
use crate::utils::stats::{format_general, median, GaussianKde, Histogram};

/// Histogram bins for the sample panel
pub const SAMPLE_BINS: usize = 100;

/// Options for [`render_distribution`]
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionConfig {
    /// Caption of the sample histogram's x axis
    pub sample_label: String,
    /// Population values for the density panel; required
    pub reference: Option<Vec<f64>>,
    /// Caption of the density panel's x axis
    pub reference_label: Option<String>,
    /// Width and height in inches, A4 landscape by default
    pub figure_size: (f64, f64),
    pub bins: usize,
}

impl DistributionConfig {
    pub fn new(sample_label: impl Into<String>) -> Self {
        DistributionConfig {
            sample_label: sample_label.into(),
            reference: None,
            reference_label: None,
            figure_size: A4_LANDSCAPE,
            bins: SAMPLE_BINS,
        }
    }

    pub fn with_reference(mut self, reference: Vec<f64>, label: impl Into<String>) -> Self {
        self.reference = Some(reference);
        self.reference_label = Some(label.into());
        self
    }

    pub fn with_figure_size(mut self, width: f64, height: f64) -> Self {
        self.figure_size = (width, height);
        self
    }
}

fn usable_reference(reference: Option<&[f64]>) -> QcResult<&[f64]> {
    let reference = match reference {
        Some(r) if !r.is_empty() => r,
        _ => {
            return Err(QcError::UndefinedReference(
                "no reference distribution supplied".to_string(),
            ))
        }
    };
    if reference.iter().any(|v| !v.is_finite()) {
        return Err(QcError::UndefinedReference(
            "reference distribution contains non-finite values".to_string(),
        ));
    }
    Ok(reference)
}

/// Render a distribution plot, loading paths as NIfTI
pub fn render_distribution(
    sample: &VolumeInput,
    mask: &VolumeInput,
    config: &DistributionConfig,
) -> QcResult<Figure> {
    render_distribution_with(sample, mask, config, &NiftiLoader)
}

/// Render a distribution plot with explicit volume loading
///
/// # Arguments
/// * `sample` - The subject's volume
/// * `mask` - Mask selecting the voxels to summarise
/// * `config` - Labels, reference distribution and figure size
/// * `loader` - Resolves path inputs
///
/// # Returns
/// A 2x1 figure: sample histogram on top, reference density with a
/// marker at the sample median below. Fails with `UndefinedReference`
/// when the reference is missing, empty or has no density, and with
/// `InvalidVolume` when an in-mask sample value is infinite.
pub fn render_distribution_with<L: VolumeLoader + ?Sized>(
    sample: &VolumeInput,
    mask: &VolumeInput,
    config: &DistributionConfig,
    loader: &L,
) -> QcResult<Figure> {
    let reference = usable_reference(config.reference.as_deref())?;
    let density = GaussianKde::fit(reference)?;

    let volume = sample.resolve(loader)?;
    let mask = mask.resolve(loader)?;
    let values = extract_masked_values(&volume, &mask)?;
    if values.is_empty() {
        return Err(QcError::EmptySelection(
            "sample has no present voxels inside the mask".to_string(),
        ));
    }

    let histogram = Histogram::new(&values, config.bins)?;
    let sample_median = median(&values)?;

    let mut figure = Figure::new(
        config.figure_size,
        Grid { rows: 2, columns: 1 },
        SubplotSpacing::PANELS,
    );

    if let Some(top) = figure.cell_mut(0) {
        top.histogram = Some(histogram);
        top.xlabel = Some(config.sample_label.clone());
    }
    if let Some(bottom) = figure.cell_mut(1) {
        bottom.density = Some(density);
        bottom.vlines.push(VLine { x: sample_median, label: format_general(sample_median) });
        bottom.xlabel = config.reference_label.clone();
    }

    info!(
        voxels = values.len(),
        median = sample_median,
        reference = reference.len(),
        "rendered distribution"
    );
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Volume;

    fn sample() -> (VolumeInput, VolumeInput) {
        let vol = Volume::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 99.0, f64::NAN, 7.0], (2, 2, 2)).unwrap();
        let mask = Volume::new(vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0], (2, 2, 2)).unwrap();
        (vol.into(), mask.into())
    }

    #[test]
    fn test_median_marker_on_reference_panel() {
        let (vol, mask) = sample();
        let config = DistributionConfig::new("mean FD").with_reference(vec![2.0, 3.0, 3.0, 4.0], "population");
        let fig = render_distribution(&vol, &mask, &config).unwrap();

        assert_eq!(fig.grid, Grid { rows: 2, columns: 1 });
        let bottom = fig.cell(1, 0).unwrap();
        assert_eq!(bottom.vlines, vec![VLine { x: 3.0, label: "3".to_string() }]);
        assert_eq!(bottom.xlabel.as_deref(), Some("population"));
        assert!(bottom.density.is_some());
        assert!(bottom.histogram.is_none());
    }

    #[test]
    fn test_histogram_panel() {
        let (vol, mask) = sample();
        let config = DistributionConfig::new("mean FD").with_reference(vec![2.0, 3.0, 3.0, 4.0], "population");
        let fig = render_distribution(&vol, &mask, &config).unwrap();

        let top = fig.cell(0, 0).unwrap();
        let hist = top.histogram.as_ref().unwrap();
        assert_eq!(hist.bins(), 100);
        assert_eq!(hist.total(), 5);
        assert_eq!(top.xlabel.as_deref(), Some("mean FD"));
        assert!(top.density.is_none());
        assert!(top.vlines.is_empty());
    }

    #[test]
    fn test_missing_or_empty_reference() {
        let (vol, mask) = sample();
        let none = DistributionConfig::new("x");
        assert!(matches!(
            render_distribution(&vol, &mask, &none),
            Err(QcError::UndefinedReference(_))
        ));

        let empty = DistributionConfig::new("x").with_reference(vec![], "ref");
        assert!(matches!(
            render_distribution(&vol, &mask, &empty),
            Err(QcError::UndefinedReference(_))
        ));
    }

    #[test]
    fn test_degenerate_reference() {
        let (vol, mask) = sample();
        for reference in [vec![3.0], vec![2.0, 2.0, 2.0], vec![1.0, f64::NAN]] {
            let config = DistributionConfig::new("x").with_reference(reference, "ref");
            assert!(matches!(
                render_distribution(&vol, &mask, &config),
                Err(QcError::UndefinedReference(_))
            ));
        }
    }

    #[test]
    fn test_empty_sample_selection() {
        let vol = Volume::filled((2, 2, 1), 1.0).unwrap();
        let mask = Volume::filled((2, 2, 1), 0.0).unwrap();
        let config = DistributionConfig::new("x").with_reference(vec![1.0, 2.0], "ref");
        assert!(matches!(
            render_distribution(&vol.into(), &mask.into(), &config),
            Err(QcError::EmptySelection(_))
        ));
    }

    #[test]
    fn test_infinite_sample_value() {
        let vol = Volume::new(vec![1.0, 2.0, 3.0, f64::INFINITY], (4, 1, 1)).unwrap();
        let mask = Volume::filled((4, 1, 1), 1.0).unwrap();
        let config = DistributionConfig::new("x").with_reference(vec![1.0, 2.0], "ref");
        assert!(matches!(
            render_distribution(&vol.into(), &mask.into(), &config),
            Err(QcError::InvalidVolume(_))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let vol = Volume::filled((2, 2, 1), 1.0).unwrap();
        let mask = Volume::filled((2, 2, 2), 1.0).unwrap();
        let config = DistributionConfig::new("x").with_reference(vec![1.0, 2.0], "ref");
        assert!(matches!(
            render_distribution(&vol.into(), &mask.into(), &config),
            Err(QcError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_fractional_median_label() {
        let vol = Volume::new(vec![0.1, 0.2, 0.3, 0.4], (4, 1, 1)).unwrap();
        let mask = Volume::filled((4, 1, 1), 1.0).unwrap();
        let config = DistributionConfig::new("x").with_reference(vec![0.1, 0.5, 0.9], "ref");
        let fig = render_distribution(&vol.into(), &mask.into(), &config).unwrap();
        let line = &fig.cell(1, 0).unwrap().vlines[0];
        assert!((line.x - 0.25).abs() < 1e-12);
        assert_eq!(line.label, "0.25");
    }
}
