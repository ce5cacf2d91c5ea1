//! Slice mosaics
//!
//! Tiles every slice of a volume into one figure, optionally with a
//! translucent mask overlay on each slice. All cells share a single
//! intensity window taken from the 0.5th and 99.5th percentiles of the
//! whole volume, so slices stay visually comparable.

use tracing::{debug, info};

use crate::colormap::{ColorRamp, IntensityWindow, WINDOW_PERCENTILES};
use crate::error::{QcError, QcResult};
use crate::figure::{Figure, ImageLayer, Interpolation, Origin, SubplotSpacing, A4_LANDSCAPE};
use crate::layout::{grid_layout, Grid};
use crate::source::{default_title, FileMetadata, FsMetadata, NiftiLoader, VolumeInput, VolumeLoader};
use crate::utils::stats::percentiles;
use crate::volume::Volume;

/// Fraction of the figure height kept free above the cells for the title
pub const TITLE_BAND: f64 = 0.15;

/// Most cells a mosaic figure may hold
pub const MAX_MOSAIC_CELLS: usize = 65_536;

/// Options for [`render_mosaic`]
///
/// Defaults: no explicit title (derived from the input file), no overlay,
/// A4 landscape (11.7 x 8.3 in), mosaic spacing and a 15% title band.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicConfig {
    pub title: Option<String>,
    pub overlay_mask: Option<VolumeInput>,
    /// Width and height in inches; their ratio drives the grid shape
    pub figure_size: (f64, f64),
    pub spacing: SubplotSpacing,
    pub title_band: f64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        MosaicConfig {
            title: None,
            overlay_mask: None,
            figure_size: A4_LANDSCAPE,
            spacing: SubplotSpacing::MOSAIC,
            title_band: TITLE_BAND,
        }
    }
}

impl MosaicConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_overlay(mut self, overlay: impl Into<VolumeInput>) -> Self {
        self.overlay_mask = Some(overlay.into());
        self
    }

    pub fn with_figure_size(mut self, width: f64, height: f64) -> Self {
        self.figure_size = (width, height);
        self
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.figure_size.0 / self.figure_size.1
    }
}

/// Global display window over every non-missing voxel
pub fn intensity_window(volume: &Volume) -> QcResult<IntensityWindow> {
    let bounds = percentiles(
        &volume.present_values(),
        &[WINDOW_PERCENTILES.0, WINDOW_PERCENTILES.1],
    )?;
    Ok(IntensityWindow::new(bounds[0], bounds[1]))
}

fn ensure_renderable(grid: Grid) -> QcResult<()> {
    // capacity() saturates, so extreme aspect ratios land here too
    if grid.capacity() > MAX_MOSAIC_CELLS {
        return Err(QcError::LayoutTooLarge {
            rows: grid.rows,
            columns: grid.columns,
            limit: MAX_MOSAIC_CELLS,
        });
    }
    Ok(())
}

/// Render a mosaic, loading paths as NIfTI and titling from the filesystem
pub fn render_mosaic(input: &VolumeInput, config: &MosaicConfig) -> QcResult<Figure> {
    render_mosaic_with(input, config, &NiftiLoader, &FsMetadata)
}

/// Render a mosaic with explicit volume loading and title metadata
///
/// # Arguments
/// * `input` - Volume to tile, slice index along the third axis
/// * `config` - Title, overlay, figure size and spacing
/// * `loader` - Resolves path inputs (volume and overlay)
/// * `metadata` - Supplies file name and mtime when no title is given
///
/// # Returns
/// A figure with `rows * columns` cells, of which the first `nz` in
/// row-major order hold one slice each.
pub fn render_mosaic_with<L, M>(
    input: &VolumeInput,
    config: &MosaicConfig,
    loader: &L,
    metadata: &M,
) -> QcResult<Figure>
where
    L: VolumeLoader + ?Sized,
    M: FileMetadata + ?Sized,
{
    let title = match config.title.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => default_title(input, metadata)?,
    };

    let volume = input.resolve(loader)?;
    let slice_count = volume.slice_count();
    let grid = grid_layout(config.aspect_ratio(), slice_count)?;
    ensure_renderable(grid)?;

    let overlay = match &config.overlay_mask {
        Some(o) => {
            let overlay = o.resolve(loader)?;
            volume.ensure_same_shape(&overlay)?;
            Some(overlay)
        }
        None => None,
    };

    let window = intensity_window(&volume)?;
    debug!(vmin = window.vmin, vmax = window.vmax, "mosaic intensity window");

    let spacing = config.spacing.below_band(config.title_band);
    let mut figure = Figure::new(config.figure_size, grid, spacing);

    for k in 0..slice_count {
        let image = volume.display_slice(k)?;
        let overlay_image = match &overlay {
            Some(o) => Some(o.display_slice(k)?),
            None => None,
        };

        let Some(cell) = figure.cell_mut(k) else { break };
        cell.images.push(ImageLayer {
            image,
            window,
            ramp: ColorRamp::GREYSCALE,
            interpolation: Interpolation::Nearest,
            origin: Origin::Lower,
        });

        if let Some(image) = overlay_image {
            cell.rasterized = true;
            cell.images.push(ImageLayer {
                image,
                window: IntensityWindow::new(0.0, 1.0),
                ramp: ColorRamp::OVERLAY,
                interpolation: Interpolation::Nearest,
                origin: Origin::Lower,
            });
        }
    }

    for cell in figure.axes.iter_mut() {
        cell.axis_visible = false;
    }
    figure.set_title(title);

    info!(
        slices = slice_count,
        rows = grid.rows,
        columns = grid.columns,
        overlay = overlay.is_some(),
        "rendered mosaic"
    );
    Ok(figure)
}
