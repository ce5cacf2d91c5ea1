//! In-memory figure description
//!
//! A [`Figure`] records everything a plotting backend needs to draw a QC
//! page: the cell grid, each cell's position in figure coordinates, the
//! image layers with their intensity windows and ramps, histograms,
//! density curves and annotations. Nothing here touches the filesystem;
//! saving or displaying a figure is up to the caller.

use crate::colormap::{ColorRamp, IntensityWindow};
use crate::layout::Grid;
use crate::utils::stats::{GaussianKde, Histogram};
use crate::volume::SliceImage;

/// A4 landscape in inches
pub const A4_LANDSCAPE: (f64, f64) = (11.7, 8.3);

/// Font size used for figure titles
pub const TITLE_FONT_SIZE: f64 = 10.0;

/// Rectangle in figure-fraction coordinates, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

/// Figure margins and gaps between cells, as in a subplot grid
///
/// `left`, `right`, `bottom` and `top` are figure fractions; `wspace` and
/// `hspace` are gaps relative to the mean cell width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubplotSpacing {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub wspace: f64,
    pub hspace: f64,
}

impl SubplotSpacing {
    /// Tight spacing used by slice mosaics
    pub const MOSAIC: SubplotSpacing = SubplotSpacing {
        left: 0.05,
        right: 0.95,
        bottom: 0.05,
        top: 0.95,
        wspace: 0.01,
        hspace: 0.1,
    };

    /// Conventional plotting defaults, used for stacked panels
    pub const PANELS: SubplotSpacing = SubplotSpacing {
        left: 0.125,
        right: 0.9,
        bottom: 0.11,
        top: 0.88,
        wspace: 0.2,
        hspace: 0.2,
    };

    /// Position of cell (`row`, `column`) of `grid`, row 0 at the top
    pub fn cell_rect(&self, grid: Grid, row: usize, column: usize) -> Rect {
        let rows = grid.rows as f64;
        let cols = grid.columns as f64;

        let cell_w = (self.right - self.left) / (cols + self.wspace * (cols - 1.0));
        let cell_h = (self.top - self.bottom) / (rows + self.hspace * (rows - 1.0));
        let sep_w = self.wspace * cell_w;
        let sep_h = self.hspace * cell_h;

        let x0 = self.left + column as f64 * (cell_w + sep_w);
        let y_top = self.top - row as f64 * (cell_h + sep_h);

        Rect { x0, y0: y_top - cell_h, width: cell_w, height: cell_h }
    }

    /// Copy with `top` lowered so the band above it stays free
    pub fn below_band(&self, band: f64) -> SubplotSpacing {
        SubplotSpacing { top: self.top.min(1.0 - band), ..*self }
    }
}

/// Pixel interpolation when an image is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
}

/// Which image row is drawn at the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Row 0 at the bottom
    Lower,
    /// Row 0 at the top
    Upper,
}

/// One image drawn into a cell; later layers composite over earlier ones
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    pub image: SliceImage,
    pub window: IntensityWindow,
    pub ramp: ColorRamp,
    pub interpolation: Interpolation,
    pub origin: Origin,
}

impl ImageLayer {
    /// RGBA of pixel (`row`, `col`) after windowing and ramp lookup
    pub fn rgba(&self, row: usize, col: usize) -> [u8; 4] {
        let value = self.image.pixel(row, col);
        if value.is_nan() {
            return [0, 0, 0, 0];
        }
        self.ramp.rgba(self.window.normalize(value))
    }
}

/// Vertical marker with a text label
#[derive(Debug, Clone, PartialEq)]
pub struct VLine {
    pub x: f64,
    pub label: String,
}

/// A single cell or panel
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub row: usize,
    pub column: usize,
    pub rect: Rect,
    pub images: Vec<ImageLayer>,
    pub histogram: Option<Histogram>,
    pub density: Option<GaussianKde>,
    pub vlines: Vec<VLine>,
    pub xlabel: Option<String>,
    /// Ticks, labels and frame drawn
    pub axis_visible: bool,
    /// Drawn as a raster even in vector output
    pub rasterized: bool,
}

impl Axes {
    pub fn new(row: usize, column: usize, rect: Rect) -> Self {
        Axes {
            row,
            column,
            rect,
            images: Vec::new(),
            histogram: None,
            density: None,
            vlines: Vec::new(),
            xlabel: None,
            axis_visible: true,
            rasterized: false,
        }
    }

    /// Whether anything is drawn in this cell
    pub fn is_populated(&self) -> bool {
        !self.images.is_empty() || self.histogram.is_some() || self.density.is_some()
    }
}

/// Figure title
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub font_size: f64,
}

/// A renderable page of axes laid out on a grid
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Width and height in inches
    pub size: (f64, f64),
    pub grid: Grid,
    pub spacing: SubplotSpacing,
    pub title: Option<Title>,
    /// Every grid cell in row-major order
    pub axes: Vec<Axes>,
}

impl Figure {
    /// A figure with one empty cell per grid position
    pub fn new(size: (f64, f64), grid: Grid, spacing: SubplotSpacing) -> Self {
        let axes = (0..grid.capacity())
            .map(|index| {
                let (row, column) = grid.cell_position(index);
                Axes::new(row, column, spacing.cell_rect(grid, row, column))
            })
            .collect();

        Figure { size, grid, spacing, title: None, axes }
    }

    pub fn set_title(&mut self, text: impl Into<String>) {
        self.title = Some(Title { text: text.into(), font_size: TITLE_FONT_SIZE });
    }

    /// Cell at row-major `index`
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Axes> {
        self.axes.get_mut(index)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Axes> {
        if row >= self.grid.rows || column >= self.grid.columns {
            return None;
        }
        self.axes.get(row * self.grid.columns + column)
    }

    pub fn cell_count(&self) -> usize {
        self.axes.len()
    }

    pub fn populated_count(&self) -> usize {
        self.axes.iter().filter(|a| a.is_populated()).count()
    }
}
