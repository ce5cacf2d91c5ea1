//! In-memory 3D volumes
//!
//! Volumes are stored flat in Fortran (column-major) order to match the
//! NIfTI convention: index = x + y*nx + z*nx*ny. Missing voxels (outside
//! the acquisition) are NaN.

use crate::error::{QcError, QcResult};

/// A 3D array of scalar intensities indexed (x, y, slice)
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Vec<f64>,
    dims: (usize, usize, usize),
}

impl Volume {
    /// Wrap flat Fortran-ordered data
    ///
    /// Fails if any axis is empty or `data.len() != nx * ny * nz`.
    pub fn new(data: Vec<f64>, dims: (usize, usize, usize)) -> QcResult<Self> {
        let (nx, ny, nz) = dims;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(QcError::InvalidVolume(format!(
                "every axis must be non-empty, got {}x{}x{}", nx, ny, nz
            )));
        }
        if data.len() != nx * ny * nz {
            return Err(QcError::InvalidVolume(format!(
                "{}x{}x{} volume needs {} values, got {}",
                nx, ny, nz, nx * ny * nz, data.len()
            )));
        }
        Ok(Volume { data, dims })
    }

    /// Build a volume by evaluating `f(x, y, z)` at every voxel
    pub fn from_fn<F>(dims: (usize, usize, usize), mut f: F) -> QcResult<Self>
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let (nx, ny, nz) = dims;
        let mut data = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    data.push(f(i, j, k));
                }
            }
        }
        Volume::new(data, dims)
    }

    /// A volume filled with a single value
    pub fn filled(dims: (usize, usize, usize), value: f64) -> QcResult<Self> {
        Volume::new(vec![value; dims.0 * dims.1 * dims.2], dims)
    }

    /// A volume of the same dimensions with `f` applied to every voxel
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Volume {
        Volume { data: self.data.iter().map(|&v| f(v)).collect(), dims: self.dims }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    /// Dimensions as a vector, for shape-mismatch reporting
    pub fn shape(&self) -> Vec<usize> {
        vec![self.dims.0, self.dims.1, self.dims.2]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of slices along the third axis
    pub fn slice_count(&self) -> usize {
        self.dims.2
    }

    #[inline]
    fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.dims.0 + k * self.dims.0 * self.dims.1
    }

    /// Voxel value at (x, y, z)
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.idx(i, j, k)]
    }

    /// Non-missing values anywhere in the volume
    pub fn present_values(&self) -> Vec<f64> {
        self.data.iter().copied().filter(|v| !v.is_nan()).collect()
    }

    /// Fail with `ShapeMismatch` unless `other` has the same dimensions
    pub fn ensure_same_shape(&self, other: &Volume) -> QcResult<()> {
        if self.dims != other.dims {
            return Err(QcError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    /// Slice `k` oriented for display
    ///
    /// The slice is transposed and mirrored left-right, so the image is
    /// `ny` rows by `nx` columns, with row 0 at the bottom (origin lower)
    /// and column `c` holding `x = nx - 1 - c`.
    pub fn display_slice(&self, k: usize) -> QcResult<SliceImage> {
        let (nx, ny, nz) = self.dims;
        if k >= nz {
            return Err(QcError::InvalidVolume(format!(
                "slice {} out of range for {} slices", k, nz
            )));
        }

        let mut pixels = Vec::with_capacity(nx * ny);
        for row in 0..ny {
            for col in 0..nx {
                pixels.push(self.get(nx - 1 - col, row, k));
            }
        }

        Ok(SliceImage { width: nx, height: ny, pixels })
    }
}

/// A 2D image ready to be drawn with its origin at the lower-left
#[derive(Debug, Clone, PartialEq)]
pub struct SliceImage {
    pub width: usize,
    pub height: usize,
    /// Row-major pixels, row 0 drawn at the bottom
    pub pixels: Vec<f64>,
}

impl SliceImage {
    pub fn pixel(&self, row: usize, col: usize) -> f64 {
        self.pixels[row * self.width + col]
    }
}
