//! Mosaic grid layout
//!
//! Chooses how many rows and columns a slice mosaic needs so that every
//! slice gets a cell and the grid follows the figure's aspect ratio.
//!
//! The search walks `rows = 1, 2, ...` and at each step tries the floor and
//! then the ceiling of `aspect_ratio * rows` as the column count, stopping at
//! the first candidate whose capacity strictly exceeds the slice count. The
//! floor candidate wins whenever both would qualify.

use tracing::{debug, warn};

use crate::error::{QcError, QcResult};

/// Upper bound on the number of row counts the layout search tries
pub const MAX_LAYOUT_ITERATIONS: usize = 100;

/// A rows x columns arrangement of mosaic cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
}

impl Grid {
    /// Number of cells in the grid
    pub fn capacity(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }

    /// Whether every one of `slice_count` slices gets its own cell
    pub fn covers(&self, slice_count: usize) -> bool {
        self.capacity() >= slice_count
    }

    /// Row-major `(row, column)` position of cell `index`
    pub fn cell_position(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }
}

/// Outcome of the bounded row search
struct Search {
    grid: Grid,
    converged: bool,
}

fn validate(aspect_ratio: f64, slice_count: usize) -> QcResult<()> {
    if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) || slice_count == 0 {
        return Err(QcError::InvalidLayoutInput { aspect_ratio, slice_count });
    }
    Ok(())
}

fn search(aspect_ratio: f64, slice_count: usize) -> Search {
    let mut rows = 1usize;
    let mut columns = 0usize;

    for _ in 0..MAX_LAYOUT_ITERATIONS {
        let target = aspect_ratio * rows as f64;

        columns = target.floor() as usize;
        if rows.saturating_mul(columns) > slice_count {
            return Search { grid: Grid { rows, columns }, converged: true };
        }

        columns = target.ceil() as usize;
        if rows.saturating_mul(columns) > slice_count {
            return Search { grid: Grid { rows, columns }, converged: true };
        }

        rows += 1;
    }

    // Rows was bumped once more after the last failed ceiling check
    Search { grid: Grid { rows, columns }, converged: false }
}

/// Compute the mosaic grid for `slice_count` slices at `aspect_ratio`
///
/// # Arguments
/// * `aspect_ratio` - Figure width / height, must be finite and positive
/// * `slice_count` - Number of slices to place, must be positive
///
/// # Returns
/// The first grid found by the floor/ceiling row search. Fails with
/// `LayoutExhausted` if no candidate covers the slices within
/// `MAX_LAYOUT_ITERATIONS` rows.
pub fn grid_layout(aspect_ratio: f64, slice_count: usize) -> QcResult<Grid> {
    validate(aspect_ratio, slice_count)?;

    let Search { grid, converged } = search(aspect_ratio, slice_count);
    if !converged {
        warn!(aspect_ratio, slice_count, rows = grid.rows, columns = grid.columns,
            "grid layout search exhausted");
        return Err(QcError::LayoutExhausted {
            rows: grid.rows,
            columns: grid.columns,
            slice_count,
        });
    }

    debug!(aspect_ratio, slice_count, rows = grid.rows, columns = grid.columns, "grid layout");
    Ok(grid)
}

/// Like [`grid_layout`], but returns the last candidate when the search
/// runs out of iterations instead of failing.
///
/// The returned grid is not re-checked, so it may hold fewer cells than
/// `slice_count`; use [`Grid::covers`] before placing slices into it.
pub fn grid_layout_lenient(aspect_ratio: f64, slice_count: usize) -> QcResult<Grid> {
    validate(aspect_ratio, slice_count)?;
    Ok(search(aspect_ratio, slice_count).grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4_LANDSCAPE: f64 = 11.7 / 8.3;

    #[test]
    fn test_a4_thirty_slices() {
        // rows=5: floor(7.048) = 7, 35 > 30
        let grid = grid_layout(A4_LANDSCAPE, 30).unwrap();
        assert_eq!(grid, Grid { rows: 5, columns: 7 });
    }

    #[test]
    fn test_ceiling_used_when_floor_falls_short() {
        // rows=4: floor gives 4x5 = 20 (not > 20), ceiling gives 4x6
        let grid = grid_layout(A4_LANDSCAPE, 20).unwrap();
        assert_eq!(grid, Grid { rows: 4, columns: 6 });
    }

    #[test]
    fn test_floor_preferred_over_ceiling() {
        // rows=1 with ratio 2.5: floor 2 already exceeds a single slice
        let grid = grid_layout(2.5, 1).unwrap();
        assert_eq!(grid, Grid { rows: 1, columns: 2 });
    }

    #[test]
    fn test_single_slice_square_ratio() {
        // Capacity must strictly exceed the count, so 1x1 is never chosen
        let grid = grid_layout(1.0, 1).unwrap();
        assert_eq!(grid, Grid { rows: 2, columns: 2 });
    }

    #[test]
    fn test_single_slice_wide_ratio_stays_on_one_row() {
        for &ratio in &[1.2, A4_LANDSCAPE, 2.0, 7.9] {
            let grid = grid_layout(ratio, 1).unwrap();
            assert_eq!(grid.rows, 1, "ratio {}", ratio);
            assert!(grid.columns >= 1);
        }
    }

    #[test]
    fn test_portrait_ratio() {
        // rows=5: floor(3.547)=3 -> 15 (not > 16), ceil 4 -> 20
        let grid = grid_layout(8.3 / 11.7, 16).unwrap();
        assert_eq!(grid, Grid { rows: 5, columns: 4 });
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(grid_layout(0.0, 10), Err(QcError::InvalidLayoutInput { .. })));
        assert!(matches!(grid_layout(-1.0, 10), Err(QcError::InvalidLayoutInput { .. })));
        assert!(matches!(grid_layout(f64::NAN, 10), Err(QcError::InvalidLayoutInput { .. })));
        assert!(matches!(grid_layout(f64::INFINITY, 10), Err(QcError::InvalidLayoutInput { .. })));
        assert!(matches!(grid_layout(1.0, 0), Err(QcError::InvalidLayoutInput { .. })));
        assert!(matches!(grid_layout_lenient(1.0, 0), Err(QcError::InvalidLayoutInput { .. })));
    }

    #[test]
    fn test_exhausted_search_is_an_error() {
        // ceil(0.001 * rows) stays at 1, so at most 100 cells are ever offered
        match grid_layout(0.001, 1000) {
            Err(QcError::LayoutExhausted { rows, columns, slice_count }) => {
                assert_eq!(rows, 101);
                assert_eq!(columns, 1);
                assert_eq!(slice_count, 1000);
            }
            other => panic!("expected LayoutExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_returns_uncovering_candidate() {
        let grid = grid_layout_lenient(0.001, 1000).unwrap();
        assert_eq!(grid, Grid { rows: 101, columns: 1 });
        assert!(!grid.covers(1000), "lenient result is not re-checked");
    }

    #[test]
    fn test_lenient_matches_strict_when_converged() {
        for n in 1..200 {
            assert_eq!(
                grid_layout_lenient(A4_LANDSCAPE, n).unwrap(),
                grid_layout(A4_LANDSCAPE, n).unwrap()
            );
        }
    }

    #[test]
    fn test_cell_position_row_major() {
        let grid = Grid { rows: 2, columns: 3 };
        assert_eq!(grid.cell_position(0), (0, 0));
        assert_eq!(grid.cell_position(2), (0, 2));
        assert_eq!(grid.cell_position(3), (1, 0));
        assert_eq!(grid.cell_position(5), (1, 2));
        assert_eq!(grid.capacity(), 6);
    }
}
