//! Error types for QC rendering

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for QC operations
pub type QcResult<T> = Result<T, QcError>;

/// Errors that can occur while laying out or rendering QC figures
#[derive(Error, Debug)]
pub enum QcError {
    /// Aspect ratio or slice count was not strictly positive
    #[error("grid layout needs a positive aspect ratio and slice count, got aspect_ratio={aspect_ratio}, slice_count={slice_count}")]
    InvalidLayoutInput { aspect_ratio: f64, slice_count: usize },

    /// The row search hit its iteration cap without covering every slice
    #[error("grid layout gave up at {rows}x{columns}, which cannot hold {slice_count} slices")]
    LayoutExhausted { rows: usize, columns: usize, slice_count: usize },

    /// The grid has more cells than a figure may hold
    #[error("grid layout {rows}x{columns} exceeds the limit of {limit} cells")]
    LayoutTooLarge { rows: usize, columns: usize, limit: usize },

    /// Volume and mask (or overlay) dimensions disagree
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    /// No voxels survived masking where a statistic was required
    #[error("empty selection: {0}")]
    EmptySelection(String),

    /// No explicit title and the volume did not come from a file
    #[error("no title given and the volume was not loaded from a file path")]
    MissingTitleSource,

    /// Reference distribution is absent or has no defined density
    #[error("undefined reference distribution: {0}")]
    UndefinedReference(String),

    /// Volume data is malformed (wrong length, zero-sized axis, ...)
    #[error("invalid volume: {0}")]
    InvalidVolume(String),

    /// NIfTI decoding or encoding failed
    #[error("NIfTI error: {0}")]
    Nifti(String),

    /// Filesystem access failed
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl QcError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QcError::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_contract() {
        let err = QcError::InvalidLayoutInput { aspect_ratio: 0.0, slice_count: 3 };
        assert!(err.to_string().contains("positive aspect ratio"));

        let err = QcError::ShapeMismatch { expected: vec![2, 2, 2], actual: vec![2, 2, 3] };
        assert_eq!(err.to_string(), "shape mismatch: expected [2, 2, 2], got [2, 2, 3]");
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = QcError::io("/tmp/missing.nii", io::Error::new(io::ErrorKind::NotFound, "gone"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.nii"), "{}", msg);
        assert!(msg.contains("gone"), "{}", msg);
    }
}
