//! Mask utilities
//!
//! A voxel is in-mask when the mask value is strictly positive. NaN mask
//! values are never in-mask.

use tracing::debug;

use crate::error::QcResult;
use crate::volume::Volume;

/// Values of `volume` that are present (not NaN) and inside `mask`
///
/// # Arguments
/// * `volume` - Source intensities, may contain NaN for missing voxels
/// * `mask` - Mask with the same dimensions as `volume`
///
/// # Returns
/// In-mask values in voxel (Fortran) order. Fails with `ShapeMismatch`
/// if the dimensions differ. The result may be empty.
pub fn extract_masked_values(volume: &Volume, mask: &Volume) -> QcResult<Vec<f64>> {
    volume.ensure_same_shape(mask)?;

    let values: Vec<f64> = volume
        .data()
        .iter()
        .zip(mask.data())
        .filter(|&(v, &m)| !v.is_nan() && m > 0.0)
        .map(|(&v, _)| v)
        .collect();

    debug!(selected = values.len(), total = volume.len(), "extracted masked values");
    Ok(values)
}

/// 0/1 mask from an arbitrary-valued one
///
/// Strictly positive voxels become 1.0; zero, negative and NaN voxels
/// become 0.0, so the result is safe to draw as an overlay.
pub fn binary_mask(mask: &Volume) -> Volume {
    mask.map(|m| if m > 0.0 { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QcError;

    #[test]
    fn test_full_mask_selects_everything() {
        let vol = Volume::filled((4, 3, 2), 1.0).unwrap();
        let mask = Volume::filled((4, 3, 2), 1.0).unwrap();
        let values = extract_masked_values(&vol, &mask).unwrap();
        assert_eq!(values.len(), 24);
        assert!(values.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_zero_mask_selects_nothing() {
        let vol = Volume::filled((4, 3, 2), 1.0).unwrap();
        let mask = Volume::filled((4, 3, 2), 0.0).unwrap();
        assert!(extract_masked_values(&vol, &mask).unwrap().is_empty());
    }

    #[test]
    fn test_nan_and_nonpositive_mask_excluded() {
        let vol = Volume::new(vec![1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0], (3, 2, 1)).unwrap();
        let mask = Volume::new(vec![1.0, 1.0, -1.0, 0.5, f64::NAN, 2.0], (3, 2, 1)).unwrap();
        let values = extract_masked_values(&vol, &mask).unwrap();
        assert_eq!(values, vec![1.0, 4.0, 6.0]);
    }

    #[test]
    fn test_binary_mask() {
        let mask = Volume::new(vec![0.2, 0.0, -3.0, f64::NAN, 7.0, 1.0], (3, 2, 1)).unwrap();
        let binary = binary_mask(&mask);
        assert_eq!(binary.dims(), (3, 2, 1));
        assert_eq!(binary.data(), &[1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);

        // Selects exactly what the original mask selects
        let vol = Volume::from_fn((3, 2, 1), |i, j, _| (i + 3 * j) as f64).unwrap();
        assert_eq!(
            extract_masked_values(&vol, &binary).unwrap(),
            extract_masked_values(&vol, &mask).unwrap()
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let vol = Volume::filled((4, 3, 2), 1.0).unwrap();
        let mask = Volume::filled((3, 4, 2), 1.0).unwrap();
        assert!(matches!(
            extract_masked_values(&vol, &mask),
            Err(QcError::ShapeMismatch { .. })
        ));
    }
}
