//! Population reference distributions
//!
//! Builds the per-subject medians that serve as the reference
//! distribution in a [`crate::distribution`] plot.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{QcError, QcResult};
use crate::source::{NiftiLoader, VolumeLoader};
use crate::utils::mask::extract_masked_values;
use crate::utils::stats::median;
use crate::volume::Volume;

fn subject_median(index: usize, volume: &Volume, mask: &Volume) -> QcResult<f64> {
    let values = extract_masked_values(volume, mask)?;
    if values.is_empty() {
        return Err(QcError::EmptySelection(format!(
            "subject {} has no present voxels inside its mask", index
        )));
    }
    let m = median(&values)?;
    debug!(subject = index, voxels = values.len(), median = m, "subject median");
    Ok(m)
}

/// Median of the in-mask values of each (volume, mask) pair
///
/// # Returns
/// One median per pair, in input order. Fails on the first pair whose
/// shapes disagree or whose mask selects nothing; the error names the
/// pair's index.
pub fn median_per_subject<'a, I>(pairs: I) -> QcResult<Vec<f64>>
where
    I: IntoIterator<Item = (&'a Volume, &'a Volume)>,
{
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, (volume, mask))| subject_median(i, volume, mask))
        .collect()
}

/// Per-subject medians from NIfTI files
pub fn median_distribution_from_files<P: AsRef<Path>>(volumes: &[P], masks: &[P]) -> QcResult<Vec<f64>> {
    median_distribution_with(volumes, masks, &NiftiLoader)
}

/// Per-subject medians from paired volume and mask paths
///
/// Each pair is loaded, reduced to its median and dropped before the next
/// one is read. The two lists must have the same length.
pub fn median_distribution_with<P, L>(volumes: &[P], masks: &[P], loader: &L) -> QcResult<Vec<f64>>
where
    P: AsRef<Path>,
    L: VolumeLoader + ?Sized,
{
    if volumes.len() != masks.len() {
        return Err(QcError::ShapeMismatch {
            expected: vec![volumes.len()],
            actual: vec![masks.len()],
        });
    }

    let medians = volumes
        .iter()
        .zip(masks)
        .enumerate()
        .map(|(i, (v, m))| {
            let volume = loader.load(v.as_ref())?;
            let mask = loader.load(m.as_ref())?;
            subject_median(i, &volume, &mask)
        })
        .collect::<QcResult<Vec<f64>>>()?;

    info!(subjects = medians.len(), "built median distribution");
    Ok(medians)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct MapLoader(HashMap<PathBuf, Volume>);

    impl VolumeLoader for MapLoader {
        fn load(&self, path: &Path) -> QcResult<Volume> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| QcError::Nifti(format!("no fixture for {}", path.display())))
        }
    }

    fn column(values: &[f64]) -> Volume {
        Volume::new(values.to_vec(), (values.len(), 1, 1)).unwrap()
    }

    #[test]
    fn test_medians_in_input_order() {
        let v1 = column(&[1.0, 2.0, 3.0, 100.0]);
        let m1 = column(&[1.0, 1.0, 1.0, 0.0]);
        let v2 = column(&[10.0, 20.0, f64::NAN, 40.0]);
        let m2 = column(&[1.0, 1.0, 1.0, 1.0]);

        let medians = median_per_subject([(&v1, &m1), (&v2, &m2)]).unwrap();
        assert_eq!(medians, vec![2.0, 20.0]);

        for (vol, mask, got) in [(&v1, &m1, medians[0]), (&v2, &m2, medians[1])] {
            let expected = median(&extract_masked_values(vol, mask).unwrap()).unwrap();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_empty_mask_names_subject() {
        let v = column(&[1.0, 2.0]);
        let full = column(&[1.0, 1.0]);
        let empty = column(&[0.0, 0.0]);

        match median_per_subject([(&v, &full), (&v, &empty)]) {
            Err(QcError::EmptySelection(msg)) => assert!(msg.contains("subject 1"), "{}", msg),
            other => panic!("expected EmptySelection, got {:?}", other),
        }
    }

    #[test]
    fn test_no_subjects() {
        let medians = median_per_subject(std::iter::empty()).unwrap();
        assert!(medians.is_empty());
    }

    #[test]
    fn test_from_paths_with_loader() {
        let mut fixtures = HashMap::new();
        fixtures.insert(PathBuf::from("a.nii"), column(&[4.0, 5.0, 6.0]));
        fixtures.insert(PathBuf::from("b.nii"), column(&[7.0, 8.0, 9.0]));
        fixtures.insert(PathBuf::from("mask.nii"), column(&[1.0, 1.0, 0.0]));
        let loader = MapLoader(fixtures);

        let medians = median_distribution_with(
            &["a.nii", "b.nii"],
            &["mask.nii", "mask.nii"],
            &loader,
        )
        .unwrap();
        assert_eq!(medians, vec![4.5, 7.5]);
    }

    #[test]
    fn test_unpaired_lists() {
        let loader = MapLoader(HashMap::new());
        let result = median_distribution_with(&["a.nii", "b.nii"], &["m.nii"], &loader);
        assert!(matches!(result, Err(QcError::ShapeMismatch { .. })));
    }
}
