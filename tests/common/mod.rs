//! Common fixtures for QC-core integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use qc_core::nifti_io::save_nifti_to_file;
use qc_core::Volume;

/// Binary sphere mask, 1.0 within `radius` voxels of `center`
pub fn sphere_mask(dims: (usize, usize, usize), center: (f64, f64, f64), radius: f64) -> Volume {
    let r2 = radius * radius;
    Volume::from_fn(dims, |i, j, k| {
        let dx = i as f64 - center.0;
        let dy = j as f64 - center.1;
        let dz = k as f64 - center.2;
        if dx * dx + dy * dy + dz * dz <= r2 { 1.0 } else { 0.0 }
    })
    .unwrap()
}

/// Brain-like phantom: bright sphere on a dim background, NaN in the
/// first and last x columns to mimic voxels outside the acquisition
pub fn phantom(dims: (usize, usize, usize)) -> Volume {
    let center = (dims.0 as f64 / 2.0, dims.1 as f64 / 2.0, dims.2 as f64 / 2.0);
    let radius = dims.0.min(dims.1).min(dims.2) as f64 / 3.0;
    let inside = sphere_mask(dims, center, radius);
    Volume::from_fn(dims, |i, j, k| {
        if i == 0 || i == dims.0 - 1 {
            f64::NAN
        } else if inside.get(i, j, k) > 0.0 {
            100.0 + (i + j + k) as f64
        } else {
            5.0 + ((i * 7 + j * 3 + k) % 5) as f64
        }
    })
    .unwrap()
}

/// Write `volume` as NIfTI under `dir` and return its path
pub fn write_volume(dir: &Path, name: &str, volume: &Volume) -> PathBuf {
    let path = dir.join(name);
    save_nifti_to_file(&path, volume).unwrap();
    path
}

/// Volume of shape (n, 1, 1) holding `values`
pub fn column(values: &[f64]) -> Volume {
    Volume::new(values.to_vec(), (values.len(), 1, 1)).unwrap()
}
