//! Build the QC figures for one subject and summarise them
//!
//! Usage: cargo run --example qc_report -- <volume.nii[.gz]> [mask.nii[.gz]] [config.json]
//!
//! Without a mask only the mosaic is built. With a mask, the mask is
//! overlaid on the mosaic and a distribution figure is built against a
//! reference made from the per-slice medians of the same volume.

use std::path::{Path, PathBuf};
use std::time::Instant;

use qc_core::config::QcConfig;
use qc_core::logging::init_logging;
use qc_core::nifti_io::read_nifti_file;
use qc_core::utils::stats::median;
use qc_core::{extract_masked_values, render_distribution, render_mosaic, Figure, QcError, Volume, VolumeInput};

fn summarise(name: &str, fig: &Figure) {
    println!("[INFO] {}: {}x{} grid, {} of {} cells populated, {:.1}x{:.1} in",
        name, fig.grid.rows, fig.grid.columns, fig.populated_count(), fig.cell_count(),
        fig.size.0, fig.size.1);
    if let Some(title) = &fig.title {
        println!("[INFO]   title: {}", title.text);
    }
    for cell in fig.axes.iter().filter(|a| a.histogram.is_some() || !a.vlines.is_empty()) {
        if let Some(h) = &cell.histogram {
            println!("[INFO]   histogram: {} bins, {} values", h.bins(), h.total());
        }
        for line in &cell.vlines {
            println!("[INFO]   marker at {}", line.label);
        }
    }
}

/// Medians of each slice inside the mask, skipping empty slices
fn slice_medians(volume: &Volume, mask: &Volume) -> Result<Vec<f64>, QcError> {
    let (nx, ny, nz) = volume.dims();
    let mut medians = Vec::new();
    for k in 0..nz {
        let slab = |v: &Volume| Volume::from_fn((nx, ny, 1), |i, j, _| v.get(i, j, k));
        let values = extract_masked_values(&slab(volume)?, &slab(mask)?)?;
        if !values.is_empty() {
            medians.push(median(&values)?);
        }
    }
    Ok(medians)
}

fn main() -> Result<(), QcError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(volume_path) = args.first().map(PathBuf::from) else {
        eprintln!("usage: qc_report <volume> [mask] [config.json]");
        std::process::exit(2);
    };
    let mask_path = args.get(1).map(PathBuf::from);
    let config = match args.get(2) {
        Some(p) => QcConfig::from_file(Path::new(p))?,
        None => QcConfig::default(),
    };
    init_logging(&config.logging);

    let start = Instant::now();
    let mut mosaic_config = config.mosaic_config();
    if let Some(mask) = &mask_path {
        mosaic_config = mosaic_config.with_overlay(mask.as_path());
    }
    let mosaic = render_mosaic(&VolumeInput::from(volume_path.as_path()), &mosaic_config)?;
    summarise("mosaic", &mosaic);

    if let Some(mask) = &mask_path {
        let volume = read_nifti_file(&volume_path)?;
        let mask_volume = read_nifti_file(mask)?;
        let reference = slice_medians(&volume, &mask_volume)?;

        let dist_config = config
            .distribution_config("intensity")
            .with_reference(reference, "per-slice median intensity");
        let dist = render_distribution(&volume.into(), &mask_volume.into(), &dist_config)?;
        summarise("distribution", &dist);
    }

    println!("[INFO] Done in {:.2?}", start.elapsed());
    Ok(())
}
