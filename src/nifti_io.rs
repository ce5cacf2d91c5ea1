//! NIfTI volume I/O
//!
//! Loads `.nii` and `.nii.gz` files (gzip is auto-detected) into a
//! [`Volume`]. Only the first volume of 4D (or higher) data is kept. Writing is
//! limited to uncompressed or gzipped float32 NIfTI-1 with an identity
//! affine, which is enough to produce fixtures for a QC pipeline.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array;
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiObject};
use tracing::debug;

use crate::error::{QcError, QcResult};
use crate::volume::Volume;

const HEADER_SIZE: usize = 348;
const VOX_OFFSET: usize = 352;

/// Check if bytes are gzip compressed
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Summarise the raw header for error messages
fn header_summary(bytes: &[u8]) -> String {
    if bytes.len() < HEADER_SIZE {
        return format!("file too small ({} bytes, need at least {})", bytes.len(), HEADER_SIZE);
    }

    let sizeof_hdr = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let magic = String::from_utf8_lossy(&bytes[344..348]).to_string();
    let datatype = i16::from_le_bytes([bytes[70], bytes[71]]);

    format!("sizeof_hdr={}, magic='{}', datatype={}", sizeof_hdr, magic, datatype)
}

fn read_object(bytes: &[u8]) -> QcResult<InMemNiftiObject> {
    if is_gzip(bytes) {
        InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes))).map_err(|e| {
            let mut decompressed = Vec::new();
            let info = match GzDecoder::new(Cursor::new(bytes)).read_to_end(&mut decompressed) {
                Ok(_) => header_summary(&decompressed),
                Err(_) => "could not decompress".to_string(),
            };
            QcError::Nifti(format!("failed to read gzipped NIfTI: {} ({})", e, info))
        })
    } else {
        InMemNiftiObject::from_reader(Cursor::new(bytes)).map_err(|e| {
            QcError::Nifti(format!("failed to read NIfTI: {} ({})", e, header_summary(bytes)))
        })
    }
}

/// Load a NIfTI volume from bytes
pub fn load_nifti(bytes: &[u8]) -> QcResult<Volume> {
    let obj = read_object(bytes)?;

    let ndim = obj.header().dim[0] as usize;
    if ndim < 3 {
        return Err(QcError::Nifti(format!("expected at least a 3D volume, got {}D", ndim)));
    }

    let array: Array<f64, _> = obj
        .into_volume()
        .into_ndarray()
        .map_err(|e| QcError::Nifti(format!("failed to convert to ndarray: {}", e)))?;

    let shape = array.shape().to_vec();
    if shape.len() < 3 {
        return Err(QcError::Nifti(format!("expected at least a 3D array, got {}D", shape.len())));
    }

    // Use the array's own shape, nifti-rs may reorder relative to the header
    let (nx, ny, nz) = (shape[0], shape[1], shape[2]);
    // Index 0 on every axis past the third, whatever the rank
    let mut index = vec![0usize; shape.len()];
    let mut data = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                index[0] = i;
                index[1] = j;
                index[2] = k;
                data.push(array[index.as_slice()]);
            }
        }
    }

    debug!(nx, ny, nz, "loaded NIfTI volume");
    Volume::new(data, (nx, ny, nz))
}

/// Read a NIfTI volume from a filesystem path
pub fn read_nifti_file(path: &Path) -> QcResult<Volume> {
    let bytes = std::fs::read(path).map_err(|e| QcError::io(path, e))?;
    load_nifti(&bytes)
}

/// Encode a volume as uncompressed float32 NIfTI-1 bytes
pub fn save_nifti(volume: &Volume) -> QcResult<Vec<u8>> {
    let (nx, ny, nz) = volume.dims();
    let too_large = |n: usize| i16::try_from(n).is_err();
    if too_large(nx) || too_large(ny) || too_large(nz) {
        return Err(QcError::Nifti(format!(
            "{}x{}x{} exceeds the NIfTI-1 dimension limit", nx, ny, nz
        )));
    }

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());

    let dim: [i16; 8] = [3, nx as i16, ny as i16, nz as i16, 1, 1, 1, 1];
    for (i, d) in dim.iter().enumerate() {
        let offset = 40 + i * 2;
        header[offset..offset + 2].copy_from_slice(&d.to_le_bytes());
    }

    // datatype = FLOAT32, bitpix = 32
    header[70..72].copy_from_slice(&16i16.to_le_bytes());
    header[72..74].copy_from_slice(&32i16.to_le_bytes());

    for i in 0..8 {
        let offset = 76 + i * 4;
        header[offset..offset + 4].copy_from_slice(&1.0f32.to_le_bytes());
    }

    header[108..112].copy_from_slice(&(VOX_OFFSET as f32).to_le_bytes());
    header[112..116].copy_from_slice(&1.0f32.to_le_bytes());

    // sform_code = 1 with an identity affine
    header[254..256].copy_from_slice(&1i16.to_le_bytes());
    for row in 0..3 {
        let offset = 280 + row * 16 + row * 4;
        header[offset..offset + 4].copy_from_slice(&1.0f32.to_le_bytes());
    }

    header[344..348].copy_from_slice(b"n+1\0");

    let mut buffer = Vec::with_capacity(VOX_OFFSET + volume.len() * 4);
    buffer.extend_from_slice(&header);
    buffer.extend_from_slice(&[0u8; VOX_OFFSET - HEADER_SIZE]);
    for &val in volume.data() {
        buffer.extend_from_slice(&(val as f32).to_le_bytes());
    }

    Ok(buffer)
}

/// Encode a volume as gzipped NIfTI-1 bytes (.nii.gz)
pub fn save_nifti_gz(volume: &Volume) -> QcResult<Vec<u8>> {
    let uncompressed = save_nifti(volume)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&uncompressed)
        .map_err(|e| QcError::Nifti(format!("gzip compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| QcError::Nifti(format!("gzip finish failed: {}", e)))
}

/// Save a volume to disk, gzipping when the path ends with `.nii.gz`
pub fn save_nifti_to_file(path: &Path, volume: &Volume) -> QcResult<()> {
    let bytes = if path.to_string_lossy().ends_with(".nii.gz") {
        save_nifti_gz(volume)?
    } else {
        save_nifti(volume)?
    };

    std::fs::write(path, bytes).map_err(|e| QcError::io(path, e))
}
