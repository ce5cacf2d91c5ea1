//! Where volumes and their titles come from
//!
//! Renderers accept either an in-memory [`Volume`] or a path. Paths are
//! resolved through a [`VolumeLoader`], and default titles are built from
//! a [`FileMetadata`] provider, so both can be swapped for fakes in tests.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{QcError, QcResult};
use crate::nifti_io::read_nifti_file;
use crate::volume::Volume;

/// A volume given either directly or by file path
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeInput {
    Path(PathBuf),
    Memory(Volume),
}

impl VolumeInput {
    /// The source path, if the volume lives on disk
    pub fn path(&self) -> Option<&Path> {
        match self {
            VolumeInput::Path(p) => Some(p),
            VolumeInput::Memory(_) => None,
        }
    }

    /// Borrow the in-memory volume or load it through `loader`
    pub fn resolve<L: VolumeLoader + ?Sized>(&self, loader: &L) -> QcResult<Cow<'_, Volume>> {
        match self {
            VolumeInput::Memory(v) => Ok(Cow::Borrowed(v)),
            VolumeInput::Path(p) => loader.load(p).map(Cow::Owned),
        }
    }
}

impl From<Volume> for VolumeInput {
    fn from(v: Volume) -> Self {
        VolumeInput::Memory(v)
    }
}

impl From<PathBuf> for VolumeInput {
    fn from(p: PathBuf) -> Self {
        VolumeInput::Path(p)
    }
}

impl From<&Path> for VolumeInput {
    fn from(p: &Path) -> Self {
        VolumeInput::Path(p.to_path_buf())
    }
}

impl From<&str> for VolumeInput {
    fn from(p: &str) -> Self {
        VolumeInput::Path(PathBuf::from(p))
    }
}

/// Loads volumes from paths
pub trait VolumeLoader {
    fn load(&self, path: &Path) -> QcResult<Volume>;
}

/// Loads `.nii` / `.nii.gz` files
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiLoader;

impl VolumeLoader for NiftiLoader {
    fn load(&self, path: &Path) -> QcResult<Volume> {
        read_nifti_file(path)
    }
}

/// Display name and modification time of a file
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub modified: DateTime<Local>,
}

/// Looks up display metadata for a path
pub trait FileMetadata {
    fn describe(&self, path: &Path) -> QcResult<FileInfo>;
}

/// Reads metadata from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMetadata;

impl FileMetadata for FsMetadata {
    fn describe(&self, path: &Path) -> QcResult<FileInfo> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(QcError::MissingTitleSource)?;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| QcError::io(path, e))?;
        Ok(FileInfo { name, modified: DateTime::<Local>::from(modified) })
    }
}

/// Timestamp in C `ctime` layout, e.g. `Fri Jan  5 09:03:07 2024`
pub fn format_ctime(t: &DateTime<Local>) -> String {
    t.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// `"<file name> (last modified: <ctime>)"` for a path-backed input
///
/// Fails with `MissingTitleSource` for in-memory volumes.
pub fn default_title<M: FileMetadata + ?Sized>(input: &VolumeInput, metadata: &M) -> QcResult<String> {
    let path = input.path().ok_or(QcError::MissingTitleSource)?;
    let info = metadata.describe(path)?;
    Ok(format!("{} (last modified: {})", info.name, format_ctime(&info.modified)))
}
