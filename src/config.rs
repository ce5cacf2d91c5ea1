//! Pipeline-level configuration
//!
//! The serialisable part of the renderer options, so a QC pipeline can keep
//! its figure settings in a JSON file. Missing keys fall back to the same
//! defaults as [`MosaicConfig::default`] and [`DistributionConfig::new`].
//!
//! ```json
//! {
//!   "mosaic": { "figure_size": [11.7, 8.3], "title_band": 0.15 },
//!   "distribution": { "bins": 100, "reference_label": "median across subjects" },
//!   "logging": { "level": "info" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distribution::{DistributionConfig, SAMPLE_BINS};
use crate::error::{QcError, QcResult};
use crate::figure::A4_LANDSCAPE;
use crate::logging::LogConfig;
use crate::mosaic::{MosaicConfig, TITLE_BAND};

/// Mosaic settings that can live in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicSettings {
    pub figure_size: (f64, f64),
    pub title_band: f64,
}

impl Default for MosaicSettings {
    fn default() -> Self {
        MosaicSettings { figure_size: A4_LANDSCAPE, title_band: TITLE_BAND }
    }
}

/// Distribution settings that can live in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSettings {
    pub figure_size: (f64, f64),
    pub bins: usize,
    pub reference_label: Option<String>,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        DistributionSettings { figure_size: A4_LANDSCAPE, bins: SAMPLE_BINS, reference_label: None }
    }
}

/// All QC figure settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub mosaic: MosaicSettings,
    pub distribution: DistributionSettings,
    pub logging: LogConfig,
}

fn positive_size((w, h): (f64, f64), what: &str) -> QcResult<()> {
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(QcError::Config(format!("{} figure_size must be positive, got ({}, {})", what, w, h)));
    }
    Ok(())
}

impl QcConfig {
    pub fn from_json_str(json: &str) -> QcResult<Self> {
        let config: QcConfig = serde_json::from_str(json).map_err(|e| QcError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> QcResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| QcError::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> QcResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| QcError::Config(e.to_string()))
    }

    /// Check sizes, band and bin count
    pub fn validate(&self) -> QcResult<()> {
        positive_size(self.mosaic.figure_size, "mosaic")?;
        positive_size(self.distribution.figure_size, "distribution")?;
        if !(0.0..1.0).contains(&self.mosaic.title_band) {
            return Err(QcError::Config(format!(
                "title_band must be in [0, 1), got {}", self.mosaic.title_band
            )));
        }
        if self.distribution.bins == 0 {
            return Err(QcError::Config("distribution bins must be positive".to_string()));
        }
        Ok(())
    }

    /// Mosaic options without a title or overlay
    pub fn mosaic_config(&self) -> MosaicConfig {
        MosaicConfig {
            figure_size: self.mosaic.figure_size,
            title_band: self.mosaic.title_band,
            ..MosaicConfig::default()
        }
    }

    /// Distribution options for a sample, without a reference
    pub fn distribution_config(&self, sample_label: impl Into<String>) -> DistributionConfig {
        DistributionConfig {
            figure_size: self.distribution.figure_size,
            bins: self.distribution.bins,
            reference_label: self.distribution.reference_label.clone(),
            ..DistributionConfig::new(sample_label)
        }
    }
}
