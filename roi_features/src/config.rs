//! Processing configuration.
//!
//! [`Config`] is flat apart from the texture block. Values are validated with
//! [`Config::validate`] before a run; invalid values are programmer errors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::FeatureGate;

/// Quantization settings shared by the texture modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Number of grey levels intensities are binned into.
    pub grey_levels: u32,
    /// Pixel offset used for co-occurrence pairs.
    pub glcm_distance: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            grey_levels: 8,
            glcm_distance: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ------------------------------------------------------------------------
    // Reduction
    // ------------------------------------------------------------------------
    /// ROIs with more pixels than this get moments recomputed from their
    /// buffered pixels instead of the online recurrences.
    pub min_online_roi_size: usize,

    /// Dilation radius in pixels for neighbor detection.
    pub neighbor_radius: u32,

    // ------------------------------------------------------------------------
    // Streaming
    // ------------------------------------------------------------------------
    /// Upper bound on tiles decoded at the same time.
    pub max_tiles_in_flight: usize,

    // ------------------------------------------------------------------------
    // Features
    // ------------------------------------------------------------------------
    /// Feature names and `*GROUP*` tokens to enable.
    pub features: Vec<String>,

    pub texture: TextureConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_online_roi_size: 100,
            neighbor_radius: 5,
            max_tiles_in_flight: 8,
            features: vec!["*ALL*".to_string()],
            texture: TextureConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) {
        assert!(
            self.max_tiles_in_flight > 0,
            "max_tiles_in_flight must be positive, got {}",
            self.max_tiles_in_flight
        );
        assert!(
            (2..=256).contains(&self.texture.grey_levels),
            "texture.grey_levels must be in 2..=256, got {}",
            self.texture.grey_levels
        );
        assert!(
            self.texture.glcm_distance > 0,
            "texture.glcm_distance must be positive, got {}",
            self.texture.glcm_distance
        );
    }

    /// Loads a `.yaml`/`.yml`/`.json` file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = common::FileFormat::from_file_name(&path.to_string_lossy())?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            common::deserialize(&text, format).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), features = config.features.len(), "Loaded config");
        Ok(config)
    }

    pub fn feature_gate(&self) -> Result<FeatureGate, ConfigError> {
        Ok(FeatureGate::from_names(&self.features)?)
    }
}
