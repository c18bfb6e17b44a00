//! Viewer configuration
//!
//! Everything the processor needs is passed in through [`ViewerConfig`] at
//! construction time; there are no ambient lookups. The struct round-trips
//! through JSON so a host application can persist it alongside its other
//! settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{Color4, DEFAULT_PALETTE_HEX};
use crate::error::{Result, ViewerError};

/// Requested quality level: an explicit tier 1 (weakest device) through 5,
/// or `Max` to force full-detail surface rendering with no decimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Level(u8),
    Max,
}

impl Default for QualityTier {
    fn default() -> Self {
        QualityTier::Level(3)
    }
}

impl QualityTier {
    /// Validate a tier level (1-5).
    pub fn validate(self) -> Result<Self> {
        match self {
            QualityTier::Level(level) if !(1..=5).contains(&level) => {
                Err(ViewerError::InvalidTier { tier: level })
            }
            other => Ok(other),
        }
    }
}

/// How emitted segments are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Fixed per-extruder palette, updated by `T` and `M567`.
    #[default]
    Tool,
    /// Gradient between the min-feed and max-feed colors, recomputed on
    /// every `F` word. Suppresses `T`/`M567` recoloring.
    FeedRate,
}

/// Viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Up to 5 extruder colors as hex strings; extras are ignored.
    pub extruder_colors: Vec<String>,
    /// Color applied to primitives behind the progress cursor.
    pub progress_color: String,
    /// Gradient endpoint for the slowest feed rate seen.
    pub min_feed_color: String,
    /// Gradient endpoint for the fastest feed rate seen.
    pub max_feed_color: String,
    pub quality_tier: QualityTier,
    pub color_mode: ColorMode,
    /// Look-ahead window for live tracking, in file bytes.
    pub lookahead_bytes: u64,
    /// Render untracked primitives ghosted instead of hidden.
    pub show_solid_while_tracking: bool,
    /// Alpha used for ghosted primitives when tracking solid.
    pub solid_transparency: f32,
    /// Collect non-extruding moves into the travel list.
    pub render_travels: bool,
    /// Extrusions shorter than this (mm) are not rendered.
    pub min_segment_length: f32,
    /// Override the per-chunk segment limit; `None` uses the default.
    pub mesh_break_point: Option<usize>,
    /// Marker file armed during a load and cleared on success. A surviving
    /// marker forces tier 1 on the next load.
    pub failed_load_marker: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            extruder_colors: DEFAULT_PALETTE_HEX.iter().map(|s| s.to_string()).collect(),
            progress_color: "#FFFFFF".to_string(),
            min_feed_color: "#0000FF".to_string(),
            max_feed_color: "#FF0000".to_string(),
            quality_tier: QualityTier::default(),
            color_mode: ColorMode::default(),
            lookahead_bytes: 450,
            show_solid_while_tracking: false,
            solid_transparency: 0.2,
            render_travels: false,
            min_segment_length: 0.05,
            mesh_break_point: None,
            failed_load_marker: None,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check that all colors parse and numeric fields are in range.
    pub fn validate(&self) -> Result<()> {
        if self.extruder_colors.is_empty() {
            return Err(ViewerError::InvalidConfig(
                "extruder_colors must not be empty".to_string(),
            ));
        }
        for color in &self.extruder_colors {
            Color4::from_hex(color)?;
        }
        Color4::from_hex(&self.progress_color)?;
        Color4::from_hex(&self.min_feed_color)?;
        Color4::from_hex(&self.max_feed_color)?;
        self.quality_tier.validate()?;
        if self.min_segment_length < 0.0 {
            return Err(ViewerError::InvalidConfig(
                "min_segment_length must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.solid_transparency) {
            return Err(ViewerError::InvalidConfig(
                "solid_transparency must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolved extruder palette, truncated to the 5 supported slots.
    pub fn palette(&self) -> Result<Vec<Color4>> {
        self.extruder_colors
            .iter()
            .take(5)
            .map(|hex| Color4::from_hex(hex))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        ViewerConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_empty_palette() {
        let config = ViewerConfig {
            extruder_colors: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_tier() {
        assert!(QualityTier::Level(0).validate().is_err());
        assert!(QualityTier::Level(6).validate().is_err());
        assert!(QualityTier::Level(5).validate().is_ok());
        assert!(QualityTier::Max.validate().is_ok());
    }

    #[test]
    fn palette_truncates_to_five_entries() {
        let config = ViewerConfig {
            extruder_colors: vec!["#112233".to_string(); 7],
            ..Default::default()
        };
        assert_eq!(config.palette().unwrap().len(), 5);
    }
}
