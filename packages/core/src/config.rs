//! Editor configuration
//!
//! Canvas size, hit-test tolerances, flash timing and the render palette.
//! Stored as JSON in the user's config directory; every field has a default
//! so partial files load.

use crate::color::Color;
use crate::error::{CueError, CueResult};
use crate::locator::{FLASH_WINDOW_SECS, HOVER_TOLERANCE_PX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Colors used by the waveform renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Color,
    pub waveform: Color,
    pub playhead: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::BACKGROUND,
            waveform: Color::ACCENT,
            playhead: Color::PLAYHEAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Waveform surface width in pixels
    pub canvas_width: u32,
    /// Waveform surface height in pixels
    pub canvas_height: u32,
    /// Pointer hit tolerance for hover and click
    pub hover_tolerance_px: f64,
    /// How close the playhead must be to a cue to flash the time display
    pub flash_window_secs: f64,
    /// How long the time display stays highlighted
    pub flash_duration_ms: u64,
    pub marker_width: f64,
    pub playhead_width: f64,
    pub palette: Palette,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1000,
            canvas_height: 160,
            hover_tolerance_px: HOVER_TOLERANCE_PX,
            flash_window_secs: FLASH_WINDOW_SECS,
            flash_duration_ms: 200,
            marker_width: 2.0,
            playhead_width: 2.0,
            palette: Palette::default(),
        }
    }
}

impl EditorConfig {
    /// `<config dir>/cuepoints/config.json`, or a temp dir fallback
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("app", "cuepoints", "Cuepoints")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("cuepoints"))
            .join("config.json")
    }

    pub fn load(path: &Path) -> CueResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> CueResult<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> CueResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> CueResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(CueError::InvalidDimensions(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }

        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.hover_tolerance_px)
            || !positive(self.flash_window_secs)
            || !positive(self.marker_width)
            || !positive(self.playhead_width)
        {
            return Err(CueError::InvalidDimensions(
                "tolerances and line widths must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.hover_tolerance_px, 5.0);
        assert_eq!(config.flash_window_secs, 0.1);
        assert_eq!(config.flash_duration(), Duration::from_millis(200));
        assert_eq!(config.palette.background.to_hex(), "#051019");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = EditorConfig::default();
        config.canvas_width = 640;
        config.palette.playhead = Color::rgb(255, 0, 0);
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = r##"{"canvas_height": 90, "palette": {"waveform": "#fff"}}"##;
        std::fs::write(&path, json).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded.canvas_height, 90);
        assert_eq!(loaded.canvas_width, 1000);
        assert_eq!(loaded.palette.waveform, Color::rgb(255, 255, 255));
        assert_eq!(loaded.palette.background, Color::BACKGROUND);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = EditorConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, EditorConfig::default());
    }

    #[test]
    fn test_validation() {
        let mut config = EditorConfig::default();
        config.canvas_width = 0;
        assert!(config.validate().is_err());

        let mut config = EditorConfig::default();
        config.hover_tolerance_px = -1.0;
        assert!(matches!(
            config.validate(),
            Err(CueError::InvalidDimensions(_))
        ));
    }
}
