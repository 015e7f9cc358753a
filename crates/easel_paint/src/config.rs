//! Sketch configuration (`easel.toml`)
//!
//! Every field is optional in the file; missing values fall back to the
//! defaults below.

use std::fs;
use std::path::Path;

use easel_core::Style;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for a [`Sketch`](crate::Sketch)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SketchConfig {
    /// Surface width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Surface height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Segments per ellipse, arc and curve
    #[serde(default = "default_sides")]
    pub sides: u32,
    /// Triangle count at which vertex transforms take the SIMD path
    #[serde(default = "default_simd_threshold")]
    pub simd_threshold: usize,
    /// Vertices reserved up front by the batch renderer
    #[serde(default = "default_vertex_capacity")]
    pub initial_vertex_capacity: usize,
    /// Run the draw closure every frame
    #[serde(default = "default_true")]
    pub looping: bool,
    /// Knot exponent of the Catmull-Rom curve (0.5 is centripetal)
    #[serde(default = "default_catmull_rom_alpha")]
    pub catmull_rom_alpha: f32,
    /// Initial paint state
    #[serde(default)]
    pub style: Style,
}

fn default_width() -> u32 {
    300
}

fn default_height() -> u32 {
    300
}

fn default_sides() -> u32 {
    30
}

fn default_simd_threshold() -> usize {
    64
}

fn default_vertex_capacity() -> usize {
    1024
}

fn default_true() -> bool {
    true
}

fn default_catmull_rom_alpha() -> f32 {
    0.5
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            sides: default_sides(),
            simd_threshold: default_simd_threshold(),
            initial_vertex_capacity: default_vertex_capacity(),
            looping: true,
            catmull_rom_alpha: default_catmull_rom_alpha(),
            style: Style::default(),
        }
    }
}

impl SketchConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_sides(mut self, sides: u32) -> Self {
        self.sides = sides;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_simd_threshold(mut self, threshold: usize) -> Self {
        self.simd_threshold = threshold;
        self
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded sketch config");
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EaselError;
    use easel_core::{BlendMode, Color};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = SketchConfig::from_toml_str("").unwrap();
        assert_eq!(config, SketchConfig::default());
        assert_eq!(config.sides, 30);
        assert_eq!(config.simd_threshold, 64);
    }

    #[test]
    fn test_partial_file() {
        let config = SketchConfig::from_toml_str(
            r#"
            width = 800
            looping = false

            [style]
            blend_mode = "add"
            stroke_weight = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 300);
        assert!(!config.looping);
        assert_eq!(config.style.blend_mode, BlendMode::Add);
        assert_eq!(config.style.stroke_weight, 3.0);
        // unspecified style fields keep their defaults
        assert_eq!(config.style.fill, Color::WHITE);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SketchConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, EaselError::Config(_)));
    }

    #[test]
    fn test_to_toml_parses_back() {
        let config = SketchConfig::default().with_size(640, 480).with_sides(12);
        let text = config.to_toml().unwrap();
        assert_eq!(SketchConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SketchConfig::load("/nonexistent/easel.toml").unwrap_err();
        assert!(matches!(err, EaselError::Io(_)));
    }
}
