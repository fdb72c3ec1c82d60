//! Configuration for drawing, brushes and the colour palette.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vstroke_math::Rgba;
use vstroke_ribbon::DEFAULT_MIN_SEGMENT_SIZE;

use crate::error::{Error, Result};

/// Upper bound on LOD levels; strides beyond `2^16` samples are pointless.
pub const MAX_LOD_LEVELS: u32 = 16;

/// How loaded drawings are turned into meshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSettings {
    /// Minimum distance between cross-sections at full detail.
    pub min_segment_size: f64,
    /// Number of LOD levels per stroke (at least 1).
    pub lod_levels: u32,
    /// Center the drawing horizontally on its average position.
    pub relative_placement: bool,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            min_segment_size: DEFAULT_MIN_SEGMENT_SIZE,
            lod_levels: 1,
            relative_placement: false,
        }
    }
}

impl DrawingSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_segment_size > 0.0 && self.min_segment_size.is_finite()) {
            return Err(Error::InvalidSettings(
                "min_segment_size must be a positive length".into(),
            ));
        }
        if self.lod_levels == 0 || self.lod_levels > MAX_LOD_LEVELS {
            return Err(Error::InvalidSettings(format!(
                "lod_levels must be between 1 and {}",
                MAX_LOD_LEVELS
            )));
        }
        Ok(())
    }
}

/// Live brush behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Stroke width at the smallest brush size.
    pub width_min: f64,
    /// Stroke width at the largest brush size.
    pub width_max: f64,
    /// Minimum distance between committed cross-sections while drawing.
    pub min_segment_size: f64,
    /// Palette positions per second at full colour input.
    pub colour_change_speed: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            width_min: 0.01,
            width_max: 0.10,
            min_segment_size: DEFAULT_MIN_SEGMENT_SIZE,
            colour_change_speed: 0.1,
        }
    }
}

impl BrushSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.width_min <= 0.0 || self.width_max < self.width_min {
            return Err(Error::InvalidSettings(
                "brush widths must satisfy 0 < width_min <= width_max".into(),
            ));
        }
        if !(self.min_segment_size > 0.0 && self.min_segment_size.is_finite()) {
            return Err(Error::InvalidSettings(
                "min_segment_size must be a positive length".into(),
            ));
        }
        if self.colour_change_speed < 0.0 {
            return Err(Error::InvalidSettings(
                "colour_change_speed must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Colour palette used for brushes and material lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    /// Gradient stops, evenly spaced and wrapping around.
    pub stops: Vec<Rgba>,
    /// Number of distinct material colours (4 to 256).
    pub distinct_colours: usize,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            stops: vec![
                Rgba::rgb(1.0, 0.0, 0.0),
                Rgba::rgb(1.0, 1.0, 0.0),
                Rgba::rgb(0.0, 1.0, 0.0),
                Rgba::rgb(0.0, 1.0, 1.0),
                Rgba::rgb(0.0, 0.0, 1.0),
                Rgba::rgb(1.0, 0.0, 1.0),
            ],
            distinct_colours: 64,
        }
    }
}

impl PaletteSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.stops.is_empty() {
            return Err(Error::InvalidSettings("palette needs at least one stop".into()));
        }
        if !(4..=256).contains(&self.distinct_colours) {
            return Err(Error::InvalidSettings(
                "distinct_colours must be between 4 and 256".into(),
            ));
        }
        Ok(())
    }
}

/// All settings, as read from a TOML file.
///
/// ```toml
/// [drawing]
/// lod_levels = 3
/// relative_placement = true
///
/// [brush]
/// width_max = 0.2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Loading and LOD generation.
    pub drawing: DrawingSettings,
    /// Live capture.
    pub brush: BrushSettings,
    /// Colours.
    pub palette: PaletteSettings,
}

impl Settings {
    /// Parse and validate settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.drawing.validate()?;
        self.brush.validate()?;
        self.palette.validate()
    }
}
