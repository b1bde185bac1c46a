//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::document::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, MAX_CANVAS_HEIGHT, MAX_CANVAS_WIDTH,
};
use crate::object::MIN_SCALE;
use crate::style::{ControlVisibility, StylePreset};
use crate::{OverlayError, OverlayResult};

/// Tuning for the gesture state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pixels of vertical drag per 1.0 of scale change.
    pub scale_sensitivity: f32,
    /// Floor applied to every scale recomputation.
    pub min_scale: f32,
    /// Height of the delete zone along the bottom edge of the canvas.
    pub delete_zone_height: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            scale_sensitivity: 100.0,
            min_scale: MIN_SCALE,
            delete_zone_height: 100.0,
        }
    }
}

impl GestureConfig {
    /// Check that every value can drive a gesture.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`] for a non-positive or
    /// non-finite sensitivity, a non-finite scale floor, or a negative or
    /// non-finite delete zone height.
    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.scale_sensitivity.is_finite() && self.scale_sensitivity > 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "scale_sensitivity must be positive, got {}",
                self.scale_sensitivity
            )));
        }
        if !self.min_scale.is_finite() {
            return Err(OverlayError::InvalidConfig(format!(
                "min_scale must be finite, got {}",
                self.min_scale
            )));
        }
        if !(self.delete_zone_height.is_finite() && self.delete_zone_height >= 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "delete_zone_height must be non-negative, got {}",
                self.delete_zone_height
            )));
        }
        Ok(())
    }

    /// Return a copy the gesture machine can use as is.
    ///
    /// The scale floor is raised to the store's [`MIN_SCALE`] so a committed
    /// scale never differs from the live one. Values that fail
    /// [`validate`](Self::validate) fall back to their defaults.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.scale_sensitivity.is_finite() && self.scale_sensitivity > 0.0) {
            tracing::warn!(
                "Ignoring scale_sensitivity {}, using {}",
                self.scale_sensitivity,
                defaults.scale_sensitivity
            );
            self.scale_sensitivity = defaults.scale_sensitivity;
        }
        self.min_scale = if self.min_scale.is_finite() {
            self.min_scale.max(MIN_SCALE)
        } else {
            MIN_SCALE
        };
        if !(self.delete_zone_height.is_finite() && self.delete_zone_height >= 0.0) {
            self.delete_zone_height = defaults.delete_zone_height;
        }
        self
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Bounding box width a loaded photo is fitted into.
    pub max_canvas_width: u32,
    /// Bounding box height a loaded photo is fitted into.
    pub max_canvas_height: u32,
    /// Canvas width before a photo is loaded and after a clear.
    pub default_canvas_width: u32,
    /// Canvas height before a photo is loaded and after a clear.
    pub default_canvas_height: u32,
    /// Gesture tuning.
    pub gesture: GestureConfig,
    /// Selection affordance preset.
    pub style: StylePreset,
    /// Which selection handles are shown.
    pub control_visibility: ControlVisibility,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_canvas_width: MAX_CANVAS_WIDTH,
            max_canvas_height: MAX_CANVAS_HEIGHT,
            default_canvas_width: DEFAULT_CANVAS_WIDTH,
            default_canvas_height: DEFAULT_CANVAS_HEIGHT,
            gesture: GestureConfig::default(),
            style: StylePreset::Mobile,
            control_visibility: ControlVisibility::Minimal,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value fails
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidConfig`] for zero canvas dimensions or
    /// invalid gesture tuning.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.max_canvas_width == 0
            || self.max_canvas_height == 0
            || self.default_canvas_width == 0
            || self.default_canvas_height == 0
        {
            return Err(OverlayError::InvalidConfig(
                "canvas dimensions must be non-zero".to_string(),
            ));
        }
        self.gesture.validate()
    }
}
