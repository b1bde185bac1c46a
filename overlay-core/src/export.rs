//! Export of the composited scene.
//!
//! Rasterizing and downloading happen outside the core. The editor hands a
//! [`SceneExporter`] the live scene plus [`ExportOptions`]; the exporter
//! returns the encoded image or an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OverlayResult, Scene};

/// Prefix of generated export file names.
pub const EXPORT_FILENAME_PREFIX: &str = "story";

/// Encoded image format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossy JPEG.
    Jpeg,
}

impl ExportFormat {
    /// MIME type of the encoded image.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

/// Options passed to an exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality in `0.0..=1.0`. Ignored for PNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
    /// File name without extension.
    pub filename: String,
}

impl ExportOptions {
    /// Options for `format` with a timestamped file name.
    #[must_use]
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            quality: None,
            filename: export_filename(Utc::now()),
        }
    }

    /// Set the JPEG quality, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality.clamp(0.0, 1.0));
        self
    }

    /// Set the file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// File name including the format's extension.
    #[must_use]
    pub fn full_filename(&self) -> String {
        format!("{}.{}", self.filename, self.format.extension())
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(ExportFormat::Png)
    }
}

/// Timestamped export name, e.g. `story-2024-05-01T13-45-09`.
#[must_use]
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!(
        "{EXPORT_FILENAME_PREFIX}-{}",
        now.format("%Y-%m-%dT%H-%M-%S")
    )
}

/// An encoded export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedImage {
    /// MIME type of `data`.
    pub mime: String,
    /// File name including extension.
    pub filename: String,
    /// Encoded bytes or a data URL, as the exporter produces it.
    pub data: String,
}

/// Rasterizes a scene.
pub trait SceneExporter {
    /// Encode the scene.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OverlayError::Export`] if rendering or encoding fails.
    fn export(&self, scene: &Scene, options: &ExportOptions) -> OverlayResult<ExportedImage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_filename_format() {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 1, 13, 45, 9)
            .single()
            .expect("valid timestamp");
        assert_eq!(export_filename(now), "story-2024-05-01T13-45-09");
    }

    #[test]
    fn test_options() {
        let options = ExportOptions::new(ExportFormat::Jpeg)
            .with_quality(1.5)
            .with_filename("beach");
        assert_eq!(options.quality, Some(1.0));
        assert_eq!(options.full_filename(), "beach.jpeg");
        assert_eq!(options.format.mime(), "image/jpeg");
        assert!(ExportOptions::default().filename.starts_with("story-"));
    }
}
