//! Image asset intake.
//!
//! Decoding and file reading belong to the host platform. The host hands
//! the editor an [`ImageAsset`] (or the error it hit) and this module
//! validates it before it becomes the document's base image.

use serde::{Deserialize, Serialize};

use crate::{BaseImage, OverlayError, OverlayResult};

/// MIME types accepted as a base photo.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A loaded image as reported by the host's loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Content handle (usually a data URL).
    pub src: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Original file name.
    pub name: String,
}

impl ImageAsset {
    /// Create an asset descriptor.
    #[must_use]
    pub fn new(src: impl Into<String>, width: u32, height: u32, name: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width,
            height,
            name: name.into(),
        }
    }

    /// Validate dimensions and convert into a [`BaseImage`].
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidImageDimensions`] if either side is zero.
    pub fn into_base_image(self) -> OverlayResult<BaseImage> {
        if self.width == 0 || self.height == 0 {
            return Err(OverlayError::InvalidImageDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(BaseImage::new(self.src, self.width, self.height))
    }
}

/// Whether `mime` is a supported photo type. Matching ignores ASCII case.
#[must_use]
pub fn is_supported_image_type(mime: &str) -> bool {
    SUPPORTED_IMAGE_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(mime.trim()))
}

/// Reject unsupported MIME types.
///
/// # Errors
///
/// Returns [`OverlayError::UnsupportedImageType`] for anything outside
/// [`SUPPORTED_IMAGE_TYPES`].
pub fn check_image_type(mime: &str) -> OverlayResult<()> {
    if is_supported_image_type(mime) {
        Ok(())
    } else {
        Err(OverlayError::UnsupportedImageType(mime.to_string()))
    }
}
