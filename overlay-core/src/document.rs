//! The editable document: base photo, canvas size, and overlay objects.

use serde::{Deserialize, Serialize};

use crate::{CanvasObject, ObjectId, OverlayError, OverlayResult};

/// Canvas width used before any photo is loaded.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Canvas height used before any photo is loaded.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Maximum canvas width (mobile container width).
pub const MAX_CANVAS_WIDTH: u32 = 430;

/// Maximum canvas height (fits the visible viewport).
pub const MAX_CANVAS_HEIGHT: u32 = 700;

/// The background photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseImage {
    /// Opaque content handle (data URI, object URL, path).
    pub src: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

impl BaseImage {
    /// Create a new base image descriptor.
    #[must_use]
    pub fn new(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width,
            height,
        }
    }
}

/// Fit `width`×`height` into `max_width`×`max_height`, preserving aspect ratio.
///
/// Width is constrained first, then height. Images that already fit are
/// returned unchanged (never upscaled). Results are rounded to whole pixels.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::similar_names
)]
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.min(max_width), height.min(max_height));
    }

    let aspect = f64::from(width) / f64::from(height);
    let mut w = f64::from(width);
    let mut h = f64::from(height);

    if w > f64::from(max_width) {
        w = f64::from(max_width);
        h = w / aspect;
    }
    if h > f64::from(max_height) {
        h = f64::from(max_height);
        w = h * aspect;
    }

    (w.round() as u32, h.round() as u32)
}

/// The complete editable state held by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    /// Background photo, if one is loaded.
    pub base_image: Option<BaseImage>,
    /// Working canvas width.
    pub canvas_width: u32,
    /// Working canvas height.
    pub canvas_height: u32,
    /// Overlays in z-order (back to front).
    pub objects: Vec<CanvasObject>,
    /// Currently selected object.
    pub active_object_id: Option<ObjectId>,
    /// Whether a dragged object is hovering the delete zone.
    pub is_delete_zone_active: bool,
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorDocument {
    /// An empty document with the default canvas size and no photo.
    #[must_use]
    pub fn new() -> Self {
        Self::with_canvas(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }

    /// An empty document with the given canvas size.
    #[must_use]
    pub fn with_canvas(width: u32, height: u32) -> Self {
        Self {
            base_image: None,
            canvas_width: width,
            canvas_height: height,
            objects: Vec::new(),
            active_object_id: None,
            is_delete_zone_active: false,
        }
    }

    /// Look up an object by ID.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// The currently selected object, if it exists.
    #[must_use]
    pub fn active_object(&self) -> Option<&CanvasObject> {
        self.active_object_id.and_then(|id| self.object(id))
    }

    /// Whether the document contains an object with this ID.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    /// Number of objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> OverlayResult<String> {
        serde_json::to_string(self).map_err(OverlayError::Serialization)
    }

    /// Serialize the document to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> OverlayResult<String> {
        serde_json::to_string_pretty(self).map_err(OverlayError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        serde_json::from_str(json).map_err(OverlayError::Serialization)
    }
}
