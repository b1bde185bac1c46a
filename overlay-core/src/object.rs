//! Canvas objects - the overlays placed on top of the base photo.
//!
//! Objects are pure data. All validation happens through clamping helpers
//! so that a value read back from an object is always in range.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::color::normalize_fill;

/// Smallest allowed font size in pixels.
pub const MIN_FONT_SIZE: u32 = 8;

/// Largest allowed font size in pixels.
pub const MAX_FONT_SIZE: u32 = 200;

/// Scale floor. Scale factors are never allowed to reach zero or go negative.
pub const MIN_SCALE: f32 = 0.1;

/// Font families the editor ships with. The first entry is the fallback.
pub const SUPPORTED_FONTS: [&str; 8] = [
    "Inter",
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Playfair Display",
    "Bebas Neue",
    "Pacifico",
];

/// Placeholder content for newly added text.
pub const DEFAULT_TEXT_CONTENT: &str = "Your Text Here";

/// Font size of newly added text.
pub const DEFAULT_FONT_SIZE: u32 = 30;

/// Fill color of newly added text.
pub const DEFAULT_FILL: &str = "#000000";

/// Nominal width of a new text box.
pub const DEFAULT_TEXT_WIDTH: f32 = 200.0;

/// Nominal height of a new text box.
pub const DEFAULT_TEXT_HEIGHT: f32 = 50.0;

/// Unique identifier for a canvas object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate a fresh object ID.
///
/// IDs are random v4 UUIDs, so they never collide within a session and are
/// never reused after an object is deleted.
#[must_use]
pub fn generate_object_id() -> ObjectId {
    ObjectId::new()
}

/// Clamp a requested font size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
///
/// The value is rounded to the nearest integer first. NaN maps to the minimum.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_font_size(size: f64) -> u32 {
    if size.is_nan() {
        return MIN_FONT_SIZE;
    }
    size.round()
        .clamp(f64::from(MIN_FONT_SIZE), f64::from(MAX_FONT_SIZE)) as u32
}

/// Return `name` if it is a supported font, otherwise the default font.
#[must_use]
pub fn validate_font_family(name: &str) -> &'static str {
    SUPPORTED_FONTS
        .iter()
        .find(|font| **font == name)
        .copied()
        .unwrap_or(SUPPORTED_FONTS[0])
}

/// Clamp a scale factor at [`MIN_SCALE`]. Non-finite input maps to the floor.
#[must_use]
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.max(MIN_SCALE)
    } else {
        MIN_SCALE
    }
}

/// Font weight of a text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center within the box.
    Center,
    /// Align to the right edge.
    Right,
}

/// Text-specific properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBody {
    /// Text content (may be empty).
    pub content: String,
    /// Font family, always one of [`SUPPORTED_FONTS`].
    pub font_family: String,
    /// Font size in pixels, always within `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
    pub font_size: u32,
    /// Fill color.
    pub fill: String,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Fixed box width used for wrapping, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_box_width: Option<f32>,
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            content: DEFAULT_TEXT_CONTENT.to_string(),
            font_family: SUPPORTED_FONTS[0].to_string(),
            font_size: DEFAULT_FONT_SIZE,
            fill: DEFAULT_FILL.to_string(),
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Left,
            text_box_width: None,
        }
    }
}

/// Type tag of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A text overlay.
    Text,
    /// An image overlay (reserved).
    Image,
}

/// The content an object carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectBody {
    /// A text overlay.
    Text(TextBody),
    /// An image overlay.
    Image {
        /// Image source URI.
        src: String,
    },
}

/// One placeable overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasObject {
    /// Unique identifier, immutable once assigned.
    pub id: ObjectId,
    /// Kind-specific content.
    #[serde(flatten)]
    pub body: ObjectBody,
    /// Left edge in canvas pixels.
    pub x: f32,
    /// Top edge in canvas pixels.
    pub y: f32,
    /// Nominal (unscaled) width.
    pub width: f32,
    /// Nominal (unscaled) height.
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl CanvasObject {
    /// Create a text object with the default style preset at `(x, y)`.
    #[must_use]
    pub fn text(x: f32, y: f32) -> Self {
        Self {
            id: generate_object_id(),
            body: ObjectBody::Text(TextBody::default()),
            x,
            y,
            width: DEFAULT_TEXT_WIDTH,
            height: DEFAULT_TEXT_HEIGHT,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Create an image object.
    #[must_use]
    pub fn image(src: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: generate_object_id(),
            body: ObjectBody::Image { src: src.into() },
            x,
            y,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Replace the text content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        if let ObjectBody::Text(text) = &mut self.body {
            text.content = content.into();
        }
        self
    }

    /// The object's type tag.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self.body {
            ObjectBody::Text(_) => ObjectKind::Text,
            ObjectBody::Image { .. } => ObjectKind::Image,
        }
    }

    /// Text properties, if this is a text object.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextBody> {
        match &self.body {
            ObjectBody::Text(text) => Some(text),
            ObjectBody::Image { .. } => None,
        }
    }

    /// Bring scale and text style into range, as a patch would.
    pub fn normalize(&mut self) {
        self.scale_x = clamp_scale(self.scale_x);
        self.scale_y = clamp_scale(self.scale_y);
        if let ObjectBody::Text(text) = &mut self.body {
            text.font_size = clamp_font_size(f64::from(text.font_size));
            text.font_family = validate_font_family(&text.font_family).to_string();
            text.fill = normalize_fill(&text.fill);
        }
    }

    /// Merge a partial update into this object.
    ///
    /// Scale, font size, and font family are clamped/substituted on the way
    /// in. Text fields are ignored for non-text objects. Returns `true` if
    /// any field actually changed.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) -> bool {
        let before = self.clone();

        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale_x) = patch.scale_x {
            self.scale_x = clamp_scale(scale_x);
        }
        if let Some(scale_y) = patch.scale_y {
            self.scale_y = clamp_scale(scale_y);
        }

        if let ObjectBody::Text(text) = &mut self.body {
            if let Some(content) = &patch.content {
                text.content.clone_from(content);
            }
            if let Some(family) = &patch.font_family {
                text.font_family = validate_font_family(family).to_string();
            }
            if let Some(size) = patch.font_size {
                text.font_size = clamp_font_size(size);
            }
            if let Some(fill) = &patch.fill {
                text.fill = normalize_fill(fill);
            }
            if let Some(weight) = patch.font_weight {
                text.font_weight = weight;
            }
            if let Some(align) = patch.text_align {
                text.text_align = align;
            }
            if let Some(width) = patch.text_box_width {
                text.text_box_width = width;
            }
        }

        *self != before
    }
}

/// A field-level partial update for a [`CanvasObject`].
///
/// Every field is optional; only the fields that are set are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectPatch {
    /// New left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// New top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// New nominal width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// New nominal height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// New rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// New horizontal scale (clamped at the floor).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    /// New vertical scale (clamped at the floor).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    /// New text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New font family (substituted if unsupported).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// New font size (rounded and clamped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// New fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// New font weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// New text alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// New fixed text box width. `Some(None)` (JSON `null`) clears it.
    #[allow(clippy::option_option)]
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub text_box_width: Option<Option<f32>>,
}

/// Keep a present `null` apart from a missing field.
#[allow(clippy::option_option)]
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ObjectPatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position.
    #[must_use]
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Set a uniform scale on both axes.
    #[must_use]
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale_x = Some(scale);
        self.scale_y = Some(scale);
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the font family.
    #[must_use]
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set the fill color.
    #[must_use]
    pub fn fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Set the font weight.
    #[must_use]
    pub fn font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    /// Set the text alignment.
    #[must_use]
    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    /// Set or clear the fixed text box width.
    #[must_use]
    pub fn text_box_width(mut self, width: Option<f32>) -> Self {
        self.text_box_width = Some(width);
        self
    }

    /// Whether the patch sets no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_font_size() {
        assert_eq!(clamp_font_size(4.0), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(30.4), 30);
        assert_eq!(clamp_font_size(30.6), 31);
        assert_eq!(clamp_font_size(999.0), MAX_FONT_SIZE);
        assert_eq!(clamp_font_size(-12.0), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(f64::NAN), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(f64::INFINITY), MAX_FONT_SIZE);
    }

    #[test]
    fn test_validate_font_family() {
        assert_eq!(validate_font_family("Pacifico"), "Pacifico");
        assert_eq!(validate_font_family("Comic Sans MS"), "Inter");
        assert_eq!(validate_font_family("roboto"), "Inter");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| generate_object_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_object_id_parse_roundtrip() {
        let id = ObjectId::new();
        assert_eq!(ObjectId::parse(&id.to_string()).expect("valid id"), id);
        assert!(ObjectId::parse("obj_123").is_err());
    }

    #[test]
    fn test_new_text_uses_default_preset() {
        let obj = CanvasObject::text(215.0, 245.0);
        assert_eq!(obj.kind(), ObjectKind::Text);
        let text = obj.as_text().expect("text body");
        assert_eq!(text.content, DEFAULT_TEXT_CONTENT);
        assert_eq!(text.font_family, "Inter");
        assert_eq!(text.font_size, 30);
        assert_eq!(text.fill, "#000000");
        assert!((obj.scale_x - 1.0).abs() < f32::EPSILON);
        assert!((obj.width - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_patch_clamps() {
        let mut obj = CanvasObject::text(0.0, 0.0);
        let changed = obj.apply_patch(
            &ObjectPatch::new()
                .scale(-3.0)
                .font_size(500.0)
                .font_family("Papyrus")
                .fill("#ABCDEF"),
        );
        assert!(changed);
        assert!((obj.scale_x - MIN_SCALE).abs() < f32::EPSILON);
        assert!((obj.scale_y - MIN_SCALE).abs() < f32::EPSILON);
        let text = obj.as_text().expect("text body");
        assert_eq!(text.font_size, MAX_FONT_SIZE);
        assert_eq!(text.font_family, "Inter");
        assert_eq!(text.fill, "#abcdef");
    }

    #[test]
    fn test_apply_patch_reports_no_change() {
        let mut obj = CanvasObject::text(10.0, 20.0);
        assert!(!obj.apply_patch(&ObjectPatch::new().position(10.0, 20.0)));
        assert!(!obj.apply_patch(&ObjectPatch::new()));
    }

    #[test]
    fn test_text_fields_ignored_on_image() {
        let mut obj = CanvasObject::image("sticker.png", 0.0, 0.0, 64.0, 64.0);
        let changed = obj.apply_patch(&ObjectPatch::new().content("hello").fill("#ff0000"));
        assert!(!changed);
        assert!(obj.as_text().is_none());
    }

    #[test]
    fn test_object_json_shape() {
        let obj = CanvasObject::text(1.0, 2.0);
        let json = serde_json::to_value(&obj).expect("serialize");
        assert_eq!(json["type"], "text");
        assert_eq!(json["fontFamily"], "Inter");
        assert_eq!(json["scaleX"], 1.0);
        assert!(json.get("textBoxWidth").is_none());

        let back: CanvasObject = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, obj);
    }

    #[test]
    fn test_normalize_clamps_text_style() {
        let mut obj = CanvasObject::text(0.0, 0.0);
        obj.scale_x = 0.0;
        if let ObjectBody::Text(text) = &mut obj.body {
            text.font_size = 500;
            text.font_family = "Papyrus".to_string();
            text.fill = "#FFAA00".to_string();
        }
        obj.normalize();

        assert!((obj.scale_x - MIN_SCALE).abs() < f32::EPSILON);
        let text = obj.as_text().expect("text body");
        assert_eq!(text.font_size, MAX_FONT_SIZE);
        assert_eq!(text.font_family, "Inter");
        assert_eq!(text.fill, "#ffaa00");
    }

    #[test]
    fn test_text_box_width_can_be_cleared() {
        let mut obj = CanvasObject::text(0.0, 0.0);
        assert!(obj.apply_patch(&ObjectPatch::new().text_box_width(Some(180.0))));
        assert_eq!(obj.as_text().and_then(|t| t.text_box_width), Some(180.0));

        let clear: ObjectPatch =
            serde_json::from_str(r#"{"textBoxWidth": null}"#).expect("parse");
        assert_eq!(clear.text_box_width, Some(None));
        assert!(obj.apply_patch(&clear));
        assert_eq!(obj.as_text().and_then(|t| t.text_box_width), None);

        let untouched: ObjectPatch = serde_json::from_str("{}").expect("parse");
        assert!(untouched.text_box_width.is_none());
        assert!(!obj.apply_patch(&untouched));
    }

    #[test]
    fn test_patch_deserializes_partial_json() {
        let patch: ObjectPatch =
            serde_json::from_str(r#"{"fontSize": 42, "textAlign": "center"}"#).expect("parse");
        assert_eq!(patch.font_size, Some(42.0));
        assert_eq!(patch.text_align, Some(TextAlign::Center));
        assert!(patch.content.is_none());
        assert!(ObjectPatch::new().is_empty());
    }
}
