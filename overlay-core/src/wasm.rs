//! WebAssembly bindings for overlay-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Documents, patches, and events cross the boundary as JSON.

use wasm_bindgen::prelude::*;

use crate::assets::{check_image_type, ImageAsset};
use crate::event::{InputEvent, KeyModifiers, PointerEvent, PointerPhase};
use crate::export::export_filename;
use crate::{BaseImage, Editor, EditorConfig, ObjectId, ObjectPatch};

/// Initialize the editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn parse_id(id: &str) -> Result<ObjectId, String> {
    ObjectId::parse(id).map_err(|e| format!("Invalid object id '{id}': {e}"))
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create a new editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: Editor::new(),
        }
    }

    /// Create an editor from a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration is malformed.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json(json).map_err(|e| e.to_string())?;
        Ok(Self {
            editor: Editor::with_config(config),
        })
    }

    /// Get the canonical document as JSON.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.editor.document().to_json().unwrap_or_default()
    }

    /// Get the live scene as JSON.
    #[wasm_bindgen(js_name = getSceneJson)]
    #[must_use]
    pub fn get_scene_json(&self) -> String {
        self.editor.scene().to_json().unwrap_or_default()
    }

    /// Set the background photo from an already decoded image.
    #[wasm_bindgen(js_name = setBaseImage)]
    pub fn set_base_image(&mut self, src: &str, width: u32, height: u32) {
        self.editor.set_base_image(BaseImage::new(src, width, height));
    }

    /// Validate and load a decoded image file.
    ///
    /// # Errors
    ///
    /// Returns an error string for unsupported types or empty images.
    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(
        &mut self,
        mime: &str,
        src: &str,
        width: u32,
        height: u32,
        name: &str,
    ) -> Result<(), String> {
        let asset = check_image_type(mime).map(|()| ImageAsset::new(src, width, height, name));
        self.editor
            .load_image(asset)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Set the canvas size.
    #[wasm_bindgen(js_name = setCanvasDimensions)]
    pub fn set_canvas_dimensions(&mut self, width: u32, height: u32) {
        self.editor.set_canvas_dimensions(width, height);
    }

    /// Add a text object and return its ID.
    #[wasm_bindgen(js_name = addTextObject)]
    pub fn add_text_object(&mut self) -> String {
        self.editor.add_text_object().to_string()
    }

    /// Merge a JSON patch into an object. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error string if the ID or patch cannot be parsed.
    #[wasm_bindgen(js_name = updateObject)]
    pub fn update_object(&mut self, id: &str, patch_json: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        let patch: ObjectPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        Ok(self.editor.update_object(id, patch).is_change())
    }

    /// Delete an object. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error string if the ID cannot be parsed.
    #[wasm_bindgen(js_name = deleteObject)]
    pub fn delete_object(&mut self, id: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        Ok(self.editor.delete_object(id).is_change())
    }

    /// Select an object, or clear the selection with `undefined`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the ID cannot be parsed.
    #[wasm_bindgen(js_name = setActiveObject)]
    pub fn set_active_object(&mut self, id: Option<String>) -> Result<(), String> {
        let id = id.as_deref().map(parse_id).transpose()?;
        self.editor.set_active_object(id);
        Ok(())
    }

    /// Reset to an empty canvas.
    #[wasm_bindgen(js_name = clearCanvas)]
    pub fn clear_canvas(&mut self) {
        self.editor.clear_canvas();
    }

    /// Handle a pointer event. Returns whether default handling must be prevented.
    ///
    /// `phase` is one of `down`, `move`, `up`, or `cancel`.
    ///
    /// # Errors
    ///
    /// Returns an error string for any other phase.
    #[wasm_bindgen(js_name = handlePointer)]
    pub fn handle_pointer(
        &mut self,
        phase: &str,
        x: f32,
        y: f32,
        alt: bool,
        ctrl: bool,
    ) -> Result<bool, String> {
        let phase = match phase {
            "down" => PointerPhase::Down,
            "move" => PointerPhase::Move,
            "up" => PointerPhase::Up,
            "cancel" => PointerPhase::Cancel,
            other => return Err(format!("Unknown pointer phase '{other}'")),
        };
        let modifiers = KeyModifiers {
            alt,
            ctrl,
            ..KeyModifiers::NONE
        };
        let event = PointerEvent::new(phase, x, y).with_modifiers(modifiers);
        Ok(self
            .editor
            .handle_input(&InputEvent::Pointer(event))
            .prevent_default)
    }

    /// Handle a JSON-encoded input event. Returns whether default handling
    /// must be prevented.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event cannot be parsed.
    #[wasm_bindgen(js_name = handleInputJson)]
    pub fn handle_input_json(&mut self, json: &str) -> Result<bool, String> {
        let event: InputEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self.editor.handle_input(&event).prevent_default)
    }

    /// Start editing an object's text.
    ///
    /// # Errors
    ///
    /// Returns an error string if the ID cannot be parsed.
    #[wasm_bindgen(js_name = beginTextEdit)]
    pub fn begin_text_edit(&mut self, id: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        Ok(self.editor.begin_text_edit(id))
    }

    /// Replace the content of the text being edited.
    #[wasm_bindgen(js_name = editText)]
    pub fn edit_text(&mut self, text: &str) -> bool {
        self.editor.edit_text(text)
    }

    /// Finish the text edit and commit it.
    #[wasm_bindgen(js_name = endTextEdit)]
    pub fn end_text_edit(&mut self) -> Option<String> {
        self.editor.end_text_edit().map(|id| id.to_string())
    }

    /// Timestamped file name for the next export.
    #[wasm_bindgen(js_name = exportFilename)]
    #[must_use]
    pub fn export_filename(&self) -> String {
        export_filename(chrono::Utc::now())
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasm_editor_new_creates_empty_document() {
        let editor = WasmEditor::new();
        let json = editor.get_document_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["canvasWidth"], 800);
        assert_eq!(parsed["objects"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn with_config_rejects_invalid_json() {
        assert!(WasmEditor::with_config("{ not valid json }").is_err());
        assert!(WasmEditor::with_config(r#"{"style":"default"}"#).is_ok());
    }

    #[test]
    fn add_and_update_object() {
        let mut editor = WasmEditor::new();
        let id = editor.add_text_object();
        assert_eq!(editor.update_object(&id, r#"{"fontSize": 48}"#), Ok(true));
        assert_eq!(editor.update_object(&id, r#"{"fontSize": 48}"#), Ok(false));
        assert!(editor.update_object("invalid-uuid", "{}").is_err());
        assert!(editor.get_scene_json().contains("48"));
    }

    #[test]
    fn load_image_rejects_unsupported_type() {
        let mut editor = WasmEditor::new();
        let result = editor.load_image("image/gif", "data:", 10, 10, "a.gif");
        assert!(result.is_err());
        assert!(editor.load_image("image/png", "data:", 1920, 1080, "a.png").is_ok());
        assert!(editor.get_document_json().contains("\"canvasWidth\":430"));
    }

    #[test]
    fn unknown_pointer_phase_keeps_gesture_alive() {
        let mut editor = WasmEditor::new();
        editor.add_text_object();
        assert!(editor.handle_pointer("down", 450.0, 230.0, false, false).is_ok());
        assert_eq!(editor.editor.gesture_mode(), crate::GestureMode::Dragging);

        assert!(editor.handle_pointer("mvoe", 460.0, 240.0, false, false).is_err());
        assert_eq!(editor.editor.gesture_mode(), crate::GestureMode::Dragging);

        assert!(editor.handle_pointer("up", 460.0, 240.0, false, false).is_ok());
        assert_eq!(editor.editor.gesture_mode(), crate::GestureMode::Idle);
    }

    #[test]
    fn pinch_prevents_default() {
        let mut editor = WasmEditor::new();
        editor.add_text_object();
        let json = r#"{"type":"Touch","data":{"phase":"start","touches":[{"id":0,"x":1.0,"y":1.0},{"id":1,"x":50.0,"y":1.0}]}}"#;
        assert_eq!(editor.handle_input_json(json), Ok(true));
        assert!(editor.handle_input_json("not json").is_err());
    }
}
