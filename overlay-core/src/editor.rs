//! The editor facade.
//!
//! [`Editor`] owns the document store, the live scene, and the gesture
//! machine, and is the only place they meet. Every store mutation that
//! touches objects is followed by a reconciliation pass, and every
//! user-originated scene event is routed back into the store.
//!
//! ```text
//!   InputEvent ──▶ GestureMachine ──▶ StoreCommand ──▶ DocumentStore
//!                      │                                   │
//!                      │ live deltas                       │ StoreChange
//!                      ▼                                   ▼
//!                    Scene ◀──────────── reconcile ◀───────┘
//!                      │
//!                      └── SceneEvent (selection, text commit) ──▶ DocumentStore
//! ```

use crate::assets::ImageAsset;
use crate::config::EditorConfig;
use crate::event::{InputEvent, PointerPhase, TouchPhase};
use crate::export::{ExportOptions, ExportedImage, SceneExporter};
use crate::gesture::{GestureMachine, GestureMode};
use crate::reconcile::{reconcile_with, ReconcileOptions, ReconcileReport};
use crate::store::{DocumentStore, StoreChange, StoreCommand, StoreListener, SubscriptionId};
use crate::style::apply_style;
use crate::{
    BaseImage, EditorDocument, ObjectId, ObjectPatch, OverlayError, OverlayResult, Scene,
    SceneEvent,
};

/// Result of feeding one input event to the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputResponse {
    /// Whether the platform's default handling must be suppressed.
    pub prevent_default: bool,
    /// Store changes caused by the event, in order.
    pub changes: Vec<StoreChange>,
}

/// Owner of the store, scene, and gesture machine.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    store: DocumentStore,
    scene: Scene,
    gesture: GestureMachine,
    last_reconcile: ReconcileReport,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an editor with a custom configuration.
    ///
    /// Gesture tuning is normalized before use; see
    /// [`GestureConfig::normalized`](crate::config::GestureConfig::normalized).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_config(mut config: EditorConfig) -> Self {
        config.gesture = config.gesture.normalized();
        let store = DocumentStore::with_config(&config);
        let mut scene = Scene::new(
            config.default_canvas_width as f32,
            config.default_canvas_height as f32,
        );
        scene.set_control_visibility(config.control_visibility);
        apply_style(&mut scene, config.style);

        Self {
            gesture: GestureMachine::with_config(config.gesture.clone()),
            config,
            store,
            scene,
            last_reconcile: ReconcileReport::default(),
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The canonical document.
    #[must_use]
    pub fn document(&self) -> &EditorDocument {
        self.store.document()
    }

    /// The document store, read-only.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The live scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The current gesture mode.
    #[must_use]
    pub fn gesture_mode(&self) -> GestureMode {
        self.gesture.mode()
    }

    /// Report of the most recent reconciliation pass.
    #[must_use]
    pub fn last_reconcile(&self) -> &ReconcileReport {
        &self.last_reconcile
    }

    /// Register a store listener.
    pub fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a store listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Apply a store command and bring the scene up to date.
    pub fn apply(&mut self, command: StoreCommand) -> StoreChange {
        let change = self.store.apply(command);
        self.sync_scene(&change);
        change
    }

    /// Set the background photo, resetting all objects.
    pub fn set_base_image(&mut self, image: BaseImage) -> StoreChange {
        self.apply(StoreCommand::SetBaseImage { image })
    }

    /// Set the canvas size.
    pub fn set_canvas_dimensions(&mut self, width: u32, height: u32) -> StoreChange {
        self.apply(StoreCommand::SetCanvasDimensions { width, height })
    }

    /// Add a text object with the default preset and select it.
    pub fn add_text_object(&mut self) -> ObjectId {
        let id = self.store.add_text_object();
        self.sync_scene(&StoreChange::ObjectAdded { id });
        id
    }

    /// Merge a partial update into an object.
    pub fn update_object(&mut self, id: ObjectId, patch: ObjectPatch) -> StoreChange {
        self.apply(StoreCommand::UpdateObject { id, patch })
    }

    /// Remove an object.
    pub fn delete_object(&mut self, id: ObjectId) -> StoreChange {
        self.apply(StoreCommand::DeleteObject { id })
    }

    /// Change the selection.
    pub fn set_active_object(&mut self, id: Option<ObjectId>) -> StoreChange {
        self.apply(StoreCommand::SetActiveObject { id })
    }

    /// Set the delete-zone flag.
    pub fn set_delete_zone_active(&mut self, active: bool) -> StoreChange {
        self.apply(StoreCommand::SetDeleteZoneActive { active })
    }

    /// Reset to an empty canvas with no photo.
    pub fn clear_canvas(&mut self) -> StoreChange {
        self.apply(StoreCommand::ClearCanvas)
    }

    /// Accept the outcome of an image load.
    ///
    /// # Errors
    ///
    /// Returns the loader's error, or [`OverlayError::InvalidImageDimensions`]
    /// for an empty image. The document is unchanged on error.
    pub fn load_image(&mut self, loaded: OverlayResult<ImageAsset>) -> OverlayResult<StoreChange> {
        let base = loaded.and_then(ImageAsset::into_base_image).map_err(|e| {
            tracing::warn!("Image load rejected: {}", e);
            e
        })?;
        Ok(self.set_base_image(base))
    }

    /// Export the composited scene through `exporter`.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::NoBaseImage`] before a photo is loaded, or the
    /// exporter's error. The document is never changed.
    pub fn export(
        &self,
        exporter: &dyn SceneExporter,
        options: &ExportOptions,
    ) -> OverlayResult<ExportedImage> {
        if self.document().base_image.is_none() {
            return Err(OverlayError::NoBaseImage);
        }
        tracing::info!("Exporting {}", options.full_filename());
        exporter.export(&self.scene, options).map_err(|e| {
            tracing::warn!("Export failed: {}", e);
            e
        })
    }

    /// Feed one raw input event through the gesture machine.
    pub fn handle_input(&mut self, event: &InputEvent) -> InputResponse {
        let mut changes = Vec::new();

        if let Some((x, y)) = press_position(event) {
            let editing = self.scene.editing_object_id();
            let inside = editing
                .and_then(|id| self.scene.node(id))
                .is_some_and(|node| node.contains_point(x, y));
            if editing.is_some() && !inside {
                self.scene.end_text_edit();
                changes.extend(self.drain_scene_events());
            }
        }

        let response = self.gesture.handle(event, &mut self.scene);
        for command in response.commands {
            changes.push(self.apply(command));
        }
        changes.extend(self.drain_scene_events());

        InputResponse {
            prevent_default: response.prevent_default,
            changes,
        }
    }

    /// Abort the live gesture, committing its last values.
    pub fn cancel_gesture(&mut self) -> Vec<StoreChange> {
        let response = self.gesture.cancel(&mut self.scene);
        let mut changes: Vec<StoreChange> = response
            .commands
            .into_iter()
            .map(|command| self.apply(command))
            .collect();
        changes.extend(self.drain_scene_events());
        changes
    }

    /// Start editing the text of an object.
    pub fn begin_text_edit(&mut self, id: ObjectId) -> bool {
        let started = self.scene.begin_text_edit(id);
        self.drain_scene_events();
        started
    }

    /// Replace the content of the text being edited.
    pub fn edit_text(&mut self, text: &str) -> bool {
        self.scene.set_edit_text(text)
    }

    /// Insert text at the edit cursor.
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.scene.insert_text(text)
    }

    /// Delete the character before the edit cursor.
    pub fn delete_backward(&mut self) -> bool {
        self.scene.delete_backward()
    }

    /// Finish the text edit and commit its content to the store.
    pub fn end_text_edit(&mut self) -> Option<ObjectId> {
        let id = self.scene.end_text_edit();
        self.drain_scene_events();
        id
    }

    fn drain_scene_events(&mut self) -> Vec<StoreChange> {
        let mut changes = Vec::new();
        for event in self.scene.take_events() {
            let command = match event {
                SceneEvent::SelectionChanged(id) => StoreCommand::SetActiveObject { id },
                SceneEvent::TextCommitted { id, content } => StoreCommand::UpdateObject {
                    id,
                    patch: ObjectPatch::new().content(content),
                },
            };
            changes.push(self.apply(command));
        }
        changes
    }

    #[allow(clippy::cast_precision_loss)]
    fn sync_scene(&mut self, change: &StoreChange) {
        let doc = self.store.document();

        if change.affects_canvas() {
            self.scene
                .set_dimensions(doc.canvas_width as f32, doc.canvas_height as f32);
            self.scene.set_background(doc.base_image.clone());
        }

        if change.affects_objects() {
            let options = ReconcileOptions {
                gesture_target: self.gesture.active_target(),
            };
            self.last_reconcile = reconcile_with(&mut self.scene, &doc.objects, &options);
        }

        if change.affects_objects() || change.affects_selection() {
            self.scene.sync_selection(doc.active_object_id);
        }
    }
}

/// Position of a press that can move focus away from a text edit.
fn press_position(event: &InputEvent) -> Option<(f32, f32)> {
    match event {
        InputEvent::Pointer(p) if p.phase == PointerPhase::Down => Some((p.x, p.y)),
        InputEvent::Touch(t) if t.phase == TouchPhase::Start => {
            t.primary_touch().map(|touch| (touch.x, touch.y))
        }
        _ => None,
    }
}
