//! Document store - the single writer of canonical editor state.
//!
//! Every mutation goes through a named operation (or its [`StoreCommand`]
//! form), runs to completion, and returns a [`StoreChange`] describing what
//! happened. Subscribers are notified after each state transition.
//!
//! Stale or unknown object IDs are never errors: the operation is a no-op
//! and reports [`StoreChange::Unchanged`].

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::document::scaled_dimensions;
use crate::{BaseImage, CanvasObject, EditorDocument, ObjectId, ObjectPatch};

/// Fraction of the canvas height at which new text is anchored.
const NEW_TEXT_Y_FRACTION: f32 = 0.35;

/// A serializable store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreCommand {
    /// Replace the background photo and reset all objects.
    SetBaseImage {
        /// The new photo.
        image: BaseImage,
    },
    /// Set the working canvas size.
    SetCanvasDimensions {
        /// Canvas width.
        width: u32,
        /// Canvas height.
        height: u32,
    },
    /// Add a text object with the default preset.
    AddTextObject,
    /// Merge a partial update into an object.
    UpdateObject {
        /// Target object.
        id: ObjectId,
        /// Fields to merge.
        patch: ObjectPatch,
    },
    /// Remove an object.
    DeleteObject {
        /// Target object.
        id: ObjectId,
    },
    /// Change the selection.
    SetActiveObject {
        /// New selection, or `None` to clear it.
        id: Option<ObjectId>,
    },
    /// Toggle the delete-zone hover flag.
    SetDeleteZoneActive {
        /// New flag value.
        active: bool,
    },
    /// Reset to an empty canvas with no photo.
    ClearCanvas,
}

/// What a store operation changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StoreChange {
    /// A new photo was set; objects and selection were reset.
    BaseImageSet {
        /// Fitted canvas width.
        width: u32,
        /// Fitted canvas height.
        height: u32,
    },
    /// The canvas was resized.
    CanvasResized {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// An object was added and selected.
    ObjectAdded {
        /// The new object.
        id: ObjectId,
    },
    /// An object's fields changed.
    ObjectUpdated {
        /// The updated object.
        id: ObjectId,
    },
    /// An object was removed.
    ObjectDeleted {
        /// The removed object.
        id: ObjectId,
        /// Whether it was the selected object.
        was_active: bool,
    },
    /// The selection changed.
    ActiveObjectChanged {
        /// New selection.
        id: Option<ObjectId>,
    },
    /// The delete-zone flag changed.
    DeleteZoneChanged {
        /// New flag value.
        active: bool,
    },
    /// The document was reset.
    Cleared,
    /// Nothing changed.
    Unchanged,
}

impl StoreChange {
    /// Whether the object list may have changed.
    #[must_use]
    pub const fn affects_objects(&self) -> bool {
        matches!(
            self,
            Self::BaseImageSet { .. }
                | Self::ObjectAdded { .. }
                | Self::ObjectUpdated { .. }
                | Self::ObjectDeleted { .. }
                | Self::Cleared
        )
    }

    /// Whether the selection may have changed.
    #[must_use]
    pub const fn affects_selection(&self) -> bool {
        matches!(
            self,
            Self::BaseImageSet { .. }
                | Self::ObjectAdded { .. }
                | Self::ObjectDeleted {
                    was_active: true,
                    ..
                }
                | Self::ActiveObjectChanged { .. }
                | Self::Cleared
        )
    }

    /// Whether the canvas size or background may have changed.
    #[must_use]
    pub const fn affects_canvas(&self) -> bool {
        matches!(
            self,
            Self::BaseImageSet { .. } | Self::CanvasResized { .. } | Self::Cleared
        )
    }

    /// Whether anything changed at all.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Handle returned by [`DocumentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked after every state change.
pub type StoreListener = Box<dyn FnMut(&StoreChange, &EditorDocument)>;

/// Owner of the canonical [`EditorDocument`].
pub struct DocumentStore {
    document: EditorDocument,
    max_canvas_width: u32,
    max_canvas_height: u32,
    default_canvas_width: u32,
    default_canvas_height: u32,
    revision: u64,
    listeners: Vec<(SubscriptionId, StoreListener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("document", &self.document)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create a store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// Create a store using the canvas bounds from `config`.
    #[must_use]
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            document: EditorDocument::with_canvas(
                config.default_canvas_width,
                config.default_canvas_height,
            ),
            max_canvas_width: config.max_canvas_width,
            max_canvas_height: config.max_canvas_height,
            default_canvas_width: config.default_canvas_width,
            default_canvas_height: config.default_canvas_height,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current document.
    #[must_use]
    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Canonical objects in z-order.
    #[must_use]
    pub fn objects(&self) -> &[CanvasObject] {
        &self.document.objects
    }

    /// Look up an object by ID.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.document.object(id)
    }

    /// The selected object ID.
    #[must_use]
    pub fn active_object_id(&self) -> Option<ObjectId> {
        self.document.active_object_id
    }

    /// Number of state changes since creation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a listener called after every state change.
    pub fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Dispatch a command to the matching operation.
    pub fn apply(&mut self, command: StoreCommand) -> StoreChange {
        match command {
            StoreCommand::SetBaseImage { image } => self.set_base_image(image),
            StoreCommand::SetCanvasDimensions { width, height } => {
                self.set_canvas_dimensions(width, height)
            }
            StoreCommand::AddTextObject => {
                let id = self.add_text_object();
                StoreChange::ObjectAdded { id }
            }
            StoreCommand::UpdateObject { id, patch } => self.update_object(id, &patch),
            StoreCommand::DeleteObject { id } => self.delete_object(id),
            StoreCommand::SetActiveObject { id } => self.set_active_object(id),
            StoreCommand::SetDeleteZoneActive { active } => self.set_delete_zone_active(active),
            StoreCommand::ClearCanvas => self.clear_canvas(),
        }
    }

    /// Set the background photo.
    ///
    /// The canvas is fitted to the photo's aspect ratio within the configured
    /// bounds. All objects and the selection are reset.
    pub fn set_base_image(&mut self, image: BaseImage) -> StoreChange {
        let (width, height) = scaled_dimensions(
            image.width,
            image.height,
            self.max_canvas_width,
            self.max_canvas_height,
        );
        tracing::info!(
            "Base image set: {}x{} fitted to {}x{}",
            image.width,
            image.height,
            width,
            height
        );

        let doc = &mut self.document;
        doc.base_image = Some(image);
        doc.canvas_width = width;
        doc.canvas_height = height;
        doc.objects.clear();
        doc.active_object_id = None;
        doc.is_delete_zone_active = false;

        self.commit(StoreChange::BaseImageSet { width, height })
    }

    /// Set the working canvas size.
    pub fn set_canvas_dimensions(&mut self, width: u32, height: u32) -> StoreChange {
        let doc = &mut self.document;
        if doc.canvas_width == width && doc.canvas_height == height {
            return StoreChange::Unchanged;
        }
        doc.canvas_width = width;
        doc.canvas_height = height;
        tracing::debug!("Canvas resized to {}x{}", width, height);
        self.commit(StoreChange::CanvasResized { width, height })
    }

    /// Add a text object with the default preset and select it.
    ///
    /// The object is anchored horizontally at the canvas midpoint and at 35%
    /// of the canvas height.
    #[allow(clippy::cast_precision_loss)]
    pub fn add_text_object(&mut self) -> ObjectId {
        let x = self.document.canvas_width as f32 / 2.0;
        let y = self.document.canvas_height as f32 * NEW_TEXT_Y_FRACTION;
        self.add_object(CanvasObject::text(x, y))
    }

    /// Append an object on top of the z-order and select it.
    ///
    /// Scale and text style are clamped on the way in, as for updates.
    pub fn add_object(&mut self, mut object: CanvasObject) -> ObjectId {
        object.normalize();
        let id = object.id;
        self.document.objects.push(object);
        self.document.active_object_id = Some(id);
        tracing::debug!("Object added: {}", id);
        self.commit(StoreChange::ObjectAdded { id });
        id
    }

    /// Merge `patch` into the object with `id`.
    ///
    /// Unknown IDs and patches that change nothing are no-ops.
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> StoreChange {
        let Some(object) = self.document.object_mut(id) else {
            tracing::debug!("Ignoring update for unknown object {}", id);
            return StoreChange::Unchanged;
        };
        if !object.apply_patch(patch) {
            return StoreChange::Unchanged;
        }
        tracing::debug!("Object updated: {}", id);
        self.commit(StoreChange::ObjectUpdated { id })
    }

    /// Remove the object with `id`, clearing the selection if it was selected.
    pub fn delete_object(&mut self, id: ObjectId) -> StoreChange {
        let doc = &mut self.document;
        let Some(index) = doc.objects.iter().position(|o| o.id == id) else {
            tracing::debug!("Ignoring delete for unknown object {}", id);
            return StoreChange::Unchanged;
        };
        doc.objects.remove(index);
        let was_active = doc.active_object_id == Some(id);
        if was_active {
            doc.active_object_id = None;
        }
        tracing::debug!("Object deleted: {} (was active: {})", id, was_active);
        self.commit(StoreChange::ObjectDeleted { id, was_active })
    }

    /// Set the selection. The ID is not validated against the object list.
    pub fn set_active_object(&mut self, id: Option<ObjectId>) -> StoreChange {
        if self.document.active_object_id == id {
            return StoreChange::Unchanged;
        }
        if let Some(id) = id.filter(|id| !self.document.contains(*id)) {
            tracing::debug!("Selecting object {} that is not in the document", id);
        }
        self.document.active_object_id = id;
        self.commit(StoreChange::ActiveObjectChanged { id })
    }

    /// Set the delete-zone hover flag.
    pub fn set_delete_zone_active(&mut self, active: bool) -> StoreChange {
        if self.document.is_delete_zone_active == active {
            return StoreChange::Unchanged;
        }
        self.document.is_delete_zone_active = active;
        self.commit(StoreChange::DeleteZoneChanged { active })
    }

    /// Reset to an empty document with no photo and the default canvas size.
    pub fn clear_canvas(&mut self) -> StoreChange {
        self.document =
            EditorDocument::with_canvas(self.default_canvas_width, self.default_canvas_height);
        tracing::info!("Canvas cleared");
        self.commit(StoreChange::Cleared)
    }

    fn commit(&mut self, change: StoreChange) -> StoreChange {
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener(&change, &self.document);
        }
        change
    }
}
