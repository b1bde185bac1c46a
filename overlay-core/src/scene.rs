//! Live scene - the retained-mode node set the user sees and touches.
//!
//! Each [`SceneNode`] carries a back-reference to the canonical object it
//! renders. The scene never owns canonical data: the document store does.
//! Nodes are created, updated and removed by the reconciler, and moved
//! live by the gesture state machine while a gesture is in progress.

use serde::{Deserialize, Serialize};

use crate::style::{ControlStyle, ControlVisibility, SelectionBoxStyle, StylePreset};
use crate::{BaseImage, CanvasObject, ObjectBody, ObjectId, OverlayError, OverlayResult, TextBody};

/// User-originated scene events waiting to be routed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// The user selected a node or cleared the selection.
    SelectionChanged(Option<ObjectId>),
    /// A text edit session ended with this content.
    TextCommitted {
        /// Object whose text was edited.
        id: ObjectId,
        /// Final text content.
        content: String,
    },
}

/// Counters of structural scene operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Nodes created.
    pub nodes_created: u64,
    /// Nodes removed.
    pub nodes_removed: u64,
    /// Individual node fields rewritten by reconciliation.
    pub field_updates: u64,
    /// Times the node order was rearranged.
    pub reorders: u64,
}

/// An in-progress text edit on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditSession {
    /// Cursor position as a character index.
    pub cursor: usize,
    /// Content when the session started.
    pub original: String,
}

/// A live, render-ready node mirroring one canonical object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    object_id: ObjectId,
    /// Content rendered by this node.
    pub body: ObjectBody,
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Nominal width.
    pub width: f32,
    /// Nominal height.
    pub height: f32,
    /// Rotation in degrees.
    pub angle: f32,
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
    /// Blocks horizontal drag-to-move.
    pub lock_movement_x: bool,
    /// Blocks vertical drag-to-move.
    pub lock_movement_y: bool,
    /// Selection affordance styling, `None` until a preset is applied.
    pub controls: Option<ControlStyle>,
    #[serde(skip)]
    editing: Option<TextEditSession>,
}

impl SceneNode {
    /// Create a node carrying every field of `object`.
    #[must_use]
    pub fn from_object(object: &CanvasObject) -> Self {
        Self {
            object_id: object.id,
            body: object.body.clone(),
            left: object.x,
            top: object.y,
            width: object.width,
            height: object.height,
            angle: object.rotation,
            scale_x: object.scale_x,
            scale_y: object.scale_y,
            lock_movement_x: false,
            lock_movement_y: false,
            controls: None,
            editing: None,
        }
    }

    /// ID of the canonical object this node renders.
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Text properties, if this is a text node.
    #[must_use]
    pub fn text(&self) -> Option<&TextBody> {
        match &self.body {
            ObjectBody::Text(text) => Some(text),
            ObjectBody::Image { .. } => None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut TextBody> {
        match &mut self.body {
            ObjectBody::Text(text) => Some(text),
            ObjectBody::Image { .. } => None,
        }
    }

    /// Displayed text content, if this is a text node.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.text().map(|t| t.content.as_str())
    }

    /// Whether a text edit session is active on this node.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// The active text edit session.
    #[must_use]
    pub fn edit_session(&self) -> Option<&TextEditSession> {
        self.editing.as_ref()
    }

    /// Width after scaling.
    #[must_use]
    pub fn scaled_width(&self) -> f32 {
        self.width * self.scale_x
    }

    /// Height after scaling.
    #[must_use]
    pub fn scaled_height(&self) -> f32 {
        self.height * self.scale_y
    }

    /// Center of the scaled bounds.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            self.left + self.scaled_width() / 2.0,
            self.top + self.scaled_height() / 2.0,
        )
    }

    /// Check if a point (in canvas coordinates) is within this node,
    /// accounting for scale and rotation about the center.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let (cx, cy) = self.center();
        let (sin, cos) = (-self.angle).to_radians().sin_cos();
        let dx = x - cx;
        let dy = y - cy;
        let local_x = dx * cos - dy * sin;
        let local_y = dx * sin + dy * cos;
        local_x.abs() <= self.scaled_width().abs() / 2.0
            && local_y.abs() <= self.scaled_height().abs() / 2.0
    }

    /// Engage or release both movement locks.
    pub fn set_movement_locked(&mut self, locked: bool) {
        self.lock_movement_x = locked;
        self.lock_movement_y = locked;
    }

    /// Move the node, honoring movement locks per axis.
    pub fn move_to(&mut self, left: f32, top: f32) {
        if !self.lock_movement_x {
            self.left = left;
        }
        if !self.lock_movement_y {
            self.top = top;
        }
    }
}

/// A scene containing all live nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Nodes in z-order (back to front).
    nodes: Vec<SceneNode>,
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    background: Option<BaseImage>,
    active: Option<ObjectId>,
    selection_enabled: bool,
    control_visibility: ControlVisibility,
    style_preset: Option<StylePreset>,
    selection_box_style: Option<SelectionBoxStyle>,
    #[serde(skip)]
    events: Vec<SceneEvent>,
    #[serde(skip)]
    stats: SceneStats,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Scene {
    /// Create a new empty scene with the given canvas size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            nodes: Vec::new(),
            width,
            height,
            background: None,
            active: None,
            selection_enabled: true,
            control_visibility: ControlVisibility::default(),
            style_preset: None,
            selection_box_style: None,
            events: Vec::new(),
            stats: SceneStats::default(),
        }
    }

    /// Set the canvas dimensions.
    pub fn set_dimensions(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Set or clear the background photo.
    pub fn set_background(&mut self, background: Option<BaseImage>) {
        self.background = background;
    }

    /// The background photo.
    #[must_use]
    pub fn background(&self) -> Option<&BaseImage> {
        self.background.as_ref()
    }

    /// Append a node at the front of the z-order.
    pub fn add_node(&mut self, node: SceneNode) -> ObjectId {
        let id = node.object_id;
        self.nodes.push(node);
        self.stats.nodes_created += 1;
        id
    }

    /// Remove a node. A removed active node silently leaves the selection.
    pub fn remove_node(&mut self, id: ObjectId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|n| n.object_id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        self.stats.nodes_removed += 1;
        Some(self.nodes.remove(index))
    }

    /// Get a node by object ID.
    #[must_use]
    pub fn node(&self, id: ObjectId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.object_id == id)
    }

    /// Get a mutable node by object ID.
    pub fn node_mut(&mut self, id: ObjectId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.object_id == id)
    }

    /// All nodes, back to front.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }

    /// Mutable access to all nodes.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.nodes.iter_mut()
    }

    /// Object IDs of all nodes, back to front.
    #[must_use]
    pub fn node_ids(&self) -> Vec<ObjectId> {
        self.nodes.iter().map(|n| n.object_id).collect()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rearrange nodes to follow `order`. Nodes missing from `order` keep
    /// their relative order after the listed ones. Returns `true` if the
    /// order changed.
    pub fn reorder(&mut self, order: &[ObjectId]) -> bool {
        let rank = |id: ObjectId| order.iter().position(|o| *o == id).unwrap_or(usize::MAX);
        let sorted = self
            .nodes
            .windows(2)
            .all(|pair| rank(pair[0].object_id) <= rank(pair[1].object_id));
        if sorted {
            return false;
        }
        self.nodes.sort_by_key(|n| rank(n.object_id));
        self.stats.reorders += 1;
        true
    }

    /// Find the topmost node at the given canvas coordinates.
    #[must_use]
    pub fn node_at(&self, x: f32, y: f32) -> Option<ObjectId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.contains_point(x, y))
            .map(|n| n.object_id)
    }

    /// The selected node's object ID.
    #[must_use]
    pub fn active_object_id(&self) -> Option<ObjectId> {
        self.active
    }

    /// Select a node as the user did it, queueing a selection event.
    ///
    /// Returns `false` if the node does not exist or was already selected.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if self.active == Some(id) || self.node(id).is_none() {
            return false;
        }
        self.active = Some(id);
        self.events.push(SceneEvent::SelectionChanged(Some(id)));
        true
    }

    /// Clear the selection as the user did it, queueing a selection event.
    pub fn deselect(&mut self) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        self.events.push(SceneEvent::SelectionChanged(None));
        true
    }

    /// Mirror a selection that originated in the store. No event is queued.
    ///
    /// IDs without a live node resolve to no selection.
    pub fn sync_selection(&mut self, id: Option<ObjectId>) -> bool {
        let target = id.filter(|id| self.node(*id).is_some());
        if self.active == target {
            return false;
        }
        self.active = target;
        true
    }

    /// Whether drag-to-select box selection is enabled.
    #[must_use]
    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    /// Enable or suppress box selection.
    pub fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
    }

    /// Which handles styled nodes show.
    #[must_use]
    pub fn control_visibility(&self) -> ControlVisibility {
        self.control_visibility
    }

    /// Set which handles styled nodes show. Takes effect on the next style pass.
    pub fn set_control_visibility(&mut self, visibility: ControlVisibility) {
        self.control_visibility = visibility;
    }

    /// The last applied style preset.
    #[must_use]
    pub fn style_preset(&self) -> Option<StylePreset> {
        self.style_preset
    }

    pub(crate) fn set_style_preset(&mut self, preset: StylePreset) {
        self.style_preset = Some(preset);
    }

    /// Appearance of the drag-to-select box.
    #[must_use]
    pub fn selection_box_style(&self) -> Option<&SelectionBoxStyle> {
        self.selection_box_style.as_ref()
    }

    pub(crate) fn set_selection_box_style(&mut self, style: SelectionBoxStyle) {
        self.selection_box_style = Some(style);
    }

    /// The node currently in a text edit session.
    #[must_use]
    pub fn editing_object_id(&self) -> Option<ObjectId> {
        self.nodes.iter().find(|n| n.is_editing()).map(|n| n.object_id)
    }

    /// Start editing a text node, ending any other edit session first.
    ///
    /// Returns `false` for missing or non-text nodes.
    pub fn begin_text_edit(&mut self, id: ObjectId) -> bool {
        if self.node(id).and_then(SceneNode::text).is_none() {
            return false;
        }
        if let Some(current) = self.editing_object_id() {
            if current == id {
                return true;
            }
            self.end_text_edit();
        }

        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let original = node.text_content().unwrap_or_default().to_string();
        node.editing = Some(TextEditSession {
            cursor: original.chars().count(),
            original,
        });
        tracing::debug!("Text edit started on {id}");
        true
    }

    fn editing_node_mut(&mut self) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.is_editing())
    }

    /// Insert text at the cursor of the active edit session.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let Some(node) = self.editing_node_mut() else {
            return false;
        };
        let cursor = node.editing.as_ref().map_or(0, |s| s.cursor);
        let Some(body) = node.text_mut() else {
            return false;
        };
        let byte = byte_offset(&body.content, cursor);
        body.content.insert_str(byte, text);
        if let Some(session) = node.editing.as_mut() {
            session.cursor += text.chars().count();
        }
        true
    }

    /// Delete the character before the cursor of the active edit session.
    pub fn delete_backward(&mut self) -> bool {
        let Some(node) = self.editing_node_mut() else {
            return false;
        };
        let cursor = node.editing.as_ref().map_or(0, |s| s.cursor);
        if cursor == 0 {
            return false;
        }
        let Some(body) = node.text_mut() else {
            return false;
        };
        let start = byte_offset(&body.content, cursor - 1);
        let end = byte_offset(&body.content, cursor);
        body.content.replace_range(start..end, "");
        if let Some(session) = node.editing.as_mut() {
            session.cursor -= 1;
        }
        true
    }

    /// Replace the whole content of the active edit session.
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        let Some(node) = self.editing_node_mut() else {
            return false;
        };
        let Some(body) = node.text_mut() else {
            return false;
        };
        body.content = text.to_string();
        if let Some(session) = node.editing.as_mut() {
            session.cursor = text.chars().count();
        }
        true
    }

    /// Move the cursor of the active edit session, clamped to the content.
    pub fn set_cursor(&mut self, cursor: usize) -> bool {
        let Some(node) = self.editing_node_mut() else {
            return false;
        };
        let len = node.text_content().map_or(0, |c| c.chars().count());
        if let Some(session) = node.editing.as_mut() {
            session.cursor = cursor.min(len);
            return true;
        }
        false
    }

    /// End the active edit session, queueing a commit of its content.
    pub fn end_text_edit(&mut self) -> Option<ObjectId> {
        let node = self.editing_node_mut()?;
        node.editing = None;
        let id = node.object_id;
        let content = node.text_content().unwrap_or_default().to_string();
        tracing::debug!("Text edit ended on {id}");
        self.events.push(SceneEvent::TextCommitted { id, content });
        Some(id)
    }

    /// Drain queued user events.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether any user events are queued.
    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Structural operation counters.
    #[must_use]
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub(crate) fn record_field_updates(&mut self, count: usize) {
        self.stats.field_updates += count as u64;
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> OverlayResult<String> {
        serde_json::to_string(self).map_err(OverlayError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        serde_json::from_str(json).map_err(OverlayError::Serialization)
    }
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_node(x: f32, y: f32) -> SceneNode {
        SceneNode::from_object(&CanvasObject::text(x, y))
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new(430.0, 700.0);
        assert!(scene.is_empty());

        let id = scene.add_node(text_node(10.0, 10.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.node(id).is_some());

        scene.remove_node(id).expect("should remove");
        assert!(scene.is_empty());
        assert!(scene.remove_node(id).is_none());
        assert_eq!(scene.stats().nodes_created, 1);
        assert_eq!(scene.stats().nodes_removed, 1);
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut scene = Scene::new(430.0, 700.0);
        let back = scene.add_node(text_node(100.0, 100.0));
        let front = scene.add_node(text_node(150.0, 110.0));

        assert_eq!(scene.node_at(160.0, 120.0), Some(front));
        assert_eq!(scene.node_at(110.0, 105.0), Some(back));
        assert_eq!(scene.node_at(5.0, 5.0), None);
    }

    #[test]
    fn test_contains_point_respects_scale_and_rotation() {
        // 200x50 box at (100,100), center (200,125)
        let mut node = text_node(100.0, 100.0);
        assert!(node.contains_point(290.0, 125.0));
        assert!(!node.contains_point(200.0, 190.0));

        node.angle = 90.0;
        // Rotated a quarter turn the box is 50 wide and 200 tall about its center.
        assert!(node.contains_point(200.0, 200.0));
        assert!(!node.contains_point(290.0, 125.0));

        node.angle = 0.0;
        node.scale_x = 2.0;
        node.scale_y = 2.0;
        // Scaled box spans x 100..500, y 100..200
        assert!(node.contains_point(480.0, 190.0));
    }

    #[test]
    fn test_movement_locks() {
        let mut node = text_node(0.0, 0.0);
        node.set_movement_locked(true);
        node.move_to(50.0, 60.0);
        assert!((node.left - 0.0).abs() < f32::EPSILON);
        assert!((node.top - 0.0).abs() < f32::EPSILON);

        node.set_movement_locked(false);
        node.move_to(50.0, 60.0);
        assert!((node.left - 50.0).abs() < f32::EPSILON);
        assert!((node.top - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_selection_events() {
        let mut scene = Scene::new(430.0, 700.0);
        let id = scene.add_node(text_node(0.0, 0.0));

        assert!(scene.select(id));
        assert!(!scene.select(id));
        assert!(scene.deselect());
        assert!(!scene.deselect());
        assert_eq!(
            scene.take_events(),
            vec![
                SceneEvent::SelectionChanged(Some(id)),
                SceneEvent::SelectionChanged(None)
            ]
        );
        assert!(!scene.has_pending_events());
    }

    #[test]
    fn test_sync_selection_is_silent() {
        let mut scene = Scene::new(430.0, 700.0);
        let id = scene.add_node(text_node(0.0, 0.0));

        assert!(scene.sync_selection(Some(id)));
        assert_eq!(scene.active_object_id(), Some(id));
        assert!(scene.sync_selection(Some(ObjectId::new())));
        assert_eq!(scene.active_object_id(), None);
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn test_text_edit_session() {
        let mut scene = Scene::new(430.0, 700.0);
        let id = scene.add_node(text_node(0.0, 0.0));

        assert!(!scene.insert_text("x"));
        assert!(scene.begin_text_edit(id));
        assert_eq!(scene.editing_object_id(), Some(id));

        assert!(scene.set_edit_text("Héllo"));
        assert!(scene.set_cursor(1));
        assert!(scene.insert_text("ey"));
        assert_eq!(scene.node(id).and_then(SceneNode::text_content), Some("Heyéllo"));
        assert!(scene.set_cursor(4));
        assert!(scene.delete_backward());
        assert_eq!(scene.node(id).and_then(SceneNode::text_content), Some("Heyllo"));

        assert_eq!(scene.end_text_edit(), Some(id));
        assert!(scene.editing_object_id().is_none());
        assert_eq!(
            scene.take_events(),
            vec![SceneEvent::TextCommitted {
                id,
                content: "Heyllo".to_string()
            }]
        );
    }

    #[test]
    fn test_begin_edit_rejects_image_nodes() {
        let mut scene = Scene::new(430.0, 700.0);
        let id = scene.add_node(SceneNode::from_object(&CanvasObject::image(
            "sticker.png",
            0.0,
            0.0,
            10.0,
            10.0,
        )));
        assert!(!scene.begin_text_edit(id));
        assert!(!scene.begin_text_edit(ObjectId::new()));
    }

    #[test]
    fn test_reorder() {
        let mut scene = Scene::new(430.0, 700.0);
        let a = scene.add_node(text_node(0.0, 0.0));
        let b = scene.add_node(text_node(0.0, 0.0));
        let c = scene.add_node(text_node(0.0, 0.0));

        assert!(!scene.reorder(&[a, b, c]));
        assert!(scene.reorder(&[c, a, b]));
        assert_eq!(scene.node_ids(), vec![c, a, b]);
        assert_eq!(scene.stats().reorders, 1);
    }

    #[test]
    fn test_scene_json_roundtrip() {
        let mut scene = Scene::new(430.0, 700.0);
        scene.add_node(text_node(1.0, 2.0));
        let json = scene.to_json().expect("serialize");
        let restored = Scene::from_json(&json).expect("deserialize");
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.node_ids(), scene.node_ids());
    }
}
