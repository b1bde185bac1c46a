//! Gesture interpretation.
//!
//! [`GestureMachine`] turns raw pointer and touch input into exclusive
//! interaction modes. While a gesture is live it writes directly to the
//! scene nodes; the store only hears about it once, when the gesture ends.
//!
//! ```text
//!            ┌──────────── Dragging ───────────┐
//!            │  (plain down over a node)       │
//!   Idle ────┼──────────── Scaling ────────────┼──── Idle
//!            │  (Alt + down over selection)    │  (up / cancel / touch end:
//!            ├──────────── Rotating ───────────┤   one commit)
//!            │  (Ctrl + down over selection)   │
//!            └──────────── MultiTouch ─────────┘
//!               (two contacts with a selection)
//! ```

use serde::{Deserialize, Serialize};

use crate::config::GestureConfig;
use crate::event::{
    InputEvent, PointerButton, PointerEvent, PointerPhase, TouchEvent, TouchPhase, TouchPoint,
};
use crate::store::StoreCommand;
use crate::{ObjectId, ObjectPatch, Scene};

/// Captured state of the gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureSession {
    /// No gesture.
    #[default]
    Idle,
    /// Translating a node, possibly toward the delete zone.
    Dragging {
        /// Node being dragged.
        target: ObjectId,
        /// Pointer x minus node left at grab time.
        grab_dx: f32,
        /// Pointer y minus node top at grab time.
        grab_dy: f32,
        /// Node left at grab time.
        start_left: f32,
        /// Node top at grab time.
        start_top: f32,
        /// Live node left.
        last_left: f32,
        /// Live node top.
        last_top: f32,
        /// Whether the pointer is inside the delete zone.
        in_delete_zone: bool,
    },
    /// Vertical drag scales the selection.
    Scaling {
        /// Node being scaled.
        target: ObjectId,
        /// Scale at gesture start.
        start_scale: f32,
        /// Pointer y at gesture start.
        start_y: f32,
        /// Live scale.
        current_scale: f32,
        /// Rotation, unchanged by this gesture.
        rotation: f32,
    },
    /// Horizontal drag rotates the selection.
    Rotating {
        /// Node being rotated.
        target: ObjectId,
        /// Angle at gesture start.
        start_angle: f32,
        /// Pointer x at gesture start.
        start_x: f32,
        /// Live angle.
        current_angle: f32,
        /// Horizontal scale, unchanged by this gesture.
        scale_x: f32,
        /// Vertical scale, unchanged by this gesture.
        scale_y: f32,
    },
    /// Two-finger pinch and twist.
    MultiTouch {
        /// Node being transformed.
        target: ObjectId,
        /// Contact distance at gesture start.
        start_distance: f32,
        /// Contact angle in degrees at gesture start.
        start_angle: f32,
        /// Scale at gesture start.
        start_scale: f32,
        /// Rotation at gesture start.
        start_rotation: f32,
        /// Live scale.
        current_scale: f32,
        /// Live rotation.
        current_rotation: f32,
    },
}

/// Discriminant of a [`GestureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureMode {
    /// No gesture.
    Idle,
    /// Translating.
    Dragging,
    /// Modifier scale.
    Scaling,
    /// Modifier rotate.
    Rotating,
    /// Pinch and twist.
    MultiTouch,
}

impl GestureSession {
    /// The mode of this session.
    #[must_use]
    pub const fn mode(&self) -> GestureMode {
        match self {
            Self::Idle => GestureMode::Idle,
            Self::Dragging { .. } => GestureMode::Dragging,
            Self::Scaling { .. } => GestureMode::Scaling,
            Self::Rotating { .. } => GestureMode::Rotating,
            Self::MultiTouch { .. } => GestureMode::MultiTouch,
        }
    }

    /// The node this session manipulates.
    #[must_use]
    pub const fn target(&self) -> Option<ObjectId> {
        match self {
            Self::Idle => None,
            Self::Dragging { target, .. }
            | Self::Scaling { target, .. }
            | Self::Rotating { target, .. }
            | Self::MultiTouch { target, .. } => Some(*target),
        }
    }
}

/// Commands and platform hints produced by one input event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureResponse {
    /// Store mutations to apply, in order.
    pub commands: Vec<StoreCommand>,
    /// Whether the platform's default handling (page pinch-zoom, scrolling)
    /// must be suppressed.
    pub prevent_default: bool,
}

impl GestureResponse {
    /// Whether the response carries no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn merge(&mut self, other: Self) {
        self.commands.extend(other.commands);
        self.prevent_default |= other.prevent_default;
    }
}

/// How a session is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Release,
    Abort,
}

/// Interprets input events into gesture sessions.
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    config: GestureConfig,
    session: GestureSession,
}

impl GestureMachine {
    /// Create a machine with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a machine with custom tuning.
    ///
    /// The tuning is passed through [`GestureConfig::normalized`].
    #[must_use]
    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config: config.normalized(),
            session: GestureSession::Idle,
        }
    }

    /// The tuning in use.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// The current session.
    #[must_use]
    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    /// The current mode.
    #[must_use]
    pub fn mode(&self) -> GestureMode {
        self.session.mode()
    }

    /// The node under manipulation, if a gesture is live.
    #[must_use]
    pub fn active_target(&self) -> Option<ObjectId> {
        self.session.target()
    }

    /// Whether a gesture is live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session != GestureSession::Idle
    }

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent, scene: &mut Scene) -> GestureResponse {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer, scene),
            InputEvent::Touch(touch) => self.handle_touch(touch, scene),
        }
    }

    /// Abort the live gesture, committing its last values without deleting.
    pub fn cancel(&mut self, scene: &mut Scene) -> GestureResponse {
        self.finish(scene, Ending::Abort)
    }

    fn handle_pointer(&mut self, event: &PointerEvent, scene: &mut Scene) -> GestureResponse {
        match event.phase {
            PointerPhase::Down if event.button == PointerButton::Primary => {
                self.pointer_down(event, scene)
            }
            PointerPhase::Down => GestureResponse::default(),
            PointerPhase::Move => self.pointer_move(event.x, event.y, scene),
            PointerPhase::Up => self.finish(scene, Ending::Release),
            PointerPhase::Cancel => self.finish(scene, Ending::Abort),
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent, scene: &mut Scene) -> GestureResponse {
        let mut response = GestureResponse::default();
        if self.is_active() {
            tracing::debug!("Pointer down during {:?}, ending session", self.mode());
            response.merge(self.finish(scene, Ending::Abort));
        }

        let over_selection = scene
            .active_object_id()
            .and_then(|id| scene.node(id))
            .filter(|node| node.contains_point(event.x, event.y))
            .map(crate::SceneNode::object_id);

        if let Some(target) = over_selection {
            if event.modifiers.alt {
                self.begin_scaling(target, event.y, scene);
                return response;
            }
            if event.modifiers.ctrl {
                self.begin_rotating(target, event.x, scene);
                return response;
            }
        }

        match scene.node_at(event.x, event.y) {
            Some(target) => {
                scene.select(target);
                self.begin_dragging(target, event.x, event.y, scene);
            }
            None => {
                scene.deselect();
            }
        }
        response
    }

    fn begin_dragging(&mut self, target: ObjectId, x: f32, y: f32, scene: &Scene) {
        let Some(node) = scene.node(target) else {
            return;
        };
        self.session = GestureSession::Dragging {
            target,
            grab_dx: x - node.left,
            grab_dy: y - node.top,
            start_left: node.left,
            start_top: node.top,
            last_left: node.left,
            last_top: node.top,
            in_delete_zone: false,
        };
        tracing::debug!("Drag started on {}", target);
    }

    fn begin_scaling(&mut self, target: ObjectId, y: f32, scene: &mut Scene) {
        let Some(node) = scene.node_mut(target) else {
            return;
        };
        node.set_movement_locked(true);
        self.session = GestureSession::Scaling {
            target,
            start_scale: node.scale_x,
            start_y: y,
            current_scale: node.scale_x,
            rotation: node.angle,
        };
        scene.set_selection_enabled(false);
        tracing::debug!("Scale gesture started on {}", target);
    }

    fn begin_rotating(&mut self, target: ObjectId, x: f32, scene: &mut Scene) {
        let Some(node) = scene.node_mut(target) else {
            return;
        };
        node.set_movement_locked(true);
        self.session = GestureSession::Rotating {
            target,
            start_angle: node.angle,
            start_x: x,
            current_angle: node.angle,
            scale_x: node.scale_x,
            scale_y: node.scale_y,
        };
        scene.set_selection_enabled(false);
        tracing::debug!("Rotate gesture started on {}", target);
    }

    fn begin_multi_touch(&mut self, target: ObjectId, a: TouchPoint, b: TouchPoint, scene: &mut Scene) {
        let Some(node) = scene.node_mut(target) else {
            return;
        };
        node.set_movement_locked(true);
        self.session = GestureSession::MultiTouch {
            target,
            start_distance: contact_distance(a, b),
            start_angle: contact_angle(a, b),
            start_scale: node.scale_x,
            start_rotation: node.angle,
            current_scale: node.scale_x,
            current_rotation: node.angle,
        };
        scene.set_selection_enabled(false);
        tracing::debug!("Multi-touch gesture started on {}", target);
    }

    fn pointer_move(&mut self, x: f32, y: f32, scene: &mut Scene) -> GestureResponse {
        let mut response = GestureResponse::default();
        let min_scale = self.config.min_scale;
        let sensitivity = self.config.scale_sensitivity;
        let zone_top = scene.height - self.config.delete_zone_height;

        match &mut self.session {
            GestureSession::Dragging {
                target,
                grab_dx,
                grab_dy,
                last_left,
                last_top,
                in_delete_zone,
                ..
            } => {
                if let Some(node) = scene.node_mut(*target) {
                    node.move_to(x - *grab_dx, y - *grab_dy);
                    *last_left = node.left;
                    *last_top = node.top;
                }
                let inside = y >= zone_top;
                if inside != *in_delete_zone {
                    *in_delete_zone = inside;
                    tracing::debug!("Delete zone {}", if inside { "entered" } else { "left" });
                    response
                        .commands
                        .push(StoreCommand::SetDeleteZoneActive { active: inside });
                }
            }
            GestureSession::Scaling {
                target,
                start_scale,
                start_y,
                current_scale,
                ..
            } => {
                let scale = (*start_scale + (*start_y - y) / sensitivity).max(min_scale);
                *current_scale = scale;
                if let Some(node) = scene.node_mut(*target) {
                    node.scale_x = scale;
                    node.scale_y = scale;
                }
                tracing::trace!("Scale -> {}", scale);
            }
            GestureSession::Rotating {
                target,
                start_angle,
                start_x,
                current_angle,
                ..
            } => {
                let angle = *start_angle + (x - *start_x);
                *current_angle = angle;
                if let Some(node) = scene.node_mut(*target) {
                    node.angle = angle;
                }
                tracing::trace!("Rotation -> {}", angle);
            }
            GestureSession::Idle | GestureSession::MultiTouch { .. } => {}
        }
        response
    }

    fn multi_touch_move(&mut self, a: TouchPoint, b: TouchPoint, scene: &mut Scene) {
        let min_scale = self.config.min_scale;
        let GestureSession::MultiTouch {
            target,
            start_distance,
            start_angle,
            start_scale,
            start_rotation,
            current_scale,
            current_rotation,
        } = &mut self.session
        else {
            return;
        };

        let ratio = if *start_distance > 0.0 {
            contact_distance(a, b) / *start_distance
        } else {
            1.0
        };
        let scale = (*start_scale * ratio).max(min_scale);
        let rotation = *start_rotation + normalize_degrees(contact_angle(a, b) - *start_angle);
        *current_scale = scale;
        *current_rotation = rotation;

        if let Some(node) = scene.node_mut(*target) {
            node.scale_x = scale;
            node.scale_y = scale;
            node.angle = rotation;
        }
        tracing::trace!("Pinch -> scale {}, rotation {}", scale, rotation);
    }

    fn handle_touch(&mut self, event: &TouchEvent, scene: &mut Scene) -> GestureResponse {
        let mut response = GestureResponse::default();
        let count = event.touch_count();

        match event.phase {
            TouchPhase::Start => match (self.mode(), event.touches.as_slice()) {
                // Extra contacts joining a live pinch are ignored.
                (GestureMode::MultiTouch, _) => response.prevent_default = true,
                (_, [a, b]) => {
                    let target = scene
                        .active_object_id()
                        .filter(|id| scene.node(*id).is_some());
                    if let Some(target) = target {
                        if self.is_active() {
                            response.merge(self.finish(scene, Ending::Abort));
                        }
                        self.begin_multi_touch(target, *a, *b, scene);
                        response.prevent_default = true;
                    }
                }
                (_, [touch]) => {
                    if !self.is_active() {
                        response.merge(self.pointer_down(&PointerEvent::down(touch.x, touch.y), scene));
                    }
                }
                _ => {}
            },
            TouchPhase::Move => match (self.mode(), event.touches.as_slice()) {
                (GestureMode::MultiTouch, [a, b, ..]) => {
                    self.multi_touch_move(*a, *b, scene);
                    response.prevent_default = true;
                }
                (GestureMode::MultiTouch, _) => {
                    response.merge(self.finish(scene, Ending::Release));
                    response.prevent_default = true;
                }
                (GestureMode::Dragging, [touch]) => {
                    response.merge(self.pointer_move(touch.x, touch.y, scene));
                }
                _ => {}
            },
            TouchPhase::End | TouchPhase::Cancel => {
                let ending = if event.phase == TouchPhase::End {
                    Ending::Release
                } else {
                    Ending::Abort
                };
                match self.mode() {
                    GestureMode::MultiTouch if count < 2 => {
                        response.merge(self.finish(scene, ending));
                        response.prevent_default = true;
                    }
                    GestureMode::MultiTouch => response.prevent_default = true,
                    GestureMode::Idle => {}
                    _ if count == 0 => response.merge(self.finish(scene, ending)),
                    _ => {}
                }
            }
        }
        response
    }

    /// End the live session and produce its commit.
    fn finish(&mut self, scene: &mut Scene, ending: Ending) -> GestureResponse {
        let mut response = GestureResponse::default();
        let session = std::mem::take(&mut self.session);

        let transform_commit = |target: ObjectId, scale_x: f32, scale_y: f32, rotation: f32| {
            StoreCommand::UpdateObject {
                id: target,
                patch: ObjectPatch {
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotation: Some(rotation),
                    ..ObjectPatch::default()
                },
            }
        };

        match session {
            GestureSession::Idle => return response,
            GestureSession::Dragging {
                target,
                start_left,
                start_top,
                last_left,
                last_top,
                in_delete_zone,
                ..
            } => {
                if in_delete_zone && ending == Ending::Release {
                    tracing::debug!("Dropped {} in delete zone", target);
                    response.commands.push(StoreCommand::DeleteObject { id: target });
                    response
                        .commands
                        .push(StoreCommand::SetDeleteZoneActive { active: false });
                } else {
                    if in_delete_zone {
                        response
                            .commands
                            .push(StoreCommand::SetDeleteZoneActive { active: false });
                    }
                    #[allow(clippy::float_cmp)]
                    let moved = last_left != start_left || last_top != start_top;
                    if moved {
                        response.commands.push(StoreCommand::UpdateObject {
                            id: target,
                            patch: ObjectPatch::new().position(last_left, last_top),
                        });
                    }
                }
            }
            GestureSession::Scaling {
                target,
                current_scale,
                rotation,
                ..
            } => {
                response
                    .commands
                    .push(transform_commit(target, current_scale, current_scale, rotation));
            }
            GestureSession::Rotating {
                target,
                current_angle,
                scale_x,
                scale_y,
                ..
            } => {
                response
                    .commands
                    .push(transform_commit(target, scale_x, scale_y, current_angle));
            }
            GestureSession::MultiTouch {
                target,
                current_scale,
                current_rotation,
                ..
            } => {
                response.commands.push(transform_commit(
                    target,
                    current_scale,
                    current_scale,
                    current_rotation,
                ));
            }
        }

        if let Some(target) = session.target() {
            if let Some(node) = scene.node_mut(target) {
                node.set_movement_locked(false);
            }
            tracing::debug!("{:?} gesture ended ({:?}) on {}", session.mode(), ending, target);
        }
        scene.set_selection_enabled(true);
        response
    }
}

fn contact_distance(a: TouchPoint, b: TouchPoint) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

fn contact_angle(a: TouchPoint, b: TouchPoint) -> f32 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Wrap an angle delta into `(-180, 180]`.
fn normalize_degrees(delta: f32) -> f32 {
    let wrapped = delta % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyModifiers;
    use crate::{CanvasObject, SceneNode};

    /// Scene with one selected 200x50 node at (100, 100).
    fn scene_with_selection() -> (Scene, ObjectId) {
        let mut scene = Scene::new(430.0, 700.0);
        let id = scene.add_node(SceneNode::from_object(&CanvasObject::text(100.0, 100.0)));
        scene.sync_selection(Some(id));
        (scene, id)
    }

    fn patch_of(response: &GestureResponse) -> &ObjectPatch {
        match response.commands.as_slice() {
            [StoreCommand::UpdateObject { patch, .. }] => patch,
            other => panic!("expected one update, got {other:?}"),
        }
    }

    fn pointer(event: PointerEvent) -> InputEvent {
        InputEvent::Pointer(event)
    }

    #[test]
    fn test_scale_up_and_clamp() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::ALT)), &mut scene);
        assert_eq!(machine.mode(), GestureMode::Scaling);
        assert!(!scene.selection_enabled());
        assert!(scene.node(id).is_some_and(|n| n.lock_movement_x));

        machine.handle(&pointer(PointerEvent::moved(150.0, 20.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::up(150.0, 20.0)), &mut scene);
        let patch = patch_of(&response);
        assert_eq!(patch.scale_x, Some(2.0));
        assert_eq!(patch.scale_y, Some(2.0));
        assert_eq!(patch.rotation, Some(0.0));
        assert_eq!(machine.mode(), GestureMode::Idle);
        assert!(scene.selection_enabled());
        assert!(scene.node(id).is_some_and(|n| !n.lock_movement_x));

        let (mut scene, _) = scene_with_selection();
        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::ALT)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(150.0, 320.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::up(150.0, 320.0)), &mut scene);
        assert_eq!(patch_of(&response).scale_x, Some(0.1));
    }

    #[test]
    fn test_rotate_by_horizontal_drag() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::CTRL)), &mut scene);
        assert_eq!(machine.mode(), GestureMode::Rotating);
        machine.handle(&pointer(PointerEvent::moved(240.0, 120.0)), &mut scene);
        assert!(scene.node(id).is_some_and(|n| (n.angle - 90.0).abs() < f32::EPSILON));

        let response = machine.handle(&pointer(PointerEvent::up(240.0, 120.0)), &mut scene);
        let patch = patch_of(&response);
        assert_eq!(patch.rotation, Some(90.0));
        assert_eq!(patch.scale_x, Some(1.0));
    }

    #[test]
    fn test_scale_takes_precedence_over_rotate() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::new();
        let both = KeyModifiers {
            alt: true,
            ctrl: true,
            ..KeyModifiers::NONE
        };
        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(both)), &mut scene);
        assert_eq!(machine.mode(), GestureMode::Scaling);
    }

    #[test]
    fn test_modifier_without_selection_drags() {
        let mut scene = Scene::new(430.0, 700.0);
        let id = scene.add_node(SceneNode::from_object(&CanvasObject::text(100.0, 100.0)));
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::ALT)), &mut scene);
        assert_eq!(machine.mode(), GestureMode::Dragging);
        assert_eq!(scene.active_object_id(), Some(id));
    }

    #[test]
    fn test_drag_commits_position() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(110.0, 110.0)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(160.0, 140.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::up(160.0, 140.0)), &mut scene);

        assert_eq!(
            response.commands,
            vec![StoreCommand::UpdateObject {
                id,
                patch: ObjectPatch::new().position(150.0, 130.0)
            }]
        );
    }

    #[test]
    fn test_click_without_move_commits_nothing() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::new();
        machine.handle(&pointer(PointerEvent::down(110.0, 110.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::up(110.0, 110.0)), &mut scene);
        assert!(response.is_empty());
    }

    #[test]
    fn test_drop_in_delete_zone_deletes() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(110.0, 110.0)), &mut scene);
        let enter = machine.handle(&pointer(PointerEvent::moved(110.0, 650.0)), &mut scene);
        assert_eq!(enter.commands, vec![StoreCommand::SetDeleteZoneActive { active: true }]);
        let stay = machine.handle(&pointer(PointerEvent::moved(120.0, 660.0)), &mut scene);
        assert!(stay.is_empty());

        let response = machine.handle(&pointer(PointerEvent::up(120.0, 660.0)), &mut scene);
        assert_eq!(
            response.commands,
            vec![
                StoreCommand::DeleteObject { id },
                StoreCommand::SetDeleteZoneActive { active: false }
            ]
        );
    }

    #[test]
    fn test_leaving_delete_zone_clears_flag() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(110.0, 110.0)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(110.0, 650.0)), &mut scene);
        let exit = machine.handle(&pointer(PointerEvent::moved(110.0, 400.0)), &mut scene);
        assert_eq!(exit.commands, vec![StoreCommand::SetDeleteZoneActive { active: false }]);

        let response = machine.handle(&pointer(PointerEvent::up(110.0, 400.0)), &mut scene);
        assert_eq!(
            response.commands,
            vec![StoreCommand::UpdateObject {
                id,
                patch: ObjectPatch::new().position(100.0, 390.0)
            }]
        );
    }

    #[test]
    fn test_cancel_in_delete_zone_does_not_delete() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(110.0, 110.0)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(110.0, 650.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::cancel(110.0, 650.0)), &mut scene);

        assert!(!response
            .commands
            .iter()
            .any(|c| matches!(c, StoreCommand::DeleteObject { .. })));
        assert_eq!(response.commands[0], StoreCommand::SetDeleteZoneActive { active: false });
        assert!(matches!(response.commands[1], StoreCommand::UpdateObject { id: target, .. } if target == id));
    }

    #[test]
    fn test_down_on_empty_canvas_deselects() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();
        machine.handle(&pointer(PointerEvent::down(5.0, 5.0)), &mut scene);
        assert_eq!(machine.mode(), GestureMode::Idle);
        assert!(scene.active_object_id().is_none());
        assert_eq!(scene.take_events(), vec![crate::SceneEvent::SelectionChanged(None)]);
        assert!(scene.node(id).is_some());
    }

    #[test]
    fn test_new_down_during_session_commits_first() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::CTRL)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(180.0, 120.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::down(5.0, 5.0)), &mut scene);

        assert_eq!(patch_of(&response).rotation, Some(30.0));
        assert!(matches!(response.commands[0], StoreCommand::UpdateObject { id: target, .. } if target == id));
        assert!(scene.selection_enabled());
    }

    fn touch(phase: TouchPhase, points: &[(f32, f32)]) -> InputEvent {
        let touches = points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| TouchPoint::new(u32::try_from(i).unwrap_or_default(), *x, *y))
            .collect();
        InputEvent::Touch(TouchEvent::new(phase, touches, 0))
    }

    #[test]
    fn test_pinch_scales() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::new();

        let start = machine.handle(&touch(TouchPhase::Start, &[(100.0, 100.0), (200.0, 100.0)]), &mut scene);
        assert!(start.prevent_default);
        assert_eq!(machine.mode(), GestureMode::MultiTouch);

        let moved = machine.handle(&touch(TouchPhase::Move, &[(100.0, 100.0), (250.0, 100.0)]), &mut scene);
        assert!(moved.prevent_default);

        let response = machine.handle(&touch(TouchPhase::End, &[(100.0, 100.0)]), &mut scene);
        let patch = patch_of(&response);
        assert!(patch.scale_x.is_some_and(|s| (s - 1.5).abs() < 1e-5));
        assert!(patch.rotation.is_some_and(|r| r.abs() < 1e-4));
        assert_eq!(machine.mode(), GestureMode::Idle);
    }

    #[test]
    fn test_twist_rotates() {
        let (mut scene, id) = scene_with_selection();
        scene.node_mut(id).expect("node").angle = 10.0;
        let mut machine = GestureMachine::new();

        machine.handle(&touch(TouchPhase::Start, &[(100.0, 100.0), (200.0, 100.0)]), &mut scene);
        let (sin, cos) = 30f32.to_radians().sin_cos();
        machine.handle(
            &touch(TouchPhase::Move, &[(100.0, 100.0), (100.0 + 100.0 * cos, 100.0 + 100.0 * sin)]),
            &mut scene,
        );
        let response = machine.handle(&touch(TouchPhase::Cancel, &[]), &mut scene);
        let patch = patch_of(&response);
        assert!(patch.rotation.is_some_and(|r| (r - 40.0).abs() < 1e-3));
        assert!(patch.scale_x.is_some_and(|s| (s - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_zero_start_distance_keeps_scale() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&touch(TouchPhase::Start, &[(100.0, 100.0), (100.0, 100.0)]), &mut scene);
        machine.handle(&touch(TouchPhase::Move, &[(100.0, 100.0), (300.0, 100.0)]), &mut scene);
        let response = machine.handle(&touch(TouchPhase::End, &[]), &mut scene);
        assert_eq!(patch_of(&response).scale_x, Some(1.0));
    }

    #[test]
    fn test_two_touches_without_selection_is_ignored() {
        let mut scene = Scene::new(430.0, 700.0);
        let mut machine = GestureMachine::new();
        let response = machine.handle(&touch(TouchPhase::Start, &[(0.0, 0.0), (50.0, 0.0)]), &mut scene);
        assert!(!response.prevent_default);
        assert_eq!(machine.mode(), GestureMode::Idle);
    }

    #[test]
    fn test_three_contact_start_stays_idle() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::new();
        let response = machine.handle(
            &touch(TouchPhase::Start, &[(100.0, 100.0), (200.0, 100.0), (150.0, 200.0)]),
            &mut scene,
        );
        assert!(!response.prevent_default);
        assert!(response.commands.is_empty());
        assert_eq!(machine.mode(), GestureMode::Idle);
    }

    #[test]
    fn test_third_contact_during_pinch_is_ignored() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&touch(TouchPhase::Start, &[(100.0, 100.0), (200.0, 100.0)]), &mut scene);
        let joined = machine.handle(
            &touch(TouchPhase::Start, &[(100.0, 100.0), (200.0, 100.0), (150.0, 300.0)]),
            &mut scene,
        );
        assert!(joined.prevent_default);
        assert!(joined.commands.is_empty());
        assert_eq!(machine.mode(), GestureMode::MultiTouch);

        machine.handle(
            &touch(TouchPhase::Move, &[(100.0, 100.0), (250.0, 100.0), (150.0, 300.0)]),
            &mut scene,
        );
        let response = machine.handle(&touch(TouchPhase::End, &[(100.0, 100.0)]), &mut scene);
        assert!(patch_of(&response).scale_x.is_some_and(|s| (s - 1.5).abs() < 1e-5));
    }

    #[test]
    fn test_scale_floor_below_store_floor_is_raised() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::with_config(GestureConfig {
            min_scale: 0.05,
            ..GestureConfig::default()
        });
        assert!((machine.config().min_scale - 0.1).abs() < f32::EPSILON);

        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::ALT)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(150.0, 320.0)), &mut scene);
        assert!(scene.node(id).is_some_and(|n| (n.scale_x - 0.1).abs() < f32::EPSILON));
        let response = machine.handle(&pointer(PointerEvent::up(150.0, 320.0)), &mut scene);
        assert_eq!(patch_of(&response).scale_x, Some(0.1));
    }

    #[test]
    fn test_zero_sensitivity_uses_default() {
        let (mut scene, _) = scene_with_selection();
        let mut machine = GestureMachine::with_config(GestureConfig {
            scale_sensitivity: 0.0,
            ..GestureConfig::default()
        });

        machine.handle(&pointer(PointerEvent::down(150.0, 120.0).with_modifiers(KeyModifiers::ALT)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(151.0, 120.0)), &mut scene);
        machine.handle(&pointer(PointerEvent::moved(151.0, 70.0)), &mut scene);
        let response = machine.handle(&pointer(PointerEvent::up(151.0, 70.0)), &mut scene);
        assert_eq!(patch_of(&response).scale_x, Some(1.5));
    }

    #[test]
    fn test_single_touch_drags() {
        let (mut scene, id) = scene_with_selection();
        let mut machine = GestureMachine::new();

        machine.handle(&touch(TouchPhase::Start, &[(110.0, 110.0)]), &mut scene);
        assert_eq!(machine.mode(), GestureMode::Dragging);
        machine.handle(&touch(TouchPhase::Move, &[(130.0, 110.0)]), &mut scene);
        let response = machine.handle(&touch(TouchPhase::End, &[]), &mut scene);
        assert_eq!(
            response.commands,
            vec![StoreCommand::UpdateObject {
                id,
                patch: ObjectPatch::new().position(120.0, 100.0)
            }]
        );
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(350.0) - -10.0).abs() < 1e-4);
        assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert!((normalize_degrees(180.0) - 180.0).abs() < 1e-4);
        assert!((normalize_degrees(-180.0) - 180.0).abs() < 1e-4);
    }
}
