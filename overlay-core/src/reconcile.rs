//! Reconciliation of canonical objects into the live scene.
//!
//! A pass removes stale nodes, patches only the fields that differ on
//! surviving nodes, creates missing nodes, and restores canonical z-order.
//! A node in a text-edit session keeps its displayed content; every other
//! field still follows the store. Running a second pass with no store
//! change in between does nothing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::style::apply_style;
use crate::{CanvasObject, ObjectBody, ObjectId, Scene, SceneNode};

/// A node field rewritten by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeField {
    /// Left edge.
    Left,
    /// Top edge.
    Top,
    /// Nominal width.
    Width,
    /// Nominal height.
    Height,
    /// Rotation.
    Angle,
    /// Horizontal scale.
    ScaleX,
    /// Vertical scale.
    ScaleY,
    /// Text content.
    Content,
    /// Font family.
    FontFamily,
    /// Font size.
    FontSize,
    /// Fill color.
    Fill,
    /// Font weight.
    FontWeight,
    /// Text alignment.
    TextAlign,
    /// Fixed wrap width.
    TextBoxWidth,
    /// Image source.
    Source,
    /// The whole body, when the object kind changed.
    Kind,
}

/// Knobs for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Node under an active gesture. Its position, rotation, and scale are
    /// owned by the gesture until it commits, so they are not overwritten.
    pub gesture_target: Option<ObjectId>,
}

/// What a reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Nodes created for new objects.
    pub created: Vec<ObjectId>,
    /// Nodes removed for deleted objects.
    pub removed: Vec<ObjectId>,
    /// Surviving nodes and the fields that were rewritten on each.
    pub updated: Vec<(ObjectId, Vec<NodeField>)>,
    /// Whether the node order was changed.
    pub reordered: bool,
    /// Nodes whose control styling was reapplied.
    pub restyled: usize,
}

impl ReconcileReport {
    /// Whether the pass left the scene untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && !self.reordered
            && self.restyled == 0
    }

    /// Whether nodes were created or removed.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !self.created.is_empty() || !self.removed.is_empty()
    }

    /// Total number of rewritten fields.
    #[must_use]
    pub fn field_update_count(&self) -> usize {
        self.updated.iter().map(|(_, fields)| fields.len()).sum()
    }
}

/// Bring `scene` in line with `objects` using default options.
pub fn reconcile(scene: &mut Scene, objects: &[CanvasObject]) -> ReconcileReport {
    reconcile_with(scene, objects, &ReconcileOptions::default())
}

/// Bring `scene` in line with `objects`.
pub fn reconcile_with(
    scene: &mut Scene,
    objects: &[CanvasObject],
    options: &ReconcileOptions,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let canonical: HashSet<ObjectId> = objects.iter().map(|o| o.id).collect();
    for id in scene.node_ids() {
        if !canonical.contains(&id) {
            scene.remove_node(id);
            report.removed.push(id);
        }
    }

    for object in objects {
        let skip_geometry = options.gesture_target == Some(object.id);
        let fields = scene
            .node_mut(object.id)
            .map(|node| sync_node(node, object, skip_geometry));

        match fields {
            Some(fields) if fields.is_empty() => {}
            Some(fields) => {
                scene.record_field_updates(fields.len());
                report.updated.push((object.id, fields));
            }
            None => {
                scene.add_node(SceneNode::from_object(object));
                report.created.push(object.id);
            }
        }
    }

    let order: Vec<ObjectId> = objects.iter().map(|o| o.id).collect();
    report.reordered = scene.reorder(&order);

    if report.is_structural() {
        if let Some(preset) = scene.style_preset() {
            report.restyled = apply_style(scene, preset);
        }
    }

    if !report.is_noop() {
        tracing::debug!(
            "Reconciled: {} created, {} removed, {} fields updated, reordered: {}",
            report.created.len(),
            report.removed.len(),
            report.field_update_count(),
            report.reordered
        );
    }
    report
}

/// Write `value` into `slot` if it differs, recording `field`.
fn assign<T: PartialEq>(slot: &mut T, value: T, field: NodeField, fields: &mut Vec<NodeField>) {
    if *slot != value {
        *slot = value;
        fields.push(field);
    }
}

fn sync_node(node: &mut SceneNode, object: &CanvasObject, skip_geometry: bool) -> Vec<NodeField> {
    let mut fields = Vec::new();

    if !skip_geometry {
        assign(&mut node.left, object.x, NodeField::Left, &mut fields);
        assign(&mut node.top, object.y, NodeField::Top, &mut fields);
        assign(&mut node.angle, object.rotation, NodeField::Angle, &mut fields);
        assign(&mut node.scale_x, object.scale_x, NodeField::ScaleX, &mut fields);
        assign(&mut node.scale_y, object.scale_y, NodeField::ScaleY, &mut fields);
    }
    assign(&mut node.width, object.width, NodeField::Width, &mut fields);
    assign(&mut node.height, object.height, NodeField::Height, &mut fields);

    let editing = node.is_editing();
    match (&mut node.body, &object.body) {
        (ObjectBody::Text(live), ObjectBody::Text(canonical)) => {
            if !editing {
                assign(
                    &mut live.content,
                    canonical.content.clone(),
                    NodeField::Content,
                    &mut fields,
                );
            }
            assign(
                &mut live.font_family,
                canonical.font_family.clone(),
                NodeField::FontFamily,
                &mut fields,
            );
            assign(&mut live.font_size, canonical.font_size, NodeField::FontSize, &mut fields);
            assign(&mut live.fill, canonical.fill.clone(), NodeField::Fill, &mut fields);
            assign(
                &mut live.font_weight,
                canonical.font_weight,
                NodeField::FontWeight,
                &mut fields,
            );
            assign(&mut live.text_align, canonical.text_align, NodeField::TextAlign, &mut fields);
            assign(
                &mut live.text_box_width,
                canonical.text_box_width,
                NodeField::TextBoxWidth,
                &mut fields,
            );
        }
        (ObjectBody::Image { src: live }, ObjectBody::Image { src: canonical }) => {
            assign(live, canonical.clone(), NodeField::Source, &mut fields);
        }
        (body, canonical) if !editing => {
            *body = canonical.clone();
            fields.push(NodeField::Kind);
        }
        _ => {}
    }

    fields
}
