//! Selection affordance styling.
//!
//! Purely cosmetic. Styling decides how selection borders and transform
//! handles look on each live node; it never touches canonical object data.
//! Nodes created by reconciliation start unstyled, so the reconciler
//! re-applies the scene's preset after every structural change.

use serde::{Deserialize, Serialize};

use crate::Scene;

/// Translucent fill of the drag-to-select box.
pub const SELECTION_BOX_FILL: &str = "rgba(0, 217, 255, 0.1)";

/// Named selection style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    /// Small translucent square handles.
    Default,
    /// Touch-friendly: large hollow circles, high-contrast cyan, custom rotate glyph.
    #[default]
    Mobile,
}

/// Which transform handles are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlVisibility {
    /// Four corners plus rotate.
    #[default]
    Minimal,
    /// Four corners, four edge midpoints, plus rotate.
    Full,
}

/// A transform handle on a selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Middle of the left edge.
    MiddleLeft,
    /// Middle of the top edge.
    MiddleTop,
    /// Middle of the right edge.
    MiddleRight,
    /// Middle of the bottom edge.
    MiddleBottom,
    /// Rotation handle above the top edge.
    Rotate,
}

impl HandleKind {
    /// Every handle kind in draw order.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::MiddleLeft,
        Self::MiddleTop,
        Self::MiddleRight,
        Self::MiddleBottom,
        Self::Rotate,
    ];

    /// Whether this is one of the edge-midpoint handles.
    #[must_use]
    pub const fn is_middle(self) -> bool {
        matches!(
            self,
            Self::MiddleLeft | Self::MiddleTop | Self::MiddleRight | Self::MiddleBottom
        )
    }
}

/// Shape used to draw corner handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerShape {
    /// Square handles.
    Rect,
    /// Circular handles.
    Circle,
}

/// Glyph drawn for the rotation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateGlyph {
    /// Same shape as the corner handles.
    Standard,
    /// Upper semicircle with an arrowhead at each end.
    ArcWithArrows,
}

/// How a handle is filled when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleFill {
    /// Solid fill.
    Filled,
    /// Outline only.
    Hollow,
}

/// Border and handle appearance of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionStyle {
    /// Selection border color.
    pub border_color: String,
    /// Corner handle color.
    pub corner_color: String,
    /// Corner handle size in pixels.
    pub corner_size: f32,
    /// Corner handle shape.
    pub corner_shape: CornerShape,
    /// Border width multiplier.
    pub border_scale_factor: f32,
    /// Whether corner handles are drawn unfilled.
    pub transparent_corners: bool,
    /// Corner outline color.
    pub corner_stroke_color: String,
    /// Dash pattern of the border, solid when `None`.
    pub border_dash: Option<Vec<f32>>,
}

impl StylePreset {
    /// The border and handle appearance for this preset.
    #[must_use]
    pub fn selection_style(self) -> SelectionStyle {
        match self {
            Self::Default => SelectionStyle {
                border_color: "rgba(102, 153, 255, 0.75)".to_string(),
                corner_color: "rgba(102, 153, 255, 0.5)".to_string(),
                corner_size: 13.0,
                corner_shape: CornerShape::Rect,
                border_scale_factor: 1.0,
                transparent_corners: false,
                corner_stroke_color: "rgba(102, 153, 255, 1)".to_string(),
                border_dash: None,
            },
            Self::Mobile => SelectionStyle {
                border_color: "#00D9FF".to_string(),
                corner_color: "#00D9FF".to_string(),
                corner_size: 24.0,
                corner_shape: CornerShape::Circle,
                border_scale_factor: 2.0,
                transparent_corners: false,
                corner_stroke_color: "#00D9FF".to_string(),
                border_dash: None,
            },
        }
    }
}

/// Appearance of the drag-to-select box, stored on the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionBoxStyle {
    /// Fill of the selection box.
    pub fill: String,
    /// Border color of the selection box.
    pub border_color: String,
    /// Border width.
    pub line_width: f32,
}

/// Per-node control styling produced by a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlStyle {
    /// Preset this style came from.
    pub preset: StylePreset,
    /// Border and handle appearance.
    pub selection: SelectionStyle,
    /// Handles that are drawn and hit-testable.
    pub visible_handles: Vec<HandleKind>,
    /// Rotation handle glyph.
    pub rotate_glyph: RotateGlyph,
    /// Gap between the node bounds and the selection border.
    pub padding: f32,
}

impl ControlStyle {
    /// Build the control style for a preset and visibility mode.
    ///
    /// Middle handles are only hidden for the mobile preset; the default
    /// preset always shows the full set.
    #[must_use]
    pub fn for_preset(preset: StylePreset, visibility: ControlVisibility) -> Self {
        let hide_middle = preset == StylePreset::Mobile && visibility == ControlVisibility::Minimal;
        let visible_handles = HandleKind::ALL
            .into_iter()
            .filter(|h| !(hide_middle && h.is_middle()))
            .collect();
        let rotate_glyph = match preset {
            StylePreset::Default => RotateGlyph::Standard,
            StylePreset::Mobile => RotateGlyph::ArcWithArrows,
        };

        Self {
            preset,
            selection: preset.selection_style(),
            visible_handles,
            rotate_glyph,
            padding: 0.0,
        }
    }

    /// Whether a handle is drawn.
    #[must_use]
    pub fn is_visible(&self, handle: HandleKind) -> bool {
        self.visible_handles.contains(&handle)
    }

    /// How to fill `handle` given the handle currently being dragged.
    ///
    /// Mobile corners are hollow circles that fill in while their own handle
    /// is dragged. The default preset follows `transparent_corners`.
    #[must_use]
    pub fn corner_fill(&self, handle: HandleKind, active: Option<HandleKind>) -> HandleFill {
        match self.preset {
            StylePreset::Mobile if handle != HandleKind::Rotate => {
                if active == Some(handle) {
                    HandleFill::Filled
                } else {
                    HandleFill::Hollow
                }
            }
            _ if self.selection.transparent_corners => HandleFill::Hollow,
            _ => HandleFill::Filled,
        }
    }
}

/// Apply a selection style preset to a scene.
///
/// Sets the scene's selection box appearance and the control style of every
/// node. Idempotent: nodes already carrying the target style are left alone.
/// Returns the number of nodes whose styling changed.
pub fn apply_style(scene: &mut Scene, preset: StylePreset) -> usize {
    let controls = ControlStyle::for_preset(preset, scene.control_visibility());
    let selection = preset.selection_style();

    scene.set_selection_box_style(SelectionBoxStyle {
        fill: SELECTION_BOX_FILL.to_string(),
        border_color: selection.border_color.clone(),
        line_width: selection.border_scale_factor,
    });
    scene.set_style_preset(preset);

    let mut restyled = 0;
    for node in scene.nodes_mut() {
        if node.controls.as_ref() != Some(&controls) {
            node.controls = Some(controls.clone());
            restyled += 1;
        }
    }

    if restyled > 0 {
        tracing::debug!("Applied {:?} selection style to {} nodes", preset, restyled);
    }
    restyled
}
