//! Recorded session format.

use overlay_core::{
    EditorConfig, InputEvent, ObjectId, ObjectPatch, PointerPhase, StoreCommand, TouchPhase,
};
use serde::{Deserialize, Serialize};

/// How a step names its target object.
///
/// Scripts are written before object IDs exist, so objects are usually
/// addressed by selection or by z-order index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectRef {
    /// The selected object.
    Active,
    /// The object at this z-order index (0 is the back).
    Index(usize),
    /// An object by ID.
    Id(ObjectId),
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Set the background photo directly.
    SetBaseImage {
        /// Content handle.
        src: String,
        /// Natural width.
        width: u32,
        /// Natural height.
        height: u32,
    },
    /// Feed a loaded file through type and dimension validation.
    LoadImage {
        /// Reported MIME type.
        mime: String,
        /// Content handle.
        src: String,
        /// Natural width.
        width: u32,
        /// Natural height.
        height: u32,
        /// File name.
        #[serde(default)]
        name: String,
    },
    /// Add a text object.
    AddText,
    /// Patch an object.
    Update {
        /// Target object.
        target: ObjectRef,
        /// Fields to merge.
        patch: ObjectPatch,
    },
    /// Delete an object.
    Delete {
        /// Target object.
        target: ObjectRef,
    },
    /// Select an object, or clear the selection.
    Select {
        /// Target object, `null` to clear.
        target: Option<ObjectRef>,
    },
    /// Reset the canvas.
    Clear,
    /// A raw store command.
    Command {
        /// The command.
        command: StoreCommand,
    },
    /// A pointer event.
    Pointer {
        /// Phase.
        phase: PointerPhase,
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Alt held.
        #[serde(default)]
        alt: bool,
        /// Ctrl held.
        #[serde(default)]
        ctrl: bool,
    },
    /// A touch event given as contact positions.
    Touch {
        /// Phase.
        phase: TouchPhase,
        /// Contacts still on the surface, as `[x, y]` pairs.
        #[serde(default)]
        touches: Vec<[f32; 2]>,
    },
    /// A fully specified input event.
    Input {
        /// The event.
        event: InputEvent,
    },
    /// Start a text edit.
    BeginTextEdit {
        /// Target object.
        target: ObjectRef,
    },
    /// Replace the text being edited.
    EditText {
        /// New content.
        text: String,
    },
    /// Commit the text edit.
    EndTextEdit,
    /// Abort the live gesture.
    CancelGesture,
}

/// A recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Editor configuration recorded with the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EditorConfig>,
    /// Steps in order.
    pub steps: Vec<ReplayStep>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Full(ReplayScript),
    Steps(Vec<ReplayStep>),
}

impl ReplayScript {
    /// A script with these steps and no recorded configuration.
    #[must_use]
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            config: None,
            steps,
        }
    }

    /// Parse a script. Accepts either `{"config": ..., "steps": [...]}` or a
    /// bare array of steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON matches neither form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            ScriptFile::Full(script) => script,
            ScriptFile::Steps(steps) => Self::new(steps),
        })
    }
}
