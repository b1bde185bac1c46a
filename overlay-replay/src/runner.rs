//! Step-by-step replay through the editor.

use overlay_core::assets::check_image_type;
use overlay_core::{
    BaseImage, Editor, EditorConfig, EditorDocument, ImageAsset, InputEvent, KeyModifiers,
    ObjectId, PointerEvent, Scene, StoreChange, TouchEvent, TouchPoint,
};
use serde::Serialize;

use crate::script::{ObjectRef, ReplayScript, ReplayStep};
use crate::ReplayError;

/// A step that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStep {
    /// Zero-based step index.
    pub index: usize,
    /// Why it was skipped.
    pub reason: String,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    /// The canonical document.
    pub document: EditorDocument,
    /// The live scene.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    /// Steps that were applied.
    pub steps_applied: usize,
    /// Steps that were skipped.
    pub skipped: Vec<SkippedStep>,
    /// Store changes that actually altered state.
    pub changes: usize,
    /// Store revision at the end.
    pub revision: u64,
}

impl ReplayOutcome {
    /// Serialize the outcome, dropping the scene unless `include_scene`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool, include_scene: bool) -> Result<String, ReplayError> {
        let mut outcome = self.clone();
        if !include_scene {
            outcome.scene = None;
        }
        let json = if pretty {
            serde_json::to_string_pretty(&outcome)
        } else {
            serde_json::to_string(&outcome)
        };
        json.map_err(|e| ReplayError::Editor(e.into()))
    }
}

/// Replay `script` on a fresh editor built from `config`.
#[must_use]
pub fn run_script(script: &ReplayScript, config: EditorConfig) -> ReplayOutcome {
    let mut editor = Editor::with_config(config);
    let mut steps_applied = 0;
    let mut skipped = Vec::new();
    let mut changes = 0;

    for (index, step) in script.steps.iter().enumerate() {
        match apply_step(&mut editor, step) {
            Ok(step_changes) => {
                steps_applied += 1;
                changes += step_changes.iter().filter(|c| c.is_change()).count();
            }
            Err(reason) => {
                tracing::warn!("Skipping step {}: {}", index, reason);
                skipped.push(SkippedStep { index, reason });
            }
        }
    }

    tracing::info!(
        "Replay finished: {} applied, {} skipped, {} objects",
        steps_applied,
        skipped.len(),
        editor.document().object_count()
    );

    ReplayOutcome {
        document: editor.document().clone(),
        scene: Some(editor.scene().clone()),
        steps_applied,
        skipped,
        changes,
        revision: editor.store().revision(),
    }
}

fn resolve(editor: &Editor, target: &ObjectRef) -> Result<ObjectId, String> {
    let doc = editor.document();
    match target {
        ObjectRef::Active => doc
            .active_object_id
            .ok_or_else(|| "no object is selected".to_string()),
        ObjectRef::Index(index) => doc
            .objects
            .get(*index)
            .map(|o| o.id)
            .ok_or_else(|| format!("no object at index {index}")),
        ObjectRef::Id(id) => Ok(*id),
    }
}

fn apply_step(editor: &mut Editor, step: &ReplayStep) -> Result<Vec<StoreChange>, String> {
    tracing::debug!("Step: {:?}", step);
    let changes = match step {
        ReplayStep::SetBaseImage { src, width, height } => {
            vec![editor.set_base_image(BaseImage::new(src.clone(), *width, *height))]
        }
        ReplayStep::LoadImage {
            mime,
            src,
            width,
            height,
            name,
        } => {
            let asset = check_image_type(mime)
                .map(|()| ImageAsset::new(src.clone(), *width, *height, name.clone()));
            vec![editor.load_image(asset).map_err(|e| e.to_string())?]
        }
        ReplayStep::AddText => {
            let id = editor.add_text_object();
            vec![StoreChange::ObjectAdded { id }]
        }
        ReplayStep::Update { target, patch } => {
            let id = resolve(editor, target)?;
            vec![editor.update_object(id, patch.clone())]
        }
        ReplayStep::Delete { target } => {
            let id = resolve(editor, target)?;
            vec![editor.delete_object(id)]
        }
        ReplayStep::Select { target } => {
            let id = target
                .as_ref()
                .map(|t| resolve(editor, t))
                .transpose()?;
            vec![editor.set_active_object(id)]
        }
        ReplayStep::Clear => vec![editor.clear_canvas()],
        ReplayStep::Command { command } => vec![editor.apply(command.clone())],
        ReplayStep::Pointer {
            phase,
            x,
            y,
            alt,
            ctrl,
        } => {
            let modifiers = KeyModifiers {
                alt: *alt,
                ctrl: *ctrl,
                ..KeyModifiers::NONE
            };
            let event = PointerEvent::new(*phase, *x, *y).with_modifiers(modifiers);
            editor.handle_input(&InputEvent::Pointer(event)).changes
        }
        ReplayStep::Touch { phase, touches } => {
            let points = touches
                .iter()
                .zip(0u32..)
                .map(|([x, y], id)| TouchPoint::new(id, *x, *y))
                .collect();
            let event = TouchEvent::new(*phase, points, 0);
            editor.handle_input(&InputEvent::Touch(event)).changes
        }
        ReplayStep::Input { event } => editor.handle_input(event).changes,
        ReplayStep::BeginTextEdit { target } => {
            let id = resolve(editor, target)?;
            if !editor.begin_text_edit(id) {
                return Err(format!("object {id} cannot be text-edited"));
            }
            Vec::new()
        }
        ReplayStep::EditText { text } => {
            if !editor.edit_text(text) {
                return Err("no text edit in progress".to_string());
            }
            Vec::new()
        }
        ReplayStep::EndTextEdit => {
            editor.end_text_edit();
            Vec::new()
        }
        ReplayStep::CancelGesture => editor.cancel_gesture(),
    };
    Ok(changes)
}
