//! # Overlay Studio Core
//!
//! Core logic for a touch-first photo text overlay editor.
//! Compiles to WASM for the web editor and runs natively for headless replay.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  Document Store  │  Gesture Machine         │
//! │  - Objects       │  - Drag / delete zone    │
//! │  - Selection     │  - Modifier scale/rotate │
//! │  - Canvas size   │  - Pinch and twist       │
//! ├─────────────────────────────────────────────┤
//! │  Reconciler      │  Live Scene              │
//! │  - Field diffs   │  - Nodes + edit sessions │
//! │  - Z-order       │  - Selection styling     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod color;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod export;
pub mod gesture;
pub mod object;
pub mod reconcile;
pub mod scene;
pub mod store;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use assets::{is_supported_image_type, ImageAsset, SUPPORTED_IMAGE_TYPES};
pub use color::{hex_to_rgb, rgb_to_hex, Rgb};
pub use config::{EditorConfig, GestureConfig};
pub use document::{scaled_dimensions, BaseImage, EditorDocument};
pub use editor::{Editor, InputResponse};
pub use error::{OverlayError, OverlayResult};
pub use event::{
    InputEvent, KeyModifiers, PointerButton, PointerEvent, PointerPhase, TouchEvent, TouchPhase,
    TouchPoint,
};
pub use export::{export_filename, ExportFormat, ExportOptions, ExportedImage, SceneExporter};
pub use gesture::{GestureMachine, GestureMode, GestureResponse, GestureSession};
pub use object::{
    clamp_font_size, clamp_scale, generate_object_id, validate_font_family, CanvasObject,
    FontWeight, ObjectBody, ObjectId, ObjectKind, ObjectPatch, TextAlign, TextBody,
};
pub use reconcile::{reconcile, reconcile_with, NodeField, ReconcileOptions, ReconcileReport};
pub use scene::{Scene, SceneEvent, SceneNode, SceneStats, TextEditSession};
pub use store::{DocumentStore, StoreChange, StoreCommand, StoreListener, SubscriptionId};
pub use style::{apply_style, ControlStyle, ControlVisibility, HandleKind, StylePreset};

/// Overlay core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
