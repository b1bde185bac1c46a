//! # Overlay Replay
//!
//! Headless driver for the overlay editor core.
//!
//! Reads a recorded editing session (a JSON script of editor actions and
//! raw input events), replays it through [`overlay_core::Editor`], and
//! prints the resulting document.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p overlay-replay -- --script session.json --pretty
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ReplayConfig` - Script location, editor configuration, output options
//! - `ReplayScript` / `ReplayStep` - The recorded session format
//! - `run_script` - Feeds each step to a fresh `Editor`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod runner;
mod script;

pub use runner::{run_script, ReplayOutcome, SkippedStep};
pub use script::{ObjectRef, ReplayScript, ReplayStep};

use std::path::{Path, PathBuf};

use clap::Parser;
use overlay_core::{EditorConfig, OverlayError};

/// Errors raised while loading or replaying a session.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A script or config file is not valid JSON for its format.
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// The editor core reported an error.
    #[error("Editor error: {0}")]
    Editor(#[from] OverlayError),
}

/// Command-line arguments for overlay-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "overlay-replay")]
#[command(about = "Replay a recorded overlay editing session headlessly")]
#[command(version)]
pub struct CliArgs {
    /// Path to the session script (JSON)
    #[arg(long, env = "OVERLAY_REPLAY_SCRIPT")]
    pub script: PathBuf,

    /// Path to an editor configuration file (JSON); overrides any config in the script
    #[arg(long, env = "OVERLAY_EDITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,

    /// Include the final live scene in the output
    #[arg(long)]
    pub scene: bool,
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Session script to replay.
    pub script: PathBuf,
    /// Editor configuration file, if any.
    pub config: Option<PathBuf>,
    /// Pretty-print the output.
    pub pretty: bool,
    /// Include the live scene in the output.
    pub include_scene: bool,
}

impl ReplayConfig {
    /// A configuration replaying `script` with default output options.
    #[must_use]
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            config: None,
            pretty: false,
            include_scene: false,
        }
    }

    /// Load the editor configuration file, if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_editor_config(&self) -> Result<Option<EditorConfig>, ReplayError> {
        self.config
            .as_deref()
            .map(read_json::<EditorConfig>)
            .transpose()
    }

    /// Load the session script.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_script(&self) -> Result<ReplayScript, ReplayError> {
        let text = read_file(&self.script)?;
        ReplayScript::from_json(&text).map_err(|source| ReplayError::Parse {
            path: self.script.clone(),
            source,
        })
    }
}

impl From<CliArgs> for ReplayConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            script: args.script,
            config: args.config,
            pretty: args.pretty,
            include_scene: args.scene,
        }
    }
}

/// Load and replay the session described by `config`.
///
/// The editor configuration comes from the config file if given, else from
/// the script, else the defaults.
///
/// # Errors
///
/// Returns an error if the script or configuration cannot be loaded, or if
/// the configuration is invalid.
/// Individual steps that cannot be applied are reported in the outcome.
pub fn replay(config: &ReplayConfig) -> Result<ReplayOutcome, ReplayError> {
    let script = config.load_script()?;
    let editor_config = config
        .load_editor_config()?
        .or_else(|| script.config.clone())
        .unwrap_or_default();
    editor_config.validate()?;
    tracing::info!(
        "Replaying {} steps from {}",
        script.steps.len(),
        config.script.display()
    );
    Ok(run_script(&script, editor_config))
}

fn read_file(path: &Path) -> Result<String, ReplayError> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ReplayError> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
