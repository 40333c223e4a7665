//! Result handed from an editor process back to the window that opened it

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{LaunchApp, store};
use crate::error::StoreResult;

/// What the user chose in the editor. Closing the editor without a choice
/// writes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorOutcome {
    /// Save edited content, style and drag flag
    Apply { content: String, style: String, draggable: bool },
    /// Create a sibling widget of the same kind
    NewWidget,
    /// Reload every widget of the kind from disk
    RefreshAll,
    /// Delete the widget that opened the editor
    Delete,
    /// Replace the launch bar's app list and opacity
    ApplyLauncher { apps: Vec<LaunchApp>, opacity: f32 },
}

pub fn write_outcome(path: &Path, outcome: &EditorOutcome) -> StoreResult<()> {
    store::write_json(path, outcome)
}

/// Read an outcome file; `None` when the editor wrote nothing
pub fn read_outcome(path: &Path) -> StoreResult<Option<EditorOutcome>> {
    match store::read_json(path) {
        Ok(outcome) => Ok(Some(outcome)),
        Err(e) if e.is_missing() => Ok(None),
        Err(e) => Err(e),
    }
}
