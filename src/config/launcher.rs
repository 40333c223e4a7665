//! Quick-launch bar configuration (`qs.json`)
//!
//! Keys this program does not interpret (the weather city for instance)
//! are carried through load/save untouched.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use super::store;
use crate::constants::launcher;
use crate::error::StoreResult;
use crate::types::Position;

/// One launchable entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchApp {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub command: String,
}

impl LaunchApp {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.command.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchBarConfig {
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    #[serde(default)]
    pub apps: Vec<LaunchApp>,

    #[serde(default = "default_position")]
    pub position: Position,

    /// Foreground titles that suppress the bar while fullscreen
    #[serde(default = "default_fullscreen_keywords")]
    pub fullscreen_keywords: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_opacity() -> f32 {
    launcher::DEFAULT_OPACITY
}

fn default_position() -> Position {
    Position::new(launcher::DEFAULT_X, launcher::DEFAULT_Y)
}

fn default_fullscreen_keywords() -> Vec<String> {
    launcher::DEFAULT_FULLSCREEN_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl Default for LaunchBarConfig {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            apps: Vec::new(),
            position: default_position(),
            fullscreen_keywords: default_fullscreen_keywords(),
            extra: serde_json::Map::new(),
        }
    }
}

impl LaunchBarConfig {
    /// Load the bar config; absent or corrupt files yield defaults
    pub fn load(path: &Path) -> Self {
        match store::read_json::<LaunchBarConfig>(path) {
            Ok(mut config) => {
                config.opacity = config.opacity.clamp(0.1, 1.0);
                let apps = std::mem::take(&mut config.apps);
                config.set_apps(apps);
                info!(path = %path.display(), apps = config.apps.len(), "Loaded launch bar config");
                config
            }
            Err(e) if e.is_missing() => {
                info!(path = %path.display(), "No launch bar config yet, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "Launch bar config unreadable, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        store::write_json(path, self)
    }

    /// Replace the app list, dropping blank rows and capping the count
    pub fn set_apps(&mut self, apps: Vec<LaunchApp>) {
        self.apps = apps
            .into_iter()
            .filter(|app| !app.is_blank())
            .take(launcher::MAX_APPS)
            .collect();
    }
}
