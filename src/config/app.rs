//! Feature toggles stored in `app.json`

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use super::store;
use crate::error::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "enabled")]
    pub html_widget_enabled: bool,
    #[serde(default = "enabled")]
    pub md_widget_enabled: bool,
    #[serde(default = "enabled")]
    pub qs_enabled: bool,
    /// Stored only; nothing registers the program for login
    #[serde(default)]
    pub auto_start_enabled: bool,
}

fn enabled() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            html_widget_enabled: true,
            md_widget_enabled: true,
            qs_enabled: true,
            auto_start_enabled: false,
        }
    }
}

impl AppSettings {
    /// Load toggles, falling back to defaults when the file is absent or unreadable
    pub fn load(path: &Path) -> Self {
        match store::read_json::<AppSettings>(path) {
            Ok(settings) => {
                info!(path = %path.display(), ?settings, "Loaded app settings");
                settings
            }
            Err(e) if e.is_missing() => Self::default(),
            Err(e) => {
                warn!(error = %e, "Unreadable app settings, using defaults");
                Self::default()
            }
        }
    }

    /// Write toggles atomically
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        store::write_json(path, self)
    }
}
