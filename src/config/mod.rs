//! Configuration and persistence
//!
//! - **store**: one JSON file per widget instance, plus the atomic JSON
//!   helpers everything else persists through
//! - **launcher**: the quick-launch bar's `qs.json`
//! - **app**: feature toggles in `app.json`

pub mod app;
pub mod launcher;
pub mod store;

pub use app::AppSettings;
pub use launcher::{LaunchApp, LaunchBarConfig};
pub use store::WidgetConfig;

use std::path::{Path, PathBuf};

use crate::constants::paths;

/// Root directory holding every widget kind's files
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data dir (e.g. `~/.local/share/sticky-widgets`), or `./data`
    pub fn platform_default() -> Self {
        let root = dirs::data_dir()
            .map(|dir| dir.join(paths::APP_DIR))
            .unwrap_or_else(|| PathBuf::from(paths::FALLBACK_DATA_DIR));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn html_widgets(&self) -> PathBuf {
        self.root.join(paths::HTML_DIR)
    }

    pub fn markdown_widgets(&self) -> PathBuf {
        self.root.join(paths::MARKDOWN_DIR)
    }

    pub fn launcher_config(&self) -> PathBuf {
        self.root.join(paths::LAUNCHER_FILE)
    }

    pub fn app_settings(&self) -> PathBuf {
        self.root.join(paths::APP_SETTINGS_FILE)
    }
}
