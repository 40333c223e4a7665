//! Settings editor, run as a short-lived child process
//!
//! The widget or launch bar that wants editing spawns this binary with
//! `--edit-widget`/`--edit-launcher` ([`session`]). The editor writes at
//! most one [`protocol::EditorOutcome`] and exits; the parent applies it.
//! The `settings` target opens [`settings_editor`] on its own and writes
//! `app.json` directly.

pub mod constants;
pub mod launcher_editor;
pub mod protocol;
pub mod session;
pub mod settings_editor;
pub mod widget_editor;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use eframe::{NativeOptions, egui};
use tracing::{info, warn};

use self::constants::*;
use crate::config::{AppSettings, LaunchBarConfig, store};
use crate::constants::presentation;
use crate::font_discovery;
use crate::kind::WidgetKind;

/// Add a system font covering CJK so non-Latin notes display in the editor
fn install_fonts(ctx: &egui::Context) {
    let path = match font_discovery::resolve_font(presentation::FONT_FAMILY) {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "No system font for the editor, using egui defaults");
            return;
        }
    };
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read editor font");
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("system".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("system".to_owned());
    }
    ctx.set_fonts(fonts);
    info!(path = %path.display(), "Installed editor font");
}

fn options(title: &str, width: f32, height: f32) -> NativeOptions {
    NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([MIN_WIDTH, MIN_HEIGHT])
            .with_always_on_top()
            .with_title(title),
        ..Default::default()
    }
}

pub fn run_widget_editor(config_path: &Path, kind: WidgetKind, outcome_path: PathBuf) -> Result<()> {
    let config = store::load(config_path)
        .with_context(|| format!("Failed to load widget config {}", config_path.display()))?;
    let title = format!("{} widget settings", kind.label());

    eframe::run_native(
        &title,
        options(&title, WIDGET_EDITOR_WIDTH, WIDGET_EDITOR_HEIGHT),
        Box::new(move |cc| {
            install_fonts(&cc.egui_ctx);
            Ok(Box::new(widget_editor::WidgetEditorApp::new(kind, &config, outcome_path)))
        }),
    )
    .map_err(|err| anyhow!("Failed to launch widget editor: {err}"))
}

pub fn run_launcher_editor(config_path: &Path, outcome_path: PathBuf) -> Result<()> {
    let config = LaunchBarConfig::load(config_path);
    let title = "Launch bar settings";

    eframe::run_native(
        title,
        options(title, LAUNCHER_EDITOR_WIDTH, LAUNCHER_EDITOR_HEIGHT),
        Box::new(move |cc| {
            install_fonts(&cc.egui_ctx);
            Ok(Box::new(launcher_editor::LauncherEditorApp::new(&config, outcome_path)))
        }),
    )
    .map_err(|err| anyhow!("Failed to launch launch bar editor: {err}"))
}

pub fn run_settings_editor(settings_path: &Path) -> Result<()> {
    let settings = AppSettings::load(settings_path);
    let settings_path = settings_path.to_path_buf();
    let title = "Settings";

    eframe::run_native(
        title,
        options(title, SETTINGS_EDITOR_WIDTH, SETTINGS_EDITOR_HEIGHT),
        Box::new(move |cc| {
            install_fonts(&cc.egui_ctx);
            Ok(Box::new(settings_editor::SettingsEditorApp::new(settings, settings_path)))
        }),
    )
    .map_err(|err| anyhow!("Failed to launch settings window: {err}"))
}
