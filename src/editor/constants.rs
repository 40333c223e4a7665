//! Editor window layout and colors

use egui;

/// Widget editor window
pub const WIDGET_EDITOR_WIDTH: f32 = 560.0;
pub const WIDGET_EDITOR_HEIGHT: f32 = 620.0;

/// Launch bar editor window
pub const LAUNCHER_EDITOR_WIDTH: f32 = 620.0;
pub const LAUNCHER_EDITOR_HEIGHT: f32 = 420.0;

/// App settings window
pub const SETTINGS_EDITOR_WIDTH: f32 = 420.0;
pub const SETTINGS_EDITOR_HEIGHT: f32 = 340.0;

pub const MIN_WIDTH: f32 = 420.0;
pub const MIN_HEIGHT: f32 = 320.0;

/// Layout spacing
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;

/// Rows shown in the content text box
pub const CONTENT_ROWS: usize = 12;

pub const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);
pub const HINT_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);
