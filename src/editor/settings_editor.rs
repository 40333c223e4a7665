//! Feature toggle window for `app.json`, with an about tab

use std::path::PathBuf;

use eframe::egui;
use tracing::{error, info};

use super::constants::*;
use crate::config::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsTab {
    General,
    About,
}

pub struct SettingsEditorApp {
    settings: AppSettings,
    settings_path: PathBuf,
    tab: SettingsTab,
    error_message: Option<String>,
}

impl SettingsEditorApp {
    pub fn new(settings: AppSettings, settings_path: PathBuf) -> Self {
        Self {
            settings,
            settings_path,
            tab: SettingsTab::General,
            error_message: None,
        }
    }

    fn save(&mut self, ctx: &egui::Context) {
        match self.settings.save(&self.settings_path) {
            Ok(()) => {
                info!(settings = ?self.settings, "App settings saved");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(e) => {
                error!(error = %e, "Failed to save app settings");
                self.error_message = Some(format!("Could not save: {e}"));
            }
        }
    }

    fn general_tab(&mut self, ui: &mut egui::Ui) -> bool {
        let mut save = false;

        ui.group(|ui| {
            ui.label(egui::RichText::new("Features").strong());
            ui.add_space(ITEM_SPACING);
            ui.checkbox(&mut self.settings.html_widget_enabled, "HTML widgets");
            ui.checkbox(&mut self.settings.md_widget_enabled, "Markdown widgets");
            ui.checkbox(&mut self.settings.qs_enabled, "Quick-launch bar");
        });

        ui.add_space(ITEM_SPACING);

        ui.group(|ui| {
            ui.label(egui::RichText::new("Startup").strong());
            ui.add_space(ITEM_SPACING);
            ui.checkbox(&mut self.settings.auto_start_enabled, "Start automatically");
            ui.label(
                egui::RichText::new("Stored only; register the program with your session manager to start it at login")
                    .small()
                    .color(HINT_COLOR),
            );
        });

        ui.add_space(SECTION_SPACING);

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                save = true;
            }
            if ui.button("Cancel").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        if let Some(message) = &self.error_message {
            ui.colored_label(WARNING_COLOR, message);
        }
        save
    }

    fn about_tab(ui: &mut egui::Ui) {
        ui.heading(env!("CARGO_PKG_NAME"));
        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
        ui.add_space(ITEM_SPACING);
        ui.label(env!("CARGO_PKG_DESCRIPTION"));
    }
}

impl eframe::App for SettingsEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut save = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, SettingsTab::General, "General");
                ui.selectable_value(&mut self.tab, SettingsTab::About, "About");
            });
            ui.separator();
            ui.add_space(ITEM_SPACING);

            match self.tab {
                SettingsTab::General => save = self.general_tab(ui),
                SettingsTab::About => Self::about_tab(ui),
            }
        });

        if save {
            self.save(ctx);
        }
    }
}
