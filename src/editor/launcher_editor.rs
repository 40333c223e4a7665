//! Settings window for the launch bar's app list and opacity

use std::path::PathBuf;

use eframe::egui;
use tracing::{error, info};

use super::constants::*;
use super::protocol::{self, EditorOutcome};
use crate::config::{LaunchApp, LaunchBarConfig};
use crate::constants::launcher;

#[derive(Debug, Clone, PartialEq)]
pub struct LauncherForm {
    /// Always `MAX_APPS` rows; blank rows are dropped on save
    pub rows: Vec<LaunchApp>,
    pub opacity: f32,
}

impl LauncherForm {
    pub fn from_config(config: &LaunchBarConfig) -> Self {
        let mut rows: Vec<LaunchApp> = config.apps.iter().take(launcher::MAX_APPS).cloned().collect();
        rows.resize(launcher::MAX_APPS, LaunchApp::default());
        Self { rows, opacity: config.opacity }
    }

    pub fn outcome(&self) -> EditorOutcome {
        EditorOutcome::ApplyLauncher {
            apps: self
                .rows
                .iter()
                .filter(|app| !app.is_blank())
                .map(|app| LaunchApp {
                    name: app.name.trim().to_string(),
                    icon: app.icon.trim().to_string(),
                    command: app.command.trim().to_string(),
                })
                .collect(),
            opacity: self.opacity.clamp(0.1, 1.0),
        }
    }
}

pub struct LauncherEditorApp {
    form: LauncherForm,
    outcome_path: PathBuf,
    error_message: Option<String>,
}

impl LauncherEditorApp {
    pub fn new(config: &LaunchBarConfig, outcome_path: PathBuf) -> Self {
        Self {
            form: LauncherForm::from_config(config),
            outcome_path,
            error_message: None,
        }
    }

    fn save(&mut self, ctx: &egui::Context) {
        let outcome = self.form.outcome();
        match protocol::write_outcome(&self.outcome_path, &outcome) {
            Ok(()) => {
                info!("Launch bar settings saved");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(e) => {
                error!(error = %e, "Failed to write editor outcome");
                self.error_message = Some(format!("Could not save: {e}"));
            }
        }
    }
}

impl eframe::App for LauncherEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut save = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(launcher::TITLE);
            ui.add_space(SECTION_SPACING);

            ui.group(|ui| {
                ui.label(egui::RichText::new("Applications").strong());
                ui.label(
                    egui::RichText::new("Command may be a program path, a file or a URL")
                        .small()
                        .color(HINT_COLOR),
                );
                ui.add_space(ITEM_SPACING);

                egui::Grid::new("apps").num_columns(4).spacing([ITEM_SPACING, ITEM_SPACING]).show(ui, |ui| {
                    ui.label("");
                    ui.label("Name");
                    ui.label("Icon");
                    ui.label("Command");
                    ui.end_row();

                    for (index, app) in self.form.rows.iter_mut().enumerate() {
                        ui.label(format!("{}", index + 1));
                        ui.text_edit_singleline(&mut app.name);
                        ui.text_edit_singleline(&mut app.icon);
                        ui.text_edit_singleline(&mut app.command);
                        ui.end_row();
                    }
                });
            });

            ui.add_space(ITEM_SPACING);

            ui.group(|ui| {
                ui.label(egui::RichText::new("Appearance").strong());
                ui.add(egui::Slider::new(&mut self.form.opacity, 0.1..=1.0).text("Opacity"));
            });

            ui.add_space(SECTION_SPACING);

            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    save = true;
                }
                if ui.button("Cancel").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            if let Some(message) = &self.error_message {
                ui.colored_label(WARNING_COLOR, message);
            }
        });

        if save {
            self.save(ctx);
        }
    }
}
