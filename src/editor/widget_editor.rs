//! Settings window for one widget: content, style, drag flag and the
//! context actions (new, refresh all, delete)

use std::path::PathBuf;
use std::rc::Rc;

use eframe::egui;
use tracing::{error, info};

use super::constants::*;
use super::protocol::{self, EditorOutcome};
use crate::config::WidgetConfig;
use crate::kind::WidgetKind;
use crate::markup::{self, LineKind};
use crate::render::Renderer;

/// Editable copy of a widget's config
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetForm {
    pub content: String,
    pub style: String,
    pub draggable: bool,
}

impl WidgetForm {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            content: config.content.clone(),
            style: config.style.clone(),
            draggable: config.draggable,
        }
    }
}

/// Buttons that end the editor with an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    Save,
    NewWidget,
    RefreshAll,
    Delete,
}

impl WidgetAction {
    pub fn outcome(self, form: &WidgetForm) -> EditorOutcome {
        match self {
            WidgetAction::Save => EditorOutcome::Apply {
                content: form.content.clone(),
                style: form.style.clone(),
                draggable: form.draggable,
            },
            WidgetAction::NewWidget => EditorOutcome::NewWidget,
            WidgetAction::RefreshAll => EditorOutcome::RefreshAll,
            WidgetAction::Delete => EditorOutcome::Delete,
        }
    }
}

pub struct WidgetEditorApp {
    kind: WidgetKind,
    renderer: Rc<dyn Renderer>,
    form: WidgetForm,
    outcome_path: PathBuf,
    confirm_delete: bool,
    error_message: Option<String>,
    finished: bool,
}

impl WidgetEditorApp {
    pub fn new(kind: WidgetKind, config: &WidgetConfig, outcome_path: PathBuf) -> Self {
        Self {
            kind,
            renderer: kind.renderer(),
            form: WidgetForm::from_config(config),
            outcome_path,
            confirm_delete: false,
            error_message: None,
            finished: false,
        }
    }

    fn finish(&mut self, ctx: &egui::Context, action: WidgetAction) {
        let outcome = action.outcome(&self.form);
        match protocol::write_outcome(&self.outcome_path, &outcome) {
            Ok(()) => {
                info!(?action, "Editor finished");
                self.finished = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(e) => {
                error!(error = %e, "Failed to write editor outcome");
                self.error_message = Some(format!("Could not save: {e}"));
            }
        }
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        let markup = self.renderer.render(&self.form.content);
        for line in markup::flatten(&markup) {
            let text = egui::RichText::new(&line.text);
            match line.kind {
                LineKind::Heading(_) => {
                    ui.label(text.size(14.0 * line.kind.scale()).strong());
                }
                LineKind::Body => {
                    ui.label(text);
                }
            }
        }
    }

    fn render_delete_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_delete {
            return;
        }

        let mut action = None;
        egui::Window::new("Confirm Delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Delete this widget and its file?");
                ui.colored_label(WARNING_COLOR, "This cannot be undone!");
                ui.add_space(ITEM_SPACING);

                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        action = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(false);
                    }
                });
            });

        match action {
            Some(true) => {
                self.confirm_delete = false;
                self.finish(ctx, WidgetAction::Delete);
            }
            Some(false) => self.confirm_delete = false,
            None => {}
        }
    }
}

impl eframe::App for WidgetEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = None;

        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.add_space(ITEM_SPACING);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    action = Some(WidgetAction::Save);
                }
                if ui.button("New widget").clicked() {
                    action = Some(WidgetAction::NewWidget);
                }
                if ui.button("Refresh all").clicked() {
                    action = Some(WidgetAction::RefreshAll);
                }
                if ui.button("Delete").clicked() {
                    self.confirm_delete = true;
                }
                if ui.button("Cancel").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            if let Some(message) = &self.error_message {
                ui.colored_label(WARNING_COLOR, message);
            }
            ui.add_space(ITEM_SPACING);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("{} widget", self.kind.label()));
            ui.add_space(SECTION_SPACING);

            ui.group(|ui| {
                ui.label(egui::RichText::new("Content").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut self.form.content)
                        .desired_rows(CONTENT_ROWS)
                        .desired_width(f32::INFINITY)
                        .code_editor(),
                );
            });

            ui.add_space(ITEM_SPACING);

            ui.group(|ui| {
                ui.label(egui::RichText::new("Style").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut self.form.style)
                        .hint_text("background-color: #fff; color: #000; font-size: 14px")
                        .desired_width(f32::INFINITY),
                );
                ui.checkbox(&mut self.form.draggable, "Draggable");
            });

            ui.add_space(SECTION_SPACING);
            ui.label(egui::RichText::new("Preview").strong().color(HINT_COLOR));
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    self.render_preview(ui);
                });
            });
        });

        self.render_delete_confirmation(ctx);

        if let Some(action) = action {
            self.finish(ctx, action);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.finished {
            info!("Editor closed without changes");
        }
    }
}
