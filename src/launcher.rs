//! Quick-launch bar: a row of app buttons that docks to screen edges

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::{LaunchApp, LaunchBarConfig};
use crate::constants::{launcher, mouse};
use crate::editor::protocol::EditorOutcome;
use crate::launch::LaunchCommand;
use crate::snap_controller::EdgeSnapController;
use crate::style::WidgetStyle;
use crate::types::{Dimensions, Position, Rect};
use crate::widget::PointerAction;
use crate::window::{Desktop, FloatingWindow, PlacedText, WindowFactory, WindowId};

/// Window size for `app_count` buttons
pub fn bar_size(app_count: usize) -> Dimensions {
    if app_count == 0 {
        Dimensions::new(launcher::EMPTY_WIDTH, launcher::EMPTY_HEIGHT)
    } else {
        Dimensions::new(app_count as u32 * launcher::SLOT_WIDTH + launcher::BAR_PADDING, launcher::BAR_HEIGHT)
    }
}

/// Window-local rectangle of button `index`
pub fn slot_rect(index: usize) -> Rect {
    Rect::new(
        launcher::SLOT_MARGIN as i32 + index as i32 * launcher::SLOT_WIDTH as i32,
        launcher::BUTTON_ROW_TOP,
        launcher::SLOT_WIDTH,
        (launcher::BUTTON_ROW_BOTTOM - launcher::BUTTON_ROW_TOP) as u32,
    )
}

/// Button index under a point in window-local coordinates
pub fn slot_at(local: Position, app_count: usize) -> Option<usize> {
    (0..app_count).find(|&index| slot_rect(index).contains(local))
}

/// Everything the bar draws: the title, each app name inside its slot, and the status line
pub fn bar_labels(apps: &[LaunchApp], status: Option<&str>) -> Vec<PlacedText> {
    let text_width = bar_size(apps.len()).width.saturating_sub(launcher::SLOT_MARGIN * 2);
    let mut labels = vec![PlacedText::new(
        launcher::TITLE,
        Position::new(launcher::SLOT_MARGIN as i32, launcher::TITLE_TOP),
        text_width,
    )];

    labels.extend(apps.iter().enumerate().map(|(index, app)| {
        let slot = slot_rect(index);
        PlacedText::new(
            app.name.clone(),
            Position::new(slot.x + launcher::LABEL_INSET, slot.y + launcher::LABEL_TOP),
            slot.width - launcher::LABEL_INSET as u32 * 2,
        )
    }));

    if let Some(status) = status {
        labels.push(PlacedText::new(
            status,
            Position::new(launcher::SLOT_MARGIN as i32, launcher::STATUS_TOP),
            text_width,
        ));
    }
    labels
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: Position,
    offset: Position,
    dragged: bool,
}

pub struct LaunchBar<W: FloatingWindow> {
    config_path: PathBuf,
    config: LaunchBarConfig,
    window: W,
    controller: EdgeSnapController,
    press: Option<Press>,
    status: Option<String>,
    editor_open: bool,
}

impl<W: FloatingWindow> LaunchBar<W> {
    pub fn new<F>(factory: &F, desktop: &dyn Desktop, config_path: PathBuf, now: Instant) -> Result<Self>
    where
        F: WindowFactory<Window = W>,
    {
        let config = LaunchBarConfig::load(&config_path);
        let mut window = factory
            .create_window(config.position, bar_size(config.apps.len()))
            .context("Failed to create launch bar window")?;
        window.set_opacity(config.opacity).context("Failed to set launch bar opacity")?;

        let mut controller = EdgeSnapController::new(config.position, config.fullscreen_keywords.clone(), now);
        controller.restore_position(&mut window, desktop, config.position);

        let mut bar = Self {
            config_path,
            config,
            window,
            controller,
            press: None,
            status: None,
            editor_open: false,
        };
        bar.redraw();
        info!(apps = bar.config.apps.len(), position = ?bar.window.position(), "Launch bar ready");
        Ok(bar)
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn config(&self) -> &LaunchBarConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn controller(&self) -> &EdgeSnapController {
        &self.controller
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_editor_open(&mut self, open: bool) {
        self.editor_open = open;
        if open {
            self.press = None;
        }
    }

    fn redraw(&mut self) {
        let labels = bar_labels(&self.config.apps, self.status.as_deref());
        if let Err(e) = self.window.show_placed(&labels, &WidgetStyle::default()) {
            warn!(error = %e, "Failed to draw launch bar");
        }
    }

    /// Repaint after the window was exposed
    pub fn repaint(&mut self) {
        if let Err(e) = self.window.redraw() {
            warn!(error = %e, "Failed to repaint launch bar");
        }
    }

    fn set_status(&mut self, status: Option<String>) {
        if self.status != status {
            self.status = status;
            self.redraw();
        }
    }

    pub fn pointer_down(&mut self, button: u8, pointer: Position, now: Instant) -> PointerAction {
        if self.editor_open {
            return PointerAction::Ignored;
        }
        self.controller.record_activity(now);
        match button {
            mouse::BUTTON_LEFT => {
                self.press = Some(Press {
                    start: pointer,
                    offset: pointer.offset_from(self.window.position()),
                    dragged: false,
                });
                PointerAction::DragStarted
            }
            mouse::BUTTON_RIGHT => PointerAction::OpenEditor,
            _ => PointerAction::Ignored,
        }
    }

    pub fn pointer_move(&mut self, pointer: Position, now: Instant) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        let travel = pointer.offset_from(press.start);
        if travel.x.abs() > mouse::CLICK_SLOP || travel.y.abs() > mouse::CLICK_SLOP {
            press.dragged = true;
        }
        if !press.dragged || !self.controller.drag_allowed() {
            return;
        }

        let target = pointer.minus(press.offset);
        self.controller.record_activity(now);
        if let Err(e) = self.window.move_to(target) {
            warn!(error = %e, "Failed to move launch bar");
        }
    }

    /// End a press. Returns the slot clicked, if it was a click on a button.
    pub fn pointer_up(&mut self, button: u8, pointer: Position, now: Instant, desktop: &dyn Desktop) -> Option<usize> {
        if button != mouse::BUTTON_LEFT {
            return None;
        }
        let press = self.press.take()?;

        if press.dragged {
            self.controller.after_drag(now, &mut self.window, desktop);
            if let Some(position) = self.controller.sample_position(&self.window) {
                self.persist_position(position);
            }
            return None;
        }

        slot_at(pointer.offset_from(self.window.position()), self.config.apps.len())
    }

    /// Start the app in `index`: programs are spawned, URLs and documents opened
    pub fn launch(&mut self, index: usize) {
        self.launch_with(index, |command| {
            LaunchCommand::parse(command)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?
                .run()
        });
    }

    pub fn launch_with(&mut self, index: usize, opener: impl FnOnce(&str) -> std::io::Result<()>) {
        let Some(app) = self.config.apps.get(index).cloned() else {
            return;
        };
        let command = app.command.trim();
        if command.is_empty() {
            self.set_status(Some("No application associated".to_string()));
            return;
        }

        match opener(command) {
            Ok(()) => {
                info!(name = %app.name, command, "Launched application");
                self.set_status(None);
            }
            Err(e) => {
                error!(name = %app.name, command, error = %e, "Failed to launch application");
                self.set_status(Some(format!("Failed to launch {}: {e}", app.name)));
            }
        }
    }

    pub fn tick(&mut self, now: Instant, desktop: &dyn Desktop) {
        if let Some(position) = self.controller.tick(now, &mut self.window, desktop) {
            self.persist_position(position);
        }
    }

    /// A failed write leaves the position unconfirmed, so the next sample retries it
    fn persist_position(&mut self, position: Position) {
        self.config.position = position;
        if self.save() {
            self.controller.mark_persisted(position);
        }
    }

    fn save(&self) -> bool {
        match self.config.save(&self.config_path) {
            Ok(()) => {
                info!(position = ?self.config.position, "Saved launch bar config");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to save launch bar config, will retry");
                false
            }
        }
    }

    /// Final save on shutdown
    pub fn flush(&mut self) {
        match self.controller.sample_position(&self.window) {
            Some(position) => self.persist_position(position),
            None => {
                self.save();
            }
        }
    }

    pub fn apply_outcome(&mut self, outcome: EditorOutcome, desktop: &dyn Desktop) {
        let (apps, opacity) = match outcome {
            EditorOutcome::ApplyLauncher { apps, opacity } => (apps, opacity),
            other => {
                warn!(outcome = ?other, "Unexpected editor outcome for launch bar");
                return;
            }
        };

        self.config.set_apps(apps);
        self.config.opacity = opacity.clamp(0.1, 1.0);
        if let Err(e) = self.window.set_opacity(self.config.opacity) {
            warn!(error = %e, "Failed to apply opacity");
        }
        if let Err(e) = self.window.resize(bar_size(self.config.apps.len())) {
            warn!(error = %e, "Failed to resize launch bar");
        }
        self.status = None;
        self.redraw();
        self.controller.after_resize(&mut self.window, desktop);
        self.save();
    }

    pub fn is_animating(&self) -> bool {
        self.controller.is_animating()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }
}
