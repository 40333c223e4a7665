//! One floating note window bound to its config file

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::{WidgetConfig, store};
use crate::constants::{mouse, widget};
use crate::error::StoreResult;
use crate::render::Renderer;
use crate::scheduler::PeriodicTimer;
use crate::style::WidgetStyle;
use crate::types::{Dimensions, Position};
use crate::window::{FloatingWindow, WindowFactory, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Alive,
    /// Backing file vanished, the instance shut itself down
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Ignored,
    DragStarted,
    /// Secondary button: caller opens the editor
    OpenEditor,
}

pub struct WidgetInstance<W: FloatingWindow> {
    path: PathBuf,
    config: WidgetConfig,
    style: WidgetStyle,
    window: W,
    renderer: Rc<dyn Renderer>,
    autosave: PeriodicTimer,
    /// Pointer offset from the window origin while dragging
    drag_offset: Option<Position>,
    dirty: bool,
    editor_open: bool,
    closed: bool,
}

impl<W: FloatingWindow> WidgetInstance<W> {
    /// Create the window for an already-loaded config and show it
    pub fn new<F>(factory: &F, path: PathBuf, config: WidgetConfig, renderer: Rc<dyn Renderer>, now: Instant) -> Result<Self>
    where
        F: WindowFactory<Window = W>,
    {
        let window = factory
            .create_window(config.position, Dimensions::new(1, 1))
            .with_context(|| format!("Failed to create window for {}", path.display()))?;

        let mut instance = Self {
            style: WidgetStyle::parse(&config.style),
            path,
            config,
            window,
            renderer,
            autosave: PeriodicTimer::start(Duration::from_millis(widget::AUTOSAVE_INTERVAL_MS), now),
            drag_offset: None,
            dirty: false,
            editor_open: false,
            closed: false,
        };
        instance.present()?;
        Ok(instance)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    /// Pointer input is ignored while an editor is open for this instance
    pub fn set_editor_open(&mut self, open: bool) {
        self.editor_open = open;
        if open {
            self.drag_offset = None;
        }
    }

    /// Render, size to the content (capped width) and draw
    fn present(&mut self) -> Result<()> {
        let markup = self.renderer.render(&self.config.content);
        let natural = self.window.measure(&markup, &self.style, widget::MAX_CONTENT_WIDTH);
        let size = Dimensions::new(
            natural.width.clamp(1, widget::MAX_CONTENT_WIDTH),
            natural.height.max(1),
        );

        self.window.resize(size).context("Failed to resize widget window")?;
        self.window.show_markup(&markup, &self.style).context("Failed to draw widget")?;
        Ok(())
    }

    fn present_or_log(&mut self) {
        if let Err(e) = self.present() {
            warn!(path = %self.path.display(), error = %e, "Failed to present widget");
        }
    }

    /// Repaint after the window was exposed
    pub fn repaint(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.window.redraw() {
            warn!(path = %self.path.display(), error = %e, "Failed to redraw widget");
        }
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        self.config.content = content.into();
        self.dirty = true;
        self.present_or_log();
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        if self.config.draggable != draggable {
            self.config.draggable = draggable;
            self.dirty = true;
        }
        if !draggable {
            self.drag_offset = None;
        }
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.config.style = style.into();
        self.style = WidgetStyle::parse(&self.config.style);
        self.dirty = true;
        self.present_or_log();
    }

    /// Write current state to disk; failures are logged and retried on the next autosave
    pub fn flush(&mut self) {
        if self.closed {
            return;
        }
        match store::save(&self.path, &self.config) {
            Ok(()) => self.dirty = false,
            Err(e) => error!(path = %self.path.display(), error = %e, "Widget save failed, will retry"),
        }
    }

    /// Autosave when due
    pub fn tick(&mut self, now: Instant) {
        if self.autosave.poll(now) && self.dirty {
            self.flush();
        }
    }

    /// Reload from disk; a vanished file shuts the instance down
    pub fn refresh(&mut self) -> RefreshOutcome {
        if self.closed {
            return RefreshOutcome::Closed;
        }
        match store::load(&self.path) {
            Ok(config) => {
                if let Err(e) = self.window.move_to(config.position) {
                    warn!(error = %e, "Failed to move refreshed widget");
                }
                self.style = WidgetStyle::parse(&config.style);
                self.config = config;
                self.dirty = false;
                self.present_or_log();
                debug!(path = %self.path.display(), "Refreshed widget");
                RefreshOutcome::Alive
            }
            Err(e) if e.is_missing() => {
                info!(path = %self.path.display(), "Config file gone, closing widget");
                self.shut_down();
                RefreshOutcome::Closed
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping current state");
                RefreshOutcome::Alive
            }
        }
    }

    /// Remove the backing file and close the window. When the file cannot
    /// be removed the instance stays open and the error is returned.
    pub fn delete(&mut self) -> StoreResult<()> {
        if self.closed {
            return Ok(());
        }
        store::remove(&self.path)?;
        self.shut_down();
        info!(path = %self.path.display(), "Deleted widget");
        Ok(())
    }

    fn shut_down(&mut self) {
        self.autosave.stop();
        self.drag_offset = None;
        self.window.close();
        self.closed = true;
    }

    pub fn pointer_down(&mut self, button: u8, pointer: Position) -> PointerAction {
        if self.editor_open || self.closed {
            return PointerAction::Ignored;
        }
        match button {
            mouse::BUTTON_LEFT if self.config.draggable => {
                self.drag_offset = Some(pointer.offset_from(self.window.position()));
                PointerAction::DragStarted
            }
            mouse::BUTTON_RIGHT => PointerAction::OpenEditor,
            _ => PointerAction::Ignored,
        }
    }

    pub fn pointer_move(&mut self, pointer: Position) {
        let Some(offset) = self.drag_offset else {
            return;
        };
        let target = pointer.minus(offset);
        if target == self.window.position() {
            return;
        }
        match self.window.move_to(target) {
            Ok(()) => {
                self.config.position = target;
                self.dirty = true;
            }
            Err(e) => warn!(error = %e, "Failed to move widget"),
        }
    }

    pub fn pointer_up(&mut self, button: u8) {
        if button == mouse::BUTTON_LEFT {
            self.drag_offset = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HtmlRenderer, MarkdownRenderer};
    use crate::window::testing::{HeadlessFactory, HeadlessWindow};
    use std::fs;
    use tempfile::TempDir;

    fn instance(tmp: &TempDir, content: &str) -> (WidgetInstance<HeadlessWindow>, Instant) {
        let path = tmp.path().join("note.json");
        let config = WidgetConfig::with_content(content);
        store::save(&path, &config).unwrap();
        let now = Instant::now();
        let instance = WidgetInstance::new(&HeadlessFactory, path, config, Rc::new(HtmlRenderer), now).unwrap();
        (instance, now)
    }

    #[test]
    fn test_new_instance_is_sized_and_drawn() {
        let tmp = TempDir::new().unwrap();
        let (widget, _) = instance(&tmp, "<p>hello</p>");
        let window = widget.window();
        assert_eq!(window.position, Position::new(100, 100));
        assert!(window.shown.is_some());
        assert!(window.dimensions.width > 1);
    }

    #[test]
    fn test_width_is_capped() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");
        widget.update_content("word ".repeat(400));
        let size = widget.window().dimensions;
        assert!(size.width <= widget::MAX_CONTENT_WIDTH);
        assert!(size.width > widget::MAX_CONTENT_WIDTH / 2);
        // wrapped onto many lines instead of growing wider
        assert!(size.height > 10 * 16);
        assert!(widget.is_dirty());
    }

    #[test]
    fn test_update_and_flush_round_trip() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "old");
        widget.update_content("<h1>new</h1>");
        widget.set_style("color: red");
        widget.set_draggable(false);
        widget.flush();

        let stored = store::load(widget.path()).unwrap();
        assert_eq!(stored.content, "<h1>new</h1>");
        assert_eq!(stored.style, "color: red");
        assert!(!stored.draggable);
        assert!(!widget.is_dirty());
        assert_eq!(widget.window().style.foreground, 0xFFFF_0000);
    }

    #[test]
    fn test_autosave_waits_for_period() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, t0) = instance(&tmp, "old");
        widget.update_content("new");

        widget.tick(t0 + Duration::from_millis(2999));
        assert_eq!(store::load(widget.path()).unwrap().content, "old");

        widget.tick(t0 + Duration::from_millis(3000));
        assert_eq!(store::load(widget.path()).unwrap().content, "new");
    }

    #[test]
    fn test_repeated_flush_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "same");
        widget.flush();
        let first = fs::read(widget.path()).unwrap();
        widget.flush();
        assert_eq!(first, fs::read(widget.path()).unwrap());
    }

    #[test]
    fn test_failed_flush_stays_dirty() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");
        // a directory where the temp file should go makes the write fail
        fs::create_dir(tmp.path().join("note.json.tmp")).unwrap();
        widget.update_content("y");
        widget.flush();
        assert!(widget.is_dirty());
    }

    #[test]
    fn test_drag_preserves_offset() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");

        let action = widget.pointer_down(mouse::BUTTON_LEFT, Position::new(110, 120));
        assert_eq!(action, PointerAction::DragStarted);
        widget.pointer_move(Position::new(310, 420));
        widget.pointer_up(mouse::BUTTON_LEFT);
        widget.pointer_move(Position::new(0, 0));

        assert_eq!(widget.window().position, Position::new(300, 400));
        assert_eq!(widget.config().position, Position::new(300, 400));
    }

    #[test]
    fn test_no_drag_when_not_draggable() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");
        widget.set_draggable(false);

        assert_eq!(widget.pointer_down(mouse::BUTTON_LEFT, Position::new(110, 120)), PointerAction::Ignored);
        widget.pointer_move(Position::new(500, 500));
        assert_eq!(widget.window().position, Position::new(100, 100));
    }

    #[test]
    fn test_pointer_ignored_while_editor_open() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");
        assert_eq!(widget.pointer_down(mouse::BUTTON_RIGHT, Position::new(101, 101)), PointerAction::OpenEditor);

        widget.set_editor_open(true);
        assert_eq!(widget.pointer_down(mouse::BUTTON_LEFT, Position::new(101, 101)), PointerAction::Ignored);
        assert_eq!(widget.pointer_down(mouse::BUTTON_RIGHT, Position::new(101, 101)), PointerAction::Ignored);
    }

    #[test]
    fn test_refresh_reapplies_file() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");

        let mut edited = WidgetConfig::with_content("# edited");
        edited.position = Position::new(7, 8);
        store::save(widget.path(), &edited).unwrap();

        assert_eq!(widget.refresh(), RefreshOutcome::Alive);
        assert_eq!(widget.config().content, "# edited");
        assert_eq!(widget.window().position, Position::new(7, 8));
    }

    #[test]
    fn test_refresh_with_missing_file_closes() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, t0) = instance(&tmp, "x");
        fs::remove_file(widget.path()).unwrap();

        assert_eq!(widget.refresh(), RefreshOutcome::Closed);
        assert!(widget.window().closed);

        // no autosave resurrects the file
        widget.update_content("late");
        widget.tick(t0 + Duration::from_secs(10));
        assert!(!widget.path().exists());
    }

    #[test]
    fn test_refresh_with_corrupt_file_keeps_state() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "keep");
        fs::write(widget.path(), "{ nope").unwrap();

        assert_eq!(widget.refresh(), RefreshOutcome::Alive);
        assert_eq!(widget.config().content, "keep");
    }

    #[test]
    fn test_delete_is_terminal() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, t0) = instance(&tmp, "x");
        widget.update_content("dirty");
        widget.delete().unwrap();

        assert!(!widget.path().exists());
        assert!(widget.is_closed());
        assert!(widget.window().closed);
        widget.tick(t0 + Duration::from_secs(10));
        assert!(!widget.path().exists());
    }

    #[test]
    fn test_failed_delete_keeps_instance() {
        let tmp = TempDir::new().unwrap();
        let (mut widget, _) = instance(&tmp, "x");
        // a directory in place of the file cannot be removed as a file
        fs::remove_file(widget.path()).unwrap();
        fs::create_dir(widget.path()).unwrap();

        assert!(widget.delete().is_err());
        assert!(!widget.is_closed());
        assert!(!widget.window().closed);
    }

    #[test]
    fn test_markdown_renderer_is_used() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("md.json");
        let config = WidgetConfig::with_content("**bold**");
        let widget =
            WidgetInstance::new(&HeadlessFactory, path, config, Rc::new(MarkdownRenderer), Instant::now()).unwrap();
        let shown = widget.window().shown.clone().unwrap();
        assert!(shown.as_str().contains("<strong>bold</strong>"));
    }
}
