//! Cooperative run loop: X11 events, timers, editor children
//!
//! Each cycle drains pending events, ticks the shell's timers, polls any
//! editor child, flushes the connection, then sleeps a frame (while an
//! animation runs) or the idle interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::collection::WidgetCollection;
use crate::constants::event_loop;
use crate::editor::session::{EditorSession, SessionStatus};
use crate::exam::ExamScreen;
use crate::launcher::LaunchBar;
use crate::types::Position;
use crate::widget::PointerAction;
use crate::window::{Desktop, FloatingWindow, WindowFactory, WindowId};

/// Input the shells care about, decoupled from x11rb's event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Expose(WindowId),
    Press { window: WindowId, button: u8, root: Position },
    Motion { window: WindowId, root: Position },
    Release { window: WindowId, button: u8, root: Position },
}

pub fn translate(event: &Event) -> Option<ShellEvent> {
    match event {
        // Repaint once per exposure burst
        Event::Expose(e) if e.count == 0 => Some(ShellEvent::Expose(e.window)),
        Event::ButtonPress(e) => Some(ShellEvent::Press {
            window: e.event,
            button: e.detail,
            root: Position::new(e.root_x as i32, e.root_y as i32),
        }),
        Event::MotionNotify(e) => Some(ShellEvent::Motion {
            window: e.event,
            root: Position::new(e.root_x as i32, e.root_y as i32),
        }),
        Event::ButtonRelease(e) => Some(ShellEvent::Release {
            window: e.event,
            button: e.detail,
            root: Position::new(e.root_x as i32, e.root_y as i32),
        }),
        _ => None,
    }
}

/// Something the run loop drives
pub trait Shell {
    fn handle(&mut self, event: ShellEvent, now: Instant);

    /// Advance timers and editor sessions; `false` ends the loop
    fn tick(&mut self, now: Instant) -> bool;

    /// How long to sleep before the next cycle
    fn interval(&self) -> Duration {
        Duration::from_millis(event_loop::IDLE_MS)
    }

    /// Final flush before exit
    fn shutdown(&mut self);
}

/// Install SIGINT/SIGTERM handlers that raise the returned flag
pub fn shutdown_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        signal_hook::flag::register(SIGINT, Arc::clone(&flag)).context("Failed to register SIGINT handler")?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&flag)).context("Failed to register SIGTERM handler")?;
    }
    Ok(flag)
}

pub fn run<S: Shell>(conn: &RustConnection, shell: &mut S, shutdown: &AtomicBool) -> Result<()> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Shutdown requested");
            break;
        }

        while let Some(event) = conn.poll_for_event().context("Failed to poll for X11 event")? {
            if let Some(event) = translate(&event) {
                shell.handle(event, Instant::now());
            }
        }

        if !shell.tick(Instant::now()) {
            break;
        }

        conn.flush().context("Failed to flush X11 connection")?;
        thread::sleep(shell.interval());
    }

    shell.shutdown();
    Ok(())
}

/// Every widget of one kind in this process
pub struct WidgetShell<'d, F: WindowFactory> {
    factory: &'d F,
    collection: WidgetCollection<F::Window>,
    sessions: Vec<EditorSession>,
}

impl<'d, F: WindowFactory> WidgetShell<'d, F> {
    pub fn new(factory: &'d F, collection: WidgetCollection<F::Window>) -> Self {
        Self { factory, collection, sessions: Vec::new() }
    }

    pub fn collection(&self) -> &WidgetCollection<F::Window> {
        &self.collection
    }

    fn open_editor(&mut self, path: PathBuf) {
        if self.sessions.iter().any(|s| s.owner() == path) {
            debug!(path = %path.display(), "Editor already open");
            return;
        }
        match EditorSession::spawn_widget(&path, self.collection.kind()) {
            Ok(session) => {
                if let Some(instance) = self.collection.get_mut(&path) {
                    instance.set_editor_open(true);
                }
                self.sessions.push(session);
            }
            Err(e) => error!(error = %e, "Failed to open widget editor"),
        }
    }

    fn poll_sessions(&mut self, now: Instant) {
        let mut finished = Vec::new();
        self.sessions.retain_mut(|session| match session.poll() {
            SessionStatus::Running => true,
            SessionStatus::Finished(outcome) => {
                finished.push((session.owner().to_path_buf(), outcome));
                false
            }
        });

        for (path, outcome) in finished {
            if let Some(instance) = self.collection.get_mut(&path) {
                instance.set_editor_open(false);
            }
            match outcome {
                Some(outcome) => self.collection.apply_outcome(&path, outcome, self.factory, now),
                None => debug!(path = %path.display(), "Editor cancelled"),
            }
        }
    }
}

impl<F: WindowFactory> Shell for WidgetShell<'_, F> {
    fn handle(&mut self, event: ShellEvent, _now: Instant) {
        match event {
            ShellEvent::Expose(window) => {
                if let Some(instance) = self.collection.find_by_window(window) {
                    instance.repaint();
                }
            }
            ShellEvent::Press { window, button, root } => {
                let Some(instance) = self.collection.find_by_window(window) else {
                    return;
                };
                if instance.pointer_down(button, root) == PointerAction::OpenEditor {
                    let path = instance.path().to_path_buf();
                    self.open_editor(path);
                }
            }
            ShellEvent::Motion { root, .. } => {
                if let Some(instance) = self.collection.dragging() {
                    instance.pointer_move(root);
                }
            }
            ShellEvent::Release { window, button, .. } => {
                if let Some(instance) = self.collection.find_by_window(window) {
                    instance.pointer_up(button);
                }
            }
        }
    }

    fn tick(&mut self, now: Instant) -> bool {
        self.collection.tick(now);
        self.poll_sessions(now);

        if self.collection.is_empty() {
            info!(kind = self.collection.kind().label(), "No widgets left, exiting");
            return false;
        }
        true
    }

    fn shutdown(&mut self) {
        for session in self.sessions.drain(..) {
            session.terminate();
        }
        self.collection.flush_all();
        info!(kind = self.collection.kind().label(), "Widgets saved");
    }
}

/// The quick-launch bar process
pub struct LauncherShell<'d, F: WindowFactory + Desktop> {
    env: &'d F,
    bar: LaunchBar<F::Window>,
    session: Option<EditorSession>,
}

impl<'d, F: WindowFactory + Desktop> LauncherShell<'d, F> {
    pub fn new(env: &'d F, bar: LaunchBar<F::Window>) -> Self {
        Self { env, bar, session: None }
    }

    pub fn bar(&self) -> &LaunchBar<F::Window> {
        &self.bar
    }

    fn open_editor(&mut self) {
        if self.session.is_some() {
            return;
        }
        match EditorSession::spawn_launcher(self.bar.config_path()) {
            Ok(session) => {
                self.bar.set_editor_open(true);
                self.session = Some(session);
            }
            Err(e) => error!(error = %e, "Failed to open launch bar editor"),
        }
    }

    fn poll_session(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let SessionStatus::Finished(outcome) = session.poll() else {
            return;
        };
        self.session = None;
        self.bar.set_editor_open(false);
        match outcome {
            Some(outcome) => self.bar.apply_outcome(outcome, self.env),
            None => debug!("Launch bar editor cancelled"),
        }
    }
}

impl<F: WindowFactory + Desktop> Shell for LauncherShell<'_, F> {
    fn handle(&mut self, event: ShellEvent, now: Instant) {
        match event {
            ShellEvent::Expose(window) if window == self.bar.window_id() => self.bar.repaint(),
            ShellEvent::Press { window, button, root } if window == self.bar.window_id() => {
                if self.bar.pointer_down(button, root, now) == PointerAction::OpenEditor {
                    self.open_editor();
                }
            }
            ShellEvent::Motion { root, .. } => self.bar.pointer_move(root, now),
            ShellEvent::Release { button, root, .. } => {
                if let Some(slot) = self.bar.pointer_up(button, root, now, self.env) {
                    self.bar.launch(slot);
                }
            }
            other => warn!(event = ?other, "Event for unknown window"),
        }
    }

    fn tick(&mut self, now: Instant) -> bool {
        self.bar.tick(now, self.env);
        self.poll_session();
        true
    }

    fn interval(&self) -> Duration {
        if self.bar.is_animating() {
            Duration::from_millis(event_loop::FRAME_MS)
        } else {
            // Wake for the next sampler, but never oversleep the idle interval
            let idle = Duration::from_millis(event_loop::IDLE_MS);
            self.bar
                .next_deadline()
                .map(|due| due.saturating_duration_since(Instant::now()).clamp(Duration::from_millis(1), idle))
                .unwrap_or(idle)
        }
    }

    fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            session.terminate();
        }
        self.bar.flush();
        info!("Launch bar saved");
    }
}

/// The fullscreen exam-mode process
pub struct ExamShell<W: FloatingWindow> {
    screen: ExamScreen<W>,
}

impl<W: FloatingWindow> ExamShell<W> {
    pub fn new(screen: ExamScreen<W>) -> Self {
        Self { screen }
    }

    pub fn screen(&self) -> &ExamScreen<W> {
        &self.screen
    }
}

impl<W: FloatingWindow> Shell for ExamShell<W> {
    fn handle(&mut self, event: ShellEvent, _now: Instant) {
        match event {
            ShellEvent::Expose(window) if window == self.screen.window_id() => self.screen.repaint(),
            ShellEvent::Release { window, button, .. } if window == self.screen.window_id() => {
                self.screen.pointer_up(button)
            }
            _ => {}
        }
    }

    fn tick(&mut self, _now: Instant) -> bool {
        !self.screen.is_closed()
    }

    fn shutdown(&mut self) {
        self.screen.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::mouse;
    use crate::kind::WidgetKind;
    use crate::window::testing::{FakeDesktop, HeadlessFactory};
    use tempfile::TempDir;

    #[test]
    fn test_widget_shell_routes_drag() {
        let tmp = TempDir::new().unwrap();
        let mut collection = WidgetCollection::new(WidgetKind::Html, tmp.path().to_path_buf());
        let now = Instant::now();
        collection.create(&HeadlessFactory, now).unwrap();
        let id = collection.instances()[0].window_id();
        let mut shell = WidgetShell::new(&HeadlessFactory, collection);

        shell.handle(ShellEvent::Press { window: id, button: mouse::BUTTON_LEFT, root: Position::new(110, 110) }, now);
        shell.handle(ShellEvent::Motion { window: id, root: Position::new(310, 210) }, now);
        shell.handle(ShellEvent::Release { window: id, button: mouse::BUTTON_LEFT, root: Position::new(310, 210) }, now);
        shell.handle(ShellEvent::Motion { window: id, root: Position::new(900, 900) }, now);

        let instance = &shell.collection().instances()[0];
        assert_eq!(instance.window().position, Position::new(300, 200));
        assert!(instance.is_dirty());
    }

    #[test]
    fn test_widget_shell_ends_when_empty() {
        let tmp = TempDir::new().unwrap();
        let mut collection = WidgetCollection::new(WidgetKind::Markdown, tmp.path().to_path_buf());
        let now = Instant::now();
        let path = collection.create(&HeadlessFactory, now).unwrap();
        let mut shell = WidgetShell::new(&HeadlessFactory, collection);
        assert!(shell.tick(now));

        std::fs::remove_file(&path).unwrap();
        shell.collection.refresh_all();
        assert!(!shell.tick(now));
    }

    #[test]
    fn test_shutdown_flushes_dirty_widgets() {
        let tmp = TempDir::new().unwrap();
        let mut collection = WidgetCollection::new(WidgetKind::Html, tmp.path().to_path_buf());
        let now = Instant::now();
        let path = collection.create(&HeadlessFactory, now).unwrap();
        collection.get_mut(&path).unwrap().update_content("<p>unsaved</p>");
        let mut shell = WidgetShell::new(&HeadlessFactory, collection);

        shell.shutdown();
        assert_eq!(crate::config::store::load(&path).unwrap().content, "<p>unsaved</p>");
    }

    #[test]
    fn test_exam_shell_ends_on_right_click() {
        let desktop = FakeDesktop::new();
        let now = Instant::now();
        let screen = ExamScreen::new(&HeadlessFactory, &desktop).unwrap();
        let id = screen.window_id();
        let mut shell = ExamShell::new(screen);

        shell.handle(ShellEvent::Release { window: id, button: mouse::BUTTON_LEFT, root: Position::new(5, 5) }, now);
        assert!(shell.tick(now));

        shell.handle(ShellEvent::Release { window: id, button: mouse::BUTTON_RIGHT, root: Position::new(5, 5) }, now);
        assert!(!shell.tick(now));
        assert!(shell.screen().window().closed);
    }

    #[test]
    fn test_launcher_shell_drag_and_interval() {
        let tmp = TempDir::new().unwrap();
        let desktop = FakeDesktop::new();
        let now = Instant::now();
        let path = tmp.path().join("qs.json");
        let mut config = crate::config::LaunchBarConfig::default();
        config.position = Position::new(800, 300);
        config.save(&path).unwrap();

        let bar = LaunchBar::new(&desktop, &desktop, path, now).unwrap();
        let id = bar.window_id();
        let mut shell = LauncherShell::new(&desktop, bar);

        shell.handle(ShellEvent::Press { window: id, button: mouse::BUTTON_LEFT, root: Position::new(810, 310) }, now);
        shell.handle(ShellEvent::Motion { window: id, root: Position::new(610, 310) }, now);
        shell.handle(ShellEvent::Release { window: id, button: mouse::BUTTON_LEFT, root: Position::new(610, 310) }, now);

        assert_eq!(shell.bar().window().position, Position::new(600, 300));
        assert!(shell.interval() <= Duration::from_millis(event_loop::IDLE_MS));
    }
}
