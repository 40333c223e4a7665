//! Edge docking and auto-hide for the launch bar
//!
//! A window released near the left or right edge of the work area snaps
//! flush to it (`NearEdge`). After a second without pointer activity it
//! slides out until only a sliver is visible (`Hidden`); moving the cursor
//! onto that sliver slides it back. Independently, while a fullscreen
//! presentation app has focus the window is hidden entirely.
//!
//! The controller owns no window. Every call receives the window and the
//! desktop to act on, and time is passed in explicitly.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::animation::SlideAnimation;
use crate::constants::snap;
use crate::scheduler::Scheduler;
use crate::snapping::{self, Edge};
use crate::types::Position;
use crate::window::{Desktop, FloatingWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Hide,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapState {
    Docked,
    NearEdge,
    Hidden,
    Animating(SlideDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapTimer {
    SavePosition,
    FullscreenCheck,
    Inactivity,
    CursorCheck,
}

pub struct EdgeSnapController {
    state: SnapState,
    hidden_edge: Option<Edge>,
    last_activity: Instant,
    last_persisted: Position,
    /// Docked position to report while slid out of view
    resting: Position,
    /// Hidden because a fullscreen app is in front
    suppressed: bool,
    keywords: Vec<String>,
    animation: Option<SlideAnimation>,
    scheduler: Scheduler<SnapTimer>,
}

impl EdgeSnapController {
    pub fn new(saved: Position, keywords: Vec<String>, now: Instant) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.register(SnapTimer::SavePosition, Duration::from_millis(snap::POSITION_SAMPLE_MS), now);
        scheduler.register(SnapTimer::FullscreenCheck, Duration::from_millis(snap::FULLSCREEN_SAMPLE_MS), now);
        scheduler.register(SnapTimer::Inactivity, Duration::from_millis(snap::INACTIVITY_SAMPLE_MS), now);
        scheduler.register(SnapTimer::CursorCheck, Duration::from_millis(snap::CURSOR_SAMPLE_MS), now);

        Self {
            state: SnapState::Docked,
            hidden_edge: None,
            last_activity: now,
            last_persisted: saved,
            resting: saved,
            suppressed: false,
            keywords: keywords.into_iter().filter(|k| !k.is_empty()).collect(),
            animation: None,
            scheduler,
        }
    }

    pub fn state(&self) -> SnapState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Drags are refused while a slide is in flight
    pub fn drag_allowed(&self) -> bool {
        !self.is_animating()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Move to the saved position, then dock if it touches an edge
    pub fn restore_position<W: FloatingWindow>(&mut self, window: &mut W, desktop: &dyn Desktop, saved: Position) {
        if let Err(e) = window.move_to(saved) {
            warn!(error = %e, "Failed to move window to saved position");
        }
        self.check_edges(window, desktop);
    }

    /// End of a drag gesture
    pub fn after_drag<W: FloatingWindow>(&mut self, now: Instant, window: &mut W, desktop: &dyn Desktop) {
        self.last_activity = now;
        self.check_edges(window, desktop);
    }

    /// Keep the window on its edge after its size changed. A hidden window
    /// stays hidden; only the cursor sampler brings it back.
    pub fn after_resize<W: FloatingWindow>(&mut self, window: &mut W, desktop: &dyn Desktop) {
        if self.is_animating() {
            debug!("Resize during slide, keeping slide target");
            return;
        }
        let Some(edge) = self.hidden_edge else {
            self.check_edges(window, desktop);
            return;
        };
        let work_area = match desktop.work_area() {
            Ok(area) => area,
            Err(e) => {
                debug!(error = %e, "Skipping edge re-alignment");
                return;
            }
        };

        let rect = window.rect();
        self.resting = Position::new(snapping::docked_x(edge, rect, work_area), rect.y);
        let target = match self.state {
            SnapState::Hidden => Position::new(snapping::hidden_x(edge, rect, work_area), rect.y),
            _ => self.resting,
        };
        if target != window.position() {
            if let Err(e) = window.move_to(target) {
                warn!(error = %e, "Failed to re-align resized window");
            }
        }
    }

    /// Snap flush to touched edges and reclassify
    pub fn check_edges<W: FloatingWindow>(&mut self, window: &mut W, desktop: &dyn Desktop) {
        if self.is_animating() {
            debug!("Edge check refused while animating");
            return;
        }
        let work_area = match desktop.work_area() {
            Ok(area) => area,
            Err(e) => {
                debug!(error = %e, "Skipping edge check");
                return;
            }
        };

        let (contact, moved) = snapping::snap_position(window.rect(), work_area);
        if let Some(target) = moved {
            if let Err(e) = window.move_to(target) {
                warn!(error = %e, "Failed to snap window");
            }
        }

        self.hidden_edge = contact.edge;
        self.resting = window.position();
        self.state = if contact.is_near_edge() { SnapState::NearEdge } else { SnapState::Docked };
        debug!(state = ?self.state, edge = ?self.hidden_edge, "Edge check");
    }

    /// Advance the animation, then run due samplers in order. Returns a
    /// position to persist when the position sampler saw a change.
    pub fn tick<W: FloatingWindow>(&mut self, now: Instant, window: &mut W, desktop: &dyn Desktop) -> Option<Position> {
        self.advance_animation(now, window);

        let mut persist = None;
        for timer in self.scheduler.due(now) {
            match timer {
                SnapTimer::SavePosition => persist = self.sample_position(window),
                SnapTimer::FullscreenCheck => self.sample_fullscreen(window, desktop),
                SnapTimer::Inactivity => self.sample_inactivity(now, window, desktop),
                SnapTimer::CursorCheck => self.sample_cursor(now, window, desktop),
            }
        }
        persist
    }

    /// Position to persist, if it differs from the last one written.
    /// Keeps reporting it until the caller confirms with [`Self::mark_persisted`].
    pub fn sample_position<W: FloatingWindow>(&self, window: &W) -> Option<Position> {
        if self.is_animating() {
            return None;
        }
        let current = match self.state {
            SnapState::Hidden => self.resting,
            _ => window.position(),
        };
        (current != self.last_persisted).then_some(current)
    }

    /// Record that `position` reached disk
    pub fn mark_persisted(&mut self, position: Position) {
        self.last_persisted = position;
    }

    pub fn sample_fullscreen<W: FloatingWindow>(&mut self, window: &mut W, desktop: &dyn Desktop) {
        let fullscreen = match (desktop.foreground_window(), desktop.screen_bounds()) {
            (Ok(foreground), Ok(screen)) => {
                foreground.bounds == screen && self.keywords.iter().any(|k| foreground.title.contains(k.as_str()))
            }
            (Err(e), _) | (_, Err(e)) => {
                debug!(error = %e, "Fullscreen query failed, assuming not fullscreen");
                false
            }
        };

        if fullscreen == self.suppressed {
            return;
        }
        self.suppressed = fullscreen;
        info!(fullscreen, "Fullscreen application changed, toggling visibility");
        if let Err(e) = window.set_visible(!fullscreen) {
            warn!(error = %e, "Failed to change window visibility");
        }
    }

    pub fn sample_inactivity<W: FloatingWindow>(&mut self, now: Instant, window: &mut W, desktop: &dyn Desktop) {
        let idle = now.saturating_duration_since(self.last_activity);
        if self.state == SnapState::NearEdge && idle > Duration::from_millis(snap::INACTIVITY_TIMEOUT_MS) {
            self.start_slide(SlideDirection::Hide, now, window, desktop);
        }
    }

    pub fn sample_cursor<W: FloatingWindow>(&mut self, now: Instant, window: &mut W, desktop: &dyn Desktop) {
        let cursor = match desktop.cursor_position() {
            Ok(cursor) => cursor,
            Err(e) => {
                debug!(error = %e, "Skipping cursor sample");
                return;
            }
        };
        if !window.rect().contains(cursor) {
            return;
        }

        self.last_activity = now;
        if matches!(self.state, SnapState::Hidden | SnapState::Animating(SlideDirection::Hide)) {
            self.start_slide(SlideDirection::Restore, now, window, desktop);
        }
    }

    /// Begin sliding toward `direction`'s target, replacing any slide in flight
    fn start_slide<W: FloatingWindow>(&mut self, direction: SlideDirection, now: Instant, window: &W, desktop: &dyn Desktop) {
        let Some(edge) = self.hidden_edge else {
            return;
        };
        let work_area = match desktop.work_area() {
            Ok(area) => area,
            Err(e) => {
                debug!(error = %e, "Skipping slide");
                return;
            }
        };

        let rect = window.rect();
        let docked = Position::new(snapping::docked_x(edge, rect, work_area), rect.y);
        let target = match direction {
            SlideDirection::Hide => Position::new(snapping::hidden_x(edge, rect, work_area), rect.y),
            SlideDirection::Restore => docked,
        };
        self.resting = docked;
        self.animation = Some(SlideAnimation::new(
            window.position(),
            target,
            now,
            Duration::from_millis(snap::ANIMATION_MS),
        ));
        self.state = SnapState::Animating(direction);
        debug!(?direction, ?edge, x = target.x, "Slide started");
    }

    fn advance_animation<W: FloatingWindow>(&mut self, now: Instant, window: &mut W) {
        let Some(animation) = self.animation else {
            return;
        };

        let position = animation.position_at(now);
        if position != window.position() {
            if let Err(e) = window.move_to(position) {
                warn!(error = %e, "Failed to move window during slide");
            }
        }

        if animation.is_finished(now) {
            self.animation = None;
            self.state = match self.state {
                SnapState::Animating(SlideDirection::Hide) => SnapState::Hidden,
                _ => SnapState::NearEdge,
            };
            debug!(state = ?self.state, "Slide finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimensions, Rect};
    use crate::window::ForegroundWindow;
    use crate::window::testing::{FakeDesktop, HeadlessWindow};

    const W: i32 = 1920;
    const WIDTH: u32 = 160;

    fn setup(x: i32) -> (EdgeSnapController, HeadlessWindow, FakeDesktop, Instant) {
        let now = Instant::now();
        let desktop = FakeDesktop::new();
        let mut window = HeadlessWindow::new(Position::new(0, 0), Dimensions::new(WIDTH, 100));
        let saved = Position::new(x, 400);
        let keywords = vec!["PowerPoint ".to_string()];
        let mut controller = EdgeSnapController::new(saved, keywords, now);
        controller.restore_position(&mut window, &desktop, saved);
        (controller, window, desktop, now)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_edge_classification() {
        let (controller, window, _, _) = setup(5);
        assert_eq!(controller.state(), SnapState::NearEdge);
        assert_eq!(window.position, Position::new(0, 400));

        let (controller, window, _, _) = setup(W - WIDTH as i32);
        assert_eq!(controller.state(), SnapState::NearEdge);
        assert_eq!(window.position.x, W - WIDTH as i32);

        let (controller, _, _, _) = setup(W / 2 - WIDTH as i32 / 2);
        assert_eq!(controller.state(), SnapState::Docked);
    }

    #[test]
    fn test_inactivity_hides() {
        let (mut controller, mut window, desktop, t0) = setup(5);
        let now = t0 + ms(2000);

        controller.sample_inactivity(now, &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Animating(SlideDirection::Hide));
        assert!(!controller.drag_allowed());

        controller.tick(now + ms(180), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Hidden);
        assert_eq!(window.position, Position::new(-(WIDTH as i32) + 10, 400));
    }

    #[test]
    fn test_recent_activity_keeps_window() {
        let (mut controller, mut window, desktop, t0) = setup(5);
        let now = t0 + ms(2000);
        controller.record_activity(now);

        controller.sample_inactivity(now, &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::NearEdge);
        assert_eq!(window.position, Position::new(0, 400));
    }

    #[test]
    fn test_docked_window_never_hides() {
        let (mut controller, mut window, desktop, t0) = setup(800);
        controller.sample_inactivity(t0 + ms(10_000), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Docked);
    }

    #[test]
    fn test_cursor_restores_hidden_window() {
        let (mut controller, mut window, mut desktop, t0) = setup(W - WIDTH as i32);
        controller.sample_inactivity(t0 + ms(2000), &mut window, &desktop);
        controller.tick(t0 + ms(2180), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Hidden);
        assert_eq!(window.position.x, W - 10);

        let event = t0 + ms(3000);
        desktop.cursor = Some(Position::new(W - 5, 450));
        controller.sample_cursor(event, &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Animating(SlideDirection::Restore));
        assert_eq!(controller.last_activity, event);

        controller.tick(event + ms(180), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::NearEdge);
        assert_eq!(window.position.x, W - WIDTH as i32);
    }

    #[test]
    fn test_cursor_outside_does_nothing() {
        let (mut controller, mut window, desktop, t0) = setup(5);
        controller.sample_cursor(t0 + ms(500), &mut window, &desktop);
        assert_eq!(controller.last_activity, t0);
    }

    #[test]
    fn test_new_slide_replaces_one_in_flight() {
        let (mut controller, mut window, mut desktop, t0) = setup(5);
        controller.sample_inactivity(t0 + ms(2000), &mut window, &desktop);
        controller.tick(t0 + ms(2090), &mut window, &desktop);
        assert!(window.position.x < 0);

        desktop.cursor = Some(Position::new(window.position.x + 5, 450));
        controller.sample_cursor(t0 + ms(2100), &mut window, &desktop);
        let animation = controller.animation.expect("restore slide");
        assert_eq!(animation.target(), Position::new(0, 400));

        controller.tick(t0 + ms(2280), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::NearEdge);
        assert_eq!(window.position, Position::new(0, 400));
    }

    #[test]
    fn test_edge_check_refused_while_animating() {
        let (mut controller, mut window, desktop, t0) = setup(5);
        controller.sample_inactivity(t0 + ms(2000), &mut window, &desktop);
        window.position = Position::new(900, 400);

        controller.after_drag(t0 + ms(2010), &mut window, &desktop);
        assert_eq!(window.position, Position::new(900, 400));
        assert_eq!(controller.state(), SnapState::Animating(SlideDirection::Hide));
    }

    #[test]
    fn test_fullscreen_suppression() {
        let (mut controller, mut window, mut desktop, _) = setup(800);
        desktop.foreground = Some(ForegroundWindow {
            title: "PowerPoint Slide Show - deck.pptx".to_string(),
            bounds: Rect::new(0, 0, 1920, 1080),
        });

        controller.sample_fullscreen(&mut window, &desktop);
        assert!(!window.visible);
        assert!(controller.is_suppressed());

        desktop.foreground = None;
        controller.sample_fullscreen(&mut window, &desktop);
        assert!(window.visible);
    }

    #[test]
    fn test_windowed_presentation_is_not_fullscreen() {
        let (mut controller, mut window, mut desktop, _) = setup(800);
        desktop.foreground = Some(ForegroundWindow {
            title: "PowerPoint - deck.pptx".to_string(),
            bounds: Rect::new(0, 0, 1280, 720),
        });

        controller.sample_fullscreen(&mut window, &desktop);
        assert!(window.visible);
    }

    #[test]
    fn test_query_failure_keeps_window_visible() {
        let (mut controller, mut window, mut desktop, _) = setup(800);
        desktop.screen = None;
        desktop.foreground = Some(ForegroundWindow {
            title: "PowerPoint ".to_string(),
            bounds: Rect::new(0, 0, 1920, 1080),
        });

        controller.sample_fullscreen(&mut window, &desktop);
        assert!(window.visible);
    }

    #[test]
    fn test_position_sampler_reports_changes_only() {
        let (mut controller, mut window, desktop, t0) = setup(800);
        assert_eq!(controller.sample_position(&window), None);

        window.position = Position::new(700, 300);
        controller.after_drag(t0, &mut window, &desktop);
        assert_eq!(controller.sample_position(&window), Some(Position::new(700, 300)));
        controller.mark_persisted(Position::new(700, 300));
        assert_eq!(controller.sample_position(&window), None);
    }

    #[test]
    fn test_unconfirmed_position_is_reported_again() {
        let (mut controller, mut window, desktop, t0) = setup(800);
        window.position = Position::new(600, 300);

        assert_eq!(controller.tick(t0 + ms(5000), &mut window, &desktop), Some(Position::new(600, 300)));
        // no mark_persisted: the write failed
        assert_eq!(controller.tick(t0 + ms(10_000), &mut window, &desktop), Some(Position::new(600, 300)));

        controller.mark_persisted(Position::new(600, 300));
        assert_eq!(controller.tick(t0 + ms(15_000), &mut window, &desktop), None);
    }

    #[test]
    fn test_hidden_window_persists_docked_position() {
        let (mut controller, mut window, desktop, t0) = setup(5);
        controller.sample_inactivity(t0 + ms(2000), &mut window, &desktop);
        assert_eq!(controller.sample_position(&window), None);

        controller.tick(t0 + ms(2180), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Hidden);
        assert_eq!(controller.sample_position(&window), Some(Position::new(0, 400)));
    }

    #[test]
    fn test_work_area_failure_skips_edge_check() {
        let (mut controller, mut window, mut desktop, t0) = setup(800);
        desktop.work_area = None;
        window.position = Position::new(3, 400);

        controller.after_drag(t0, &mut window, &desktop);
        assert_eq!(window.position, Position::new(3, 400));
        assert_eq!(controller.state(), SnapState::Docked);
    }

    #[test]
    fn test_resize_keeps_hidden_window_hidden() {
        let (mut controller, mut window, desktop, t0) = setup(5);
        controller.sample_inactivity(t0 + ms(2000), &mut window, &desktop);
        controller.tick(t0 + ms(2180), &mut window, &desktop);
        assert_eq!(controller.state(), SnapState::Hidden);

        window.dimensions = Dimensions::new(WIDTH + 70, 100);
        controller.after_resize(&mut window, &desktop);

        assert_eq!(controller.state(), SnapState::Hidden);
        assert_eq!(window.position, Position::new(-(WIDTH as i32 + 70) + 10, 400));
        assert_eq!(controller.sample_position(&window), Some(Position::new(0, 400)));
    }

    #[test]
    fn test_resize_keeps_right_docked_window_flush() {
        let (mut controller, mut window, desktop, _) = setup(W - WIDTH as i32);
        window.dimensions = Dimensions::new(WIDTH - 70, 100);
        controller.after_resize(&mut window, &desktop);

        assert_eq!(controller.state(), SnapState::NearEdge);
        assert_eq!(window.position.x, W - (WIDTH as i32 - 70));
    }

    #[test]
    fn test_tick_persists_after_five_seconds() {
        let (mut controller, mut window, desktop, t0) = setup(800);
        window.position = Position::new(600, 300);
        assert_eq!(controller.tick(t0 + ms(1000), &mut window, &desktop), None);
        assert_eq!(controller.tick(t0 + ms(5000), &mut window, &desktop), Some(Position::new(600, 300)));
    }
}
