//! Window slide animation

use std::time::{Duration, Instant};

use crate::types::Position;

/// Quadratic ease-out (slow end)
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Linear move between two positions with eased timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideAnimation {
    from: Position,
    to: Position,
    started: Instant,
    duration: Duration,
}

impl SlideAnimation {
    pub fn new(from: Position, to: Position, started: Instant, duration: Duration) -> Self {
        Self { from, to, started, duration }
    }

    pub fn target(&self) -> Position {
        self.to
    }

    /// Eased progress in [0, 1]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        ease_out(elapsed.as_secs_f32() / self.duration.as_secs_f32())
    }

    pub fn position_at(&self, now: Instant) -> Position {
        if self.is_finished(now) {
            return self.to;
        }
        let t = self.progress(now);
        let lerp = |a: i32, b: i32| a + ((b - a) as f32 * t).round() as i32;
        Position::new(lerp(self.from.x, self.to.x), lerp(self.from.y, self.to.y))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}
