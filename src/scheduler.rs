//! Named periodic timers driven by explicit `Instant`s
//!
//! Nothing here reads the clock. The run loop passes `Instant::now()`,
//! tests pass synthetic instants to fast-forward.

use std::time::{Duration, Instant};

/// One periodic timer
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    next_due: Instant,
    running: bool,
}

impl PeriodicTimer {
    /// Start a timer whose first firing is one period after `now`
    pub fn start(period: Duration, now: Instant) -> Self {
        Self { period, next_due: now + period, running: true }
    }

    /// True once per elapsed period; reschedules relative to `now`
    /// so a stalled loop does not fire a burst of catch-up ticks
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.running || now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.running.then_some(self.next_due)
    }
}

/// A fixed set of named timers polled in registration order
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    timers: Vec<(K, PeriodicTimer)>,
}

impl<K: Copy + PartialEq> Scheduler<K> {
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    pub fn register(&mut self, name: K, period: Duration, now: Instant) {
        self.timers.push((name, PeriodicTimer::start(period, now)));
    }

    /// Names of the timers due at `now`, in registration order
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        self.timers
            .iter_mut()
            .filter_map(|(name, timer)| timer.poll(now).then_some(*name))
            .collect()
    }

    pub fn stop_all(&mut self) {
        for (_, timer) in &mut self.timers {
            timer.stop();
        }
    }

    /// Earliest upcoming deadline, if any timer is running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().filter_map(|(_, timer)| timer.next_due()).min()
    }
}

impl<K: Copy + PartialEq> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
