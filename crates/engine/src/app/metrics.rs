use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Loop health published once per metrics interval. Rates cover the last
/// interval only; totals cover the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub frames_per_second: f32,
    pub ticks_per_second: f32,
    pub frame_time_ms: f32,
    pub ticks_total: u64,
    pub simulated_seconds: f64,
    pub backlog_drops: u64,
}

/// Read side shared with hosts that want to display loop health.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RunTotals {
    pub(crate) ticks: u64,
    pub(crate) simulated_seconds: f64,
    pub(crate) backlog_drops: u64,
}

#[derive(Debug)]
struct IntervalWindow {
    opened_at: Instant,
    frames: u32,
    ticks: u32,
    frame_time: Duration,
}

impl IntervalWindow {
    fn open(at: Instant) -> Self {
        Self {
            opened_at: at,
            frames: 0,
            ticks: 0,
            frame_time: Duration::ZERO,
        }
    }

    fn mean_frame_time_ms(&self) -> f32 {
        if self.frames == 0 {
            return 0.0;
        }
        self.frame_time.as_secs_f32() * 1000.0 / self.frames as f32
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    window: IntervalWindow,
    totals: RunTotals,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, started_at: Instant) -> Self {
        Self {
            interval,
            window: IntervalWindow::open(started_at),
            totals: RunTotals::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.window.frames = self.window.frames.saturating_add(1);
        self.window.frame_time = self.window.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, fixed_dt_seconds: f32) {
        self.window.ticks = self.window.ticks.saturating_add(1);
        self.totals.ticks = self.totals.ticks.saturating_add(1);
        self.totals.simulated_seconds += f64::from(fixed_dt_seconds);
    }

    pub(crate) fn record_backlog_drop(&mut self) {
        self.totals.backlog_drops = self.totals.backlog_drops.saturating_add(1);
    }

    pub(crate) fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Closes the current window once `interval` has elapsed and opens a
    /// fresh one at `now`.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window.opened_at);
        if elapsed < self.interval {
            return None;
        }
        let window = std::mem::replace(&mut self.window, IntervalWindow::open(now));
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);

        Some(LoopMetricsSnapshot {
            frames_per_second: window.frames as f32 / seconds,
            ticks_per_second: window.ticks as f32 / seconds,
            frame_time_ms: window.mean_frame_time_ms(),
            ticks_total: self.totals.ticks,
            simulated_seconds: self.totals.simulated_seconds,
            backlog_drops: self.totals.backlog_drops,
        })
    }
}
