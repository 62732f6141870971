use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::input::{InputSnapshot, InputSource};
use super::metrics::{MetricsAccumulator, MetricsHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    Continue,
    Finish,
}

/// A tick-driven simulation advanced by the loop runner. The runner owns the
/// clock; the simulation only ever sees the fixed step it is handed.
pub trait Simulation {
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SimCommand;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPacing {
    /// Every frame advances exactly one fixed step without sleeping.
    Unpaced,
    /// Frames follow the wall clock and sleep to hold the target tick rate.
    RealTime,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_ticks: Option<u64>,
    pub pacing: LoopPacing,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_ticks: None,
            pacing: LoopPacing::Unpaced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SimulationFinished,
    QuitRequested,
    TickLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSummary {
    pub stop_reason: StopReason,
    pub frames: u64,
    pub ticks_run: u64,
    pub simulated_seconds: f64,
}

pub fn run_headless<S, I>(config: &LoopConfig, simulation: &mut S, input: &mut I) -> LoopSummary
where
    S: Simulation,
    I: InputSource<S>,
{
    run_headless_with_metrics(config, simulation, input, &MetricsHandle::default())
}

/// Runs until the simulation finishes, the input requests quit, or
/// `max_ticks` is reached. With `max_ticks: None` the simulation must
/// eventually finish or quit on its own.
pub fn run_headless_with_metrics<S, I>(
    config: &LoopConfig,
    simulation: &mut S,
    input: &mut I,
    metrics_handle: &MetricsHandle,
) -> LoopSummary
where
    S: Simulation,
    I: InputSource<S>,
{
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        max_ticks = ?config.max_ticks,
        pacing = ?config.pacing,
        "loop_config"
    );

    let started_at = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, started_at);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = started_at;
    let mut frames = 0u64;

    let stop_reason = 'frames: loop {
        let frame_dt = match config.pacing {
            LoopPacing::Unpaced => fixed_dt,
            LoopPacing::RealTime => {
                let since_last = Instant::now().saturating_duration_since(last_frame_instant);
                let cap_sleep = compute_cap_sleep(since_last, Some(fixed_dt));
                if cap_sleep > Duration::ZERO {
                    thread::sleep(cap_sleep);
                }
                let now = Instant::now();
                let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                last_frame_instant = now;
                raw_frame_dt
            }
        };
        frames = frames.saturating_add(1);

        accumulator = accumulator.saturating_add(clamp_frame_delta(frame_dt, max_frame_delta));
        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        accumulator = step_plan.remaining_accumulator;
        if step_plan.dropped_backlog > Duration::ZERO {
            metrics_accumulator.record_backlog_drop();
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        for _ in 0..step_plan.ticks_to_run {
            let ticks_total = metrics_accumulator.totals().ticks;
            if config.max_ticks.is_some_and(|limit| ticks_total >= limit) {
                break 'frames StopReason::TickLimitReached;
            }
            let snapshot = input.snapshot_for_tick(simulation);
            if snapshot.quit_requested() {
                info!(reason = "quit_input", "shutdown_requested");
                break 'frames StopReason::QuitRequested;
            }
            let command = simulation.update(fixed_dt_seconds, &snapshot);
            metrics_accumulator.record_tick(fixed_dt_seconds);
            if command == SimCommand::Finish {
                break 'frames StopReason::SimulationFinished;
            }
        }

        metrics_accumulator.record_frame(frame_dt);
        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now()) {
            metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.frames_per_second,
                tps = snapshot.ticks_per_second,
                frame_time_ms = snapshot.frame_time_ms,
                ticks_total = snapshot.ticks_total,
                simulated_seconds = snapshot.simulated_seconds,
                backlog_drops = snapshot.backlog_drops,
                "loop_metrics"
            );
        }
    };

    let totals = metrics_accumulator.totals();
    info!(
        stop_reason = ?stop_reason,
        frames,
        ticks_run = totals.ticks,
        simulated_seconds = totals.simulated_seconds,
        backlog_drops = totals.backlog_drops,
        "loop_stopped"
    );
    LoopSummary {
        stop_reason,
        frames,
        ticks_run: totals.ticks,
        simulated_seconds: totals.simulated_seconds,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}
