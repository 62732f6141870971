use engine::{InputSnapshot, SimCommand, Simulation};
use tracing::{debug, info};

use super::events::{SessionEvent, SessionEventCounts};
use super::state::SessionState;
use super::step::tick;
use crate::telemetry::TelemetrySink;

/// A session wired to a telemetry sink, ready to be driven by the engine loop.
#[derive(Debug)]
pub struct Session<T> {
    state: SessionState,
    telemetry: T,
    ticks: u64,
    last_tick_events: Vec<SessionEvent>,
    last_tick_counts: SessionEventCounts,
}

impl<T: TelemetrySink> Session<T> {
    pub fn new(state: SessionState, telemetry: T) -> Self {
        info!(
            npcs = state.npcs().len(),
            hazards = state.hazards().len(),
            colliders = state.colliders().len(),
            reputation = state.economy().reputation(),
            budget = state.economy().budget(),
            "session_started"
        );
        Self {
            state,
            telemetry,
            ticks: 0,
            last_tick_events: Vec::new(),
            last_tick_counts: SessionEventCounts::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_tick_events(&self) -> &[SessionEvent] {
        &self.last_tick_events
    }

    pub fn last_tick_counts(&self) -> SessionEventCounts {
        self.last_tick_counts
    }

    pub fn into_parts(self) -> (SessionState, T) {
        (self.state, self.telemetry)
    }

    /// Runs one tick and forwards its telemetry to the sink.
    pub fn advance(&mut self, input: &InputSnapshot, dt_seconds: f32) -> &[SessionEvent] {
        self.last_tick_events.clear();
        tick(&mut self.state, input, dt_seconds, &mut self.last_tick_events);
        self.ticks = self.ticks.saturating_add(1);

        for event in &self.last_tick_events {
            match event {
                SessionEvent::Telemetry(telemetry) => self.telemetry.record(telemetry),
                SessionEvent::PlayerDamaged { amount, reputation } => {
                    info!(amount, reputation, "player_damaged");
                }
                SessionEvent::MovementBlocked => debug!(tick = self.ticks, "movement_blocked"),
                SessionEvent::DialogueOpened { .. } | SessionEvent::DialogueClosed { .. } => {}
            }
        }
        self.last_tick_counts = SessionEventCounts::from_events(&self.last_tick_events);
        &self.last_tick_events
    }
}

impl<T: TelemetrySink> Simulation for Session<T> {
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SimCommand {
        self.advance(input, fixed_dt_seconds);
        if self.state.is_complete() {
            SimCommand::Finish
        } else {
            SimCommand::Continue
        }
    }
}
