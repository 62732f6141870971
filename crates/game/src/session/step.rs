use engine::InputSnapshot;
use tracing::debug;

use super::events::SessionEvent;
use super::movement::{move_player, MoveOutcome};
use super::state::SessionState;
use super::{hazards, interaction};

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: SessionState,
    pub events: Vec<SessionEvent>,
}

/// Advances a session by one tick and returns the new state with everything
/// the tick emitted.
pub fn step(mut state: SessionState, input: &InputSnapshot, dt_seconds: f32) -> StepOutcome {
    let mut events = Vec::new();
    tick(&mut state, input, dt_seconds, &mut events);
    StepOutcome { state, events }
}

/// Phase order: clock, movement (skipped while a dialogue is open), hazards,
/// interaction. Option selection resolves inside the interaction phase.
pub(crate) fn tick(
    state: &mut SessionState,
    input: &InputSnapshot,
    dt_seconds: f32,
    events: &mut Vec<SessionEvent>,
) {
    let dt_seconds = if dt_seconds.is_finite() && dt_seconds > 0.0 {
        dt_seconds
    } else {
        debug!(dt_seconds, "tick_dt_ignored");
        0.0
    };
    state.elapsed_seconds += f64::from(dt_seconds);

    if !state.interaction.is_dialogue_open() {
        let speed = state.rules.player_speed;
        let outcome = move_player(
            &mut state.player,
            input.movement_intent(),
            speed,
            dt_seconds,
            &state.colliders,
        );
        if outcome == MoveOutcome::Blocked {
            events.push(SessionEvent::MovementBlocked);
        }
    }

    hazards::run(state, dt_seconds, events);
    interaction::run(state, input, events);
}
