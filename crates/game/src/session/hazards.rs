use engine::{Aabb, Axis};
use tracing::debug;

use super::events::SessionEvent;
use super::progression;
use super::state::SessionState;
use super::types::Hazard;

/// Moves every hazard and reflects its direction on any axis that left the
/// world box, so the reflected component always points back inside.
///
/// The component is set toward the interior rather than negated, so a hazard
/// that is already outside and heading inward keeps its heading and is never
/// pointed outward.
pub fn advance_hazards(hazards: &mut [Hazard], dt_seconds: f32, world_half_extent: f32) {
    for hazard in hazards.iter_mut() {
        hazard.position = hazard.position + hazard.direction * (hazard.speed * dt_seconds);
        for axis in Axis::ALL {
            let coordinate = hazard.position.axis(axis);
            let component = hazard.direction.axis_mut(axis);
            if coordinate > world_half_extent {
                *component = -component.abs();
            } else if coordinate < -world_half_extent {
                *component = component.abs();
            }
        }
    }
}

pub fn first_contact(hazards: &[Hazard], player_bounds: &Aabb) -> Option<usize> {
    hazards
        .iter()
        .position(|hazard| hazard.bounds().intersects(player_bounds))
}

/// Hazard phase of a tick. Runs regardless of dialogue state.
pub(crate) fn run(state: &mut SessionState, dt_seconds: f32, events: &mut Vec<SessionEvent>) {
    let world_half_extent = state.rules.world_half_extent;
    advance_hazards(&mut state.hazards, dt_seconds, world_half_extent);

    let now = state.elapsed_seconds;
    if state
        .player
        .invulnerable_until
        .is_some_and(|expiry| now >= expiry)
    {
        state.player.invulnerable_until = None;
        debug!(elapsed_seconds = now, "invulnerability_expired");
    }

    let Some(hazard_index) = first_contact(&state.hazards, &state.player.bounds()) else {
        return;
    };
    if state.player.is_invulnerable() {
        return;
    }

    let amount = state.rules.hazard_damage;
    progression::apply_damage(state, amount, events);
    state.player.invulnerable_until = Some(now + state.rules.invulnerability_cooldown_seconds);
    debug!(
        hazard_index,
        amount,
        reputation = state.economy.reputation(),
        "hazard_contact"
    );
}
