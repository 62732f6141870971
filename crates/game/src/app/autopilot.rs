use engine::{InputSnapshot, InputSource, Vec2, Vec3};
use tracing::debug;

use crate::session::{InteractionState, NonPlayerEntity, Session, SessionState};
use crate::telemetry::TelemetrySink;

const DETOUR_TICKS: u32 = 60;
const STUCK_DISTANCE_SQ: f32 = 1.0e-6;

/// Scripted input that plays a session through: walk to the nearest eligible
/// NPC, answer correctly, close, repeat. When a move is rejected it sidesteps
/// along the perpendicular for a short while, alternating sides.
#[derive(Debug, Default)]
pub struct Autopilot {
    last_position: Option<Vec3>,
    last_intent: Vec2,
    detour: Option<Detour>,
    next_detour_left: bool,
}

#[derive(Debug, Clone, Copy)]
struct Detour {
    direction: Vec2,
    ticks_left: u32,
}

impl Autopilot {
    pub fn plan(&mut self, state: &SessionState) -> InputSnapshot {
        match state.interaction() {
            InteractionState::ProximityPrompt { .. } => {
                self.reset_motion();
                InputSnapshot::empty().with_interact_pressed(true)
            }
            InteractionState::DialogueOpen { npc_id } => {
                self.reset_motion();
                let choice = state
                    .npc(npc_id)
                    .and_then(NonPlayerEntity::correct_option_index);
                InputSnapshot::empty().with_selected_option(choice)
            }
            InteractionState::Resolved { .. } => {
                self.reset_motion();
                InputSnapshot::empty().with_close_dialogue_pressed(true)
            }
            InteractionState::Closed => {
                self.reset_motion();
                InputSnapshot::empty()
            }
            InteractionState::Idle => match nearest_target(state) {
                Some(target) => {
                    let position = state.player().position;
                    let desired = (target - position).ground();
                    let intent = self.steer(position, desired);
                    InputSnapshot::empty().with_movement_intent(intent)
                }
                None => {
                    debug!("autopilot_no_targets");
                    InputSnapshot::empty().with_quit_requested(true)
                }
            },
        }
    }

    fn steer(&mut self, position: Vec3, desired: Vec2) -> Vec2 {
        let was_blocked = self.last_position.is_some_and(|last| {
            !self.last_intent.is_zero() && last.ground_distance_sq(position) < STUCK_DISTANCE_SQ
        });
        if was_blocked {
            let base = self.detour.map_or(desired, |detour| detour.direction);
            let left = base.perpendicular();
            let side = if self.next_detour_left {
                left
            } else {
                Vec2::new(-left.x, -left.y)
            };
            self.next_detour_left = !self.next_detour_left;
            debug!(x = position.x, z = position.z, "autopilot_detour");
            self.detour = Some(Detour {
                direction: side,
                ticks_left: DETOUR_TICKS,
            });
        }

        let intent = match self.detour.as_mut() {
            Some(detour) if detour.ticks_left > 0 => {
                detour.ticks_left -= 1;
                detour.direction
            }
            _ => {
                self.detour = None;
                desired
            }
        };
        self.last_position = Some(position);
        self.last_intent = intent;
        intent
    }

    fn reset_motion(&mut self) {
        self.last_position = None;
        self.last_intent = Vec2::ZERO;
        self.detour = None;
    }
}

impl<T: TelemetrySink> InputSource<Session<T>> for Autopilot {
    fn snapshot_for_tick(&mut self, session: &Session<T>) -> InputSnapshot {
        self.plan(session.state())
    }
}

fn nearest_target(state: &SessionState) -> Option<Vec3> {
    let player = state.player().position;
    state
        .eligible_npcs()
        .min_by(|a, b| {
            player
                .ground_distance_sq(a.position)
                .total_cmp(&player.ground_distance_sq(b.position))
        })
        .map(|npc| npc.position)
}
