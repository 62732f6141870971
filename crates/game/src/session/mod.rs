//! The interactive session core: entity model, movement against static
//! colliders, roaming hazards, the dialogue state machine and the
//! reputation/budget economy.

mod economy;
mod events;
mod hazards;
mod interaction;
mod movement;
mod progression;
mod runtime;
mod state;
mod step;
mod types;

pub use economy::{EconomyState, SCORE_MAX, SCORE_MIN};
pub use events::{SessionEvent, SessionEventCounts, TelemetryEvent};
pub use hazards::{advance_hazards, first_contact};
pub use interaction::InteractionState;
pub use movement::{move_player, MoveOutcome};
pub use progression::{apply, apply_damage, EconomyDeltaResult};
pub use runtime::Session;
pub use state::{
    DialogueView, NpcView, PlayerView, SessionCompletion, SessionSnapshot, SessionState,
};
pub use step::{step, StepOutcome};
pub use types::{DialogueOption, Hazard, NonPlayerEntity, NpcId, NpcKind, PlayerEntity};

#[cfg(test)]
mod tests;
