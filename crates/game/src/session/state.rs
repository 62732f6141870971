use std::sync::Arc;

use engine::{ColliderSet, Vec2, Vec3};
use serde::Serialize;

use super::economy::EconomyState;
use super::interaction::InteractionState;
use super::types::{Hazard, NonPlayerEntity, NpcId, PlayerEntity};
use crate::config::{SessionRules, ValidatedSession};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionCompletion {
    pub reputation: i32,
    pub budget: i32,
    pub elapsed_seconds: f64,
}

/// Root aggregate for one session. Owned by a single caller and advanced by
/// [`super::step`] or [`super::Session`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) player: PlayerEntity,
    pub(crate) npcs: Vec<NonPlayerEntity>,
    pub(crate) hazards: Vec<Hazard>,
    pub(crate) economy: EconomyState,
    pub(crate) colliders: Arc<ColliderSet>,
    pub(crate) rules: Arc<SessionRules>,
    pub(crate) interaction: InteractionState,
    pub(crate) elapsed_seconds: f64,
    pub(crate) completion: Option<SessionCompletion>,
}

impl SessionState {
    pub fn new(session: ValidatedSession) -> Self {
        Self {
            player: session.player,
            npcs: session.npcs,
            hazards: session.hazards,
            economy: EconomyState::new(session.initial_reputation, session.initial_budget),
            colliders: Arc::new(session.colliders),
            rules: Arc::new(session.rules),
            interaction: InteractionState::Idle,
            elapsed_seconds: 0.0,
            completion: None,
        }
    }

    pub fn player(&self) -> &PlayerEntity {
        &self.player
    }

    pub fn npcs(&self) -> &[NonPlayerEntity] {
        &self.npcs
    }

    pub fn npc(&self, npc_id: &NpcId) -> Option<&NonPlayerEntity> {
        self.npcs.iter().find(|npc| &npc.id == npc_id)
    }

    pub fn boss(&self) -> Option<&NonPlayerEntity> {
        self.npcs.iter().find(|npc| npc.is_boss())
    }

    pub(crate) fn boss_mut(&mut self) -> Option<&mut NonPlayerEntity> {
        self.npcs.iter_mut().find(|npc| npc.is_boss())
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn economy(&self) -> &EconomyState {
        &self.economy
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn active_dialogue_npc(&self) -> Option<&NpcId> {
        self.interaction.active_dialogue()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    pub fn completion(&self) -> Option<SessionCompletion> {
        self.completion
    }

    /// Nearest visible, not-yet-completed NPC within the interaction radius.
    /// Equal distances resolve to the earliest registered NPC.
    pub fn nearest_eligible_npc(&self) -> Option<&NonPlayerEntity> {
        let radius_sq = self.rules.interaction_radius * self.rules.interaction_radius;
        let mut best: Option<(&NonPlayerEntity, f32)> = None;
        for npc in self.eligible_npcs() {
            let distance_sq = self.player.position.ground_distance_sq(npc.position);
            if distance_sq > radius_sq {
                continue;
            }
            if best.map_or(true, |(_, best_sq)| distance_sq < best_sq) {
                best = Some((npc, distance_sq));
            }
        }
        best.map(|(npc, _)| npc)
    }

    /// Visible NPCs that still have a challenge to resolve, in registration order.
    pub fn eligible_npcs(&self) -> impl Iterator<Item = &NonPlayerEntity> {
        self.npcs
            .iter()
            .filter(move |npc| npc.is_visible() && !self.economy.is_completed(&npc.id))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let dialogue = self.active_dialogue_npc().and_then(|npc_id| {
            let npc = self.npc(npc_id)?;
            let feedback = match &self.interaction {
                InteractionState::Resolved { option_index, .. } => npc
                    .option(*option_index)
                    .map(|option| option.feedback.clone()),
                _ => None,
            };
            Some(DialogueView {
                npc_id: npc.id.clone(),
                role: npc.role.clone(),
                prompt: npc.prompt.clone(),
                options: npc.options.iter().map(|option| option.text.clone()).collect(),
                feedback,
            })
        });

        SessionSnapshot {
            elapsed_seconds: self.elapsed_seconds,
            player: PlayerView {
                position: self.player.position,
                facing: self.player.facing,
                invulnerable: self.player.is_invulnerable(),
            },
            npcs: self
                .npcs
                .iter()
                .map(|npc| NpcView {
                    id: npc.id.clone(),
                    role: npc.role.clone(),
                    position: npc.position,
                    boss: npc.is_boss(),
                    visible: npc.is_visible(),
                    completed: self.economy.is_completed(&npc.id),
                })
                .collect(),
            hazards: self.hazards.iter().map(|hazard| hazard.position).collect(),
            interaction: self.interaction.clone(),
            prompt_npc_id: self.interaction.prompt_npc().cloned(),
            active_dialogue_npc_id: self.active_dialogue_npc().cloned(),
            dialogue,
            reputation: self.economy.reputation(),
            budget: self.economy.budget(),
            completed_count: self.economy.completed_count(),
            total_npcs: self.npcs.len(),
            session_complete: self.is_complete(),
        }
    }
}

/// Read-only view handed to presentation hosts once per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub elapsed_seconds: f64,
    pub player: PlayerView,
    pub npcs: Vec<NpcView>,
    pub hazards: Vec<Vec3>,
    pub interaction: InteractionState,
    pub prompt_npc_id: Option<NpcId>,
    pub active_dialogue_npc_id: Option<NpcId>,
    pub dialogue: Option<DialogueView>,
    pub reputation: i32,
    pub budget: i32,
    pub completed_count: usize,
    pub total_npcs: usize,
    pub session_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub facing: Vec2,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NpcView {
    pub id: NpcId,
    pub role: String,
    pub position: Vec3,
    pub boss: bool,
    pub visible: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueView {
    pub npc_id: NpcId,
    pub role: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub feedback: Option<String>,
}
