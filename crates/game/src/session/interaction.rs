use engine::InputSnapshot;
use serde::Serialize;
use tracing::{debug, info};

use super::events::SessionEvent;
use super::progression;
use super::state::SessionState;
use super::types::NpcId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    ProximityPrompt { npc_id: NpcId },
    DialogueOpen { npc_id: NpcId },
    Resolved { npc_id: NpcId, option_index: usize },
    Closed,
}

impl InteractionState {
    /// NPC whose dialogue is on screen, resolved or not.
    pub fn active_dialogue(&self) -> Option<&NpcId> {
        match self {
            Self::DialogueOpen { npc_id } | Self::Resolved { npc_id, .. } => Some(npc_id),
            Self::Idle | Self::ProximityPrompt { .. } | Self::Closed => None,
        }
    }

    pub fn prompt_npc(&self) -> Option<&NpcId> {
        match self {
            Self::ProximityPrompt { npc_id } => Some(npc_id),
            _ => None,
        }
    }

    pub fn is_dialogue_open(&self) -> bool {
        self.active_dialogue().is_some()
    }
}

/// Interaction phase of a tick.
///
/// Order inside the phase: `Closed` decays to `Idle`, then an option
/// selection is resolved, then a close request is honoured, and finally the
/// proximity prompt is recomputed and an interact request may open it.
pub(crate) fn run(state: &mut SessionState, input: &InputSnapshot, events: &mut Vec<SessionEvent>) {
    if state.interaction == InteractionState::Closed {
        state.interaction = InteractionState::Idle;
    }

    if let Some(option_index) = input.selected_option() {
        select_option(state, option_index, events);
    }

    if input.close_dialogue_pressed() {
        close_dialogue(state, events);
    }

    if matches!(
        state.interaction,
        InteractionState::Idle | InteractionState::ProximityPrompt { .. }
    ) {
        refresh_prompt(state);
    }

    if input.interact_pressed() {
        interact(state, events);
    }
}

fn refresh_prompt(state: &mut SessionState) {
    let next = match state.nearest_eligible_npc() {
        Some(npc) => InteractionState::ProximityPrompt {
            npc_id: npc.id.clone(),
        },
        None => InteractionState::Idle,
    };
    if next != state.interaction {
        debug!(from = ?state.interaction, to = ?next, "proximity_prompt_changed");
        state.interaction = next;
    }
}

fn interact(state: &mut SessionState, events: &mut Vec<SessionEvent>) {
    let npc_id = match &state.interaction {
        InteractionState::ProximityPrompt { npc_id } => npc_id.clone(),
        InteractionState::DialogueOpen { npc_id } | InteractionState::Resolved { npc_id, .. } => {
            debug!(active_npc_id = %npc_id, "interact_ignored_dialogue_open");
            return;
        }
        InteractionState::Idle | InteractionState::Closed => {
            debug!("interact_ignored_no_prompt");
            return;
        }
    };
    info!(npc_id = %npc_id, "dialogue_opened");
    events.push(SessionEvent::DialogueOpened {
        npc_id: npc_id.clone(),
    });
    state.interaction = InteractionState::DialogueOpen { npc_id };
}

fn select_option(state: &mut SessionState, option_index: usize, events: &mut Vec<SessionEvent>) {
    let InteractionState::DialogueOpen { npc_id } = &state.interaction else {
        debug!(option_index, state = ?state.interaction, "option_ignored_no_open_dialogue");
        return;
    };
    let npc_id = npc_id.clone();
    let Some(option) = state
        .npc(&npc_id)
        .and_then(|npc| npc.option(option_index))
        .cloned()
    else {
        debug!(npc_id = %npc_id, option_index, "option_ignored_out_of_range");
        return;
    };

    let result = progression::apply(state, &npc_id, &option, events);
    info!(
        npc_id = %npc_id,
        option_index,
        correct = result.correct,
        reputation = result.reputation,
        budget = result.budget,
        completed_count = result.completed_count,
        "dialogue_resolved"
    );
    state.interaction = InteractionState::Resolved {
        npc_id,
        option_index,
    };
}

fn close_dialogue(state: &mut SessionState, events: &mut Vec<SessionEvent>) {
    let (npc_id, resolved) = match &state.interaction {
        InteractionState::DialogueOpen { npc_id } => (npc_id.clone(), false),
        InteractionState::Resolved { npc_id, .. } => (npc_id.clone(), true),
        InteractionState::Idle
        | InteractionState::ProximityPrompt { .. }
        | InteractionState::Closed => {
            debug!("close_ignored_no_open_dialogue");
            return;
        }
    };
    info!(npc_id = %npc_id, resolved, "dialogue_closed");
    events.push(SessionEvent::DialogueClosed { npc_id, resolved });
    state.interaction = InteractionState::Closed;
}
