use serde::Serialize;
use tracing::info;

use super::events::{SessionEvent, TelemetryEvent};
use super::state::{SessionCompletion, SessionState};
use super::types::{DialogueOption, NpcId};

/// What one resolved dialogue option did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EconomyDeltaResult {
    pub npc_id: NpcId,
    pub correct: bool,
    pub reputation: i32,
    pub budget: i32,
    pub newly_completed: bool,
    pub completed_count: usize,
    pub boss_unlocked: bool,
    pub session_complete: bool,
}

/// Applies a chosen option as one unit: clamped score deltas, completion
/// bookkeeping and the boss/win threshold checks.
pub fn apply(
    state: &mut SessionState,
    npc_id: &NpcId,
    option: &DialogueOption,
    events: &mut Vec<SessionEvent>,
) -> EconomyDeltaResult {
    state
        .economy
        .apply_deltas(option.reputation_delta, option.budget_delta);

    let resolved_is_boss = state.npc(npc_id).map(|npc| npc.is_boss());
    let newly_completed =
        option.correct && resolved_is_boss.is_some() && state.economy.mark_completed(npc_id);
    let completed_count = state.economy.completed_count();

    events.push(SessionEvent::Telemetry(TelemetryEvent::ChallengeResolved {
        npc_id: npc_id.clone(),
        correct: option.correct,
    }));
    if newly_completed {
        events.push(SessionEvent::Telemetry(TelemetryEvent::ProgressUpdated {
            completed_count,
            total: state.npcs.len(),
        }));
    }

    let mut boss_unlocked = false;
    if completed_count == state.rules.boss_threshold {
        if let Some(boss) = state.boss_mut() {
            boss_unlocked = boss.kind.reveal();
        }
        if boss_unlocked {
            info!(completed_count, "boss_unlocked");
            events.push(SessionEvent::Telemetry(TelemetryEvent::BossUnlocked {}));
        }
    }

    let mut session_complete = false;
    if newly_completed
        && resolved_is_boss == Some(true)
        && completed_count == state.rules.win_threshold
        && state.completion.is_none()
    {
        let completion = SessionCompletion {
            reputation: state.economy.reputation(),
            budget: state.economy.budget(),
            elapsed_seconds: state.elapsed_seconds,
        };
        state.completion = Some(completion);
        session_complete = true;
        info!(
            reputation = completion.reputation,
            budget = completion.budget,
            elapsed_seconds = completion.elapsed_seconds,
            "session_complete"
        );
        events.push(SessionEvent::Telemetry(TelemetryEvent::SessionComplete {
            reputation: completion.reputation,
            budget: completion.budget,
            elapsed_seconds: completion.elapsed_seconds,
        }));
    }

    EconomyDeltaResult {
        npc_id: npc_id.clone(),
        correct: option.correct,
        reputation: state.economy.reputation(),
        budget: state.economy.budget(),
        newly_completed,
        completed_count,
        boss_unlocked,
        session_complete,
    }
}

/// The only economy mutation that does not come from a dialogue option.
pub fn apply_damage(state: &mut SessionState, amount: i32, events: &mut Vec<SessionEvent>) {
    state.economy.apply_damage(amount);
    events.push(SessionEvent::PlayerDamaged {
        amount,
        reputation: state.economy.reputation(),
    });
}
