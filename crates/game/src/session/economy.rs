use std::collections::BTreeSet;

use super::types::NpcId;

pub const SCORE_MIN: i32 = 0;
pub const SCORE_MAX: i32 = 100;

/// Reputation, budget and the completed-NPC set. Scores stay inside
/// `[SCORE_MIN, SCORE_MAX]` and completed ids are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomyState {
    reputation: i32,
    budget: i32,
    completed: BTreeSet<NpcId>,
}

impl EconomyState {
    pub fn new(reputation: i32, budget: i32) -> Self {
        Self {
            reputation: clamp_score(i64::from(reputation)),
            budget: clamp_score(i64::from(budget)),
            completed: BTreeSet::new(),
        }
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn budget(&self) -> i32 {
        self.budget
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_completed(&self, npc_id: &NpcId) -> bool {
        self.completed.contains(npc_id)
    }

    pub fn completed_ids(&self) -> impl Iterator<Item = &NpcId> {
        self.completed.iter()
    }

    pub(crate) fn apply_deltas(&mut self, reputation_delta: i32, budget_delta: i32) {
        self.reputation = clamp_score(i64::from(self.reputation) + i64::from(reputation_delta));
        self.budget = clamp_score(i64::from(self.budget) + i64::from(budget_delta));
    }

    pub(crate) fn apply_damage(&mut self, amount: i32) {
        self.apply_deltas(amount.saturating_neg(), 0);
    }

    /// Returns `true` when the id was not already present.
    pub(crate) fn mark_completed(&mut self, npc_id: &NpcId) -> bool {
        if self.completed.contains(npc_id) {
            return false;
        }
        self.completed.insert(npc_id.clone())
    }
}

fn clamp_score(value: i64) -> i32 {
    value.clamp(i64::from(SCORE_MIN), i64::from(SCORE_MAX)) as i32
}
