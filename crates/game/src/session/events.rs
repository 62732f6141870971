use serde::Serialize;

use super::types::NpcId;

/// Events that leave the core for the telemetry collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    ChallengeResolved {
        npc_id: NpcId,
        correct: bool,
    },
    ProgressUpdated {
        completed_count: usize,
        total: usize,
    },
    BossUnlocked {},
    SessionComplete {
        reputation: i32,
        budget: i32,
        elapsed_seconds: f64,
    },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChallengeResolved { .. } => "challenge_resolved",
            Self::ProgressUpdated { .. } => "progress_updated",
            Self::BossUnlocked {} => "boss_unlocked",
            Self::SessionComplete { .. } => "session_complete",
        }
    }
}

/// Everything a tick can report, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DialogueOpened { npc_id: NpcId },
    DialogueClosed { npc_id: NpcId, resolved: bool },
    PlayerDamaged { amount: i32, reputation: i32 },
    MovementBlocked,
    Telemetry(TelemetryEvent),
}

impl SessionEvent {
    pub fn as_telemetry(&self) -> Option<&TelemetryEvent> {
        match self {
            Self::Telemetry(event) => Some(event),
            Self::DialogueOpened { .. }
            | Self::DialogueClosed { .. }
            | Self::PlayerDamaged { .. }
            | Self::MovementBlocked => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionEventCounts {
    pub total: u32,
    pub dialogue_opened: u32,
    pub dialogue_closed: u32,
    pub player_damaged: u32,
    pub movement_blocked: u32,
    pub telemetry: u32,
}

impl SessionEventCounts {
    pub fn from_events(events: &[SessionEvent]) -> Self {
        let mut counts = Self::default();
        for event in events {
            counts.record(event);
        }
        counts
    }

    fn record(&mut self, event: &SessionEvent) {
        self.total = self.total.saturating_add(1);
        match event {
            SessionEvent::DialogueOpened { .. } => {
                self.dialogue_opened = self.dialogue_opened.saturating_add(1)
            }
            SessionEvent::DialogueClosed { .. } => {
                self.dialogue_closed = self.dialogue_closed.saturating_add(1)
            }
            SessionEvent::PlayerDamaged { .. } => {
                self.player_damaged = self.player_damaged.saturating_add(1)
            }
            SessionEvent::MovementBlocked => {
                self.movement_blocked = self.movement_blocked.saturating_add(1)
            }
            SessionEvent::Telemetry(_) => self.telemetry = self.telemetry.saturating_add(1),
        }
    }
}
