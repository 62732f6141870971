use std::io::Write;

use tracing::{info, warn};

use crate::session::TelemetryEvent;

/// Fire-and-forget consumer of session telemetry. Delivery problems stay
/// inside the sink; the session never observes them.
pub trait TelemetrySink {
    fn record(&mut self, event: &TelemetryEvent);
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn record(&mut self, event: &TelemetryEvent) {
        (**self).record(event);
    }
}

impl<T: TelemetrySink> TelemetrySink for Vec<T> {
    fn record(&mut self, event: &TelemetryEvent) {
        for sink in self.iter_mut() {
            sink.record(event);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::ChallengeResolved { npc_id, correct } => {
                info!(npc_id = %npc_id, correct = *correct, "telemetry_challenge_resolved");
            }
            TelemetryEvent::ProgressUpdated {
                completed_count,
                total,
            } => {
                info!(
                    completed_count = *completed_count,
                    total = *total,
                    "telemetry_progress_updated"
                );
            }
            TelemetryEvent::BossUnlocked {} => info!("telemetry_boss_unlocked"),
            TelemetryEvent::SessionComplete {
                reputation,
                budget,
                elapsed_seconds,
            } => {
                info!(
                    reputation = *reputation,
                    budget = *budget,
                    elapsed_seconds = *elapsed_seconds,
                    "telemetry_session_complete"
                );
            }
        }
    }
}

/// Writes one JSON object per line. The first failure is logged and the sink
/// goes quiet afterwards.
#[derive(Debug)]
pub struct JsonLinesTelemetry<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonLinesTelemetry<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &TelemetryEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> TelemetrySink for JsonLinesTelemetry<W> {
    fn record(&mut self, event: &TelemetryEvent) {
        if self.failed {
            return;
        }
        if let Err(error) = self.write_event(event) {
            self.failed = true;
            warn!(error = %error, event = event.name(), "telemetry_write_failed");
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingTelemetry {
    events: Vec<TelemetryEvent>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.events
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn record(&mut self, event: &TelemetryEvent) {
        self.events.push(event.clone());
    }
}
