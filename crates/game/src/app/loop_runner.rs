use std::process::ExitCode;

use engine::{run_headless_with_metrics, MetricsHandle, StopReason};
use tracing::{error, info, warn};

use super::autopilot::Autopilot;
use super::bootstrap::AppWiring;
use crate::session::{Session, SessionState};

/// Exit code when the run ends before the session completes.
const INCOMPLETE_EXIT_CODE: u8 = 2;

pub fn run(app: AppWiring) -> ExitCode {
    if let Some(hash) = app.session.content_hash_sha256_hex.as_deref() {
        info!(content_hash = hash, "session_content_fingerprint");
    }
    let mut session = Session::new(SessionState::new(app.session), app.telemetry);
    let mut autopilot = Autopilot::default();
    let metrics = MetricsHandle::default();

    let summary = run_headless_with_metrics(&app.config, &mut session, &mut autopilot, &metrics);
    let loop_metrics = metrics.snapshot();
    info!(
        ticks_run = summary.ticks_run,
        simulated_seconds = summary.simulated_seconds,
        last_tps = loop_metrics.ticks_per_second,
        "run_finished"
    );

    let snapshot = session.state().snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(error = %err, "snapshot_serialize_failed");
            return ExitCode::FAILURE;
        }
    }

    match summary.stop_reason {
        StopReason::SimulationFinished => ExitCode::SUCCESS,
        StopReason::QuitRequested | StopReason::TickLimitReached => {
            warn!(
                stop_reason = ?summary.stop_reason,
                completed = snapshot.completed_count,
                total = snapshot.total_npcs,
                "session_incomplete"
            );
            ExitCode::from(INCOMPLETE_EXIT_CODE)
        }
    }
}
