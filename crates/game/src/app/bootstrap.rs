use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use engine::{resolve_app_paths, ContentPipelineError, LoopConfig, LoopPacing, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{load_session_config, ValidatedSession, SESSION_FILE_NAME};
use crate::telemetry::{JsonLinesTelemetry, TelemetrySink, TracingTelemetry};

pub const CONTENT_ENV_VAR: &str = "STAKEHOLDER_CONTENT";
pub const MAX_TICKS_ENV_VAR: &str = "STAKEHOLDER_MAX_TICKS";
pub const PACING_ENV_VAR: &str = "STAKEHOLDER_PACING";
pub const TELEMETRY_JSONL_ENV_VAR: &str = "STAKEHOLDER_TELEMETRY_JSONL";

/// Ten simulated minutes at the default tick rate.
const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 10;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentPipelineError),
    #[error("environment variable {var} has invalid value {value:?}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to open telemetry file {path}: {source}")]
    TelemetryFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct AppWiring {
    pub config: LoopConfig,
    pub session: ValidatedSession,
    pub telemetry: Vec<Box<dyn TelemetrySink>>,
}

pub fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Stakeholder Tour Startup ===");

    let content_path = resolve_content_path()?;
    info!(path = %content_path.display(), "session_content_selected");
    let session = load_session_config(&content_path)?;

    let max_ticks = read_env(MAX_TICKS_ENV_VAR)?
        .map(|raw| parse_max_ticks(&raw))
        .transpose()?
        .unwrap_or(DEFAULT_MAX_TICKS);
    let pacing = read_env(PACING_ENV_VAR)?
        .map(|raw| parse_pacing(&raw))
        .transpose()?
        .unwrap_or(LoopPacing::Unpaced);
    let config = LoopConfig {
        max_ticks: Some(max_ticks),
        pacing,
        ..LoopConfig::default()
    };

    let mut telemetry: Vec<Box<dyn TelemetrySink>> = vec![Box::new(TracingTelemetry)];
    if let Some(raw_path) = read_env(TELEMETRY_JSONL_ENV_VAR)? {
        let path = PathBuf::from(raw_path);
        let file = File::create(&path).map_err(|source| AppError::TelemetryFile {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "telemetry_jsonl_enabled");
        telemetry.push(Box::new(JsonLinesTelemetry::new(BufWriter::new(file))));
    }

    Ok(AppWiring {
        config,
        session,
        telemetry,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

fn resolve_content_path() -> Result<PathBuf, AppError> {
    if let Some(raw) = read_env(CONTENT_ENV_VAR)? {
        return Ok(PathBuf::from(raw));
    }
    let paths = resolve_app_paths()?;
    Ok(paths.base_content_dir.join(SESSION_FILE_NAME))
}

fn read_env(var: &'static str) -> Result<Option<String>, AppError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }.into()),
    }
}

fn parse_max_ticks(raw: &str) -> Result<u64, AppError> {
    let invalid = |reason: String| AppError::InvalidEnv {
        var: MAX_TICKS_ENV_VAR,
        value: raw.to_string(),
        reason,
    };
    let ticks = raw
        .trim()
        .parse::<u64>()
        .map_err(|error| invalid(error.to_string()))?;
    if ticks == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(ticks)
}

/// `realtime` follows the wall clock, `unpaced` runs ticks back to back.
fn parse_pacing(raw: &str) -> Result<LoopPacing, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "unpaced" => Ok(LoopPacing::Unpaced),
        "realtime" | "real_time" => Ok(LoopPacing::RealTime),
        _ => Err(AppError::InvalidEnv {
            var: PACING_ENV_VAR,
            value: raw.to_string(),
            reason: "expected `unpaced` or `realtime`".to_string(),
        }),
    }
}
