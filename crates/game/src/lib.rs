pub mod app;
pub mod config;
pub mod session;
pub mod telemetry;

pub use config::{load_session_config, SessionConfig, SessionRules, ValidatedSession};
pub use session::{Session, SessionSnapshot, SessionState};
pub use telemetry::{JsonLinesTelemetry, RecordingTelemetry, TelemetrySink, TracingTelemetry};
