mod collision;
mod geometry;
mod input;
mod loop_runner;
mod metrics;

pub use collision::ColliderSet;
pub use geometry::{Aabb, AabbError, Axis, Vec2, Vec3};
pub use input::{InputSnapshot, InputSource};
pub use loop_runner::{
    run_headless, run_headless_with_metrics, LoopConfig, LoopPacing, LoopSummary, SimCommand,
    Simulation, StopReason,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
