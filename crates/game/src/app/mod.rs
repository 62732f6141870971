pub mod autopilot;
pub mod bootstrap;
pub mod loop_runner;
