//! Suite lifecycle management.
//!
//! Orchestrates per-suite and per-test setup and teardown: mode selection,
//! fixture activation, environment seeding, strict scope-consumption
//! verification, and record-mode flushing.

mod env;
mod runner;

pub use env::EnvOverlay;
pub use runner::{SuitePreconditions, SuiteRunner, TestOptions, TestSession};
