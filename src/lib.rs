// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Clireplay
//!
//! A record/playback test harness for command-line tools that talk to HTTP
//! services.
//!
//! ## Overview
//!
//! Clireplay lets integration tests for a cloud-management CLI run in two
//! ways from the same test code:
//!
//! - **Record**: commands run against the live service, and every HTTP
//!   exchange is captured into a JSON fixture file
//! - **Playback**: commands run entirely offline, with each HTTP call
//!   served from the recorded fixture in strict order
//!
//! Playback is deterministic and credential-free: a synthetic account
//! profile and per-fixture environment overrides stand in for real
//! accounts, and any deviation from the recorded call sequence fails the
//! test with a precise diagnostic.
//!
//! ## Architecture
//!
//! A suite runs through the [`suite::SuiteRunner`] lifecycle. The command
//! under test is reached through two injected seams:
//!
//! 1. **Transport** ([`intercept::HttpTransport`]): playback, live, or
//!    recording
//! 2. **Dispatcher** ([`exec::CommandDispatcher`]): the CLI entry point,
//!    argv in, captured output out
//!
//! ## Modules
//!
//! - [`config`]: Harness settings and mode selection
//! - [`fixture`]: Fixture data model and on-disk store
//! - [`intercept`]: HTTP interception, playback, and recording
//! - [`exec`]: Command execution driver and retry controller
//! - [`suite`]: Suite and test lifecycle orchestration
//! - [`cli`]: Fixture inspection command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use clireplay::config::{HarnessSettings, Mode};
//! use clireplay::suite::SuiteRunner;
//! # use clireplay::exec::{CommandContext, CommandDispatcher, CommandOutput};
//! # struct MyCli;
//! # #[async_trait::async_trait]
//! # impl CommandDispatcher for MyCli {
//! #     async fn dispatch(&self, _ctx: CommandContext) -> clireplay::error::Result<CommandOutput> {
//! #         Ok(CommandOutput::default())
//! #     }
//! # }
//!
//! # async fn example() -> clireplay::error::Result<()> {
//! let settings = HarnessSettings::new("tests/fixtures").with_mode(Mode::Playback);
//! let mut runner = SuiteRunner::new("things", std::sync::Arc::new(MyCli), settings)?;
//! runner.setup_suite().await?;
//!
//! let session = runner.setup_test("thing set updates tags")?;
//! let result = session.run("thing set %s --tags %s --json", &["foo", "a=1"]).await?;
//! assert!(result.success());
//! runner.teardown_test(session)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod fixture;
pub mod intercept;
pub mod suite;

pub use config::{HarnessSettings, Mode};
pub use error::{HarnessError, Result};
pub use exec::{CommandContext, CommandDispatcher, CommandOutput, CommandResult};
pub use fixture::{Fixture, FixtureStore, Profile};
pub use intercept::{HttpRequest, HttpResponse, HttpTransport, RecordingSession};
pub use suite::{EnvOverlay, SuitePreconditions, SuiteRunner, TestOptions, TestSession};
