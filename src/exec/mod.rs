//! Command execution.
//!
//! The execution driver runs one CLI invocation through an injected
//! dispatcher and collects a structured result; the retry controller wraps
//! it to mask transient infrastructure flakiness without masking logic
//! regressions.

mod driver;
mod retry;

pub use driver::{
    format_command, split_command, CommandContext, CommandDispatcher, CommandOutput,
    CommandResult, Execution, ExecutionDriver,
};
pub use retry::{RetryController, RetryPolicy};
