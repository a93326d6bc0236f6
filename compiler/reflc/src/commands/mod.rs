//! Command handlers for the `reflc` CLI.
//!
//! Each `run_*` function takes the arguments after the command name and
//! returns the process exit code; `main` only dispatches.

mod dump;
mod extract;

pub use dump::{load_descriptors, render_registry, run_dump};
pub use extract::{extract, run_extract, ExtractOutcome};

/// Exit code for a bad command line or configuration.
pub const EXIT_USAGE: i32 = 2;
/// Exit code when the run could not start at all.
pub const EXIT_FAILURE: i32 = 1;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
