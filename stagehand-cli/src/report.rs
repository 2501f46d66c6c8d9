//! Operator-facing summary of a run.
//!
//! Structured progress goes through `tracing`; this module prints the one
//! human-readable line an operator looks for at the end of a run.

use std::io::Write;

use colored::Colorize;

use stagehand_core::{RunOutcome, StageFailure};

/// Hint appended to every failure line.
pub const LOGS_HINT: &str = "Consider running again with `--logs` for more info";

/// Sentence describing a failed stage.
pub fn failure_message(failure: &StageFailure) -> String {
    match failure {
        StageFailure::Build { component, status } => {
            format!("Failed to compile {component} with error code {status}")
        }
        StageFailure::Launch { component, status } => {
            format!("Failed to launch {component} with error code {status}")
        }
        StageFailure::Tests { status } => format!("Workspace tests failed with code {status}"),
    }
}

/// Write the closing line for `outcome` to `w`.
pub fn render_outcome(outcome: &RunOutcome, w: &mut dyn Write) -> std::io::Result<()> {
    match outcome {
        RunOutcome::Success => writeln!(w, "{}", "All stages passed".green().bold()),
        RunOutcome::Failed(failure) => writeln!(
            w,
            "{}. {}",
            failure_message(failure).red().bold(),
            LOGS_HINT
        ),
    }
}

/// Write a fatal (pre-pipeline) error line to `w`.
pub fn render_error(error: &dyn std::fmt::Display, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{} {error}", "error:".red().bold())
}
