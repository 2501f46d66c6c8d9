//! CLI-specific error types and exit code mapping

use stagehand_core::error::HarnessError;

/// Errors that stop the harness before or outside the pipeline.
///
/// Stage failures are not errors here: they are a normal
/// [`RunOutcome`](stagehand_core::RunOutcome) and exit with code 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Tracing subscriber could not be installed.
    #[error("logging error: {0}")]
    Logging(String),

    /// IO error (config read, stderr write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                        |
    /// |------|--------------------------------|
    /// | 0    | Success                        |
    /// | 1    | Build, launch or test failure  |
    /// | 2    | Configuration error            |
    /// | 10   | IO error                       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Logging(_) => 1,
        }
    }
}

impl From<HarnessError> for CliError {
    fn from(e: HarnessError) -> Self {
        match e {
            HarnessError::Io(io) => Self::Io(io),
            other => Self::Config(other.to_string()),
        }
    }
}
