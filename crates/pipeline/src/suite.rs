//! Test stage -- runs the workspace test suite once.

use tracing::{error, info};

use stagehand_core::{Invocation, OutputMode, RunEnvironment, StageFailure};

use crate::runner::ProcessRunner;

/// Result of a test stage that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteStatus {
    /// The suite ran and exited zero.
    Passed,
    /// The suite was opted out with `--no-workspace`.
    Skipped,
}

/// Workspace-wide `cargo test` invocation.
pub struct TestPipeline<'a, R> {
    runner: &'a R,
    cargo: &'a str,
    output: OutputMode,
    enabled: bool,
}

impl<'a, R: ProcessRunner> TestPipeline<'a, R> {
    pub fn new(runner: &'a R, cargo: &'a str, output: OutputMode, enabled: bool) -> Self {
        Self {
            runner,
            cargo,
            output,
            enabled,
        }
    }

    /// Run the suite with `env`, which must already carry the test
    /// configuration path.
    pub async fn run(&self, env: &RunEnvironment) -> Result<SuiteStatus, StageFailure> {
        if !self.enabled {
            info!("workspace tests skipped");
            return Ok(SuiteStatus::Skipped);
        }

        info!("testing workspace");
        let status = self
            .runner
            .run(&Invocation::test(self.cargo), env, self.output)
            .await;
        if status != 0 {
            error!(status, "workspace tests failed");
            return Err(StageFailure::Tests { status });
        }

        info!("workspace tests passed");
        Ok(SuiteStatus::Passed)
    }
}
