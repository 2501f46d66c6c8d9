//! Build stage -- compiles each component in declared order, fail-fast.

use tracing::{error, info};

use stagehand_core::{Component, Invocation, OutputMode, RunEnvironment, StageFailure};

use crate::runner::ProcessRunner;

/// Sequential build of the component list.
///
/// Components are built one at a time because later components may use
/// artifacts of earlier ones, and interleaved output would be unreadable
/// with `--logs`.
pub struct BuildPipeline<'a, R> {
    runner: &'a R,
    cargo: &'a str,
    output: OutputMode,
}

impl<'a, R: ProcessRunner> BuildPipeline<'a, R> {
    /// Create a build stage using `cargo` as the build tool.
    pub fn new(runner: &'a R, cargo: &'a str, output: OutputMode) -> Self {
        Self {
            runner,
            cargo,
            output,
        }
    }

    /// Build every component, stopping at the first failure.
    pub async fn run(
        &self,
        components: &[Component],
        env: &RunEnvironment,
    ) -> Result<(), StageFailure> {
        for component in components {
            info!(component = %component, "compiling");

            let invocation = Invocation::build(self.cargo, component);
            let status = self.runner.run(&invocation, env, self.output).await;
            if status != 0 {
                error!(component = %component, status, "build failed");
                return Err(StageFailure::Build {
                    component: component.clone(),
                    status,
                });
            }
        }

        info!(components = components.len(), "all components built");
        Ok(())
    }
}
