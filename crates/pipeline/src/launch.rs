//! Service launch stage -- starts each built component before testing.
//!
//! Only used when `[services] launch = true`. Every started process is
//! handed to the [`ServiceGuard`] immediately, so a failure part-way
//! through still stops the services launched so far.

use std::time::Duration;

use tracing::{error, info};

use stagehand_core::{
    Component, Invocation, LAUNCH_FAILURE_STATUS, OutputMode, RunEnvironment, StageFailure,
};

use crate::lifecycle::{ServiceGuard, ServiceHandle, Signaller};
use crate::runner::ProcessRunner;

pub struct ServiceLauncher<'a, R> {
    runner: &'a R,
    cargo: &'a str,
    output: OutputMode,
    startup_grace: Duration,
}

impl<'a, R: ProcessRunner> ServiceLauncher<'a, R> {
    pub fn new(runner: &'a R, cargo: &'a str, output: OutputMode, startup_grace: Duration) -> Self {
        Self {
            runner,
            cargo,
            output,
            startup_grace,
        }
    }

    /// Launch every component in order and register it with `guard`,
    /// then wait for the startup grace period.
    pub async fn launch_all<S: Signaller>(
        &self,
        components: &[Component],
        env: &RunEnvironment,
        guard: &mut ServiceGuard<R::Process, S>,
    ) -> Result<(), StageFailure> {
        for component in components {
            info!(component = %component, "starting service");

            let invocation = Invocation::launch(self.cargo, component);
            match self.runner.spawn(&invocation, env, self.output) {
                Ok(process) => guard.track(ServiceHandle {
                    component: component.clone(),
                    process,
                }),
                Err(e) => {
                    error!(component = %component, error = %e, "failed to launch service");
                    return Err(StageFailure::Launch {
                        component: component.clone(),
                        status: LAUNCH_FAILURE_STATUS,
                    });
                }
            }
        }

        if !self.startup_grace.is_zero() {
            info!(
                grace_ms = self.startup_grace.as_millis() as u64,
                "waiting for services to come up"
            );
            tokio::time::sleep(self.startup_grace).await;
        }

        Ok(())
    }
}
