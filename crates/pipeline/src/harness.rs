//! Run orchestration -- wires the stages together.
//!
//! # Stage Order
//!
//! 1. Build every component (fail-fast)
//! 2. Launch services (only with `[services] launch = true`)
//! 3. Run the workspace tests (unless opted out)
//! 4. Stop launched services (always, exactly once)
//!
//! Nothing is tested before every component has built. Any stage failure
//! skips the remaining stages and goes straight to step 4.

use std::ffi::OsString;
use std::time::Instant;

use tracing::{error, info};

use stagehand_core::env::INSTANCE_URL_VAR;
use stagehand_core::{EnvironmentConfigurator, HarnessConfig, OutputMode, RunOutcome, StageFailure};

use crate::build::BuildPipeline;
use crate::launch::ServiceLauncher;
use crate::lifecycle::{InterruptSignaller, ServiceGuard, Signaller};
use crate::runner::ProcessRunner;
use crate::suite::TestPipeline;

/// Per-invocation switches, taken from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Whether children inherit stdout/stderr.
    pub output: OutputMode,
    /// Whether the workspace test stage runs.
    pub run_workspace_tests: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            output: OutputMode::Quiet,
            run_workspace_tests: true,
        }
    }
}

/// Single-shot build/test orchestrator.
pub struct Harness<R, S = InterruptSignaller> {
    config: HarnessConfig,
    options: HarnessOptions,
    runner: R,
    signaller: S,
}

impl<R: ProcessRunner> Harness<R> {
    /// Create a harness that stops services with `SIGINT`.
    pub fn new(config: HarnessConfig, options: HarnessOptions, runner: R) -> Self {
        Self::with_signaller(config, options, runner, InterruptSignaller)
    }
}

impl<R: ProcessRunner, S: Signaller> Harness<R, S> {
    /// Create a harness with a custom termination signaller.
    pub fn with_signaller(
        config: HarnessConfig,
        options: HarnessOptions,
        runner: R,
        signaller: S,
    ) -> Self {
        Self {
            config,
            options,
            runner,
            signaller,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn signaller(&self) -> &S {
        &self.signaller
    }

    /// Environment configurator for this harness, seeded from `inherited`.
    pub fn configurator<I, K, V>(&self, inherited: I) -> EnvironmentConfigurator
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let workspace = &self.config.workspace;
        EnvironmentConfigurator::new(inherited, self.options.output)
            .with_var(INSTANCE_URL_VAR, workspace.instance_url.as_str())
            .with_test_config(
                workspace.config_env_var.as_str(),
                &workspace.test_config_path,
            )
    }

    /// Run the whole pipeline against the current process environment.
    pub async fn run(&self) -> RunOutcome {
        let configurator = self.configurator(std::env::vars_os());
        self.run_with(&configurator).await
    }

    /// Run the whole pipeline with an explicit environment configurator.
    pub async fn run_with(&self, configurator: &EnvironmentConfigurator) -> RunOutcome {
        let started = Instant::now();
        info!(
            components = self.config.workspace.components.len(),
            verbose = self.options.output.is_verbose(),
            workspace_tests = self.options.run_workspace_tests,
            launch_services = self.config.services.launch,
            instance_url = self.config.workspace.instance_url.as_str(),
            "starting run"
        );

        let mut services = ServiceGuard::<R::Process, _>::new(&self.signaller);
        let result = self.run_stages(configurator, &mut services).await;

        let stopped = services.shutdown_all();
        if stopped > 0 {
            info!(services = stopped, "services signalled");
        }

        let outcome = RunOutcome::from(result);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome.failure() {
            None => info!(elapsed_ms, "run succeeded"),
            Some(failure) => error!(
                stage = %failure.stage(),
                status = failure.status(),
                elapsed_ms,
                "run failed"
            ),
        }
        outcome
    }

    async fn run_stages<G: Signaller>(
        &self,
        configurator: &EnvironmentConfigurator,
        services: &mut ServiceGuard<R::Process, G>,
    ) -> Result<(), StageFailure> {
        let workspace = &self.config.workspace;
        let cargo = workspace.cargo.as_str();
        let output = self.options.output;

        BuildPipeline::new(&self.runner, cargo, output)
            .run(&workspace.components, &configurator.build_env())
            .await?;

        let test_env = configurator.test_env();

        if self.config.services.launch {
            ServiceLauncher::new(
                &self.runner,
                cargo,
                output,
                self.config.services.startup_grace(),
            )
            .launch_all(&workspace.components, &test_env, services)
            .await?;
        }

        TestPipeline::new(&self.runner, cargo, output, self.options.run_workspace_tests)
            .run(&test_env)
            .await?;

        Ok(())
    }
}
