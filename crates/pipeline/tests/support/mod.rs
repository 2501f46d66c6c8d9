//! Test doubles for the pipeline integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use stagehand_core::component::components;
use stagehand_core::{HarnessConfig, Invocation, OutputMode, RunEnvironment};
use stagehand_pipeline::{ProcessRunner, ServiceProcess, Signaller};

/// How the runner was asked to execute a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Run,
    Spawn,
}

/// One recorded runner call.
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub command: String,
    pub env: RunEnvironment,
    pub output: OutputMode,
}

/// Process handed out by [`ScriptedRunner::spawn`].
#[derive(Debug)]
pub struct ScriptedProcess {
    pub pid: u32,
    pub exited: bool,
}

impl ServiceProcess for ScriptedProcess {
    fn live_pid(&mut self) -> std::io::Result<Option<u32>> {
        Ok((!self.exited).then_some(self.pid))
    }
}

/// Runner that answers from a script instead of starting processes.
///
/// Commands not in the script exit 0; spawns get increasing fake pids.
#[derive(Default)]
pub struct ScriptedRunner {
    statuses: HashMap<String, i32>,
    spawn_failures: HashSet<String>,
    early_exits: HashSet<String>,
    calls: Mutex<Vec<Call>>,
    next_pid: AtomicU32,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            ..Self::default()
        }
    }

    /// Make `command` (e.g. `"cargo build -p svc-b"`) exit with `status`.
    pub fn with_status(mut self, command: &str, status: i32) -> Self {
        self.statuses.insert(command.to_owned(), status);
        self
    }

    /// Make spawning `command` fail.
    pub fn with_spawn_failure(mut self, command: &str) -> Self {
        self.spawn_failures.insert(command.to_owned());
        self
    }

    /// Make the service started by `command` exit before cleanup.
    pub fn with_early_exit(mut self, command: &str) -> Self {
        self.early_exits.insert(command.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    /// Commands whose program arguments start with `subcommand`.
    pub fn count(&self, subcommand: &str) -> usize {
        let prefix = format!("cargo {subcommand}");
        self.commands()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    fn record(&self, kind: CallKind, invocation: &Invocation, env: &RunEnvironment, output: OutputMode) {
        self.calls.lock().expect("calls lock").push(Call {
            kind,
            command: invocation.to_string(),
            env: env.clone(),
            output,
        });
    }
}

impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation, env: &RunEnvironment, output: OutputMode) -> i32 {
        self.record(CallKind::Run, invocation, env, output);
        self.statuses
            .get(&invocation.to_string())
            .copied()
            .unwrap_or(0)
    }

    type Process = ScriptedProcess;

    fn spawn(
        &self,
        invocation: &Invocation,
        env: &RunEnvironment,
        output: OutputMode,
    ) -> std::io::Result<ScriptedProcess> {
        self.record(CallKind::Spawn, invocation, env, output);
        if self.spawn_failures.contains(&invocation.to_string()) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "scripted spawn failure",
            ));
        }
        Ok(ScriptedProcess {
            pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
            exited: self.early_exits.contains(&invocation.to_string()),
        })
    }
}

/// Signaller that records pids instead of signalling them.
#[derive(Default)]
pub struct RecordingSignaller {
    sent: Mutex<Vec<u32>>,
}

impl RecordingSignaller {
    pub fn sent(&self) -> Vec<u32> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl Signaller for RecordingSignaller {
    fn interrupt(&self, pid: u32) -> std::io::Result<()> {
        self.sent.lock().expect("sent lock").push(pid);
        Ok(())
    }
}

/// Config with the given components and no startup delay.
pub fn config_with(names: &[&str]) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.workspace.components = components(names.iter().copied());
    config.services.startup_grace_ms = 0;
    config
}

/// Deterministic inherited environment.
pub fn inherited(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
