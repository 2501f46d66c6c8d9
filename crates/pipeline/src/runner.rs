//! Process runner -- executes one external command and reports its status.
//!
//! [`ProcessRunner`] is the seam between the pipeline stages and the OS.
//! [`SystemRunner`] is the production implementation built on
//! `tokio::process`; tests substitute a scripted runner.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use stagehand_core::command::{LAUNCH_FAILURE_STATUS, SIGNAL_STATUS_OFFSET};
use stagehand_core::{Invocation, OutputMode, RunEnvironment};

use crate::lifecycle::ServiceProcess;

/// Executes external commands on behalf of the pipeline stages.
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` to completion and return its exit status.
    ///
    /// A command that cannot be started at all reports
    /// [`LAUNCH_FAILURE_STATUS`]. The output mode never affects the status.
    fn run(
        &self,
        invocation: &Invocation,
        env: &RunEnvironment,
        output: OutputMode,
    ) -> impl Future<Output = i32> + Send;

    /// Handle to a process started with [`spawn`](Self::spawn).
    type Process: ServiceProcess;

    /// Start `invocation` as a long-running process without waiting for it.
    fn spawn(
        &self,
        invocation: &Invocation,
        env: &RunEnvironment,
        output: OutputMode,
    ) -> std::io::Result<Self::Process>;
}

/// Runs commands as real child processes.
///
/// Children get exactly the given [`RunEnvironment`] (nothing else is
/// inherited), run with the workspace root as their working directory,
/// and never read from stdin.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    root: PathBuf,
}

impl SystemRunner {
    /// Create a runner whose children start in `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Working directory for every child.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command(&self, invocation: &Invocation, env: &RunEnvironment, output: OutputMode) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&self.root)
            .env_clear()
            .envs(env.iter())
            .stdin(Stdio::null())
            .stdout(stdio_for(output))
            .stderr(stdio_for(output));
        cmd
    }
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation, env: &RunEnvironment, output: OutputMode) -> i32 {
        debug!(command = %invocation, root = %self.root.display(), "running command");

        match self.command(invocation, env, output).status().await {
            Ok(status) => {
                let code = exit_status_code(status);
                debug!(command = %invocation, status = code, "command finished");
                code
            }
            Err(e) => {
                warn!(
                    program = invocation.program.as_str(),
                    error = %e,
                    "failed to launch command"
                );
                LAUNCH_FAILURE_STATUS
            }
        }
    }

    type Process = Child;

    fn spawn(
        &self,
        invocation: &Invocation,
        env: &RunEnvironment,
        output: OutputMode,
    ) -> std::io::Result<Child> {
        let child = self.command(invocation, env, output).spawn()?;
        debug!(command = %invocation, pid = ?child.id(), "service process spawned");
        Ok(child)
    }
}

fn stdio_for(output: OutputMode) -> Stdio {
    match output {
        OutputMode::Quiet => Stdio::null(),
        OutputMode::Inherit => Stdio::inherit(),
    }
}

/// Map an [`ExitStatus`] to a numeric status.
///
/// Signal-terminated children report `128 + signo`.
pub fn exit_status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return SIGNAL_STATUS_OFFSET + signal;
        }
    }

    LAUNCH_FAILURE_STATUS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn exit_status_code_passes_through_exit_codes() {
        use std::os::unix::process::ExitStatusExt;
        // wait(2) encodes exit code 3 as 3 << 8
        assert_eq!(exit_status_code(ExitStatus::from_raw(3 << 8)), 3);
        assert_eq!(exit_status_code(ExitStatus::from_raw(0)), 0);
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_code_maps_signals() {
        use std::os::unix::process::ExitStatusExt;
        let status = ExitStatus::from_raw(libc::SIGINT);
        assert_eq!(exit_status_code(status), 128 + libc::SIGINT);
    }

    #[test]
    fn system_runner_keeps_root() {
        let runner = SystemRunner::new("/srv/eludris");
        assert_eq!(runner.root(), Path::new("/srv/eludris"));
    }
}
