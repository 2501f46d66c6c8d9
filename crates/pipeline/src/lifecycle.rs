//! Service lifecycle -- tracking and graceful termination of launched services.
//!
//! [`ServiceGuard`] owns the "services may be running" responsibility for
//! one run. Services are registered as they are launched; the termination
//! pass runs once, either explicitly through
//! [`shutdown_all`](ServiceGuard::shutdown_all) at the end of the run or
//! from `Drop` if the run is left early (`?`, panic).
//!
//! Termination sends `SIGINT` and does not wait for the process to exit.
//! A service that has already exited is skipped.

use std::collections::BTreeMap;

use tracing::{info, warn};

use stagehand_core::Component;

/// A launched long-running service, owned by the guard until cleanup.
#[derive(Debug)]
pub struct ServiceHandle<P> {
    /// Component the service was started from.
    pub component: Component,
    /// The running process.
    pub process: P,
}

/// A child process the guard can stop.
///
/// The guard holds the process itself rather than a bare pid. An exited
/// child stays unreaped until [`live_pid`](Self::live_pid) observes it, so
/// a pid reported here can never belong to an unrelated process.
pub trait ServiceProcess: Send {
    /// PID while the process is still running, `None` once it has exited.
    fn live_pid(&mut self) -> std::io::Result<Option<u32>>;
}

impl ServiceProcess for tokio::process::Child {
    fn live_pid(&mut self) -> std::io::Result<Option<u32>> {
        if self.try_wait()?.is_some() {
            return Ok(None);
        }
        Ok(self.id())
    }
}

/// Delivers the graceful-termination request to a process.
pub trait Signaller: Send + Sync {
    /// Ask `pid` to shut down.
    fn interrupt(&self, pid: u32) -> std::io::Result<()>;
}

impl<T: Signaller + ?Sized> Signaller for &T {
    fn interrupt(&self, pid: u32) -> std::io::Result<()> {
        (**self).interrupt(pid)
    }
}

/// Sends `SIGINT` through `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptSignaller;

#[cfg(unix)]
impl Signaller for InterruptSignaller {
    fn interrupt(&self, pid: u32) -> std::io::Result<()> {
        let pid = libc::pid_t::try_from(pid).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("pid {pid} out of range"),
            )
        })?;

        // SAFETY: kill(2) has no memory-safety preconditions
        let result = unsafe { libc::kill(pid, libc::SIGINT) };
        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

#[cfg(not(unix))]
impl Signaller for InterruptSignaller {
    fn interrupt(&self, _pid: u32) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "graceful termination not supported on this platform",
        ))
    }
}

/// Scoped owner of every service launched during a run.
pub struct ServiceGuard<P: ServiceProcess, S: Signaller = InterruptSignaller> {
    services: BTreeMap<Component, P>,
    signaller: S,
}

impl<P: ServiceProcess, S: Signaller> ServiceGuard<P, S> {
    /// Create an empty guard.
    pub fn new(signaller: S) -> Self {
        Self {
            services: BTreeMap::new(),
            signaller,
        }
    }

    /// Start tracking a launched service.
    ///
    /// A component is tracked at most once. If it is already tracked the
    /// previous process is stopped right away so it is not leaked.
    pub fn track(&mut self, handle: ServiceHandle<P>) {
        let ServiceHandle { component, process } = handle;
        if let Some(previous) = self.services.insert(component.clone(), process) {
            warn!(
                component = %component,
                "component already tracked, stopping previous process"
            );
            self.stop(&component, previous);
        }
    }

    /// Currently tracked components, ordered by name.
    pub fn components(&self) -> Vec<Component> {
        self.services.keys().cloned().collect()
    }

    /// Number of tracked services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Send the termination signal to every tracked service that is still
    /// running.
    ///
    /// Every service is forgotten afterwards, so a second call (or the drop
    /// pass) is a no-op. Returns the number of signals sent.
    pub fn shutdown_all(&mut self) -> usize {
        let services = std::mem::take(&mut self.services);
        services
            .into_iter()
            .map(|(component, process)| self.stop(&component, process))
            .filter(|signalled| *signalled)
            .count()
    }

    fn stop(&self, component: &Component, mut process: P) -> bool {
        let pid = match process.live_pid() {
            Ok(Some(pid)) => pid,
            Ok(None) => {
                info!(component = %component, "service already exited");
                return false;
            }
            Err(e) => {
                warn!(component = %component, error = %e, "failed to query service state");
                return false;
            }
        };

        info!(component = %component, pid, "stopping service");
        if let Err(e) = self.signaller.interrupt(pid) {
            warn!(
                component = %component,
                pid,
                error = %e,
                "failed to signal service"
            );
        }
        true
    }
}

impl<P: ServiceProcess, S: Signaller> Drop for ServiceGuard<P, S> {
    fn drop(&mut self) {
        if !self.services.is_empty() {
            warn!(
                services = self.services.len(),
                "run ended without explicit shutdown, stopping services"
            );
            self.shutdown_all();
        }
    }
}
