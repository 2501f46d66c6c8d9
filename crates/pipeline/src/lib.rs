//! stagehand pipeline -- process execution, build/test stages and
//! service lifecycle for a single harness run.
//!
//! The entry point is [`Harness`]; the stages are exposed for callers
//! that want to drive them individually.

pub mod build;
pub mod harness;
pub mod launch;
pub mod lifecycle;
pub mod runner;
pub mod suite;

pub use build::BuildPipeline;
pub use harness::{Harness, HarnessOptions};
pub use launch::ServiceLauncher;
pub use lifecycle::{InterruptSignaller, ServiceGuard, ServiceHandle, ServiceProcess, Signaller};
pub use runner::{ProcessRunner, SystemRunner};
pub use suite::{SuiteStatus, TestPipeline};
