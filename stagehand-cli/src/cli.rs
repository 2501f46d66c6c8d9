//! CLI argument definitions for stagehand.
//!
//! Uses `clap` v4 derive macros. Purely declarative, no side effects.

use clap::Parser;

use stagehand_core::OutputMode;
use stagehand_pipeline::HarnessOptions;

/// Build every service, run the workspace tests, stop what was started.
///
/// Child output is discarded unless `--logs` is given. Configuration is
/// read from `stagehand.toml` (or `$STAGEHAND_CONFIG`) when present.
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version, about, long_about = None)]
pub struct HarnessCli {
    /// Show build and test output instead of discarding it.
    #[arg(long = "logs")]
    pub verbose: bool,

    /// Skip the workspace-wide `cargo test` stage.
    #[arg(long = "no-workspace")]
    pub skip_workspace_tests: bool,
}

impl HarnessCli {
    /// Harness switches derived from the flags.
    pub fn options(&self) -> HarnessOptions {
        HarnessOptions {
            output: OutputMode::from_verbose(self.verbose),
            run_workspace_tests: !self.skip_workspace_tests,
        }
    }
}
