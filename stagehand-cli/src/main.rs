use clap::Parser;

use stagehand_cli::cli::HarnessCli;
use stagehand_cli::error::CliError;
use stagehand_cli::{ConfigSource, logging, report};
use stagehand_core::RunOutcome;
use stagehand_pipeline::{Harness, SystemRunner};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = HarnessCli::parse();

    let code = match run(&cli).await {
        Ok(outcome) => {
            let _ = report::render_outcome(&outcome, &mut std::io::stderr());
            outcome.exit_code()
        }
        Err(e) => {
            let _ = report::render_error(&e, &mut std::io::stderr());
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: &HarnessCli) -> Result<RunOutcome, CliError> {
    let source = ConfigSource::from_env();
    let (config, from_file) = source.load().await?;
    logging::init_tracing(&config.general)?;

    tracing::info!(
        config = %source.path().display(),
        version = env!("CARGO_PKG_VERSION"),
        "stagehand starting"
    );
    if !from_file {
        tracing::info!(
            config = %source.path().display(),
            "config file not found, using defaults"
        );
    }

    let runner = SystemRunner::new(config.workspace.root_path());
    let harness = Harness::new(config, cli.options(), runner);
    Ok(harness.run().await)
}
