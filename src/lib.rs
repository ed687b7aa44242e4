pub mod adapter;
pub mod application;
pub mod domain;
pub mod infrastructure;

use std::process::ExitCode;

use adapter::cli::Cli;
use infrastructure::config;
use infrastructure::logging;

/// Load configuration, set up logging and run one CLI command.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let app_config = config::app();

    // Initialize logging
    logging::setup(app_config.logging.production);

    // Initialize configuration
    config::init();

    cli.execute(app_config).await
}
