use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use profit_cli::app;
use profit_cli::cli::Cli;
use profit_cli::config::AppConfig;
use profit_cli::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load settings")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    logging::init_logging(&level);
    if let Some(path) = &config.logging.file {
        if let Err(e) = logging::enable_file_logging(path) {
            warn!(error = %e, "File logging disabled");
        }
    }

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    app::run(cli, &config, &mut out, &mut err).await
}
