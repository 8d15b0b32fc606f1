//! CLI entry point for the pull-request size labeler.
//!
//! Run `size-label --help` for usage information.

use anyhow::Result;
use clap::Parser;
use size_label::{Cli, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli)?;

    // Initialize tracing
    let filter = if config.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    size_label::run(&config).await?;

    Ok(())
}
