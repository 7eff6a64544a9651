//! StreamFlix terminal client.
//!
//! One-shot commands restore the stored session, act, and exit. `shell` keeps
//! the session open and follows the navigation gate.

use anyhow::Result;
use clap::Parser;
use streamflix::ClientConfig;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{App, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;

    let fallback = if cli.verbose {
        "streamflix=debug"
    } else {
        config.log_filter.as_str()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let app = App::new(config)?;
    cli::run(cli, &app).await
}
