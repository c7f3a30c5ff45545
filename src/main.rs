//!
//! studyNest server binary
//! -----------------------
//! Command-line entry point. Configuration comes from environment variables
//! and CLI flags; see `studynest --help`.

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use studynest::config::{self, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if config::wants_help(&args) {
        println!("{}", config::USAGE);
        return Ok(());
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("While building log filter")?;
    fmt().with_env_filter(filter).init();

    let cfg = Config::from_env_and_args().context("While loading configuration")?;
    studynest::server::run(cfg).await
}
