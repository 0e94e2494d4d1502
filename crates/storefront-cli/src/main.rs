//! storefront - CLI for the storefront API.
//!
//! This is a thin wrapper over `storefront-core`, intended for exercising the
//! backend with a persisted, self-refreshing session.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;
use context::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    let ctx = Context::new(&cli)?;
    let result = commands::handle(cli.command, &ctx).await;

    // Also after a failed command, so a torn-down session drops its cookies.
    if let Err(e) = ctx.finish().await {
        warn!(error = %e, "Failed to persist session cookies");
    }

    result
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
