//! Status command implementation.
//!
//! Reads the credential store only; never touches the network.

use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use storefront_core::CredentialStore;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store();
    let credential = store.get().await.context("Failed to read credentials")?;

    match credential {
        None => println!("{}", "Not logged in".yellow()),
        Some(_) => {
            output::success("Logged in");
            if let Some(saved_at) = store.saved_at().await.context("Failed to read credentials")? {
                output::field(
                    "Saved",
                    &saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
                );
            }
        }
    }

    let backend = match &ctx.config().base_url {
        Some(base) => base.as_str().to_string(),
        None => "(not configured)".to_string(),
    };
    output::field("Backend", &backend);
    output::field("Refresh", &ctx.config().refresh_mode.to_string());
    output::field("Credentials", &store.path().display().to_string());

    Ok(())
}
