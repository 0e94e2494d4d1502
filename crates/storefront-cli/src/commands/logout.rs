//! Logout command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use storefront_core::CredentialStore;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let stored = ctx
        .store()
        .get()
        .await
        .context("Failed to read credentials")?;
    if stored.is_none() {
        eprintln!("{}", "Not logged in.".dimmed());
        return Ok(());
    }

    let auth = ctx.auth().await?;
    auth.logout().await.context("Failed to logout")?;

    output::success("Logged out");
    Ok(())
}
