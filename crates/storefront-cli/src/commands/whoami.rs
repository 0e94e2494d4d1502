//! Whoami command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use storefront_core::CredentialStore;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, ctx: &Context) -> Result<()> {
    ctx.store()
        .get()
        .await
        .context("Failed to read credentials")?
        .context("No active session. Run 'storefront login' first.")?;

    let auth = ctx.auth().await?;
    let user = auth.current_user().await.context("Failed to fetch user")?;

    output::json_pretty(&user)?;
    Ok(())
}
