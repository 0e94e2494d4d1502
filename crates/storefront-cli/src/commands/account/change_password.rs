use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct ChangePasswordArgs {
    #[arg(long)]
    pub old_password: String,

    #[arg(long)]
    pub new_password: String,
}

pub async fn run(args: ChangePasswordArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth().await?;
    let message = auth
        .change_password(&args.old_password, &args.new_password)
        .await
        .context("Failed to change password")?;
    super::report(message, "Password changed");
    Ok(())
}
