use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct ForgotPasswordArgs {
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: ForgotPasswordArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth().await?;
    let message = auth
        .request_password_reset(&args.email)
        .await
        .context("Failed to request password reset")?;
    super::report(message, "Reset link sent");
    Ok(())
}
