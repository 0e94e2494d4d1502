//! Reset password command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Token from the reset link
    #[arg(long)]
    pub token: String,

    #[arg(long)]
    pub password: String,

    /// Defaults to --password
    #[arg(long)]
    pub confirm_password: Option<String>,
}

pub async fn run(args: ResetPasswordArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth().await?;

    let valid = auth
        .validate_reset_token(&args.token)
        .await
        .context("Failed to validate reset token")?;
    if !valid {
        bail!("Reset link is invalid or has expired. Run 'storefront account forgot-password' again.");
    }

    let confirm = args.confirm_password.as_deref().unwrap_or(&args.password);
    let message = auth
        .reset_password(&args.token, &args.password, confirm)
        .await
        .context("Failed to reset password")?;

    super::report(message, "Password updated. Run 'storefront login' to sign in.");
    Ok(())
}
