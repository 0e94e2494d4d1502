//! Register command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use storefront_core::endpoints::RegisterRequest;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// One-time code from `account send-otp`
    #[arg(long)]
    pub otp: String,
}

pub async fn run(args: RegisterArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth().await?;
    let registration = RegisterRequest {
        first_name: &args.first_name,
        last_name: &args.last_name,
        email: &args.email,
        password: &args.password,
        otp: &args.otp,
    };

    let message = auth
        .register(&registration)
        .await
        .context("Failed to register")?;

    super::report(message, "Account created. Run 'storefront login' to sign in.");
    Ok(())
}
