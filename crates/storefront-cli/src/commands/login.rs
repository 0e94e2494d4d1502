//! Login command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth().await?;

    eprintln!("{}", "Logging in...".dimmed());

    let user = auth
        .login(&args.email, &args.password)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", &args.email);
    if let Some(base) = &ctx.config().base_url {
        output::field("Backend", base.as_str());
    }
    output::field("Credentials", &ctx.store().path().display().to_string());

    if let Some(user) = user {
        println!();
        output::json_pretty(&user)?;
    }

    Ok(())
}
