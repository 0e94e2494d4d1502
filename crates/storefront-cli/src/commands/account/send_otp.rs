use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct SendOtpArgs {
    /// Email to send the code to
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: SendOtpArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth().await?;
    let message = auth.send_otp(&args.email).await.context("Failed to send code")?;
    super::report(message, "Code sent");
    Ok(())
}
