//! Registration and password management subcommands.

mod change_password;
mod forgot_password;
mod register;
mod reset_password;
mod send_otp;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountSubcommand {
    /// Email a one-time code for registration
    SendOtp(send_otp::SendOtpArgs),

    /// Create a new account
    Register(register::RegisterArgs),

    /// Change the signed-in user's password
    ChangePassword(change_password::ChangePasswordArgs),

    /// Email a password reset link
    ForgotPassword(forgot_password::ForgotPasswordArgs),

    /// Set a new password with a reset token
    ResetPassword(reset_password::ResetPasswordArgs),
}

pub async fn handle(cmd: AccountCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        AccountSubcommand::SendOtp(args) => send_otp::run(args, ctx).await,
        AccountSubcommand::Register(args) => register::run(args, ctx).await,
        AccountSubcommand::ChangePassword(args) => change_password::run(args, ctx).await,
        AccountSubcommand::ForgotPassword(args) => forgot_password::run(args, ctx).await,
        AccountSubcommand::ResetPassword(args) => reset_password::run(args, ctx).await,
    }
}

/// Report the backend's message, or `fallback` when it sent none.
fn report(message: Option<String>, fallback: &str) {
    output::success(message.as_deref().unwrap_or(fallback));
}
