//! Command implementations.

pub mod account;
pub mod login;
pub mod logout;
pub mod request;
pub mod status;
pub mod whoami;

use anyhow::Result;

use crate::cli::Commands;
use crate::context::Context;

pub async fn handle(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args, ctx).await,
        Commands::Logout(args) => logout::run(args, ctx).await,
        Commands::Whoami(args) => whoami::run(args, ctx).await,
        Commands::Status(args) => status::run(args, ctx).await,
        Commands::Request(args) => request::run(args, ctx).await,
        Commands::Account(cmd) => account::handle(cmd, ctx).await,
    }
}
