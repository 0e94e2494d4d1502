//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use storefront_core::RefreshMode;

use crate::commands::account::AccountCommand;
use crate::commands::{login, logout, request, status, whoami};

/// Storefront API client with automatic credential refresh.
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version = env!("STOREFRONT_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend base URL
    #[arg(long, global = true, env = "STOREFRONT_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Directory holding the persisted credential
    #[arg(long, global = true, env = "STOREFRONT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "STOREFRONT_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Share one refresh between concurrent expired requests
    #[arg(long, global = true, env = "STOREFRONT_REFRESH_MODE", value_parser = parse_refresh_mode)]
    pub refresh_mode: Option<RefreshMode>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_refresh_mode(s: &str) -> Result<RefreshMode, String> {
    s.parse().map_err(|e: storefront_core::Error| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and persist the credential
    Login(login::LoginArgs),

    /// Sign out and forget the credential
    Logout(logout::LogoutArgs),

    /// Show the signed-in user's profile
    Whoami(whoami::WhoamiArgs),

    /// Show whether a credential is stored (no network)
    Status(status::StatusArgs),

    /// Send an arbitrary API request
    Request(request::RequestArgs),

    /// Registration and password management
    Account(AccountCommand),
}
