//! CLI argument definitions.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::commands::{login::LoginArgs, logout::LogoutArgs, watch::WatchArgs, whoami::WhoamiArgs};

/// Sign in to a PocketBase backend and inspect the session.
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(author, version = env!("WARDEN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the identity backend lives.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Backend base URL
    #[arg(long, env = "WARDEN_URL", default_value = "http://127.0.0.1:8090", global = true)]
    pub url: String,

    /// Auth collection name
    #[arg(long, default_value = warden_pocketbase::DEFAULT_COLLECTION, global = true)]
    pub collection: String,

    /// Refresh debounce window in milliseconds
    #[arg(long, default_value_t = 30_000, global = true)]
    pub debounce_ms: u64,
}

impl BackendArgs {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login(LoginArgs),

    /// Show the signed-in user, refreshing a stored session
    Whoami(WhoamiArgs),

    /// Sign out and forget the stored session
    Logout(LogoutArgs),

    /// Print session events until interrupted
    Watch(WatchArgs),
}
