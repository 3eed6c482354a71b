//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::BackendArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(backend: &BackendArgs, _args: LogoutArgs) -> Result<()> {
    let session = CliSession::open(backend)?;

    session.controller.logout();
    session.persist().context("Failed to remove session")?;

    output::success("Logged out");
    Ok(())
}
