//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::BackendArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Output the user as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(backend: &BackendArgs, args: WhoamiArgs) -> Result<()> {
    let session = CliSession::open(backend)?;

    session.controller.initialize().await;
    // The refresh may have rotated or cleared the token.
    session.persist().context("Failed to save session")?;

    let user = session
        .controller
        .user()
        .context("No active session. Run 'warden login' first.")?;

    if args.json {
        output::json(&user)?;
    } else {
        output::identity(&user);
    }

    Ok(())
}
