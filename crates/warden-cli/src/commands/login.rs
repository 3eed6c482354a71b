//! Login command implementation.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use warden_session::SessionEvent;

use crate::cli::BackendArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(backend: &BackendArgs, args: LoginArgs) -> Result<()> {
    let session = CliSession::open(backend)?;

    let failure = Arc::new(Mutex::new(None));
    let _subscription = {
        let failure = Arc::clone(&failure);
        session.controller.subscribe(move |event| {
            if let SessionEvent::LoginFailed { reason } = event {
                *failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason.clone());
            }
        })
    };

    eprintln!("{}", "Logging in...".dimmed());

    if !session.controller.login(&args.email, &args.password).await {
        let reason = failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .unwrap_or_else(|| "unknown error".to_string());
        bail!("Login failed: {}", reason);
    }

    session.persist().context("Failed to save session")?;

    let user = session
        .controller
        .user()
        .context("Login succeeded but no user is loaded")?;

    output::success("Logged in successfully");
    println!();
    output::identity(&user);

    Ok(())
}
