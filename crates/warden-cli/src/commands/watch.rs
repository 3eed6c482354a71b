//! Watch command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::warn;

use warden_session::SessionEvent;

use crate::cli::BackendArgs;
use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Output events as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(backend: &BackendArgs, args: WatchArgs) -> Result<()> {
    let session = CliSession::open(backend)?;

    let json_output = args.json;
    let _subscription = session
        .controller
        .subscribe(move |event| print_event(event, json_output));

    eprintln!("{}", "Watching session events...".dimmed());
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());
    eprintln!();

    session.controller.initialize().await;
    if !session.controller.is_authenticated() {
        output::warning("Not signed in; waiting for a credential change");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    session.controller.shutdown();
    session.persist().context("Failed to save session")?;

    Ok(())
}

fn print_event(event: &SessionEvent, json_output: bool) {
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");

    if json_output {
        let value = match event {
            SessionEvent::Changed(snapshot) => json!({
                "time": timestamp.to_string(),
                "type": "changed",
                "authenticated": snapshot.is_authenticated(),
                "user": snapshot.user(),
            }),
            SessionEvent::RefreshFailed { reason } => json!({
                "time": timestamp.to_string(),
                "type": "refresh_failed",
                "reason": reason,
            }),
            SessionEvent::LoginFailed { reason } => json!({
                "time": timestamp.to_string(),
                "type": "login_failed",
                "reason": reason,
            }),
            SessionEvent::ResetRequested => json!({
                "time": timestamp.to_string(),
                "type": "reset_requested",
            }),
        };
        if let Err(e) = output::json(&value) {
            warn!(error = %e, "Failed to print event");
        }
        return;
    }

    match event {
        SessionEvent::Changed(snapshot) => match snapshot.user() {
            Some(user) => println!(
                "{} {} {} ({})",
                timestamp.to_string().dimmed(),
                "SIGNED IN".green(),
                user.email,
                user.role
            ),
            None => println!(
                "{} {}",
                timestamp.to_string().dimmed(),
                "SIGNED OUT".yellow()
            ),
        },
        SessionEvent::RefreshFailed { reason } => println!(
            "{} {} {}",
            timestamp.to_string().dimmed(),
            "REFRESH FAILED".red(),
            reason
        ),
        SessionEvent::LoginFailed { reason } => println!(
            "{} {} {}",
            timestamp.to_string().dimmed(),
            "LOGIN FAILED".red(),
            reason
        ),
        SessionEvent::ResetRequested => {
            println!("{} {}", timestamp.to_string().dimmed(), "RESET".cyan())
        }
    }
}
