//! Output formatting helpers.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use warden_core::Identity;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the fields of an identity.
pub fn identity(identity: &Identity) {
    field("ID", &identity.id);
    field("Email", identity.email.as_str());
    field("Role", identity.role.as_str());
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    write_json(&mut std::io::stdout().lock(), value)
}

/// Write a value as one line of compact JSON.
///
/// Unlike `println!`, a closed pipe is reported as an error.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
