//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod watch;
pub mod whoami;
