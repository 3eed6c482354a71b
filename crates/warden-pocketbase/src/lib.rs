//! warden-pocketbase - PocketBase-backed session adapter.
//!
//! [`PocketBaseClient`] talks to a PocketBase auth collection and keeps the
//! issued token in a shared [`TokenStore`]. The client is both the
//! credential store and the identity backend a
//! `warden_session::SessionController` is built from.

mod client;
mod config;
mod jwt;
mod store;

pub use client::PocketBaseClient;
pub use config::{DEFAULT_COLLECTION, PocketBaseConfig};
pub use store::{PersistedAuth, TokenStore};
