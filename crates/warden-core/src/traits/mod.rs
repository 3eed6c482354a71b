//! Capabilities a session controller is built from.

mod auth_backend;
mod credential_store;

pub use auth_backend::AuthBackend;
pub use credential_store::{CredentialChange, CredentialChanges, CredentialStore};
