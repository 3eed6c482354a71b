//! warden-core - Core session types and traits.
//!
//! This crate holds the vocabulary shared by the session controller and the
//! backend adapters: the [`Identity`] record, validated input types, the
//! unified [`Error`] type, and the two capabilities a controller is built
//! from ([`CredentialStore`] and [`AuthBackend`]).

pub mod credentials;
pub mod error;
pub mod identity;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::{Error, FailureKind};
pub use identity::Identity;
pub use tokens::AuthToken;
pub use traits::{AuthBackend, CredentialChange, CredentialChanges, CredentialStore};
pub use types::{BackendUrl, Email, Role};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
