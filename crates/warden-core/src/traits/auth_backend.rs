//! Identity backend trait.

use async_trait::async_trait;

use crate::{Credentials, Identity, Result};

/// The remote identity backend.
///
/// Implementations are expected to keep their [`CredentialStore`] in step:
/// a successful call leaves a valid credential behind.
///
/// [`CredentialStore`]: super::CredentialStore
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Revalidate the stored credential and fetch the current identity.
    ///
    /// Fails with an error whose [`kind`](crate::Error::kind) is
    /// [`FailureKind::Unauthorized`](crate::FailureKind::Unauthorized) when
    /// the credential is rejected.
    async fn auth_refresh(&self) -> Result<Identity>;

    /// Authenticate with email and password.
    async fn auth_with_password(&self, credentials: &Credentials) -> Result<Identity>;
}
