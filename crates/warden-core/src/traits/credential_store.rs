//! Credential store trait.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

/// Notification that the stored credential changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialChange {
    /// Validity of the credential after the change.
    pub valid: bool,
}

/// Stream of credential change notifications.
///
/// Dropping the stream unsubscribes.
pub struct CredentialChanges {
    inner: Pin<Box<dyn Stream<Item = CredentialChange> + Send>>,
}

impl CredentialChanges {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = CredentialChange> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for CredentialChanges {
    type Item = CredentialChange;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for CredentialChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChanges").finish_non_exhaustive()
    }
}

/// Holder of the persisted credential.
///
/// The session core never inspects the credential itself; it only asks
/// whether it is valid, listens for changes, and clears it.
pub trait CredentialStore: Send + Sync {
    /// Returns true if a usable credential is stored.
    fn is_valid(&self) -> bool;

    /// Subscribe to credential changes.
    fn changes(&self) -> CredentialChanges;

    /// Erase the stored credential.
    fn clear(&self);
}
