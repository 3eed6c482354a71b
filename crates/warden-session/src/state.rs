//! The in-process session state.

use tokio::sync::watch;
use warden_core::Identity;

/// An immutable view of the session at one instant.
///
/// The identity and the authenticated flag are always published together,
/// so a snapshot never pairs `is_authenticated() == true` with a missing user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    user: Option<Identity>,
    authenticated: bool,
}

impl SessionSnapshot {
    fn from_identity(user: Option<Identity>) -> Self {
        let authenticated = user.is_some();
        Self {
            user,
            authenticated,
        }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Coarse lifecycle position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    /// A backend revalidation is in flight and no identity is loaded yet.
    Refreshing,
    Authenticated,
}

/// Single source of truth for `{ user, is_authenticated }`.
///
/// Reads are lock-free snapshots; the only writer is the owning
/// [`SessionController`](crate::SessionController).
#[derive(Debug)]
pub struct SessionState {
    tx: watch::Sender<SessionSnapshot>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Create an empty, unauthenticated state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::default());
        Self { tx }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn user(&self) -> Option<Identity> {
        self.tx.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().authenticated
    }

    /// Returns true if an identity is loaded.
    pub fn has_identity(&self) -> bool {
        self.tx.borrow().user.is_some()
    }

    /// Subscribe to snapshot updates.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Replace the identity and derive the authenticated flag in one step.
    pub(crate) fn apply(&self, identity: Option<Identity>) -> SessionSnapshot {
        let snapshot = SessionSnapshot::from_identity(identity);
        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}
