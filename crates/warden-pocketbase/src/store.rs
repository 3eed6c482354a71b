//! In-memory store for the PocketBase auth token.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, trace};

use warden_core::{AuthToken, CredentialChange, CredentialChanges, CredentialStore, Identity};

use crate::jwt;

/// Buffered change notifications per subscriber before it starts lagging.
const CHANGE_BUFFER: usize = 16;

/// Holds the current auth token and the record it was issued for.
///
/// The token is valid while it is a JWT whose `exp` lies in the future.
/// Every save, restore and clear is broadcast to [`changes`] subscribers.
///
/// [`changes`]: CredentialStore::changes
pub struct TokenStore {
    auth: RwLock<StoredAuth>,
    tx: broadcast::Sender<CredentialChange>,
}

#[derive(Default)]
struct StoredAuth {
    token: Option<AuthToken>,
    record: Option<Identity>,
}

/// Serializable form of the stored auth, for keeping a session across runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAuth {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Identity>,
}

impl std::fmt::Debug for PersistedAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedAuth")
            .field("token", &"[REDACTED]")
            .field("record", &self.record)
            .finish()
    }
}

impl TokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            auth: RwLock::new(StoredAuth::default()),
            tx,
        }
    }

    /// Store a freshly issued token and its record.
    pub fn save(&self, token: AuthToken, record: Identity) {
        {
            let mut auth = self.write();
            auth.token = Some(token);
            auth.record = Some(record);
        }
        debug!("Auth token saved");
        self.publish();
    }

    /// Load a previously persisted session.
    ///
    /// The token is restored even if it has already expired; it simply
    /// reports as invalid.
    pub fn restore(&self, persisted: PersistedAuth) {
        {
            let mut auth = self.write();
            auth.token = Some(AuthToken::new(persisted.token));
            auth.record = persisted.record;
        }
        debug!("Auth token restored");
        self.publish();
    }

    /// Snapshot the stored session for persistence.
    pub fn export(&self) -> Option<PersistedAuth> {
        let auth = self.read();
        auth.token.as_ref().map(|token| PersistedAuth {
            token: token.as_str().to_string(),
            record: auth.record.clone(),
        })
    }

    /// The stored token, expired or not.
    pub fn token(&self) -> Option<AuthToken> {
        self.read().token.clone()
    }

    /// The record the stored token was issued for.
    pub fn record(&self) -> Option<Identity> {
        self.read().record.clone()
    }

    /// When the stored token expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read()
            .token
            .as_ref()
            .and_then(|token| jwt::expires_at(token.as_str()))
    }

    fn publish(&self) {
        let change = CredentialChange {
            valid: self.is_valid(),
        };
        // No receivers is fine.
        let receivers = self.tx.send(change).unwrap_or(0);
        trace!(valid = change.valid, receivers, "credential change published");
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredAuth> {
        self.auth.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredAuth> {
        self.auth.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for TokenStore {
    fn is_valid(&self) -> bool {
        self.read()
            .token
            .as_ref()
            .is_some_and(|token| jwt::is_unexpired(token.as_str(), Utc::now()))
    }

    fn changes(&self) -> CredentialChanges {
        let mut rx = self.tx.subscribe();
        CredentialChanges::new(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(change) => yield change,
                    Err(RecvError::Lagged(skipped)) => {
                        trace!(skipped, "credential change subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn clear(&self) {
        {
            let mut auth = self.write();
            auth.token = None;
            auth.record = None;
        }
        debug!("Auth token cleared");
        self.publish();
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = self.read();
        f.debug_struct("TokenStore")
            .field("token", &auth.token)
            .field("record", &auth.record)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use warden_core::{Email, Role};

    fn token_expiring_in(offset: Duration) -> AuthToken {
        AuthToken::new(jwt::encode(json!({
            "id": "1",
            "exp": (Utc::now() + offset).timestamp(),
        })))
    }

    fn member() -> Identity {
        Identity::new("1", Email::new("a@b.com").unwrap(), Role::Member)
    }

    #[test]
    fn empty_store_is_invalid() {
        let store = TokenStore::new();
        assert!(!store.is_valid());
        assert!(store.token().is_none());
        assert!(store.export().is_none());
    }

    #[test]
    fn save_makes_store_valid() {
        let store = TokenStore::new();
        store.save(token_expiring_in(Duration::hours(1)), member());

        assert!(store.is_valid());
        assert_eq!(store.record(), Some(member()));
        assert!(store.expires_at().is_some());
    }

    #[test]
    fn expired_token_is_invalid() {
        let store = TokenStore::new();
        store.save(token_expiring_in(Duration::hours(-1)), member());

        assert!(!store.is_valid());
        assert!(store.token().is_some());
    }

    #[test]
    fn clear_removes_token_and_record() {
        let store = TokenStore::new();
        store.save(token_expiring_in(Duration::hours(1)), member());

        store.clear();

        assert!(!store.is_valid());
        assert!(store.token().is_none());
        assert!(store.record().is_none());
    }

    #[test]
    fn export_then_restore_keeps_session() {
        let store = TokenStore::new();
        store.save(token_expiring_in(Duration::hours(1)), member());
        let persisted = store.export().unwrap();

        let restored = TokenStore::new();
        restored.restore(persisted);

        assert!(restored.is_valid());
        assert_eq!(restored.record(), Some(member()));
    }

    #[test]
    fn persisted_auth_hides_token_in_debug() {
        let persisted = PersistedAuth {
            token: "eyJsecret".to_string(),
            record: None,
        };
        let debug = format!("{:?}", persisted);
        assert!(!debug.contains("eyJsecret"));
    }

    #[tokio::test]
    async fn changes_report_validity() {
        use futures_util::StreamExt;

        let store = TokenStore::new();
        let mut changes = store.changes();

        store.save(token_expiring_in(Duration::hours(1)), member());
        store.clear();

        assert_eq!(changes.next().await, Some(CredentialChange { valid: true }));
        assert_eq!(changes.next().await, Some(CredentialChange { valid: false }));
    }
}
