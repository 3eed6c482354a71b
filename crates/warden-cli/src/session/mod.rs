//! A session controller wired to the PocketBase adapter and disk storage.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use warden_core::BackendUrl;
use warden_pocketbase::{PocketBaseClient, PocketBaseConfig};
use warden_session::{SessionConfig, SessionController};

use crate::cli::BackendArgs;
use storage::StoredSession;

/// The controller for one CLI invocation, plus the client whose token
/// store it persists.
pub struct CliSession {
    client: Arc<PocketBaseClient>,
    pub controller: SessionController,
}

impl CliSession {
    /// Build a controller for the configured backend, restoring a stored
    /// session if it was issued by the same backend.
    pub fn open(args: &BackendArgs) -> Result<Self> {
        let url = BackendUrl::new(&args.url).context("Invalid backend URL")?;
        let config = PocketBaseConfig::new(url).with_collection(&args.collection);
        let client =
            Arc::new(PocketBaseClient::new(config).context("Failed to create HTTP client")?);

        if let Some(stored) = storage::load_session()? {
            if stored.url == client.url().as_str() && stored.collection == client.collection() {
                client.store().restore(stored.auth);
            } else {
                warn!(stored = %stored.url, "Ignoring session stored for another backend");
            }
        }

        let controller = SessionController::with_adapter(
            Arc::clone(&client),
            SessionConfig::default().with_refresh_debounce(args.debounce()),
        );

        Ok(Self { client, controller })
    }

    /// Write the current token to disk, or remove the file if there is none.
    pub fn persist(&self) -> Result<()> {
        match self.client.store().export() {
            Some(auth) => storage::save_session(&StoredSession {
                url: self.client.url().as_str().to_string(),
                collection: self.client.collection().to_string(),
                auth,
            }),
            None => storage::clear_session(),
        }
    }
}
