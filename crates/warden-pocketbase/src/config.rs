//! Connection settings for a PocketBase backend.

use serde::{Deserialize, Serialize};

use warden_core::BackendUrl;

/// Auth collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "users";

/// Where the identity backend lives and which auth collection to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketBaseConfig {
    pub url: BackendUrl,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl PocketBaseConfig {
    pub fn new(url: BackendUrl) -> Self {
        Self {
            url,
            collection: default_collection(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Returns the URL of an auth endpoint of the configured collection.
    pub(crate) fn auth_url(&self, action: &str) -> String {
        self.url
            .api_url(&format!("collections/{}/{}", self.collection, action))
    }
}
