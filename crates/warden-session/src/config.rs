//! Session controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay between the last refresh request and the refresh itself.
pub const DEFAULT_REFRESH_DEBOUNCE: Duration = Duration::from_secs(30);

/// Tunables for a [`SessionController`](crate::SessionController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Trailing debounce window for refresh requests.
    #[serde(rename = "refresh_debounce_ms", with = "duration_ms")]
    pub refresh_debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_debounce: DEFAULT_REFRESH_DEBOUNCE,
        }
    }
}

impl SessionConfig {
    /// Set the refresh debounce window.
    pub fn with_refresh_debounce(mut self, delay: Duration) -> Self {
        self.refresh_debounce = delay;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
