//! The resolved user record.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Role};

/// The identity of the signed-in user, as resolved by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend record id.
    pub id: String,
    /// Account email address.
    pub email: Email,
    /// Access role.
    pub role: Role,
}

impl Identity {
    /// Create a new identity.
    pub fn new(id: impl Into<String>, email: Email, role: Role) -> Self {
        Self {
            id: id.into(),
            email,
            role,
        }
    }
}
