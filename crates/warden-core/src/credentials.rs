//! Login credentials type.

use std::fmt;

use crate::Result;
use crate::types::Email;

/// Email and password login credentials.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use warden_core::Credentials;
///
/// let creds = Credentials::new("alice@example.com", "hunter2");
/// assert_eq!(creds.email(), "alice@example.com");
/// ```
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// The email is not validated here; see [`Credentials::validate`].
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the email address as supplied.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Check the credentials are well-formed before sending them anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or the password is empty.
    pub fn validate(&self) -> Result<Email> {
        let email = Email::new(self.email.as_str())?;
        if self.password.is_empty() {
            return Err(crate::error::InvalidInputError::Other {
                message: "password must not be empty".to_string(),
            }
            .into());
        }
        Ok(email)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
