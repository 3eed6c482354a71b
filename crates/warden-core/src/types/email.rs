//! Email address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A syntactically plausible email address.
///
/// Validation is deliberately shallow: one `@`, non-empty local part and
/// domain, no whitespace. Deliverability is the backend's problem.
///
/// # Example
///
/// ```
/// use warden_core::Email;
///
/// let email = Email::new("alice@example.com").unwrap();
/// assert_eq!(email.domain(), "example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new email from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a plausible email address.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the part before the `@`.
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map(|(local, _)| local).unwrap_or("")
    }

    /// Returns the part after the `@`.
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, domain)| domain).unwrap_or("")
    }

    /// Returns the full address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Email {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }

        let Some((local, domain)) = s.split_once('@') else {
            return Err(invalid("must contain '@'"));
        };

        if local.is_empty() {
            return Err(invalid("local part must be non-empty"));
        }

        if domain.is_empty() || domain.contains('@') {
            return Err(invalid("domain must be non-empty and contain no '@'"));
        }

        Ok(())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
