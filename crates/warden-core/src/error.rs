//! Error types for warden operations.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, and input validation errors, plus a
//! coarse [`FailureKind`] classification the session controller recovers on.

use std::fmt;
use thiserror::Error;

/// The unified error type for warden operations.
///
/// Backend adapters report every failure through this type so the session
/// controller can decide between clearing the session, reporting a failed
/// login, and leaving state untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (error responses, unexpected bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (malformed email, role, URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// How the session controller should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The stored credential was rejected; the session must be cleared.
    Unauthorized,
    /// The supplied login credentials were rejected or malformed.
    AuthFailure,
    /// Network or server trouble; the current state is kept.
    Transient,
}

impl Error {
    /// Returns true if the backend rejected the stored credential.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Auth(
                AuthError::Unauthorized | AuthError::SessionExpired | AuthError::MissingCredential,
            ) => true,
            Error::Protocol(e) => e.is_auth_error(),
            _ => false,
        }
    }

    /// Returns true for failures worth retrying later unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Protocol(e) => e.is_server_error(),
            _ => false,
        }
    }

    /// Classify this error for session recovery.
    pub fn kind(&self) -> FailureKind {
        if self.is_unauthorized() {
            FailureKind::Unauthorized
        } else if self.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::AuthFailure
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The stored credential was rejected by the backend.
    #[error("unauthorized")]
    Unauthorized,

    /// The stored credential has expired.
    #[error("session expired")]
    SessionExpired,

    /// No credential is stored, so nothing can be refreshed.
    #[error("no stored credential")]
    MissingCredential,
}

/// Protocol-level errors from backend responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Check if the server (not the request) is at fault.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500 || self.status == 429
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid email address.
    #[error("invalid email '{value}': {reason}")]
    Email { value: String, reason: String },

    /// Unknown role name.
    #[error("invalid role '{value}'")]
    Role { value: String },

    /// Invalid backend URL.
    #[error("invalid backend URL '{value}': {reason}")]
    BackendUrl { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
