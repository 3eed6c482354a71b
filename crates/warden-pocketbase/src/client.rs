//! HTTP client for PocketBase auth endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use warden_core::error::{AuthError, ProtocolError, TransportError};
use warden_core::{
    AuthBackend, AuthToken, BackendUrl, CredentialChanges, CredentialStore, Credentials, Email,
    Error, Identity, Result, Role,
};

use crate::config::PocketBaseConfig;
use crate::store::TokenStore;

const AUTH_WITH_PASSWORD: &str = "auth-with-password";
const AUTH_REFRESH: &str = "auth-refresh";

/// Request body for auth-with-password.
#[derive(Debug, Serialize)]
struct PasswordAuthRequest<'a> {
    identity: &'a str,
    password: &'a str,
}

/// Successful response from either auth endpoint.
#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    record: AuthRecord,
}

#[derive(Deserialize)]
struct AuthRecord {
    id: String,
    email: String,
    #[serde(default)]
    role: Option<String>,
}

impl AuthRecord {
    /// An absent or empty role means a plain member.
    fn into_identity(self) -> Result<Identity> {
        let decode = |e: Error| TransportError::Decode {
            message: format!("record {}: {}", self.id, e),
        };

        let email = Email::new(self.email.as_str()).map_err(decode)?;
        let role = match self.role.as_deref() {
            None | Some("") => Role::default(),
            Some(role) => role.parse().map_err(decode)?,
        };
        Ok(Identity::new(self.id, email, role))
    }
}

/// Error body returned by PocketBase.
#[derive(Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    code: Option<u16>,
    message: Option<String>,
}

/// A PocketBase auth collection client.
///
/// Successful logins and refreshes save the issued token into the client's
/// [`TokenStore`]; refreshes send the stored token back. The client also
/// implements [`CredentialStore`] by delegating to that store, so one
/// `Arc<PocketBaseClient>` can back a whole session controller.
#[derive(Debug, Clone)]
pub struct PocketBaseClient {
    config: PocketBaseConfig,
    http: reqwest::Client,
    store: Arc<TokenStore>,
}

impl PocketBaseClient {
    /// Create a client with an empty token store.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(config: PocketBaseConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(TokenStore::new()))
    }

    /// Create a client sharing an existing token store.
    pub fn with_store(config: PocketBaseConfig, store: Arc<TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            config,
            http,
            store,
        })
    }

    pub fn url(&self) -> &BackendUrl {
        &self.config.url
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    /// The token store this client saves into.
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Identity> {
        let status = response.status();
        trace!(status = %status, "PocketBase response");

        if !status.is_success() {
            return Err(Error::Protocol(parse_error_response(response).await));
        }

        let body: AuthResponse = response.json().await.map_err(transport_error)?;
        let identity = body.record.into_identity()?;
        self.store.save(AuthToken::new(body.token), identity.clone());
        Ok(identity)
    }
}

#[async_trait]
impl AuthBackend for PocketBaseClient {
    #[instrument(skip(self), fields(url = %self.config.url, collection = %self.config.collection))]
    async fn auth_refresh(&self) -> Result<Identity> {
        let token = self.store.token().ok_or(AuthError::MissingCredential)?;
        let url = self.config.auth_url(AUTH_REFRESH);
        debug!("Refreshing auth token");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, token.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        let identity = self.handle_response(response).await?;
        info!(user_id = %identity.id, "Auth token refreshed");
        Ok(identity)
    }

    #[instrument(skip(self, credentials), fields(url = %self.config.url, collection = %self.config.collection))]
    async fn auth_with_password(&self, credentials: &Credentials) -> Result<Identity> {
        let email = credentials.validate()?;
        let url = self.config.auth_url(AUTH_WITH_PASSWORD);
        debug!(identity = %email, "Authenticating with password");

        let request = PasswordAuthRequest {
            identity: email.as_str(),
            password: credentials.password(),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        // PocketBase answers a bad email/password pair with 400.
        if response.status() == StatusCode::BAD_REQUEST {
            let error = parse_error_response(response).await;
            debug!(%error, "Password rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let identity = self.handle_response(response).await?;
        info!(user_id = %identity.id, "Authenticated with password");
        Ok(identity)
    }
}

impl CredentialStore for PocketBaseClient {
    fn is_valid(&self) -> bool {
        self.store.is_valid()
    }

    fn changes(&self) -> CredentialChanges {
        self.store.changes()
    }

    fn clear(&self) {
        self.store.clear()
    }
}

/// Parse a PocketBase error body, falling back to the bare status.
async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    match response.json::<ErrorResponse>().await {
        Ok(body) => ProtocolError::new(status, body.message),
        Err(_) => ProtocolError::new(status, None),
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}
