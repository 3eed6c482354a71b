//! In-memory test doubles for the session controller.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use warden_core::error::{AuthError, TransportError};
use warden_core::{
    AuthBackend, CredentialChange, CredentialChanges, CredentialStore, Credentials, Email, Error,
    Identity, Result, Role,
};
use warden_session::{SessionConfig, SessionController, SessionEvent, Subscription};

pub const WINDOW: Duration = Duration::from_secs(30);

pub fn member() -> Identity {
    Identity::new("1", Email::new("a@b.com").unwrap(), Role::Member)
}

/// Credential store holding nothing but a validity flag.
pub struct MemoryStore {
    valid: AtomicBool,
    clears: AtomicUsize,
    tx: broadcast::Sender<CredentialChange>,
}

impl MemoryStore {
    pub fn new(valid: bool) -> Arc<Self> {
        let (tx, _) = broadcast::channel(16);
        Arc::new(Self {
            valid: AtomicBool::new(valid),
            clears: AtomicUsize::new(0),
            tx,
        })
    }

    /// Change validity and notify subscribers.
    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::SeqCst);
        let _ = self.tx.send(CredentialChange { valid });
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for MemoryStore {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    fn changes(&self) -> CredentialChanges {
        let mut rx = self.tx.subscribe();
        CredentialChanges::new(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(change) => yield change,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.set_valid(false);
    }
}

/// How the fake backend answers `auth_refresh`.
#[derive(Debug, Clone)]
pub enum RefreshReply {
    Identity(Identity),
    /// Answers with an identity without saving a token.
    IdentityWithoutToken(Identity),
    Unauthorized,
    Unavailable,
}

/// Identity backend that accepts `a@b.com` / `correct` and answers refreshes
/// from a script.
pub struct FakeBackend {
    store: Arc<MemoryStore>,
    reply: Mutex<RefreshReply>,
    latency: Duration,
    login_latency: Mutex<Duration>,
    refresh_calls: AtomicUsize,
    login_calls: AtomicUsize,
    network_down: AtomicBool,
}

impl FakeBackend {
    pub fn new(store: Arc<MemoryStore>, reply: RefreshReply) -> Arc<Self> {
        Self::with_latency(store, reply, Duration::ZERO)
    }

    /// A backend whose refreshes take `latency` to answer.
    pub fn with_latency(store: Arc<MemoryStore>, reply: RefreshReply, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            reply: Mutex::new(reply),
            latency,
            login_latency: Mutex::new(Duration::ZERO),
            refresh_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            network_down: AtomicBool::new(false),
        })
    }

    pub fn set_reply(&self, reply: RefreshReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn set_login_latency(&self, latency: Duration) {
        *self.login_latency.lock().unwrap() = latency;
    }

    pub fn set_network_down(&self, down: bool) {
        self.network_down.store(down, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

async fn wait(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn auth_refresh(&self) -> Result<Identity> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        wait(self.latency).await;

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            RefreshReply::Identity(identity) => {
                // A real backend re-saves the refreshed token.
                self.store.set_valid(true);
                Ok(identity)
            }
            RefreshReply::IdentityWithoutToken(identity) => Ok(identity),
            RefreshReply::Unauthorized => Err(Error::Auth(AuthError::Unauthorized)),
            RefreshReply::Unavailable => Err(Error::Transport(TransportError::Connection {
                message: "connection refused".to_string(),
            })),
        }
    }

    async fn auth_with_password(&self, credentials: &Credentials) -> Result<Identity> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.login_latency.lock().unwrap();
        wait(latency).await;

        if self.network_down.load(Ordering::SeqCst) {
            return Err(Error::Transport(TransportError::Timeout));
        }

        if credentials.email() == "a@b.com" && credentials.password() == "correct" {
            self.store.set_valid(true);
            Ok(member())
        } else {
            Err(Error::Auth(AuthError::InvalidCredentials))
        }
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub backend: Arc<FakeBackend>,
    pub controller: SessionController,
}

impl Harness {
    pub fn new(credential_valid: bool, reply: RefreshReply) -> Self {
        let store = MemoryStore::new(credential_valid);
        let backend = FakeBackend::new(Arc::clone(&store), reply);
        Self::build(store, backend)
    }

    pub fn build(store: Arc<MemoryStore>, backend: Arc<FakeBackend>) -> Self {
        let controller = SessionController::new(
            store.clone(),
            backend.clone(),
            SessionConfig::default().with_refresh_debounce(WINDOW),
        );
        Self {
            store,
            backend,
            controller,
        }
    }
}

/// Observer that records every event it receives.
pub fn record(controller: &SessionController) -> (Arc<Mutex<Vec<SessionEvent>>>, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = controller.subscribe(move |event| {
        sink.lock().unwrap().push(event.clone());
    });
    (events, subscription)
}
