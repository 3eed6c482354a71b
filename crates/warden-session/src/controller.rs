//! The session controller.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use warden_core::{AuthBackend, CredentialStore, Credentials, Identity};

use crate::config::SessionConfig;
use crate::lock;
use crate::notifier::{ChangeNotifier, SessionEvent, Subscription};
use crate::scheduler::{RefreshScheduler, ScopedTask};
use crate::state::{SessionSnapshot, SessionState, SessionStatus};

/// Orchestrates login, logout and background refresh of a single session.
///
/// The controller is the only writer of its [`SessionState`]; everything
/// else reads snapshots or subscribes to [`SessionEvent`]s.
///
/// # Thread Safety
///
/// Controllers are cheap to clone (they use internal `Arc`) and clones share
/// the same session. Dropping the last clone tears the controller down the
/// same way [`shutdown`](Self::shutdown) does.
///
/// # Failures
///
/// No operation returns an error. A rejected credential clears the session,
/// a failed login reports `false`, and transient backend trouble leaves the
/// state as it was. Diagnostics are logged and published as events.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    store: Arc<dyn CredentialStore>,
    backend: Arc<dyn AuthBackend>,
    config: SessionConfig,
    state: SessionState,
    notifier: ChangeNotifier,
    scheduler: RefreshScheduler,
    listener: Mutex<Option<ScopedTask>>,
    initialized: AtomicBool,
    shut_down: AtomicBool,
    refreshing: AtomicUsize,
    logging_in: AtomicUsize,
    /// Bumped by every logout; backend results from an older epoch are stale.
    epoch: AtomicU64,
    /// A stale token could not be cleared while a login was running; the
    /// login settles it when it finishes.
    clear_owed: AtomicBool,
}

/// Counts a backend call as in flight for as long as it lives.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionController {
    /// Create a controller from a credential store and an identity backend.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        backend: Arc<dyn AuthBackend>,
        config: SessionConfig,
    ) -> Self {
        let scheduler = RefreshScheduler::new(config.refresh_debounce);

        Self {
            inner: Arc::new(ControllerInner {
                store,
                backend,
                config,
                state: SessionState::new(),
                notifier: ChangeNotifier::new(),
                scheduler,
                listener: Mutex::new(None),
                initialized: AtomicBool::new(false),
                shut_down: AtomicBool::new(false),
                refreshing: AtomicUsize::new(0),
                logging_in: AtomicUsize::new(0),
                epoch: AtomicU64::new(0),
                clear_owed: AtomicBool::new(false),
            }),
        }
    }

    /// Create a controller from an adapter that is both store and backend.
    pub fn with_adapter<A>(adapter: Arc<A>, config: SessionConfig) -> Self
    where
        A: CredentialStore + AuthBackend + 'static,
    {
        Self::new(adapter.clone(), adapter, config)
    }

    /// Start the controller.
    ///
    /// Subscribes to credential changes, routing each one through the
    /// debounced refresh, then refreshes immediately if a valid credential
    /// is stored but no identity is loaded. Calling this more than once, or
    /// after [`shutdown`](Self::shutdown), has no effect.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        if self.is_shut_down() {
            debug!("Controller shut down, not initializing");
            return;
        }
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("Controller already initialized");
            return;
        }

        self.listen_for_credential_changes();

        if self.inner.store.is_valid() && !self.inner.state.has_identity() {
            info!("Stored credential found, refreshing session");
            self.refresh().await;
        }
    }

    fn listen_for_credential_changes(&self) {
        let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
        let mut changes = self.inner.store.changes();

        let listener = ScopedTask::spawn(async move {
            while let Some(change) = changes.next().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                debug!(valid = change.valid, "Credential changed");
                // Signed out with nothing stored: no session to refresh or clear.
                if !inner.store.is_valid() && !inner.state.has_identity() {
                    continue;
                }
                SessionController { inner }.request_refresh();
            }
        });

        *lock(&self.inner.listener) = Some(listener);
    }

    /// Schedule a debounced refresh.
    ///
    /// Repeated calls within the debounce window collapse into one refresh,
    /// run one window after the last call. Ignored after
    /// [`shutdown`](Self::shutdown).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn request_refresh(&self) {
        if self.is_shut_down() {
            debug!("Controller shut down, ignoring refresh request");
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.request_refresh(async move {
            if let Some(inner) = weak.upgrade() {
                SessionController { inner }.refresh().await;
            }
        });
    }

    /// Revalidate the session against the backend.
    ///
    /// A lapsed credential clears the session; otherwise this is a no-op
    /// while an identity is loaded. Not a lock: two refreshes that both
    /// start before either finishes will both call the backend, and the last
    /// one to finish wins.
    #[instrument(skip(self))]
    async fn refresh(&self) {
        let inner = &self.inner;

        if !inner.store.is_valid() {
            debug!("No valid credential, clearing session");
            self.apply(None);
            return;
        }

        if inner.state.has_identity() {
            debug!("Identity already loaded, skipping refresh");
            return;
        }

        let epoch = inner.epoch.load(Ordering::SeqCst);
        let result = {
            let _refreshing = InFlight::enter(&inner.refreshing);
            inner.backend.auth_refresh().await
        };

        if self.is_stale(epoch) {
            debug!("Discarding refresh result from before logout");
            // A failed refresh saved nothing.
            if result.is_ok() {
                self.discard_stale_credential(false);
            }
            return;
        }

        match result {
            Ok(identity) if inner.store.is_valid() => {
                info!(user_id = %identity.id, role = %identity.role, "Session refreshed");
                self.apply(Some(identity));
            }
            Ok(_) => {
                warn!("Credential invalidated during refresh, clearing session");
                self.apply(None);
            }
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "Credential rejected, clearing session");
                inner.store.clear();
                self.apply(None);
            }
            Err(e) => {
                // Left for the next credential change or explicit request.
                warn!(error = %e, "Session refresh failed, keeping current state");
                inner.notifier.notify(&SessionEvent::RefreshFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Returns `true` on success. On any failure (rejected credentials,
    /// malformed email, network trouble) the session is left cleared and
    /// `false` is returned. A login overtaken by [`logout`](Self::logout)
    /// also returns `false` and leaves no credential behind.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let inner = &self.inner;
        let credentials = Credentials::new(email, password);
        let epoch = inner.epoch.load(Ordering::SeqCst);
        let _logging_in = InFlight::enter(&inner.logging_in);

        let result = match credentials.validate() {
            Ok(_) => inner.backend.auth_with_password(&credentials).await,
            Err(e) => Err(e),
        };

        if self.is_stale(epoch) {
            debug!("Discarding login result from before logout");
            if result.is_ok() || inner.clear_owed.swap(false, Ordering::SeqCst) {
                self.discard_stale_credential(true);
            }
            return false;
        }

        match result {
            Ok(identity) => {
                info!(user_id = %identity.id, role = %identity.role, "Login succeeded");
                // The fresh token replaced whatever was owed a clear.
                inner.clear_owed.store(false, Ordering::SeqCst);
                self.apply(Some(identity));
                true
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Login failed");
                self.apply(None);
                if inner.clear_owed.swap(false, Ordering::SeqCst) {
                    self.discard_stale_credential(true);
                }
                inner.notifier.notify(&SessionEvent::LoginFailed {
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Undo the token a call from before the last logout left in the store.
    ///
    /// A login that completed since owns the store, so it is left alone; a
    /// login still running settles the clear when it finishes. `own_login`
    /// excludes the calling login from the running count.
    fn discard_stale_credential(&self, own_login: bool) {
        let inner = &self.inner;
        let running = inner.logging_in.load(Ordering::SeqCst) - usize::from(own_login);

        if running > 0 {
            debug!(running, "Login in progress, deferring stale credential clear");
            inner.clear_owed.store(true, Ordering::SeqCst);
        } else if inner.state.has_identity() {
            debug!("Newer login holds the credential, keeping it");
            inner.clear_owed.store(false, Ordering::SeqCst);
        } else {
            inner.clear_owed.store(false, Ordering::SeqCst);
            inner.store.clear();
        }
    }

    /// Sign out.
    ///
    /// Clears the stored credential and the session, abandons any scheduled
    /// or running refresh, then publishes [`SessionEvent::ResetRequested`].
    /// Once this returns no authenticated state is observable.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        let inner = &self.inner;

        inner.epoch.fetch_add(1, Ordering::SeqCst);
        inner.scheduler.cancel_all();
        inner.store.clear();
        self.apply(None);

        info!("Logged out");
        inner.notifier.notify(&SessionEvent::ResetRequested);
    }

    /// Tear the controller down.
    ///
    /// Cancels scheduled and running refreshes, stops listening for
    /// credential changes and drops every observer. Later refresh requests
    /// and initialization are ignored. The session state is left as it was.
    pub fn shutdown(&self) {
        let inner = &self.inner;

        inner.shut_down.store(true, Ordering::SeqCst);
        inner.scheduler.cancel_all();
        lock(&inner.listener).take();
        inner.notifier.clear();
        debug!("Session controller shut down");
    }

    /// Register an observer for session events.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(observer)
    }

    /// Subscribe to snapshot updates.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.watch()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.snapshot()
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<Identity> {
        self.inner.state.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.is_authenticated()
    }

    /// Where the session is in its lifecycle.
    pub fn status(&self) -> SessionStatus {
        if self.inner.state.is_authenticated() {
            SessionStatus::Authenticated
        } else if self.inner.refreshing.load(Ordering::SeqCst) > 0 {
            SessionStatus::Refreshing
        } else {
            SessionStatus::Unauthenticated
        }
    }

    /// Returns true if a debounced refresh is waiting to fire.
    pub fn refresh_pending(&self) -> bool {
        self.inner.scheduler.is_pending()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.inner.epoch.load(Ordering::SeqCst) != epoch
    }

    fn apply(&self, identity: Option<Identity>) {
        let snapshot = self.inner.state.apply(identity);
        self.inner.notifier.notify(&SessionEvent::Changed(snapshot));
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("status", &self.status())
            .field("user", &self.user())
            .field("config", &self.inner.config)
            .finish()
    }
}
