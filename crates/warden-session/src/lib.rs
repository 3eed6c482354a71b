//! warden-session - Client-side authentication session controller.
//!
//! A [`SessionController`] keeps the signed-in state of a single user in step
//! with a remote identity backend. It is built from two injected
//! capabilities, a [`CredentialStore`](warden_core::CredentialStore) and an
//! [`AuthBackend`](warden_core::AuthBackend), and exposes a small reactive
//! surface: a [`SessionSnapshot`] of `{ user, is_authenticated }`,
//! [`login`](SessionController::login), [`logout`](SessionController::logout)
//! and observer subscriptions.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden_session::{SessionConfig, SessionController, SessionEvent};
//! # async fn example<A>(adapter: Arc<A>)
//! # where A: warden_core::CredentialStore + warden_core::AuthBackend + 'static {
//! let controller = SessionController::with_adapter(adapter, SessionConfig::default());
//! let _subscription = controller.subscribe(|event| {
//!     if let SessionEvent::Changed(snapshot) = event {
//!         println!("authenticated: {}", snapshot.is_authenticated());
//!     }
//! });
//!
//! controller.initialize().await;
//! if controller.login("alice@example.com", "hunter2").await {
//!     println!("hello {}", controller.user().map(|u| u.id).unwrap_or_default());
//! }
//! # }
//! ```

mod config;
mod controller;
mod notifier;
mod scheduler;
mod state;

pub use config::{DEFAULT_REFRESH_DEBOUNCE, SessionConfig};
pub use controller::SessionController;
pub use notifier::{ChangeNotifier, SessionEvent, Subscription};
pub use scheduler::RefreshScheduler;
pub use state::{SessionSnapshot, SessionState, SessionStatus};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
