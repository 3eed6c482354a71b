//! Observer registry for session events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::trace;

use crate::lock;
use crate::state::SessionSnapshot;

/// Something observers may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session state was replaced.
    Changed(SessionSnapshot),
    /// A background refresh failed for a transient reason; state is unchanged.
    RefreshFailed { reason: String },
    /// A login attempt failed; state has been cleared.
    LoginFailed { reason: String },
    /// The user logged out; the application should return to its
    /// unauthenticated entry point.
    ResetRequested,
}

type Observer = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct NotifierInner {
    observers: Mutex<Vec<(u64, Observer)>>,
    next_id: AtomicU64,
}

impl NotifierInner {
    fn remove(&self, id: u64) {
        lock(&self.observers).retain(|(observer_id, _)| *observer_id != id);
    }

    fn is_registered(&self, id: u64) -> bool {
        lock(&self.observers)
            .iter()
            .any(|(observer_id, _)| *observer_id == id)
    }
}

/// Delivers [`SessionEvent`]s to registered observers.
///
/// Cheap to clone; clones share the same observer list.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<NotifierInner>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped or [`unsubscribe`](Subscription::unsubscribe)d.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.observers).push((id, Arc::new(observer)));
        trace!(id, "observer subscribed");

        Subscription {
            id,
            notifier: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every observer registered right now.
    ///
    /// Observers are called outside the registry lock, so they may subscribe
    /// or unsubscribe from inside the callback. An observer removed while a
    /// dispatch is under way is skipped.
    pub(crate) fn notify(&self, event: &SessionEvent) {
        let observers: Vec<(u64, Observer)> = lock(&self.inner.observers).clone();

        for (id, observer) in observers {
            if self.inner.is_registered(id) {
                observer(event);
            }
        }
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }

    /// Drop every observer.
    pub(crate) fn clear(&self) {
        lock(&self.inner.observers).clear();
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Registration handle returned by [`ChangeNotifier::subscribe`].
///
/// Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    id: u64,
    notifier: Weak<NotifierInner>,
}

impl Subscription {
    /// Stop receiving events.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.notifier.upgrade() {
            inner.remove(self.id);
            trace!(id = self.id, "observer unsubscribed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
