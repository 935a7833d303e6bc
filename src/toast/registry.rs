// SPDX-License-Identifier: MPL-2.0
//! Ordered collection of live toasts with snapshot fan-out.
//!
//! Every write builds a new [`Snapshot`] and swaps it in, then hands the full
//! snapshot to every subscriber in subscription order. Subscribers run
//! outside the lock and may write to the registry themselves: such writes
//! are queued behind the pass in progress, which then repeats with the
//! newest snapshot.

use super::entity::{Toast, ToastId, ToastPatch};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Immutable view of the registry at one point in time, oldest first.
pub type Snapshot<C> = Arc<[Toast<C>]>;

type Callback<C> = Arc<dyn Fn(&Snapshot<C>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubscriptionId(u64);

struct State<C> {
    toasts: Snapshot<C>,
    subscribers: Arc<[(SubscriptionId, Callback<C>)]>,
    next_subscription: u64,
    /// A fan-out pass is running.
    notifying: bool,
    /// A write landed during the running pass.
    pending: bool,
}

struct Inner<C> {
    state: Mutex<State<C>>,
}

impl<C> Inner<C> {
    fn lock(&self) -> MutexGuard<'_, State<C>> {
        // Subscribers never run under the lock, so a poisoned lock still
        // holds a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle to a toast collection. Clones refer to the same collection.
pub struct Registry<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Registry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Registry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    toasts: Vec::new().into(),
                    subscribers: Vec::new().into(),
                    next_subscription: 0,
                    notifying: false,
                    pending: false,
                }),
            }),
        }
    }

    /// Current snapshot, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<C> {
        Arc::clone(&self.inner.lock().toasts)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Returns true if both handles refer to the same collection.
    #[must_use]
    pub fn same_registry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers a subscriber and immediately delivers the current snapshot.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<C>
    where
        F: Fn(&Snapshot<C>) + Send + Sync + 'static,
    {
        let callback: Callback<C> = Arc::new(callback);
        let (id, snapshot) = {
            let mut state = self.inner.lock();
            let id = SubscriptionId(state.next_subscription);
            state.next_subscription += 1;
            let mut subscribers = state.subscribers.to_vec();
            subscribers.push((id, Arc::clone(&callback)));
            state.subscribers = subscribers.into();
            (id, Arc::clone(&state.toasts))
        };
        deliver(id, &callback, &snapshot);
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Runs fan-out passes until no write is pending.
    fn publish(&self) {
        {
            let mut state = self.inner.lock();
            if state.notifying {
                state.pending = true;
                return;
            }
            state.notifying = true;
        }
        loop {
            let (snapshot, subscribers) = {
                let mut state = self.inner.lock();
                state.pending = false;
                (Arc::clone(&state.toasts), Arc::clone(&state.subscribers))
            };
            for (id, callback) in subscribers.iter() {
                deliver(*id, callback, &snapshot);
            }
            let mut state = self.inner.lock();
            if !state.pending {
                state.notifying = false;
                break;
            }
        }
    }
}

impl<C: Clone> Registry<C> {
    /// Returns a copy of the toast with this id, if it is live.
    #[must_use]
    pub fn get(&self, id: ToastId) -> Option<Toast<C>> {
        self.inner.lock().toasts.iter().find(|t| t.id() == id).cloned()
    }

    /// Appends a toast.
    pub fn insert(&self, toast: Toast<C>) {
        self.write(|toasts| {
            let mut next = toasts.to_vec();
            next.push(toast);
            next
        });
    }

    /// Replaces the toast with a merged copy. An absent id leaves the
    /// collection unchanged but still notifies subscribers.
    pub fn update(&self, id: ToastId, patch: ToastPatch) {
        self.write(|toasts| {
            toasts
                .iter()
                .map(|t| if t.id() == id { t.patched(patch) } else { t.clone() })
                .collect()
        });
    }

    /// Applies the patch chosen by `decide` for the toast, atomically.
    ///
    /// Subscribers are only notified when `decide` returns a patch. Returns
    /// whether the toast was found and patched.
    pub fn update_if<F>(&self, id: ToastId, decide: F) -> bool
    where
        F: FnOnce(&Toast<C>) -> Option<ToastPatch>,
    {
        let applied = {
            let mut state = self.inner.lock();
            let Some(pos) = state.toasts.iter().position(|t| t.id() == id) else {
                return false;
            };
            match decide(&state.toasts[pos]) {
                Some(patch) => {
                    let mut next = state.toasts.to_vec();
                    next[pos] = next[pos].patched(patch);
                    state.toasts = next.into();
                    true
                }
                None => false,
            }
        };
        if applied {
            self.publish();
        }
        applied
    }

    /// Removes the toast. Removing an absent id is a no-op that still
    /// notifies subscribers.
    pub fn remove(&self, id: ToastId) {
        self.write(|toasts| toasts.iter().filter(|t| t.id() != id).cloned().collect());
    }

    /// Removes every toast in a single write.
    pub fn clear(&self) {
        self.write(|_| Vec::new());
    }

    fn write<F>(&self, build: F)
    where
        F: FnOnce(&[Toast<C>]) -> Vec<Toast<C>>,
    {
        {
            let mut state = self.inner.lock();
            let next = build(&state.toasts);
            state.toasts = next.into();
        }
        self.publish();
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Registry")
            .field("toasts", &state.toasts.len())
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

/// Calls one subscriber, isolating a panic so the others still get notified.
fn deliver<C>(id: SubscriptionId, callback: &Callback<C>, snapshot: &Snapshot<C>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::warn!(subscription = id.0, %reason, "toast subscriber panicked");
    }
}

/// Handle returned by [`Registry::subscribe`].
///
/// Dropping it keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to disconnect.
pub struct Subscription<C> {
    id: SubscriptionId,
    registry: Weak<Inner<C>>,
}

impl<C> Subscription<C> {
    /// Disconnects the subscriber. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let mut state = inner.lock();
        if state.subscribers.iter().any(|(id, _)| *id == self.id) {
            let remaining: Vec<_> = state
                .subscribers
                .iter()
                .filter(|(id, _)| *id != self.id)
                .cloned()
                .collect();
            state.subscribers = remaining.into();
        }
    }

    /// Returns true while the subscriber is registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.lock().subscribers.iter().any(|(id, _)| *id == self.id))
    }
}

impl<C> fmt::Debug for Subscription<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id.0).finish()
    }
}
