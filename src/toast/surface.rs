// SPDX-License-Identifier: MPL-2.0
//! Rendering surface adapter.
//!
//! A [`ToastSurface`] is what a mounted toast overlay holds: it stays
//! connected to one registry, keeps the latest snapshot and lays it out
//! newest first. Drawing the entries is left to the host toolkit.

use super::entity::Toast;
use super::instance::ToastInstance;
use super::presentation::Presentation;
use super::registry::{Registry, Snapshot, Subscription};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One toast as it should be drawn.
#[derive(Debug, Clone)]
pub struct StackEntry<C> {
    pub toast: Toast<C>,
    /// Position from the newest toast (0 = front).
    pub rank: usize,
    /// Higher is drawn on top.
    pub z_index: usize,
    pub presentation: Presentation,
}

/// Lays a snapshot out newest first.
pub fn stack_entries<C: Clone>(toasts: &[Toast<C>]) -> Vec<StackEntry<C>> {
    let len = toasts.len();
    toasts
        .iter()
        .rev()
        .enumerate()
        .map(|(rank, toast)| StackEntry {
            toast: toast.clone(),
            rank,
            z_index: len - rank,
            presentation: Presentation::for_toast(toast, rank),
        })
        .collect()
}

struct Latest<C> {
    snapshot: Snapshot<C>,
    dirty: bool,
}

/// A mounted overlay connected to a toast registry.
pub struct ToastSurface<C> {
    latest: Arc<Mutex<Latest<C>>>,
    subscription: Subscription<C>,
}

impl<C> ToastSurface<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Mounts on an instance's registry.
    pub fn connect(instance: &ToastInstance<C>) -> Self {
        Self::attach(instance.registry())
    }

    pub fn attach(registry: &Registry<C>) -> Self {
        let latest = Arc::new(Mutex::new(Latest {
            snapshot: registry.snapshot(),
            dirty: true,
        }));
        let sink = Arc::clone(&latest);
        let subscription = registry.subscribe(move |snapshot: &Snapshot<C>| {
            let mut latest = sink.lock().unwrap_or_else(PoisonError::into_inner);
            latest.snapshot = Arc::clone(snapshot);
            latest.dirty = true;
        });
        Self {
            latest,
            subscription,
        }
    }

    fn latest(&self) -> MutexGuard<'_, Latest<C>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest snapshot received, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<C> {
        Arc::clone(&self.latest().snapshot)
    }

    /// Entries to draw, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<StackEntry<C>> {
        stack_entries(&self.snapshot())
    }

    /// Returns true once per change since the last call.
    pub fn take_dirty(&self) -> bool {
        std::mem::replace(&mut self.latest().dirty, false)
    }

    /// Unmounts. The last snapshot stays readable.
    pub fn disconnect(&self) {
        self.subscription.unsubscribe();
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.subscription.is_active()
    }
}

impl<C> Drop for ToastSurface<C> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
