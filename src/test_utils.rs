// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and snapshot recording.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_relative_eq;

use crate::toast::{Snapshot, Toast};
use std::sync::{Arc, Mutex};

/// Default epsilon for f32 comparisons.
pub const F32_EPSILON: f32 = 1e-6;

/// Lifecycle flags of one toast as seen by a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seen {
    pub id: u64,
    pub opening: bool,
    pub closing: bool,
}

/// Collects every snapshot delivered to a subscriber.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    snapshots: Arc<Mutex<Vec<Vec<Seen>>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback<C: 'static>(&self) -> impl Fn(&Snapshot<C>) + Send + Sync + 'static {
        let snapshots = Arc::clone(&self.snapshots);
        move |snapshot: &Snapshot<C>| {
            let seen = snapshot
                .iter()
                .map(|t| Seen {
                    id: t.id().value(),
                    opening: t.is_opening(),
                    closing: t.is_closing(),
                })
                .collect();
            snapshots.lock().unwrap().push(seen);
        }
    }

    pub fn count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn ids(&self) -> Vec<Vec<u64>> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.iter().map(|t| t.id).collect())
            .collect()
    }

    pub fn last(&self) -> Option<Vec<Seen>> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

pub fn ids_of<C>(toasts: &[Toast<C>]) -> Vec<u64> {
    toasts.iter().map(|t| t.id().value()).collect()
}
