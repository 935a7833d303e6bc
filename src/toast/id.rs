// SPDX-License-Identifier: MPL-2.0
//! Toast id generation.

use super::entity::ToastId;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh toast ids, injected into a toast instance.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ToastId;
}

/// Monotonic counter owned by one generator. Ids are never reused for the
/// life of the generator; share it between instances that share a registry.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> ToastId {
        ToastId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Process-wide counter shared by every instance that does not inject its
/// own generator, so default ids never repeat across instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessIds;

impl IdGenerator for ProcessIds {
    fn next_id(&self) -> ToastId {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        ToastId::new(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Upper bound of the ids drawn by [`RandomIds`].
pub const RANDOM_ID_MAX: u64 = 100_000_000;

/// Draws ids uniformly from `1..=RANDOM_ID_MAX`.
///
/// Collisions are possible and not guarded against; use [`ProcessIds`]
/// when uniqueness matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> ToastId {
        ToastId::new(rand::thread_rng().gen_range(1..=RANDOM_ID_MAX))
    }
}
