// SPDX-License-Identifier: MPL-2.0
//! Deferred, cancellable tasks driving toast lifecycle transitions.
//!
//! Two implementations are provided:
//!
//! - [`TokioScheduler`] runs tasks on a tokio runtime against system time
//! - [`ManualScheduler`] keeps a virtual clock that only moves on
//!   [`advance`](ManualScheduler::advance), for hosts that drive time from
//!   their own tick and for deterministic tests

use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

/// Cancels a scheduled task. Clones control the same task.
#[derive(Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<tokio::task::AbortHandle>,
}

impl TaskHandle {
    fn new(cancelled: Arc<AtomicBool>, abort: Option<tokio::task::AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Prevents the task from running if it has not started yet.
    /// Cancelling twice is a no-op.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Spawns each task on a tokio runtime behind a `tokio::time::sleep`.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Binds to the runtime of the calling context.
    pub fn current() -> Result<Self> {
        Ok(Self::new(tokio::runtime::Handle::try_current()?))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::Acquire) {
                task();
            }
        });
        TaskHandle::new(cancelled, Some(join.abort_handle()))
    }
}

struct Pending {
    task: Task,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    sequence: u64,
    /// Keyed by deadline, then scheduling order.
    queue: BTreeMap<(Duration, u64), Pending>,
}

/// Virtual-time scheduler. Nothing runs until the clock is advanced.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time elapsed on the virtual clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks still waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .values()
            .filter(|p| !p.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Moves the clock forward, running every task that falls due in
    /// deadline order. Tasks scheduled by those tasks run too if they fall
    /// inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now().saturating_add(by);
        loop {
            let next = {
                let mut state = self.lock();
                let due = state
                    .queue
                    .first_key_value()
                    .map(|(&(deadline, _), _)| deadline)
                    .filter(|deadline| *deadline <= target);
                match due {
                    Some(deadline) => {
                        state.now = deadline;
                        state.queue.pop_first().map(|(_, pending)| pending)
                    }
                    None => None,
                }
            };
            let Some(pending) = next else { break };
            if !pending.cancelled.load(Ordering::Acquire) {
                (pending.task)();
            }
        }
        self.lock().now = target;
    }

    /// Advances by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.lock();
        let key = (state.now.saturating_add(delay), state.sequence);
        state.sequence += 1;
        state.queue.insert(
            key,
            Pending {
                task,
                cancelled: Arc::clone(&cancelled),
            },
        );
        TaskHandle::new(cancelled, None)
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("queued", &state.queue.len())
            .finish()
    }
}
