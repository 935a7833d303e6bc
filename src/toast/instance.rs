// SPDX-License-Identifier: MPL-2.0
//! Toast instances: the handle callers use to emit and close toasts.
//!
//! An instance owns a content template, default options and a registry.
//! Two instances never share toasts unless they are built on the same
//! [`Registry`] explicitly.

use super::entity::{CloseHandle, CloseTarget, Toast, ToastId, ToastPatch};
use super::id::{IdGenerator, ProcessIds};
use super::registry::{Registry, Snapshot, Subscription};
use super::scheduler::{Scheduler, TaskHandle, TokioScheduler};
use crate::config::Timings;
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Produces the payload of each toast.
pub enum ContentTemplate<C> {
    /// Every toast gets a clone of this value.
    Fixed(C),
    /// Computed from the optional input string passed to `run`.
    Computed(Arc<dyn Fn(Option<&str>) -> C + Send + Sync>),
}

impl<C> ContentTemplate<C> {
    pub fn computed<F>(render: F) -> Self
    where
        F: Fn(Option<&str>) -> C + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(render))
    }
}

impl<C: Clone> ContentTemplate<C> {
    fn render(&self, input: Option<&str>) -> C {
        match self {
            Self::Fixed(content) => content.clone(),
            Self::Computed(render) => render(input),
        }
    }
}

impl<C: Default> Default for ContentTemplate<C> {
    fn default() -> Self {
        Self::Fixed(C::default())
    }
}

impl<C: fmt::Debug> fmt::Debug for ContentTemplate<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(content) => f.debug_tuple("Fixed").field(content).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Per-instance defaults and per-call overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToastOptions {
    /// Time-to-live; zero keeps the toast until it is closed.
    pub duration: Option<Duration>,
}

impl ToastOptions {
    #[must_use]
    pub const fn duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
        }
    }

    #[must_use]
    pub const fn duration_ms(ms: u64) -> Self {
        Self::duration(Duration::from_millis(ms))
    }

    /// Toasts that never close on their own.
    #[must_use]
    pub const fn persistent() -> Self {
        Self::duration(Duration::ZERO)
    }
}

struct Shared<C> {
    me: Weak<Shared<C>>,
    registry: Registry<C>,
    template: ContentTemplate<C>,
    options: ToastOptions,
    timings: Timings,
    scheduler: Arc<dyn Scheduler>,
    ids: Arc<dyn IdGenerator>,
    /// Pending lifecycle tasks per live toast.
    timers: Mutex<HashMap<ToastId, Vec<TaskHandle>>>,
}

impl<C> Shared<C> {
    fn timers(&self) -> MutexGuard<'_, HashMap<ToastId, Vec<TaskHandle>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_timers(&self, id: ToastId) {
        let handles = self.timers().remove(&id);
        for handle in handles.into_iter().flatten() {
            handle.cancel();
        }
    }

    /// Drops the tasks of toasts that left the registry some other way:
    /// an external `clear`/`remove`, or another instance sharing it.
    fn prune(&self) {
        let snapshot = self.registry.snapshot();
        let live: HashSet<ToastId> = snapshot.iter().map(Toast::id).collect();
        let mut timers = self.timers();
        timers.retain(|id, handles| {
            let keep = live.contains(id);
            if !keep {
                for handle in handles.iter() {
                    handle.cancel();
                }
            }
            keep
        });
    }
}

impl<C> Shared<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn run(&self, input: Option<&str>, runtime: Option<ToastOptions>) -> ToastId {
        let id = self.ids.next_id();
        let duration = runtime
            .and_then(|o| o.duration)
            .or(self.options.duration)
            .unwrap_or(self.timings.default_duration);
        let content = self.template.render(input);

        let target: Weak<dyn CloseTarget> = self.me.clone();
        let close = CloseHandle::bound(id, self.timings.close_duration, target);
        self.registry
            .insert(Toast::with_close_handle(content, duration, close));
        tracing::debug!(toast = %id, ?duration, "toast opened");

        let mut handles = Vec::with_capacity(2);
        let me = self.me.clone();
        handles.push(self.scheduler.schedule(
            self.timings.open_settle,
            Box::new(move || {
                if let Some(shared) = me.upgrade() {
                    if shared.registry.get(id).is_some() {
                        shared.registry.update(id, ToastPatch::settled());
                    } else {
                        shared.cancel_timers(id);
                    }
                }
            }),
        ));
        if !duration.is_zero() {
            let me = self.me.clone();
            let close_duration = self.timings.close_duration;
            handles.push(self.scheduler.schedule(
                duration,
                Box::new(move || {
                    if let Some(shared) = me.upgrade() {
                        shared.close_toast(id, close_duration);
                    }
                }),
            ));
        }
        self.track(id, handles);
        id
    }

    /// Keeps the handles of a toast that is still live and not closing;
    /// a subscriber may already have closed it while it was being inserted.
    fn track(&self, id: ToastId, handles: Vec<TaskHandle>) {
        self.prune();
        let mut timers = self.timers();
        if self.registry.get(id).is_some_and(|t| !t.is_closing()) {
            timers.entry(id).or_default().extend(handles);
        } else {
            for handle in handles {
                handle.cancel();
            }
        }
    }

    fn close_toast(&self, id: ToastId, close_duration: Duration) {
        let started = self
            .registry
            .update_if(id, |t| (!t.is_closing()).then_some(ToastPatch::closing()));
        if !started {
            if self.registry.get(id).is_none() {
                self.cancel_timers(id);
            }
            return;
        }
        self.cancel_timers(id);
        tracing::debug!(toast = %id, ?close_duration, "toast closing");

        let me = self.me.clone();
        let removal = self.scheduler.schedule(
            close_duration,
            Box::new(move || {
                if let Some(shared) = me.upgrade() {
                    shared.registry.remove(id);
                    shared.timers().remove(&id);
                    tracing::debug!(toast = %id, "toast removed");
                }
            }),
        );
        let mut timers = self.timers();
        if self.registry.get(id).is_some() {
            timers.entry(id).or_default().push(removal);
        }
    }
}

impl<C> CloseTarget for Shared<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn close(&self, id: ToastId, close_duration: Duration) {
        self.close_toast(id, close_duration);
    }
}

impl<C> Drop for Shared<C> {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in timers.drain().flat_map(|(_, handles)| handles) {
            handle.cancel();
        }
    }
}

/// Emits toasts into its registry and schedules their lifecycle.
///
/// Clones are handles to the same instance.
pub struct ToastInstance<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for ToastInstance<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Creates an instance with its own registry, scheduled on the current
/// tokio runtime.
pub fn create_toast_instance<C>(
    template: ContentTemplate<C>,
    options: ToastOptions,
) -> Result<ToastInstance<C>>
where
    C: Clone + Send + Sync + 'static,
{
    ToastInstance::builder(template).options(options).build()
}

impl<C> ToastInstance<C>
where
    C: Clone + Send + Sync + 'static,
{
    pub fn builder(template: ContentTemplate<C>) -> Builder<C> {
        Builder {
            template,
            options: ToastOptions::default(),
            timings: Timings::default(),
            scheduler: None,
            ids: None,
            registry: None,
        }
    }

    /// Emits a new toast and returns its id.
    ///
    /// `input` feeds a computed template; `options` override the instance
    /// defaults for this toast only.
    pub fn run(&self, input: Option<&str>, options: Option<ToastOptions>) -> ToastId {
        self.shared.run(input, options)
    }

    /// Starts closing a toast, removing it once `close_duration` has passed.
    ///
    /// Closing a toast that is already closing, or gone, does nothing.
    pub fn close(&self, id: ToastId, close_duration: Duration) {
        self.shared.close_toast(id, close_duration);
    }

    /// Closes every live toast with the instance's close duration.
    pub fn close_all(&self) {
        let close_duration = self.shared.timings.close_duration;
        for toast in self.shared.registry.snapshot().iter() {
            self.shared.close_toast(toast.id(), close_duration);
        }
    }

    /// Subscribes a rendering surface. The current snapshot is delivered
    /// immediately.
    pub fn connect<F>(&self, callback: F) -> Subscription<C>
    where
        F: Fn(&Snapshot<C>) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(callback)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<C> {
        self.shared.registry.snapshot()
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.shared.registry
    }

    #[must_use]
    pub fn timings(&self) -> Timings {
        self.shared.timings
    }

    /// Number of toasts with lifecycle tasks still pending.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.shared.prune();
        self.shared.timers().len()
    }
}

impl<C> fmt::Debug for ToastInstance<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastInstance")
            .field("registry", &self.shared.registry)
            .field("options", &self.shared.options)
            .field("timings", &self.shared.timings)
            .finish()
    }
}

/// Configures a [`ToastInstance`].
pub struct Builder<C> {
    template: ContentTemplate<C>,
    options: ToastOptions,
    timings: Timings,
    scheduler: Option<Arc<dyn Scheduler>>,
    ids: Option<Arc<dyn IdGenerator>>,
    registry: Option<Registry<C>>,
}

impl<C> Builder<C>
where
    C: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Defaults to a [`TokioScheduler`] on the current runtime.
    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Defaults to [`ProcessIds`].
    #[must_use]
    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Emits into an existing registry, connecting this instance with every
    /// other instance built on it.
    #[must_use]
    pub fn registry(mut self, registry: Registry<C>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Fails only when no scheduler was given and no tokio runtime is running.
    pub fn build(self) -> Result<ToastInstance<C>> {
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::current()?),
        };
        let ids = self.ids.unwrap_or_else(|| Arc::new(ProcessIds));
        let registry = self.registry.unwrap_or_default();
        let shared = Arc::new_cyclic(|me| Shared {
            me: me.clone(),
            registry,
            template: self.template,
            options: self.options,
            timings: self.timings,
            scheduler,
            ids,
            timers: Mutex::new(HashMap::new()),
        });
        Ok(ToastInstance { shared })
    }
}
