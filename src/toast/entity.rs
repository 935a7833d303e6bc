// SPDX-License-Identifier: MPL-2.0
//! Core toast data structures.
//!
//! A [`Toast`] is never mutated in place: the registry replaces it with a
//! merged copy built from a [`ToastPatch`].

use std::fmt;
use std::sync::Weak;
use std::time::Duration;

/// Unique identifier for a toast, displayed as `T-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// Something able to close a toast by id, implemented by toast instances.
pub(crate) trait CloseTarget: Send + Sync {
    fn close(&self, id: ToastId, close_duration: Duration);
}

/// Placeholder target for toasts that are not bound to an instance.
struct Detached;

impl CloseTarget for Detached {
    fn close(&self, _id: ToastId, _close_duration: Duration) {}
}

/// The `close` callback bound to a toast at creation time.
///
/// Holds only a weak reference to its instance, so snapshots kept by a
/// rendering surface never extend the instance's lifetime.
#[derive(Clone)]
pub struct CloseHandle {
    id: ToastId,
    close_duration: Duration,
    target: Weak<dyn CloseTarget>,
}

impl CloseHandle {
    pub(crate) fn bound(id: ToastId, close_duration: Duration, target: Weak<dyn CloseTarget>) -> Self {
        Self {
            id,
            close_duration,
            target,
        }
    }

    fn detached(id: ToastId) -> Self {
        let target: Weak<dyn CloseTarget> = Weak::<Detached>::new();
        Self {
            id,
            close_duration: Duration::ZERO,
            target,
        }
    }

    /// Closes the toast with its instance's close-animation duration.
    ///
    /// Does nothing once the owning instance has been dropped.
    pub fn close(&self) {
        if let Some(target) = self.target.upgrade() {
            target.close(self.id, self.close_duration);
        }
    }

    #[must_use]
    pub fn close_duration(&self) -> Duration {
        self.close_duration
    }
}

impl fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseHandle")
            .field("id", &self.id)
            .field("close_duration", &self.close_duration)
            .field("bound", &(self.target.strong_count() > 0))
            .finish()
    }
}

/// A transient notification.
#[derive(Debug, Clone)]
pub struct Toast<C> {
    id: ToastId,
    content: C,
    /// Time-to-live. Zero means the toast never closes on its own.
    duration: Duration,
    is_opening: bool,
    is_closing: bool,
    close: CloseHandle,
}

impl<C> Toast<C> {
    /// Creates a freshly opened toast that is not bound to any instance.
    ///
    /// Its [`close`](Self::close) is a no-op; instances create bound toasts.
    pub fn new(id: ToastId, content: C, duration: Duration) -> Self {
        Self::with_close_handle(content, duration, CloseHandle::detached(id))
    }

    pub(crate) fn with_close_handle(content: C, duration: Duration, close: CloseHandle) -> Self {
        Self {
            id: close.id,
            content,
            duration,
            is_opening: true,
            is_closing: false,
            close,
        }
    }

    #[must_use]
    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True from creation until the open-settle delay elapses.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.is_opening
    }

    /// True from the close request until the toast is purged.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.is_closing
    }

    /// Neither entering nor leaving.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.is_opening && !self.is_closing
    }

    #[must_use]
    pub fn auto_closes(&self) -> bool {
        !self.duration.is_zero()
    }

    /// Requests this toast to close, as a dismiss button would.
    pub fn close(&self) {
        self.close.close();
    }

    pub fn close_handle(&self) -> &CloseHandle {
        &self.close
    }
}

impl<C: Clone> Toast<C> {
    /// Returns a copy with the patch merged in.
    ///
    /// Closing always clears `is_opening` so the two flags are never both set,
    /// and a closing toast can never be reopened.
    #[must_use]
    pub fn patched(&self, patch: ToastPatch) -> Self {
        let mut next = self.clone();
        if let Some(closing) = patch.is_closing {
            next.is_closing = self.is_closing || closing;
        }
        if let Some(opening) = patch.is_opening {
            next.is_opening = opening && !next.is_closing && self.is_opening;
        }
        if next.is_closing {
            next.is_opening = false;
        }
        next
    }
}

/// Partial update of a toast's lifecycle flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToastPatch {
    pub is_opening: Option<bool>,
    pub is_closing: Option<bool>,
}

impl ToastPatch {
    /// Entrance animation finished.
    #[must_use]
    pub const fn settled() -> Self {
        Self {
            is_opening: Some(false),
            is_closing: None,
        }
    }

    /// Exit animation started.
    #[must_use]
    pub const fn closing() -> Self {
        Self {
            is_opening: Some(false),
            is_closing: Some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_displays_with_prefix() {
        assert_eq!(ToastId::new(42).to_string(), "T-42");
    }

    #[test]
    fn new_toast_is_opening() {
        let toast = Toast::new(ToastId::new(1), "saved", Duration::from_millis(3000));
        assert!(toast.is_opening());
        assert!(!toast.is_closing());
        assert!(toast.auto_closes());
    }

    #[test]
    fn settled_patch_clears_opening_only() {
        let toast = Toast::new(ToastId::new(1), (), Duration::ZERO);
        let settled = toast.patched(ToastPatch::settled());
        assert!(settled.is_idle());
        assert!(toast.is_opening(), "original must be untouched");
    }

    #[test]
    fn closing_an_opening_toast_clears_opening() {
        let toast = Toast::new(ToastId::new(1), (), Duration::ZERO);
        let closing = toast.patched(ToastPatch {
            is_opening: None,
            is_closing: Some(true),
        });
        assert!(closing.is_closing());
        assert!(!closing.is_opening());
    }

    #[test]
    fn closing_toast_cannot_reopen() {
        let toast = Toast::new(ToastId::new(1), (), Duration::ZERO).patched(ToastPatch::closing());
        let reopened = toast.patched(ToastPatch {
            is_opening: Some(true),
            is_closing: Some(false),
        });
        assert!(reopened.is_closing());
        assert!(!reopened.is_opening());
    }

    #[test]
    fn settled_toast_cannot_reenter_opening() {
        let toast = Toast::new(ToastId::new(1), (), Duration::ZERO).patched(ToastPatch::settled());
        let again = toast.patched(ToastPatch {
            is_opening: Some(true),
            is_closing: None,
        });
        assert!(!again.is_opening());
    }

    #[test]
    fn detached_close_is_a_no_op() {
        let toast = Toast::new(ToastId::new(7), (), Duration::ZERO);
        toast.close();
        assert!(toast.is_opening());
    }
}
