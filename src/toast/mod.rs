// SPDX-License-Identifier: MPL-2.0
//! Toast notification system.
//!
//! Toasts are transient notifications that enter with a short animation,
//! stay for their duration, then leave with an exit animation before being
//! removed.
//!
//! # Components
//!
//! - [`entity`] - `Toast`, its id and lifecycle flags
//! - [`registry`] - ordered toast collection with snapshot fan-out
//! - [`scheduler`] - deferred, cancellable lifecycle tasks
//! - [`instance`] - `ToastInstance`, the handle used to emit toasts
//! - [`presentation`] - stack rank to transform mapping
//! - [`surface`] - adapter for a mounted rendering surface
//!
//! # Usage
//!
//! ```no_run
//! use toastline::toast::{create_toast_instance, ContentTemplate, ToastOptions, ToastSurface};
//!
//! # async fn demo() -> toastline::error::Result<()> {
//! let toasts = create_toast_instance(
//!     ContentTemplate::computed(|name| format!("Saved {}", name.unwrap_or("file"))),
//!     ToastOptions::default(),
//! )?;
//!
//! // Mount an overlay once
//! let surface = ToastSurface::connect(&toasts);
//!
//! toasts.run(Some("report.pdf"), None);
//!
//! for entry in surface.entries() {
//!     println!("{} at rank {}", entry.toast.content(), entry.rank);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Lifecycle
//!
//! - Opening: 50ms after creation the toast is marked fully visible
//! - Auto-close: after its duration (3s by default, 0 = never)
//! - Removal: 200ms after close, once the exit animation is done

pub mod entity;
pub mod id;
pub mod instance;
pub mod presentation;
pub mod registry;
pub mod scheduler;
pub mod surface;

pub use entity::{CloseHandle, Toast, ToastId, ToastPatch};
pub use id::{IdGenerator, ProcessIds, RandomIds, SequentialIds};
pub use instance::{create_toast_instance, Builder, ContentTemplate, ToastInstance, ToastOptions};
pub use presentation::{Presentation, ENTERING, EXITING};
pub use registry::{Registry, Snapshot, Subscription};
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle, TokioScheduler};
pub use surface::{stack_entries, StackEntry, ToastSurface};
