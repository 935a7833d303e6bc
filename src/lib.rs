// SPDX-License-Identifier: MPL-2.0
//! `toastline` manages toast notifications for UI front-ends.
//!
//! It keeps a registry of live toasts, drives their opening, closing and
//! removal on timers, fans every change out to subscribed rendering
//! surfaces, and maps each toast's stack position to a transform.

#![doc(html_root_url = "https://docs.rs/toastline/0.1.0")]

pub mod config;
pub mod error;
pub mod toast;

#[cfg(test)]
mod test_utils;
