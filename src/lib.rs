//! Floating chat widget answering questions about Omar's CV.
//!
//! The widget attaches to elements already present in the host page, speaks
//! German or English following the site-wide language preference, and
//! forwards questions to a remote answering service.
//!
//! Compiled to wasm, the crate mounts itself on page load. See [`app`] for the
//! platform-agnostic part, usable and tested without a browser.

pub mod app;
pub mod data;
pub mod translations;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::ChatWidget;
pub use data::{config::WidgetConfig, preferences::Preferences};
