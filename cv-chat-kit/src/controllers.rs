//! Framework-agnostic state management for the widget.
//!
//! Controllers never touch the UI directly. They emit render instructions
//! (see [`crate::render`]) that an adapter applies to the real toolkit.

pub mod chat;
pub mod panel;
