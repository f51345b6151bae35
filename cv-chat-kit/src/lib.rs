//! # Description
//!
//! CV Chat Kit holds the framework-agnostic pieces of the CV chatbot widget:
//! the protocol spoken with the answering service, the controllers that own
//! the widget state, and the render instructions an UI adapter must apply.
//!
//! # Features
//!
//! - Pure state controllers for the transcript and the panel visibility.
//! - Built-in HTTP client for the chat endpoint (`http` feature).
//! - Bilingual string tables with dotted key resolution.
//! - Web support through `wasm-bindgen-futures` (`async-web` feature).
//!
//! Nothing in here touches the DOM. The embedding crate translates
//! [`render::RenderInstruction`]s into real UI changes.

pub mod clients;
pub mod controllers;
pub mod i18n;
pub mod protocol;
pub mod render;
pub mod utils;

pub use clients::*;
pub use i18n::*;
pub use protocol::*;
