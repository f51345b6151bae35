//! Internally used to hold utility modules but exposes some very helpful ones.

pub mod asynchronous;

#[cfg(feature = "http")]
pub(crate) mod errors;
