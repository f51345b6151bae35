//! Runs chat exchanges in the background on both targets the widget ships to.
//!
//! In the browser, `reqwest` futures hold `JsValue`s and can't be `Send`, and
//! neither can anything touching the DOM. Natively (tests, tools) the exchange
//! runs on tokio, which wants `Send`. The aliases below only ask for `Send`
//! where it exists.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::future::Future;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub trait PlatformSendInner {}
        impl<T> PlatformSendInner for T {}
    } else {
        pub trait PlatformSendInner: Send {}
        impl<T> PlatformSendInner for T where T: Send {}
    }
}

/// `Send` natively, no bound at all in the browser.
///
/// Clients, plugins, render targets and preference stores are bound by this,
/// so DOM-backed implementations are accepted on wasm.
pub trait PlatformSend: PlatformSendInner {}
impl<T> PlatformSend for T where T: PlatformSendInner {}

/// Future bound by [`PlatformSend`].
pub trait PlatformSendFuture: Future + PlatformSend {}
impl<F, O> PlatformSendFuture for F where F: Future<Output = O> + PlatformSend {}

/// Detaches `fut`, which must report back on its own (the chat controller
/// goes through its weak accessor).
///
/// Natively the current tokio runtime is used when there is one. Otherwise a
/// shared runtime is started on first use.
pub fn spawn(fut: impl PlatformSendFuture<Output = ()> + 'static) {
    spawn_impl(fut);
}

#[cfg(feature = "async-rt")]
#[cfg(not(target_arch = "wasm32"))]
fn spawn_impl(fut: impl Future<Output = ()> + 'static + Send) {
    use std::sync::OnceLock;
    use tokio::runtime::{Builder, Handle, Runtime};

    static FALLBACK: OnceLock<Option<Runtime>> = OnceLock::new();

    if let Ok(handle) = Handle::try_current() {
        handle.spawn(fut);
        return;
    }

    let fallback = FALLBACK.get_or_init(|| {
        log::warn!("Starting a shared tokio runtime for chat exchanges");
        Builder::new_multi_thread()
            .enable_io()
            .enable_time()
            .thread_name("cv-chat-kit-tokio")
            .build()
            .inspect_err(|error| log::error!("Could not start a tokio runtime: {error}"))
            .ok()
    });

    match fallback {
        Some(runtime) => {
            runtime.spawn(fut);
        }
        None => log::error!("No runtime available, dropping a background task"),
    }
}

#[cfg(feature = "async-web")]
#[cfg(target_arch = "wasm32")]
fn spawn_impl(fut: impl Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(fut);
}

/// Boxed future returned by [`ChatClient::send`](crate::protocol::ChatClient::send).
///
/// Build one with [`chat_future`].
pub struct ChatFuture<'a, T>(Pin<Box<dyn PlatformSendFuture<Output = T> + 'a>>);

impl<'a, T> Future for ChatFuture<'a, T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

pub fn chat_future<'a, T>(future: impl PlatformSendFuture<Output = T> + 'a) -> ChatFuture<'a, T> {
    ChatFuture(Box::pin(future))
}
