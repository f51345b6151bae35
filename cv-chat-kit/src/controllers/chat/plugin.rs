use super::{state::*, task::*};
use crate::utils::asynchronous::PlatformSend;
use std::sync::atomic::{AtomicU64, Ordering};

/// Controls if remaining callbacks and default behavior should be executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatControl {
    Continue,
    Stop,
}

/// Allows to hook between dispatched events of any kind.
///
/// It's the fundamental building block for binding [`ChatController`](super::ChatController)
/// to a view and for observing it in tests.
///
/// Note: While a method of a plugin is running, the controller is locked, so a
/// plugin must never try to dispatch back into it synchronously.
pub trait ChatControllerPlugin: PlatformSend {
    /// Called when a new FULL state is READY to be presented.
    ///
    /// This is called after ALL mutations given to [`dispatch_mutations`](super::ChatController::dispatch_mutations)
    /// have been applied, with the list of those mutations.
    fn on_state_ready(&mut self, _state: &ChatState, _mutations: &[ChatStateMutation]) {}

    /// Called right before a task is going to be executed.
    ///
    /// You can cancel it to handle the behavior yourself.
    fn on_task(&mut self, _task: &ChatTask) -> ChatControl {
        ChatControl::Continue
    }

    /// Called for every INDIVIDUAL mutation, with the state as it was before
    /// the mutation got applied.
    fn on_state_mutation(&mut self, _mutation: &ChatStateMutation, _state: &ChatState) {}
}

/// Unique identifier for a registered plugin. Can be used to unregister it later.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChatControllerPluginRegistrationId(u64);

impl ChatControllerPluginRegistrationId {
    pub(super) fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(id)
    }
}
