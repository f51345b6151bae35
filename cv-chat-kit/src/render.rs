//! Declarative UI changes produced by the controllers.
//!
//! An adapter for a concrete toolkit implements [`RenderTarget`] and applies
//! the instructions in order. The instructions carry plain text only: bubble
//! text must be written as text content, never parsed as markup.

use std::sync::{Arc, Mutex};

use crate::{
    controllers::chat::{ChatControllerPlugin, ChatState, ChatStateMutation},
    i18n::{Locale, TranslationTable},
    protocol::Sender,
    utils::asynchronous::PlatformSend,
};

/// Element id given to the thinking placeholder so it can be found again.
pub const THINKING_BUBBLE_ID: &str = "thinking-bubble";

#[derive(Clone, Debug, PartialEq)]
pub enum RenderInstruction {
    /// Append one bubble for a new transcript message.
    AppendBubble { from: Sender, text: String },
    /// Append the thinking placeholder. `label` is the accessible text.
    ShowThinking { label: &'static str },
    /// Remove the thinking placeholder.
    RemoveThinking,
    /// Keep the newest bubble visible.
    ScrollToBottom,
    ClearInput,
    FocusInput,
    /// Enable or disable the send control.
    SetSendEnabled(bool),
    /// Re-resolve every tagged string node with the given locale.
    Localize(Locale),
    /// Remove the structural hidden state of the panel (it joins the layout).
    ShowPanel,
    /// Apply the structural hidden state of the panel (it leaves the layout).
    HidePanel,
    /// Apply the visible (`true`) or hidden (`false`) visual state, which the
    /// stylesheet animates.
    SetPanelVisual(bool),
    /// Swap the open/close icons and rotate the toggle control.
    SetToggleOpen(bool),
    /// Call back `frame_ready` on the panel controller after the next frame.
    RequestFrame,
    /// Call back `transition_finished` with `generation` on the panel
    /// controller once the visual transition of the panel ends.
    AwaitTransition { generation: u64 },
}

/// Class lists for a transcript bubble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BubbleStyle {
    /// Classes of the row, which decide the alignment.
    pub row: &'static str,
    /// Classes of the bubble itself.
    pub bubble: &'static str,
}

impl BubbleStyle {
    pub fn for_sender(from: Sender) -> Self {
        match from {
            Sender::User => BubbleStyle {
                row: "flex justify-end",
                bubble: "p-3 max-w-[85%] bg-cyan-600 text-white rounded-l-lg rounded-tr-lg",
            },
            Sender::Bot => BubbleStyle {
                row: "flex justify-start",
                bubble: "p-3 max-w-[85%] bg-slate-100 text-slate-800 rounded-r-lg rounded-tl-lg",
            },
        }
    }

    /// Style of the thinking placeholder, which sits on the bot side.
    pub fn thinking() -> Self {
        BubbleStyle {
            row: "flex justify-start",
            bubble: "bg-slate-100 p-3 rounded-r-lg rounded-tl-lg",
        }
    }
}

/// Something able to apply render instructions, usually bound to real UI.
pub trait RenderTarget: PlatformSend {
    fn render(&mut self, instructions: &[RenderInstruction]);
}

/// Instructions needed to reflect a single chat mutation.
///
/// `state` is the state after the whole batch got applied.
pub fn chat_instructions(
    mutation: &ChatStateMutation,
    state: &ChatState,
    translations: &TranslationTable,
) -> Vec<RenderInstruction> {
    match mutation {
        ChatStateMutation::SetPrompt(_) => vec![],
        ChatStateMutation::ClearPrompt => {
            vec![RenderInstruction::ClearInput, RenderInstruction::FocusInput]
        }
        ChatStateMutation::PushMessage(message) => vec![
            RenderInstruction::AppendBubble {
                from: message.from,
                text: message.text.clone(),
            },
            RenderInstruction::ScrollToBottom,
        ],
        ChatStateMutation::SetWaiting(true) => vec![
            RenderInstruction::SetSendEnabled(false),
            RenderInstruction::ShowThinking {
                label: translations.strings(state.locale).thinking,
            },
            RenderInstruction::ScrollToBottom,
        ],
        ChatStateMutation::SetWaiting(false) => vec![
            RenderInstruction::RemoveThinking,
            RenderInstruction::SetSendEnabled(true),
        ],
        ChatStateMutation::SetLocale(locale) => vec![RenderInstruction::Localize(*locale)],
    }
}

/// Plugin forwarding every chat state change to a [`RenderTarget`].
pub struct RenderPlugin<T> {
    target: Arc<Mutex<T>>,
    translations: &'static TranslationTable,
}

impl<T: RenderTarget> RenderPlugin<T> {
    pub fn new(target: Arc<Mutex<T>>, translations: &'static TranslationTable) -> Self {
        RenderPlugin {
            target,
            translations,
        }
    }
}

impl<T: RenderTarget> ChatControllerPlugin for RenderPlugin<T> {
    fn on_state_ready(&mut self, state: &ChatState, mutations: &[ChatStateMutation]) {
        let instructions: Vec<RenderInstruction> = mutations
            .iter()
            .flat_map(|mutation| chat_instructions(mutation, state, self.translations))
            .collect();

        if instructions.is_empty() {
            return;
        }

        match self.target.lock() {
            Ok(mut target) => target.render(&instructions),
            Err(_) => log::error!("Render target is poisoned, dropping {} instructions", instructions.len()),
        }
    }
}

/// Render target that only records what it was asked to do.
///
/// Used to observe the controllers without any UI.
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    pub instructions: Vec<RenderInstruction>,
}

impl RecordingTarget {
    /// Takes everything recorded so far.
    pub fn take(&mut self) -> Vec<RenderInstruction> {
        std::mem::take(&mut self.instructions)
    }

    /// The bubbles appended so far, in order.
    pub fn bubbles(&self) -> Vec<(Sender, &str)> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                RenderInstruction::AppendBubble { from, text } => Some((*from, text.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, instruction: &RenderInstruction) -> usize {
        self.instructions.iter().filter(|i| *i == instruction).count()
    }
}

impl RenderTarget for RecordingTarget {
    fn render(&mut self, instructions: &[RenderInstruction]) {
        self.instructions.extend_from_slice(instructions);
    }
}
