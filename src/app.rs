//! The widget itself: ties the chat and panel controllers, the preferences
//! and a render target together.
//!
//! Nothing here knows about the DOM, so the whole widget can be driven from
//! tests with a [`RecordingTarget`](cv_chat_kit::render::RecordingTarget).

use std::sync::{Arc, Mutex};

use cv_chat_kit::{
    ChatClient, Locale,
    controllers::{
        chat::{ChatController, ChatStateMutation, ChatTask},
        panel::{PanelController, PanelPhase},
    },
    render::{RenderInstruction, RenderPlugin, RenderTarget},
};

use crate::{data::preferences::Preferences, translations::TRANSLATIONS};

pub struct ChatWidget<T> {
    chat: Arc<Mutex<ChatController>>,
    panel: PanelController,
    preferences: Preferences,
    target: Arc<Mutex<T>>,
}

impl<T: RenderTarget + 'static> ChatWidget<T> {
    /// Builds the widget and renders the initial strings.
    ///
    /// The language comes from `preferences`, which is checked again every
    /// time the panel opens and before every send.
    pub fn new(target: T, preferences: Preferences, client: Box<dyn ChatClient>) -> Self {
        let translations = &TRANSLATIONS;
        let locale = preferences.language();
        let target = Arc::new(Mutex::new(target));

        let chat = ChatController::new_arc(translations, locale);
        if let Ok(mut chat) = chat.lock() {
            chat.set_client(Some(client));
            chat.append_plugin(RenderPlugin::new(target.clone(), translations));
        }

        let widget = ChatWidget {
            chat,
            panel: PanelController::new(),
            preferences,
            target,
        };

        log::info!("Chat widget ready in {locale}");
        widget.render(&[RenderInstruction::Localize(locale)]);
        widget
    }

    pub fn chat(&self) -> &Arc<Mutex<ChatController>> {
        &self.chat
    }

    pub fn target(&self) -> &Arc<Mutex<T>> {
        &self.target
    }

    pub fn locale(&self) -> Locale {
        self.with_chat(|chat| chat.state().locale).unwrap_or_default()
    }

    pub fn is_open(&self) -> bool {
        self.panel.is_open()
    }

    pub fn panel_phase(&self) -> PanelPhase {
        self.panel.phase()
    }

    pub fn toggle(&mut self) {
        if !self.panel.is_open() {
            self.sync_locale();
        }

        let instructions = self.panel.toggle(self.locale());
        self.render(&instructions);
    }

    /// Explicit close control. Does nothing if already closed.
    pub fn close(&mut self) {
        let instructions = self.panel.close();
        self.render(&instructions);
    }

    pub fn frame_ready(&mut self) {
        let instructions = self.panel.frame_ready();
        self.render(&instructions);
    }

    /// Generation of the latest close, for notifications that don't carry one.
    pub fn close_generation(&self) -> u64 {
        self.panel.close_generation()
    }

    pub fn transition_finished(&mut self, generation: u64) {
        let instructions = self.panel.transition_finished(generation);
        self.render(&instructions);
    }

    /// Mirrors the text input.
    pub fn set_prompt(&mut self, prompt: String) {
        self.with_chat(|chat| chat.dispatch_mutation(ChatStateMutation::SetPrompt(prompt)));
    }

    pub fn send(&mut self) {
        self.sync_locale();
        self.with_chat(|chat| chat.dispatch_task(ChatTask::Send));
    }

    /// Locale change notification: persists the choice and refreshes every
    /// string, including the ones of future replies and errors.
    pub fn set_locale(&mut self, locale: Locale) {
        if locale == self.locale() {
            return;
        }

        log::info!("Switching chat widget to {locale}");
        self.preferences.set_language(locale);
        self.with_chat(|chat| chat.dispatch_mutation(locale));
    }

    /// Picks up a language written to the preferences by someone else, like
    /// the language switcher of the host page.
    fn sync_locale(&mut self) {
        let persisted = self.preferences.language();
        if persisted == self.locale() {
            return;
        }

        log::info!("Chat widget following the page language {persisted}");
        self.with_chat(|chat| chat.dispatch_mutation(persisted));
    }

    fn with_chat<R>(&self, f: impl FnOnce(&mut ChatController) -> R) -> Option<R> {
        match self.chat.lock() {
            Ok(mut chat) => Some(f(&mut chat)),
            Err(_) => {
                log::error!("Chat controller is poisoned");
                None
            }
        }
    }

    fn render(&self, instructions: &[RenderInstruction]) {
        if instructions.is_empty() {
            return;
        }

        match self.target.lock() {
            Ok(mut target) => target.render(instructions),
            Err(_) => log::error!("Render target is poisoned"),
        }
    }
}
