//! Framework-agnostic state management of the chat transcript and the
//! exchange with the chat endpoint.

mod plugin;
mod state;
mod task;

pub use plugin::*;
pub use state::*;
pub use task::*;

use std::sync::{Arc, Mutex, Weak};

use crate::{
    i18n::{Locale, TranslationTable},
    protocol::*,
    utils::asynchronous::spawn,
};

/// Owns the [`ChatState`] and is the only place allowed to change it.
///
/// Always shared as `Arc<Mutex<ChatController>>` (see [`ChatController::new_arc`])
/// so replies arriving in the background can find their way back.
pub struct ChatController {
    state: ChatState,
    translations: &'static TranslationTable,
    client: Option<Box<dyn ChatClient>>,
    plugins: Vec<(ChatControllerPluginRegistrationId, Box<dyn ChatControllerPlugin>)>,
    accessor: Weak<Mutex<ChatController>>,
}

impl ChatController {
    pub fn new_arc(translations: &'static TranslationTable, locale: Locale) -> Arc<Mutex<Self>> {
        Arc::new_cyclic(|accessor| {
            Mutex::new(ChatController {
                state: ChatState::new(locale),
                translations,
                client: None,
                plugins: Vec::new(),
                accessor: accessor.clone(),
            })
        })
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn translations(&self) -> &'static TranslationTable {
        self.translations
    }

    pub fn set_client(&mut self, client: Option<Box<dyn ChatClient>>) {
        self.client = client;
    }

    pub fn append_plugin<P>(&mut self, plugin: P) -> ChatControllerPluginRegistrationId
    where
        P: ChatControllerPlugin + 'static,
    {
        let id = ChatControllerPluginRegistrationId::new();
        self.plugins.push((id, Box::new(plugin)));
        id
    }

    pub fn remove_plugin(&mut self, id: ChatControllerPluginRegistrationId) {
        self.plugins.retain(|(plugin_id, _)| *plugin_id != id);
    }

    pub fn dispatch_mutation(&mut self, mutation: impl Into<ChatStateMutation>) {
        self.dispatch_mutations(vec![mutation.into()]);
    }

    /// Applies a batch of mutations, then notifies plugins once with the final
    /// state.
    pub fn dispatch_mutations(&mut self, mutations: Vec<ChatStateMutation>) {
        for mutation in &mutations {
            for (_, plugin) in &mut self.plugins {
                plugin.on_state_mutation(mutation, &self.state);
            }
            mutation.clone().apply(&mut self.state);
        }

        for (_, plugin) in &mut self.plugins {
            plugin.on_state_ready(&self.state, &mutations);
        }
    }

    pub fn dispatch_task(&mut self, task: ChatTask) {
        for (_, plugin) in &mut self.plugins {
            if plugin.on_task(&task) == ChatControl::Stop {
                return;
            }
        }

        self.perform_task(task);
    }

    /// Executes a task without giving plugins the chance to stop it.
    pub fn perform_task(&mut self, task: ChatTask) {
        match task {
            ChatTask::Send => self.handle_send_task(),
        }
    }

    fn handle_send_task(&mut self) {
        let Some(exchange) = self.start_exchange() else {
            return;
        };

        let accessor = self.accessor.clone();
        spawn(async move {
            let result = exchange.await;

            let Some(controller) = accessor.upgrade() else {
                log::debug!("Chat controller dropped before the reply arrived");
                return;
            };

            let Ok(mut controller) = controller.lock() else {
                log::error!("Chat controller is poisoned, dropping the reply");
                return;
            };

            controller.finish_exchange(result);
        });
    }

    /// First half of a send: records the visitor message, shows the
    /// placeholder and returns the pending request.
    ///
    /// Returns `None` without touching the state when the prompt is blank or
    /// while a previous reply is still awaited. The prompt is kept in the
    /// latter case so it can be sent later.
    ///
    /// Whoever gets the future must feed its output to [`ChatController::finish_exchange`].
    pub fn start_exchange(&mut self) -> Option<ChatFuture<'static, ClientResult<ChatReply>>> {
        if self.state.is_waiting {
            log::debug!("Ignoring send while a reply is still awaited");
            return None;
        }

        let text = self.state.sendable_prompt()?.to_string();
        let request = ChatRequest {
            message: text.clone(),
            language: self.state.locale,
        };

        self.dispatch_mutations(vec![
            Message::user(text).into(),
            ChatStateMutation::ClearPrompt,
            ChatStateMutation::SetWaiting(true),
        ]);

        log::debug!("Sending message in {}", request.language);

        match self.client.as_mut() {
            Some(client) => Some(client.send(&request)),
            None => {
                self.finish_exchange(Err(ClientError::new(
                    ClientErrorKind::Unknown,
                    "No chat client is configured.".into(),
                )));
                None
            }
        }
    }

    /// Second half of a send: removes the placeholder and shows either the
    /// reply or the localized error message.
    ///
    /// Does nothing if no reply is awaited, so the placeholder is never
    /// removed twice.
    pub fn finish_exchange(&mut self, result: ClientResult<ChatReply>) {
        if !self.state.is_waiting {
            log::warn!("Got a reply while none was awaited, ignoring it");
            return;
        }

        let text = match result {
            Ok(reply) => {
                log::debug!("Received reply of {} bytes", reply.text.len());
                reply.text
            }
            Err(error) => {
                match std::error::Error::source(&error) {
                    Some(source) => log::error!("Error sending message to chatbot backend: {error} ({source})"),
                    None => log::error!("Error sending message to chatbot backend: {error}"),
                }
                self.translations.strings(self.state.locale).error.to_string()
            }
        };

        self.dispatch_mutations(vec![
            ChatStateMutation::SetWaiting(false),
            Message::bot(text).into(),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        i18n::TEST_TABLE,
        render::{RecordingTarget, RenderInstruction, RenderPlugin},
    };
    use std::collections::VecDeque;

    /// Answers with canned results, in order, and remembers every request.
    #[derive(Clone, Default)]
    struct ScriptedClient {
        replies: Arc<Mutex<VecDeque<ClientResult<ChatReply>>>>,
        requests: Arc<Mutex<Vec<ChatRequest>>>,
    }

    impl ScriptedClient {
        fn with(replies: Vec<ClientResult<ChatReply>>) -> Self {
            ScriptedClient {
                replies: Arc::new(Mutex::new(replies.into())),
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ChatClient for ScriptedClient {
        fn send(&mut self, request: &ChatRequest) -> ChatFuture<'static, ClientResult<ChatReply>> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left");
            chat_future(futures::future::ready(reply))
        }

        fn clone_box(&self) -> Box<dyn ChatClient> {
            Box::new(self.clone())
        }
    }

    fn ok(text: &str) -> ClientResult<ChatReply> {
        Ok(ChatReply { text: text.into() })
    }

    fn server_error() -> ClientResult<ChatReply> {
        Err(ClientError::new(ClientErrorKind::Response, "HTTP 500".into()))
    }

    fn network_error() -> ClientResult<ChatReply> {
        Err(ClientError::new(ClientErrorKind::Network, "unreachable".into()))
    }

    fn setup(
        locale: Locale,
        client: &ScriptedClient,
    ) -> (Arc<Mutex<ChatController>>, Arc<Mutex<RecordingTarget>>) {
        let _ = env_logger::builder().is_test(true).try_init();

        let controller = ChatController::new_arc(&TEST_TABLE, locale);
        let target = Arc::new(Mutex::new(RecordingTarget::default()));
        {
            let mut controller = controller.lock().unwrap();
            controller.set_client(Some(Box::new(client.clone())));
            controller.append_plugin(RenderPlugin::new(target.clone(), &TEST_TABLE));
        }
        (controller, target)
    }

    /// Runs both halves of an exchange synchronously.
    fn send(controller: &Arc<Mutex<ChatController>>, prompt: &str) -> bool {
        let exchange = {
            let mut controller = controller.lock().unwrap();
            controller.dispatch_mutation(ChatStateMutation::SetPrompt(prompt.into()));
            controller.start_exchange()
        };

        let Some(exchange) = exchange else {
            return false;
        };

        assert!(controller.lock().unwrap().state().is_waiting);
        let result = futures::executor::block_on(exchange);
        controller.lock().unwrap().finish_exchange(result);
        true
    }

    fn transcript(controller: &Arc<Mutex<ChatController>>) -> Vec<(Sender, String)> {
        controller
            .lock()
            .unwrap()
            .state()
            .messages
            .iter()
            .map(|m| (m.from, m.text.clone()))
            .collect()
    }

    #[test]
    fn test_blank_prompts_are_ignored() {
        let client = ScriptedClient::default();
        let (controller, target) = setup(Locale::De, &client);

        assert!(!send(&controller, ""));
        assert!(!send(&controller, "   \t "));

        assert!(transcript(&controller).is_empty());
        assert!(client.requests().is_empty());
        assert!(target.lock().unwrap().instructions.is_empty());
    }

    #[test]
    fn test_successful_exchange() {
        let client = ScriptedClient::with(vec![ok("Hello there")]);
        let (controller, target) = setup(Locale::En, &client);

        assert!(send(&controller, "  Hi "));

        assert_eq!(
            transcript(&controller),
            vec![(Sender::User, "Hi".into()), (Sender::Bot, "Hello there".into())]
        );
        assert_eq!(
            client.requests(),
            vec![ChatRequest {
                message: "Hi".into(),
                language: Locale::En,
            }]
        );

        let controller = controller.lock().unwrap();
        assert!(!controller.state().is_waiting);
        assert_eq!(controller.state().prompt, "");

        let target = target.lock().unwrap();
        assert_eq!(target.count(&RenderInstruction::ShowThinking { label: "en.thinking" }), 1);
        assert_eq!(target.count(&RenderInstruction::RemoveThinking), 1);
        assert_eq!(target.count(&RenderInstruction::ClearInput), 1);
        assert_eq!(target.count(&RenderInstruction::FocusInput), 1);
        assert_eq!(
            target.bubbles(),
            vec![(Sender::User, "Hi"), (Sender::Bot, "Hello there")]
        );
    }

    #[test]
    fn test_failures_show_localized_error() {
        for (locale, failure) in [
            (Locale::De, server_error()),
            (Locale::En, network_error()),
            (Locale::En, Err(ClientError::new(ClientErrorKind::Format, "no response".into()))),
        ] {
            let client = ScriptedClient::with(vec![failure]);
            let (controller, target) = setup(locale, &client);

            assert!(send(&controller, "Hi"));

            let error = TEST_TABLE.strings(locale).error.to_string();
            assert_eq!(
                transcript(&controller),
                vec![(Sender::User, "Hi".into()), (Sender::Bot, error)]
            );
            assert!(!controller.lock().unwrap().state().is_waiting);
            assert_eq!(target.lock().unwrap().count(&RenderInstruction::RemoveThinking), 1);
        }
    }

    #[test]
    fn test_resend_after_failure() {
        let client = ScriptedClient::with(vec![server_error(), ok("Second time lucky")]);
        let (controller, target) = setup(Locale::De, &client);

        assert!(send(&controller, "Hi"));
        target.lock().unwrap().take();

        assert!(send(&controller, "Hi"));
        let recorded = target.lock().unwrap().take();

        assert_eq!(
            recorded,
            vec![
                RenderInstruction::AppendBubble {
                    from: Sender::User,
                    text: "Hi".into(),
                },
                RenderInstruction::ScrollToBottom,
                RenderInstruction::ClearInput,
                RenderInstruction::FocusInput,
                RenderInstruction::SetSendEnabled(false),
                RenderInstruction::ShowThinking { label: "de.thinking" },
                RenderInstruction::ScrollToBottom,
                RenderInstruction::RemoveThinking,
                RenderInstruction::SetSendEnabled(true),
                RenderInstruction::AppendBubble {
                    from: Sender::Bot,
                    text: "Second time lucky".into(),
                },
                RenderInstruction::ScrollToBottom,
            ]
        );
        assert_eq!(client.requests().len(), 2);
        assert_eq!(transcript(&controller).len(), 4);
    }

    #[test]
    fn test_second_send_while_waiting_is_ignored() {
        let client = ScriptedClient::with(vec![ok("First")]);
        let (controller, _target) = setup(Locale::De, &client);

        let mut controller = controller.lock().unwrap();
        controller.dispatch_mutation(ChatStateMutation::SetPrompt("One".into()));
        let exchange = controller.start_exchange().expect("first send starts");

        controller.dispatch_mutation(ChatStateMutation::SetPrompt("Two".into()));
        assert!(controller.start_exchange().is_none());
        assert_eq!(controller.state().prompt, "Two");
        assert_eq!(controller.state().messages.len(), 1);

        controller.finish_exchange(futures::executor::block_on(exchange));
        assert_eq!(client.requests().len(), 1);
        assert_eq!(controller.state().messages.len(), 2);
    }

    #[test]
    fn test_late_reply_is_not_applied_twice() {
        let client = ScriptedClient::with(vec![ok("Hello")]);
        let (controller, target) = setup(Locale::De, &client);

        assert!(send(&controller, "Hi"));
        controller.lock().unwrap().finish_exchange(ok("Duplicate"));

        assert_eq!(transcript(&controller).len(), 2);
        assert_eq!(target.lock().unwrap().count(&RenderInstruction::RemoveThinking), 1);
    }

    #[test]
    fn test_missing_client_fails_gracefully() {
        let _ = env_logger::builder().is_test(true).try_init();
        let controller = ChatController::new_arc(&TEST_TABLE, Locale::En);
        let mut controller = controller.lock().unwrap();

        controller.dispatch_mutation(ChatStateMutation::SetPrompt("Hi".into()));
        assert!(controller.start_exchange().is_none());

        let state = controller.state();
        assert!(!state.is_waiting);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].text, "en.error");
    }

    struct Veto;

    impl ChatControllerPlugin for Veto {
        fn on_task(&mut self, _task: &ChatTask) -> ChatControl {
            ChatControl::Stop
        }
    }

    #[test]
    fn test_plugins_can_stop_tasks() {
        let client = ScriptedClient::default();
        let (controller, _target) = setup(Locale::De, &client);

        let mut controller = controller.lock().unwrap();
        let veto = controller.append_plugin(Veto);
        controller.dispatch_mutation(ChatStateMutation::SetPrompt("Hi".into()));
        controller.dispatch_task(ChatTask::Send);

        assert!(controller.state().messages.is_empty());
        assert!(client.requests().is_empty());

        controller.remove_plugin(veto);
        assert_eq!(controller.plugins.len(), 1);
    }

    #[tokio::test]
    async fn test_send_task_completes_in_background() {
        let client = ScriptedClient::with(vec![ok("Hello there")]);
        let (controller, _target) = setup(Locale::En, &client);

        {
            let mut controller = controller.lock().unwrap();
            controller.dispatch_mutation(ChatStateMutation::SetPrompt("Hi".into()));
            controller.dispatch_task(ChatTask::Send);
            assert!(controller.state().is_waiting);
        }

        for _ in 0..100 {
            if !controller.lock().unwrap().state().is_waiting {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(
            transcript(&controller),
            vec![(Sender::User, "Hi".into()), (Sender::Bot, "Hello there".into())]
        );
    }
}
