use cv_chat_kit::ChatStrings;

pub(super) const STRINGS: ChatStrings = ChatStrings {
    toggle_alt: "Open Chatbot",
    title: "Ask Omar",
    welcome_message: "Hello! I'm Omar's CV chatbot. Ask me anything about Omar's experience, projects, or skills!",
    input_placeholder: "Ask a question about Omar...",
    send_button: "Send",
    thinking: "Omar is thinking...",
    error: "Sorry, there was an issue retrieving the answer. Please try again later.",
    no_info: "I'm afraid I don't have information on that specific question in Omar's CV. Perhaps you'd like to ask something else or contact Omar directly?",
};
