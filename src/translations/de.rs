use cv_chat_kit::ChatStrings;

pub(super) const STRINGS: ChatStrings = ChatStrings {
    toggle_alt: "Chatbot öffnen",
    title: "Omar fragen",
    welcome_message: "Hallo! Ich bin Omars CV-Chatbot. Fragen Sie mich etwas über Omars Erfahrung, Projekte oder Fähigkeiten!",
    input_placeholder: "Stellen Sie eine Frage über Omar...",
    send_button: "Senden",
    thinking: "Omar denkt nach...",
    error: "Entschuldigung, es gab ein Problem beim Abrufen der Antwort. Bitte versuchen Sie es später erneut.",
    no_info: "Ich habe zu dieser Frage leider keine Informationen in Omars Lebenslauf gefunden. Vielleicht möchten Sie eine andere Frage stellen oder Omar direkt kontaktieren?",
};
