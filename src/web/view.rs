use std::rc::Rc;

use anyhow::anyhow;
use cv_chat_kit::{
    Locale, TranslationTable,
    render::{BubbleStyle, RenderInstruction, RenderTarget, THINKING_BUBBLE_ID},
};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use crate::data::config::ElementIds;

/// Every node whose text comes from the widget string table.
const LOCALIZED_SELECTOR: &str = r#"[data-i18n-key^="chatbot."]"#;

/// Notifications the panel controller waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelEvent {
    FrameReady,
    /// Carries the generation of the close being waited for.
    TransitionFinished(u64),
}

pub type PanelEventHandler = Rc<dyn Fn(PanelEvent)>;

/// Applies render instructions to the host page.
pub struct DomView {
    document: Document,
    toggle: HtmlElement,
    window: HtmlElement,
    open_icon: Element,
    close_icon: Element,
    messages: Element,
    input: HtmlInputElement,
    send: HtmlButtonElement,
    translations: &'static TranslationTable,
    close_fallback_ms: i32,
    on_panel_event: Option<PanelEventHandler>,
}

impl DomView {
    pub fn new(
        document: Document,
        ids: &ElementIds,
        translations: &'static TranslationTable,
        close_fallback_ms: u32,
    ) -> anyhow::Result<Self> {
        Ok(DomView {
            toggle: element(&document, &ids.toggle)?,
            window: element(&document, &ids.window)?,
            open_icon: element(&document, &ids.open_icon)?,
            close_icon: element(&document, &ids.close_icon)?,
            messages: element(&document, &ids.messages)?,
            input: element(&document, &ids.input)?,
            send: element(&document, &ids.send)?,
            document,
            translations,
            close_fallback_ms: i32::try_from(close_fallback_ms).unwrap_or(i32::MAX),
            on_panel_event: None,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn toggle_element(&self) -> &HtmlElement {
        &self.toggle
    }

    pub fn window_element(&self) -> &HtmlElement {
        &self.window
    }

    pub fn input_element(&self) -> &HtmlInputElement {
        &self.input
    }

    pub fn send_element(&self) -> &HtmlButtonElement {
        &self.send
    }

    /// Where `RequestFrame` and `AwaitTransition` report back.
    pub fn set_panel_event_handler(&mut self, handler: PanelEventHandler) {
        self.on_panel_event = Some(handler);
    }

    fn apply(&self, instruction: &RenderInstruction) -> Result<(), JsValue> {
        match instruction {
            RenderInstruction::AppendBubble { from, text } => {
                let style = BubbleStyle::for_sender(*from);
                let row = self.div(style.row)?;
                let bubble = self.div(style.bubble)?;
                let paragraph = self.document.create_element("p")?;
                paragraph.set_text_content(Some(text.as_str()));
                bubble.append_child(&paragraph)?;
                row.append_child(&bubble)?;
                self.messages.append_child(&row)?;
            }
            RenderInstruction::ShowThinking { label } => {
                let style = BubbleStyle::thinking();
                let row = self.div(style.row)?;
                row.set_id(THINKING_BUBBLE_ID);
                row.set_attribute("role", "status")?;
                row.set_attribute("aria-label", label)?;

                let bubble = self.div(style.bubble)?;
                let dots = self.div("flex items-center justify-center space-x-1")?;
                for delay in ["-0.3s", "-0.15s", "0s"] {
                    let dot = self.document.create_element("span")?;
                    dot.set_class_name("h-2 w-2 bg-slate-400 rounded-full animate-pulse");
                    dot.set_attribute("style", &format!("animation-delay: {delay};"))?;
                    dots.append_child(&dot)?;
                }
                bubble.append_child(&dots)?;
                row.append_child(&bubble)?;
                self.messages.append_child(&row)?;
            }
            RenderInstruction::RemoveThinking => {
                if let Some(thinking) = self.document.get_element_by_id(THINKING_BUBBLE_ID) {
                    thinking.remove();
                }
            }
            RenderInstruction::ScrollToBottom => {
                self.messages.set_scroll_top(self.messages.scroll_height());
            }
            RenderInstruction::ClearInput => self.input.set_value(""),
            RenderInstruction::FocusInput => self.input.focus()?,
            RenderInstruction::SetSendEnabled(enabled) => self.send.set_disabled(!enabled),
            RenderInstruction::Localize(locale) => self.localize(*locale)?,
            RenderInstruction::ShowPanel => {
                self.window.class_list().remove_1("hidden")?;
                self.window.class_list().add_1("flex")?;
            }
            RenderInstruction::HidePanel => {
                self.window.class_list().add_1("hidden")?;
                self.window.class_list().remove_1("flex")?;
            }
            RenderInstruction::SetPanelVisual(visible) => {
                let style = self.window.style();
                if *visible {
                    style.set_property("transform", "scale(1)")?;
                    style.set_property("opacity", "1")?;
                } else {
                    style.set_property("transform", "scale(0.95)")?;
                    style.set_property("opacity", "0")?;
                }
            }
            RenderInstruction::SetToggleOpen(open) => {
                let rotation = if *open { "rotate(180deg)" } else { "rotate(0deg)" };
                self.toggle.style().set_property("transform", rotation)?;
                if *open {
                    self.open_icon.class_list().add_1("hidden")?;
                    self.close_icon.class_list().remove_1("hidden")?;
                } else {
                    self.open_icon.class_list().remove_1("hidden")?;
                    self.close_icon.class_list().add_1("hidden")?;
                }
            }
            RenderInstruction::RequestFrame => {
                let callback = self.panel_callback(PanelEvent::FrameReady);
                web_window()?.request_animation_frame(callback.unchecked_ref())?;
            }
            RenderInstruction::AwaitTransition { generation } => {
                // The `transitionend` listener reports too. Whichever comes
                // second is ignored by the panel controller.
                let callback = self.panel_callback(PanelEvent::TransitionFinished(*generation));
                web_window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.unchecked_ref(),
                    self.close_fallback_ms,
                )?;
            }
        }

        Ok(())
    }

    fn localize(&self, locale: Locale) -> Result<(), JsValue> {
        let nodes = self.document.query_selector_all(LOCALIZED_SELECTOR)?;
        for index in 0..nodes.length() {
            let Some(element) = nodes.item(index).and_then(|n| n.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let Some(key) = element.get_attribute("data-i18n-key") else {
                continue;
            };

            let text = self.translations.resolve(locale, &key);
            if element.has_attribute("data-i18n-placeholder") {
                element.set_attribute("placeholder", text)?;
            } else {
                element.set_text_content(Some(text));
            }
        }
        Ok(())
    }

    fn div(&self, class_name: &str) -> Result<Element, JsValue> {
        let div = self.document.create_element("div")?;
        div.set_class_name(class_name);
        Ok(div)
    }

    /// One-shot JS callback forwarding `event` to the handler, if any.
    fn panel_callback(&self, event: PanelEvent) -> JsValue {
        let handler = self.on_panel_event.clone();
        Closure::once_into_js(move || {
            if let Some(handler) = handler {
                handler(event);
            }
        })
    }
}

impl RenderTarget for DomView {
    fn render(&mut self, instructions: &[RenderInstruction]) {
        for instruction in instructions {
            if let Err(error) = self.apply(instruction) {
                log::error!("Failed to render {instruction:?}: {error:?}");
            }
        }
    }
}

pub(crate) fn web_window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))
}

pub(crate) fn element<T: JsCast>(document: &Document, id: &str) -> anyhow::Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("Missing element #{id}"))?
        .dyn_into::<T>()
        .map_err(|_| anyhow!("Element #{id} has an unexpected type"))
}
