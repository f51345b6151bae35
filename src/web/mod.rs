//! Browser bindings: attaches [`ChatWidget`] to the host page and exposes it
//! to JavaScript.

mod storage;
mod view;

pub use storage::LocalStorage;
pub use view::{DomView, PanelEvent};

use std::{cell::RefCell, rc::Rc};

use anyhow::Context;
use cv_chat_kit::{Locale, RemoteClient};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{Event, EventTarget, KeyboardEvent};

use crate::{
    app::ChatWidget,
    data::{config::WidgetConfig, preferences::Preferences},
    translations::TRANSLATIONS,
};

type SharedWidget = Rc<RefCell<ChatWidget<DomView>>>;

/// Opts the page out of the automatic mount when present on `<body>`.
const MANUAL_MOUNT_ATTRIBUTE: &str = "data-cv-chatbot-manual";

thread_local! {
    static MOUNTED: RefCell<Option<Chatbot>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    let manual = document
        .body()
        .is_some_and(|body| body.has_attribute(MANUAL_MOUNT_ATTRIBUTE));
    if manual {
        log::debug!("Automatic mount disabled by the page");
        return;
    }

    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(auto_mount);
        if let Err(error) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        {
            log::error!("Failed to wait for the page: {error:?}");
        }
    } else {
        auto_mount();
    }
}

fn auto_mount() {
    match mount_with(WidgetConfig::default()) {
        Ok(chatbot) => MOUNTED.with(|mounted| *mounted.borrow_mut() = Some(chatbot)),
        Err(error) => log::error!("Chat widget not mounted: {error:#}"),
    }
}

/// Attaches the widget to the current page.
///
/// `config` is a partial [`WidgetConfig`] object, or `undefined` for the
/// defaults.
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<Chatbot, JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        WidgetConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    mount_with(config).map_err(|error| {
        log::error!("Chat widget not mounted: {error:#}");
        JsValue::from_str(&format!("{error:#}"))
    })
}

/// The automatically mounted widget, if any.
#[wasm_bindgen]
pub fn instance() -> Option<Chatbot> {
    MOUNTED.with(|mounted| mounted.borrow().clone())
}

fn mount_with(config: WidgetConfig) -> anyhow::Result<Chatbot> {
    config.validate()?;

    let window = web_sys::window().context("No global window")?;
    let document = window.document().context("No document in the window")?;

    let view = DomView::new(
        document,
        &config.elements,
        &TRANSLATIONS,
        config.close_fallback_ms,
    )
    .context("Failed to attach the chat widget")?;
    let preferences = Preferences::new(LocalStorage::new(&window), config.language_key.clone());
    let client = RemoteClient::new(config.endpoint.clone());

    let widget = Rc::new(RefCell::new(ChatWidget::new(
        view,
        preferences,
        Box::new(client),
    )));
    bind(&widget, &config)
        .map_err(|error| anyhow::anyhow!("Failed to bind events: {error:?}"))?;

    log::info!("Chat widget mounted, talking to {}", config.endpoint);
    Ok(Chatbot { widget })
}

fn bind(widget: &SharedWidget, config: &WidgetConfig) -> Result<(), JsValue> {
    let weak = Rc::downgrade(widget);
    let (document, toggle, panel, input, send) = {
        let widget = widget.borrow();
        let Ok(mut view) = widget.target().lock() else {
            return Err(JsValue::from_str("Render target is poisoned"));
        };

        view.set_panel_event_handler(Rc::new(move |event| {
            if let Some(widget) = weak.upgrade() {
                update(&widget, |widget| match event {
                    PanelEvent::FrameReady => widget.frame_ready(),
                    PanelEvent::TransitionFinished(generation) => widget.transition_finished(generation),
                });
            }
        }));

        (
            view.document().clone(),
            view.toggle_element().clone(),
            view.window_element().clone(),
            view.input_element().clone(),
            view.send_element().clone(),
        )
    };

    listen(&toggle, "click", widget, |widget, _| widget.toggle())?;

    let send_input = input.clone();
    listen(&send, "click", widget, move |widget, _| {
        widget.set_prompt(send_input.value());
        widget.send();
    })?;

    let enter_input = input.clone();
    listen(&input, "keypress", widget, move |widget, event| {
        let enter = event
            .dyn_ref::<KeyboardEvent>()
            .is_some_and(|key| key.key() == "Enter");
        if enter {
            widget.set_prompt(enter_input.value());
            widget.send();
        }
    })?;

    let typed_input = input.clone();
    listen(&input, "input", widget, move |widget, _| {
        widget.set_prompt(typed_input.value());
    })?;

    // Child elements may animate too, only the panel's own transition counts.
    let transition_panel = panel.clone();
    listen(&panel, "transitionend", widget, move |widget, event| {
        let own = event.target().is_some_and(|target| {
            AsRef::<JsValue>::as_ref(&target) == AsRef::<JsValue>::as_ref(&transition_panel)
        });
        if own {
            widget.transition_finished(widget.close_generation());
        }
    })?;

    match document.get_element_by_id(&config.elements.close) {
        Some(close) => listen(&close, "click", widget, |widget, _| widget.close())?,
        None => log::warn!("No #{} element, only the toggle closes the chat", config.elements.close),
    }

    Ok(())
}

/// Registers a listener living as long as the page.
fn listen(
    target: &EventTarget,
    event: &str,
    widget: &SharedWidget,
    mut handler: impl FnMut(&mut ChatWidget<DomView>, &Event) + 'static,
) -> Result<(), JsValue> {
    let widget = widget.clone();
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        update(&widget, |widget| handler(widget, &event));
    });
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn update(widget: &SharedWidget, f: impl FnOnce(&mut ChatWidget<DomView>)) {
    match widget.try_borrow_mut() {
        Ok(mut widget) => f(&mut widget),
        Err(_) => log::warn!("Chat widget busy, event dropped"),
    }
}

/// Handle to a mounted widget.
#[wasm_bindgen]
#[derive(Clone)]
pub struct Chatbot {
    widget: SharedWidget,
}

#[wasm_bindgen]
impl Chatbot {
    pub fn toggle(&self) {
        update(&self.widget, |widget| widget.toggle());
    }

    pub fn close(&self) {
        update(&self.widget, |widget| widget.close());
    }

    /// Sends whatever is currently typed in the input.
    pub fn send(&self) {
        update(&self.widget, |widget| {
            let prompt = widget
                .target()
                .lock()
                .map(|view| view.input_element().value())
                .unwrap_or_default();
            widget.set_prompt(prompt);
            widget.send();
        });
    }

    /// Switches the language and persists it, e.g. from the site language
    /// switcher.
    #[wasm_bindgen(js_name = setLanguage)]
    pub fn set_language(&self, code: &str) -> Result<(), JsValue> {
        let locale: Locale = code
            .parse()
            .map_err(|error: cv_chat_kit::UnknownLocale| JsValue::from_str(&error.to_string()))?;
        update(&self.widget, |widget| widget.set_locale(locale));
        Ok(())
    }

    pub fn language(&self) -> String {
        self.widget.borrow().locale().code().to_string()
    }
}
