/// Background context: wires browser events into the coordinator
use std::rc::Rc;

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::coordinator::{Coordinator, Host};
use crate::error::FlinkError;
use crate::menu::ClipboardPayload;
use crate::protocol::{InspectorRequest, MenuEntry, RuntimeMessage};
use crate::tab_data::{FormattedLink, TabChange, TabId, TabInfo};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/background_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendToTab(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn writeClipboard(plain: &str, html: &str) -> Result<(), JsValue>;

    fn showPageAction(tab_id: i32);

    fn hidePageAction(tab_id: i32);

    fn removeAllMenuItems();

    fn createMenuItem(id: &str, title: &str);

    fn registerListeners(
        on_updated: &js_sys::Function,
        on_activated: &js_sys::Function,
        on_removed: &js_sys::Function,
        on_focus_changed: &js_sys::Function,
        on_message: &js_sys::Function,
        on_menu_clicked: &js_sys::Function,
        on_action_clicked: &js_sys::Function,
    );
}

/// `Host` backed by the WebExtension APIs
pub struct BrowserHost;

impl BrowserHost {
    async fn ask<T: DeserializeOwned>(
        &self,
        tab_id: TabId,
        request: InspectorRequest,
    ) -> Option<T> {
        let message = match serde_wasm_bindgen::to_value(&request) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to encode {:?}: {}", request, e);
                return None;
            }
        };

        match sendToTab(tab_id, message).await {
            Ok(reply) if reply.is_undefined() || reply.is_null() => {
                debug!("No reply to {:?} from tab {}", request, tab_id);
                None
            }
            Ok(reply) => match decode("inspector reply", reply) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            },
            Err(e) => {
                debug!("Message to tab {} failed: {:?}", tab_id, e);
                None
            }
        }
    }
}

impl Host for BrowserHost {
    async fn active_tab(&self) -> Option<TabInfo> {
        lookup_tab(queryActiveTab().await)
    }

    async fn get_tab(&self, tab_id: TabId) -> Option<TabInfo> {
        lookup_tab(getTab(tab_id).await)
    }

    async fn fetch_open_graph_title(&self, tab_id: TabId) -> Option<String> {
        self.ask(tab_id, InspectorRequest::GetOpenGraphTitle).await
    }

    async fn fetch_formatted_link(&self, tab_id: TabId) -> Option<FormattedLink> {
        self.ask(tab_id, InspectorRequest::GetFormattedLink).await
    }

    async fn fetch_selection(&self, tab_id: TabId) -> Option<String> {
        self.ask(tab_id, InspectorRequest::GetSelection).await
    }

    async fn write_clipboard(&self, payload: &ClipboardPayload) -> Result<(), FlinkError> {
        writeClipboard(&payload.plain, &payload.html)
            .await
            .map_err(|e| FlinkError::Clipboard(format!("{:?}", e)))
    }

    fn show_action(&self, tab_id: TabId) {
        showPageAction(tab_id);
    }

    fn hide_action(&self, tab_id: TabId) {
        hidePageAction(tab_id);
    }

    fn clear_menu(&self) {
        removeAllMenuItems();
    }

    fn add_menu_item(&self, entry: &MenuEntry) {
        createMenuItem(entry.id.as_str(), &entry.title);
    }
}

fn decode<T: DeserializeOwned>(what: &'static str, value: JsValue) -> Result<T, FlinkError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| FlinkError::decode(what, e))
}

fn lookup_tab(result: Result<JsValue, JsValue>) -> Option<TabInfo> {
    match result {
        Ok(value) if value.is_null() || value.is_undefined() => None,
        Ok(value) => decode("tab", value)
            .map_err(|e| warn!("{}", e))
            .ok(),
        Err(e) => {
            warn!("Tab lookup failed: {}", FlinkError::bridge(e));
            None
        }
    }
}

type Shared = Rc<Coordinator<BrowserHost>>;

/// Answer a runtime message; popup requests get a promise back
fn handle_message(coordinator: &Shared, message: JsValue, sender_tab: JsValue) -> JsValue {
    let message: RuntimeMessage = match decode("runtime message", message) {
        Ok(message) => message,
        Err(e) => {
            debug!("Ignoring message: {}", e);
            return JsValue::UNDEFINED;
        }
    };

    let coordinator = coordinator.clone();
    match message {
        RuntimeMessage::SelectionChanged { selection } => {
            let Some(tab_id) = sender_tab.as_f64().map(|id| id as TabId) else {
                return JsValue::UNDEFINED;
            };
            spawn_local(async move {
                coordinator.on_selection_changed(tab_id, selection).await;
            });
            JsValue::UNDEFINED
        }
        RuntimeMessage::GetLinkOptions { tab_id } => future_to_promise(async move {
            let entries = coordinator.link_options(tab_id).await;
            serde_wasm_bindgen::to_value(&entries)
                .map_err(|e| JsValue::from(FlinkError::Encode(e.to_string())))
        })
        .into(),
        RuntimeMessage::CopyLink { tab_id, option_id } => future_to_promise(async move {
            coordinator.copy_link(tab_id, option_id).await?;
            Ok::<JsValue, JsValue>(JsValue::TRUE)
        })
        .into(),
    }
}

/// Start the background coordinator and subscribe to browser events
pub fn start() {
    let coordinator: Shared = Rc::new(Coordinator::new(BrowserHost));

    {
        let coordinator = coordinator.clone();
        spawn_local(async move { coordinator.initialize().await });
    }

    let on_updated = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |tab_id: i32, change: JsValue, tab: JsValue| {
            let change: TabChange = match decode("tab change", change) {
                Ok(change) => change,
                Err(e) => {
                    warn!("{}", e);
                    return;
                }
            };
            let Some(tab) = lookup_tab(Ok(tab)) else {
                return;
            };
            let coordinator = coordinator.clone();
            spawn_local(async move {
                coordinator.on_tab_updated(tab_id, &change, &tab).await;
            });
        }) as Box<dyn Fn(i32, JsValue, JsValue)>)
    };

    let on_activated = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |tab_id: i32| {
            let coordinator = coordinator.clone();
            spawn_local(async move { coordinator.on_tab_activated(tab_id).await });
        }) as Box<dyn Fn(i32)>)
    };

    let on_removed = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |tab_id: i32| {
            coordinator.on_tab_removed(tab_id);
        }) as Box<dyn Fn(i32)>)
    };

    let on_focus_changed = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |window_id: i32| {
            let coordinator = coordinator.clone();
            spawn_local(async move { coordinator.on_window_focus_changed(window_id).await });
        }) as Box<dyn Fn(i32)>)
    };

    let on_message = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |message: JsValue, sender_tab: JsValue| {
            handle_message(&coordinator, message, sender_tab)
        }) as Box<dyn Fn(JsValue, JsValue) -> JsValue>)
    };

    let on_menu_clicked = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |menu_item_id: String, tab: JsValue| {
            let Some(tab) = lookup_tab(Ok(tab)) else {
                return;
            };
            let coordinator = coordinator.clone();
            spawn_local(async move {
                if let Err(e) = coordinator.on_menu_clicked(&menu_item_id, &tab).await {
                    error!("Copy from context menu failed: {}", e);
                }
            });
        }) as Box<dyn Fn(String, JsValue)>)
    };

    let on_action_clicked = {
        let coordinator = coordinator.clone();
        Closure::wrap(Box::new(move |tab: JsValue| {
            let Some(tab) = lookup_tab(Ok(tab)) else {
                return;
            };
            let coordinator = coordinator.clone();
            spawn_local(async move {
                if let Err(e) = coordinator.on_action_clicked(&tab).await {
                    error!("Copy from page action failed: {}", e);
                }
            });
        }) as Box<dyn Fn(JsValue)>)
    };

    registerListeners(
        on_updated.as_ref().unchecked_ref(),
        on_activated.as_ref().unchecked_ref(),
        on_removed.as_ref().unchecked_ref(),
        on_focus_changed.as_ref().unchecked_ref(),
        on_message.as_ref().unchecked_ref(),
        on_menu_clicked.as_ref().unchecked_ref(),
        on_action_clicked.as_ref().unchecked_ref(),
    );

    // Listeners live for the whole background page
    on_updated.forget();
    on_activated.forget();
    on_removed.forget();
    on_focus_changed.forget();
    on_message.forget();
    on_menu_clicked.forget();
    on_action_clicked.forget();
}
