/// Popup UI listing the link options for the active tab

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use patternfly_yew::prelude::*;
use crate::error::FlinkError;
use crate::menu::OptionId;
use crate::protocol::{MenuEntry, RuntimeMessage};
use crate::tab_data::TabId;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/popup_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getActiveTabId() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Ready,
    Copied(String),
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let tab_id = use_state(|| None::<TabId>);
    let entries = use_state(Vec::<MenuEntry>::new);

    // Load the options for the active tab on mount
    {
        let state = state.clone();
        let tab_id = tab_id.clone();
        let entries = entries.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_link_options().await {
                    Ok((id, options)) => {
                        tab_id.set(Some(id));
                        entries.set(options);
                        state.set(PopupState::Ready);
                    }
                    Err(e) => {
                        state.set(PopupState::Error(format!("Failed to load links: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_copy = {
        let state = state.clone();
        let tab_id = tab_id.clone();
        let entries = entries.clone();

        Callback::from(move |option_id: OptionId| {
            let Some(id) = *tab_id else {
                return;
            };
            let state = state.clone();
            let label = entries
                .iter()
                .find(|entry| entry.id == option_id)
                .map(|entry| entry.title.clone())
                .unwrap_or_default();

            spawn_local(async move {
                match copy_link(id, option_id).await {
                    Ok(()) => state.set(PopupState::Copied(label)),
                    Err(e) => state.set(PopupState::Error(format!("Copy failed: {}", e))),
                }
            });
        })
    };

    let is_busy = matches!(*state, PopupState::Loading);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Flink"}</h1>

            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PopupState::Copied(label) => html! {
                    <Alert r#type={AlertType::Success} title={"Copied"} inline={true}>
                        {label.clone()}
                    </Alert>
                },
                PopupState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PopupState::Ready => html! {}
            }}

            if !is_busy && entries.is_empty() {
                <p class="message-text">{"No links available for this page"}</p>
            }

            <div class="flex-column-gap">
                {for entries.iter().map(|entry| {
                    let onclick = {
                        let on_copy = on_copy.clone();
                        let option_id = entry.id;
                        Callback::from(move |_| on_copy.emit(option_id))
                    };
                    html! {
                        <Button onclick={onclick} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                            {entry.title.clone()}
                        </Button>
                    }
                })}
            </div>

            <p class="footer-popup">
                {"Flink v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn load_link_options() -> Result<(TabId, Vec<MenuEntry>), FlinkError> {
    let tab_js = getActiveTabId().await.map_err(FlinkError::bridge)?;
    let tab_id = tab_js
        .as_f64()
        .map(|id| id as TabId)
        .ok_or(FlinkError::NoActiveTab)?;

    let reply = send(RuntimeMessage::GetLinkOptions { tab_id }).await?;
    let options: Vec<MenuEntry> = serde_wasm_bindgen::from_value(reply)
        .map_err(|e| FlinkError::decode("link options", e))?;

    Ok((tab_id, options))
}

async fn copy_link(tab_id: TabId, option_id: OptionId) -> Result<(), FlinkError> {
    send(RuntimeMessage::CopyLink { tab_id, option_id }).await?;
    Ok(())
}

async fn send(message: RuntimeMessage) -> Result<JsValue, FlinkError> {
    let message_js = serde_wasm_bindgen::to_value(&message)
        .map_err(|e| FlinkError::Encode(e.to_string()))?;

    sendMessage(message_js).await.map_err(FlinkError::bridge)
}
