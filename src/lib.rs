/// Flink - Browser Extension for Copying Page Links
/// Built with Rust + WASM + Yew

mod background;
mod content;
pub mod coordinator;
pub mod error;
pub mod inspector;
pub mod menu;
pub mod protocol;
pub mod registry;
pub mod sites;
pub mod tab_data;
pub mod text;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export display truncation for JavaScript access
#[wasm_bindgen]
pub fn truncate_display(text: &str) -> String {
    text::truncate(text)
}

// Start the tab state coordinator in the background page
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}

// Start the page inspector in a content script
#[wasm_bindgen]
pub fn start_content() -> Result<(), JsValue> {
    content::start()
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
