/// Content script: runs the page inspector inside the page
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlElement, HtmlInputElement, Window};

use crate::inspector::{Inspector, PageContext};
use crate::protocol::{InspectorRequest, RuntimeMessage};
use crate::sites::PageDom;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/content_bridge.js")]
extern "C" {
    fn onInspectorRequest(handler: &js_sys::Function);

    fn sendRuntimeMessage(message: JsValue);
}

/// The live page
pub struct DocumentPage {
    window: Window,
    document: Document,
}

impl DocumentPage {
    pub fn new(window: Window, document: Document) -> Self {
        DocumentPage { window, document }
    }

    fn query(&self, selector: &str) -> Option<web_sys::Element> {
        self.document.query_selector(selector).ok().flatten()
    }
}

impl PageDom for DocumentPage {
    fn attribute(&self, selector: &str, name: &str) -> Option<String> {
        self.query(selector)?.get_attribute(name)
    }

    fn input_value(&self, selector: &str) -> Option<String> {
        self.query(selector)?
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| input.value())
    }

    fn inner_text(&self, selector: &str) -> Option<String> {
        self.query(selector)?
            .dyn_into::<HtmlElement>()
            .ok()
            .map(|element| element.inner_text())
    }
}

impl PageContext for DocumentPage {
    fn url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn selection(&self) -> String {
        match self.window.get_selection() {
            Ok(Some(selection)) => selection.to_string().into(),
            _ => String::new(),
        }
    }
}

/// Answer inspector requests and report selection changes
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let inspector = Rc::new(Inspector::new(DocumentPage::new(window, document.clone())));

    let on_request = {
        let inspector = inspector.clone();
        Closure::wrap(Box::new(move |message: JsValue| -> JsValue {
            let request: InspectorRequest = match serde_wasm_bindgen::from_value(message) {
                Ok(request) => request,
                Err(e) => {
                    debug!("Ignoring message: {}", e);
                    return JsValue::UNDEFINED;
                }
            };

            let reply = inspector.respond(request);
            serde_wasm_bindgen::to_value(&reply).unwrap_or_else(|e| {
                warn!("Failed to encode reply to {:?}: {}", request, e);
                JsValue::UNDEFINED
            })
        }) as Box<dyn Fn(JsValue) -> JsValue>)
    };
    onInspectorRequest(on_request.as_ref().unchecked_ref());
    on_request.forget();

    let on_selection_change = Closure::wrap(Box::new(move |_event: Event| {
        let message = RuntimeMessage::SelectionChanged {
            selection: inspector.selection(),
        };
        match serde_wasm_bindgen::to_value(&message) {
            Ok(message) => sendRuntimeMessage(message),
            Err(e) => warn!("Failed to encode selection change: {}", e),
        }
    }) as Box<dyn Fn(Event)>);
    document.add_event_listener_with_callback(
        "selectionchange",
        on_selection_change.as_ref().unchecked_ref(),
    )?;
    on_selection_change.forget();

    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn page_with(html: &str) -> DocumentPage {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        document.body().unwrap().set_inner_html(html);
        DocumentPage::new(window, document)
    }

    #[wasm_bindgen_test]
    fn test_reads_meta_attribute() {
        let page = page_with(r#"<meta property="og:title" content="Shared title">"#);

        assert_eq!(
            page.attribute(r#"meta[property="og:title"]"#, "content"),
            Some("Shared title".to_string())
        );
        assert_eq!(page.attribute(".missing", "content"), None);
    }

    #[wasm_bindgen_test]
    fn test_reads_input_value_and_text() {
        let page = page_with(
            r#"<input class="docs-title-input" value="Quarterly plan"><h1 id="field-value-short_desc">Crash</h1>"#,
        );

        assert_eq!(
            page.input_value(".docs-title-input"),
            Some("Quarterly plan".to_string())
        );
        assert_eq!(
            page.inner_text("#field-value-short_desc"),
            Some("Crash".to_string())
        );
        // Not an input element
        assert_eq!(page.input_value("#field-value-short_desc"), None);
    }

    #[wasm_bindgen_test]
    fn test_empty_selection() {
        let page = page_with("<p>nothing selected</p>");

        assert_eq!(page.selection(), "");
        assert!(page.url().starts_with("http"));
    }
}
