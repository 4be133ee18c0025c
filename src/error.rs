/// Error type for the browser bridge
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum FlinkError {
    #[error("browser call failed: {0}")]
    Bridge(String),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("unknown menu item: {0}")]
    UnknownOption(String),

    #[error("tab {0} not found")]
    TabNotFound(i32),

    #[error("no active tab")]
    NoActiveTab,
}

pub type Result<T> = std::result::Result<T, FlinkError>;

impl FlinkError {
    pub fn bridge(err: JsValue) -> Self {
        FlinkError::Bridge(format!("{:?}", err))
    }

    pub fn decode(what: &'static str, err: serde_wasm_bindgen::Error) -> Self {
        FlinkError::Decode {
            what,
            reason: err.to_string(),
        }
    }
}

impl From<FlinkError> for JsValue {
    fn from(err: FlinkError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
