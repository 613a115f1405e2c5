/// Error type shared by the host bindings and the two cores

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("host call failed: {0}")]
    Host(String),

    #[error("capability unavailable: {0}")]
    Unsupported(&'static str),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("document error: {0}")]
    Dom(String),
}

impl ExtensionError {
    pub fn host(context: &str, err: JsValue) -> Self {
        ExtensionError::Host(format!("{}: {:?}", context, err))
    }

    pub fn dom(context: &str, err: JsValue) -> Self {
        ExtensionError::Dom(format!("{}: {:?}", context, err))
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Storage(err.to_string())
    }
}
