/// Scrum Helper - side panel toggling and toast notifications
/// Built with Rust + WASM + Yew

mod background;
mod chrome;
mod dom;
mod error;
pub mod panel;
pub mod storage;
mod tab_data;
pub mod toast;
pub mod ui;

pub use error::ExtensionError;
pub use tab_data::TabId;

use dom::{BrowserTimers, WebDocument};
use panel::PanelConfig;
use toast::{ToastKind, ToastManager, DEFAULT_DURATION_MS};
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Wire the side panel coordinator to the chrome events
#[wasm_bindgen]
pub fn start_background() {
    background::start(PanelConfig::default());
}

// Start the Yew app for the popup / side panel page
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

/// Toast notifications for the page that constructs it.
///
/// Construct once per page and share it. Each instance owns its own
/// active toast and timers; all instances render into the one container
/// the page holds.
#[wasm_bindgen]
pub struct NotificationSystem {
    toasts: ToastManager<WebDocument, BrowserTimers>,
}

#[wasm_bindgen]
impl NotificationSystem {
    #[wasm_bindgen(constructor)]
    pub fn new() -> NotificationSystem {
        NotificationSystem {
            toasts: ToastManager::new(WebDocument, BrowserTimers),
        }
    }

    #[wasm_bindgen(js_name = showToast)]
    pub fn show_toast(
        &self,
        message: &str,
        kind: Option<String>,
        duration: Option<u32>,
        key: Option<String>,
    ) {
        let kind = kind.as_deref().map(ToastKind::from).unwrap_or_default();
        self.toasts.show_toast(
            message,
            kind,
            duration.unwrap_or(DEFAULT_DURATION_MS),
            key.as_deref(),
        );
    }

    #[wasm_bindgen(js_name = clearToasts)]
    pub fn clear_toasts(&self, key: Option<String>) {
        self.toasts.clear_toasts(key.as_deref());
    }
}

impl Default for NotificationSystem {
    fn default() -> Self {
        Self::new()
    }
}
