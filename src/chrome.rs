/// Bindings to the chrome.* extension APIs
///
/// Every optional API is looked up on the global object before use, so
/// the same module loads on hosts without `chrome.sidePanel` (or without
/// `chrome` at all, e.g. a plain page hosting the toasts).

use crate::error::ExtensionError;
use crate::panel::{HostCall, PanelHost, PanelOptions};
use crate::storage::{DisplayMode, DisplaySettings, StorageChanges, DISPLAY_MODE_KEY};
use crate::tab_data::{ClickedTab, TabId};
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use js_sys::{Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "action"], js_name = setPopup)]
    fn action_set_popup(details: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "sidePanel"], js_name = open)]
    fn side_panel_open(options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "sidePanel"], js_name = close)]
    fn side_panel_close(options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "sidePanel"], js_name = setOptions)]
    fn side_panel_set_options(options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_local_get(keys: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn storage_local_set(items: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onRemoved"], js_name = addListener)]
    fn add_tab_removed_listener(callback: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "action", "onClicked"], js_name = addListener)]
    fn add_action_clicked_listener(callback: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn add_storage_changed_listener(callback: &Closure<dyn FnMut(JsValue, JsValue)>);
}

#[derive(Serialize)]
struct PopupDetails<'a> {
    popup: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabTarget {
    tab_id: TabId,
}

/// Walk `globalThis.a.b.c`, stopping at the first missing segment
fn lookup(path: &[&str]) -> Option<JsValue> {
    let mut current: JsValue = js_sys::global().into();

    for segment in path {
        current = Reflect::get(&current, &JsValue::from_str(segment)).ok()?;
        if current.is_undefined() || current.is_null() {
            return None;
        }
    }

    Some(current)
}

fn has_function(path: &[&str]) -> bool {
    lookup(path).is_some_and(|value| value.is_function())
}

/// Issue a promise-returning API call now and wrap its settlement
fn issue<T: Serialize>(
    context: &'static str,
    args: &T,
    call: fn(&JsValue) -> Result<JsValue, JsValue>,
) -> HostCall {
    let issued = serde_wasm_bindgen::to_value(args)
        .map_err(ExtensionError::from)
        .and_then(|args| call(&args).map_err(|e| ExtensionError::host(context, e)));

    match issued {
        Ok(result) => {
            // Some APIs return undefined instead of a promise
            let settled = JsFuture::from(Promise::resolve(&result));
            async move {
                settled
                    .await
                    .map(|_| ())
                    .map_err(|e| ExtensionError::host(context, e))
            }
            .boxed_local()
        }
        Err(e) => future::ready(Err(e)).boxed_local(),
    }
}

/// The live browser as seen from the background service worker
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

impl PanelHost for ChromeHost {
    fn supports_side_panel(&self) -> bool {
        has_function(&["chrome", "sidePanel", "open"])
    }

    fn set_popup(&self, popup: &str) -> HostCall {
        if !has_function(&["chrome", "action", "setPopup"]) {
            return future::ready(Err(ExtensionError::Unsupported("chrome.action.setPopup")))
                .boxed_local();
        }
        issue("action.setPopup", &PopupDetails { popup }, action_set_popup)
    }

    fn open_panel(&self, tab_id: TabId) -> HostCall {
        issue("sidePanel.open", &TabTarget { tab_id }, side_panel_open)
    }

    fn close_panel(&self, tab_id: TabId) -> Option<HostCall> {
        has_function(&["chrome", "sidePanel", "close"])
            .then(|| issue("sidePanel.close", &TabTarget { tab_id }, side_panel_close))
    }

    fn set_panel_options(&self, options: &PanelOptions) -> Option<HostCall> {
        has_function(&["chrome", "sidePanel", "setOptions"])
            .then(|| issue("sidePanel.setOptions", options, side_panel_set_options))
    }

    fn load_display_mode(&self) -> LocalBoxFuture<'static, Result<DisplayMode, ExtensionError>> {
        load_display_mode().boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        spawn_local(task);
    }
}

/// Read the display mode, falling back to the default when unset
pub async fn load_display_mode() -> Result<DisplayMode, ExtensionError> {
    if !has_function(&["chrome", "storage", "local", "get"]) {
        return Err(ExtensionError::Unsupported("chrome.storage.local"));
    }

    let defaults = serde_wasm_bindgen::to_value(&DisplaySettings::default())?;
    let pending = storage_local_get(&defaults).map_err(|e| ExtensionError::host("storage.get", e))?;
    let stored = JsFuture::from(Promise::resolve(&pending))
        .await
        .map_err(|e| ExtensionError::host("storage.get", e))?;

    let settings: DisplaySettings = serde_wasm_bindgen::from_value(stored)?;
    Ok(settings.display_mode)
}

pub async fn save_display_mode(mode: DisplayMode) -> Result<(), ExtensionError> {
    if !has_function(&["chrome", "storage", "local", "set"]) {
        return Err(ExtensionError::Unsupported("chrome.storage.local"));
    }

    let items = serde_wasm_bindgen::to_value(&DisplaySettings { display_mode: mode })?;
    let pending = storage_local_set(&items).map_err(|e| ExtensionError::host("storage.set", e))?;
    JsFuture::from(Promise::resolve(&pending))
        .await
        .map_err(|e| ExtensionError::host("storage.set", e))?;

    log::info!("Saved {} = {:?}", DISPLAY_MODE_KEY, mode);
    Ok(())
}

// Event listeners live for the whole worker lifetime, hence `forget`.

pub fn listen_tab_removed(mut handler: impl FnMut(TabId) + 'static) {
    if !has_function(&["chrome", "tabs", "onRemoved", "addListener"]) {
        log::warn!("chrome.tabs.onRemoved unavailable");
        return;
    }

    let callback = Closure::<dyn FnMut(JsValue)>::new(move |tab_id: JsValue| {
        if let Some(tab_id) = tab_id.as_f64() {
            handler(tab_id as TabId);
        }
    });
    add_tab_removed_listener(&callback);
    callback.forget();
}

pub fn listen_action_clicked(mut handler: impl FnMut(Option<TabId>) + 'static) {
    if !has_function(&["chrome", "action", "onClicked", "addListener"]) {
        log::warn!("chrome.action.onClicked unavailable");
        return;
    }

    let callback = Closure::<dyn FnMut(JsValue)>::new(move |tab: JsValue| {
        let tab_id = serde_wasm_bindgen::from_value::<ClickedTab>(tab)
            .ok()
            .and_then(|tab| tab.tab_id());
        handler(tab_id);
    });
    add_action_clicked_listener(&callback);
    callback.forget();
}

pub fn listen_storage_changed(mut handler: impl FnMut(&str, &StorageChanges) + 'static) {
    if !has_function(&["chrome", "storage", "onChanged", "addListener"]) {
        log::warn!("chrome.storage.onChanged unavailable");
        return;
    }

    let callback = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
        let area = area.as_string().unwrap_or_default();
        match serde_wasm_bindgen::from_value::<StorageChanges>(changes) {
            Ok(changes) => handler(&area, &changes),
            Err(e) => log::debug!("Ignoring unreadable storage change: {}", e),
        }
    });
    add_storage_changed_listener(&callback);
    callback.forget();
}
