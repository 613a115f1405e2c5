/// Browser implementations of the toast document and timers

use crate::error::ExtensionError;
use crate::toast::{TimerHost, ToastContent, ToastDocument, ToastKind};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

pub const CONTAINER_ID: &str = "scrum-helper-toast-container";
pub const STYLE_ID: &str = "scrum-helper-toast-styles";
pub const KEY_ATTRIBUTE: &str = "data-toast-key";

const KEYFRAMES: &str = "
@keyframes toast-in {
    from { opacity: 0; transform: translateY(-20px) scale(0.9); }
    to { opacity: 1; transform: translateY(0) scale(1); }
}
@keyframes toast-out {
    from { opacity: 1; transform: translateY(0) scale(1); }
    to { opacity: 0; transform: scale(0.95); }
}
";

const CONTAINER_STYLE: &str = "position: fixed; top: 24px; left: 50%; transform: translateX(-50%); z-index: 10000; display: flex; flex-direction: column; gap: 8px; pointer-events: none;";

const EXIT_ANIMATION: &str = "toast-out 0.3s cubic-bezier(0.6, -0.28, 0.735, 0.045)";

fn toast_style(kind: ToastKind) -> String {
    let background = match kind {
        ToastKind::Success => "#10b981",
        ToastKind::Error => "#dc2626",
        ToastKind::Info => "#3b82f6",
    };

    format!(
        "background: {}; color: white; padding: 12px 20px; border-radius: 12px; font-weight: 600; font-size: 14px; box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.1), 0 4px 6px -2px rgba(0, 0, 0, 0.05); display: flex; align-items: center; gap: 10px; pointer-events: auto; animation: toast-in 0.3s cubic-bezier(0.18, 0.89, 0.32, 1.28); min-width: 280px; max-width: 90vw;",
        background
    )
}

fn icon_class(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "fa-check-circle",
        ToastKind::Error => "fa-exclamation-circle",
        ToastKind::Info => "fa-info-circle",
    }
}

/// The document of the current window
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDocument;

impl WebDocument {
    fn document(&self) -> Result<Document, ExtensionError> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ExtensionError::Dom("no document available".to_string()))
    }

    fn create(&self, document: &Document, tag: &str) -> Result<HtmlElement, ExtensionError> {
        document
            .create_element(tag)
            .map_err(|e| ExtensionError::dom("createElement", e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| ExtensionError::Dom(format!("<{}> is not an HTML element", tag)))
    }
}

fn set_attribute(element: &HtmlElement, name: &str, value: &str) -> Result<(), ExtensionError> {
    element
        .set_attribute(name, value)
        .map_err(|e| ExtensionError::dom("setAttribute", e))
}

impl ToastDocument for WebDocument {
    type Element = HtmlElement;

    fn ensure_styles(&self) -> Result<(), ExtensionError> {
        let document = self.document()?;
        if document.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }

        let style = self.create(&document, "style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(KEYFRAMES));

        let head = document
            .head()
            .ok_or_else(|| ExtensionError::Dom("document has no <head>".to_string()))?;
        head.append_child(&style)
            .map_err(|e| ExtensionError::dom("append style", e))?;
        Ok(())
    }

    /// Reuses a container already in the page so that several managers on
    /// one document still render into a single stack.
    fn mount_container(&self) -> Result<HtmlElement, ExtensionError> {
        let document = self.document()?;
        if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
            if let Ok(existing) = existing.dyn_into::<HtmlElement>() {
                return Ok(existing);
            }
        }

        let container = self.create(&document, "div")?;
        container.set_id(CONTAINER_ID);
        container.style().set_css_text(CONTAINER_STYLE);

        let body = document
            .body()
            .ok_or_else(|| ExtensionError::Dom("document has no <body>".to_string()))?;
        body.append_child(&container)
            .map_err(|e| ExtensionError::dom("append container", e))?;
        Ok(container)
    }

    fn create_toast(&self, content: &ToastContent<'_>) -> Result<HtmlElement, ExtensionError> {
        let document = self.document()?;
        let toast = self.create(&document, "div")?;
        toast.set_class_name(&format!("scrum-toast scrum-toast-{}", content.kind));
        toast.style().set_css_text(&toast_style(content.kind));

        let (role, live) = content.kind.live_region();
        set_attribute(&toast, "role", role)?;
        set_attribute(&toast, "aria-live", live)?;
        set_attribute(&toast, "aria-atomic", "true")?;
        if let Some(key) = content.key {
            set_attribute(&toast, KEY_ATTRIBUTE, key)?;
        }

        let icon = self.create(&document, "i")?;
        icon.set_class_name(&format!("fa {}", icon_class(content.kind)));
        set_attribute(&icon, "aria-hidden", "true")?;

        // Text node, never markup
        let text = self.create(&document, "span")?;
        text.set_text_content(Some(content.message));

        toast
            .append_child(&icon)
            .and_then(|_| toast.append_child(&text))
            .map_err(|e| ExtensionError::dom("build toast", e))?;
        Ok(toast)
    }

    fn append(&self, container: &HtmlElement, toast: &HtmlElement) -> Result<(), ExtensionError> {
        container
            .append_child(toast)
            .map(|_| ())
            .map_err(|e| ExtensionError::dom("append toast", e))
    }

    fn begin_exit(&self, toast: &HtmlElement) {
        let style = toast.style();
        if let Err(e) = style
            .set_property("animation", EXIT_ANIMATION)
            .and_then(|_| style.set_property("opacity", "0"))
        {
            log::debug!("Toast exit animation not applied: {:?}", e);
        }
    }

    fn detach(&self, element: &HtmlElement) {
        element.remove();
    }
}

/// `setTimeout` through gloo; dropping the handle clears the timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimers;

impl TimerHost for BrowserTimers {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, callback)
    }

    fn cancel(&self, handle: Timeout) {
        drop(handle);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::toast::ToastManager;
    use crate::NotificationSystem;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_toast_markup() {
        let toasts = ToastManager::new(WebDocument, BrowserTimers);

        toasts.show_toast("<b>Saved</b>", ToastKind::Error, 5000, Some("a\"]b"));

        let container = document().get_element_by_id(CONTAINER_ID).unwrap();
        assert_eq!(container.child_element_count(), 1);

        let toast = container.first_element_child().unwrap();
        assert_eq!(toast.get_attribute("role").as_deref(), Some("alert"));
        assert_eq!(toast.get_attribute("aria-live").as_deref(), Some("assertive"));
        assert_eq!(toast.get_attribute("aria-atomic").as_deref(), Some("true"));
        assert_eq!(toast.get_attribute(KEY_ATTRIBUTE).as_deref(), Some("a\"]b"));
        assert_eq!(toast.text_content().unwrap().trim(), "<b>Saved</b>");
        assert!(toast.query_selector("b").unwrap().is_none());

        toasts.clear_toasts(None);
        assert!(document().get_element_by_id(CONTAINER_ID).is_none());
    }

    #[wasm_bindgen_test]
    fn test_styles_inserted_once() {
        let toasts = ToastManager::new(WebDocument, BrowserTimers);

        toasts.show_toast("one", ToastKind::Info, 5000, None);
        toasts.show_toast("two", ToastKind::Success, 5000, None);

        let styles = document()
            .query_selector_all(&format!("#{}", STYLE_ID))
            .unwrap();
        assert_eq!(styles.length(), 1);

        toasts.clear_toasts(None);
    }

    fn only_toast() -> web_sys::Element {
        let container = document().get_element_by_id(CONTAINER_ID).unwrap();
        assert_eq!(container.child_element_count(), 1);
        container.first_element_child().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_notification_system_defaults_to_info() {
        let notifications = NotificationSystem::new();

        notifications.show_toast("x", None, None, None);
        let toast = only_toast();
        assert!(toast.class_list().contains("scrum-toast-info"));
        assert_eq!(toast.get_attribute("role").as_deref(), Some("status"));

        notifications.show_toast("y", Some("bogus".into()), None, None);
        let toast = only_toast();
        assert!(toast.class_list().contains("scrum-toast-info"));
        assert_eq!(toast.get_attribute("role").as_deref(), Some("status"));

        notifications.clear_toasts(None);
        assert!(document().get_element_by_id(CONTAINER_ID).is_none());
    }

    #[wasm_bindgen_test]
    fn test_managers_share_one_container() {
        let first = ToastManager::new(WebDocument, BrowserTimers);
        let second = ToastManager::new(WebDocument, BrowserTimers);

        first.show_toast("one", ToastKind::Info, 5000, None);
        second.show_toast("two", ToastKind::Info, 5000, None);

        let containers = document()
            .query_selector_all(&format!("#{}", CONTAINER_ID))
            .unwrap();
        assert_eq!(containers.length(), 1);

        second.clear_toasts(None);
        first.clear_toasts(None);
        assert!(document().get_element_by_id(CONTAINER_ID).is_none());
    }
}
