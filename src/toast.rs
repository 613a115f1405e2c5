/// Toast notifications: one active toast at a time, keyed clearing, and
/// two-phase timed dismissal.

use crate::error::ExtensionError;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Length of the exit animation before a toast is detached
pub const EXIT_ANIMATION_MS: u32 = 300;

/// Display time used when the caller gives none
pub const DEFAULT_DURATION_MS: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }

    /// ARIA role and politeness: errors interrupt, everything else waits
    pub fn live_region(&self) -> (&'static str, &'static str) {
        match self {
            ToastKind::Error => ("alert", "assertive"),
            ToastKind::Success | ToastKind::Info => ("status", "polite"),
        }
    }
}

/// Unrecognized kinds are shown as info rather than rejected
impl From<&str> for ToastKind {
    fn from(kind: &str) -> Self {
        match kind {
            "success" => ToastKind::Success,
            "error" => ToastKind::Error,
            _ => ToastKind::Info,
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the document needs to build one toast element
#[derive(Debug, Clone, PartialEq)]
pub struct ToastContent<'a> {
    pub message: &'a str,
    pub kind: ToastKind,
    pub key: Option<&'a str>,
}

/// The page the toasts live in.
///
/// `mount_container` returns the page's toast container, attaching one if
/// the page has none;
/// `detach` removes any element (toast or container) from its parent.
pub trait ToastDocument {
    type Element: Clone;

    /// Insert the animation styles unless already present
    fn ensure_styles(&self) -> Result<(), ExtensionError>;

    fn mount_container(&self) -> Result<Self::Element, ExtensionError>;

    fn create_toast(&self, content: &ToastContent<'_>) -> Result<Self::Element, ExtensionError>;

    fn append(&self, container: &Self::Element, toast: &Self::Element) -> Result<(), ExtensionError>;

    /// Start the exit animation and fade to transparent
    fn begin_exit(&self, toast: &Self::Element);

    fn detach(&self, element: &Self::Element);
}

/// One-shot timers. A cancelled timer never runs its callback.
pub trait TimerHost {
    type Handle;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}

type ToastId = u64;

struct LiveToast<E> {
    id: ToastId,
    key: Option<String>,
    element: E,
}

struct ActiveToast<H> {
    id: ToastId,
    dismiss_timer: Option<H>,
    removal_timer: Option<H>,
}

struct ToastState<E, H> {
    container: Option<E>,
    toasts: Vec<LiveToast<E>>,
    active: Option<ActiveToast<H>>,
    next_id: ToastId,
}

struct Inner<D: ToastDocument, T: TimerHost> {
    document: D,
    timers: T,
    state: RefCell<ToastState<D::Element, T::Handle>>,
}

/// Handle to the toast state of one page. Clones share the same state.
pub struct ToastManager<D: ToastDocument, T: TimerHost> {
    inner: Rc<Inner<D, T>>,
}

impl<D: ToastDocument, T: TimerHost> Clone for ToastManager<D, T> {
    fn clone(&self) -> Self {
        ToastManager {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D, T> ToastManager<D, T>
where
    D: ToastDocument + 'static,
    T: TimerHost + 'static,
{
    pub fn new(document: D, timers: T) -> Self {
        ToastManager {
            inner: Rc::new(Inner {
                document,
                timers,
                state: RefCell::new(ToastState {
                    container: None,
                    toasts: Vec::new(),
                    active: None,
                    next_id: 0,
                }),
            }),
        }
    }

    /// Show a toast, replacing whichever toast is currently active
    pub fn show_toast(&self, message: &str, kind: ToastKind, duration_ms: u32, key: Option<&str>) {
        log::info!("[Notification] {}: {}", kind.as_str().to_uppercase(), message);

        if let Err(e) = self.inner.show(message, kind, duration_ms, key) {
            log::warn!("Unable to show toast: {}", e);
        }
    }

    /// Remove toasts tagged with `key`, or every toast when `key` is `None`
    pub fn clear_toasts(&self, key: Option<&str>) {
        let inner = &self.inner;
        let mut state = inner.state.borrow_mut();

        match key {
            Some(key) => {
                let matching: Vec<ToastId> = state
                    .toasts
                    .iter()
                    .filter(|toast| toast.key.as_deref() == Some(key))
                    .map(|toast| toast.id)
                    .collect();

                for id in matching {
                    if state.active.as_ref().is_some_and(|active| active.id == id) {
                        inner.dismiss_active(&mut state);
                    } else {
                        inner.remove_toast(&mut state, id);
                    }
                }

                inner.remove_container_if_empty(&mut state);
            }
            None => {
                inner.dismiss_active(&mut state);
                for toast in state.toasts.drain(..) {
                    inner.document.detach(&toast.element);
                }
                if let Some(container) = state.container.take() {
                    inner.document.detach(&container);
                }
            }
        }
    }

    /// Number of toasts currently attached to the container
    pub fn toast_count(&self) -> usize {
        self.inner.state.borrow().toasts.len()
    }

    pub fn has_container(&self) -> bool {
        self.inner.state.borrow().container.is_some()
    }

    pub fn has_active_toast(&self) -> bool {
        self.inner.state.borrow().active.is_some()
    }
}

impl<D, T> Inner<D, T>
where
    D: ToastDocument + 'static,
    T: TimerHost + 'static,
{
    fn show(
        self: &Rc<Self>,
        message: &str,
        kind: ToastKind,
        duration_ms: u32,
        key: Option<&str>,
    ) -> Result<(), ExtensionError> {
        self.document.ensure_styles()?;

        let mut state = self.state.borrow_mut();
        self.dismiss_active(&mut state);

        let container = match state.container.clone() {
            Some(container) => container,
            None => {
                let container = self.document.mount_container()?;
                state.container = Some(container.clone());
                container
            }
        };

        let element = match self.build_toast(&container, message, kind, key) {
            Ok(element) => element,
            Err(e) => {
                self.remove_container_if_empty(&mut state);
                return Err(e);
            }
        };

        let id = state.next_id;
        state.next_id += 1;
        state.toasts.push(LiveToast {
            id,
            key: key.map(str::to_string),
            element,
        });

        let weak = Rc::downgrade(self);
        let dismiss_timer = self.timers.schedule(
            duration_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.begin_dismiss(id);
                }
            }),
        );

        state.active = Some(ActiveToast {
            id,
            dismiss_timer: Some(dismiss_timer),
            removal_timer: None,
        });

        Ok(())
    }

    fn build_toast(
        &self,
        container: &D::Element,
        message: &str,
        kind: ToastKind,
        key: Option<&str>,
    ) -> Result<D::Element, ExtensionError> {
        let element = self.document.create_toast(&ToastContent { message, kind, key })?;
        self.document.append(container, &element)?;
        Ok(element)
    }

    /// First timer: animate out, then schedule the detach
    fn begin_dismiss(self: &Rc<Self>, id: ToastId) {
        let mut state = self.state.borrow_mut();

        if let Some(toast) = state.toasts.iter().find(|toast| toast.id == id) {
            self.document.begin_exit(&toast.element);
        }

        let weak: Weak<Self> = Rc::downgrade(self);
        let removal_timer = self.timers.schedule(
            EXIT_ANIMATION_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.finish_removal(id);
                }
            }),
        );

        match state.active.as_mut() {
            Some(active) if active.id == id => {
                active.dismiss_timer = None;
                active.removal_timer = Some(removal_timer);
            }
            _ => self.timers.cancel(removal_timer),
        }
    }

    /// Second timer: detach, release the active slot if still ours
    fn finish_removal(&self, id: ToastId) {
        let mut state = self.state.borrow_mut();

        self.remove_toast(&mut state, id);

        if state.active.as_ref().is_some_and(|active| active.id == id) {
            state.active = None;
        }

        self.remove_container_if_empty(&mut state);
    }

    /// Cancel the active toast's timers and detach it without animation
    fn dismiss_active(&self, state: &mut ToastState<D::Element, T::Handle>) {
        let Some(active) = state.active.take() else {
            return;
        };

        if let Some(timer) = active.dismiss_timer {
            self.timers.cancel(timer);
        }
        if let Some(timer) = active.removal_timer {
            self.timers.cancel(timer);
        }

        self.remove_toast(state, active.id);
    }

    fn remove_toast(&self, state: &mut ToastState<D::Element, T::Handle>, id: ToastId) {
        if let Some(index) = state.toasts.iter().position(|toast| toast.id == id) {
            let toast = state.toasts.remove(index);
            self.document.detach(&toast.element);
        }
    }

    fn remove_container_if_empty(&self, state: &mut ToastState<D::Element, T::Handle>) {
        if state.toasts.is_empty() {
            if let Some(container) = state.container.take() {
                self.document.detach(&container);
            }
        }
    }
}
