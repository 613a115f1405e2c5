/// Per-tab side panel coordination
///
/// The host offers no way to ask whether the side panel is showing, so
/// `open_by_tab` shadows the last command issued for each tab. Opening
/// reconciles to closed on any rejection; closing is never verified.

use crate::error::ExtensionError;
use crate::storage::{display_mode_change, DisplayMode, StorageChanges};
use crate::tab_data::TabId;
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A host API call already issued; resolves when the host settles it
pub type HostCall = LocalBoxFuture<'static, Result<(), ExtensionError>>;

/// Options for `sidePanel.setOptions`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOptions {
    pub tab_id: TabId,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Browser surface the coordinator drives.
///
/// Every call is issued synchronously; the returned future only reports
/// how the host settled it. Optional capabilities return `None` when the
/// host lacks them.
pub trait PanelHost {
    fn supports_side_panel(&self) -> bool;

    fn set_popup(&self, popup: &str) -> HostCall;

    fn open_panel(&self, tab_id: TabId) -> HostCall;

    fn close_panel(&self, tab_id: TabId) -> Option<HostCall>;

    fn set_panel_options(&self, options: &PanelOptions) -> Option<HostCall>;

    fn load_display_mode(&self) -> LocalBoxFuture<'static, Result<DisplayMode, ExtensionError>>;

    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    /// Static popup bound to the action in popup mode
    pub popup_path: String,
    /// Document shown in the side panel
    pub panel_path: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            popup_path: "popup.html".to_string(),
            panel_path: "popup.html".to_string(),
        }
    }
}

pub struct PanelCoordinator<H: PanelHost> {
    host: Rc<H>,
    config: PanelConfig,
    open_by_tab: Rc<RefCell<HashMap<TabId, bool>>>,
}

impl<H: PanelHost + 'static> PanelCoordinator<H> {
    pub fn new(host: H, config: PanelConfig) -> Self {
        PanelCoordinator {
            host: Rc::new(host),
            config,
            open_by_tab: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Read the stored preference and apply it once
    pub fn start(&self) {
        let host = Rc::clone(&self.host);
        let popup_path = self.config.popup_path.clone();
        let load = self.host.load_display_mode();

        self.host.spawn(Box::pin(async move {
            let mode = load.await.unwrap_or_else(|e| {
                log::warn!("Failed to read display mode, using default: {}", e);
                DisplayMode::default()
            });
            bind_popup(&*host, &popup_path, mode);
        }));
    }

    pub fn apply_display_mode(&self, mode: DisplayMode) {
        bind_popup(&*self.host, &self.config.popup_path, mode);
    }

    pub fn on_storage_changed(&self, area: &str, changes: &StorageChanges) {
        if let Some(mode) = display_mode_change(area, changes) {
            self.apply_display_mode(mode);
        }
    }

    pub fn on_tab_removed(&self, tab_id: TabId) {
        self.open_by_tab.borrow_mut().remove(&tab_id);
    }

    /// Toggle the side panel for the clicked tab
    pub fn on_action_clicked(&self, tab_id: Option<TabId>) {
        if !self.host.supports_side_panel() {
            log::debug!("Side panel unsupported; ignoring action click");
            return;
        }

        let Some(tab_id) = tab_id else {
            return;
        };

        if self.is_open(tab_id) {
            self.close(tab_id);
        } else {
            self.open(tab_id);
        }
    }

    /// Last recorded state for a tab (absent means closed)
    pub fn is_open(&self, tab_id: TabId) -> bool {
        self.open_by_tab.borrow().get(&tab_id).copied().unwrap_or(false)
    }

    pub fn is_tracked(&self, tab_id: TabId) -> bool {
        self.open_by_tab.borrow().contains_key(&tab_id)
    }

    fn close(&self, tab_id: TabId) {
        let call = self.host.close_panel(tab_id).or_else(|| {
            self.host.set_panel_options(&PanelOptions {
                tab_id,
                enabled: false,
                path: None,
            })
        });

        match call {
            Some(call) => self.fire_and_forget("close", call),
            None => log::debug!("No way to close the side panel for tab {}", tab_id),
        }

        self.open_by_tab.borrow_mut().insert(tab_id, false);
    }

    fn open(&self, tab_id: TabId) {
        self.open_by_tab.borrow_mut().insert(tab_id, false);

        let options = PanelOptions {
            tab_id,
            enabled: true,
            path: Some(self.config.panel_path.clone()),
        };
        if let Some(call) = self.host.set_panel_options(&options) {
            self.fire_and_forget("setOptions", call);
        }

        let call = self.host.open_panel(tab_id);
        let open_by_tab = Rc::clone(&self.open_by_tab);

        self.host.spawn(Box::pin(async move {
            let opened = match call.await {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("Side panel open failed for tab {}: {}", tab_id, e);
                    false
                }
            };

            // The tab may have closed while the open was pending
            if let Some(flag) = open_by_tab.borrow_mut().get_mut(&tab_id) {
                *flag = opened;
            }
        }));
    }

    fn fire_and_forget(&self, what: &'static str, call: HostCall) {
        self.host.spawn(Box::pin(async move {
            if let Err(e) = call.await {
                log::debug!("Ignoring side panel {} failure: {}", what, e);
            }
        }));
    }
}

fn bind_popup<H: PanelHost>(host: &H, popup_path: &str, mode: DisplayMode) {
    let popup = match mode {
        DisplayMode::Popup => popup_path,
        DisplayMode::SidePanel => "",
    };

    log::info!("Applying display mode {:?}", mode);

    let call = host.set_popup(popup);
    host.spawn(Box::pin(async move {
        if let Err(e) = call.await {
            log::warn!("Failed to bind action popup: {}", e);
        }
    }));
}
