/// Background service worker: one coordinator, wired to the chrome events

use crate::chrome::{self, ChromeHost};
use crate::panel::{PanelConfig, PanelCoordinator};
use std::rc::Rc;

pub fn start(config: PanelConfig) {
    let coordinator = Rc::new(PanelCoordinator::new(ChromeHost, config));

    {
        let coordinator = Rc::clone(&coordinator);
        chrome::listen_tab_removed(move |tab_id| coordinator.on_tab_removed(tab_id));
    }

    {
        let coordinator = Rc::clone(&coordinator);
        chrome::listen_storage_changed(move |area, changes| {
            coordinator.on_storage_changed(area, changes)
        });
    }

    {
        let coordinator = Rc::clone(&coordinator);
        chrome::listen_action_clicked(move |tab_id| coordinator.on_action_clicked(tab_id));
    }

    coordinator.start();
    log::info!("Background started");
}
