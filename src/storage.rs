/// Display-mode preference as persisted in chrome.storage.local

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Storage key holding the display mode
pub const DISPLAY_MODE_KEY: &str = "displayMode";

/// Storage area the preference lives in
pub const LOCAL_AREA: &str = "local";

/// Whether the toolbar action opens the popup or toggles the side panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    Popup,
    #[default]
    SidePanel,
}

impl DisplayMode {
    /// Anything other than `"popup"` falls back to the side panel,
    /// including a removed or malformed value.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("popup") => DisplayMode::Popup,
            _ => DisplayMode::SidePanel,
        }
    }
}

/// Root storage structure (also the defaults object passed to `get`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default, deserialize_with = "lenient_mode")]
    pub display_mode: DisplayMode,
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<DisplayMode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(DisplayMode::from_value(value.as_ref()))
}

/// One entry of a `storage.onChanged` payload; `oldValue` is ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default)]
    pub new_value: Option<Value>,
}

pub type StorageChanges = HashMap<String, StorageChange>;

/// The new display mode carried by a change notification, if it concerns one
pub fn display_mode_change(area: &str, changes: &StorageChanges) -> Option<DisplayMode> {
    if area != LOCAL_AREA {
        return None;
    }

    changes
        .get(DISPLAY_MODE_KEY)
        .map(|change| DisplayMode::from_value(change.new_value.as_ref()))
}
