/// Tab data as delivered by chrome.tabs events
use serde::Deserialize;

/// Host-assigned tab identifier
pub type TabId = i32;

/// The tab handed to `action.onClicked`; only the id matters here
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClickedTab {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl ClickedTab {
    /// Resolve the tab id; non-integer or missing ids resolve to `None`
    pub fn tab_id(&self) -> Option<TabId> {
        self.id
            .as_ref()
            .and_then(|id| id.as_i64())
            .and_then(|id| TabId::try_from(id).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tab_id_present() {
        let tab: ClickedTab = serde_json::from_value(json!({
            "id": 42,
            "url": "https://github.com",
            "pinned": false
        }))
        .unwrap();

        assert_eq!(tab.tab_id(), Some(42));
    }

    #[test]
    fn test_tab_id_missing() {
        let tab: ClickedTab = serde_json::from_value(json!({ "url": "chrome://newtab" })).unwrap();
        assert_eq!(tab.tab_id(), None);
    }

    #[test]
    fn test_tab_id_not_a_number() {
        let tab: ClickedTab = serde_json::from_value(json!({ "id": "7" })).unwrap();
        assert_eq!(tab.tab_id(), None);

        let tab: ClickedTab = serde_json::from_value(json!({ "id": 1.5 })).unwrap();
        assert_eq!(tab.tab_id(), None);
    }

    #[test]
    fn test_tab_id_out_of_range() {
        let tab: ClickedTab = serde_json::from_value(json!({ "id": 9_999_999_999i64 })).unwrap();
        assert_eq!(tab.tab_id(), None);
    }
}
