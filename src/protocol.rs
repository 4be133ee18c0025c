/// Messages exchanged between the background, content and popup contexts
use serde::{Deserialize, Serialize};

use crate::menu::OptionId;
use crate::tab_data::TabId;

/// Requests the background sends to a tab's page inspector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InspectorRequest {
    GetOpenGraphTitle,
    GetFormattedLink,
    GetSelection,
}

/// Messages arriving at the background over `runtime.onMessage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeMessage {
    /// Pushed by the page inspector; the tab id comes from the sender
    SelectionChanged { selection: String },
    #[serde(rename_all = "camelCase")]
    GetLinkOptions { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    CopyLink { tab_id: TabId, option_id: OptionId },
}

/// One menu item as shown in the context menu and the popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: OptionId,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inspector_request_tags() {
        assert_eq!(
            serde_json::to_value(InspectorRequest::GetOpenGraphTitle).unwrap(),
            json!({"action": "getOpenGraphTitle"})
        );
        assert_eq!(
            serde_json::to_value(InspectorRequest::GetFormattedLink).unwrap(),
            json!({"action": "getFormattedLink"})
        );
        assert_eq!(
            serde_json::from_value::<InspectorRequest>(json!({"action": "getSelection"})).unwrap(),
            InspectorRequest::GetSelection
        );
    }

    #[test]
    fn test_selection_changed_message() {
        let message: RuntimeMessage =
            serde_json::from_value(json!({"action": "selectionChanged", "selection": "hello"}))
                .unwrap();

        assert_eq!(
            message,
            RuntimeMessage::SelectionChanged {
                selection: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_popup_messages() {
        let get: RuntimeMessage =
            serde_json::from_value(json!({"action": "getLinkOptions", "tabId": 5})).unwrap();
        assert_eq!(get, RuntimeMessage::GetLinkOptions { tab_id: 5 });

        let copy = RuntimeMessage::CopyLink {
            tab_id: 5,
            option_id: OptionId::CopyTitle,
        };
        assert_eq!(
            serde_json::to_value(&copy).unwrap(),
            json!({"action": "copyLink", "tabId": 5, "optionId": "copyTitle"})
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = serde_json::from_value::<RuntimeMessage>(json!({"action": "reboot"}));
        assert!(result.is_err());
    }
}
