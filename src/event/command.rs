//! Command protocol spoken over the daemon socket
//!
//! One JSON object per connection, tagged by `"command"`:
//!
//! ```json
//! {"command": "add_notification", "type": "success", "category": "order",
//!  "title": "Order shipped", "message": "Order #1042 is on its way"}
//! {"command": "mark_as_read", "id": 12}
//! {"command": "show_toast", "type": "error", "message": "network down"}
//! {"command": "update_settings", "quiet_hours": {"enabled": true, "start": "22:00", "end": "08:00"}}
//! ```

use crate::state::{
    NotificationData, NotificationFilter, NotificationId, SettingsPatch, ToastData, ToastId,
};
use serde::{Deserialize, Serialize};

/// A state mutation requested by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddNotification(NotificationData),
    MarkAsRead { id: NotificationId },
    MarkAllAsRead,
    RemoveNotification { id: NotificationId },
    ClearNotifications,
    ShowToast(ToastData),
    HideToast { id: ToastId },
    ClearToasts,
    UpdateSettings(SettingsPatch),
    SetFilter { filter: NotificationFilter },
    RequestPermission,
    Sync,
}

impl Command {
    /// Validate required fields before the command reaches the store
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Command::AddNotification(data) => data.validate(),
            Command::ShowToast(data) => data.validate(),
            Command::UpdateSettings(patch) if patch.is_empty() => {
                Err("update_settings needs at least one field")
            }
            _ => Ok(()),
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddNotification(_) => "add_notification",
            Command::MarkAsRead { .. } => "mark_as_read",
            Command::MarkAllAsRead => "mark_all_as_read",
            Command::RemoveNotification { .. } => "remove_notification",
            Command::ClearNotifications => "clear_notifications",
            Command::ShowToast(_) => "show_toast",
            Command::HideToast { .. } => "hide_toast",
            Command::ClearToasts => "clear_toasts",
            Command::UpdateSettings(_) => "update_settings",
            Command::SetFilter { .. } => "set_filter",
            Command::RequestPermission => "request_permission",
            Command::Sync => "sync",
        }
    }
}
