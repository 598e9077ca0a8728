//! Notification and toast records
//!
//! A notification is a persistent inbox entry that stays until it is read
//! and deleted. A toast is an ephemeral overlay message that dismisses
//! itself after a delay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique notification identifier (monotonic within a store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

/// Unique toast identifier (monotonic within a store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Severity of a notification or toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl Severity {
    /// Priority for display ordering (lower = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Success => 2,
            Severity::Info => 3,
        }
    }

    /// Info is the lowest priority and never reaches the desktop
    pub fn is_lowest(&self) -> bool {
        self.priority() >= Severity::Info.priority()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Severity::Success),
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err("type must be one of: success, error, warning, info"),
        }
    }
}

/// Business category a notification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Order,
    Payment,
    Voucher,
    Account,
    Promotion,
    #[default]
    System,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Order,
        Category::Payment,
        Category::Voucher,
        Category::Account,
        Category::Promotion,
        Category::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Order => "order",
            Category::Payment => "payment",
            Category::Voucher => "voucher",
            Category::Account => "account",
            Category::Promotion => "promotion",
            Category::System => "system",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or("category must be one of: order, payment, voucher, account, promotion, system")
    }
}

/// User action attached to a notification or toast
///
/// `id` is what the front end dispatches when the action is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub label: String,
}

/// Caller-supplied fields for a new notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(rename = "type", default)]
    pub kind: Severity,
    #[serde(default)]
    pub category: Category,
    pub title: String,
    pub message: String,
    /// Auto-close delay in milliseconds
    #[serde(default)]
    pub auto_close: Option<u64>,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl NotificationData {
    pub fn new(kind: Severity, category: Category, title: &str, message: &str) -> Self {
        Self {
            kind,
            category,
            title: title.to_string(),
            message: message.to_string(),
            auto_close: None,
            persistent: false,
            actions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.message.trim().is_empty() {
            return Err("message is required");
        }
        Ok(())
    }
}

/// A stored notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: Severity,
    pub category: Category,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub auto_close: Option<u64>,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Notification {
    pub fn from_data(
        id: NotificationId,
        data: NotificationData,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind: data.kind,
            category: data.category,
            title: data.title,
            message: data.message,
            created_at,
            read: false,
            auto_close: data.auto_close,
            persistent: data.persistent,
            actions: data.actions,
        }
    }

    /// Delay after which the store removes this entry on its own
    pub fn expiry_ms(&self) -> Option<u64> {
        if self.persistent {
            None
        } else {
            self.auto_close
        }
    }
}

/// Caller-supplied fields for a new toast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastData {
    #[serde(rename = "type", default)]
    pub kind: Severity,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    /// Auto-close delay in milliseconds (defaults per severity)
    #[serde(default)]
    pub auto_close: Option<u64>,
    /// Keep on screen until hidden explicitly
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ToastData {
    pub fn new(kind: Severity, message: &str) -> Self {
        Self {
            kind,
            title: None,
            message: message.to_string(),
            auto_close: None,
            persistent: false,
            actions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.message.trim().is_empty() {
            return Err("message is required");
        }
        Ok(())
    }
}

/// Optional overrides for the show_* toast wrappers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastOptions {
    pub title: Option<String>,
    pub auto_close: Option<u64>,
    pub persistent: bool,
    pub actions: Vec<Action>,
}

/// A visible toast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    #[serde(rename = "type")]
    pub kind: Severity,
    pub title: Option<String>,
    pub message: String,
    /// None means the toast stays until hidden
    pub auto_close: Option<u64>,
    pub actions: Vec<Action>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_data_deserialize_defaults() {
        let json = r#"{"type": "success", "title": "A", "message": "B", "category": "order"}"#;
        let data: NotificationData = serde_json::from_str(json).unwrap();
        assert_eq!(data.kind, Severity::Success);
        assert_eq!(data.category, Category::Order);
        assert_eq!(data.auto_close, None);
        assert!(!data.persistent);
        assert!(data.actions.is_empty());
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_notification_data_validate_empty_title() {
        let data = NotificationData::new(Severity::Info, Category::System, "  ", "body");
        assert_eq!(data.validate(), Err("title is required"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r#"{"type": "info", "title": "A", "message": "B", "category": "weather"}"#;
        assert!(serde_json::from_str::<NotificationData>(json).is_err());
    }

    #[test]
    fn test_expiry_ignores_auto_close_when_persistent() {
        let mut data = NotificationData::new(Severity::Warning, Category::Payment, "t", "m");
        data.auto_close = Some(3000);
        let n = Notification::from_data(NotificationId(1), data.clone(), Utc::now());
        assert_eq!(n.expiry_ms(), Some(3000));

        data.persistent = true;
        let n = Notification::from_data(NotificationId(2), data, Utc::now());
        assert_eq!(n.expiry_ms(), None);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
        assert!(Severity::Info.is_lowest());
        assert!(!Severity::Warning.is_lowest());
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }
}
