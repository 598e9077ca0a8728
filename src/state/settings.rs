//! User notification preferences
//!
//! Settings are always present (every field defaulted) and only change
//! through a shallow partial merge.

use super::notification::Category;
use crate::errors::HeraldError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock time of day with minute precision, written as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn minute_of_day(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| HeraldError::InvalidTimeOfDay(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = HeraldError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Daily window during which desktop notifications are suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_quiet_start")]
    pub start: TimeOfDay,
    #[serde(default = "default_quiet_end")]
    pub end: TimeOfDay,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: default_quiet_start(),
            end: default_quiet_end(),
        }
    }
}

fn default_quiet_start() -> TimeOfDay {
    TimeOfDay(NaiveTime::MIN + chrono::Duration::hours(22))
}

fn default_quiet_end() -> TimeOfDay {
    TimeOfDay(NaiveTime::MIN + chrono::Duration::hours(8))
}

impl QuietHours {
    /// Whether `now` falls inside the window (both ends inclusive)
    ///
    /// A window whose start is after its end spans midnight.
    pub fn contains(&self, now: TimeOfDay) -> bool {
        let now = now.minute_of_day();
        let start = self.start.minute_of_day();
        let end = self.end.minute_of_day();

        if start <= end {
            now >= start && now <= end
        } else {
            now >= start || now <= end
        }
    }

    /// Whether desktop delivery should be suppressed at `now`
    pub fn is_active(&self, now: TimeOfDay) -> bool {
        self.enabled && self.contains(now)
    }
}

/// Per-category delivery switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryToggles {
    #[serde(default = "default_true")]
    pub order: bool,
    #[serde(default = "default_true")]
    pub payment: bool,
    #[serde(default = "default_true")]
    pub voucher: bool,
    #[serde(default = "default_true")]
    pub account: bool,
    #[serde(default = "default_true")]
    pub promotion: bool,
    #[serde(default = "default_true")]
    pub system: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            order: true,
            payment: true,
            voucher: true,
            account: true,
            promotion: true,
            system: true,
        }
    }
}

impl CategoryToggles {
    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Order => self.order,
            Category::Payment => self.payment,
            Category::Voucher => self.voucher,
            Category::Account => self.account,
            Category::Promotion => self.promotion,
            Category::System => self.system,
        }
    }

    pub fn set(&mut self, category: Category, on: bool) {
        let slot = match category {
            Category::Order => &mut self.order,
            Category::Payment => &mut self.payment,
            Category::Voucher => &mut self.voucher,
            Category::Account => &mut self.account,
            Category::Promotion => &mut self.promotion,
            Category::System => &mut self.system,
        };
        *slot = on;
    }
}

/// Notification preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default = "default_true")]
    pub push: bool,
    #[serde(default)]
    pub sms: bool,
    #[serde(default)]
    pub categories: CategoryToggles,
    #[serde(default)]
    pub quiet_hours: QuietHours,
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub desktop: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            categories: CategoryToggles::default(),
            quiet_hours: QuietHours::default(),
            sound: true,
            desktop: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Partial settings update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryToggles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours: Option<QuietHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Settings {
    /// Shallow merge: nested values (categories, quiet hours) are replaced whole
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.push {
            self.push = v;
        }
        if let Some(v) = patch.sms {
            self.sms = v;
        }
        if let Some(v) = patch.categories {
            self.categories = v;
        }
        if let Some(v) = patch.quiet_hours {
            self.quiet_hours = v;
        }
        if let Some(v) = patch.sound {
            self.sound = v;
        }
        if let Some(v) = patch.desktop {
            self.desktop = v;
        }
    }
}

/// Last-selected inbox filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    Category(Category),
}

impl std::str::FromStr for NotificationFilter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(NotificationFilter::All),
            "unread" => Ok(NotificationFilter::Unread),
            other => other
                .parse::<Category>()
                .map(NotificationFilter::Category)
                .map_err(|_| "filter must be all, unread, or a category name"),
        }
    }
}
