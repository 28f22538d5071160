//! The reminder record and the enums that classify it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recurrence policy. Only affects how often the notification re-fires;
/// the lifecycle record itself is a single instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    #[default]
    #[serde(rename = "Once")]
    Once,
    #[serde(rename = "Every Hour", alias = "EveryHour")]
    EveryHour,
    #[serde(rename = "Every 2 Hours", alias = "EveryTwoHours")]
    EveryTwoHours,
    #[serde(rename = "Every Day", alias = "EveryDay")]
    EveryDay,
}

impl Repeat {
    /// Label shown next to the reminder.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Once => "Once",
            Self::EveryHour => "Every Hour",
            Self::EveryTwoHours => "Every 2 Hours",
            Self::EveryDay => "Every Day",
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Repeat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "once" => Ok(Self::Once),
            "everyhour" | "hourly" => Ok(Self::EveryHour),
            "everytwohours" | "every2hours" => Ok(Self::EveryTwoHours),
            "everyday" | "daily" => Ok(Self::EveryDay),
            _ => Err(format!("unknown repeat policy: {s}")),
        }
    }
}

/// Lifecycle state of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
    Missed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Missed => "missed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three durable collections partitioning all reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Pending,
    Completed,
    Missed,
}

impl Bucket {
    /// All buckets, in the order views concatenate them.
    pub const ALL: [Bucket; 3] = [Bucket::Pending, Bucket::Completed, Bucket::Missed];

    /// Storage key holding the serialized bucket.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Pending => "reminders",
            Self::Completed => "completedReminders",
            Self::Missed => "missedReminders",
        }
    }

    /// Status every member of this bucket carries.
    pub fn status(&self) -> Status {
        match self {
            Self::Pending => Status::Pending,
            Self::Completed => Status::Completed,
            Self::Missed => Status::Missed,
        }
    }
}

/// View filter over the buckets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Today,
    Missed,
    Completed,
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "missed" => Ok(Self::Missed),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A medication or health reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// When the reminder is due.
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Description, treating an empty string as absent.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// User input for a new reminder. Required fields are optional here so
/// that a missing title or time is a validation error, not a type error.
#[derive(Debug, Clone, Default)]
pub struct NewReminder {
    pub title: String,
    pub description: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub repeat: Repeat,
    pub notifications_enabled: bool,
}

impl NewReminder {
    /// Start a reminder due at `time`, notifications on, repeating once.
    pub fn new(title: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            time: Some(time),
            repeat: Repeat::Once,
            notifications_enabled: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }
}
