use crate::error::VitalisError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable key-value storage: the persistence port.
///
/// Values are opaque strings (the engine stores JSON). Every backend
/// (in-memory, JSON files, SQLite) implements this trait.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Read a key. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, VitalisError>;

    /// Write a key, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), VitalisError>;

    /// Delete a key. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), VitalisError>;

    /// Write several keys as one logical unit.
    ///
    /// The default writes them one after another and stops at the first
    /// failure; backends that can do better override it so that either all
    /// entries land or none do.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), VitalisError> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }
}

/// When and how often a notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Fire once at an absolute instant.
    At { at: DateTime<Utc> },
    /// Fire every `seconds`, starting from when it was scheduled.
    Every { seconds: u64 },
    /// Fire every day at a wall-clock hour and minute.
    Daily { hour: u32, minute: u32 },
}

/// A local notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
}

/// Opaque handle identifying a scheduled notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(pub String);

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local notification scheduler: the delivery port.
///
/// The engine only asks for notifications to be arranged; delivering them
/// is the scheduler's business.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Human-readable scheduler name.
    fn name(&self) -> &str;

    /// Whether the platform can deliver local notifications at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Arrange for a notification to fire according to its trigger.
    async fn schedule(&self, notification: Notification) -> Result<NotificationHandle, VitalisError>;

    /// Cancel a previously scheduled notification. Unknown handles are ignored.
    async fn cancel(&self, _handle: &NotificationHandle) -> Result<(), VitalisError> {
        Ok(())
    }
}
