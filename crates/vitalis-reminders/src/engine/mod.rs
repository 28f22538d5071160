//! The stateful reminder engine.
//!
//! Split into focused submodules:
//! - `lifecycle` — create, reconcile, complete, delete
//! - `notify` — notification requests and handle bookkeeping
//!
//! Every mutating operation holds the view lock for its whole
//! read-modify-write, reads the buckets fresh from storage, writes all
//! touched keys in one `set_many`, and only then replaces the in-memory
//! view. A failed write leaves the view as it was.

mod lifecycle;
mod notify;


use crate::buckets::Buckets;
use crate::views::{self, Counts};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use vitalis_core::{
    calendar::CalendarZone,
    config::Config,
    error::VitalisError,
    reminder::{Bucket, Filter, Reminder},
    traits::{KeyValueStore, NotificationHandle, NotificationScheduler},
};

/// Storage key for the reminder id → notification handle map.
pub const HANDLES_KEY: &str = "notificationHandles";

/// Engine tuning taken from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub zone: CalendarZone,
    /// Notification body for reminders without a description.
    pub default_body: String,
    /// Cancel tracked notifications on complete/delete.
    pub cancel_on_finish: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            zone: CalendarZone::Local,
            default_body: "Reminder alert!".to_string(),
            cancel_on_finish: true,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Result<Self, VitalisError> {
        Ok(Self {
            zone: config.calendar.zone()?,
            default_body: config.notifications.default_body.clone(),
            cancel_on_finish: config.notifications.cancel_on_finish,
        })
    }
}

/// What happened to the notification request of a new reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Scheduled(NotificationHandle),
    /// The reminder has notifications turned off.
    Disabled,
    /// The platform cannot deliver local notifications.
    Unsupported,
    /// The scheduler refused; the reminder was still created.
    Failed(String),
}

/// Result of `create`.
#[derive(Debug, Clone)]
pub struct Created {
    pub reminder: Reminder,
    pub notification: NotificationOutcome,
}

/// Result of `reconcile`.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub buckets: Buckets,
    /// Ids that left the pending bucket in this pass.
    pub newly_missed: Vec<String>,
}

/// Owns the reminder buckets and keeps them persisted.
pub struct ReminderEngine {
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    settings: EngineSettings,
    view: Mutex<Buckets>,
}

impl ReminderEngine {
    /// Create an engine with an empty view. Call [`load`](Self::load) before
    /// rendering anything.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn NotificationScheduler>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            scheduler,
            settings,
            view: Mutex::new(Buckets::default()),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Read all buckets from storage into the view.
    pub async fn load(&self) -> Result<Buckets, VitalisError> {
        let mut view = self.view.lock().await;
        let (buckets, _) = self.read_buckets().await?;
        info!(
            "loaded reminders from {}: {} pending, {} completed, {} missed",
            self.store.name(),
            buckets.pending.len(),
            buckets.completed.len(),
            buckets.missed.len()
        );
        *view = buckets.clone();
        Ok(buckets)
    }

    /// Snapshot of all three buckets.
    pub async fn buckets(&self) -> Buckets {
        self.view.lock().await.clone()
    }

    /// Snapshot of one bucket.
    pub async fn bucket(&self, bucket: Bucket) -> Vec<Reminder> {
        self.view.lock().await.get(bucket).clone()
    }

    /// Reminders matching `filter`, sorted by due time.
    pub async fn list(&self, filter: Filter, now: DateTime<Utc>) -> Vec<Reminder> {
        let view = self.view.lock().await;
        views::list_filtered(&view, filter, now, &self.settings.zone)
    }

    /// Counters consistent with [`list`](Self::list).
    pub async fn counts(&self, now: DateTime<Utc>) -> Counts {
        let view = self.view.lock().await;
        views::counts(&view, now, &self.settings.zone)
    }

    // --- persistence helpers ---

    /// Read and normalize all buckets. The flag reports a load-time repair.
    async fn read_buckets(&self) -> Result<(Buckets, bool), VitalisError> {
        let raw = Buckets {
            pending: self.read_list(Bucket::Pending).await?,
            completed: self.read_list(Bucket::Completed).await?,
            missed: self.read_list(Bucket::Missed).await?,
        };
        Ok(raw.normalize())
    }

    async fn read_list(&self, bucket: Bucket) -> Result<Vec<Reminder>, VitalisError> {
        let key = bucket.storage_key();
        match self.store.get(key).await? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map_err(|e| VitalisError::Storage(format!("corrupt bucket {key}: {e}"))),
            _ => Ok(Vec::new()),
        }
    }

    async fn read_handles(&self) -> Result<BTreeMap<String, NotificationHandle>, VitalisError> {
        match self.store.get(HANDLES_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map_err(|e| VitalisError::Storage(format!("corrupt {HANDLES_KEY}: {e}"))),
            _ => Ok(BTreeMap::new()),
        }
    }
}

/// Serialize the listed buckets into `set_many` entries.
///
/// Entries come in completed, missed, pending order: a reminder's destination
/// bucket is written before its source, so a write that stops halfway leaves
/// a duplicate that [`Buckets::normalize`] resolves, never a lost reminder.
fn bucket_entries(
    buckets: &Buckets,
    which: &[Bucket],
) -> Result<Vec<(&'static str, String)>, VitalisError> {
    [Bucket::Completed, Bucket::Missed, Bucket::Pending]
        .into_iter()
        .filter(|b| which.contains(b))
        .map(|b| -> Result<(&'static str, String), VitalisError> {
            Ok((b.storage_key(), serde_json::to_string(buckets.get(b))?))
        })
        .collect()
}
