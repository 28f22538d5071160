//! Reminder lifecycle: create, reconcile, complete, delete.

use super::{bucket_entries, Created, Reconciliation, ReminderEngine};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use vitalis_core::{
    error::VitalisError,
    reminder::{Bucket, NewReminder, Reminder, Status},
};

/// Buckets to write: the touched ones, or all three after a load-time repair.
fn dirty(touched: &[Bucket], repaired: bool) -> Vec<Bucket> {
    if repaired {
        Bucket::ALL.to_vec()
    } else {
        touched.to_vec()
    }
}

impl ReminderEngine {
    /// Create a pending reminder and, if enabled, request its notification.
    ///
    /// The reminder is persisted before the notification is requested; a
    /// scheduling failure is reported in [`Created::notification`] and never
    /// undoes the creation.
    pub async fn create(&self, input: NewReminder, now: DateTime<Utc>) -> Result<Created, VitalisError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(VitalisError::Validation("title is required".to_string()));
        }
        let time = input
            .time
            .ok_or_else(|| VitalisError::Validation("time is required".to_string()))?;
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let reminder = Reminder {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description,
            time,
            repeat: input.repeat,
            notifications_enabled: input.notifications_enabled,
            status: Status::Pending,
            created_at: now,
        };

        let mut view = self.view.lock().await;
        let (mut buckets, repaired) = self.read_buckets().await?;
        buckets.pending.push(reminder.clone());

        let entries = bucket_entries(&buckets, &dirty(&[Bucket::Pending], repaired))?;
        self.store.set_many(&entries).await?;
        *view = buckets;

        info!(
            "created reminder {} \"{}\" due {} ({})",
            reminder.id, reminder.title, reminder.time, reminder.repeat
        );

        let notification = self.request_notification(&reminder).await;
        Ok(Created {
            reminder,
            notification,
        })
    }

    /// Move overdue pending reminders to missed.
    ///
    /// A reminder due exactly at `now` is not overdue. Completed reminders
    /// are never touched. Writes nothing when no reminder moved.
    pub async fn reconcile(&self, now: DateTime<Utc>) -> Result<Reconciliation, VitalisError> {
        let mut view = self.view.lock().await;
        let (buckets, repaired) = self.read_buckets().await?;
        let (buckets, newly_missed) = buckets.reconcile(now);

        if newly_missed.is_empty() && !repaired {
            debug!("reconcile: nothing overdue");
        } else {
            let entries =
                bucket_entries(&buckets, &dirty(&[Bucket::Pending, Bucket::Missed], repaired))?;
            self.store.set_many(&entries).await?;
            if !newly_missed.is_empty() {
                info!("reconcile: {} reminder(s) missed", newly_missed.len());
            }
        }

        *view = buckets.clone();
        Ok(Reconciliation {
            buckets,
            newly_missed,
        })
    }

    /// Mark a pending or missed reminder as completed.
    ///
    /// Completing an unknown or already completed id is a not-found error.
    pub async fn complete(&self, id: &str) -> Result<Reminder, VitalisError> {
        let mut view = self.view.lock().await;
        let (mut buckets, repaired) = self.read_buckets().await?;

        let (from, mut reminder) = [Bucket::Pending, Bucket::Missed]
            .into_iter()
            .find_map(|b| buckets.take(b, id).map(|r| (b, r)))
            .ok_or_else(|| {
                VitalisError::NotFound(format!("no pending or missed reminder with id {id}"))
            })?;

        reminder.status = Status::Completed;
        buckets.completed.push(reminder.clone());

        let mut entries = bucket_entries(&buckets, &dirty(&[from, Bucket::Completed], repaired))?;
        let released = self.release_handle(id, &mut entries).await?;
        self.store.set_many(&entries).await?;
        *view = buckets;

        info!("completed reminder {id} \"{}\"", reminder.title);
        self.cancel_released(released).await;
        Ok(reminder)
    }

    /// Permanently remove a reminder from whichever bucket holds it.
    ///
    /// Deleting an absent id changes nothing and is not an error.
    pub async fn delete(&self, id: &str) -> Result<Option<Reminder>, VitalisError> {
        let mut view = self.view.lock().await;
        let (mut buckets, repaired) = self.read_buckets().await?;

        let Some(from) = buckets.locate(id) else {
            debug!("delete: no reminder with id {id}");
            return Ok(None);
        };
        let reminder = buckets.take(from, id);

        let mut entries = bucket_entries(&buckets, &dirty(&[from], repaired))?;
        let released = self.release_handle(id, &mut entries).await?;
        self.store.set_many(&entries).await?;
        *view = buckets;

        info!("deleted reminder {id} from {}", from.storage_key());
        self.cancel_released(released).await;
        Ok(reminder)
    }
}
