//! Notification requests and the reminder → handle bookkeeping.

use super::{NotificationOutcome, ReminderEngine, HANDLES_KEY};
use crate::trigger::trigger_for;
use tracing::{debug, info, warn};
use vitalis_core::{
    error::VitalisError,
    reminder::{Reminder, Repeat},
    traits::{Notification, NotificationHandle},
};

impl ReminderEngine {
    /// Ask the scheduler for the reminder's notification and remember the
    /// handle. Never fails: every problem becomes a degraded outcome.
    pub(super) async fn request_notification(&self, reminder: &Reminder) -> NotificationOutcome {
        if !reminder.notifications_enabled {
            return NotificationOutcome::Disabled;
        }
        if !self.scheduler.is_supported() {
            debug!(
                "scheduler {} cannot deliver local notifications, skipping {}",
                self.scheduler.name(),
                reminder.id
            );
            return NotificationOutcome::Unsupported;
        }

        let notification = Notification {
            title: reminder.title.clone(),
            body: reminder
                .description()
                .map(str::to_string)
                .unwrap_or_else(|| self.settings.default_body.clone()),
            trigger: trigger_for(reminder, &self.settings.zone),
        };

        match self.scheduler.schedule(notification).await {
            Ok(handle) => {
                info!("scheduled notification {handle} for reminder {}", reminder.id);
                if let Err(e) = self.record_handle(&reminder.id, &handle).await {
                    warn!("notification {handle} scheduled but not recorded: {e}");
                }
                NotificationOutcome::Scheduled(handle)
            }
            Err(e) => {
                warn!("failed to schedule notification for {}: {e}", reminder.id);
                NotificationOutcome::Failed(e.to_string())
            }
        }
    }

    /// Request notifications again for every reminder that should still
    /// fire: pending reminders, and missed ones that repeat. Used by hosts
    /// whose scheduler forgets armed notifications when the process exits.
    /// Holds the view lock throughout, so no reminder finishes between being
    /// picked and having its handle recorded. Returns how many were scheduled.
    pub async fn rearm(&self) -> usize {
        let view = self.view.lock().await;
        let due = view.pending.iter().chain(
            view.missed
                .iter()
                .filter(|r| r.repeat != Repeat::Once),
        );

        let mut armed = 0;
        for reminder in due {
            if let NotificationOutcome::Scheduled(_) = self.request_notification(reminder).await {
                armed += 1;
            }
        }
        info!("re-armed {armed} notification(s)");
        armed
    }

    async fn record_handle(&self, id: &str, handle: &NotificationHandle) -> Result<(), VitalisError> {
        let mut handles = self.read_handles().await?;
        handles.insert(id.to_string(), handle.clone());
        self.store
            .set(HANDLES_KEY, &serde_json::to_string(&handles)?)
            .await
    }

    /// Drop the tracked handle of a finished reminder, adding the updated map
    /// to the operation's write unit. Returns the handle to cancel after the
    /// write succeeded.
    pub(super) async fn release_handle(
        &self,
        id: &str,
        entries: &mut Vec<(&'static str, String)>,
    ) -> Result<Option<NotificationHandle>, VitalisError> {
        let mut handles = self.read_handles().await?;
        let Some(handle) = handles.remove(id) else {
            return Ok(None);
        };
        entries.push((HANDLES_KEY, serde_json::to_string(&handles)?));
        Ok(Some(handle))
    }

    pub(super) async fn cancel_released(&self, handle: Option<NotificationHandle>) {
        let Some(handle) = handle else {
            return;
        };
        if !self.settings.cancel_on_finish {
            debug!("leaving notification {handle} armed");
            return;
        }
        match self.scheduler.cancel(&handle).await {
            Ok(()) => debug!("cancelled notification {handle}"),
            Err(e) => warn!("failed to cancel notification {handle}: {e}"),
        }
    }
}
