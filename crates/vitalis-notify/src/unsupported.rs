use async_trait::async_trait;
use vitalis_core::{
    error::VitalisError,
    traits::{Notification, NotificationHandle, NotificationScheduler},
};

/// Scheduler for platforms without local notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedScheduler;

#[async_trait]
impl NotificationScheduler for UnsupportedScheduler {
    fn name(&self) -> &str {
        "none"
    }

    fn is_supported(&self) -> bool {
        false
    }

    async fn schedule(&self, notification: Notification) -> Result<NotificationHandle, VitalisError> {
        Err(VitalisError::Scheduling(format!(
            "local notifications are not supported here (\"{}\")",
            notification.title
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalis_core::traits::Trigger;

    #[tokio::test]
    async fn test_schedule_is_rejected() {
        let scheduler = UnsupportedScheduler;
        assert!(!scheduler.is_supported());
        let result = scheduler
            .schedule(Notification {
                title: "Vitamins".into(),
                body: "Reminder alert!".into(),
                trigger: Trigger::Every { seconds: 3600 },
            })
            .await;
        assert!(matches!(result, Err(VitalisError::Scheduling(_))));
    }
}
