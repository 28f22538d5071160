//! # vitalis-notify
//!
//! Local notification schedulers for Vitalis.

pub mod local;
pub mod unsupported;

pub use local::{Delivery, LocalScheduler};
pub use unsupported::UnsupportedScheduler;

use std::sync::Arc;
use tokio::sync::broadcast;
use vitalis_core::{
    calendar::CalendarZone, config::NotificationConfig, error::VitalisError,
    traits::NotificationScheduler,
};

/// Build the configured scheduler.
///
/// For the `local` backend the second value receives every delivery; the
/// `none` backend never delivers.
pub fn build(
    config: &NotificationConfig,
    zone: CalendarZone,
) -> Result<(Arc<dyn NotificationScheduler>, Option<broadcast::Receiver<Delivery>>), VitalisError> {
    match config.backend.as_str() {
        "local" => {
            let scheduler = LocalScheduler::new(zone);
            let deliveries = scheduler.subscribe();
            Ok((Arc::new(scheduler), Some(deliveries)))
        }
        "none" => Ok((Arc::new(UnsupportedScheduler), None)),
        other => Err(VitalisError::Config(format!(
            "unsupported notification backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str) -> NotificationConfig {
        NotificationConfig {
            backend: backend.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_build_each_backend() {
        let (local, deliveries) = build(&config("local"), CalendarZone::Local).unwrap();
        assert_eq!(local.name(), "local");
        assert!(local.is_supported());
        assert!(deliveries.is_some());

        let (none, deliveries) = build(&config("none"), CalendarZone::Local).unwrap();
        assert!(!none.is_supported());
        assert!(deliveries.is_none());
    }

    #[test]
    fn test_build_unknown_backend() {
        let result = build(&config("apns"), CalendarZone::Local);
        assert!(matches!(result, Err(VitalisError::Config(_))));
    }
}
