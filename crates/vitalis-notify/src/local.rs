//! In-process scheduler: one tokio task per armed notification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vitalis_core::{
    calendar::CalendarZone,
    error::VitalisError,
    traits::{Notification, NotificationHandle, NotificationScheduler, Trigger},
};

/// A notification that fired.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub handle: NotificationHandle,
    pub title: String,
    pub body: String,
    pub fired_at: DateTime<Utc>,
}

/// Fires notifications from tokio timers inside this process.
///
/// Deliveries are logged and broadcast to subscribers. Armed timers die
/// with the process.
pub struct LocalScheduler {
    zone: CalendarZone,
    armed: Mutex<HashMap<String, JoinHandle<()>>>,
    deliveries: broadcast::Sender<Delivery>,
}

impl LocalScheduler {
    pub fn new(zone: CalendarZone) -> Self {
        let (deliveries, _) = broadcast::channel(64);
        Self {
            zone,
            armed: Mutex::new(HashMap::new()),
            deliveries,
        }
    }

    /// Receive every delivery from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.deliveries.subscribe()
    }

    /// Number of notifications still waiting to fire (or recurring).
    pub fn armed_count(&self) -> usize {
        match self.armed.lock() {
            Ok(armed) => armed.values().filter(|h| !h.is_finished()).count(),
            Err(_) => 0,
        }
    }

    fn arm(&self, id: String, task: JoinHandle<()>) -> Result<(), VitalisError> {
        let mut armed = self
            .armed
            .lock()
            .map_err(|_| VitalisError::Scheduling("scheduler state poisoned".to_string()))?;
        armed.retain(|_, h| !h.is_finished());
        armed.insert(id, task);
        Ok(())
    }
}

impl Drop for LocalScheduler {
    fn drop(&mut self) {
        if let Ok(armed) = self.armed.get_mut() {
            for (_, task) in armed.drain() {
                task.abort();
            }
        }
    }
}

fn validate(trigger: &Trigger) -> Result<(), VitalisError> {
    match *trigger {
        Trigger::At { .. } => Ok(()),
        Trigger::Every { seconds: 0 } => Err(VitalisError::Scheduling(
            "recurring interval must be at least one second".to_string(),
        )),
        Trigger::Every { .. } => Ok(()),
        Trigger::Daily { hour, minute } if hour > 23 || minute > 59 => Err(
            VitalisError::Scheduling(format!("invalid daily time {hour:02}:{minute:02}")),
        ),
        Trigger::Daily { .. } => Ok(()),
    }
}

/// Sleep until a wall-clock instant; past instants return immediately.
async fn sleep_until(at: DateTime<Utc>) {
    let wait = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    tokio::time::sleep(wait).await;
}

fn deliver(tx: &broadcast::Sender<Delivery>, handle: &NotificationHandle, n: &Notification) {
    info!("notification {handle}: {} ({})", n.title, n.body);
    // No subscribers is fine; the log line is the delivery.
    let _ = tx.send(Delivery {
        handle: handle.clone(),
        title: n.title.clone(),
        body: n.body.clone(),
        fired_at: Utc::now(),
    });
}

async fn fire_loop(
    handle: NotificationHandle,
    notification: Notification,
    zone: CalendarZone,
    tx: broadcast::Sender<Delivery>,
) {
    match notification.trigger {
        Trigger::At { at } => {
            sleep_until(at).await;
            deliver(&tx, &handle, &notification);
        }
        Trigger::Every { seconds } => {
            let period = Duration::from_secs(seconds);
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                deliver(&tx, &handle, &notification);
            }
        }
        Trigger::Daily { hour, minute } => loop {
            let Some(next) = zone.next_daily(hour, minute, Utc::now()) else {
                warn!("notification {handle}: no next occurrence of {hour:02}:{minute:02}, giving up");
                return;
            };
            debug!("notification {handle}: next daily fire at {next}");
            sleep_until(next).await;
            deliver(&tx, &handle, &notification);
        },
    }
}

#[async_trait]
impl NotificationScheduler for LocalScheduler {
    fn name(&self) -> &str {
        "local"
    }

    async fn schedule(&self, notification: Notification) -> Result<NotificationHandle, VitalisError> {
        validate(&notification.trigger)?;

        let id = Uuid::new_v4().to_string();
        let handle = NotificationHandle(id.clone());
        debug!(
            "scheduling notification {handle} ({:?}) for \"{}\"",
            notification.trigger, notification.title
        );

        let task = tokio::spawn(fire_loop(
            handle.clone(),
            notification,
            self.zone,
            self.deliveries.clone(),
        ));
        self.arm(id, task)?;
        Ok(handle)
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<(), VitalisError> {
        let task = self
            .armed
            .lock()
            .map_err(|_| VitalisError::Scheduling("scheduler state poisoned".to_string()))?
            .remove(&handle.0);
        if let Some(task) = task {
            task.abort();
            debug!("cancelled notification {handle}");
        }
        Ok(())
    }
}
