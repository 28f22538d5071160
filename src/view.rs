//! The open reminders screen: reconcile on open, then on a fixed tick until
//! the view is closed.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use vitalis_core::error::VitalisError;
use vitalis_reminders::{Reconciliation, ReminderEngine};

pub struct RemindersView {
    ticker: Option<JoinHandle<()>>,
}

impl RemindersView {
    /// Reconcile once, then start the periodic reconcile task.
    pub async fn open(
        engine: Arc<ReminderEngine>,
        every: Duration,
    ) -> Result<(Self, Reconciliation), VitalisError> {
        let first = engine.reconcile(Utc::now()).await?;
        let ticker = tokio::spawn(tick(engine, every));
        info!("reminders view open, reconciling every {}s", every.as_secs());
        Ok((
            Self {
                ticker: Some(ticker),
            },
            first,
        ))
    }

    pub fn is_open(&self) -> bool {
        self.ticker.is_some()
    }

    /// Stop the reconcile timer. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            debug!("reminders view closed");
        }
    }
}

impl Drop for RemindersView {
    fn drop(&mut self) {
        self.close();
    }
}

async fn tick(engine: Arc<ReminderEngine>, every: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        match engine.reconcile(Utc::now()).await {
            Ok(r) if !r.newly_missed.is_empty() => {
                info!("view tick: {} reminder(s) now missed", r.newly_missed.len());
            }
            Ok(_) => {}
            Err(e) => warn!("view tick: reconcile failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use vitalis_core::reminder::{Bucket, Repeat, Reminder, Status};
    use vitalis_core::traits::KeyValueStore;
    use vitalis_notify::UnsupportedScheduler;
    use vitalis_reminders::EngineSettings;
    use vitalis_store::MemoryStore;

    fn overdue(id: &str) -> String {
        let time = Utc::now() - ChronoDuration::minutes(5);
        let r = Reminder {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            time,
            repeat: Repeat::Once,
            notifications_enabled: false,
            status: Status::Pending,
            created_at: time,
        };
        serde_json::to_string(&vec![r]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_reconciles_on_tick_until_closed() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(ReminderEngine::new(
            store.clone(),
            Arc::new(UnsupportedScheduler),
            EngineSettings::default(),
        ));
        let every = Duration::from_secs(60);

        let (mut view, first) = RemindersView::open(engine.clone(), every).await.unwrap();
        assert!(first.newly_missed.is_empty());
        assert!(view.is_open());

        // Written behind the engine's back; only the tick can pick it up.
        store.set("reminders", &overdue("a")).await.unwrap();
        tokio::time::sleep(every * 2).await;
        assert_eq!(engine.bucket(Bucket::Missed).await.len(), 1);
        assert!(engine.bucket(Bucket::Pending).await.is_empty());

        view.close();
        assert!(!view.is_open());
        store.set("reminders", &overdue("b")).await.unwrap();
        tokio::time::sleep(every * 2).await;
        assert!(engine.bucket(Bucket::Pending).await.is_empty());
        assert_eq!(engine.bucket(Bucket::Missed).await.len(), 1);
    }
}
