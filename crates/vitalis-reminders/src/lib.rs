//! # vitalis-reminders
//!
//! The reminder lifecycle engine: classifies reminders into pending,
//! completed and missed buckets, keeps the buckets persisted, and asks the
//! notification scheduler for local notifications.
//!
//! - `buckets` — the three collections, load-time repair, reconciliation
//! - `trigger` — notification trigger derivation from the repeat policy
//! - `views` — filtered lists and counters
//! - `engine` — the stateful engine wiring storage and scheduler together

pub mod buckets;
pub mod engine;
pub mod trigger;
pub mod views;

pub use buckets::Buckets;
pub use engine::{Created, EngineSettings, NotificationOutcome, Reconciliation, ReminderEngine};
pub use views::Counts;
