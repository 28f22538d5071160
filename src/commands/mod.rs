//! Reminder command handlers: add, list, counts, complete, delete, reconcile.
//!
//! Handlers take `now` explicitly and return the text to print.

mod format;


pub(crate) use format::{format_counts, format_delivery, format_list, format_reminder};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use vitalis_core::{
    error::VitalisError,
    reminder::{Filter, NewReminder, Repeat},
};
use vitalis_reminders::{NotificationOutcome, ReminderEngine};

/// Arguments of `vitalis add`.
pub(crate) struct AddArgs {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub time: String,
    pub repeat: Repeat,
    pub notify: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, VitalisError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| VitalisError::Validation(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

fn parse_time(s: &str) -> Result<NaiveTime, VitalisError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| VitalisError::Validation(format!("invalid time '{s}', expected HH:MM")))
}

pub(crate) async fn handle_add(
    engine: &ReminderEngine,
    args: AddArgs,
    now: DateTime<Utc>,
) -> Result<String, VitalisError> {
    let zone = &engine.settings().zone;
    let time = zone.combine(parse_date(&args.date)?, parse_time(&args.time)?)?;

    let mut input = NewReminder::new(args.title, time)
        .repeat(args.repeat)
        .notifications(args.notify);
    if let Some(description) = args.description {
        input = input.description(description);
    }

    let created = engine.create(input, now).await?;
    // A reminder created in the past goes straight to missed.
    let reconciled = engine.reconcile(now).await?;
    let reminder = reconciled
        .buckets
        .iter()
        .find(|r| r.id == created.reminder.id)
        .unwrap_or(&created.reminder);

    let notice = match &created.notification {
        NotificationOutcome::Scheduled(handle) => format!("notification scheduled ({handle})"),
        NotificationOutcome::Disabled => "notifications off".to_string(),
        NotificationOutcome::Unsupported => {
            "notifications are not supported on this platform".to_string()
        }
        NotificationOutcome::Failed(reason) => format!("notification not scheduled: {reason}"),
    };
    Ok(format!(
        "Created {}\n{notice}",
        format_reminder(reminder, zone)
    ))
}

pub(crate) async fn handle_list(
    engine: &ReminderEngine,
    filter: Filter,
    now: DateTime<Utc>,
) -> Result<String, VitalisError> {
    engine.reconcile(now).await?;
    let reminders = engine.list(filter, now).await;
    Ok(format_list(&reminders, filter, &engine.settings().zone))
}

pub(crate) async fn handle_counts(
    engine: &ReminderEngine,
    now: DateTime<Utc>,
) -> Result<String, VitalisError> {
    engine.reconcile(now).await?;
    Ok(format_counts(&engine.counts(now).await))
}

pub(crate) async fn handle_complete(
    engine: &ReminderEngine,
    id: &str,
    now: DateTime<Utc>,
) -> Result<String, VitalisError> {
    let reminder = engine.complete(id).await?;
    engine.reconcile(now).await?;
    Ok(format!(
        "Completed {}",
        format_reminder(&reminder, &engine.settings().zone)
    ))
}

pub(crate) async fn handle_delete(
    engine: &ReminderEngine,
    id: &str,
    now: DateTime<Utc>,
) -> Result<String, VitalisError> {
    let removed = engine.delete(id).await?;
    engine.reconcile(now).await?;
    Ok(match removed {
        Some(reminder) => format!("Deleted \"{}\" ({id})", reminder.title),
        None => format!("No reminder with id {id}, nothing deleted"),
    })
}

pub(crate) async fn handle_reconcile(
    engine: &ReminderEngine,
    now: DateTime<Utc>,
) -> Result<String, VitalisError> {
    let result = engine.reconcile(now).await?;
    Ok(match result.newly_missed.len() {
        0 => "No overdue reminders".to_string(),
        1 => "1 reminder marked missed".to_string(),
        n => format!("{n} reminders marked missed"),
    })
}
