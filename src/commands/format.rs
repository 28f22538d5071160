//! Terminal rendering of reminders, counters and deliveries.

use console::style;
use vitalis_core::{
    calendar::CalendarZone,
    reminder::{Filter, Reminder, Status},
};
use vitalis_notify::Delivery;
use vitalis_reminders::Counts;

fn status_word(status: Status) -> String {
    let word = format!("{:<9}", status.as_str());
    match status {
        Status::Pending => style(word).yellow().to_string(),
        Status::Completed => style(word).green().to_string(),
        Status::Missed => style(word).red().to_string(),
    }
}

fn due(reminder: &Reminder, zone: &CalendarZone) -> String {
    let (hour, minute) = zone.hour_minute(reminder.time);
    format!("{} {hour:02}:{minute:02}", zone.date_of(reminder.time))
}

/// One reminder: status, due time, title, repeat and id; description below.
pub(crate) fn format_reminder(reminder: &Reminder, zone: &CalendarZone) -> String {
    let mut line = format!(
        "{} {}  {}  ({})  {}",
        status_word(reminder.status),
        due(reminder, zone),
        style(&reminder.title).bold(),
        reminder.repeat,
        style(&reminder.id).dim()
    );
    if let Some(description) = reminder.description() {
        line.push_str(&format!("\n          {description}"));
    }
    line
}

pub(crate) fn format_list(reminders: &[Reminder], filter: Filter, zone: &CalendarZone) -> String {
    if reminders.is_empty() {
        return match filter {
            Filter::All => "No reminders yet".to_string(),
            Filter::Today => "Nothing due today".to_string(),
            Filter::Missed => "No missed reminders today".to_string(),
            Filter::Completed => "No completed reminders".to_string(),
        };
    }
    reminders
        .iter()
        .map(|r| format_reminder(r, zone))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn format_counts(counts: &Counts) -> String {
    format!(
        "All: {}  Today: {}  Missed: {}  Completed: {}",
        counts.all,
        counts.today,
        style(counts.missed).red(),
        style(counts.completed).green()
    )
}

/// Banner printed when a notification fires while watching.
pub(crate) fn format_delivery(delivery: &Delivery) -> String {
    format!(
        "{} {}\n  {}",
        style("🔔").bold(),
        style(&delivery.title).bold().cyan(),
        delivery.body
    )
}
