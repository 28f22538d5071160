//! Notification trigger derivation.

use vitalis_core::{
    calendar::CalendarZone,
    reminder::{Reminder, Repeat},
    traits::Trigger,
};

pub const HOUR_SECS: u64 = 3600;
pub const TWO_HOURS_SECS: u64 = 7200;

/// Trigger for a reminder's notification.
///
/// `Once` fires at the due time. The hourly policies recur from the moment
/// they are scheduled, not from the due time. `EveryDay` recurs at the due
/// time's wall-clock hour and minute.
pub fn trigger_for(reminder: &Reminder, zone: &CalendarZone) -> Trigger {
    match reminder.repeat {
        Repeat::Once => Trigger::At { at: reminder.time },
        Repeat::EveryHour => Trigger::Every { seconds: HOUR_SECS },
        Repeat::EveryTwoHours => Trigger::Every {
            seconds: TWO_HOURS_SECS,
        },
        Repeat::EveryDay => {
            let (hour, minute) = zone.hour_minute(reminder.time);
            Trigger::Daily { hour, minute }
        }
    }
}
