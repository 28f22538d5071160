//! Calendar-date arithmetic in the user's zone.
//!
//! Reminder times are stored as UTC instants, but "today" and the daily
//! trigger's hour/minute are calendar notions that depend on where the user
//! is. Everything that needs a calendar date goes through [`CalendarZone`].

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::error::VitalisError;

/// The zone calendar dates are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The host's local time zone (DST-aware).
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl CalendarZone {
    /// Build a zone from an optional offset in minutes east of UTC.
    /// `None` selects the host's local zone.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Result<Self, VitalisError> {
        match minutes {
            None => Ok(Self::Local),
            Some(m) => FixedOffset::east_opt(m * 60)
                .map(Self::Fixed)
                .ok_or_else(|| VitalisError::Config(format!("utc offset out of range: {m} minutes"))),
        }
    }

    /// Calendar date of an instant.
    pub fn date_of(&self, t: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => t.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => t.with_timezone(offset).date_naive(),
        }
    }

    /// Wall-clock hour and minute of an instant.
    pub fn hour_minute(&self, t: DateTime<Utc>) -> (u32, u32) {
        match self {
            Self::Local => {
                let local = t.with_timezone(&Local);
                (local.hour(), local.minute())
            }
            Self::Fixed(offset) => {
                let local = t.with_timezone(offset);
                (local.hour(), local.minute())
            }
        }
    }

    /// Whether two instants fall on the same calendar date.
    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_of(a) == self.date_of(b)
    }

    /// Combine a calendar date and a wall-clock time into an instant.
    ///
    /// Seconds are dropped. Ambiguous wall-clock times (DST fall-back) pick
    /// the earlier instant; non-existent ones (DST spring-forward) are a
    /// validation error.
    pub fn combine(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, VitalisError> {
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
            .ok_or_else(|| VitalisError::Validation(format!("invalid time of day: {time}")))?;
        let naive = date.and_time(time);
        let resolved = match self {
            Self::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc)),
            Self::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc)),
        };
        resolved.ok_or_else(|| {
            VitalisError::Validation(format!("{naive} does not exist in the calendar zone"))
        })
    }

    /// Next instant strictly after `after` whose wall clock reads `hour:minute`.
    pub fn next_daily(&self, hour: u32, minute: u32, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        let mut date = self.date_of(after);
        // Two extra days cover a DST gap swallowing the target time.
        for _ in 0..3 {
            if let Ok(candidate) = self.combine(date, time) {
                if candidate > after {
                    return Some(candidate);
                }
            }
            date = date.succ_opt()?;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn plus_two() -> CalendarZone {
        CalendarZone::from_offset_minutes(Some(120)).unwrap()
    }

    #[test]
    fn test_offset_none_is_local() {
        assert_eq!(CalendarZone::from_offset_minutes(None).unwrap(), CalendarZone::Local);
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let err = CalendarZone::from_offset_minutes(Some(24 * 60)).unwrap_err();
        assert!(matches!(err, VitalisError::Config(_)));
    }

    #[test]
    fn test_date_of_crosses_midnight_with_offset() {
        let zone = plus_two();
        // 23:30 UTC is already the next day at UTC+2.
        let t = utc("2026-03-10T23:30:00Z");
        assert_eq!(zone.date_of(t), NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert_eq!(zone.hour_minute(t), (1, 30));
    }

    #[test]
    fn test_same_day_is_calendar_not_rolling() {
        let zone = plus_two();
        // 20 minutes apart but on different calendar dates at UTC+2.
        let a = utc("2026-03-10T21:50:00Z");
        let b = utc("2026-03-10T22:10:00Z");
        assert!(!zone.same_day(a, b));
        // 23 hours apart, same calendar date.
        let c = utc("2026-03-09T22:05:00Z");
        let d = utc("2026-03-10T21:05:00Z");
        assert!(zone.same_day(c, d));
    }

    #[test]
    fn test_combine_drops_seconds() {
        let zone = plus_two();
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 15, 42).unwrap();
        assert_eq!(zone.combine(date, time).unwrap(), utc("2026-05-01T07:15:00Z"));
    }

    #[test]
    fn test_next_daily_today_or_tomorrow() {
        let zone = plus_two();
        let now = utc("2026-05-01T06:00:00Z"); // 08:00 local
        assert_eq!(zone.next_daily(9, 0, now), Some(utc("2026-05-01T07:00:00Z")));
        assert_eq!(zone.next_daily(7, 30, now), Some(utc("2026-05-02T05:30:00Z")));
        // Exactly now is not "after".
        assert_eq!(zone.next_daily(8, 0, now), Some(utc("2026-05-02T06:00:00Z")));
    }
}
