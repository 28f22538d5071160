//! Filtered lists and counters rendered by the reminders screen.

use chrono::{DateTime, Utc};
use vitalis_core::{
    calendar::CalendarZone,
    reminder::{Filter, Reminder},
};

use crate::buckets::Buckets;

/// Counters shown on the filter tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub all: usize,
    pub today: usize,
    /// Missed reminders due today only.
    pub missed: usize,
    pub completed: usize,
}

/// Reminders matching `filter`, sorted by due time.
///
/// "Today" is the calendar date of `now` in `zone`. Equal times keep the
/// pending, completed, missed order.
pub fn list_filtered(
    buckets: &Buckets,
    filter: Filter,
    now: DateTime<Utc>,
    zone: &CalendarZone,
) -> Vec<Reminder> {
    let today = |r: &&Reminder| zone.same_day(r.time, now);
    let mut items: Vec<Reminder> = match filter {
        Filter::All => buckets.iter().cloned().collect(),
        Filter::Today => buckets.iter().filter(today).cloned().collect(),
        Filter::Missed => buckets.missed.iter().filter(today).cloned().collect(),
        Filter::Completed => buckets.completed.clone(),
    };
    items.sort_by_key(|r| r.time);
    items
}

/// Sizes of the four filtered sets.
pub fn counts(buckets: &Buckets, now: DateTime<Utc>, zone: &CalendarZone) -> Counts {
    let today = |r: &&Reminder| zone.same_day(r.time, now);
    Counts {
        all: buckets.len(),
        today: buckets.iter().filter(today).count(),
        missed: buckets.missed.iter().filter(today).count(),
        completed: buckets.completed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use vitalis_core::reminder::{Repeat, Status};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-16T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn zone() -> CalendarZone {
        CalendarZone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn reminder(id: &str, offset_hours: i64, status: Status) -> Reminder {
        Reminder {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            time: now() + Duration::hours(offset_hours),
            repeat: Repeat::Once,
            notifications_enabled: false,
            status,
            created_at: now() - Duration::days(3),
        }
    }

    fn mixed() -> Buckets {
        Buckets {
            pending: vec![
                reminder("p-tomorrow", 24, Status::Pending),
                reminder("p-today", 3, Status::Pending),
            ],
            completed: vec![
                reminder("c-yesterday", -24, Status::Completed),
                reminder("c-today", -2, Status::Completed),
            ],
            missed: vec![
                reminder("m-today", -1, Status::Missed),
                reminder("m-yesterday", -20, Status::Missed),
            ],
        }
    }

    fn ids(items: &[Reminder]) -> Vec<&str> {
        items.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_all_sorted_by_time() {
        let items = list_filtered(&mixed(), Filter::All, now(), &zone());
        assert_eq!(
            ids(&items),
            vec!["c-yesterday", "m-yesterday", "c-today", "m-today", "p-today", "p-tomorrow"]
        );
    }

    #[test]
    fn test_today_is_subset_of_all_on_same_date() {
        let buckets = mixed();
        let all = list_filtered(&buckets, Filter::All, now(), &zone());
        let today = list_filtered(&buckets, Filter::Today, now(), &zone());
        let expected: Vec<&Reminder> = all
            .iter()
            .filter(|r| r.time.date_naive() == now().date_naive())
            .collect();
        assert_eq!(today.len(), expected.len());
        assert_eq!(ids(&today), vec!["c-today", "m-today", "p-today"]);
    }

    #[test]
    fn test_missed_filter_is_today_only() {
        let items = list_filtered(&mixed(), Filter::Missed, now(), &zone());
        assert_eq!(ids(&items), vec!["m-today"]);
    }

    #[test]
    fn test_completed_filter_not_date_restricted() {
        let items = list_filtered(&mixed(), Filter::Completed, now(), &zone());
        assert_eq!(ids(&items), vec!["c-yesterday", "c-today"]);
    }

    #[test]
    fn test_counts_match_lists() {
        let buckets = mixed();
        let c = counts(&buckets, now(), &zone());
        assert_eq!(
            c,
            Counts {
                all: 6,
                today: 3,
                missed: 1,
                completed: 2,
            }
        );
        for (filter, n) in [
            (Filter::All, c.all),
            (Filter::Today, c.today),
            (Filter::Missed, c.missed),
            (Filter::Completed, c.completed),
        ] {
            assert_eq!(list_filtered(&buckets, filter, now(), &zone()).len(), n);
        }
    }

    #[test]
    fn test_ties_keep_bucket_order() {
        let buckets = Buckets {
            pending: vec![reminder("p", 1, Status::Pending)],
            completed: vec![reminder("c", 1, Status::Completed)],
            missed: vec![reminder("m", 1, Status::Missed)],
        };
        let items = list_filtered(&buckets, Filter::All, now(), &zone());
        assert_eq!(ids(&items), vec!["p", "c", "m"]);
    }
}
