//! The three reminder collections and the pure transitions between them.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;
use vitalis_core::reminder::{Bucket, Reminder, Status};

/// Pending, completed and missed reminders. Every id lives in exactly one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub pending: Vec<Reminder>,
    pub completed: Vec<Reminder>,
    pub missed: Vec<Reminder>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &Vec<Reminder> {
        match bucket {
            Bucket::Pending => &self.pending,
            Bucket::Completed => &self.completed,
            Bucket::Missed => &self.missed,
        }
    }

    pub fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Reminder> {
        match bucket {
            Bucket::Pending => &mut self.pending,
            Bucket::Completed => &mut self.completed,
            Bucket::Missed => &mut self.missed,
        }
    }

    /// All reminders: pending, then completed, then missed.
    pub fn iter(&self) -> impl Iterator<Item = &Reminder> {
        self.pending
            .iter()
            .chain(self.completed.iter())
            .chain(self.missed.iter())
    }

    /// Total number of reminders across the buckets.
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len() + self.missed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Which bucket holds `id`, if any.
    pub fn locate(&self, id: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|b| self.get(*b).iter().any(|r| r.id == id))
    }

    /// Remove `id` from `bucket`, returning it.
    pub fn take(&mut self, bucket: Bucket, id: &str) -> Option<Reminder> {
        let list = self.get_mut(bucket);
        let pos = list.iter().position(|r| r.id == id)?;
        Some(list.remove(pos))
    }

    /// Enforce the partition invariant on data read from storage.
    ///
    /// Drops duplicate ids (first occurrence wins within a bucket; across
    /// buckets completed beats missed beats pending) and makes each record's
    /// status match its bucket. Returns whether anything changed.
    pub fn normalize(self) -> (Buckets, bool) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut repaired = false;
        let mut out = Buckets::default();
        let mut source = self;

        for bucket in [Bucket::Completed, Bucket::Missed, Bucket::Pending] {
            for mut reminder in std::mem::take(source.get_mut(bucket)) {
                if !seen.insert(reminder.id.clone()) {
                    warn!(
                        "dropping duplicate reminder {} from {}",
                        reminder.id,
                        bucket.storage_key()
                    );
                    repaired = true;
                    continue;
                }
                if reminder.status != bucket.status() {
                    warn!(
                        "reminder {} in {} had status {}, fixing",
                        reminder.id,
                        bucket.storage_key(),
                        reminder.status
                    );
                    reminder.status = bucket.status();
                    repaired = true;
                }
                out.get_mut(bucket).push(reminder);
            }
        }
        (out, repaired)
    }

    /// Move every pending reminder whose time is strictly before `now` into
    /// missed. A reminder due exactly at `now` stays pending. Returns the ids
    /// that left the pending bucket.
    pub fn reconcile(self, now: DateTime<Utc>) -> (Buckets, Vec<String>) {
        let Buckets {
            pending,
            completed,
            mut missed,
        } = self;

        let (still_pending, newly_missed): (Vec<Reminder>, Vec<Reminder>) = pending
            .into_iter()
            .partition(|r| !(r.status == Status::Pending && r.time < now));

        let mut moved = Vec::with_capacity(newly_missed.len());
        for mut reminder in newly_missed {
            moved.push(reminder.id.clone());
            if missed.iter().any(|m| m.id == reminder.id) {
                continue;
            }
            reminder.status = Status::Missed;
            missed.push(reminder);
        }

        (
            Buckets {
                pending: still_pending,
                completed,
                missed,
            },
            moved,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vitalis_core::reminder::Repeat;

    fn at(offset_min: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-16T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(offset_min)
    }

    fn reminder(id: &str, offset_min: i64, status: Status) -> Reminder {
        Reminder {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: None,
            time: at(offset_min),
            repeat: Repeat::Once,
            notifications_enabled: false,
            status,
            created_at: at(-600),
        }
    }

    #[test]
    fn test_reconcile_strict_boundary() {
        let buckets = Buckets {
            pending: vec![
                reminder("past", -1, Status::Pending),
                reminder("now", 0, Status::Pending),
                reminder("future", 60, Status::Pending),
            ],
            ..Default::default()
        };
        let (out, moved) = buckets.reconcile(at(0));
        assert_eq!(moved, vec!["past".to_string()]);
        let pending: Vec<&str> = out.pending.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(pending, vec!["now", "future"]);
        assert_eq!(out.missed.len(), 1);
        assert_eq!(out.missed[0].status, Status::Missed);
    }

    #[test]
    fn test_reconcile_does_not_duplicate_missed() {
        let buckets = Buckets {
            pending: vec![
                reminder("a", -5, Status::Pending),
                reminder("b", -5, Status::Pending),
            ],
            missed: vec![reminder("a", -5, Status::Missed)],
            ..Default::default()
        };
        let (out, moved) = buckets.reconcile(at(0));
        assert_eq!(moved.len(), 2);
        assert!(out.pending.is_empty());
        assert_eq!(out.missed.iter().filter(|r| r.id == "a").count(), 1);
        assert_eq!(out.missed.iter().filter(|r| r.id == "b").count(), 1);
    }

    #[test]
    fn test_reconcile_leaves_completed_alone() {
        let buckets = Buckets {
            completed: vec![reminder("done", -120, Status::Completed)],
            ..Default::default()
        };
        let (out, moved) = buckets.clone().reconcile(at(0));
        assert!(moved.is_empty());
        assert_eq!(out, buckets);
    }

    #[test]
    fn test_normalize_precedence_and_status() {
        let buckets = Buckets {
            pending: vec![
                reminder("x", 10, Status::Pending),
                reminder("y", 10, Status::Missed),
                reminder("y", 10, Status::Pending),
            ],
            completed: vec![reminder("x", 10, Status::Completed)],
            missed: vec![reminder("z", -10, Status::Missed)],
        };
        let (out, repaired) = buckets.normalize();
        assert!(repaired);
        assert_eq!(out.locate("x"), Some(Bucket::Completed));
        assert_eq!(out.pending.len(), 1);
        assert_eq!(out.pending[0].id, "y");
        assert_eq!(out.pending[0].status, Status::Pending);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_normalize_clean_data_untouched() {
        let buckets = Buckets {
            pending: vec![reminder("p", 10, Status::Pending)],
            completed: vec![reminder("c", 10, Status::Completed)],
            missed: vec![reminder("m", -10, Status::Missed)],
        };
        let (out, repaired) = buckets.clone().normalize();
        assert!(!repaired);
        assert_eq!(out, buckets);
    }

    #[test]
    fn test_take_and_locate() {
        let mut buckets = Buckets {
            missed: vec![reminder("m", -10, Status::Missed)],
            ..Default::default()
        };
        assert_eq!(buckets.locate("m"), Some(Bucket::Missed));
        assert!(buckets.take(Bucket::Pending, "m").is_none());
        assert_eq!(buckets.take(Bucket::Missed, "m").unwrap().id, "m");
        assert!(buckets.is_empty());
    }
}
