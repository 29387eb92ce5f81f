//! Target-date distribution of trackers.
//!
//! Buckets compare calendar dates only, in the caller's timezone.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::Serialize;

use crate::tracker::Tracker;

/// Time-distance cohorts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Overdue,
    Today,
    Tomorrow,
    Week,
    Later,
}

impl Bucket {
    pub const ALL: [Self; 5] = [
        Self::Overdue,
        Self::Today,
        Self::Tomorrow,
        Self::Week,
        Self::Later,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::Week => "Week",
            Self::Later => "Later",
        }
    }

    /// Classifies a target date relative to `today`.
    pub fn for_date(target: NaiveDate, today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1));
        let next_week = today.checked_add_days(Days::new(7));

        if target < today {
            Self::Overdue
        } else if target == today {
            Self::Today
        } else if Some(target) == tomorrow {
            Self::Tomorrow
        } else if next_week.is_none_or(|limit| target <= limit) {
            Self::Week
        } else {
            Self::Later
        }
    }
}

/// Count of trackers per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub overdue: usize,
    pub today: usize,
    pub tomorrow: usize,
    pub week: usize,
    pub later: usize,
}

impl Distribution {
    /// Buckets `trackers` by their target date as seen in `now`'s timezone.
    pub fn from_trackers<Tz: TimeZone>(trackers: &[Tracker], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let mut distribution = Self::default();
        for tracker in trackers {
            let target = tracker.target_timestamp.with_timezone(&tz).date_naive();
            *distribution.slot(Bucket::for_date(target, today)) += 1;
        }
        distribution
    }

    const fn slot(&mut self, bucket: Bucket) -> &mut usize {
        match bucket {
            Bucket::Overdue => &mut self.overdue,
            Bucket::Today => &mut self.today,
            Bucket::Tomorrow => &mut self.tomorrow,
            Bucket::Week => &mut self.week,
            Bucket::Later => &mut self.later,
        }
    }

    pub const fn count(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Overdue => self.overdue,
            Bucket::Today => self.today,
            Bucket::Tomorrow => self.tomorrow,
            Bucket::Week => self.week,
            Bucket::Later => self.later,
        }
    }

    pub fn total(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.count(*b)).sum()
    }

    /// Largest bucket count, never below one.
    pub fn max(&self) -> usize {
        Bucket::ALL
            .iter()
            .map(|b| self.count(*b))
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Bucket size relative to the largest bucket, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self, bucket: Bucket) -> f64 {
        self.count(bucket) as f64 / self.max() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::tracker::tests::tracker;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn buckets_by_calendar_date() {
        let today = date(2026, 3, 10);
        assert_eq!(Bucket::for_date(date(2026, 3, 9), today), Bucket::Overdue);
        assert_eq!(Bucket::for_date(today, today), Bucket::Today);
        assert_eq!(Bucket::for_date(date(2026, 3, 11), today), Bucket::Tomorrow);
        assert_eq!(Bucket::for_date(date(2026, 3, 12), today), Bucket::Week);
        assert_eq!(Bucket::for_date(date(2026, 3, 17), today), Bucket::Week);
        assert_eq!(Bucket::for_date(date(2026, 3, 18), today), Bucket::Later);
    }

    #[test]
    fn distribution_partitions_collection() {
        // tracker() offsets are seconds after 2026-01-01T00:00:00Z.
        let day = 86_400;
        let trackers = vec![
            tracker("late", 0, -day),
            tracker("now", 0, 3_600),
            tracker("tmw", 0, day + 60),
            tracker("soon", 0, 5 * day),
            tracker("edge", 0, 7 * day),
            tracker("far", 0, 30 * day),
        ];
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        let dist = Distribution::from_trackers(&trackers, &now);
        assert_eq!(
            dist,
            Distribution {
                overdue: 1,
                today: 1,
                tomorrow: 1,
                week: 2,
                later: 1,
            }
        );
        assert_eq!(dist.total(), trackers.len());
        assert_eq!(dist.max(), 2);
        assert!((dist.ratio(Bucket::Week) - 1.0).abs() < f64::EPSILON);
        assert!((dist.ratio(Bucket::Later) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn time_of_day_is_ignored() {
        // 00:30 UTC on Jan 1 is still Dec 31 at UTC-5.
        let trackers = vec![tracker("x", 0, 1_800)];
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = eastern.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();

        let dist = Distribution::from_trackers(&trackers, &now);
        assert_eq!(dist.overdue, 1);
    }

    #[test]
    fn empty_collection_has_unit_max() {
        let dist = Distribution::from_trackers(&[], &Utc::now());
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.max(), 1);
        assert!(dist.ratio(Bucket::Today).abs() < f64::EPSILON);
    }
}
