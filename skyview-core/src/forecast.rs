//! Grouping of forecast samples into calendar-day buckets.
//!
//! Day keys are calendar dates in one fixed UTC offset chosen by the caller,
//! so grouping never depends on locale formatting.

use std::{collections::HashMap, fmt};

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{ForecastSample, ForecastSet};

/// Number of days in the summary list.
pub const SUMMARY_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Calendar date of `sample` as seen from `offset`.
    pub fn of(sample: &ForecastSample, offset: FixedOffset) -> Self {
        Self(sample.time.with_timezone(&offset).date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub day: DayKey,
    pub samples: Vec<ForecastSample>,
}

/// Samples partitioned by day, buckets in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBuckets {
    offset: FixedOffset,
    buckets: Vec<DayBucket>,
    index: HashMap<DayKey, usize>,
}

impl DayBuckets {
    pub fn group(set: &ForecastSet, offset: FixedOffset) -> Self {
        let mut buckets: Vec<DayBucket> = Vec::new();
        let mut index: HashMap<DayKey, usize> = HashMap::new();

        for sample in &set.samples {
            let day = DayKey::of(sample, offset);
            let slot = *index.entry(day).or_insert_with(|| {
                buckets.push(DayBucket {
                    day,
                    samples: Vec::new(),
                });
                buckets.len() - 1
            });
            buckets[slot].samples.push(sample.clone());
        }

        Self {
            offset,
            buckets,
            index,
        }
    }

    /// Offset the day keys were computed in.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.buckets.iter().map(|b| b.samples.len()).sum()
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn days(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.buckets.iter().map(|b| b.day)
    }

    pub fn first_day(&self) -> Option<DayKey> {
        self.buckets.first().map(|b| b.day)
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.index.contains_key(&day)
    }

    /// Position of `day` in bucket order.
    pub fn position(&self, day: DayKey) -> Option<usize> {
        self.index.get(&day).copied()
    }

    pub fn get(&self, day: DayKey) -> Option<&DayBucket> {
        self.position(day).map(|i| &self.buckets[i])
    }

    /// Hourly detail feed: every sample of `day`, in order.
    pub fn hourly(&self, day: DayKey) -> Option<&[ForecastSample]> {
        self.get(day).map(|b| b.samples.as_slice())
    }

    /// First sample of each day, for at most [`SUMMARY_DAYS`] days.
    pub fn daily_summary(&self) -> Vec<&ForecastSample> {
        self.buckets
            .iter()
            .filter_map(|b| b.samples.first())
            .take(SUMMARY_DAYS)
            .collect()
    }
}
