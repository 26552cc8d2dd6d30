use crate::{
    error::SelectionError,
    forecast::{DayBucket, DayBuckets, DayKey},
    model::ForecastSample,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// No forecast has been loaded.
    #[default]
    NoSelection,
    /// A day is selected; `hour` indexes into that day's bucket.
    Day { day: DayKey, hour: Option<usize> },
}

impl Selection {
    /// First day of `buckets`, or `NoSelection` if there is nothing to select.
    pub fn default_for(buckets: Option<&DayBuckets>) -> Self {
        match buckets.and_then(DayBuckets::first_day) {
            Some(day) => Selection::Day { day, hour: None },
            None => Selection::NoSelection,
        }
    }

    pub fn day(&self) -> Option<DayKey> {
        match self {
            Selection::Day { day, .. } => Some(*day),
            Selection::NoSelection => None,
        }
    }

    pub fn hour(&self) -> Option<usize> {
        match self {
            Selection::Day { hour, .. } => *hour,
            Selection::NoSelection => None,
        }
    }

    /// Select `day`. Rejected without change if the day is not in `buckets`.
    pub fn select_day(&mut self, buckets: &DayBuckets, day: DayKey) -> Result<(), SelectionError> {
        if !buckets.contains(day) {
            return Err(SelectionError::UnknownDay(day));
        }
        *self = Selection::Day { day, hour: None };
        Ok(())
    }

    /// Select the `index`-th sample of the selected day.
    pub fn select_hour(&mut self, buckets: &DayBuckets, index: usize) -> Result<(), SelectionError> {
        let Selection::Day { day, hour } = self else {
            return Err(SelectionError::NoDaySelected);
        };
        let len = buckets
            .hourly(*day)
            .map(<[ForecastSample]>::len)
            .ok_or(SelectionError::UnknownDay(*day))?;
        if index >= len {
            return Err(SelectionError::HourOutOfRange { index, len });
        }
        *hour = Some(index);
        Ok(())
    }

    pub fn clear_hour(&mut self) {
        if let Selection::Day { hour, .. } = self {
            *hour = None;
        }
    }

    /// The selected day's bucket.
    pub fn bucket<'a>(&self, buckets: &'a DayBuckets) -> Option<&'a DayBucket> {
        self.day().and_then(|day| buckets.get(day))
    }

    /// The selected sample, if an hour is selected.
    pub fn sample<'a>(&self, buckets: &'a DayBuckets) -> Option<&'a ForecastSample> {
        let bucket = self.bucket(buckets)?;
        self.hour().and_then(|i| bucket.samples.get(i))
    }
}
