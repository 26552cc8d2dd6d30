use chrono::FixedOffset;

use crate::{
    error::{FetchError, LocationError},
    forecast::DayBuckets,
    model::{CurrentConditions, ForecastSample, ForecastSet, LocationQuery},
    selection::Selection,
};

/// Outcome of one endpoint's most recent request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Never requested.
    Idle,
    Pending,
    Ready(T),
    Failed(FetchError),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(err) => FetchState::Failed(err),
        }
    }

    fn section(&self) -> Section<'_, T> {
        match self {
            FetchState::Ready(value) => Section::Ready(value),
            FetchState::Failed(err) => Section::Failed(err),
            FetchState::Idle | FetchState::Pending => Section::Missing,
        }
    }
}

/// A forecast together with its day buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedForecast {
    pub set: ForecastSet,
    pub buckets: DayBuckets,
}

impl LoadedForecast {
    pub fn new(set: ForecastSet, offset: FixedOffset) -> Self {
        let buckets = DayBuckets::group(&set, offset);
        Self { set, buckets }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Location the displayed data belongs to.
    pub query: Option<LocationQuery>,
    pub location_error: Option<LocationError>,
    pub current: FetchState<CurrentConditions>,
    pub forecast: FetchState<LoadedForecast>,
    pub selection: Selection,
}

impl AppState {
    pub fn buckets(&self) -> Option<&DayBuckets> {
        self.forecast.ready().map(|f| &f.buckets)
    }

    /// Mark both endpoints as in flight for `query`.
    pub(crate) fn begin(&mut self, query: Option<LocationQuery>) {
        self.query = query;
        self.location_error = None;
        self.current = FetchState::Pending;
        self.forecast = FetchState::Pending;
        self.selection = Selection::NoSelection;
    }

    /// Replace everything with a location failure.
    pub(crate) fn fail_location(&mut self, err: LocationError) {
        self.query = None;
        self.location_error = Some(err);
        self.current = FetchState::Idle;
        self.forecast = FetchState::Idle;
        self.selection = Selection::NoSelection;
    }

    /// Store both settled results and reset the selection for the new data.
    pub(crate) fn complete(
        &mut self,
        current: Result<CurrentConditions, FetchError>,
        forecast: Result<LoadedForecast, FetchError>,
    ) {
        self.current = FetchState::from_result(current);
        self.forecast = FetchState::from_result(forecast);
        self.selection = Selection::default_for(self.buckets());
    }

    /// Reduce the state to exactly one of the four display states.
    pub fn display(&self) -> Display<'_> {
        if self.current.is_pending() || self.forecast.is_pending() {
            return Display::Loading;
        }
        if let Some(err) = &self.location_error {
            return Display::Error(err.to_string());
        }
        match (&self.current, &self.forecast) {
            (FetchState::Idle, FetchState::Idle) => Display::NoData,
            (FetchState::Failed(current), FetchState::Failed(forecast)) => {
                Display::Error(format!(
                    "Failed to get weather. Please try again.\n{current}\n{forecast}"
                ))
            }
            (FetchState::Ready(_), _) | (_, FetchState::Ready(_)) => Display::Data(DataView {
                query: self.query.as_ref(),
                current: self.current.section(),
                forecast: self.forecast.section(),
                selection: self.selection,
            }),
            // One endpoint failed, the other was never asked.
            (FetchState::Failed(err), _) | (_, FetchState::Failed(err)) => {
                Display::Error(err.to_string())
            }
            _ => Display::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Display<'a> {
    Loading,
    Error(String),
    NoData,
    Data(DataView<'a>),
}

/// One endpoint's slot in the data view.
#[derive(Debug, PartialEq)]
pub enum Section<'a, T> {
    Ready(&'a T),
    Failed(&'a FetchError),
    Missing,
}

impl<T> Clone for Section<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Section<'_, T> {}

#[derive(Debug, Clone, PartialEq)]
pub struct DataView<'a> {
    pub query: Option<&'a LocationQuery>,
    pub current: Section<'a, CurrentConditions>,
    pub forecast: Section<'a, LoadedForecast>,
    pub selection: Selection,
}

impl<'a> DataView<'a> {
    pub fn buckets(&self) -> Option<&'a DayBuckets> {
        match self.forecast {
            Section::Ready(f) => Some(&f.buckets),
            _ => None,
        }
    }

    /// Samples of the selected day, for the hourly chart.
    pub fn hourly(&self) -> &'a [ForecastSample] {
        self.buckets()
            .and_then(|b| self.selection.bucket(b))
            .map(|bucket| bucket.samples.as_slice())
            .unwrap_or(&[])
    }

    /// First sample per day, for the day list.
    pub fn summary(&self) -> Vec<&'a ForecastSample> {
        self.buckets().map(DayBuckets::daily_summary).unwrap_or_default()
    }

    pub fn selected_sample(&self) -> Option<&'a ForecastSample> {
        self.buckets().and_then(|b| self.selection.sample(b))
    }

    /// Best available name for the location.
    pub fn place_name(&self) -> Option<String> {
        if let Section::Ready(current) = self.current {
            if !current.place_name.is_empty() {
                return Some(current.place_name.clone());
            }
        }
        if let Section::Ready(forecast) = self.forecast {
            if let Some(name) = &forecast.set.place_name {
                return Some(name.clone());
            }
        }
        self.query.map(ToString::to_string)
    }
}
