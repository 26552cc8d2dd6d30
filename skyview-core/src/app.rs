//! The application controller: resolves a location, runs both fetches and
//! applies their results to [`AppState`].
//!
//! Every lookup takes a generation number when it starts. Results are written
//! only if no newer lookup was started in the meantime, so a slow response to
//! an old search can never overwrite a newer one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::FixedOffset;
use parking_lot::Mutex;

use crate::{
    error::{LocationError, SelectionError},
    forecast::DayKey,
    location::{LocationService, PermissionStatus},
    model::LocationQuery,
    provider::WeatherProvider,
    state::{AppState, LoadedForecast},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket(u64);

#[derive(Debug)]
pub struct WeatherApp {
    provider: Arc<dyn WeatherProvider>,
    location: Arc<dyn LocationService>,
    day_offset: FixedOffset,
    generation: AtomicU64,
    state: Mutex<AppState>,
}

impl WeatherApp {
    /// `day_offset` decides which calendar day each forecast sample belongs to.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        location: Arc<dyn LocationService>,
        day_offset: FixedOffset,
    ) -> Self {
        Self {
            provider,
            location,
            day_offset,
            generation: AtomicU64::new(0),
            state: Mutex::new(AppState::default()),
        }
    }

    pub fn day_offset(&self) -> FixedOffset {
        self.day_offset
    }

    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Look up the weather at the device position.
    ///
    /// Returns `false` if a newer lookup superseded this one.
    pub async fn load_device_location(&self) -> bool {
        let ticket = self.issue(None);

        if self.location.request_permission().await == PermissionStatus::Denied {
            tracing::warn!("location permission denied");
            return self.apply(ticket, |state| {
                state.fail_location(LocationError::PermissionDenied)
            });
        }

        let coordinates = match self.location.current_position().await {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(%err, "could not read device position");
                return self.apply(ticket, |state| state.fail_location(err));
            }
        };
        tracing::info!(%coordinates, "got device position");

        self.fetch(ticket, LocationQuery::Coordinates(coordinates))
            .await
    }

    /// Look up the weather for a typed place name.
    ///
    /// Blank input is ignored and returns `false`, as does a lookup superseded
    /// by a newer one.
    pub async fn search(&self, text: &str) -> bool {
        let Some(query) = LocationQuery::place(text) else {
            tracing::warn!("ignoring empty search");
            return false;
        };
        let ticket = self.issue(Some(query.clone()));
        self.fetch(ticket, query).await
    }

    pub fn select_day(&self, day: DayKey) -> Result<(), SelectionError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.forecast.ready() {
            Some(forecast) => state.selection.select_day(&forecast.buckets, day),
            None => Err(SelectionError::UnknownDay(day)),
        }
    }

    pub fn select_hour(&self, index: usize) -> Result<(), SelectionError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.forecast.ready() {
            Some(forecast) => state.selection.select_hour(&forecast.buckets, index),
            None => Err(SelectionError::NoDaySelected),
        }
    }

    pub fn clear_hour(&self) {
        self.state.lock().selection.clear_hour();
    }

    /// Start a new generation and mark both endpoints pending.
    fn issue(&self, query: Option<LocationQuery>) -> Ticket {
        let mut state = self.state.lock();
        let ticket = Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        state.begin(query);
        tracing::debug!(generation = ticket.0, "lookup started");
        ticket
    }

    /// Apply `update` if `ticket` is still the latest generation.
    fn apply(&self, ticket: Ticket, update: impl FnOnce(&mut AppState)) -> bool {
        let mut state = self.state.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != ticket.0 {
            tracing::info!(
                generation = ticket.0,
                latest,
                "discarding result of superseded lookup"
            );
            return false;
        }
        update(&mut state);
        true
    }

    async fn fetch(&self, ticket: Ticket, query: LocationQuery) -> bool {
        let (current, forecast) = tokio::join!(
            self.provider.current(&query),
            self.provider.forecast(&query)
        );

        match &current {
            Ok(c) => tracing::info!(place = %c.place_name, "current conditions received"),
            Err(err) => tracing::warn!(%err, "current conditions request failed"),
        }
        match &forecast {
            Ok(f) => tracing::info!(samples = f.len(), "forecast received"),
            Err(err) => tracing::warn!(%err, "forecast request failed"),
        }

        let forecast = forecast.map(|set| LoadedForecast::new(set, self.day_offset));

        self.apply(ticket, |state| {
            state.query = Some(query);
            state.complete(current, forecast);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::LocationSettings,
        error::{Endpoint, FetchError},
        location::ConfiguredLocation,
        model::{Coordinates, CurrentConditions, ForecastSample, ForecastSet},
        selection::Selection,
        state::{Display, FetchState, Section},
    };
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use std::{
        collections::HashMap,
        sync::atomic::AtomicUsize,
        time::Duration,
    };

    const JAN_1: i64 = 1_704_067_200;

    #[derive(Debug, Clone)]
    struct Script {
        delay: Duration,
        current_fails: bool,
        forecast_fails: bool,
        days: i64,
    }

    impl Script {
        fn ok(days: i64) -> Self {
            Self {
                delay: Duration::ZERO,
                current_fails: false,
                forecast_fails: false,
                days,
            }
        }

        fn delayed(mut self, millis: u64) -> Self {
            self.delay = Duration::from_millis(millis);
            self
        }
    }

    /// Answers by place name; coordinates are looked up under "coords".
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        scripts: HashMap<String, Script>,
        calls: AtomicUsize,
        queries: Mutex<Vec<LocationQuery>>,
    }

    impl ScriptedProvider {
        fn with(mut self, key: &str, script: Script) -> Self {
            self.scripts.insert(key.to_string(), script);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn script(&self, query: &LocationQuery) -> (String, Script) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(query.clone());
            let key = match query {
                LocationQuery::Place(name) => name.clone(),
                LocationQuery::Coordinates(_) => "coords".to_string(),
            };
            let script = self.scripts.get(&key).cloned().unwrap_or_else(|| Script::ok(1));
            tokio::time::sleep(script.delay).await;
            (key, script)
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, FetchError> {
            let (name, script) = self.script(query).await;
            if script.current_fails {
                return Err(FetchError::Status {
                    endpoint: Endpoint::Current,
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(CurrentConditions {
                place_name: name,
                temperature_c: 10.0,
                feels_like_c: 9.0,
                humidity_pct: 55,
                wind_speed_ms: 2.5,
                description: "clear sky".into(),
                icon_id: "01d".into(),
            })
        }

        async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSet, FetchError> {
            let (name, script) = self.script(query).await;
            if script.forecast_fails {
                return Err(FetchError::Network {
                    endpoint: Endpoint::Forecast,
                    message: "timed out".into(),
                });
            }
            // Two samples per day, six hours apart.
            let samples = (0..script.days)
                .flat_map(|day| (0..2).map(move |slot| JAN_1 + day * 86_400 + slot * 6 * 3600))
                .map(|ts| ForecastSample {
                    time: DateTime::from_timestamp(ts, 0).expect("timestamp"),
                    temperature_c: (ts - JAN_1) as f64 / 3600.0,
                    feels_like_c: 0.0,
                    humidity_pct: 50,
                    wind_speed_ms: 1.0,
                    description: "clear sky".into(),
                    icon_id: "01d".into(),
                })
                .collect();
            Ok(ForecastSet {
                place_name: Some(name),
                samples,
            })
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).expect("offset")
    }

    fn app(provider: Arc<ScriptedProvider>, location: ConfiguredLocation) -> WeatherApp {
        WeatherApp::new(provider, Arc::new(location), utc())
    }

    fn jan(d: u32) -> DayKey {
        DayKey::new(NaiveDate::from_ymd_opt(2024, 1, d).expect("date"))
    }

    fn current_place(app: &WeatherApp) -> Option<String> {
        app.with_state(|s| s.current.ready().map(|c| c.place_name.clone()))
    }

    #[tokio::test]
    async fn starts_with_no_data() {
        let app = app(Arc::new(ScriptedProvider::default()), ConfiguredLocation::default());
        assert!(app.with_state(|s| s.display() == Display::NoData));
    }

    #[tokio::test]
    async fn permission_denied_issues_no_requests() {
        let provider = Arc::new(ScriptedProvider::default());
        let app = app(provider.clone(), ConfiguredLocation::default());

        assert!(app.load_device_location().await);

        assert_eq!(provider.calls(), 0);
        let state = app.snapshot();
        assert_eq!(state.location_error, Some(LocationError::PermissionDenied));
        assert_eq!(
            state.display(),
            Display::Error("Permission to access location was denied".into())
        );
        assert_eq!(state.selection, Selection::NoSelection);
    }

    #[tokio::test]
    async fn missing_position_is_a_location_error() {
        let provider = Arc::new(ScriptedProvider::default());
        let location = ConfiguredLocation::new(LocationSettings {
            enabled: true,
            latitude: None,
            longitude: None,
        });
        let app = app(provider.clone(), location);

        app.load_device_location().await;

        assert_eq!(provider.calls(), 0);
        assert!(matches!(
            app.snapshot().location_error,
            Some(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn granted_location_queries_by_coordinates() {
        let coords = Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        };
        let provider = Arc::new(ScriptedProvider::default().with("coords", Script::ok(3)));
        let app = app(provider.clone(), ConfiguredLocation::fixed(coords));

        assert!(app.load_device_location().await);

        assert_eq!(provider.calls(), 2);
        assert!(
            provider
                .queries
                .lock()
                .iter()
                .all(|q| *q == LocationQuery::Coordinates(coords))
        );
        let state = app.snapshot();
        assert_eq!(state.query, Some(LocationQuery::Coordinates(coords)));
        assert_eq!(state.buckets().map(|b| b.len()), Some(3));
        assert_eq!(
            state.selection,
            Selection::Day {
                day: jan(1),
                hour: None
            }
        );
    }

    #[tokio::test]
    async fn search_fetches_both_endpoints_for_the_place() {
        let provider = Arc::new(ScriptedProvider::default().with("Rome", Script::ok(6)));
        let app = app(provider.clone(), ConfiguredLocation::default());

        assert!(app.search("  Rome ").await);

        assert_eq!(provider.calls(), 2);
        let state = app.snapshot();
        let Display::Data(view) = state.display() else {
            panic!("expected data display");
        };
        assert!(matches!(view.current, Section::Ready(_)));
        assert_eq!(view.summary().len(), 5);
        assert_eq!(view.hourly().len(), 2);
        assert_eq!(view.place_name().as_deref(), Some("Rome"));
    }

    #[tokio::test]
    async fn blank_search_is_ignored() {
        let provider = Arc::new(ScriptedProvider::default());
        let app = app(provider.clone(), ConfiguredLocation::default());

        assert!(!app.search("   ").await);
        assert_eq!(provider.calls(), 0);
        assert_eq!(app.snapshot(), AppState::default());
    }

    #[tokio::test]
    async fn conditions_failure_still_shows_forecast() {
        let script = Script {
            current_fails: true,
            ..Script::ok(2)
        };
        let provider = Arc::new(ScriptedProvider::default().with("Bern", script));
        let app = app(provider, ConfiguredLocation::default());

        app.search("Bern").await;

        let state = app.snapshot();
        let Display::Data(view) = state.display() else {
            panic!("expected data display, not a full-page error");
        };
        assert!(matches!(view.current, Section::Failed(_)));
        assert!(matches!(view.forecast, Section::Ready(_)));
        assert_eq!(view.summary().len(), 2);
        assert_eq!(view.selection.day(), Some(jan(1)));
    }

    #[tokio::test]
    async fn forecast_failure_still_shows_conditions() {
        let script = Script {
            forecast_fails: true,
            ..Script::ok(2)
        };
        let provider = Arc::new(ScriptedProvider::default().with("Bern", script));
        let app = app(provider, ConfiguredLocation::default());

        app.search("Bern").await;

        let state = app.snapshot();
        assert!(matches!(state.current, FetchState::Ready(_)));
        assert!(matches!(state.forecast, FetchState::Failed(_)));
        assert!(matches!(state.display(), Display::Data(_)));
        assert_eq!(state.selection, Selection::NoSelection);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_earlier_search_cannot_overwrite_newer_one() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .with("Slowtown", Script::ok(2).delayed(200))
                .with("Fasttown", Script::ok(3).delayed(10)),
        );
        let app = app(provider, ConfiguredLocation::default());

        let (first, second) = tokio::join!(app.search("Slowtown"), async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            app.search("Fasttown").await
        });

        assert!(!first);
        assert!(second);
        assert_eq!(current_place(&app).as_deref(), Some("Fasttown"));
        assert_eq!(app.snapshot().buckets().map(|b| b.len()), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn early_answer_to_superseded_search_is_discarded() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .with("Early", Script::ok(2).delayed(40))
                .with("Late", Script::ok(3).delayed(200)),
        );
        let app = app(provider, ConfiguredLocation::default());

        let (first, second) = tokio::join!(app.search("Early"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.search("Late").await
        });

        assert!(!first);
        assert!(second);
        assert_eq!(current_place(&app).as_deref(), Some("Late"));
    }

    #[tokio::test]
    async fn selecting_days_and_hours() {
        let provider = Arc::new(ScriptedProvider::default().with("Lima", Script::ok(3)));
        let app = app(provider, ConfiguredLocation::default());
        app.search("Lima").await;

        app.select_hour(1).expect("hour on first day");
        assert_eq!(app.snapshot().selection.hour(), Some(1));

        app.select_day(jan(2)).expect("second day present");
        let state = app.snapshot();
        assert_eq!(state.selection.day(), Some(jan(2)));
        assert_eq!(state.selection.hour(), None);

        let before = app.snapshot().selection;
        assert_eq!(
            app.select_day(jan(20)),
            Err(SelectionError::UnknownDay(jan(20)))
        );
        assert_eq!(app.snapshot().selection, before);

        assert_eq!(
            app.select_hour(7),
            Err(SelectionError::HourOutOfRange { index: 7, len: 2 })
        );

        app.select_hour(0).expect("hour on second day");
        app.clear_hour();
        assert_eq!(app.snapshot().selection.hour(), None);
    }

    #[tokio::test]
    async fn new_search_resets_selection() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .with("Lima", Script::ok(3))
                .with("Quito", Script::ok(2)),
        );
        let app = app(provider, ConfiguredLocation::default());

        app.search("Lima").await;
        app.select_day(jan(3)).expect("third day present");
        app.search("Quito").await;

        assert_eq!(
            app.snapshot().selection,
            Selection::Day {
                day: jan(1),
                hour: None
            }
        );
    }

    #[tokio::test]
    async fn new_search_resets_selection_even_when_it_is_still_valid() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .with("Lima", Script::ok(3))
                .with("Quito", Script::ok(3)),
        );
        let app = app(provider, ConfiguredLocation::default());

        app.search("Lima").await;
        app.select_day(jan(2)).expect("second day present");
        app.select_hour(1).expect("hour on second day");
        app.search("Quito").await;

        let state = app.snapshot();
        assert!(state.buckets().is_some_and(|b| b.contains(jan(2))));
        assert_eq!(
            state.selection,
            Selection::Day {
                day: jan(1),
                hour: None
            }
        );
    }

    #[tokio::test]
    async fn selection_without_forecast_is_rejected() {
        let app = app(Arc::new(ScriptedProvider::default()), ConfiguredLocation::default());
        assert_eq!(
            app.select_day(jan(1)),
            Err(SelectionError::UnknownDay(jan(1)))
        );
        assert_eq!(app.select_hour(0), Err(SelectionError::NoDaySelected));
    }
}
