//! Refresh coordinator: one city, one schedule, one published snapshot.
//!
//! A refresh fetches the feed, parses it, finds the configured city and
//! normalizes its fields into a new [`Reading`]. The snapshot is published
//! through a `watch` channel, so readers always see either the previous or
//! the new snapshot and never cause network traffic themselves.
//!
//! At most one fetch is in flight per coordinator. A refresh requested
//! while another is running waits for it and returns the same outcome.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::error::{NodeError, RefreshError};
use crate::feed::{parse_document, FeedSource, HttpFeed};
use crate::reading::Reading;

/// Latest published snapshot, `None` until the first successful refresh.
pub type Snapshot = Option<Arc<Reading>>;

/// Outcome of one refresh cycle.
pub type RefreshResult = Result<Arc<Reading>, RefreshError>;

/// Refresh bookkeeping for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RefreshStatus {
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<RefreshError>,
    pub consecutive_failures: u32,
}

#[derive(Default)]
struct CycleState {
    /// Completed fetch attempts, successful or not
    attempts: u64,
    last_outcome: Option<RefreshResult>,
    status: RefreshStatus,
}

/// Polls one city and publishes its snapshots.
pub struct Coordinator<S: FeedSource = HttpFeed> {
    city: String,
    update_interval: Duration,
    source: S,
    snapshot: watch::Sender<Snapshot>,
    in_flight: tokio::sync::Mutex<()>,
    state: Mutex<CycleState>,
}

impl<S: FeedSource> fmt::Debug for Coordinator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("city", &self.city)
            .field("update_interval", &self.update_interval)
            .field("has_snapshot", &self.snapshot.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl Coordinator<HttpFeed> {
    /// Build a coordinator backed by the HTTP feed described in `config`.
    pub fn from_config(config: &Config) -> Result<Self, NodeError> {
        config.validate()?;
        let source = HttpFeed::new(&config.url, config.timeout())?;
        Ok(Self::new(&config.city, config.update_interval(), source))
    }
}

impl<S: FeedSource> Coordinator<S> {
    pub fn new(city: impl Into<String>, update_interval: Duration, source: S) -> Self {
        Self {
            city: city.into(),
            update_interval,
            source,
            snapshot: watch::Sender::new(None),
            in_flight: tokio::sync::Mutex::new(()),
            state: Mutex::new(CycleState::default()),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Latest published snapshot. Never blocks on a refresh and never fetches.
    pub fn current(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Whether a fetch is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub fn status(&self) -> RefreshStatus {
        self.lock_state().status.clone()
    }

    /// Refresh now, or join the refresh already in flight.
    ///
    /// On failure the published snapshot is left untouched. Dropping the
    /// returned future cancels the fetch without publishing anything.
    pub async fn refresh(&self) -> RefreshResult {
        let seen = self.lock_state().attempts;
        let _guard = self.in_flight.lock().await;

        {
            let state = self.lock_state();
            if state.attempts != seen {
                if let Some(outcome) = &state.last_outcome {
                    log::debug!("{}: joined in-flight refresh", self.city);
                    return outcome.clone();
                }
            }
        }

        let outcome = self.fetch_and_publish().await;

        let mut state = self.lock_state();
        state.attempts += 1;
        match &outcome {
            Ok(_) => {
                state.status.last_success = Some(Utc::now());
                state.status.consecutive_failures = 0;
            }
            Err(e) => {
                state.status.last_failure = Some(Utc::now());
                state.status.last_error = Some(e.clone());
                state.status.consecutive_failures += 1;
            }
        }
        state.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Startup refresh. Failure here means the poller is not ready to serve.
    pub async fn first_refresh(&self) -> Result<Arc<Reading>, NodeError> {
        self.refresh().await.map_err(|e| {
            log::error!("{}: initial update failed: {}", self.city, e);
            NodeError::NotReady(e)
        })
    }

    /// Refresh on the configured interval until `shutdown` fires.
    ///
    /// The first interval tick is skipped; callers are expected to have run
    /// [`Coordinator::first_refresh`]. Failed cycles are logged and the
    /// next tick retries. A shutdown during a fetch abandons it.
    pub async fn run(&self, mut shutdown: watch::Receiver<()>) {
        log::info!(
            "{}: polling every {}s",
            self.city,
            self.update_interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    log::info!("{}: shutdown during refresh, abandoning fetch", self.city);
                    break;
                }
                result = self.refresh() => {
                    if let Err(e) = result {
                        log::warn!(
                            "{}: refresh failed ({}), keeping previous snapshot",
                            self.city,
                            e
                        );
                    }
                }
            }
        }

        log::info!("{}: coordinator stopped", self.city);
    }

    async fn fetch_and_publish(&self) -> RefreshResult {
        log::debug!("{}: fetching feed", self.city);
        let body = self.source.fetch().await?;
        let document = parse_document(&body)?;
        let record = document
            .find_city(&self.city)
            .ok_or_else(|| RefreshError::CityNotFound(self.city.clone()))?;

        let previous = self.current();
        let reading = Arc::new(Reading::from_record(record, previous.as_deref())?);
        self.snapshot.send_replace(Some(Arc::clone(&reading)));

        log::info!(
            "{}: published temperature={:?} humidity={:?} pressure={:?} condition={:?}",
            self.city,
            reading.temperature,
            reading.humidity,
            reading.pressure,
            reading.condition_raw
        );
        Ok(reading)
    }

    fn lock_state(&self) -> MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
