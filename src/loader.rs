//! Background loading of an earthquake feed.
//!
//! One call to [`EarthquakeLoader::load`] is one load cycle: a single fetch
//! on a blocking worker, with the whole result handed back at once. Nothing
//! is cached between cycles.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::client::EarthquakeSource;
use crate::errors::QuakeError;
use crate::models::Earthquake;

/// Observable loader state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load has been requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last cycle finished with this many records
    Loaded { count: usize },
    /// The last cycle failed
    Failed(String),
}

/// Loads the earthquakes behind one feed URL.
pub struct EarthquakeLoader<S: ?Sized> {
    source: Arc<S>,
    url: Option<String>,
    state: watch::Sender<LoadState>,
}

impl<S> EarthquakeLoader<S>
where
    S: EarthquakeSource + ?Sized + 'static,
{
    /// Create a loader for `url`. An empty string means no URL.
    pub fn new(source: Arc<S>, url: Option<String>) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        let (state, _) = watch::channel(LoadState::Idle);
        Self { source, url, state }
    }

    /// The configured feed URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Run one load cycle.
    ///
    /// Without a URL this returns an empty list immediately and never calls
    /// the source. Otherwise exactly one fetch runs on a blocking worker so
    /// the calling task is never blocked on I/O. Dropping the returned
    /// future abandons the cycle; the worker's result is discarded.
    ///
    /// # Errors
    ///
    /// Returns the source's error, or [`QuakeError::Worker`] if the worker
    /// panicked.
    pub async fn load(&self) -> Result<Vec<Earthquake>, QuakeError> {
        self.state.send_replace(LoadState::Loading);

        let Some(url) = self.url.clone() else {
            debug!("no feed URL configured, nothing to load");
            self.state.send_replace(LoadState::Loaded { count: 0 });
            return Ok(Vec::new());
        };

        let source = Arc::clone(&self.source);
        let result = tokio::task::spawn_blocking(move || source.fetch_earthquakes(&url))
            .await
            .map_err(|e| QuakeError::Worker(e.to_string()))
            .and_then(|r| r);

        match &result {
            Ok(quakes) => {
                debug!("load finished with {} earthquakes", quakes.len());
                self.state
                    .send_replace(LoadState::Loaded { count: quakes.len() });
            }
            Err(e) => {
                self.state.send_replace(LoadState::Failed(e.to_string()));
            }
        }
        result
    }
}
