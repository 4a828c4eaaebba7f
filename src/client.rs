//! Earthquake feed client.
//!
//! Provides blocking HTTP access to GeoJSON earthquake feeds.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::errors::QuakeError;
use crate::models::{Earthquake, FeatureCollection};

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakereport/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Anything that can turn a feed URL into an ordered list of earthquakes.
///
/// The loader only talks to this trait, so tests can swap in a double.
pub trait EarthquakeSource: Send + Sync {
    /// Fetch and parse the feed at `url`, preserving feed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be fetched or parsed.
    fn fetch_earthquakes(&self, url: &str) -> Result<Vec<Earthquake>, QuakeError>;
}

/// Available feed types for summary feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedType {
    AllHour,
    AllDay,
    AllWeek,
    AllMonth,
    Mag25Day,
    Mag25Week,
    Mag45Day,
    Mag45Week,
    SignificantWeek,
    SignificantMonth,
}

impl FeedType {
    /// Get the URL path segment for this feed type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllHour => "all_hour",
            Self::AllDay => "all_day",
            Self::AllWeek => "all_week",
            Self::AllMonth => "all_month",
            Self::Mag25Day => "2.5_day",
            Self::Mag25Week => "2.5_week",
            Self::Mag45Day => "4.5_day",
            Self::Mag45Week => "4.5_week",
            Self::SignificantWeek => "significant_week",
            Self::SignificantMonth => "significant_month",
        }
    }

    /// Full summary feed URL for this feed type.
    #[must_use]
    pub fn url(self) -> String {
        format!(
            "{USGS_BASE_URL}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.as_str()
        )
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_hour" => Ok(Self::AllHour),
            "all_day" => Ok(Self::AllDay),
            "all_week" => Ok(Self::AllWeek),
            "all_month" => Ok(Self::AllMonth),
            "2.5_day" => Ok(Self::Mag25Day),
            "2.5_week" => Ok(Self::Mag25Week),
            "4.5_day" => Ok(Self::Mag45Day),
            "4.5_week" => Ok(Self::Mag45Week),
            "significant_week" => Ok(Self::SignificantWeek),
            "significant_month" => Ok(Self::SignificantMonth),
            _ => Err(format!("unknown feed type: {s}")),
        }
    }
}

/// Sort order accepted by the FDSN event query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Most recent first
    #[default]
    Time,
    /// Oldest first
    TimeAsc,
    /// Largest first
    Magnitude,
    /// Smallest first
    MagnitudeAsc,
}

impl OrderBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::TimeAsc => "time-asc",
            Self::Magnitude => "magnitude",
            Self::MagnitudeAsc => "magnitude-asc",
        }
    }
}

impl std::str::FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "time-asc" => Ok(Self::TimeAsc),
            "magnitude" => Ok(Self::Magnitude),
            "magnitude-asc" => Ok(Self::MagnitudeAsc),
            _ => Err(format!(
                "unknown order: {s} (expected: time, time-asc, magnitude, magnitude-asc)"
            )),
        }
    }
}

/// Parameters for an FDSN event query.
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub min_magnitude: Option<f64>,
    pub limit: usize,
    pub order_by: OrderBy,
    /// Start date (YYYY-MM-DD or ISO8601), passed through verbatim
    pub start: Option<String>,
    /// End date (YYYY-MM-DD or ISO8601), passed through verbatim
    pub end: Option<String>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            min_magnitude: Some(6.0),
            limit: 10,
            order_by: OrderBy::Time,
            start: None,
            end: None,
        }
    }
}

impl EventQuery {
    /// Build the query URL against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn to_url(&self, base_url: &str) -> Result<String, QuakeError> {
        let mut params: Vec<(&str, String)> = vec![
            ("format", "geojson".into()),
            ("orderby", self.order_by.as_str().into()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(min) = self.min_magnitude {
            params.push(("minmag", min.to_string()));
        }
        if let Some(start) = &self.start {
            params.push(("starttime", start.clone()));
        }
        if let Some(end) = &self.end {
            params.push(("endtime", end.clone()));
        }

        let endpoint = format!("{}/fdsnws/event/1/query", base_url.trim_end_matches('/'));
        let url = Url::parse_with_params(&endpoint, &params)
            .map_err(|e| QuakeError::InvalidResponse(format!("bad query URL {endpoint}: {e}")))?;
        Ok(url.into())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Client for GeoJSON earthquake feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Create a new feed client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakeError> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new feed client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_config(config: &ClientConfig) -> Result<Self, QuakeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a GeoJSON feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or response cannot be parsed.
    #[instrument(skip(self))]
    pub fn fetch_feed(&self, url: &str) -> Result<FeatureCollection, QuakeError> {
        debug!("fetching feed from {}", url);

        let response = self.client.get(url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        let feed: FeatureCollection = serde_json::from_str(&body)?;

        feed.validate()?;

        if let Some(meta) = &feed.metadata {
            debug!(
                "feed '{}' reports {} events",
                meta.title.as_deref().unwrap_or("untitled"),
                meta.count.unwrap_or(feed.features.len())
            );
        }
        debug!("fetched {} features", feed.features.len());
        Ok(feed)
    }
}

impl EarthquakeSource for FeedClient {
    fn fetch_earthquakes(&self, url: &str) -> Result<Vec<Earthquake>, QuakeError> {
        Ok(self.fetch_feed(url)?.into_earthquakes())
    }
}
