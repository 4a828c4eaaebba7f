//! Data models for earthquake feeds.
//!
//! The wire structures match the GeoJSON served by the USGS summary feeds
//! and the FDSN event query endpoint. [`Earthquake`] is the record the rest
//! of the crate works with.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::QuakeError;

/// Top-level GeoJSON response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakeError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }

    /// Extract records in feed order.
    ///
    /// Features without a magnitude carry nothing to display and are skipped.
    #[must_use]
    pub fn into_earthquakes(self) -> Vec<Earthquake> {
        self.features
            .into_iter()
            .filter_map(|feature| {
                let id = feature.id.clone();
                let quake = Earthquake::from_feature(feature);
                if quake.is_none() {
                    warn!("skipping feature {} without magnitude", id);
                }
                quake
            })
            .collect()
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Human-readable title
    pub title: Option<String>,

    /// Number of events in response
    pub count: Option<usize>,
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    #[serde(default)]
    pub id: String,

    /// Event properties
    pub properties: Properties,
}

/// Event properties, limited to what the list displays.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Event page URL
    pub url: Option<String>,
}

/// One earthquake as shown in the list.
///
/// Values are fixed at construction; there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Earthquake {
    magnitude: f64,
    place: String,
    time: i64,
    url: String,
}

impl Earthquake {
    /// Create a record from its four display fields.
    #[must_use]
    pub fn new(magnitude: f64, place: impl Into<String>, time: i64, url: impl Into<String>) -> Self {
        Self {
            magnitude,
            place: place.into(),
            time,
            url: url.into(),
        }
    }

    /// Build a record from a feed feature, or `None` when it has no magnitude.
    #[must_use]
    pub fn from_feature(feature: Feature) -> Option<Self> {
        let props = feature.properties;
        let magnitude = props.mag?;
        Some(Self::new(
            magnitude,
            props.place.unwrap_or_default(),
            props.time,
            props.url.unwrap_or_default(),
        ))
    }

    /// Seismic magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Raw place description, e.g. `"86km NE of Rincon, Puerto Rico"`.
    #[must_use]
    pub fn place(&self) -> &str {
        &self.place
    }

    /// Occurrence time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn time_millis(&self) -> i64 {
        self.time
    }

    /// Detail page link.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}
