//! Feed fetcher.
//!
//! Retrieves the current snapshot of the upstream earthquake feed and
//! normalises it into [`QuakeEvent`]s. Callers treat any [`FeedError`] as
//! "no data this cycle".

use crate::geo::GeoPoint;
use async_trait::async_trait;
use meshquake_sdk::client::{ClientError, FeedClient};
use meshquake_sdk::objects::feed::{Feature, FeatureCollection};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors that can occur while fetching the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network failure, non-2xx status or undecodable payload.
    #[error("feed request failed: {0}")]
    Client(#[from] ClientError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// One seismic event as seen by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeEvent {
    /// Stable across repeated fetches of the same event.
    pub id: String,
    pub magnitude: f64,
    pub place: Option<String>,
    /// `None` when the feature carried no usable geometry.
    pub location: Option<GeoPoint>,
    pub occurred_at_millis: i64,
}

impl QuakeEvent {
    /// Normalise a feed feature. Features without an id are dropped.
    pub fn from_feature(feature: Feature) -> Option<Self> {
        let id = feature.id?;
        let location = feature
            .geometry
            .as_ref()
            .and_then(|g| g.lat_lon())
            .map(|(lat, lon)| GeoPoint::new(lat, lon));
        Some(Self {
            id,
            magnitude: feature.properties.mag.unwrap_or(0.0),
            place: feature.properties.place,
            location,
            occurred_at_millis: feature.properties.time.unwrap_or(0),
        })
    }

    /// Occurrence time truncated to whole seconds.
    pub fn occurred_at_seconds(&self) -> i64 {
        self.occurred_at_millis / 1000
    }
}

/// Normalise a whole document, keeping feed order.
pub fn events_from_collection(collection: FeatureCollection) -> Vec<QuakeEvent> {
    collection
        .features
        .into_iter()
        .filter_map(QuakeEvent::from_feature)
        .collect()
}

/// Source of event snapshots.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Perform one retrieval of the feed.
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError>;
}

/// The USGS GeoJSON summary feed.
pub struct UsgsFeed {
    client: FeedClient,
}

impl UsgsFeed {
    pub const DEFAULT_URL: &'static str =
        "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a feed reader for `url` with a per-request timeout.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: FeedClient::new(url).with_http_client(http),
        })
    }
}

#[async_trait]
impl EventFeed for UsgsFeed {
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError> {
        let collection = self.client.fetch().await?;
        let total = collection.features.len();
        let events = events_from_collection(collection);
        debug!(
            url = %self.client.url(),
            features = total,
            events = events.len(),
            "Fetched earthquake feed"
        );
        Ok(events)
    }
}
