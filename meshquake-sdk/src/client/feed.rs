//! Earthquake summary feed client.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::feed::FeatureCollection;

/// Typed HTTP client for one GeoJSON summary feed URL.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    url: Url,
}

impl FeedClient {
    /// Create a new `FeedClient` for the given feed URL, e.g.
    /// `https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson`.
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `GET {url}` – fetch the current snapshot of the feed.
    pub async fn fetch(&self) -> Result<FeatureCollection, ClientError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        parse_response(resp).await
    }
}
