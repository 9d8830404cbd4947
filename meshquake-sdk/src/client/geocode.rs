//! Postal-code lookup client.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::geocode::PostalCodeLookup;

/// Typed HTTP client for the Zippopotam API.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: Url,
}

impl GeocodeClient {
    /// Create a new `GeocodeClient`.
    ///
    /// `base_url` must end with a slash, e.g. `https://api.zippopotam.us/us/`,
    /// so that the postal code is appended as the last path segment.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET {base_url}{postal_code}` – look up a postal code.
    pub async fn lookup(&self, postal_code: &str) -> Result<PostalCodeLookup, ClientError> {
        let url = self.base_url.join(postal_code)?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }
}
