//! Postal-code geocoding for the observer location.
//!
//! Resolution happens once at startup; any error here is fatal to the
//! process before the first cycle.

use crate::geo::{GeoPoint, ObserverLocation};
use async_trait::async_trait;
use meshquake_sdk::client::{ClientError, GeocodeClient};
use meshquake_sdk::objects::geocode::PostalCodeLookup;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("postal code lookup failed: {0}")]
    Client(#[from] ClientError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("no places found for postal code {0}")]
    NotFound(String),

    #[error("invalid coordinate {value:?}: {source}")]
    InvalidCoordinate {
        value: String,
        source: std::num::ParseFloatError,
    },
}

/// Resolves a postal code to an observer location.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, postal_code: &str) -> Result<ObserverLocation, GeocodeError>;
}

/// Geocoder backed by the Zippopotam API.
pub struct ZippopotamGeocoder {
    client: GeocodeClient,
}

impl ZippopotamGeocoder {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.zippopotam.us/us/";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: GeocodeClient::new(base_url).with_http_client(http),
        })
    }
}

#[async_trait]
impl Geocoder for ZippopotamGeocoder {
    async fn resolve(&self, postal_code: &str) -> Result<ObserverLocation, GeocodeError> {
        let lookup = self.client.lookup(postal_code).await?;
        location_from_lookup(postal_code, lookup)
    }
}

/// Take the first place of a lookup as the observer location.
pub fn location_from_lookup(
    postal_code: &str,
    lookup: PostalCodeLookup,
) -> Result<ObserverLocation, GeocodeError> {
    let Some(place) = lookup.places.into_iter().next() else {
        return Err(GeocodeError::NotFound(postal_code.to_string()));
    };
    let latitude = parse_coordinate(&place.latitude)?;
    let longitude = parse_coordinate(&place.longitude)?;
    Ok(ObserverLocation::new(
        GeoPoint::new(latitude, longitude),
        place.place_name,
    ))
}

fn parse_coordinate(value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse()
        .map_err(|source| GeocodeError::InvalidCoordinate {
            value: value.to_string(),
            source,
        })
}
