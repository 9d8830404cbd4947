use serde::{Deserialize, Serialize};

/// Response of `GET /us/{postal code}` on the Zippopotam API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalCodeLookup {
    #[serde(rename = "post code", default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub places: Vec<PostalPlace>,
}

/// One place inside a postal code. Coordinates are decimal strings upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalPlace {
    #[serde(rename = "place name")]
    pub place_name: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(rename = "state abbreviation", default)]
    pub state_abbreviation: Option<String>,
}
