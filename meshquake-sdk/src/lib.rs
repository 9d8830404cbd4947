//! Wire types for the upstream services meshquake talks to.
//!
//! - [`objects::feed`]: the USGS GeoJSON summary feed.
//! - [`objects::geocode`]: the Zippopotam postal-code lookup API.
//!
//! Enable the `client` feature for typed `reqwest` clients.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
