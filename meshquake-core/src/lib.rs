#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod entities;
pub mod feed;
pub mod geo;
pub mod geocoder;
pub mod processors;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;
