pub mod feed;
pub mod geocode;
