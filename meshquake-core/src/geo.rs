//! Geographic primitives and great-circle distance.

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in miles.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_miles(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// The fixed point alerts are evaluated against, with its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverLocation {
    pub point: GeoPoint,
    pub label: String,
}

impl ObserverLocation {
    /// Downtown San Jose, the default home location.
    pub const DEFAULT_POINT: GeoPoint = GeoPoint::new(37.3382, -121.8863);
    pub const DEFAULT_LABEL: &'static str = "SJ";

    pub fn new(point: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            point,
            label: label.into(),
        }
    }
}

impl Default for ObserverLocation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POINT, Self::DEFAULT_LABEL)
    }
}

/// Haversine distance between two coordinates, in miles.
///
/// Symmetric in its arguments and zero for identical points.
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1.0 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_MILES * c
}
