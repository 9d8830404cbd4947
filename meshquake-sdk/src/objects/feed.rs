//! GeoJSON summary feed objects.
//!
//! Only the fields meshquake reads are modelled. Everything that may be
//! `null` or absent upstream is an `Option`, and a feature that still fails
//! to decode is dropped so the rest of the document survives.

use serde::{Deserialize, Deserializer, Serialize};

/// Root document returned by the summary feed.
///
/// `features` is required: a document without it is treated as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(deserialize_with = "skip_malformed")]
    pub features: Vec<Feature>,
}

/// A single seismic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable event id, e.g. `nc75095651`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: FeatureProperties,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    /// Origin time in epoch milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
}

/// Point geometry, `coordinates = [lon, lat, depth]`. Any entry may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Option<Vec<Option<f64>>>,
}

fn skip_malformed<'de, D>(deserializer: D) -> Result<Vec<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Geometry {
    /// Returns `(latitude, longitude)` when the first two coordinates are
    /// present and non-null.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_deref() {
            Some([Some(lon), Some(lat), ..]) => Some((*lat, *lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usgs_document() {
        let json = r#"{
            "type": "FeatureCollection",
            "metadata": {"generated": 1718000000000, "count": 2},
            "features": [
                {
                    "type": "Feature",
                    "id": "nc75095651",
                    "properties": {"mag": 2.31, "place": "5 km NW of Milpitas, CA", "time": 1718000000000},
                    "geometry": {"type": "Point", "coordinates": [-121.93, 37.46, 7.2]}
                },
                {
                    "type": "Feature",
                    "id": "ak0247rz5j0w",
                    "properties": {"mag": null, "place": null, "time": 1717999000000},
                    "geometry": null
                }
            ]
        }"#;

        let doc: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(doc.features.len(), 2);

        let first = &doc.features[0];
        assert_eq!(first.id.as_deref(), Some("nc75095651"));
        assert_eq!(first.properties.mag, Some(2.31));
        let (lat, lon) = first.geometry.as_ref().unwrap().lat_lon().unwrap();
        assert_eq!(lat, 37.46);
        assert_eq!(lon, -121.93);

        let second = &doc.features[1];
        assert!(second.properties.mag.is_none());
        assert!(second.geometry.is_none());
    }

    #[test]
    fn test_missing_features_is_an_error() {
        let json = r#"{"type": "FeatureCollection", "metadata": {}}"#;
        assert!(serde_json::from_str::<FeatureCollection>(json).is_err());
    }

    #[test]
    fn test_short_coordinates_have_no_position() {
        let geometry = Geometry {
            coordinates: Some(vec![Some(-121.9)]),
        };
        assert!(geometry.lat_lon().is_none());
        assert!(Geometry { coordinates: None }.lat_lon().is_none());

        let null_latitude = Geometry {
            coordinates: Some(vec![Some(-121.9), None, Some(3.0)]),
        };
        assert!(null_latitude.lat_lon().is_none());
    }

    #[test]
    fn test_odd_feature_does_not_discard_the_document() {
        let json = r#"{"features": [
            {"id": "good", "properties": {"mag": 3.4, "place": "Here", "time": 5}, "geometry": {"coordinates": [-121.9, 37.3, 8.0]}},
            {"id": "odd", "properties": null, "geometry": {"coordinates": [-121.0, 37.0, null]}},
            {"id": "broken", "properties": {"mag": "strong"}},
            42
        ]}"#;

        let doc: FeatureCollection = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = doc.features.iter().map(|f| f.id.as_deref()).collect();
        assert_eq!(ids, [Some("good"), Some("odd")]);

        let good = &doc.features[0];
        assert_eq!(good.properties.mag, Some(3.4));
        assert_eq!(good.geometry.as_ref().unwrap().lat_lon(), Some((37.3, -121.9)));

        let odd = &doc.features[1];
        assert_eq!(odd.properties, FeatureProperties::default());
        assert_eq!(odd.geometry.as_ref().unwrap().lat_lon(), Some((37.0, -121.0)));
    }
}
