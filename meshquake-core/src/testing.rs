//! Test doubles shared by the processor tests.

use crate::feed::{EventFeed, FeedError, QuakeEvent};
use crate::geo::GeoPoint;
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use meshquake_sdk::client::ClientError;
use std::sync::Mutex;

pub(crate) fn event(id: &str, magnitude: f64, location: GeoPoint, millis: i64) -> QuakeEvent {
    QuakeEvent {
        id: id.to_string(),
        magnitude,
        place: Some(format!("near {id}")),
        location: Some(location),
        occurred_at_millis: millis,
    }
}

/// A point `miles` due north of `origin`.
pub(crate) fn north_of(origin: GeoPoint, miles: f64) -> GeoPoint {
    let degrees = (miles / crate::geo::EARTH_RADIUS_MILES).to_degrees();
    GeoPoint::new(origin.latitude + degrees, origin.longitude)
}

/// Feed that returns a fixed snapshot, or fails when `events` is `None`.
pub(crate) struct StaticFeed {
    pub events: Option<Vec<QuakeEvent>>,
}

#[async_trait]
impl EventFeed for StaticFeed {
    async fn fetch(&self) -> Result<Vec<QuakeEvent>, FeedError> {
        match &self.events {
            Some(events) => Ok(events.clone()),
            None => Err(FeedError::Client(ClientError::Json(
                serde_json::from_str::<u8>("not json").unwrap_err(),
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentText {
    pub text: String,
    pub channel: u32,
    pub target: Option<String>,
}

/// Transport that records every call and optionally fails some of them.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    pub sent: Mutex<Vec<SentText>>,
    /// Zero-based call indices that should fail.
    pub fail_calls: Vec<usize>,
}

impl RecordingTransport {
    pub fn failing_on(fail_calls: Vec<usize>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_calls,
        }
    }

    pub fn sent(&self) -> Vec<SentText> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        text: &str,
        channel: u32,
        target: Option<&str>,
    ) -> Result<(), TransportError> {
        let index = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentText {
                text: text.to_string(),
                channel,
                target: target.map(str::to_string),
            });
            sent.len() - 1
        };
        if self.fail_calls.contains(&index) {
            return Err(TransportError::Spawn {
                program: "recording".to_string(),
                source: std::io::Error::other("radio unplugged"),
            });
        }
        Ok(())
    }
}
