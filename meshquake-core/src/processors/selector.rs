//! Event filter and selector.
//!
//! Orders a snapshot newest first and returns the first event that is new
//! (live mode only), has coordinates, lies within the radius and is strong
//! enough. At most one event is selected per cycle, which caps delivery at
//! one alert per poll interval however bursty the feed is.

use crate::config::{AlertThresholds, RunConfig};
use crate::entities::processed_record::{IsEventProcessed, RecordStore};
use crate::feed::QuakeEvent;
use crate::geo::ObserverLocation;
use kanau::processor::Processor;
use tracing::trace;

/// The event chosen for this cycle, with its distance from the observer.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedEvent {
    pub event: QuakeEvent,
    pub distance_miles: f64,
}

/// Stable sort by occurrence time, newest first.
pub fn order_newest_first(events: &mut [QuakeEvent]) {
    events.sort_by(|a, b| b.occurred_at_millis.cmp(&a.occurred_at_millis));
}

/// Applies the coordinate, radius and magnitude gates.
///
/// Returns the distance from the observer when all gates pass. The radius
/// is inclusive.
pub fn qualify(
    event: &QuakeEvent,
    observer: &ObserverLocation,
    thresholds: &AlertThresholds,
) -> Option<f64> {
    let location = event.location?;
    let distance = location.distance_to(&observer.point);
    if distance > thresholds.max_distance_miles {
        return None;
    }
    if event.magnitude < thresholds.min_magnitude {
        return None;
    }
    Some(distance)
}

pub struct EventSelector<'a> {
    config: &'a RunConfig,
    store: &'a RecordStore,
}

impl<'a> EventSelector<'a> {
    pub fn new(config: &'a RunConfig, store: &'a RecordStore) -> Self {
        Self { config, store }
    }

    /// Pick the single event to report this cycle, if any.
    pub async fn select(
        &self,
        mut events: Vec<QuakeEvent>,
    ) -> Result<Option<SelectedEvent>, sqlx::Error> {
        order_newest_first(&mut events);

        for event in events {
            if self.config.mode.deduplicates()
                && self
                    .store
                    .process(IsEventProcessed {
                        id: event.id.clone(),
                    })
                    .await?
            {
                trace!(event_id = %event.id, "Skipping already processed event");
                continue;
            }

            let Some(distance_miles) =
                qualify(&event, &self.config.observer, &self.config.thresholds)
            else {
                trace!(event_id = %event.id, "Event filtered out");
                continue;
            };

            return Ok(Some(SelectedEvent {
                event,
                distance_miles,
            }));
        }

        Ok(None)
    }
}
