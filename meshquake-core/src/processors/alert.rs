//! Alert text composition.
//!
//! An alert has three segments, always in the order summary, place,
//! date/time. The joined text goes out as one message when it fits in
//! [`MAX_SINGLE_PART_BYTES`] UTF-8 bytes; otherwise each segment is sent as
//! its own labelled part.

use crate::geo::ObserverLocation;
use crate::processors::selector::SelectedEvent;
use crate::utils::local_time;

/// Largest alert, in UTF-8 bytes, that is sent as a single message.
pub const MAX_SINGLE_PART_BYTES: usize = 200;

pub const UNKNOWN_PLACE: &str = "Unknown location";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// `M{mag:.1} {distance:.0}mi from {label}`
    pub summary: String,
    pub place: String,
    /// `MM-DD HH:MM PDT`
    pub datetime_text: String,
    /// `{summary}: {place}, {datetime_text}`
    pub full_text: String,
}

impl AlertMessage {
    pub fn compose(selected: &SelectedEvent, observer: &ObserverLocation) -> Self {
        let event = &selected.event;
        let summary = format!(
            "M{:.1} {:.0}mi from {}",
            event.magnitude, selected.distance_miles, observer.label
        );
        let place = event
            .place
            .clone()
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string());
        let occurred_at = local_time::from_epoch_millis(event.occurred_at_millis);
        let datetime_text = format!(
            "{} {}",
            local_time::short_stamp(occurred_at),
            local_time::ZONE_LABEL
        );
        let full_text = format!("{summary}: {place}, {datetime_text}");

        Self {
            summary,
            place,
            datetime_text,
            full_text,
        }
    }

    /// Length of the full text in UTF-8 bytes.
    pub fn byte_length(&self) -> usize {
        self.full_text.len()
    }

    pub fn needs_split(&self) -> bool {
        self.byte_length() > MAX_SINGLE_PART_BYTES
    }

    /// The texts to hand to the transport, in send order.
    pub fn parts(&self) -> Vec<String> {
        if self.needs_split() {
            vec![
                format!("Part 1: {}", self.summary),
                format!("Part 2: {}", self.place),
                format!("Part 3: {}", self.datetime_text),
            ]
        } else {
            vec![self.full_text.clone()]
        }
    }
}
