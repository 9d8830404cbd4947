//! Delivery dispatcher.
//!
//! Sends the parts of one alert through a [`Transport`] in order, pausing
//! between parts so the radio stays inside its duty cycle. Delivery is best
//! effort: a failed part is logged and the remaining parts are still sent.

use crate::config::DeliveryTarget;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Pause between consecutive parts of a multi-part alert.
pub const DEFAULT_PART_PACING: Duration = Duration::from_secs(4);

/// Outcome of delivering one alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

pub struct DeliveryDispatcher {
    transport: Arc<dyn Transport>,
    pacing: Duration,
}

impl DeliveryDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            pacing: DEFAULT_PART_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Send every part in order. Never aborts early.
    pub async fn deliver(&self, parts: &[String], target: &DeliveryTarget) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pacing).await;
            }

            report.attempted += 1;
            match self
                .transport
                .send_text(part, target.channel, target.radio_address.as_deref())
                .await
            {
                Ok(()) => {
                    info!(channel = target.channel, text = %part, "Sent message");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        channel = target.channel,
                        error = %e,
                        text = %part,
                        "Transport send failed"
                    );
                }
            }
        }

        report
    }
}
