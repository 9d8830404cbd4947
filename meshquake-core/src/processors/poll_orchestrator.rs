//! PollOrchestrator.
//!
//! Owns the per-cycle sequence:
//! fetch -> select -> compose -> record -> deliver.
//!
//! Rehearsal mode records but never delivers, and reports the stored history
//! instead. Live mode repeats the cycle on a fixed interval until the
//! shutdown signal fires; a running cycle always completes first.

use crate::config::RunConfig;
use crate::entities::processed_record::{
    ListProcessedRecords, MarkEventProcessed, ProcessedRecord, RecordStore,
};
use crate::feed::EventFeed;
use crate::processors::alert::AlertMessage;
use crate::processors::dispatcher::{DeliveryDispatcher, DeliveryReport};
use crate::processors::selector::EventSelector;
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Errors that end a cycle early.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("record store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The feed could not be fetched or decoded.
    NoData,
    /// No event passed the filters.
    NoMatch,
    /// Rehearsal: the alert was recorded but not sent.
    Rehearsed {
        event_id: String,
        alert: AlertMessage,
        history: Vec<ProcessedRecord>,
    },
    /// The alert was recorded and handed to the transport.
    Dispatched {
        event_id: String,
        alert: AlertMessage,
        report: DeliveryReport,
    },
}

pub struct PollOrchestrator {
    config: Arc<RunConfig>,
    feed: Arc<dyn EventFeed>,
    store: RecordStore,
    dispatcher: DeliveryDispatcher,
}

impl PollOrchestrator {
    pub fn new(
        config: Arc<RunConfig>,
        feed: Arc<dyn EventFeed>,
        store: RecordStore,
        dispatcher: DeliveryDispatcher,
    ) -> Self {
        Self {
            config,
            feed,
            store,
            dispatcher,
        }
    }

    /// Run according to the configured mode.
    ///
    /// Single-shot modes return the outcome of their only cycle. Live mode
    /// returns `None` once shutdown is signaled; store errors inside a live
    /// cycle are logged and the loop carries on.
    pub async fn run(
        &self,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Option<CycleOutcome>, PipelineError> {
        if !self.config.mode.is_continuous() {
            return self.run_cycle().await.map(Some);
        }

        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "PollOrchestrator started"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            match self.run_cycle().await {
                Ok(outcome) => debug!(?outcome, "Cycle finished"),
                Err(e) => error!(error = %e, "Cycle failed"),
            }

            if self.wait_for_next_cycle(&mut shutdown_rx).await {
                break;
            }
        }

        info!("PollOrchestrator shutdown complete");
        Ok(None)
    }

    /// Sleep out the poll interval. Returns true if shutdown was signaled.
    async fn wait_for_next_cycle(&self, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
        let deadline = Instant::now() + self.config.poll_interval;

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    match changed {
                        Ok(()) if *shutdown_rx.borrow() => {
                            info!("PollOrchestrator received shutdown signal");
                            return true;
                        }
                        Ok(()) => continue,
                        Err(_) => {
                            // Sender gone: nobody can stop us any more.
                            tokio::time::sleep_until(deadline).await;
                            return false;
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline) => return false,
            }
        }
    }

    /// Execute one full pipeline pass.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, PipelineError> {
        let events = match self.feed.fetch().await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "Fetch error, skipping cycle");
                return Ok(CycleOutcome::NoData);
            }
        };
        debug!(events = events.len(), "Fetched events");

        let selector = EventSelector::new(&self.config, &self.store);
        let Some(selected) = selector.select(events).await? else {
            debug!("No matching event this cycle");
            return Ok(CycleOutcome::NoMatch);
        };

        let alert = AlertMessage::compose(&selected, &self.config.observer);
        let event_id = selected.event.id.clone();
        info!(
            event_id = %event_id,
            distance_miles = selected.distance_miles,
            bytes = alert.byte_length(),
            message = %alert.full_text,
            "Matched event"
        );

        // Recorded before delivery and regardless of its outcome.
        let inserted = self
            .store
            .process(MarkEventProcessed {
                id: event_id.clone(),
                message: alert.full_text.clone(),
                timestamp: selected.event.occurred_at_seconds(),
            })
            .await?;
        info!(event_id = %event_id, inserted, "Stored processed record");

        if !self.config.mode.delivers() {
            let history = self.store.process(ListProcessedRecords).await?;
            return Ok(CycleOutcome::Rehearsed {
                event_id,
                alert,
                history,
            });
        }

        let report = self
            .dispatcher
            .deliver(&alert.parts(), &self.config.delivery)
            .await;
        if !report.is_complete() {
            warn!(
                event_id = %event_id,
                failed = report.failed,
                attempted = report.attempted,
                "Alert only partially delivered"
            );
        }

        Ok(CycleOutcome::Dispatched {
            event_id,
            alert,
            report,
        })
    }
}
