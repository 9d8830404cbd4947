//! The per-cycle pipeline stages.
//!
//! - `EventSelector`: orders a feed snapshot and picks at most one event
//! - `AlertMessage`: composes the alert text and decides how to split it
//! - `DeliveryDispatcher`: sends the parts through a `Transport`
//! - `PollOrchestrator`: runs fetch -> select -> compose -> record -> deliver

pub mod alert;
pub mod dispatcher;
pub mod poll_orchestrator;
pub mod selector;

pub use alert::AlertMessage;
pub use dispatcher::{DeliveryDispatcher, DeliveryReport};
pub use poll_orchestrator::{CycleOutcome, PipelineError, PollOrchestrator};
pub use selector::{EventSelector, SelectedEvent};
