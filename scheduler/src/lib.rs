//! Deal reconciliation engine.
//!
//! One fetch per poll cycle is fanned out to every active subscriber:
//! [`filter::evaluate`] picks the matching items, [`reconcile::reconcile`]
//! diffs them against what the subscriber already sees, and
//! [`reconcile::apply`] pushes the resulting operations through a
//! [`sink::DisplaySink`]. [`engine::MonitorScheduler`] owns the cadence.

pub mod engine;
pub mod errors;
pub mod filter;
pub mod reconcile;
pub mod render;
pub mod sink;
pub mod state;
pub mod types;

pub use engine::MonitorScheduler;
pub use errors::SinkError;
pub use sink::DisplaySink;
pub use state::{DisplayEntry, DisplayState, DisplayStateStore};
pub use types::{ApplyOutcome, CycleReport, DisplayHandle, DisplayOperation, MonitorConfig};
