//! Process-wide tracing setup shared by every crate in the workspace.

mod init;
mod slow;
mod spans;
mod trace_id;

pub use init::{LogFormat, init_logger};
pub use slow::warn_if_slow;
pub use spans::{child_span, cycle_span};
pub use trace_id::TraceId;
