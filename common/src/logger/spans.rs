use tracing::{Span, field};

use super::TraceId;

/// Root span for one poll cycle. `depth` and `items` are recorded once the
/// fetch resolves.
pub fn cycle_span(cycle: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        cycle,
        trace_id = %trace_id,
        depth = field::Empty,
        items = field::Empty
    )
}

/// Child span for work done on behalf of a single subscriber. Inherits the
/// cycle's trace id through the span tree.
pub fn child_span(name: &'static str, subscriber_id: i64) -> Span {
    tracing::info_span!("subscriber", name = %name, subscriber_id)
}
