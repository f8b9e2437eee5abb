//! Diff a subscriber's matched items against what it already sees, then
//! apply the difference through a sink.
//!
//! Operation order is fixed: every Delete, then every Create, then every
//! Update. Failure rules when applying:
//!   - failed Create or Update: the entry is left absent, so the item is
//!     offered again as a Create on the next cycle;
//!   - failed Delete: the entry is removed anyway.

use std::collections::HashSet;
use std::time::Duration;

use common::logger::warn_if_slow;
use market::ItemSnapshot;
use subscriber::SubscriberId;
use tracing::{debug, trace, warn};

use crate::errors::SinkError;
use crate::render::render;
use crate::sink::DisplaySink;
use crate::state::{DisplayEntry, DisplayState};
use crate::types::{ApplyOutcome, DisplayOperation};

/// Operations that turn `state` into a view of exactly `matched`.
///
/// Items without identity are skipped. Creates and Updates follow the order
/// of `matched`; Deletes follow identity order.
pub fn reconcile(
    subscriber_id: SubscriberId,
    matched: &[ItemSnapshot],
    state: &DisplayState,
) -> Vec<DisplayOperation> {
    let keep: HashSet<&str> = matched.iter().filter_map(|i| i.identity.as_deref()).collect();

    let mut ops: Vec<DisplayOperation> = state
        .iter()
        .filter(|(identity, _)| !keep.contains(identity))
        .map(|(identity, entry)| DisplayOperation::Delete {
            identity: identity.to_string(),
            handle: entry.handle,
        })
        .collect();

    let mut updates = Vec::new();
    for item in matched {
        let Some(identity) = item.identity.as_deref() else {
            continue;
        };
        let text = render(item);

        match state.get(identity) {
            None => ops.push(DisplayOperation::Create {
                identity: identity.to_string(),
                text,
            }),
            Some(entry) if entry.rendered_text != text => updates.push(DisplayOperation::Update {
                identity: identity.to_string(),
                handle: entry.handle,
                text,
            }),
            Some(_) => {}
        }
    }
    ops.extend(updates);

    trace!(subscriber_id, matched = matched.len(), ops = ops.len(), "reconciled");
    ops
}

/// Apply `ops` in order and record each outcome in `state`.
pub async fn apply<K>(
    sink: &K,
    subscriber_id: SubscriberId,
    ops: Vec<DisplayOperation>,
    state: &mut DisplayState,
    slow_call: Duration,
) -> ApplyOutcome
where
    K: DisplaySink + ?Sized,
{
    let mut outcome = ApplyOutcome::default();

    for op in ops {
        match op {
            DisplayOperation::Delete { identity, handle } => {
                let res = warn_if_slow("sink.delete", slow_call, sink.delete(subscriber_id, handle)).await;
                state.remove(&identity);
                match res {
                    Ok(()) => outcome.deleted += 1,
                    Err(e) => {
                        outcome.failed += 1;
                        log_failure(subscriber_id, &identity, "delete", &e);
                    }
                }
            }

            DisplayOperation::Create { identity, text } => {
                let res = warn_if_slow(
                    "sink.create",
                    slow_call,
                    sink.create(subscriber_id, &identity, &text),
                )
                .await;
                match res {
                    Ok(handle) => {
                        state.insert(
                            identity,
                            DisplayEntry {
                                handle,
                                rendered_text: text,
                            },
                        );
                        outcome.created += 1;
                    }
                    Err(e) => {
                        state.remove(&identity);
                        outcome.failed += 1;
                        log_failure(subscriber_id, &identity, "create", &e);
                    }
                }
            }

            DisplayOperation::Update {
                identity,
                handle,
                text,
            } => {
                let res = warn_if_slow(
                    "sink.update",
                    slow_call,
                    sink.update(subscriber_id, handle, &identity, &text),
                )
                .await;
                match res {
                    Ok(()) => {
                        state.insert(
                            identity,
                            DisplayEntry {
                                handle,
                                rendered_text: text,
                            },
                        );
                        outcome.updated += 1;
                    }
                    Err(e) => {
                        state.remove(&identity);
                        outcome.failed += 1;
                        log_failure(subscriber_id, &identity, "update", &e);
                    }
                }
            }
        }
    }

    outcome
}

fn log_failure(subscriber_id: SubscriberId, identity: &str, op: &'static str, err: &SinkError) {
    match err {
        SinkError::Gone => debug!(subscriber_id, identity, op, "display already gone"),
        other => warn!(subscriber_id, identity, op, error = %other, "display operation failed"),
    }
}
