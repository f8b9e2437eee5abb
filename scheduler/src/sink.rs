use async_trait::async_trait;

use subscriber::SubscriberId;

use crate::errors::SinkError;
use crate::types::DisplayHandle;

/// The chat surface operations are applied to.
///
/// Every call may fail on its own; the engine never retries within a cycle.
/// `identity` is passed along so implementations can attach per-item actions.
#[async_trait]
pub trait DisplaySink: Send + Sync + 'static {
    async fn create(
        &self,
        subscriber_id: SubscriberId,
        identity: &str,
        text: &str,
    ) -> Result<DisplayHandle, SinkError>;

    async fn update(
        &self,
        subscriber_id: SubscriberId,
        handle: DisplayHandle,
        identity: &str,
        text: &str,
    ) -> Result<(), SinkError>;

    async fn delete(&self, subscriber_id: SubscriberId, handle: DisplayHandle) -> Result<(), SinkError>;
}
