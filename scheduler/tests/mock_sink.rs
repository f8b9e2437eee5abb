use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use scheduler::{DisplayHandle, DisplaySink, SinkError};
use subscriber::SubscriberId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Create(SubscriberId, String),
    Update(SubscriberId, String),
    Delete(SubscriberId, DisplayHandle),
}

/// Records every call and keeps a model of the visible chat.
#[derive(Default)]
pub struct MockSink {
    next_handle: AtomicI64,
    pub calls: Mutex<Vec<SinkCall>>,

    /// (subscriber, handle) -> text currently visible.
    pub visible: Mutex<BTreeMap<(SubscriberId, DisplayHandle), String>>,

    pub fail_create: Mutex<HashSet<String>>,
    pub fail_delete: Mutex<HashSet<DisplayHandle>>,

    /// Handles the user deleted by hand; updates to them return `Gone`.
    pub vanished: Mutex<HashSet<DisplayHandle>>,

    pub panic_for: Mutex<HashSet<SubscriberId>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_calls(&self) -> Vec<SinkCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn visible_for(&self, id: SubscriberId) -> Vec<String> {
        self.visible
            .lock()
            .iter()
            .filter(|((sub, _), _)| *sub == id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Simulate the user deleting a message out of band.
    pub fn vanish(&self, id: SubscriberId, handle: DisplayHandle) {
        self.visible.lock().remove(&(id, handle));
        self.vanished.lock().insert(handle);
    }
}

#[async_trait]
impl DisplaySink for MockSink {
    async fn create(
        &self,
        subscriber_id: SubscriberId,
        identity: &str,
        text: &str,
    ) -> Result<DisplayHandle, SinkError> {
        if self.panic_for.lock().contains(&subscriber_id) {
            panic!("sink exploded for {subscriber_id}");
        }
        self.calls
            .lock()
            .push(SinkCall::Create(subscriber_id, identity.to_string()));

        if self.fail_create.lock().contains(identity) {
            return Err(SinkError::Transport("timeout".into()));
        }

        let handle = DisplayHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.visible
            .lock()
            .insert((subscriber_id, handle), text.to_string());
        Ok(handle)
    }

    async fn update(
        &self,
        subscriber_id: SubscriberId,
        handle: DisplayHandle,
        identity: &str,
        text: &str,
    ) -> Result<(), SinkError> {
        self.calls
            .lock()
            .push(SinkCall::Update(subscriber_id, identity.to_string()));

        if self.vanished.lock().contains(&handle) {
            return Err(SinkError::Gone);
        }
        self.visible
            .lock()
            .insert((subscriber_id, handle), text.to_string());
        Ok(())
    }

    async fn delete(&self, subscriber_id: SubscriberId, handle: DisplayHandle) -> Result<(), SinkError> {
        self.calls.lock().push(SinkCall::Delete(subscriber_id, handle));

        if self.fail_delete.lock().contains(&handle) {
            return Err(SinkError::Rejected("message can't be deleted".into()));
        }
        self.visible.lock().remove(&(subscriber_id, handle));
        Ok(())
    }
}
