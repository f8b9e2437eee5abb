use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use subscriber::SubscriberId;

use crate::types::DisplayHandle;

/// What is currently shown for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub handle: DisplayHandle,

    /// Text last successfully applied. Compared byte-for-byte with the next
    /// rendering to decide whether an update is needed.
    pub rendered_text: String,
}

/// One subscriber's view: identity -> displayed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    entries: BTreeMap<String, DisplayEntry>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<&DisplayEntry> {
        self.entries.get(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn insert(&mut self, identity: String, entry: DisplayEntry) {
        self.entries.insert(identity, entry);
    }

    pub fn remove(&mut self, identity: &str) -> Option<DisplayEntry> {
        self.entries.remove(identity)
    }

    /// Shown identities in ascending order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DisplayEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display state of every subscriber, each behind its own lock so
/// subscribers reconcile in parallel without contending.
///
/// The outer map lock is only held to look up or insert a slot, never
/// across an await.
#[derive(Default)]
pub struct DisplayStateStore {
    slots: Mutex<HashMap<SubscriberId, Arc<AsyncMutex<DisplayState>>>>,
}

impl DisplayStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The subscriber's slot, created empty on first use.
    pub fn slot(&self, id: SubscriberId) -> Arc<AsyncMutex<DisplayState>> {
        self.slots.lock().entry(id).or_default().clone()
    }

    /// Drop the subscriber's state. Returns whether there was any.
    pub fn remove(&self, id: SubscriberId) -> bool {
        self.slots.lock().remove(&id).is_some()
    }

    /// Copy of the subscriber's current state, if it has a slot.
    pub async fn snapshot(&self, id: SubscriberId) -> Option<DisplayState> {
        let slot = self.slots.lock().get(&id).cloned()?;
        let state = slot.lock().await;
        Some(state.clone())
    }

    pub fn subscribers(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = self.slots.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
