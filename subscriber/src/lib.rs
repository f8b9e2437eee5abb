//! Per-subscriber filter settings: model, validation, persistence and the
//! in-memory manager the monitor reads every cycle.

pub mod errors;
pub mod manager;
pub mod model;
pub mod store;

pub use errors::ConfigError;
pub use manager::SubscriberManager;
pub use model::{AdminSettings, Subscriber, SubscriberFilterConfig, SubscriberId};
pub use store::SettingsStore;
