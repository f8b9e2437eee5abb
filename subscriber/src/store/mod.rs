pub mod sqlite_store;

pub use sqlite_store::SqliteSettingsStore;

use crate::model::{AdminSettings, Subscriber, SubscriberFilterConfig, SubscriberId};

#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_all(&self) -> anyhow::Result<Vec<Subscriber>>;
    async fn save(&self, id: SubscriberId, config: &SubscriberFilterConfig) -> anyhow::Result<()>;
    async fn delete(&self, id: SubscriberId) -> anyhow::Result<()>;

    /// Defaults when nothing has been stored yet.
    async fn load_admin(&self) -> anyhow::Result<AdminSettings>;
    async fn save_admin(&self, admin: &AdminSettings) -> anyhow::Result<()>;

    /// Ids granted access to the chat commands, besides the configured admins.
    async fn load_allowed(&self) -> anyhow::Result<Vec<SubscriberId>>;
    async fn allow(&self, id: SubscriberId) -> anyhow::Result<()>;
    async fn disallow(&self, id: SubscriberId) -> anyhow::Result<()>;
}
