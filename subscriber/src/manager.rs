use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::errors::ConfigError;
use crate::model::{AdminSettings, Subscriber, SubscriberFilterConfig, SubscriberId};
use crate::store::SettingsStore;

/// In-memory view of every subscriber's settings, written through to a store.
///
/// The monitor reads a fresh copy of the active configs at the start of each
/// cycle, so every mutation here takes effect no later than the next cycle.
pub struct SubscriberManager<S: SettingsStore> {
    subscribers: RwLock<HashMap<SubscriberId, SubscriberFilterConfig>>,
    admin: RwLock<AdminSettings>,

    /// Ids from the `users` table. Configured admins are always allowed on
    /// top of these.
    allowed: RwLock<BTreeSet<SubscriberId>>,
    admins: BTreeSet<SubscriberId>,

    store: Arc<S>,
}

impl<S: SettingsStore> SubscriberManager<S> {
    /// Initialize from everything the store holds.
    pub async fn new(store: Arc<S>) -> anyhow::Result<Self> {
        let manager = Self {
            subscribers: RwLock::new(HashMap::new()),
            admin: RwLock::new(AdminSettings::default()),
            allowed: RwLock::new(BTreeSet::new()),
            admins: BTreeSet::new(),
            store,
        };

        manager.reload().await?;
        Ok(manager)
    }

    /// Ids that may always use the chat commands and cannot be disallowed.
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = SubscriberId>) -> Self {
        self.admins = admins.into_iter().collect();
        self
    }

    /// Replace the in-memory view with the store's contents. Returns the ids
    /// that were known before but are gone from the store.
    #[instrument(skip(self), target = "subscribers")]
    pub async fn reload(&self) -> anyhow::Result<Vec<SubscriberId>> {
        // Held across the loads so a concurrent write-through cannot be
        // overwritten by an older snapshot.
        let mut guard = self.subscribers.write().await;
        let mut admin_guard = self.admin.write().await;
        let mut allowed_guard = self.allowed.write().await;

        let all = self.store.load_all().await?;
        let admin = self.store.load_admin().await?;
        let allowed = self.store.load_allowed().await?;

        let fresh: HashMap<SubscriberId, SubscriberFilterConfig> =
            all.into_iter().map(|s| (s.id, s.config)).collect();

        let mut removed: Vec<SubscriberId> = guard
            .keys()
            .filter(|id| !fresh.contains_key(id))
            .copied()
            .collect();
        removed.sort_unstable();

        *guard = fresh;
        *admin_guard = admin;
        *allowed_guard = allowed.into_iter().collect();

        debug!(subscribers = guard.len(), removed = removed.len(), "settings reloaded");
        Ok(removed)
    }

    /// Settings for `id`, created with defaults (and persisted) on first use.
    pub async fn ensure(&self, id: SubscriberId) -> anyhow::Result<SubscriberFilterConfig> {
        let mut guard = self.subscribers.write().await;
        if let Some(cfg) = guard.get(&id) {
            return Ok(cfg.clone());
        }

        let cfg = SubscriberFilterConfig::default();
        self.store.save(id, &cfg).await?;
        guard.insert(id, cfg.clone());

        info!(subscriber_id = id, "subscriber created with default settings");
        Ok(cfg)
    }

    pub async fn get(&self, id: SubscriberId) -> Option<SubscriberFilterConfig> {
        self.subscribers.read().await.get(&id).cloned()
    }

    /// Set the monitoring flag. Returns whether it changed.
    pub async fn set_active(&self, id: SubscriberId, active: bool) -> anyhow::Result<bool> {
        self.modify(id, |cfg| {
            let changed = cfg.active != active;
            cfg.active = active;
            changed
        })
        .await
    }

    /// Replace bounds, depth and exclusions. The monitoring flag is owned by
    /// [`Self::set_active`] and is kept as it is.
    pub async fn update_filter(
        &self,
        id: SubscriberId,
        config: SubscriberFilterConfig,
    ) -> anyhow::Result<()> {
        let admin = *self.admin.read().await;
        config.validate(&admin)?;

        self.modify(id, move |cfg| {
            *cfg = SubscriberFilterConfig {
                active: cfg.active,
                ..config
            };
        })
        .await
    }

    /// Returns whether the identity was newly excluded.
    pub async fn exclude(&self, id: SubscriberId, identity: &str) -> anyhow::Result<bool> {
        self.modify(id, |cfg| cfg.excluded_identities.insert(identity.to_string()))
            .await
    }

    /// Returns whether the identity had been excluded.
    pub async fn include(&self, id: SubscriberId, identity: &str) -> anyhow::Result<bool> {
        self.modify(id, |cfg| cfg.excluded_identities.remove(identity))
            .await
    }

    /// Returns how many exclusions were dropped.
    pub async fn clear_exclusions(&self, id: SubscriberId) -> anyhow::Result<usize> {
        self.modify(id, |cfg| {
            let n = cfg.excluded_identities.len();
            cfg.excluded_identities.clear();
            n
        })
        .await
    }

    /// Forget a subscriber entirely. Returns whether it existed.
    pub async fn remove(&self, id: SubscriberId) -> anyhow::Result<bool> {
        let mut guard = self.subscribers.write().await;
        if !guard.contains_key(&id) {
            return Ok(false);
        }

        self.store.delete(id).await?;
        guard.remove(&id);

        info!(subscriber_id = id, "subscriber removed");
        Ok(true)
    }

    /// Active subscribers, ordered by id.
    pub async fn active_subscribers(&self) -> Vec<Subscriber> {
        let mut active: Vec<Subscriber> = self
            .subscribers
            .read()
            .await
            .iter()
            .filter(|(_, cfg)| cfg.active)
            .map(|(id, cfg)| Subscriber {
                id: *id,
                config: cfg.clone(),
            })
            .collect();
        active.sort_by_key(|s| s.id);
        active
    }

    /// Every known subscriber, ordered by id.
    pub async fn list(&self) -> Vec<Subscriber> {
        let mut all: Vec<Subscriber> = self
            .subscribers
            .read()
            .await
            .iter()
            .map(|(id, cfg)| Subscriber {
                id: *id,
                config: cfg.clone(),
            })
            .collect();
        all.sort_by_key(|s| s.id);
        all
    }

    pub async fn admin(&self) -> AdminSettings {
        *self.admin.read().await
    }

    /// Change the global page cap. Existing subscribers above the new cap are
    /// clamped at fetch time; their stored depth is left untouched.
    pub async fn set_max_pages(&self, max_pages: u32) -> anyhow::Result<()> {
        let admin = AdminSettings { max_pages };
        admin.validate()?;

        let mut guard = self.admin.write().await;
        self.store.save_admin(&admin).await?;
        *guard = admin;

        info!(max_pages, "page cap updated");
        Ok(())
    }

    pub fn is_admin(&self, id: SubscriberId) -> bool {
        self.admins.contains(&id)
    }

    /// Whether `id` may drive its own monitoring from the chat.
    pub async fn is_allowed(&self, id: SubscriberId) -> bool {
        self.is_admin(id) || self.allowed.read().await.contains(&id)
    }

    /// Grant chat access. Returns whether it was newly granted.
    pub async fn allow(&self, id: SubscriberId) -> anyhow::Result<bool> {
        let mut guard = self.allowed.write().await;
        if guard.contains(&id) {
            return Ok(false);
        }

        self.store.allow(id).await?;
        guard.insert(id);

        info!(subscriber_id = id, "subscriber allowed");
        Ok(true)
    }

    /// Revoke chat access and stop monitoring for `id`. Returns whether it
    /// had been granted.
    pub async fn disallow(&self, id: SubscriberId) -> anyhow::Result<bool> {
        if self.is_admin(id) {
            return Err(ConfigError::PermanentAdmin(id).into());
        }

        let was_allowed = {
            let mut guard = self.allowed.write().await;
            let present = guard.contains(&id);
            if present {
                self.store.disallow(id).await?;
                guard.remove(&id);
            }
            present
        };

        if self.get(id).await.is_some_and(|cfg| cfg.active) {
            self.set_active(id, false).await?;
        }

        if was_allowed {
            info!(subscriber_id = id, "subscriber disallowed");
        }
        Ok(was_allowed)
    }

    /// Configured admins plus stored grants, ordered by id.
    pub async fn allowed_users(&self) -> Vec<SubscriberId> {
        let allowed = self.allowed.read().await;
        self.admins.union(&allowed).copied().collect()
    }

    /// Apply `f` to the subscriber's settings (created with defaults if
    /// missing) and persist the result.
    async fn modify<T>(
        &self,
        id: SubscriberId,
        f: impl FnOnce(&mut SubscriberFilterConfig) -> T,
    ) -> anyhow::Result<T> {
        let mut guard = self.subscribers.write().await;
        let mut cfg = guard.get(&id).cloned().unwrap_or_default();

        let out = f(&mut cfg);

        self.store.save(id, &cfg).await?;
        guard.insert(id, cfg);
        Ok(out)
    }

    /// Like [`Self::get`] but an error for unknown ids.
    pub async fn require(&self, id: SubscriberId) -> anyhow::Result<SubscriberFilterConfig> {
        self.get(id)
            .await
            .ok_or_else(|| ConfigError::UnknownSubscriber(id).into())
    }
}
