//! SqliteSettingsStore
//! --------------------
//! SQLite-backed implementation of [`SettingsStore`]. Subscriber settings are
//! durable so that filters, exclusions and the monitoring flag survive
//! restarts; display state is deliberately not persisted (message handles are
//! only meaningful to the running process).
use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::SettingsStore;
use crate::model::{AdminSettings, Subscriber, SubscriberFilterConfig, SubscriberId};

const MAX_PAGES_KEY: &str = "max_pages";

/// Layout:
///
///   - `user_settings`: one row per subscriber; `price_max` is NULL when
///     unbounded, `excluded_json` is a JSON array of identities.
///   - `admin_settings`: key/value pairs (currently only `max_pages`).
///   - `users`: ids allowed to use the chat commands.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Wrap an existing pool. Call [`Self::migrate`] before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect (creating the database file if needed) and ensure the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url {url}"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .context("failed to open settings database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_settings (
                user_id INTEGER PRIMARY KEY,
                pages INTEGER NOT NULL,
                price_min REAL NOT NULL,
                price_max REAL,
                diff_max REAL NOT NULL,
                excluded_json TEXT NOT NULL,
                monitoring INTEGER NOT NULL CHECK (monitoring IN (0,1))
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admin_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn load_all(&self) -> anyhow::Result<Vec<Subscriber>> {
        let rows = sqlx::query("SELECT * FROM user_settings ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;

        let mut subscribers = Vec::with_capacity(rows.len());

        for row in rows {
            let id: i64 = row.get("user_id");
            let pages = row.get::<i64, _>("pages");
            let excluded_json: String = row.get("excluded_json");
            let excluded: BTreeSet<String> = serde_json::from_str(&excluded_json)
                .with_context(|| format!("invalid excluded JSON for {id}: '{excluded_json}'"))?;

            subscribers.push(Subscriber {
                id,
                config: SubscriberFilterConfig {
                    pages: u32::try_from(pages)
                        .with_context(|| format!("invalid pages {pages} for {id}"))?,
                    price_min: row.get("price_min"),
                    price_max: row
                        .get::<Option<f64>, _>("price_max")
                        .unwrap_or(f64::INFINITY),
                    spread_max_percent: row.get("diff_max"),
                    excluded_identities: excluded,
                    active: row.get::<i64, _>("monitoring") != 0,
                },
            });
        }

        Ok(subscribers)
    }

    /// Upsert.
    async fn save(&self, id: SubscriberId, config: &SubscriberFilterConfig) -> anyhow::Result<()> {
        let excluded_json = serde_json::to_string(&config.excluded_identities)?;
        let price_max = config.price_max.is_finite().then_some(config.price_max);

        sqlx::query(
            r#"
            INSERT INTO user_settings (
                user_id, pages, price_min, price_max, diff_max, excluded_json, monitoring
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                pages = excluded.pages,
                price_min = excluded.price_min,
                price_max = excluded.price_max,
                diff_max = excluded.diff_max,
                excluded_json = excluded.excluded_json,
                monitoring = excluded.monitoring;
        "#,
        )
        .bind(id)
        .bind(i64::from(config.pages))
        .bind(config.price_min)
        .bind(price_max)
        .bind(config.spread_max_percent)
        .bind(excluded_json)
        .bind(i64::from(config.active))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: SubscriberId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM user_settings WHERE user_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn load_admin(&self) -> anyhow::Result<AdminSettings> {
        let row = sqlx::query("SELECT value FROM admin_settings WHERE key = ?")
            .bind(MAX_PAGES_KEY)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(AdminSettings::default());
        };

        let value: String = row.get("value");
        let max_pages = value
            .parse::<u32>()
            .with_context(|| format!("invalid {MAX_PAGES_KEY} value '{value}'"))?;

        Ok(AdminSettings { max_pages })
    }

    async fn save_admin(&self, admin: &AdminSettings) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value;
        "#,
        )
        .bind(MAX_PAGES_KEY)
        .bind(admin.max_pages.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
    async fn load_allowed(&self) -> anyhow::Result<Vec<SubscriberId>> {
        let rows = sqlx::query("SELECT id FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get::<i64, _>("id")).collect())
    }

    async fn allow(&self, id: SubscriberId) -> anyhow::Result<()> {
        sqlx::query("INSERT OR IGNORE INTO users (id) VALUES (?)")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn disallow(&self, id: SubscriberId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
