use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use common::logger::LogFormat;
use display::telegram::DEFAULT_API_URL;
use market::opensea::client::DEFAULT_GRAPHQL_URL;
use scheduler::MonitorConfig;
use subscriber::SubscriberId;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Settings database. `mode=rwc` creates the file on first start.
    pub database_url: String,

    // =========================
    // Telegram
    // =========================
    /// Bot token. Only `run` needs it; the management commands work
    /// without one.
    pub bot_token: Option<String>,

    pub telegram_api_url: String,

    /// Chats that may always use the bot, on top of those granted with
    /// `allow`. Comma-separated.
    pub admin_ids: Vec<SubscriberId>,

    // =========================
    // Data source
    // =========================
    pub opensea_graphql_url: String,

    /// Cursors of listing pages 2, 3, ..., one per line. Limits how deep any
    /// subscriber can look.
    pub cursor_file: PathBuf,

    /// Items requested per page.
    pub page_size: usize,

    /// Page requests allowed in flight at once.
    pub fetch_concurrency: usize,

    // =========================
    // Cadence
    // =========================
    /// Pause between two poll cycles.
    pub poll_interval: Duration,

    /// How often the running service re-reads the settings database, so
    /// edits made with the management commands are picked up.
    pub settings_reload: Duration,

    /// `production` switches logs to JSON.
    pub app_env: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: string_or("DATABASE_URL", "sqlite://dealwatch.db?mode=rwc"),
            bot_token: get("BOT_TOKEN").filter(|t| !t.trim().is_empty()),
            telegram_api_url: string_or("TELEGRAM_API_URL", DEFAULT_API_URL),
            admin_ids: parse_list(&get, "ADMIN_IDS")?,
            opensea_graphql_url: string_or("OPENSEA_GRAPHQL_URL", DEFAULT_GRAPHQL_URL),
            cursor_file: PathBuf::from(string_or("CURSOR_FILE", "cursor.txt")),
            page_size: parse_or(&get, "PAGE_SIZE", 100)?,
            fetch_concurrency: parse_or(&get, "FETCH_CONCURRENCY", 8)?,
            poll_interval: Duration::from_millis(parse_or(&get, "POLL_INTERVAL_MS", 1_000)?),
            settings_reload: Duration::from_millis(parse_or(&get, "SETTINGS_RELOAD_MS", 5_000)?),
            app_env: string_or("APP_ENV", "development"),
        })
    }

    pub fn require_bot_token(&self) -> Result<&str, AppError> {
        self.bot_token.as_deref().ok_or(AppError::MissingEnv("BOT_TOKEN"))
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_app_env(&self.app_env)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: self.poll_interval,
            ..Default::default()
        }
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, AppError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => {
            let parsed = raw.trim().parse();
            parsed.map_err(|_| AppError::InvalidEnv { key, value: raw })
        }
    }
}

fn parse_list<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Vec<T>, AppError> {
    let Some(raw) = get(key) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| AppError::InvalidEnv {
                key,
                value: raw.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(cfg.database_url, "sqlite://dealwatch.db?mode=rwc");
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
        assert_eq!(cfg.fetch_concurrency, 8);
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.cursor_file, PathBuf::from("cursor.txt"));
        assert!(cfg.admin_ids.is_empty());
        assert_eq!(cfg.log_format(), LogFormat::Pretty);
        assert!(matches!(
            cfg.require_bot_token(),
            Err(AppError::MissingEnv("BOT_TOKEN"))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "123:abc"),
            ("POLL_INTERVAL_MS", " 250 "),
            ("FETCH_CONCURRENCY", "2"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(cfg.require_bot_token().unwrap(), "123:abc");
        assert_eq!(cfg.monitor_config().poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.fetch_concurrency, 2);
        assert_eq!(cfg.log_format(), LogFormat::Json);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("PAGE_SIZE", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidEnv { key: "PAGE_SIZE", .. }
        ));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cfg = AppConfig::from_lookup(lookup(&[("BOT_TOKEN", "  ")])).unwrap();
        assert!(cfg.bot_token.is_none());
    }

    #[test]
    fn admin_ids_are_a_comma_separated_list() {
        let cfg = AppConfig::from_lookup(lookup(&[("ADMIN_IDS", " 414589178, -100200,,")])).unwrap();
        assert_eq!(cfg.admin_ids, vec![414589178, -100200]);

        let err = AppConfig::from_lookup(lookup(&[("ADMIN_IDS", "1,two")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidEnv { key: "ADMIN_IDS", .. }));
    }
}
