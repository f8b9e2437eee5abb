//! The long-running service: monitor loop, settings reload and the bot's
//! inbound commands.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use display::{ChatCommand, TelegramClient, TelegramSink, parse_update};
use market::PagedDataSource;
use market::opensea::{OpenSeaClient, load_cursors};
use scheduler::MonitorScheduler;
use subscriber::SubscriberManager;
use subscriber::store::SqliteSettingsStore;

use crate::chat::{ChatReply, apply_chat_command};
use crate::config::AppConfig;
use crate::error::AppError;

type Monitor = MonitorScheduler<PagedDataSource<OpenSeaClient>, TelegramSink, SqliteSettingsStore>;

/// Pause after a failed `getUpdates` before trying again.
const UPDATES_RETRY: Duration = Duration::from_secs(5);

pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let token = cfg.require_bot_token()?.to_string();

    let store = Arc::new(SqliteSettingsStore::new(&cfg.database_url).await?);
    let manager = Arc::new(
        SubscriberManager::new(store)
            .await?
            .with_admins(cfg.admin_ids.iter().copied()),
    );
    if cfg.admin_ids.is_empty() {
        warn!("ADMIN_IDS is empty; only chats granted with `allow` can use the bot");
    }

    let cursors = load_cursors(&cfg.cursor_file).map_err(|source| AppError::Cursors {
        path: cfg.cursor_file.display().to_string(),
        source,
    })?;
    let opensea = OpenSeaClient::new(cfg.opensea_graphql_url.clone()).map_err(AppError::from)?;
    let source = PagedDataSource::new(Arc::new(opensea), cursors, cfg.page_size, cfg.fetch_concurrency);
    info!(
        pages = source.available_pages(),
        concurrency = cfg.fetch_concurrency,
        "data source ready"
    );

    let telegram = TelegramClient::new(&cfg.telegram_api_url, &token).map_err(AppError::from)?;
    let sink = TelegramSink::new(telegram.clone());

    let monitor = MonitorScheduler::new(cfg.monitor_config(), Arc::new(source), Arc::new(sink), manager);

    // Resume monitoring for whoever was active before the restart.
    monitor.reload_subscribers().await?;

    start_settings_reload(Arc::clone(&monitor), cfg.settings_reload);
    start_chat_commands(telegram, Arc::clone(&monitor));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    monitor.shutdown();

    Ok(())
}

fn start_settings_reload(monitor: Arc<Monitor>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately; startup already loaded.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = monitor.reload_subscribers().await {
                error!(error = ?e, "settings reload failed");
            }
        }
    });
}

fn start_chat_commands(client: TelegramClient, monitor: Arc<Monitor>) {
    tokio::spawn(async move {
        let mut offset: Option<i64> = None;

        loop {
            let updates = match client.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    tokio::time::sleep(UPDATES_RETRY).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                if let Some(command) = parse_update(&update) {
                    if let Err(e) = handle_chat_command(&client, &monitor, command).await {
                        warn!(error = ?e, "chat command failed");
                    }
                }
            }
        }
    });
}

async fn handle_chat_command(
    client: &TelegramClient,
    monitor: &Arc<Monitor>,
    command: ChatCommand,
) -> anyhow::Result<()> {
    debug!(?command, "chat command");
    let chat_id = command.chat_id();

    match apply_chat_command(monitor, command).await? {
        ChatReply::Message(text) => {
            client.send_message(chat_id, &text, None).await?;
        }

        ChatReply::Callback {
            callback_id,
            text,
            delete_message,
        } => {
            client.answer_callback_query(&callback_id, &text).await?;
            if let Some(message_id) = delete_message {
                if let Err(e) = client.delete_message(chat_id, message_id).await {
                    debug!(chat_id, message_id, error = %e, "excluded message not deleted");
                }
            }
        }
    }

    Ok(())
}
