//! Management commands. They edit the settings database through the same
//! validation the running service applies; a running service picks the
//! change up on its next settings reload.

use std::fmt::Write;

use subscriber::store::SettingsStore;
use subscriber::{Subscriber, SubscriberFilterConfig, SubscriberManager};

use crate::args::Command;

/// Apply one management command and describe the result.
pub async fn execute<S: SettingsStore>(
    manager: &SubscriberManager<S>,
    command: Command,
) -> anyhow::Result<String> {
    let out = match command {
        Command::Run => anyhow::bail!("`run` is not a management command"),

        Command::Activate { chat_id } => {
            manager.set_active(chat_id, true).await?;
            format!("{chat_id}: monitoring on")
        }

        Command::Deactivate { chat_id } => {
            manager.set_active(chat_id, false).await?;
            format!("{chat_id}: monitoring off")
        }

        Command::SetFilter {
            chat_id,
            pages,
            price_min,
            price_max,
            spread_max,
        } => {
            let current = manager.get(chat_id).await.unwrap_or_default();
            let next = SubscriberFilterConfig {
                pages: pages.unwrap_or(current.pages),
                price_min: price_min.unwrap_or(current.price_min),
                price_max: price_max.unwrap_or(current.price_max),
                spread_max_percent: spread_max.unwrap_or(current.spread_max_percent),
                ..current
            };
            manager.update_filter(chat_id, next).await?;

            let saved = manager.require(chat_id).await?;
            format!("{chat_id}: {}", describe(&saved))
        }

        Command::Exclude { chat_id, identity } => {
            if manager.exclude(chat_id, &identity).await? {
                format!("{chat_id}: excluded {identity}")
            } else {
                format!("{chat_id}: {identity} was already excluded")
            }
        }

        Command::Include { chat_id, identity } => {
            if manager.include(chat_id, &identity).await? {
                format!("{chat_id}: {identity} is shown again")
            } else {
                format!("{chat_id}: {identity} was not excluded")
            }
        }

        Command::ClearExclusions { chat_id } => {
            let n = manager.clear_exclusions(chat_id).await?;
            format!("{chat_id}: cleared {n} exclusion(s)")
        }

        Command::Remove { chat_id } => {
            if manager.remove(chat_id).await? {
                format!("{chat_id}: removed")
            } else {
                format!("{chat_id}: unknown")
            }
        }

        Command::SetMaxPages { max_pages } => {
            manager.set_max_pages(max_pages).await?;
            format!("max_pages = {max_pages}")
        }

        Command::List => list(manager.admin().await.max_pages, &manager.list().await),

        Command::Allow { chat_id } => {
            if manager.allow(chat_id).await? {
                format!("{chat_id}: allowed")
            } else {
                format!("{chat_id}: already allowed")
            }
        }

        Command::Disallow { chat_id } => {
            if manager.disallow(chat_id).await? {
                format!("{chat_id}: disallowed")
            } else {
                format!("{chat_id}: was not allowed")
            }
        }

        Command::Users => users(manager).await,
    };

    Ok(out)
}

async fn users<S: SettingsStore>(manager: &SubscriberManager<S>) -> String {
    let allowed = manager.allowed_users().await;
    let mut out = format!("{} allowed chat(s)", allowed.len());
    for id in allowed {
        let role = if manager.is_admin(id) { " (admin)" } else { "" };
        let _ = write!(out, "\n{id}{role}");
    }
    out
}

fn list(max_pages: u32, subscribers: &[Subscriber]) -> String {
    let mut out = format!("max_pages = {max_pages}, {} chat(s)", subscribers.len());
    for s in subscribers {
        let _ = write!(out, "\n{}: {}", s.id, describe(&s.config));
    }
    out
}

fn describe(cfg: &SubscriberFilterConfig) -> String {
    let price_max = if cfg.price_max.is_finite() {
        format!("{}", cfg.price_max)
    } else {
        "inf".to_string()
    };
    let excluded = if cfg.excluded_identities.is_empty() {
        "-".to_string()
    } else {
        cfg.excluded_identities
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(",")
    };

    format!(
        "{} pages={} price=${}..{} spread<={}% excluded={}",
        if cfg.active { "on" } else { "off" },
        cfg.pages,
        cfg.price_min,
        price_max,
        cfg.spread_max_percent,
        excluded
    )
}
