//! Chat commands, gated on the allow-list. Sending the reply is left to the
//! caller so the decision can be exercised without a bot.

use std::sync::Arc;

use tracing::info;

use display::ChatCommand;
use market::DataSource;
use scheduler::{DisplaySink, MonitorScheduler};
use subscriber::store::SettingsStore;

pub const NO_ACCESS: &str = "🚫 You do not have access. Ask an admin to add you.";

/// What to send back for a handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Message(String),

    /// Answer a button press, and remove the message it sat under.
    Callback {
        callback_id: String,
        text: String,
        delete_message: Option<i64>,
    },
}

pub async fn apply_chat_command<D, K, S>(
    monitor: &Arc<MonitorScheduler<D, K, S>>,
    command: ChatCommand,
) -> anyhow::Result<ChatReply>
where
    D: DataSource,
    K: DisplaySink,
    S: SettingsStore + 'static,
{
    let chat_id = command.chat_id();
    if !monitor.is_allowed(chat_id).await {
        info!(subscriber_id = chat_id, "chat command refused");
        return Ok(match command {
            ChatCommand::Exclude { callback_id, .. } => ChatReply::Callback {
                callback_id,
                text: "No access".into(),
                delete_message: None,
            },
            _ => ChatReply::Message(NO_ACCESS.into()),
        });
    }

    let reply = match command {
        ChatCommand::Start { chat_id } => {
            monitor.activate(chat_id).await?;
            ChatReply::Message("Monitoring started.".into())
        }

        ChatCommand::Stop { chat_id } => {
            monitor.deactivate(chat_id).await?;
            ChatReply::Message("Monitoring stopped.".into())
        }

        ChatCommand::ClearExclusions { chat_id } => {
            let n = monitor.clear_exclusions(chat_id).await?;
            ChatReply::Message(format!("Cleared {n} exclusion(s)."))
        }

        ChatCommand::Exclude {
            chat_id,
            identity,
            callback_id,
            message_id,
        } => {
            monitor.exclude(chat_id, &identity).await?;
            info!(subscriber_id = chat_id, identity = %identity, "identity excluded from chat");

            // The next cycle deletes it too; removing it now is just quicker.
            ChatReply::Callback {
                callback_id,
                text: "Excluded".into(),
                delete_message: Some(message_id),
            }
        }
    };

    Ok(reply)
}
