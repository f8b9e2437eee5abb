use super::sink::EXCLUDE_PREFIX;
use super::types::Update;

/// What a subscriber asked for from inside the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start`: turn monitoring on.
    Start { chat_id: i64 },

    /// `/stop`: turn monitoring off.
    Stop { chat_id: i64 },

    /// `/clear`: drop every exclusion.
    ClearExclusions { chat_id: i64 },

    /// The "Exclude" button under a deal message.
    Exclude {
        chat_id: i64,
        identity: String,
        callback_id: String,
        message_id: i64,
    },
}

impl ChatCommand {
    pub fn chat_id(&self) -> i64 {
        match self {
            ChatCommand::Start { chat_id }
            | ChatCommand::Stop { chat_id }
            | ChatCommand::ClearExclusions { chat_id }
            | ChatCommand::Exclude { chat_id, .. } => *chat_id,
        }
    }
}

/// Map one update to a command; anything else is ignored.
pub fn parse_update(update: &Update) -> Option<ChatCommand> {
    if let Some(cb) = &update.callback_query {
        let identity = cb.data.as_deref()?.strip_prefix(EXCLUDE_PREFIX)?;
        let msg = cb.message.as_ref()?;
        if identity.is_empty() {
            return None;
        }
        return Some(ChatCommand::Exclude {
            chat_id: msg.chat.id,
            identity: identity.to_string(),
            callback_id: cb.id.clone(),
            message_id: msg.message_id,
        });
    }

    let msg = update.message.as_ref()?;
    let chat_id = msg.chat.id;

    // "/start@SomeBot args" -> "/start"
    let command = msg.text.as_deref()?.split_whitespace().next()?;
    let command = command.split('@').next().unwrap_or(command);

    match command {
        "/start" => Some(ChatCommand::Start { chat_id }),
        "/stop" => Some(ChatCommand::Stop { chat_id }),
        "/clear" => Some(ChatCommand::ClearExclusions { chat_id }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn exclude_button_press() {
        let u = update(
            r#"{
                "update_id": 10,
                "callback_query": {
                    "id": "cb-1",
                    "data": "exclude:azuki",
                    "message": { "message_id": 77, "chat": { "id": -100 } }
                }
            }"#,
        );

        assert_eq!(
            parse_update(&u),
            Some(ChatCommand::Exclude {
                chat_id: -100,
                identity: "azuki".into(),
                callback_id: "cb-1".into(),
                message_id: 77,
            })
        );
        assert_eq!(parse_update(&u).map(|c| c.chat_id()), Some(-100));
    }

    #[test]
    fn text_commands() {
        let start = update(r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"text":"/start"}}"#);
        assert_eq!(parse_update(&start), Some(ChatCommand::Start { chat_id: 5 }));

        let stop = update(r#"{"update_id":2,"message":{"message_id":2,"chat":{"id":5},"text":"/stop@DealBot now"}}"#);
        assert_eq!(parse_update(&stop), Some(ChatCommand::Stop { chat_id: 5 }));

        let clear = update(r#"{"update_id":3,"message":{"message_id":3,"chat":{"id":5},"text":"/clear"}}"#);
        assert_eq!(parse_update(&clear), Some(ChatCommand::ClearExclusions { chat_id: 5 }));
    }

    #[test]
    fn unrelated_updates_are_ignored() {
        let chatter = update(r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"text":"hello"}}"#);
        assert_eq!(parse_update(&chatter), None);

        let photo = update(r#"{"update_id":2,"message":{"message_id":2,"chat":{"id":5}}}"#);
        assert_eq!(parse_update(&photo), None);

        let other_button = update(
            r#"{"update_id":3,"callback_query":{"id":"x","data":"settings_menu","message":{"message_id":1,"chat":{"id":5}}}}"#,
        );
        assert_eq!(parse_update(&other_button), None);

        let empty_slug = update(
            r#"{"update_id":4,"callback_query":{"id":"x","data":"exclude:","message":{"message_id":1,"chat":{"id":5}}}}"#,
        );
        assert_eq!(parse_update(&empty_slug), None);
    }
}
