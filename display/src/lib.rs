//! Telegram Bot API implementation of the display sink, plus the inbound
//! commands (exclusion button, start/stop) the bot accepts.

pub mod errors;
pub mod telegram;

pub use errors::TelegramError;
pub use telegram::{ChatCommand, TelegramClient, TelegramSink, parse_update};
