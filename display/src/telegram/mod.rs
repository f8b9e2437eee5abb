mod client;
mod sink;
mod types;
mod updates;

pub use client::{DEFAULT_API_URL, TelegramClient};
pub use sink::{EXCLUDE_PREFIX, TelegramSink, exclude_keyboard};
pub use types::{ApiResponse, CallbackQuery, Chat, Message, Update};
pub use updates::{ChatCommand, parse_update};
