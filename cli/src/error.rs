use thiserror::Error;

use display::TelegramError;
use market::FetchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to read cursor file {path}: {source}")]
    Cursors {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Telegram(#[from] TelegramError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
