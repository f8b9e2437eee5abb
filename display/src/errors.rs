use thiserror::Error;

use scheduler::SinkError;

#[derive(Error, Debug)]
pub enum TelegramError {
    /// Request URLs embed the bot token, so they are stripped on conversion.
    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("telegram api error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("telegram reply had no result for {0}")]
    MissingResult(&'static str),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Http(err.without_url())
    }
}

impl TelegramError {
    fn description(&self) -> Option<&str> {
        match self {
            TelegramError::Api { description, .. } => Some(description),
            _ => None,
        }
    }

    /// Editing with identical content is reported as an error by the API.
    pub fn is_not_modified(&self) -> bool {
        self.description()
            .is_some_and(|d| d.contains("message is not modified"))
    }

    /// The referenced message no longer exists or can no longer be touched.
    pub fn is_gone(&self) -> bool {
        self.description().is_some_and(|d| {
            d.contains("message to edit not found")
                || d.contains("message to delete not found")
                || d.contains("message can't be edited")
        })
    }

    fn is_transient(&self) -> bool {
        match self {
            TelegramError::Http(_) | TelegramError::MissingResult(_) => true,
            TelegramError::Api { code, .. } => matches!(code, Some(429) | Some(500..=599)),
        }
    }
}

impl From<TelegramError> for SinkError {
    fn from(err: TelegramError) -> Self {
        if err.is_gone() {
            SinkError::Gone
        } else if err.is_transient() {
            SinkError::Transport(err.to_string())
        } else {
            SinkError::Rejected(err.to_string())
        }
    }
}
