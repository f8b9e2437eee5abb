use thiserror::Error;

/// Failure of a single display operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The referenced display no longer exists (deleted by the user, expired).
    #[error("display handle no longer exists")]
    Gone,

    /// The surface refused the request.
    #[error("display request rejected: {0}")]
    Rejected(String),

    /// The request never got a definitive answer.
    #[error("display transport failure: {0}")]
    Transport(String),
}
