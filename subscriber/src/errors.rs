use thiserror::Error;

use crate::model::SubscriberId;

/// Rejected filter input. Raised at the update boundary so the monitor only
/// ever sees well-formed configs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("price_min must be a non-negative number, got {0}")]
    InvalidPriceMin(f64),

    #[error("price_max must be a non-negative number or unbounded, got {0}")]
    InvalidPriceMax(f64),

    #[error("price_min ({min}) exceeds price_max ({max})")]
    InvertedPriceRange { min: f64, max: f64 },

    #[error("spread_max_percent must be finite, got {0}")]
    InvalidSpread(f64),

    #[error("pages must be within 1..={max}, got {got}")]
    PagesOutOfRange { got: u32, max: u32 },

    #[error("max_pages must be at least 1")]
    InvalidMaxPages,

    #[error("{0} is a configured admin and cannot be disallowed")]
    PermanentAdmin(SubscriberId),

    #[error("unknown subscriber {0}")]
    UnknownSubscriber(SubscriberId),
}
