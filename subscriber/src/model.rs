use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Chat id of the subscriber on the display surface.
pub type SubscriberId = i64;

pub const DEFAULT_PAGES: u32 = 1;
pub const DEFAULT_SPREAD_MAX_PERCENT: f64 = 2.0;
pub const DEFAULT_MAX_PAGES: u32 = 2;

/// What one subscriber wants to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberFilterConfig {
    /// Requested fetch depth in pages.
    pub pages: u32,

    /// Inclusive USD bounds. `price_max = f64::INFINITY` is unbounded.
    pub price_min: f64,
    pub price_max: f64,

    /// Inclusive upper bound on the spread percentage.
    pub spread_max_percent: f64,

    /// Identities suppressed regardless of the bounds above.
    pub excluded_identities: BTreeSet<String>,

    /// Whether live reconciliation is wanted.
    pub active: bool,
}

impl Default for SubscriberFilterConfig {
    fn default() -> Self {
        Self {
            pages: DEFAULT_PAGES,
            price_min: 0.0,
            price_max: f64::INFINITY,
            spread_max_percent: DEFAULT_SPREAD_MAX_PERCENT,
            excluded_identities: BTreeSet::new(),
            active: false,
        }
    }
}

impl SubscriberFilterConfig {
    /// Check bounds against the current admin page cap.
    pub fn validate(&self, admin: &AdminSettings) -> Result<(), ConfigError> {
        if !(self.price_min.is_finite() && self.price_min >= 0.0) {
            return Err(ConfigError::InvalidPriceMin(self.price_min));
        }
        if self.price_max.is_nan() || self.price_max < 0.0 {
            return Err(ConfigError::InvalidPriceMax(self.price_max));
        }
        if self.price_min > self.price_max {
            return Err(ConfigError::InvertedPriceRange {
                min: self.price_min,
                max: self.price_max,
            });
        }
        if !self.spread_max_percent.is_finite() {
            return Err(ConfigError::InvalidSpread(self.spread_max_percent));
        }
        if self.pages == 0 || self.pages > admin.max_pages {
            return Err(ConfigError::PagesOutOfRange {
                got: self.pages,
                max: admin.max_pages,
            });
        }
        Ok(())
    }

    /// Depth actually fetched for this subscriber. A stored value above a
    /// since-lowered cap is clamped rather than rejected.
    pub fn effective_pages(&self, admin: &AdminSettings) -> u32 {
        self.pages.clamp(1, admin.max_pages.max(1))
    }

    pub fn is_excluded(&self, identity: &str) -> bool {
        self.excluded_identities.contains(identity)
    }
}

/// Global settings shared by every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Upper bound on any subscriber's `pages`.
    pub max_pages: u32,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl AdminSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::InvalidMaxPages);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub config: SubscriberFilterConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminSettings {
        AdminSettings { max_pages: 3 }
    }

    #[test]
    fn defaults_are_valid_and_unbounded() {
        let cfg = SubscriberFilterConfig::default();
        assert!(cfg.validate(&admin()).is_ok());
        assert!(cfg.price_max.is_infinite());
        assert!(!cfg.active);
        assert_eq!(cfg.pages, 1);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let cfg = SubscriberFilterConfig {
            price_min: 50.0,
            price_max: 10.0,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(&admin()),
            Err(ConfigError::InvertedPriceRange { min: 50.0, max: 10.0 })
        );
    }

    #[test]
    fn nan_and_negative_bounds_are_rejected() {
        let nan_min = SubscriberFilterConfig {
            price_min: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(nan_min.validate(&admin()), Err(ConfigError::InvalidPriceMin(_))));

        let neg_max = SubscriberFilterConfig {
            price_max: -1.0,
            ..Default::default()
        };
        assert_eq!(neg_max.validate(&admin()), Err(ConfigError::InvalidPriceMax(-1.0)));

        let inf_spread = SubscriberFilterConfig {
            spread_max_percent: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(inf_spread.validate(&admin()), Err(ConfigError::InvalidSpread(_))));
    }

    #[test]
    fn negative_spread_bound_is_allowed() {
        // Only items with offers above the floor qualify.
        let cfg = SubscriberFilterConfig {
            spread_max_percent: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate(&admin()).is_ok());
    }

    #[test]
    fn pages_must_respect_admin_cap() {
        let too_deep = SubscriberFilterConfig {
            pages: 4,
            ..Default::default()
        };
        assert_eq!(
            too_deep.validate(&admin()),
            Err(ConfigError::PagesOutOfRange { got: 4, max: 3 })
        );

        let zero = SubscriberFilterConfig {
            pages: 0,
            ..Default::default()
        };
        assert!(zero.validate(&admin()).is_err());
    }

    #[test]
    fn effective_pages_clamps_to_lowered_cap() {
        let cfg = SubscriberFilterConfig {
            pages: 5,
            ..Default::default()
        };
        assert_eq!(cfg.effective_pages(&AdminSettings { max_pages: 2 }), 2);
        assert_eq!(cfg.effective_pages(&AdminSettings { max_pages: 10 }), 5);
    }

    #[test]
    fn zero_max_pages_is_invalid() {
        assert_eq!(
            AdminSettings { max_pages: 0 }.validate(),
            Err(ConfigError::InvalidMaxPages)
        );
        assert!(AdminSettings::default().validate().is_ok());
    }
}
