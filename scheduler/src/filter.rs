//! Decides which candidates a subscriber should currently see.
//
//  This module is deliberately pure: no async, no IO.

use std::cmp::Ordering;

use market::ItemSnapshot;
use subscriber::SubscriberFilterConfig;

/// Why an item was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoIdentity,
    Excluded,
    NoPrice,
    PriceOutOfRange,
    NoSpread,
    SpreadTooWide,
}

/// Check one item against a config. On a match, returns its spread.
///
/// Every undefined input rejects the item.
pub fn check_item(item: &ItemSnapshot, config: &SubscriberFilterConfig) -> Result<f64, Rejection> {
    let identity = item.identity.as_deref().ok_or(Rejection::NoIdentity)?;

    // Exclusion wins over every bound below.
    if config.is_excluded(identity) {
        return Err(Rejection::Excluded);
    }

    let usd = item.usd_price.ok_or(Rejection::NoPrice)?;
    if !(config.price_min <= usd && usd <= config.price_max) {
        return Err(Rejection::PriceOutOfRange);
    }

    let spread = item.spread_percent().ok_or(Rejection::NoSpread)?;
    if !(spread <= config.spread_max_percent) {
        return Err(Rejection::SpreadTooWide);
    }

    Ok(spread)
}

/// Matching subset of `snapshots`, ordered by ascending spread with ties
/// broken by identity.
pub fn evaluate(snapshots: &[ItemSnapshot], config: &SubscriberFilterConfig) -> Vec<ItemSnapshot> {
    let mut matched: Vec<(f64, &ItemSnapshot)> = snapshots
        .iter()
        .filter_map(|item| check_item(item, config).ok().map(|spread| (spread, item)))
        .collect();

    matched.sort_by(|(sa, a), (sb, b)| match sa.total_cmp(sb) {
        Ordering::Equal => a.identity.cmp(&b.identity),
        other => other,
    });

    matched.into_iter().map(|(_, item)| item.clone()).collect()
}
