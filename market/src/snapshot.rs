use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One candidate collection as seen in a single poll cycle.
///
/// Only `identity` is stable across cycles; every other field may change or
/// vanish between two fetches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    /// Collection slug. `None` means the item cannot be tracked across cycles.
    pub identity: Option<String>,
    pub display_name: String,

    /// Floor price in USD.
    pub usd_price: Option<f64>,

    /// Floor price in the reference unit (ETH).
    pub native_floor: Option<f64>,

    /// Best outstanding offer in the reference unit (ETH).
    pub native_offer: Option<f64>,

    pub link: Option<String>,
}

impl ItemSnapshot {
    /// Percentage gap between floor and best offer, if both are known.
    pub fn spread_percent(&self) -> Option<f64> {
        spread_percent(self.native_floor, self.native_offer)
    }
}

/// `(floor - offer) / floor * 100`, undefined when either side is missing,
/// the floor is zero, or the result is not finite.
pub fn spread_percent(native_floor: Option<f64>, native_offer: Option<f64>) -> Option<f64> {
    let (floor, offer) = (native_floor?, native_offer?);
    if floor == 0.0 {
        return None;
    }
    let spread = (floor - offer) / floor * 100.0;
    spread.is_finite().then_some(spread)
}

/// Read-only result of one fetch, shared by every subscriber of a cycle.
///
/// Items are kept in page order with identities unique across the whole set.
/// `page_ends[i]` is the exclusive end index of page `i + 1`, so a subscriber
/// that asked for fewer pages reads a prefix of the same allocation.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    items: Vec<ItemSnapshot>,
    page_ends: Vec<usize>,
    fetched_at: DateTime<Utc>,
}

impl SnapshotSet {
    /// The set used for a cycle whose fetch failed.
    pub fn empty() -> Self {
        Self {
            fetched_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Flatten fetched pages, dropping later duplicates of an identity.
    /// Items without identity are never deduplicated.
    pub fn from_pages(pages: Vec<Vec<ItemSnapshot>>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut items = Vec::with_capacity(pages.iter().map(Vec::len).sum());
        let mut page_ends = Vec::with_capacity(pages.len());

        for page in pages {
            for item in page {
                if let Some(id) = &item.identity {
                    if !seen.insert(id.clone()) {
                        continue;
                    }
                }
                items.push(item);
            }
            page_ends.push(items.len());
        }

        Self {
            items,
            page_ends,
            fetched_at: Utc::now(),
        }
    }

    pub fn items(&self) -> &[ItemSnapshot] {
        &self.items
    }

    /// Items belonging to the first `pages` pages.
    pub fn prefix(&self, pages: usize) -> &[ItemSnapshot] {
        if pages == 0 {
            return &[];
        }
        match self.page_ends.get(pages - 1) {
            Some(&end) => &self.items[..end],
            None => &self.items,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ends.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
