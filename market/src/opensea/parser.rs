//! Raw OpenSea collection → [`ItemSnapshot`].
//!
//! Mapping never fails: anything missing or unparsable becomes `None`.

use serde_json::Value;
use tracing::debug;

use super::types::{RawCollection, RawPricePerItem};
use crate::snapshot::ItemSnapshot;

pub const COLLECTION_URL: &str = "https://opensea.io/collection";
const NATIVE_SYMBOL: &str = "ETH";
const UNKNOWN_NAME: &str = "Unknown Collection";

/// Map one untyped page item. Items that are not even objects of the expected
/// shape still produce a snapshot with no prices.
pub fn parse_item(raw: Value) -> ItemSnapshot {
    let collection = match serde_json::from_value::<RawCollection>(raw) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "malformed collection item; mapping without fields");
            RawCollection::default()
        }
    };
    to_snapshot(collection)
}

pub fn to_snapshot(raw: RawCollection) -> ItemSnapshot {
    let identity = raw.slug.filter(|s| !s.is_empty());
    let display_name = raw
        .name
        .filter(|n| !n.is_empty())
        .or_else(|| identity.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let link = identity.as_ref().map(|slug| format!("{COLLECTION_URL}/{slug}"));

    let floor = raw.floor_price.and_then(|p| p.price_per_item);
    let offer = raw.top_offer.and_then(|p| p.price_per_item);

    ItemSnapshot {
        identity,
        display_name,
        usd_price: floor.as_ref().and_then(|p| p.usd.as_ref()).and_then(amount),
        native_floor: floor.as_ref().and_then(native_amount),
        native_offer: offer.as_ref().and_then(native_amount),
        link,
    }
}

/// Native amount, only when denominated in the reference unit.
fn native_amount(price: &RawPricePerItem) -> Option<f64> {
    let native = price.native.as_ref()?;
    if native.symbol.as_deref() != Some(NATIVE_SYMBOL) {
        return None;
    }
    native.unit.as_ref().and_then(amount)
}

/// Non-negative finite number from a JSON number or numeric string.
fn amount(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (n.is_finite() && n >= 0.0).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_item() -> Value {
        json!({
            "slug": "pudgy",
            "name": "Pudgy Penguins",
            "floorPrice": {
                "pricePerItem": {
                    "usd": 35123.45,
                    "native": { "symbol": "ETH", "unit": "10.5" }
                }
            },
            "topOffer": {
                "pricePerItem": {
                    "usd": "34000",
                    "native": { "symbol": "ETH", "unit": 10.2 }
                }
            }
        })
    }

    #[test]
    fn maps_all_fields() {
        let s = parse_item(full_item());

        assert_eq!(s.identity.as_deref(), Some("pudgy"));
        assert_eq!(s.display_name, "Pudgy Penguins");
        assert_eq!(s.usd_price, Some(35123.45));
        assert_eq!(s.native_floor, Some(10.5));
        assert_eq!(s.native_offer, Some(10.2));
        assert_eq!(s.link.as_deref(), Some("https://opensea.io/collection/pudgy"));
        assert!(s.spread_percent().is_some());
    }

    #[test]
    fn non_eth_native_prices_are_ignored() {
        let mut raw = full_item();
        raw["floorPrice"]["pricePerItem"]["native"]["symbol"] = json!("POL");

        let s = parse_item(raw);
        assert_eq!(s.native_floor, None);
        assert_eq!(s.native_offer, Some(10.2));
        assert_eq!(s.spread_percent(), None);
        // USD is independent of the native denomination.
        assert_eq!(s.usd_price, Some(35123.45));
    }

    #[test]
    fn name_falls_back_to_slug_then_placeholder() {
        let s = parse_item(json!({ "slug": "azuki" }));
        assert_eq!(s.display_name, "azuki");

        let s = parse_item(json!({ "name": "" }));
        assert_eq!(s.display_name, "Unknown Collection");
        assert_eq!(s.identity, None);
        assert_eq!(s.link, None);
    }

    #[test]
    fn garbage_amounts_become_none() {
        let s = parse_item(json!({
            "slug": "x",
            "floorPrice": { "pricePerItem": { "usd": "n/a", "native": { "symbol": "ETH", "unit": -1 } } },
            "topOffer": { "pricePerItem": { "native": { "symbol": "ETH", "unit": true } } }
        }));

        assert_eq!(s.usd_price, None);
        assert_eq!(s.native_floor, None);
        assert_eq!(s.native_offer, None);
    }

    #[test]
    fn malformed_item_does_not_panic() {
        let s = parse_item(json!({ "slug": 42, "floorPrice": "cheap" }));
        assert_eq!(s.identity, None);
        assert_eq!(s.display_name, "Unknown Collection");

        let s = parse_item(json!("not an object"));
        assert_eq!(s.usd_price, None);
    }
}
