use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use market::ItemSnapshot;
use scheduler::filter::evaluate;
use scheduler::reconcile::reconcile;
use scheduler::render::render;
use scheduler::{DisplayEntry, DisplayHandle, DisplayOperation, DisplayState};
use subscriber::SubscriberFilterConfig;

fn snapshot_strategy() -> impl Strategy<Value = Vec<ItemSnapshot>> {
    let facts = (
        prop::option::of(0.0f64..500.0),
        prop::option::of(0.0f64..5.0),
        prop::option::of(0.0f64..5.0),
    );
    prop::collection::btree_map("[a-h]", facts, 0..8).prop_map(|m| {
        m.into_iter()
            .map(|(id, (usd, floor, offer))| ItemSnapshot {
                display_name: id.to_uppercase(),
                identity: Some(id),
                usd_price: usd,
                native_floor: floor,
                native_offer: offer,
                link: None,
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = SubscriberFilterConfig> {
    (
        0.0f64..200.0,
        0.0f64..400.0,
        -20.0f64..80.0,
        prop::collection::btree_set("[a-h]", 0..3),
    )
        .prop_map(|(min, width, spread, excluded)| SubscriberFilterConfig {
            price_min: min,
            price_max: min + width,
            spread_max_percent: spread,
            excluded_identities: excluded,
            active: true,
            ..Default::default()
        })
}

/// Apply operations as if every sink call succeeded.
fn apply_all(ops: &[DisplayOperation], state: &mut DisplayState, next: &mut i64) {
    for op in ops {
        match op {
            DisplayOperation::Delete { identity, .. } => {
                state.remove(identity);
            }
            DisplayOperation::Create { identity, text } => {
                *next += 1;
                state.insert(
                    identity.clone(),
                    DisplayEntry {
                        handle: DisplayHandle(*next),
                        rendered_text: text.clone(),
                    },
                );
            }
            DisplayOperation::Update {
                identity,
                handle,
                text,
            } => {
                state.insert(
                    identity.clone(),
                    DisplayEntry {
                        handle: *handle,
                        rendered_text: text.clone(),
                    },
                );
            }
        }
    }
}

fn ids(items: &[ItemSnapshot]) -> BTreeSet<String> {
    items.iter().filter_map(|i| i.identity.clone()).collect()
}

proptest! {
    #[test]
    fn matched_items_satisfy_every_bound(items in snapshot_strategy(), cfg in config_strategy()) {
        let matched = evaluate(&items, &cfg);

        for item in &matched {
            let usd = item.usd_price.expect("matched item without price");
            let spread = item.spread_percent().expect("matched item without spread");
            prop_assert!(cfg.price_min <= usd && usd <= cfg.price_max);
            prop_assert!(spread <= cfg.spread_max_percent);
            prop_assert!(!cfg.is_excluded(item.identity.as_deref().unwrap()));
        }

        let spreads: Vec<f64> = matched.iter().filter_map(|i| i.spread_percent()).collect();
        prop_assert!(spreads.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn excluded_identities_never_match(items in snapshot_strategy(), mut cfg in config_strategy()) {
        // Widen every bound: only the exclusion can reject now.
        cfg.price_min = 0.0;
        cfg.price_max = f64::INFINITY;
        cfg.spread_max_percent = 1e9;

        let matched = ids(&evaluate(&items, &cfg));
        prop_assert!(matched.is_disjoint(&cfg.excluded_identities));
    }

    #[test]
    fn full_success_converges_and_repeats_as_no_op(
        first in snapshot_strategy(),
        second in snapshot_strategy(),
        cfg in config_strategy(),
    ) {
        let mut state = DisplayState::new();
        let mut next = 0;

        for items in [&first, &second] {
            let matched = evaluate(items, &cfg);
            let ops = reconcile(1, &matched, &state);
            apply_all(&ops, &mut state, &mut next);

            let shown: BTreeSet<String> = state.identities().map(str::to_string).collect();
            prop_assert_eq!(&shown, &ids(&matched));
            for item in &matched {
                let entry = state.get(item.identity.as_deref().unwrap()).unwrap();
                prop_assert_eq!(&entry.rendered_text, &render(item));
            }

            prop_assert!(reconcile(1, &matched, &state).is_empty());
        }
    }

    #[test]
    fn operations_are_grouped_and_unique(
        first in snapshot_strategy(),
        second in snapshot_strategy(),
        cfg in config_strategy(),
    ) {
        let mut state = DisplayState::new();
        let mut next = 0;
        let ops = reconcile(1, &evaluate(&first, &cfg), &state);
        apply_all(&ops, &mut state, &mut next);

        let ops = reconcile(1, &evaluate(&second, &cfg), &state);

        let rank = |op: &DisplayOperation| match op {
            DisplayOperation::Delete { .. } => 0,
            DisplayOperation::Create { .. } => 1,
            DisplayOperation::Update { .. } => 2,
        };
        prop_assert!(ops.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));

        let mut seen = BTreeMap::new();
        for op in &ops {
            *seen.entry(op.identity().to_string()).or_insert(0) += 1;
        }
        prop_assert!(seen.values().all(|&n| n == 1));
    }

    #[test]
    fn vanished_items_are_deleted_exactly_once(
        items in snapshot_strategy(),
        cfg in config_strategy(),
        keep_mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let mut state = DisplayState::new();
        let mut next = 0;
        let matched = evaluate(&items, &cfg);
        apply_all(&reconcile(1, &matched, &state), &mut state, &mut next);

        let survivors: Vec<ItemSnapshot> = items
            .iter()
            .zip(keep_mask.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|(i, _)| i.clone())
            .collect();
        let gone: BTreeSet<String> = ids(&matched).difference(&ids(&survivors)).cloned().collect();

        let ops = reconcile(1, &evaluate(&survivors, &cfg), &state);
        let deleted: BTreeSet<String> = ops
            .iter()
            .filter(|op| matches!(op, DisplayOperation::Delete { .. }))
            .map(|op| op.identity().to_string())
            .collect();
        let delete_count = ops
            .iter()
            .filter(|op| matches!(op, DisplayOperation::Delete { .. }))
            .count();

        prop_assert_eq!(&deleted, &gone);
        prop_assert_eq!(delete_count, gone.len());

        apply_all(&ops, &mut state, &mut next);
        for id in &gone {
            prop_assert!(!state.contains(id));
        }
    }
}
