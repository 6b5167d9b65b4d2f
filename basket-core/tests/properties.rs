//! Invariants that must hold for any catalog, checked over seeded synthetic data.

use std::collections::{BTreeSet, HashMap};

use basket_core::synth::{SynthSpec, Synthetic, generate};
use basket_core::{
    Catalog, Optimizer, OptimizerConfig, Plan, RankingPolicy, WantList, evaluate, order_demand,
    round_cents,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SEEDS: [u64; 5] = [3, 7, 19, 42, 2026];

const POLICIES: [RankingPolicy; 6] = [
    RankingPolicy::ListedPrice,
    RankingPolicy::PerUnit,
    RankingPolicy::SellerReuse,
    RankingPolicy::StickToSelected,
    RankingPolicy::BiggestSeller,
    RankingPolicy::BiggestSellerReuse,
];

fn synthetic(seed: u64) -> Synthetic {
    generate(&SynthSpec::default(), &mut StdRng::seed_from_u64(seed)).unwrap()
}

/// Every configuration worth checking: all policies, with and without repair.
fn configs() -> Vec<OptimizerConfig> {
    POLICIES
        .iter()
        .flat_map(|&policy| {
            [
                OptimizerConfig::default().with_ranking(policy),
                OptimizerConfig::default().with_ranking(policy).with_repair(false),
            ]
        })
        .collect()
}

fn for_each_plan(mut check: impl FnMut(&Synthetic, &OptimizerConfig, &Plan)) {
    for seed in SEEDS {
        let data = synthetic(seed);
        let optimizer = Optimizer::new(data.catalog.clone(), data.registry.clone());
        for config in configs() {
            let plan = optimizer.optimize(&data.want_list, &config);
            check(&data, &config, &plan);
        }
    }
}

#[test]
fn every_unit_is_allocated_or_reported_missing() {
    for_each_plan(|data, config, plan| {
        for entry in data.want_list.entries() {
            let missing: u64 = plan
                .shortfalls
                .iter()
                .filter(|s| s.item == entry.name)
                .map(|s| u64::from(s.missing))
                .sum();
            assert_eq!(
                plan.allocation.units(&entry.name) + missing,
                u64::from(entry.quantity),
                "{} under {config:?}",
                entry.name
            );
        }
    });
}

#[test]
fn no_offer_is_drawn_beyond_its_amount() {
    for_each_plan(|data, config, plan| {
        let mut drawn: HashMap<(&str, usize), u64> = HashMap::new();
        for (item, fragment) in plan.allocation.fragments() {
            assert!(fragment.selected_amount > 0);
            *drawn.entry((item.as_str(), fragment.offer_index)).or_default() +=
                u64::from(fragment.selected_amount);
        }
        for ((item, index), units) in drawn {
            let offer = &data.catalog.offers(item)[index];
            assert!(
                units <= u64::from(offer.amount),
                "{item} offer #{index} drawn {units} of {} under {config:?}",
                offer.amount
            );
        }
    });
}

#[test]
fn shipping_is_charged_once_per_seller() {
    for_each_plan(|data, _, plan| {
        let sellers: BTreeSet<&str> = plan.allocation.fragments().map(|(_, f)| f.seller()).collect();
        let expected: f64 = sellers
            .iter()
            .map(|s| data.registry.fee(s).unwrap())
            .sum();
        assert_eq!(plan.summary.sellers_used(), sellers.len());
        assert!((plan.summary.shipping - round_cents(expected)).abs() < 1e-9);
        assert!((plan.summary.total - (plan.summary.items + plan.summary.shipping)).abs() < 0.011);
    });
}

#[test]
fn fragment_shipping_adds_up_to_the_evaluated_shipping() {
    for_each_plan(|_, config, plan| {
        let charged: f64 = plan.allocation.fragments().map(|(_, f)| f.shipping_charged).sum();
        assert!(
            (round_cents(charged) - plan.summary.shipping).abs() < 1e-9,
            "charged {charged} vs {} under {config:?}",
            plan.summary.shipping
        );
        for (_, fragment) in plan.allocation.fragments() {
            let amount = f64::from(fragment.selected_amount);
            let expected = round_cents((fragment.offer.price * amount + fragment.shipping_charged) / amount);
            assert_eq!(fragment.price_per_unit, expected);
        }
    });
}

#[test]
fn evaluation_is_idempotent() {
    for_each_plan(|_, _, plan| {
        assert_eq!(evaluate(&plan.allocation), plan.summary);
        assert_eq!(evaluate(&plan.allocation), evaluate(&plan.allocation));
    });
}

#[test]
fn optimization_is_deterministic() {
    for seed in SEEDS {
        let data = synthetic(seed);
        let optimizer = Optimizer::new(data.catalog.clone(), data.registry.clone());
        for config in configs() {
            assert_eq!(
                optimizer.optimize(&data.want_list, &config),
                optimizer.optimize(&data.want_list, &config)
            );
        }
        let order = order_demand(data.want_list.entries(), &data.catalog);
        assert_eq!(order, order_demand(data.want_list.entries(), &data.catalog));
    }
}

#[test]
fn demand_order_puts_scarce_items_first() {
    for seed in SEEDS {
        let data = synthetic(seed);
        let order = order_demand(data.want_list.entries(), &data.catalog);
        assert_eq!(order.len(), data.want_list.len());
        let counts: Vec<usize> = order.iter().map(|e| data.catalog.offers(&e.name).len()).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
    }
}

#[test]
fn restarts_never_lose_to_the_base_order() {
    for seed in SEEDS {
        let data = synthetic(seed);
        let optimizer = Optimizer::new(data.catalog.clone(), data.registry.clone());
        let base = optimizer.optimize(&data.want_list, &OptimizerConfig::default());
        let searched = optimizer.optimize(
            &data.want_list,
            &OptimizerConfig::default().with_restarts(10, seed),
        );
        assert!(searched.summary.total <= base.summary.total);
        if searched.round == 0 {
            assert_eq!(searched, base);
        }
    }
}

#[test]
fn fully_stocked_catalog_has_no_shortfalls() {
    let spec = SynthSpec {
        offer_amount: (4, 4),
        wanted_per_item: (1, 4),
        ..SynthSpec::default()
    };
    let data = generate(&spec, &mut StdRng::seed_from_u64(5)).unwrap();
    let optimizer = Optimizer::new(data.catalog.clone(), data.registry.clone());
    let plan = optimizer.optimize(&data.want_list, &OptimizerConfig::default());
    assert!(plan.is_complete(), "{:?}", plan.shortfalls);
}

#[test]
fn items_outside_the_catalog_never_allocate() {
    let data = synthetic(42);
    let optimizer = Optimizer::new(data.catalog.clone(), data.registry.clone());
    let want = WantList::new().with("card-name-1", 1).with("no such card", 3);
    let plan = optimizer.optimize(&want, &OptimizerConfig::default());
    assert!(plan.allocation.get("no such card").is_none());
    assert!(plan.shortfalls.iter().any(|s| s.item == "no such card" && s.missing == 3));
    assert!(Catalog::new().offers("card-name-1").is_empty());
}
