use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::allocation::{Fragment, Shortfall};
use crate::cost::CostSummary;
use crate::optimizer::Plan;
use crate::repair::ReleasedUnit;

// ============================================================================
// Serializable plan for JS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct PlanSnapshot {
    pub items: Vec<ItemSnapshot>,
    pub summary: SummarySnapshot,
    pub first_pass: SummarySnapshot,
    pub shortfalls: Vec<ShortfallSnapshot>,
    pub released: Vec<ReleasedSnapshot>,
    pub round: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ItemSnapshot {
    pub name: String,
    pub units: u64,
    pub fragments: Vec<FragmentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct FragmentSnapshot {
    pub seller: String,
    pub price: f64,
    pub shipping_price: f64,
    /// Units the listing offers in total.
    pub amount: u32,
    pub total_price: f64,
    pub selected_amount: u32,
    pub price_per_unit: f64,
    pub shipping_charged: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SummarySnapshot {
    pub total: f64,
    pub items: f64,
    pub shipping: f64,
    pub sellers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ShortfallSnapshot {
    pub item: String,
    pub requested: u32,
    pub missing: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ReleasedSnapshot {
    pub item: String,
    pub seller: String,
    pub price: f64,
    pub shipping_price: f64,
}

impl From<&Fragment> for FragmentSnapshot {
    fn from(f: &Fragment) -> Self {
        Self {
            seller: f.offer.seller.clone(),
            price: f.offer.price,
            shipping_price: f.offer.shipping_price,
            amount: f.offer.amount,
            total_price: f.offer.total_price,
            selected_amount: f.selected_amount,
            price_per_unit: f.price_per_unit,
            shipping_charged: f.shipping_charged,
        }
    }
}

impl From<&CostSummary> for SummarySnapshot {
    fn from(s: &CostSummary) -> Self {
        Self {
            total: s.total,
            items: s.items,
            shipping: s.shipping,
            sellers: s.sellers.iter().cloned().collect(),
        }
    }
}

impl From<&Shortfall> for ShortfallSnapshot {
    fn from(s: &Shortfall) -> Self {
        Self {
            item: s.item.clone(),
            requested: s.requested,
            missing: s.missing,
        }
    }
}

impl From<&ReleasedUnit> for ReleasedSnapshot {
    fn from(r: &ReleasedUnit) -> Self {
        Self {
            item: r.item.clone(),
            seller: r.seller.clone(),
            price: r.price,
            shipping_price: r.shipping_price,
        }
    }
}

impl From<&Plan> for PlanSnapshot {
    fn from(plan: &Plan) -> Self {
        Self {
            items: plan
                .allocation
                .items()
                .iter()
                .map(|entry| ItemSnapshot {
                    name: entry.item.clone(),
                    units: entry.units(),
                    fragments: entry.fragments.iter().map(FragmentSnapshot::from).collect(),
                })
                .collect(),
            summary: (&plan.summary).into(),
            first_pass: (&plan.first_pass).into(),
            shortfalls: plan.shortfalls.iter().map(ShortfallSnapshot::from).collect(),
            released: plan.released.iter().map(ReleasedSnapshot::from).collect(),
            round: plan.round,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Offer, SellerRegistry};
    use crate::config::OptimizerConfig;
    use crate::optimizer::Optimizer;
    use crate::wantlist::WantList;

    #[test]
    fn snapshot_mirrors_plan() {
        let catalog = Catalog::new().with_offers(
            "sol ring",
            vec![Offer::new("A", 1.0, 5.0, 3), Offer::new("B", 2.0, 1.0, 1)],
        );
        let optimizer = Optimizer::new(catalog.clone(), SellerRegistry::from_catalog(&catalog));
        let want = WantList::new().with("sol ring", 2).with("mox opal", 1);
        let plan = optimizer.optimize(&want, &OptimizerConfig::default());

        let snapshot = PlanSnapshot::from(&plan);
        assert_eq!(snapshot.items.len(), plan.allocation.len());
        assert_eq!(snapshot.items[0].units, 2);
        assert_eq!(snapshot.summary.total, plan.summary.total);
        assert_eq!(snapshot.shortfalls.len(), 1);
        assert_eq!(snapshot.shortfalls[0].item, "mox opal");
        assert_eq!(snapshot.shortfalls[0].missing, 1);

        for fragment in &snapshot.items[0].fragments {
            let offer = catalog.offers("sol ring").iter().find(|o| o.seller == fragment.seller).unwrap();
            assert_eq!(fragment.amount, offer.amount);
            assert_eq!(fragment.total_price, offer.total_price);
            assert!(fragment.selected_amount <= fragment.amount);
        }

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["items"][0]["fragments"][0]["price_per_unit"].is_number());
    }

    #[test]
    fn released_units_carry_their_shipping() {
        let catalog = Catalog::new()
            .with_offers(
                "x",
                vec![
                    Offer::new("A", 1.0, 5.0, 3),
                    Offer::new("C", 1.5, 4.0, 3),
                    Offer::new("D", 1.6, 4.0, 3),
                ],
            )
            .with_offers("y", vec![Offer::new("B", 1.0, 5.0, 1), Offer::new("A", 2.0, 5.0, 1)]);
        let optimizer = Optimizer::new(catalog.clone(), SellerRegistry::from_catalog(&catalog));
        let want = WantList::new().with("x", 3).with("y", 1);

        let snapshot = PlanSnapshot::from(&optimizer.optimize(&want, &OptimizerConfig::default()));
        assert_eq!(snapshot.released.len(), 1);
        assert_eq!(snapshot.released[0].seller, "B");
        assert_eq!(snapshot.released[0].price, 1.0);
        assert_eq!(snapshot.released[0].shipping_price, 5.0);
    }
}
