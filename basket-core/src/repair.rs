use serde::{Deserialize, Serialize};

use crate::allocation::{Allocation, SelectedSellers, Shortfall};
use crate::allocator::{OfferPool, Pass, RankingPolicy, allocate};
use crate::catalog::Catalog;
use crate::index::SellerIndex;
use crate::ordering::order_demand;
use crate::types::{ItemName, Price, SellerName};
use crate::wantlist::WantList;

/// A unit taken away from a seller that supplied nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasedUnit {
    pub item: ItemName,
    pub seller: SellerName,
    pub price: Price,
    pub shipping_price: Price,
}

#[derive(Debug, Clone, Default)]
pub struct RepairOutcome {
    pub allocation: Allocation,
    pub selected_sellers: SelectedSellers,
    pub released: Vec<ReleasedUnit>,
    /// Units the re-run could not place again.
    pub shortfalls: Vec<Shortfall>,
}

/// Sellers contributing exactly one unit across the whole allocation, with
/// the item that unit belongs to. Order is first appearance.
pub fn single_unit_sellers(allocation: &Allocation) -> Vec<(SellerName, ItemName)> {
    let mut totals: Vec<(&str, u64, &ItemName)> = Vec::new();
    for (item, fragment) in allocation.fragments() {
        let units = u64::from(fragment.selected_amount);
        match totals.iter_mut().find(|(seller, _, _)| *seller == fragment.seller()) {
            Some(entry) => entry.1 += units,
            None => totals.push((fragment.seller(), units, item)),
        }
    }
    totals
        .into_iter()
        .filter(|(_, units, _)| *units == 1)
        .map(|(seller, _, item)| (seller.to_string(), item.clone()))
        .collect()
}

/// Release every single-unit seller and re-place those units.
///
/// The re-run starts from the full catalog minus what the remaining
/// allocation already holds, and treats the sellers still in use as already
/// paying shipping. Runs once; the re-run may itself leave a new single-unit
/// seller behind.
pub fn repair_single_item_sellers(
    allocation: Allocation,
    selected_sellers: SelectedSellers,
    catalog: &Catalog,
    policy: RankingPolicy,
) -> RepairOutcome {
    let lonely = single_unit_sellers(&allocation);
    if lonely.is_empty() {
        return RepairOutcome {
            allocation,
            selected_sellers,
            ..Default::default()
        };
    }

    let mut allocation = allocation;
    let mut selected_sellers = selected_sellers;
    let mut demand = WantList::new();
    let mut released = Vec::with_capacity(lonely.len());

    for (seller, item) in lonely {
        selected_sellers.remove(&seller);
        let Some(fragment) = allocation.remove_seller_fragment(&item, &seller) else {
            continue;
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "repair",
            item = item.as_str(),
            seller = seller.as_str(),
            price = fragment.offer.price,
            shipping_price = fragment.offer.shipping_price,
        );

        demand.add(&item, 1);
        released.push(ReleasedUnit {
            item,
            seller,
            price: fragment.offer.price,
            shipping_price: fragment.offer.shipping_price,
        });
    }

    let mut pool = OfferPool::from_catalog(catalog);
    pool.withdraw_allocated(&allocation);

    let order = order_demand(demand.entries(), catalog);
    let index = SellerIndex::from_pool(&order, &pool);
    let pass = allocate(&order, &mut pool, &index, policy, selected_sellers, Pass::Repair);
    allocation.merge(pass.allocation);

    RepairOutcome {
        allocation,
        selected_sellers: pass.selected_sellers,
        released,
        shortfalls: pass.shortfalls,
    }
}
