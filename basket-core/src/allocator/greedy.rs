use crate::allocation::{Allocation, Fragment, SelectedSellers, Shortfall};
use crate::allocator::pool::OfferPool;
use crate::allocator::ranking::{Candidate, RankingPolicy};
use crate::index::SellerIndex;
use crate::types::Quantity;
use crate::wantlist::WantEntry;

/// Which allocator invocation produced a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Initial,
    Repair,
}

impl Pass {
    pub fn as_str(self) -> &'static str {
        match self {
            Pass::Initial => "initial",
            Pass::Repair => "repair",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    pub allocation: Allocation,
    /// The seed set plus every seller picked during the pass.
    pub selected_sellers: SelectedSellers,
    pub shortfalls: Vec<Shortfall>,
}

/// Price every remaining offer of `item` for `remaining` units and pick the best.
pub fn best_offer(
    pool: &OfferPool,
    item: &str,
    remaining: Quantity,
    index: &SellerIndex,
    selected_sellers: &SelectedSellers,
    policy: RankingPolicy,
) -> Option<Candidate> {
    let candidates: Vec<Candidate> = pool
        .slots(item)
        .iter()
        .enumerate()
        .map(|(position, slot)| Candidate::new(position, slot, remaining, index, selected_sellers, policy))
        .collect();
    policy.best(&candidates)
}

/// Greedy allocation over `demand`, in the given order.
///
/// For each item, repeatedly draws from the best-ranked remaining offer until
/// the quantity is covered or the item's offers run out. Picking a seller
/// adds it to the selected set, which makes its later offers cheaper under
/// the shipping-reuse policies. Uncovered units are reported as shortfalls.
#[cfg_attr(not(feature = "instrument"), allow(unused_variables))]
pub fn allocate(
    demand: &[WantEntry],
    pool: &mut OfferPool,
    index: &SellerIndex,
    policy: RankingPolicy,
    selected_sellers: SelectedSellers,
    pass: Pass,
) -> PassOutcome {
    let mut allocation = Allocation::new();
    let mut selected_sellers = selected_sellers;
    let mut shortfalls = Vec::new();

    for entry in demand {
        let item = entry.name.as_str();
        let mut remaining = entry.quantity;

        while remaining > 0 {
            let Some(pick) = best_offer(pool, item, remaining, index, &selected_sellers, policy) else {
                break;
            };
            let slot = &pool.slots(item)[pick.position];
            let fragment = Fragment::new(
                slot.index,
                slot.offer.clone(),
                pick.selected_amount,
                pick.price_per_unit,
                pick.shipping,
            );

            let drawn = pool.draw(item, pick.position, pick.selected_amount);
            if drawn == 0 {
                break;
            }
            remaining -= drawn;

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "pick",
                pass = pass.as_str(),
                item = item,
                seller = fragment.seller(),
                selected_amount = u64::from(drawn),
                price_per_unit = fragment.price_per_unit,
                shipping_charged = fragment.shipping_charged,
            );

            selected_sellers.insert(fragment.offer.seller.clone());
            allocation.push(item, fragment);
        }

        if remaining > 0 {
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "shortfall",
                pass = pass.as_str(),
                item = item,
                requested = u64::from(entry.quantity),
                missing = u64::from(remaining),
            );

            shortfalls.push(Shortfall {
                item: entry.name.clone(),
                requested: entry.quantity,
                missing: remaining,
            });
        }
    }

    PassOutcome {
        allocation,
        selected_sellers,
        shortfalls,
    }
}
