use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::types::{Price, SellerName, round_cents};

/// Evaluated spend of an allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total: Price,
    pub items: Price,
    pub shipping: Price,
    pub sellers: BTreeSet<SellerName>,
}

impl CostSummary {
    pub fn sellers_used(&self) -> usize {
        self.sellers.len()
    }
}

/// Total, item and shipping cost of an allocation, plus the sellers it uses.
///
/// Each seller's shipping is counted the first time one of its fragments is
/// met while walking the allocation in order; later fragments add nothing.
/// Sums are rounded to cents once, at the end.
pub fn evaluate(allocation: &Allocation) -> CostSummary {
    let mut items = 0.0;
    let mut shipping = 0.0;
    let mut seen: BTreeSet<SellerName> = BTreeSet::new();

    for (_, fragment) in allocation.fragments() {
        items += fragment.items_cost();
        if seen.insert(fragment.offer.seller.clone()) {
            shipping += fragment.offer.shipping_price;
        }
    }

    CostSummary {
        total: round_cents(items + shipping),
        items: round_cents(items),
        shipping: round_cents(shipping),
        sellers: seen,
    }
}
