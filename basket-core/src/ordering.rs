use std::cmp::Ordering;

use crate::catalog::{Catalog, Offer};
use crate::types::{Price, round_cents};
use crate::wantlist::WantEntry;

/// Mean price of the cheaper half (rounded up) of an item's offers.
///
/// A low-price estimate that ignores outlier high listings. Zero when the
/// item has no offers.
pub fn average_low_price(offers: &[Offer]) -> Price {
    if offers.is_empty() {
        return 0.0;
    }
    let mut prices: Vec<Price> = offers.iter().map(|o| o.price).collect();
    prices.sort_by(|a, b| a.total_cmp(b));
    prices.truncate(prices.len().div_ceil(2));
    round_cents(prices.iter().sum::<Price>() / prices.len() as f64)
}

struct OrderKey {
    offer_count: usize,
    quantity: u32,
    average_price: Price,
}

impl OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Scarcest first, then bulk needs, then expensive items.
        self.offer_count
            .cmp(&other.offer_count)
            .then_with(|| other.quantity.cmp(&self.quantity))
            .then_with(|| other.average_price.total_cmp(&self.average_price))
    }
}

/// Order demand so that hard-to-source, high-value items are allocated first.
///
/// Stable: equal keys keep want-list order. Items missing from the catalog
/// have zero offers and sort to the front.
pub fn order_demand(demand: &[WantEntry], catalog: &Catalog) -> Vec<WantEntry> {
    let mut keyed: Vec<(OrderKey, &WantEntry)> = demand
        .iter()
        .map(|entry| {
            let offers = catalog.offers(&entry.name);
            let key = OrderKey {
                offer_count: offers.len(),
                quantity: entry.quantity,
                average_price: average_low_price(offers),
            };
            (key, entry)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, entry)| entry.clone()).collect()
}
