use std::collections::HashMap;

use crate::allocator::OfferPool;
use crate::catalog::Catalog;
use crate::types::{Quantity, SellerName};
use crate::wantlist::WantEntry;

/// Per-seller supply toward a want-list ("biggest sellers" signal).
///
/// Each offer contributes `min(requested, offer amount)`, summed over offers
/// and items. Ranking signal only, never a constraint. Any seller with an
/// offer for a wanted item is indexed, registered or not.
#[derive(Debug, Clone, Default)]
pub struct SellerIndex {
    cards_available: HashMap<SellerName, u64>,
}

impl SellerIndex {
    pub fn build(demand: &[WantEntry], catalog: &Catalog) -> Self {
        let mut index = Self::default();
        for entry in demand {
            for offer in catalog.offers(&entry.name) {
                index.count(&offer.seller, entry.quantity, offer.amount);
            }
        }
        index
    }

    /// Same signal, measured against what is still left in a pool.
    pub fn from_pool(demand: &[WantEntry], pool: &OfferPool) -> Self {
        let mut index = Self::default();
        for entry in demand {
            for slot in pool.slots(&entry.name) {
                index.count(&slot.offer.seller, entry.quantity, slot.remaining);
            }
        }
        index
    }

    fn count(&mut self, seller: &str, requested: Quantity, amount: Quantity) {
        *self.cards_available.entry(seller.to_string()).or_default() += u64::from(requested.min(amount));
    }

    /// Zero for sellers with nothing toward the demand.
    pub fn cards_available(&self, seller: &str) -> u64 {
        self.cards_available.get(seller).copied().unwrap_or(0)
    }

    pub fn contains(&self, seller: &str) -> bool {
        self.cards_available.contains_key(seller)
    }

    pub fn len(&self) -> usize {
        self.cards_available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards_available.is_empty()
    }
}
