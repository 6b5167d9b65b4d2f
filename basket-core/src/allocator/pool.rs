use std::collections::HashMap;

use crate::allocation::Allocation;
use crate::catalog::{Catalog, Offer};
use crate::types::{ItemName, Quantity};

/// An offer with the capacity still left to draw in the current pass.
#[derive(Debug, Clone)]
pub struct PoolSlot {
    /// Position of the offer in the catalog's list for its item.
    pub index: usize,
    pub offer: Offer,
    pub remaining: Quantity,
}

/// Mutable view of the catalog owned by one allocator invocation.
///
/// Slots keep catalog order; exhausted slots are removed.
#[derive(Debug, Clone, Default)]
pub struct OfferPool {
    items: HashMap<ItemName, Vec<PoolSlot>>,
}

impl OfferPool {
    /// Fresh, unconsumed pool for every item in the catalog.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let items = catalog
            .items()
            .map(|(name, offers)| {
                let slots = offers
                    .iter()
                    .enumerate()
                    .map(|(index, offer)| PoolSlot {
                        index,
                        offer: offer.clone(),
                        remaining: offer.amount,
                    })
                    .collect();
                (name.clone(), slots)
            })
            .collect();
        Self { items }
    }

    pub fn slots(&self, item: &str) -> &[PoolSlot] {
        self.items.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Units still drawable for an item.
    pub fn available(&self, item: &str) -> u64 {
        self.slots(item).iter().map(|s| u64::from(s.remaining)).sum()
    }

    /// Take up to `quantity` units from the slot at `position`; returns the units taken.
    pub fn draw(&mut self, item: &str, position: usize, quantity: Quantity) -> Quantity {
        let Some(slots) = self.items.get_mut(item) else {
            return 0;
        };
        let Some(slot) = slots.get_mut(position) else {
            return 0;
        };
        let taken = quantity.min(slot.remaining);
        slot.remaining -= taken;
        if slot.remaining == 0 {
            slots.remove(position);
        }
        taken
    }

    /// Remove the capacity an existing allocation already holds.
    pub fn withdraw_allocated(&mut self, allocation: &Allocation) {
        for (item, fragment) in allocation.fragments() {
            let Some(slots) = self.items.get_mut(item.as_str()) else {
                continue;
            };
            if let Some(position) = slots.iter().position(|s| s.index == fragment.offer_index) {
                let slot = &mut slots[position];
                slot.remaining = slot.remaining.saturating_sub(fragment.selected_amount);
                if slot.remaining == 0 {
                    slots.remove(position);
                }
            }
        }
    }
}
