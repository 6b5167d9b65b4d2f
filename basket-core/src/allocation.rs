use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Offer;
use crate::types::{ItemName, Price, Quantity, SellerName};

/// Sellers already paying shipping in the current pass.
pub type SelectedSellers = BTreeSet<SellerName>;

// === FRAGMENTS ===

/// The part of one offer drawn into an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Position of the source offer in the catalog's list for its item.
    pub offer_index: usize,
    pub offer: Offer,
    pub selected_amount: Quantity,
    /// Unit price plus the shipping charged at pick time, spread over
    /// `selected_amount`, rounded to cents.
    pub price_per_unit: Price,
    /// Shipping the allocator charged when it picked this fragment
    /// (zero if the seller was already selected).
    pub shipping_charged: Price,
}

impl Fragment {
    pub fn new(
        offer_index: usize,
        offer: Offer,
        selected_amount: Quantity,
        price_per_unit: Price,
        shipping_charged: Price,
    ) -> Self {
        Self {
            offer_index,
            offer,
            selected_amount,
            price_per_unit,
            shipping_charged,
        }
    }

    pub fn seller(&self) -> &str {
        &self.offer.seller
    }

    pub fn items_cost(&self) -> Price {
        self.offer.price * f64::from(self.selected_amount)
    }
}

// === ALLOCATION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAllocation {
    pub item: ItemName,
    pub fragments: Vec<Fragment>,
}

impl ItemAllocation {
    pub fn units(&self) -> u64 {
        self.fragments.iter().map(|f| u64::from(f.selected_amount)).sum()
    }
}

/// Chosen fragments per item, in the order items were first allocated.
///
/// Items with no fragments are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    items: Vec<ItemAllocation>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to the item's list, creating the entry if needed.
    pub fn push(&mut self, item: &str, fragment: Fragment) {
        match self.items.iter_mut().find(|e| e.item == item) {
            Some(entry) => entry.fragments.push(fragment),
            None => self.items.push(ItemAllocation {
                item: item.to_string(),
                fragments: vec![fragment],
            }),
        }
    }

    /// Fold another allocation in, appending fragments item by item.
    pub fn merge(&mut self, other: Allocation) {
        for entry in other.items {
            for fragment in entry.fragments {
                self.push(&entry.item, fragment);
            }
        }
    }

    pub fn get(&self, item: &str) -> Option<&[Fragment]> {
        self.items
            .iter()
            .find(|e| e.item == item)
            .map(|e| e.fragments.as_slice())
    }

    /// Remove the first fragment of `item` sold by `seller`, dropping the item
    /// entry when it becomes empty.
    pub fn remove_seller_fragment(&mut self, item: &str, seller: &str) -> Option<Fragment> {
        let entry_pos = self.items.iter().position(|e| e.item == item)?;
        let entry = &mut self.items[entry_pos];
        let frag_pos = entry.fragments.iter().position(|f| f.seller() == seller)?;
        let fragment = entry.fragments.remove(frag_pos);
        if entry.fragments.is_empty() {
            self.items.remove(entry_pos);
        }
        Some(fragment)
    }

    pub fn items(&self) -> &[ItemAllocation] {
        &self.items
    }

    /// Every fragment with its item, in allocation order.
    pub fn fragments(&self) -> impl Iterator<Item = (&ItemName, &Fragment)> {
        self.items
            .iter()
            .flat_map(|e| e.fragments.iter().map(move |f| (&e.item, f)))
    }

    pub fn units(&self, item: &str) -> u64 {
        self.items
            .iter()
            .find(|e| e.item == item)
            .map(ItemAllocation::units)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// === SHORTFALL ===

/// Demand the catalog could not cover for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub item: ItemName,
    pub requested: Quantity,
    pub missing: Quantity,
}
