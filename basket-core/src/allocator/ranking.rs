use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::allocation::SelectedSellers;
use crate::allocator::pool::PoolSlot;
use crate::index::SellerIndex;
use crate::types::{Price, Quantity, round_cents};

// === CANDIDATES ===

/// One still-available offer, priced for the quantity it would supply now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Slot position in the item's pool list.
    pub position: usize,
    pub selected_amount: Quantity,
    /// Shipping that picking this offer would add to the order: the fee if
    /// the seller is not selected yet, otherwise zero.
    pub shipping: Price,
    /// Unit price plus `shipping` spread over `selected_amount`, rounded to cents.
    pub price_per_unit: Price,
    /// Per-unit price the policy ranks by. Equals `price_per_unit` unless the
    /// policy ignores sunk shipping, in which case the fee is always included.
    pub rank_price: Price,
    pub listed_total: Price,
    pub cards_available: u64,
    pub seller_selected: bool,
}

impl Candidate {
    pub fn new(
        position: usize,
        slot: &PoolSlot,
        remaining: Quantity,
        index: &SellerIndex,
        selected_sellers: &SelectedSellers,
        policy: RankingPolicy,
    ) -> Self {
        let offer = &slot.offer;
        let selected_amount = remaining.min(slot.remaining);
        let seller_selected = selected_sellers.contains(&offer.seller);
        let shipping = if seller_selected { 0.0 } else { offer.shipping_price };
        let amount = f64::from(selected_amount.max(1));
        let per_unit = |fee: Price| round_cents((offer.price * amount + fee) / amount);
        let price_per_unit = per_unit(shipping);
        let rank_price = if policy.waives_sunk_shipping() {
            price_per_unit
        } else {
            per_unit(offer.shipping_price)
        };

        Self {
            position,
            selected_amount,
            shipping,
            price_per_unit,
            rank_price,
            listed_total: offer.total_price,
            cards_available: index.cards_available(&offer.seller),
            seller_selected,
        }
    }
}

// === POLICIES ===

/// Comparator strategy for choosing among an item's candidates.
///
/// All policies fall back to the cheaper listing and then to catalog
/// position, so the order is total and repeatable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Cheapest listed price + shipping; shipping is never treated as sunk.
    ListedPrice,
    /// Cheapest per unit at the drawable quantity, shipping always charged.
    PerUnit,
    /// Cheapest per unit with shipping waived for already-selected sellers,
    /// then the seller able to supply the most.
    #[default]
    SellerReuse,
    /// Already-selected sellers win outright; otherwise as `SellerReuse`.
    StickToSelected,
    /// Seller able to supply the most, then cheapest listed.
    BiggestSeller,
    /// Already-selected sellers by per-unit price, otherwise biggest seller.
    BiggestSellerReuse,
}

impl RankingPolicy {
    /// Whether a selected seller's shipping counts as already paid when ranking.
    pub fn waives_sunk_shipping(self) -> bool {
        !matches!(self, Self::ListedPrice | Self::PerUnit)
    }

    pub fn compare(self, a: &Candidate, b: &Candidate) -> Ordering {
        let per_unit = || a.rank_price.total_cmp(&b.rank_price);
        let listed = || a.listed_total.total_cmp(&b.listed_total);
        let bigger = || b.cards_available.cmp(&a.cards_available);
        let selected_first = || b.seller_selected.cmp(&a.seller_selected);

        let primary = match self {
            Self::ListedPrice => listed(),
            Self::PerUnit => per_unit(),
            Self::SellerReuse => per_unit().then_with(bigger),
            Self::StickToSelected => selected_first().then_with(per_unit).then_with(bigger),
            Self::BiggestSeller => bigger().then_with(listed),
            Self::BiggestSellerReuse => selected_first().then_with(|| {
                if a.seller_selected {
                    per_unit().then_with(bigger)
                } else {
                    bigger().then_with(per_unit)
                }
            }),
        };
        primary
            .then_with(listed)
            .then_with(|| a.position.cmp(&b.position))
    }

    /// Best candidate among `candidates`, if any.
    pub fn best(self, candidates: &[Candidate]) -> Option<Candidate> {
        candidates.iter().copied().min_by(|a, b| self.compare(a, b))
    }
}
