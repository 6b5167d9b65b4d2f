use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{ItemName, Price, Quantity, SellerName, normalize_item_name, round_cents};

// === OFFERS ===

/// One seller's terms for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub seller: SellerName,
    pub price: Price,
    /// Flat fee charged once per seller per order, not per unit.
    pub shipping_price: Price,
    /// Maximum units this offer can supply.
    pub amount: Quantity,
    /// Listed price + shipping for a single unit. Informational only.
    pub total_price: Price,
}

impl Offer {
    pub fn new(seller: impl Into<SellerName>, price: Price, shipping_price: Price, amount: Quantity) -> Self {
        Self {
            seller: seller.into(),
            price,
            shipping_price,
            amount,
            total_price: round_cents(price + shipping_price),
        }
    }
}

/// Offer record as it appears on disk; every field is checked before use.
#[derive(Debug, Deserialize)]
struct RawOffer {
    seller: Option<SellerName>,
    price: Option<f64>,
    shipping_price: Option<f64>,
    amount: Option<f64>,
    total_price: Option<f64>,
}

fn required<T>(value: Option<T>, item: &str, index: usize, field: &'static str) -> Result<T, CatalogError> {
    value.ok_or_else(|| CatalogError::MissingField {
        item: item.to_string(),
        index,
        field,
    })
}

fn money(value: f64, item: &str, index: usize, field: &'static str) -> Result<Price, CatalogError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CatalogError::InvalidField {
            item: item.to_string(),
            index,
            field,
            reason: format!("{value} is not a non-negative amount of money"),
        });
    }
    Ok(value)
}

impl RawOffer {
    /// A record without its own `shipping_price` takes the seller's registered fee.
    fn validate(self, item: &str, index: usize, registry: &SellerRegistry) -> Result<Offer, CatalogError> {
        let seller = required(self.seller, item, index, "seller")?;
        let price = money(required(self.price, item, index, "price")?, item, index, "price")?;
        let shipping_price = money(
            required(
                self.shipping_price.or_else(|| registry.fee(&seller)),
                item,
                index,
                "shipping_price",
            )?,
            item,
            index,
            "shipping_price",
        )?;

        let raw_amount = required(self.amount, item, index, "amount")?;
        if !(raw_amount >= 1.0 && raw_amount.fract() == 0.0 && raw_amount <= f64::from(Quantity::MAX)) {
            return Err(CatalogError::InvalidField {
                item: item.to_string(),
                index,
                field: "amount",
                reason: format!("{raw_amount} is not a positive whole quantity"),
            });
        }

        let total_price = match self.total_price {
            Some(listed) => money(listed, item, index, "total_price")?,
            None => round_cents(price + shipping_price),
        };

        Ok(Offer {
            seller,
            price,
            shipping_price,
            amount: raw_amount as Quantity,
            total_price,
        })
    }
}

// === CATALOG ===

/// Offers per item, keyed by normalized item name.
///
/// Offer order within an item is the load order and serves as the final
/// tie-break everywhere offers are ranked.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<ItemName, Vec<Offer>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ item: [offer, ...] }` json, rejecting malformed records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_json_with_registry(json, &SellerRegistry::new())
    }

    /// Like `from_json_str`, filling missing `shipping_price` fields from `registry`.
    ///
    /// Scraped listings repeat, so exact duplicate records of one item are
    /// collapsed to their first occurrence, also across keys that normalize
    /// to the same name.
    pub fn from_json_with_registry(json: &str, registry: &SellerRegistry) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<RawOffer>> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (name, records) in raw {
            let offers = catalog.items.entry(normalize_item_name(&name)).or_default();
            for (index, record) in records.into_iter().enumerate() {
                let offer = record.validate(&name, index, registry)?;
                if !offers.contains(&offer) {
                    offers.push(offer);
                }
            }
        }
        Ok(catalog)
    }

    /// Append offers under the normalized name.
    pub fn insert(&mut self, name: &str, offers: impl IntoIterator<Item = Offer>) {
        self.items
            .entry(normalize_item_name(name))
            .or_default()
            .extend(offers);
    }

    pub fn with_offers(mut self, name: &str, offers: impl IntoIterator<Item = Offer>) -> Self {
        self.insert(name, offers);
        self
    }

    /// Offers for an item in load order; empty when the item is unknown.
    pub fn offers(&self, item: &str) -> &[Offer] {
        self.items.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn items(&self) -> impl Iterator<Item = (&ItemName, &[Offer])> {
        self.items.iter().map(|(name, offers)| (name, offers.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// === SELLER REGISTRY ===

/// Known sellers and their flat shipping fees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerRegistry {
    fees: BTreeMap<SellerName, Price>,
}

impl SellerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let fees: BTreeMap<SellerName, f64> = serde_json::from_str(json)?;
        for (seller, &fee) in &fees {
            if !fee.is_finite() || fee < 0.0 {
                return Err(CatalogError::InvalidSellerFee {
                    seller: seller.clone(),
                    fee,
                });
            }
        }
        Ok(Self { fees })
    }

    /// Derive fees from the offers themselves; the last offer seen for a seller wins.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut registry = Self::new();
        for (_, offers) in catalog.items() {
            for offer in offers {
                registry.insert(offer.seller.clone(), offer.shipping_price);
            }
        }
        registry
    }

    pub fn insert(&mut self, seller: impl Into<SellerName>, fee: Price) {
        self.fees.insert(seller.into(), fee);
    }

    pub fn fee(&self, seller: &str) -> Option<Price> {
        self.fees.get(seller).copied()
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}
