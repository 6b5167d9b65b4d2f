//! Synthetic catalogs for tests and benchmarking.
//!
//! Sellers are `seller{i}` with a uniform flat fee; items are `card-name-{i}`,
//! each with a random number of offers from random sellers.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Offer, SellerRegistry};
use crate::error::SynthError;
use crate::types::{Quantity, round_cents};
use crate::wantlist::WantList;

const MAX_BOUND: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthSpec {
    pub sellers: u32,
    pub shipping_price: (f64, f64),
    pub offer_price: (f64, f64),
    pub offer_amount: (Quantity, Quantity),
    pub items: u32,
    pub offers_per_item: (u32, u32),
    pub wanted_per_item: (Quantity, Quantity),
}

impl Default for SynthSpec {
    fn default() -> Self {
        Self {
            sellers: 12,
            shipping_price: (1.0, 6.0),
            offer_price: (0.1, 15.0),
            offer_amount: (1, 4),
            items: 25,
            offers_per_item: (1, 10),
            wanted_per_item: (1, 4),
        }
    }
}

fn check_money(what: &'static str, (min, max): (f64, f64)) -> Result<(), SynthError> {
    if min > 0.0 && min <= max && max <= MAX_BOUND {
        Ok(())
    } else {
        Err(SynthError::InvalidRange { what, min, max })
    }
}

fn check_count(what: &'static str, (min, max): (u32, u32)) -> Result<(), SynthError> {
    if min >= 1 && min <= max && f64::from(max) <= MAX_BOUND {
        Ok(())
    } else {
        Err(SynthError::InvalidRange {
            what,
            min: f64::from(min),
            max: f64::from(max),
        })
    }
}

impl SynthSpec {
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.sellers == 0 {
            return Err(SynthError::NoSellers);
        }
        check_money("shipping_price", self.shipping_price)?;
        check_money("offer_price", self.offer_price)?;
        check_count("offer_amount", self.offer_amount)?;
        check_count("offers_per_item", self.offers_per_item)?;
        check_count("wanted_per_item", self.wanted_per_item)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Synthetic {
    pub registry: SellerRegistry,
    pub catalog: Catalog,
    pub want_list: WantList,
}

pub fn generate<R: Rng>(spec: &SynthSpec, rng: &mut R) -> Result<Synthetic, SynthError> {
    spec.validate()?;

    let sellers: Vec<(String, f64)> = (1..=spec.sellers)
        .map(|i| {
            let (lo, hi) = spec.shipping_price;
            (format!("seller{i}"), round_cents(rng.random_range(lo..=hi)))
        })
        .collect();

    let mut registry = SellerRegistry::new();
    for (seller, fee) in &sellers {
        registry.insert(seller.clone(), *fee);
    }

    let mut catalog = Catalog::new();
    let mut want_list = WantList::new();
    for item in 1..=spec.items {
        let name = format!("card-name-{item}");
        let offer_count = rng.random_range(spec.offers_per_item.0..=spec.offers_per_item.1);
        let offers: Vec<Offer> = (0..offer_count)
            .map(|_| {
                let (seller, fee) = &sellers[rng.random_range(0..sellers.len())];
                let price = round_cents(rng.random_range(spec.offer_price.0..=spec.offer_price.1));
                let amount = rng.random_range(spec.offer_amount.0..=spec.offer_amount.1);
                Offer::new(seller.clone(), price, *fee, amount)
            })
            .collect();
        catalog.insert(&name, offers);

        let wanted = rng.random_range(spec.wanted_per_item.0..=spec.wanted_per_item.1);
        want_list.add(&name, wanted);
    }

    Ok(Synthetic {
        registry,
        catalog,
        want_list,
    })
}
