use wasm_bindgen::prelude::*;

pub mod allocation;
pub mod allocator;
pub mod catalog;
pub mod config;
pub mod cost;
pub mod error;
pub mod index;
pub mod optimizer;
pub mod ordering;
pub mod repair;
pub mod restart;
pub mod snapshot;
pub mod synth;
pub mod types;
pub mod wantlist;

#[cfg(feature = "instrument")]
pub use instrument;

pub use allocation::{Allocation, Fragment, ItemAllocation, SelectedSellers, Shortfall};
pub use allocator::{OfferPool, Pass, PassOutcome, RankingPolicy, allocate};
pub use catalog::{Catalog, Offer, SellerRegistry};
pub use config::{OptimizerConfig, RestartConfig};
pub use cost::{CostSummary, evaluate};
pub use error::{CatalogError, Error, Result, SynthError, WantListError};
pub use index::SellerIndex;
pub use optimizer::{Optimizer, Plan};
pub use ordering::order_demand;
pub use repair::{ReleasedUnit, RepairOutcome, repair_single_item_sellers};
pub use snapshot::PlanSnapshot;
pub use types::*;
pub use wantlist::{WantEntry, WantList};

// ============================================================================
// WASM API
// ============================================================================

#[wasm_bindgen]
pub struct BasketOptimizer {
    inner: Optimizer,
}

#[wasm_bindgen]
impl BasketOptimizer {
    /// Load a catalog, and optionally a seller registry, from json.
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, registry_json: Option<String>) -> std::result::Result<BasketOptimizer, JsError> {
        console_error_panic_hook::set_once();

        let inner = Optimizer::from_json(catalog_json, registry_json.as_deref())?;
        Ok(Self { inner })
    }

    #[wasm_bindgen]
    pub fn item_count(&self) -> usize {
        self.inner.catalog().len()
    }

    #[wasm_bindgen]
    pub fn seller_count(&self) -> usize {
        self.inner.registry().len()
    }

    /// Allocate a plain-text want-list. `config` may be left undefined.
    #[wasm_bindgen]
    pub fn optimize(&self, want_list: &str, config: JsValue) -> std::result::Result<PlanSnapshot, JsError> {
        let want_list = WantList::parse(want_list)?;
        let config: OptimizerConfig = if config.is_undefined() || config.is_null() {
            OptimizerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let plan = self.inner.optimize(&want_list, &config);
        Ok(PlanSnapshot::from(&plan))
    }
}
