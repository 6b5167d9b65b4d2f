use crate::allocation::{Allocation, SelectedSellers, Shortfall};
use crate::allocator::{OfferPool, Pass, allocate};
use crate::catalog::{Catalog, SellerRegistry};
use crate::config::OptimizerConfig;
use crate::cost::{CostSummary, evaluate};
use crate::error::Result;
use crate::index::SellerIndex;
use crate::ordering::order_demand;
use crate::repair::{ReleasedUnit, repair_single_item_sellers};
use crate::restart::RestartOrders;
use crate::wantlist::{WantEntry, WantList};

/// Final result of one optimization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub allocation: Allocation,
    pub summary: CostSummary,
    /// Cost of the greedy pass before the single-item repair.
    pub first_pass: CostSummary,
    pub shortfalls: Vec<Shortfall>,
    pub released: Vec<ReleasedUnit>,
    /// Restart round that produced this plan (0 without restarts).
    pub round: u32,
}

impl Plan {
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Catalog and seller registry, ready to allocate any number of want-lists.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    catalog: Catalog,
    registry: SellerRegistry,
}

impl Optimizer {
    pub fn new(catalog: Catalog, registry: SellerRegistry) -> Self {
        Self { catalog, registry }
    }

    /// Load from json. With a registry, offers may omit `shipping_price` and
    /// take the seller's fee; without one, fees are derived from the offers.
    pub fn from_json(catalog_json: &str, registry_json: Option<&str>) -> Result<Self> {
        let (catalog, registry) = match registry_json {
            Some(json) => {
                let registry = SellerRegistry::from_json_str(json)?;
                (Catalog::from_json_with_registry(catalog_json, &registry)?, registry)
            }
            None => {
                let catalog = Catalog::from_json_str(catalog_json)?;
                let registry = SellerRegistry::from_catalog(&catalog);
                (catalog, registry)
            }
        };
        Ok(Self::new(catalog, registry))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &SellerRegistry {
        &self.registry
    }

    pub fn optimize(&self, want_list: &WantList, config: &OptimizerConfig) -> Plan {
        let index = SellerIndex::build(want_list.entries(), &self.catalog);
        let order = order_demand(want_list.entries(), &self.catalog);

        let Some(restarts) = config.restarts else {
            return self.run_round(0, &order, &index, config);
        };

        let mut best: Option<Plan> = None;
        for (round, order) in RestartOrders::new(order, restarts) {
            let plan = self.run_round(round, &order, &index, config);
            let improved = best
                .as_ref()
                .is_none_or(|b| plan.summary.total < b.summary.total);

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "restart",
                round = u64::from(round),
                total = plan.summary.total,
                best = improved,
            );

            if improved {
                best = Some(plan);
            }
        }
        best.unwrap_or_default()
    }

    fn run_round(
        &self,
        round: u32,
        order: &[WantEntry],
        index: &SellerIndex,
        config: &OptimizerConfig,
    ) -> Plan {
        let mut pool = OfferPool::from_catalog(&self.catalog);
        let first = allocate(
            order,
            &mut pool,
            index,
            config.ranking,
            SelectedSellers::new(),
            Pass::Initial,
        );
        let first_pass = evaluate(&first.allocation);
        record_summary("initial", &first_pass);

        let mut shortfalls = first.shortfalls;
        let (allocation, released) = if config.single_item_repair {
            let repaired = repair_single_item_sellers(
                first.allocation,
                first.selected_sellers,
                &self.catalog,
                config.ranking,
            );
            shortfalls.extend(repaired.shortfalls);
            (repaired.allocation, repaired.released)
        } else {
            (first.allocation, Vec::new())
        };

        let summary = evaluate(&allocation);
        record_summary("final", &summary);

        Plan {
            allocation,
            summary,
            first_pass,
            shortfalls,
            released,
            round,
        }
    }
}

#[cfg_attr(not(feature = "instrument"), allow(unused_variables))]
fn record_summary(stage: &str, summary: &CostSummary) {
    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "summary",
        stage = stage,
        total = summary.total,
        items = summary.items,
        shipping = summary.shipping,
        sellers = summary.sellers_used() as u64,
    );
}
