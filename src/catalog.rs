// 🗂️ Plan Catalog Loader - keep one metal tier, attach plans to rate areas
//
// Rows are matched on their raw metal_level label; anything that is not the
// target tier (including labels we don't model) is skipped untouched. Only
// target-tier rows go on to premium parsing and storage. A plan may reference
// a rate area no ZIP maps to; that area is created so the plan is still tracked.

use crate::entities::{MetalLevel, Plan};
use crate::error::SlcspError;
use crate::records::PlanRecord;
use crate::registry::{parse_rate_area_id, RateAreaRegistry};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogStats {
    pub rows_read: usize,
    pub plans_attached: usize,
    pub skipped_other_tier: usize,
    pub duplicate_plan_ids: usize,
    pub rate_areas_created: usize,
}

impl CatalogStats {
    pub fn summary(&self) -> String {
        format!(
            "{} plan rows: {} attached, {} other tier, {} duplicate ids, {} rate areas without ZIPs",
            self.rows_read,
            self.plans_attached,
            self.skipped_other_tier,
            self.duplicate_plan_ids,
            self.rate_areas_created
        )
    }
}

pub struct PlanCatalogLoader {
    target: MetalLevel,
}

impl PlanCatalogLoader {
    pub fn new(target: MetalLevel) -> Self {
        PlanCatalogLoader { target }
    }

    /// Attach every plan of the target tier to its rate area in `registry`
    pub fn load<I>(&self, registry: &mut RateAreaRegistry, records: I) -> Result<CatalogStats, SlcspError>
    where
        I: IntoIterator<Item = PlanRecord>,
    {
        let mut stats = CatalogStats::default();

        for record in records {
            stats.rows_read += 1;

            if !self.target.matches(&record.metal_level) {
                stats.skipped_other_tier += 1;
                continue;
            }

            let id = parse_rate_area_id(&record.state, &record.rate_area)?;
            let plan = Plan::parse(&record.plan_id, self.target, &record.rate, id.clone())?;

            if !registry.contains(&id) {
                debug!("plan {} creates rate area {} with no ZIPs", plan.plan_id, id);
                stats.rate_areas_created += 1;
            }

            if registry.get_or_create(&id).add_plan(plan) {
                stats.plans_attached += 1;
            } else {
                debug!("duplicate plan id {} in {}", record.plan_id, id);
                stats.duplicate_plan_ids += 1;
            }
        }

        Ok(stats)
    }
}

// ============================================================================
// TESTS
// ============================================================================
