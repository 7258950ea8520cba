// 🎯 SLCSP Resolver - one rate per target ZIP
//
// Outcomes per ZIP:
// 1. not in the index           → unknown
// 2. more than one rate area    → unknown
// 3. one rate area, no silver   → unknown
// 4. one rate area with silver  → that area's SLCSP premium
//
// The SLCSP is computed once per rate area and reused by every ZIP in it.

use crate::entities::{Premium, RateAreaId};
use crate::error::SlcspError;
use crate::registry::RateAreaRegistry;
use serde::Serialize;
use tracing::info;

// ============================================================================
// RESOLUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved { rate_area: RateAreaId, plan_id: String, premium: Premium },
    NoRateArea,
    Ambiguous { rate_areas: Vec<RateAreaId> },
    NoSilverPlans { rate_area: RateAreaId },
}

impl Resolution {
    pub fn rate(&self) -> Option<Premium> {
        match self {
            Resolution::Resolved { premium, .. } => Some(*premium),
            _ => None,
        }
    }
}

/// One output row: integer zipcode, optional rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub zipcode: u32,
    pub rate: Option<Premium>,
    pub resolution: Resolution,
}

impl OutputRow {
    pub fn rate_string(&self) -> String {
        self.rate.map(|p| p.to_cents_string()).unwrap_or_default()
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub total: usize,
    pub resolved: usize,
    pub no_rate_area: usize,
    pub ambiguous: usize,
    pub no_silver_plans: usize,
}

impl ResolutionSummary {
    pub fn from_rows(rows: &[OutputRow]) -> Self {
        let mut summary = ResolutionSummary {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.resolution {
                Resolution::Resolved { .. } => summary.resolved += 1,
                Resolution::NoRateArea => summary.no_rate_area += 1,
                Resolution::Ambiguous { .. } => summary.ambiguous += 1,
                Resolution::NoSilverPlans { .. } => summary.no_silver_plans += 1,
            }
        }
        summary
    }

    pub fn summary(&self) -> String {
        format!(
            "{} zipcodes: {} resolved | unknown: {} no rate area, {} ambiguous, {} no silver plans",
            self.total, self.resolved, self.no_rate_area, self.ambiguous, self.no_silver_plans
        )
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct SlcspResolver<'a> {
    registry: &'a mut RateAreaRegistry,
}

impl<'a> SlcspResolver<'a> {
    pub fn new(registry: &'a mut RateAreaRegistry) -> Self {
        SlcspResolver { registry }
    }

    /// Resolve a single ZIP
    pub fn resolve(&mut self, zipcode: &str) -> Resolution {
        let single = match self.registry.rate_areas_for_zip(zipcode) {
            None => {
                info!("Skipping zipcode {} as no matching rate area", zipcode);
                return Resolution::NoRateArea;
            }
            Some(ids) if ids.len() > 1 => {
                let rate_areas: Vec<RateAreaId> = ids.iter().cloned().collect();
                info!(
                    "Skipping zipcode {} as more than 1 matching rate area: {}",
                    zipcode,
                    join_ids(&rate_areas)
                );
                return Resolution::Ambiguous { rate_areas };
            }
            Some(ids) => ids.iter().next().cloned(),
        };

        // The index only ever holds non-empty sets
        let Some(id) = single else {
            return Resolution::NoRateArea;
        };

        let slcsp = self
            .registry
            .get_mut(&id)
            .and_then(|area| area.calculate_slcsp())
            .map(|plan| (plan.plan_id.clone(), plan.premium));

        match slcsp {
            Some((plan_id, premium)) => Resolution::Resolved {
                rate_area: id,
                plan_id,
                premium,
            },
            None => {
                info!("No silver plans for zipcode {} in rate area {}", zipcode, id);
                Resolution::NoSilverPlans { rate_area: id }
            }
        }
    }

    /// Resolve target ZIPs in input order, one row each
    pub fn resolve_all<'z, I>(&mut self, zipcodes: I) -> Result<Vec<OutputRow>, SlcspError>
    where
        I: IntoIterator<Item = &'z str>,
    {
        zipcodes
            .into_iter()
            .map(|zipcode| {
                let parsed = parse_zipcode(zipcode)?;
                let resolution = self.resolve(zipcode);
                Ok(OutputRow {
                    zipcode: parsed,
                    rate: resolution.rate(),
                    resolution,
                })
            })
            .collect()
    }
}

fn parse_zipcode(zipcode: &str) -> Result<u32, SlcspError> {
    zipcode
        .trim()
        .parse::<u32>()
        .map_err(|_| SlcspError::InvalidZipcode(zipcode.to_string()))
}

fn join_ids(ids: &[RateAreaId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlanCatalogLoader;
    use crate::entities::MetalLevel;
    use crate::records::{PlanRecord, ZipRecord};

    fn zip(zipcode: &str, state: &str, rate_area: &str) -> ZipRecord {
        ZipRecord {
            zipcode: zipcode.to_string(),
            state: state.to_string(),
            county_code: String::new(),
            name: String::new(),
            rate_area: rate_area.to_string(),
        }
    }

    fn plan(plan_id: &str, state: &str, metal_level: &str, rate: &str, rate_area: &str) -> PlanRecord {
        PlanRecord {
            plan_id: plan_id.to_string(),
            state: state.to_string(),
            metal_level: metal_level.to_string(),
            rate: rate.to_string(),
            rate_area: rate_area.to_string(),
        }
    }

    fn sample_registry() -> RateAreaRegistry {
        let mut registry = RateAreaRegistry::new();
        registry
            .load_zip_records(vec![
                zip("90210", "CA", "50"),
                zip("60647", "IL", "12"),
                zip("32032", "IL", "11"),
                zip("32032", "IL", "12"),
                zip("55555", "PR", "42"),
                zip("10001", "NY", "3"),
            ])
            .unwrap();

        PlanCatalogLoader::new(MetalLevel::Silver)
            .load(
                &mut registry,
                vec![
                    plan("CA1", "CA", "Silver", "258.33", "50"),
                    plan("CA2", "CA", "Silver", "258.33", "50"),
                    plan("CA3", "CA", "Silver", "303.13", "50"),
                    plan("CA4", "CA", "Silver", "303.13", "50"),
                    plan("IL1", "IL", "Silver", "100.00", "12"),
                    plan("IL2", "IL", "Silver", "100.00", "12"),
                    plan("IL3", "IL", "Silver", "150.00", "12"),
                    plan("IL4", "IL", "Silver", "90.00", "11"),
                    plan("PR1", "PR", "Silver", "101.11", "42"),
                    plan("NY1", "NY", "Gold", "500.00", "3"),
                ],
            )
            .unwrap();

        registry
    }

    fn rate_of(resolution: &Resolution) -> Option<String> {
        resolution.rate().map(|p| p.to_cents_string())
    }

    #[test]
    fn test_resolves_distinct_second_lowest() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        assert_eq!(rate_of(&resolver.resolve("90210")), Some("303.13".to_string()));
        assert_eq!(rate_of(&resolver.resolve("60647")), Some("150.00".to_string()));
    }

    #[test]
    fn test_single_plan_area() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        let resolution = resolver.resolve("55555");
        assert_eq!(
            resolution,
            Resolution::Resolved {
                rate_area: RateAreaId::new("PR", 42),
                plan_id: "PR1".to_string(),
                premium: "101.11".parse().unwrap(),
            }
        );
        assert!(registry.get(&RateAreaId::new("PR", 42)).unwrap().plans()[0].is_slcsp);
    }

    #[test]
    fn test_ambiguous_zip_is_unknown() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        let resolution = resolver.resolve("32032");
        assert_eq!(
            resolution,
            Resolution::Ambiguous {
                rate_areas: vec![RateAreaId::new("IL", 11), RateAreaId::new("IL", 12)],
            }
        );
        assert_eq!(resolution.rate(), None);
    }

    #[test]
    fn test_unknown_zip_is_unknown() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        assert_eq!(resolver.resolve("99999"), Resolution::NoRateArea);
    }

    #[test]
    fn test_area_without_silver_is_unknown() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        assert_eq!(
            resolver.resolve("10001"),
            Resolution::NoSilverPlans {
                rate_area: RateAreaId::new("NY", 3),
            }
        );
    }

    #[test]
    fn test_shared_area_selects_once() {
        let mut registry = sample_registry();
        registry.add_zip("90211", RateAreaId::new("CA", 50), "Los Angeles");

        let mut resolver = SlcspResolver::new(&mut registry);
        let first = resolver.resolve("90210");
        let second = resolver.resolve("90211");
        assert_eq!(first.rate(), second.rate());

        let area = registry.get(&RateAreaId::new("CA", 50)).unwrap();
        assert_eq!(area.plans().iter().filter(|p| p.is_slcsp).count(), 1);
    }

    #[test]
    fn test_resolve_all_keeps_input_order() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        let rows = resolver
            .resolve_all(vec!["60647", "90210", "55555", "32032", "10001", "07030"])
            .unwrap();

        let pairs: Vec<(u32, String)> = rows.iter().map(|r| (r.zipcode, r.rate_string())).collect();
        assert_eq!(
            pairs,
            vec![
                (60647, "150.00".to_string()),
                (90210, "303.13".to_string()),
                (55555, "101.11".to_string()),
                (32032, String::new()),
                (10001, String::new()),
                (7030, String::new()),
            ]
        );

        let summary = ResolutionSummary::from_rows(&rows);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.resolved, 3);
        assert_eq!(summary.ambiguous, 1);
        assert_eq!(summary.no_silver_plans, 1);
        assert_eq!(summary.no_rate_area, 1);
    }

    #[test]
    fn test_resolve_all_rejects_non_numeric_zip() {
        let mut registry = sample_registry();
        let mut resolver = SlcspResolver::new(&mut registry);

        let err = resolver.resolve_all(vec!["90210", "ABCDE"]).unwrap_err();
        assert_eq!(err, SlcspError::InvalidZipcode("ABCDE".to_string()));
    }
}
