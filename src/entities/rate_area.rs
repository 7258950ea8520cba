// 🗺️ Rate Area Entity - geographic pricing region + its plans
//
// Identity is the (state, area) pair. ZIPs, counties and plans are unioned in
// as rows arrive; nothing is ever removed during a run.

use crate::entities::plan::{Plan, Premium};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

// ============================================================================
// RATE AREA ID
// ============================================================================

/// Composite key: postal state abbreviation + numeric area within the state
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RateAreaId {
    pub state: String,
    pub area: u32,
}

impl RateAreaId {
    pub fn new(state: &str, area: u32) -> Self {
        RateAreaId {
            state: state.trim().to_string(),
            area,
        }
    }
}

impl fmt::Display for RateAreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.state, self.area)
    }
}

// ============================================================================
// RATE AREA ENTITY
// ============================================================================

#[derive(Debug, Clone)]
pub struct RateArea {
    pub id: RateAreaId,
    pub zipcodes: BTreeSet<String>,
    pub counties: BTreeSet<String>,

    /// Insertion order matters: the first plan seen at a premium represents it
    plans: Vec<Plan>,
    plan_ids: HashSet<String>,

    /// Index into `plans`, valid once `slcsp_computed` is set
    slcsp: Option<usize>,
    slcsp_computed: bool,
}

impl RateArea {
    pub fn new(id: RateAreaId) -> Self {
        RateArea {
            id,
            zipcodes: BTreeSet::new(),
            counties: BTreeSet::new(),
            plans: Vec::new(),
            plan_ids: HashSet::new(),
            slcsp: None,
            slcsp_computed: false,
        }
    }

    pub fn add_zipcode(&mut self, zipcode: &str) {
        self.zipcodes.insert(zipcode.to_string());
    }

    pub fn add_county(&mut self, county: &str) {
        if !county.is_empty() {
            self.counties.insert(county.to_string());
        }
    }

    /// Attach a plan. A plan id already present is ignored (returns false).
    ///
    /// Any cached SLCSP is dropped, since the plan set changed.
    pub fn add_plan(&mut self, plan: Plan) -> bool {
        if !self.plan_ids.insert(plan.plan_id.clone()) {
            return false;
        }

        self.plans.push(plan);
        self.invalidate_slcsp();
        true
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn silver_plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter().filter(|p| p.is_silver())
    }

    pub fn has_silver_plans(&self) -> bool {
        self.silver_plans().next().is_some()
    }

    /// Compute (once) and return the Second-Lowest-Cost Silver Plan.
    ///
    /// Silver premiums are de-duplicated by value before ranking, so plans
    /// tying on price count once. With a single distinct premium that plan
    /// is the answer. With none, there is no SLCSP.
    pub fn calculate_slcsp(&mut self) -> Option<&Plan> {
        if !self.slcsp_computed {
            self.slcsp = self.select_slcsp();
            if let Some(idx) = self.slcsp {
                self.plans[idx].is_slcsp = true;
            }
            self.slcsp_computed = true;
        }

        self.slcsp()
    }

    /// The SLCSP if it has already been computed
    pub fn slcsp(&self) -> Option<&Plan> {
        self.slcsp.map(|idx| &self.plans[idx])
    }

    pub fn slcsp_rate(&self) -> Option<Premium> {
        self.slcsp().map(|p| p.premium)
    }

    fn select_slcsp(&self) -> Option<usize> {
        // premium -> first plan seen at that premium
        let mut seen = HashSet::new();
        let mut representatives: Vec<usize> = self
            .plans
            .iter()
            .enumerate()
            .filter(|(_, plan)| plan.is_silver())
            .filter(|(_, plan)| seen.insert(plan.premium.key()))
            .map(|(idx, _)| idx)
            .collect();

        representatives.sort_by_key(|&idx| self.plans[idx].premium);

        match representatives.as_slice() {
            [] => None,
            [only] => Some(*only),
            [_, second, ..] => Some(*second),
        }
    }

    fn invalidate_slcsp(&mut self) {
        if let Some(idx) = self.slcsp.take() {
            self.plans[idx].is_slcsp = false;
        }
        self.slcsp_computed = false;
    }
}

// ============================================================================
// TESTS
// ============================================================================
