// Entity Models
//
// - RateArea: identity is (state, area); aggregates ZIPs, counties and plans
// - Plan: metal tier + premium, flagged when chosen as its area's SLCSP

pub mod plan;
pub mod rate_area;

pub use plan::{MetalLevel, Plan, Premium};
pub use rate_area::{RateArea, RateAreaId};
