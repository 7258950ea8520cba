// 🩺 Plan Entity - metal tier + monthly premium
//
// A plan belongs to exactly one rate area. Everything is fixed at load time
// except `is_slcsp`, which the rate area flips when it selects the plan.

use crate::entities::rate_area::RateAreaId;
use crate::error::SlcspError;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// METAL LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetalLevel {
    Bronze,
    Silver,
    Platinum,
    Catastrophic,
}

impl MetalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetalLevel::Bronze => "Bronze",
            MetalLevel::Silver => "Silver",
            MetalLevel::Platinum => "Platinum",
            MetalLevel::Catastrophic => "Catastrophic",
        }
    }

    /// Does a raw catalog label name this tier? Case and surrounding
    /// whitespace are ignored; labels outside the enum simply don't match.
    pub fn matches(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl FromStr for MetalLevel {
    type Err = SlcspError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Ok(MetalLevel::Bronze),
            "silver" => Ok(MetalLevel::Silver),
            "platinum" => Ok(MetalLevel::Platinum),
            "catastrophic" => Ok(MetalLevel::Catastrophic),
            _ => Err(SlcspError::InvalidMetalLevel(s.to_string())),
        }
    }
}

impl fmt::Display for MetalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PREMIUM
// ============================================================================

/// Monthly premium in dollars.
///
/// Always finite and non-negative, which makes the bit pattern a valid
/// equality key and `total_cmp` a valid ordering.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Premium(f64);

impl Premium {
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && !value.is_sign_negative() {
            Some(Premium(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Key for de-duplicating equal premiums
    pub fn key(&self) -> u64 {
        self.0.to_bits()
    }

    /// Fixed two-decimal rendering used in the output file
    pub fn to_cents_string(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl FromStr for Premium {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| ())?;
        Premium::new(value).ok_or(())
    }
}

impl PartialEq for Premium {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Premium {}

impl PartialOrd for Premium {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Premium {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Premium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ============================================================================
// PLAN ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub plan_id: String,
    pub metal_level: MetalLevel,
    pub premium: Premium,
    pub rate_area: RateAreaId,

    /// Set by the owning rate area when this plan is its SLCSP
    pub is_slcsp: bool,
}

impl Plan {
    pub fn new(plan_id: String, metal_level: MetalLevel, premium: Premium, rate_area: RateAreaId) -> Self {
        Plan {
            plan_id,
            metal_level,
            premium,
            rate_area,
            is_slcsp: false,
        }
    }

    /// Build a plan from raw catalog cells, validating the premium
    pub fn parse(
        plan_id: &str,
        metal_level: MetalLevel,
        rate: &str,
        rate_area: RateAreaId,
    ) -> Result<Self, SlcspError> {
        let premium: Premium = rate.parse().map_err(|_| SlcspError::InvalidPremium {
            plan_id: plan_id.to_string(),
            value: rate.to_string(),
        })?;

        Ok(Plan::new(plan_id.to_string(), metal_level, premium, rate_area))
    }

    pub fn is_silver(&self) -> bool {
        self.metal_level == MetalLevel::Silver
    }
}

// ============================================================================
// TESTS
// ============================================================================
