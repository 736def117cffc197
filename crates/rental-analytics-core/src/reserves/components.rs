use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, PropertyCondition};

/// Replacement profile for one capital-expenditure component.
///
/// `cost_per_sqft` scales with livable area; `cost_base` is a fixed amount.
/// Components may carry either or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapExComponentSpec {
    pub name: String,
    pub lifespan_years: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_sqft: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_base: Option<Money>,
}

impl CapExComponentSpec {
    fn per_sqft(name: &str, lifespan_years: Decimal, cost_per_sqft: Money) -> Self {
        CapExComponentSpec {
            name: name.to_string(),
            lifespan_years,
            cost_per_sqft: Some(cost_per_sqft),
            cost_base: None,
        }
    }

    fn base(name: &str, lifespan_years: Decimal, cost_base: Money) -> Self {
        CapExComponentSpec {
            name: name.to_string(),
            lifespan_years,
            cost_per_sqft: None,
            cost_base: Some(cost_base),
        }
    }
}

/// Cost multipliers per reported property condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionMultipliers {
    pub excellent: Decimal,
    pub good: Decimal,
    pub fair: Decimal,
    pub poor: Decimal,
}

impl Default for ConditionMultipliers {
    fn default() -> Self {
        ConditionMultipliers {
            excellent: dec!(0.7),
            good: dec!(1.0),
            fair: dec!(1.3),
            poor: dec!(1.7),
        }
    }
}

impl ConditionMultipliers {
    pub fn multiplier(&self, condition: PropertyCondition) -> Decimal {
        match condition {
            PropertyCondition::Excellent => self.excellent,
            PropertyCondition::Good => self.good,
            PropertyCondition::Fair => self.fair,
            PropertyCondition::Poor => self.poor,
        }
    }
}

/// One step of the age-multiplier function. `max_age: None` is the
/// catch-all for the oldest bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeBand {
    pub max_age: Option<u32>,
    pub multiplier: Decimal,
}

/// The immutable reference tables driving dynamic reserve estimation.
/// Callers (and tests) may supply variants; nothing here is mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveTables {
    pub components: Vec<CapExComponentSpec>,
    pub condition_multipliers: ConditionMultipliers,
    pub age_bands: Vec<AgeBand>,
}

impl Default for ReserveTables {
    fn default() -> Self {
        ReserveTables {
            components: reference_components(),
            condition_multipliers: ConditionMultipliers::default(),
            age_bands: reference_age_bands(),
        }
    }
}

impl ReserveTables {
    pub fn condition_multiplier(&self, condition: PropertyCondition) -> Decimal {
        self.condition_multipliers.multiplier(condition)
    }

    /// Age bands are ordered; the first band whose ceiling covers the age
    /// wins, so out-of-range ages clamp into the end buckets.
    pub fn age_multiplier(&self, age_years: u32) -> Decimal {
        for band in &self.age_bands {
            match band.max_age {
                Some(max) if age_years <= max => return band.multiplier,
                None => return band.multiplier,
                _ => continue,
            }
        }
        dec!(1.0)
    }
}

/// The thirteen reference components with typical lifespans and
/// replacement costs for a single-family rental.
pub fn reference_components() -> Vec<CapExComponentSpec> {
    vec![
        CapExComponentSpec::per_sqft("roof", dec!(25), dec!(5.5)),
        CapExComponentSpec {
            name: "hvac".to_string(),
            lifespan_years: dec!(18),
            cost_per_sqft: Some(dec!(1.5)),
            cost_base: Some(dec!(4500)),
        },
        CapExComponentSpec::base("water_heater", dec!(10), dec!(900)),
        CapExComponentSpec::base("electrical", dec!(35), dec!(1800)),
        CapExComponentSpec::per_sqft("plumbing", dec!(45), dec!(2.0)),
        CapExComponentSpec::per_sqft("flooring", dec!(10), dec!(3.5)),
        CapExComponentSpec::base("appliances", dec!(12), dec!(3000)),
        CapExComponentSpec::base("bathroom_fixtures", dec!(18), dec!(1000)),
        CapExComponentSpec::per_sqft("interior_paint", dec!(6), dec!(1.0)),
        CapExComponentSpec::per_sqft("cabinets", dec!(18), dec!(1.25)),
        CapExComponentSpec::per_sqft("exterior_paint", dec!(8), dec!(1.5)),
        CapExComponentSpec::per_sqft("windows", dec!(20), dec!(1.75)),
        CapExComponentSpec::base("driveway", dec!(25), dec!(3000)),
    ]
}

fn reference_age_bands() -> Vec<AgeBand> {
    vec![
        AgeBand { max_age: Some(5), multiplier: dec!(0.6) },
        AgeBand { max_age: Some(15), multiplier: dec!(0.9) },
        AgeBand { max_age: Some(30), multiplier: dec!(1.1) },
        AgeBand { max_age: Some(50), multiplier: dec!(1.3) },
        AgeBand { max_age: None, multiplier: dec!(1.5) },
    ]
}
