use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::RentalAnalyticsError;
use crate::reserves::components::ReserveTables;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, PropertyCondition};
use crate::RentalAnalyticsResult;

pub(crate) const DEFAULT_PROPERTY_AGE: u32 = 20;

/// Reserve estimation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReserveMode {
    /// Flat percentage of purchase price for maintenance and CapEx.
    #[default]
    Flat,
    /// Per-component replacement schedule adjusted for condition and age.
    Dynamic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReserveInput {
    pub purchase_price: Money,
    pub square_feet: Option<Decimal>,
    pub property_age: Option<u32>,
    pub property_condition: Option<String>,
    pub maintenance_pct: Percent,
    pub capex_pct: Percent,
    pub mode: ReserveMode,
}

impl Default for ReserveInput {
    fn default() -> Self {
        ReserveInput {
            purchase_price: Decimal::ZERO,
            square_feet: None,
            property_age: None,
            property_condition: None,
            maintenance_pct: dec!(1.0),
            capex_pct: dec!(1.0),
            mode: ReserveMode::Flat,
        }
    }
}

/// Reserve line for a single component, after condition and age adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentReserve {
    pub component: String,
    pub replacement_cost: Money,
    pub lifespan_years: Decimal,
    pub annual_reserve: Money,
    pub monthly_reserve: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapExBreakdown {
    pub components: Vec<ComponentReserve>,
    pub total_annual: Money,
    pub total_monthly: Money,
    pub percent_of_value: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveEstimate {
    pub mode: ReserveMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_multiplier: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_multiplier: Option<Decimal>,
    pub monthly_maintenance: Money,
    pub monthly_capex: Money,
    pub adjusted_maintenance_percent: Percent,
    pub adjusted_capex_percent: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capex_breakdown: Option<CapExBreakdown>,
}

/// Estimate monthly maintenance and CapEx reserves in the requested mode.
pub fn estimate_reserves(
    input: &ReserveInput,
    tables: &ReserveTables,
) -> RentalAnalyticsResult<ComputationOutput<ReserveEstimate>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.purchase_price <= Decimal::ZERO {
        return Err(RentalAnalyticsError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    let estimate = match input.mode {
        ReserveMode::Flat => {
            let monthly_maintenance =
                input.purchase_price * (input.maintenance_pct / dec!(100)) / dec!(12);
            let monthly_capex = input.purchase_price * (input.capex_pct / dec!(100)) / dec!(12);
            ReserveEstimate {
                mode: ReserveMode::Flat,
                condition_multiplier: None,
                age_multiplier: None,
                monthly_maintenance,
                monthly_capex,
                adjusted_maintenance_percent: input.maintenance_pct,
                adjusted_capex_percent: input.capex_pct,
                capex_breakdown: None,
            }
        }
        ReserveMode::Dynamic => {
            let condition = resolve_condition(input.property_condition.as_deref(), &mut warnings);
            let age = resolve_age(input.property_age, &mut warnings);
            let condition_mult = tables.condition_multiplier(condition);
            let age_mult = tables.age_multiplier(age);

            let breakdown = capex_breakdown(
                input.purchase_price,
                input.square_feet,
                condition_mult,
                age_mult,
                tables,
                &mut warnings,
            );

            let adjusted_maintenance_percent = input.maintenance_pct * age_mult * condition_mult;
            let monthly_maintenance =
                input.purchase_price * (adjusted_maintenance_percent / dec!(100)) / dec!(12);

            ReserveEstimate {
                mode: ReserveMode::Dynamic,
                condition_multiplier: Some(condition_mult),
                age_multiplier: Some(age_mult),
                monthly_maintenance,
                monthly_capex: breakdown.total_monthly,
                adjusted_maintenance_percent,
                adjusted_capex_percent: breakdown.percent_of_value,
                capex_breakdown: Some(breakdown),
            }
        }
    };

    let methodology = match input.mode {
        ReserveMode::Flat => "Flat percentage-of-value reserve estimate",
        ReserveMode::Dynamic => {
            "Component replacement schedule adjusted for property condition and age"
        }
    };

    let assumptions = json!({
        "mode": input.mode,
        "maintenance_pct": input.maintenance_pct,
        "capex_pct": input.capex_pct,
        "property_age": input.property_age,
        "property_condition": input.property_condition,
        "square_feet": input.square_feet,
        "component_count": tables.components.len(),
    });

    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        estimate,
    ))
}

/// Component-by-component reserve schedule. Shared with the cashflow
/// calculator so dynamic-mode analyses report the same breakdown.
pub(crate) fn capex_breakdown(
    purchase_price: Money,
    square_feet: Option<Decimal>,
    condition_mult: Decimal,
    age_mult: Decimal,
    tables: &ReserveTables,
    warnings: &mut Vec<String>,
) -> CapExBreakdown {
    let usable_sqft = square_feet.filter(|s| *s > Decimal::ZERO);
    if usable_sqft.is_none()
        && tables.components.iter().any(|c| c.cost_per_sqft.is_some())
    {
        warnings.push(
            "Square footage missing or not positive; per-square-foot component costs fall back to base amounts only.".to_string(),
        );
    }

    let mut components = Vec::with_capacity(tables.components.len());
    let mut total_annual = Decimal::ZERO;

    for spec in &tables.components {
        // Worse condition shortens the expected lifespan.
        let adjusted_lifespan = if condition_mult > Decimal::ZERO {
            spec.lifespan_years / condition_mult
        } else {
            spec.lifespan_years
        };

        let mut replacement = Decimal::ZERO;
        if let Some(per_sqft) = spec.cost_per_sqft {
            if let Some(sqft) = usable_sqft {
                replacement = per_sqft * sqft;
            }
            if let Some(base) = spec.cost_base {
                replacement += base;
            }
        } else if let Some(base) = spec.cost_base {
            replacement = base;
        }

        let adjusted_cost = replacement * condition_mult * age_mult;
        let annual_reserve = if adjusted_lifespan > Decimal::ZERO {
            adjusted_cost / adjusted_lifespan
        } else {
            Decimal::ZERO
        };

        components.push(ComponentReserve {
            component: spec.name.clone(),
            replacement_cost: adjusted_cost,
            lifespan_years: adjusted_lifespan,
            annual_reserve,
            monthly_reserve: annual_reserve / dec!(12),
        });
        total_annual += annual_reserve;
    }

    let percent_of_value = if purchase_price > Decimal::ZERO {
        total_annual / purchase_price * dec!(100)
    } else {
        Decimal::ZERO
    };

    CapExBreakdown {
        components,
        total_annual,
        total_monthly: total_annual / dec!(12),
        percent_of_value,
    }
}

pub(crate) fn resolve_condition(
    label: Option<&str>,
    warnings: &mut Vec<String>,
) -> PropertyCondition {
    match label {
        Some(raw) => match PropertyCondition::from_label(raw) {
            Some(condition) => condition,
            None => {
                warnings.push(format!(
                    "Unrecognized property condition '{}'; using 'good'.",
                    raw
                ));
                PropertyCondition::Good
            }
        },
        None => PropertyCondition::Good,
    }
}

pub(crate) fn resolve_age(age: Option<u32>, warnings: &mut Vec<String>) -> u32 {
    match age {
        Some(age) => age,
        None => {
            warnings.push(format!(
                "Property age missing; assuming {} years.",
                DEFAULT_PROPERTY_AGE
            ));
            DEFAULT_PROPERTY_AGE
        }
    }
}
