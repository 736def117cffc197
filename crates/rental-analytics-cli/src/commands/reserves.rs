use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_analytics_core::reserves::components::ReserveTables;
use rental_analytics_core::reserves::estimator::{self, ReserveInput, ReserveMode};

use crate::commands::read_document;
use crate::config;

/// Arguments for reserve estimation
#[derive(Args)]
pub struct ReservesArgs {
    /// Path to a JSON or YAML reserve-input document
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON or YAML config file with analysis defaults
    #[arg(long)]
    pub config: Option<String>,

    /// Purchase price (dollars)
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Square footage
    #[arg(long)]
    pub square_feet: Option<Decimal>,

    /// Property age in years
    #[arg(long)]
    pub property_age: Option<u32>,

    /// Property condition: excellent, good, fair, or poor
    #[arg(long)]
    pub property_condition: Option<String>,

    /// Annual maintenance reserve (% of property value)
    #[arg(long)]
    pub maintenance_percent: Option<Decimal>,

    /// Annual CapEx reserve (% of property value)
    #[arg(long)]
    pub capex_percent: Option<Decimal>,

    /// Use the per-component CapEx schedule instead of flat percentages
    #[arg(long)]
    pub dynamic: bool,
}

pub fn run_reserves(args: ReservesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = config::load(args.config.as_deref())?;

    let reserve_input: ReserveInput = match read_document(args.input.as_deref())? {
        Some(doc) => serde_json::from_value(doc)?,
        None => {
            let defaults = ReserveInput::default();
            ReserveInput {
                purchase_price: args.price.ok_or("--price is required (or provide --input)")?,
                square_feet: args.square_feet.or(config.square_feet),
                property_age: args.property_age.or(config.property_age),
                property_condition: args
                    .property_condition
                    .clone()
                    .or_else(|| config.property_condition.clone()),
                maintenance_pct: args
                    .maintenance_percent
                    .or(config.maintenance_percent)
                    .unwrap_or(defaults.maintenance_pct),
                capex_pct: args
                    .capex_percent
                    .or(config.capex_percent)
                    .unwrap_or(defaults.capex_pct),
                mode: if args.dynamic || config.use_dynamic_capex.unwrap_or(false) {
                    ReserveMode::Dynamic
                } else {
                    ReserveMode::Flat
                },
            }
        }
    };

    let output = estimator::estimate_reserves(&reserve_input, &ReserveTables::default())?;
    Ok(serde_json::to_value(output)?)
}

/// Print the reference component schedule and adjustment tables.
pub fn run_capex_guide() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(ReserveTables::default())?)
}
