use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_analytics_core::analysis::DealAnalysisInput;
use rental_analytics_core::appreciation::resolver::RateResolverInput;
use rental_analytics_core::cashflow::analysis;
use rental_analytics_core::reserves::components::ReserveTables;
use rental_analytics_core::PropertyFinancialInput;

use crate::commands::{
    analyze, apply_financing_flags, apply_property_flags, read_document, FinancingFlags,
    PropertyFlags,
};
use crate::config;

/// Arguments for the cashflow calculation
#[derive(Args)]
pub struct CashflowArgs {
    /// Path to a JSON or YAML deal document, or a bare property record
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON or YAML config file with analysis defaults
    #[arg(long)]
    pub config: Option<String>,

    #[command(flatten)]
    pub property: PropertyFlags,

    #[command(flatten)]
    pub financing: FinancingFlags,
}

pub fn run_cashflow(args: CashflowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = config::load(args.config.as_deref())?;

    let mut input = match read_document(args.input.as_deref())? {
        Some(doc) => analyze::parse_document(doc, &config)?,
        None => DealAnalysisInput {
            property: PropertyFinancialInput::default(),
            financing: config.financing(),
            appreciation: RateResolverInput::default(),
        },
    };

    apply_property_flags(&mut input.property, &args.property);
    apply_financing_flags(&mut input.financing, &args.financing);

    if input.property.purchase_price <= Decimal::ZERO {
        return Err("--price is required (or provide --input)".into());
    }

    config.fill_property_gaps(&mut input.property);

    let output =
        analysis::calculate_cashflow(&input.property, &input.financing, &ReserveTables::default())?;
    Ok(serde_json::to_value(output)?)
}
