use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_analytics_core::analysis::{self, DealAnalysisInput};
use rental_analytics_core::appreciation::resolver::HistoricalMetricSource;
use rental_analytics_core::reserves::components::ReserveTables;
use rental_analytics_core::PropertyFinancialInput;

use crate::commands::{
    apply_financing_flags, apply_property_flags, apply_rate_flags, load_metric_source,
    read_document, FinancingFlags, PropertyFlags, RateFlags,
};
use crate::config::{self, AnalysisConfig};

/// Arguments for the full deal analysis
#[derive(Args)]
pub struct AnalyzeArgs {
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

    #[command(flatten)]
    pub rate: RateFlags,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = config::load(args.config.as_deref())?;

    let mut input = match read_document(args.input.as_deref())? {
        Some(doc) => parse_document(doc, &config)?,
        None => DealAnalysisInput {
            property: PropertyFinancialInput::default(),
            financing: config.financing(),
            appreciation: config.resolver(),
        },
    };

    apply_property_flags(&mut input.property, &args.property);
    apply_financing_flags(&mut input.financing, &args.financing);
    apply_rate_flags(&mut input.appreciation, &args.rate);
    if let Some(manual) = args.rate.appreciation_rate {
        input.financing.manual_appreciation_rate = Some(manual);
    }

    if input.property.purchase_price <= Decimal::ZERO {
        return Err("--price is required (or provide --input)".into());
    }

    finalize_input(&mut input, &config);

    let metrics = load_metric_source(args.rate.metrics_file.as_deref())?;
    let output = analysis::analyze_deal(
        &input,
        metrics.as_ref().map(|m| m as &dyn HistoricalMetricSource),
        &ReserveTables::default(),
    )?;
    Ok(serde_json::to_value(output)?)
}

/// A document with a "property" section is a full deal input; anything
/// else is treated as a bare property record, with financing and
/// appreciation settings supplied by the config.
pub(crate) fn parse_document(
    document: Value,
    config: &AnalysisConfig,
) -> Result<DealAnalysisInput, Box<dyn std::error::Error>> {
    if document.get("property").is_some() {
        let mut input: DealAnalysisInput = serde_json::from_value(document)?;
        if input.appreciation.neighborhood_config.is_empty() {
            input.appreciation.neighborhood_config =
                config.neighborhood_appreciation_data.clone();
        }
        Ok(input)
    } else {
        Ok(DealAnalysisInput {
            property: serde_json::from_value(document)?,
            financing: config.financing(),
            appreciation: config.resolver(),
        })
    }
}

/// Last-mile defaults: property gaps, then neighborhood inference when
/// neither the resolver nor the property record names one.
pub(crate) fn finalize_input(input: &mut DealAnalysisInput, config: &AnalysisConfig) {
    config.fill_property_gaps(&mut input.property);
    if input.appreciation.neighborhood.is_none() && input.property.neighborhood.is_none() {
        input.appreciation.neighborhood =
            config.infer_neighborhood(None, input.property.zip.as_deref());
    }
}
