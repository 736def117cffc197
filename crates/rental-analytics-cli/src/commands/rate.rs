use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_analytics_core::appreciation::resolver::{
    self, HistoricalMetricSource, RateResolverInput,
};

use crate::commands::{apply_rate_flags, load_metric_source, read_document, RateFlags};
use crate::config;

/// Arguments for appreciation-rate resolution
#[derive(Args)]
pub struct RateArgs {
    /// Path to a JSON or YAML rate-resolver document
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON or YAML config file with analysis defaults
    #[arg(long)]
    pub config: Option<String>,

    /// ZIP code, used for neighborhood inference
    #[arg(long)]
    pub zip: Option<String>,

    /// Fallback rate (%) when no higher tier resolves one
    #[arg(long, allow_hyphen_values = true)]
    pub fallback_rate: Option<Decimal>,

    #[command(flatten)]
    pub rate: RateFlags,
}

pub fn run_rate(args: RateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = config::load(args.config.as_deref())?;

    let mut resolver_input: RateResolverInput = match read_document(args.input.as_deref())? {
        Some(doc) => serde_json::from_value(doc)?,
        None => config.resolver(),
    };

    apply_rate_flags(&mut resolver_input, &args.rate);
    if let Some(v) = args.fallback_rate {
        resolver_input.fallback_rate = v;
    }
    if resolver_input.neighborhood_config.is_empty() {
        resolver_input.neighborhood_config = config.neighborhood_appreciation_data.clone();
    }
    if resolver_input.neighborhood.is_none() {
        resolver_input.neighborhood = config.infer_neighborhood(None, args.zip.as_deref());
    }

    let metrics = load_metric_source(args.rate.metrics_file.as_deref())?;
    let output = resolver::resolve_appreciation_rate(
        &resolver_input,
        metrics.as_ref().map(|m| m as &dyn HistoricalMetricSource),
    )?;
    Ok(serde_json::to_value(output)?)
}
